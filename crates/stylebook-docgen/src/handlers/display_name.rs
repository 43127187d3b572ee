use async_trait::async_trait;

use super::{Handler, HandlerContext};
use crate::model::Documentation;
use crate::syntax::{ComponentDefinition, Expr};
use crate::Result;

/// Takes the display name from the `name` option or the class identifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisplayNameHandler;

#[async_trait]
impl Handler for DisplayNameHandler {
    fn name(&self) -> &'static str {
        "displayName"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        _ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let from_options = definition
            .options()
            .and_then(|options| options.get("name"))
            .and_then(Expr::as_str);
        let from_class = definition.class().and_then(|class| class.name.as_deref());

        if let Some(name) = from_options.or(from_class) {
            doc.display_name = Some(name.to_string());
        }
        Ok(())
    }
}
