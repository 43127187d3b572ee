use async_trait::async_trait;

use super::{docblock, Handler, HandlerContext};
use crate::model::{merge_tags, Documentation};
use crate::syntax::ComponentDefinition;
use crate::Result;

/// Tags consumed by other handlers or turned into fields.
const CONSUMED_TAGS: &[&str] = &["displayName", "slot", "binding", "event", "values"];

/// Documents the component docblock: description, tags and `@displayName`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentHandler;

#[async_trait]
impl Handler for ComponentHandler {
    fn name(&self) -> &'static str {
        "component"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        _ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let block = docblock(definition.doc());
        if block.is_empty() {
            return Ok(());
        }

        doc.description = block.description.clone();
        if let Some(name) = block
            .tag("displayName")
            .and_then(|tag| tag.description.as_deref())
        {
            doc.display_name = Some(name.to_string());
        }
        merge_tags(&mut doc.tags, block.tag_map(CONSUMED_TAGS));
        Ok(())
    }
}
