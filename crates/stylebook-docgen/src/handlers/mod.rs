//! Documentation handlers.
//!
//! A handler reads one component definition and writes what it finds into a
//! [`Documentation`] record. Pre-handlers run first, one after the other, on
//! the shared record. Regular handlers then run concurrently, each on its own
//! scratch record, and the scratches are merged in declaration order.

mod class_props;
mod component;
mod computed;
mod data;
mod dependency;
mod display_name;
mod events;
mod methods;
mod model;
mod props;
mod slots;

use async_trait::async_trait;

use crate::cache::ParseCache;
use crate::jsdoc::{parse_docblock, DocBlock};
use crate::model::Documentation;
use crate::options::ParseOptions;
use crate::syntax::{ComponentDefinition, ParsedScript};
use crate::Result;

pub use class_props::{ClassPropHandler, PropDecoratorConfig};
pub use component::ComponentHandler;
pub use computed::ComputedHandler;
pub use data::DataHandler;
pub use dependency::{ExtendsHandler, MixinsHandler};
pub use display_name::DisplayNameHandler;
pub use events::EventHandler;
pub use methods::MethodHandler;
pub use model::ModelHandler;
pub use props::PropHandler;
pub use slots::SlotHandler;

pub(crate) use props::default_value;

/// Everything a handler may read besides the definition itself.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// The script the definition was resolved from.
    pub script: &'a ParsedScript,
    pub options: &'a ParseOptions,
    /// Cache used to parse extended components and mixins.
    pub cache: &'a ParseCache,
    /// Extends/mixins nesting level, 0 for the documented file.
    pub depth: usize,
}

/// A documentation pass over one component definition.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Adds what this handler knows about `definition` to `doc`.
    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        ctx: &HandlerContext<'_>,
    ) -> Result<()>;
}

/// Pre-handlers in execution order.
pub fn default_pre_handlers() -> Vec<Box<dyn Handler>> {
    vec![
        Box::new(DisplayNameHandler),
        Box::new(ExtendsHandler),
        Box::new(MixinsHandler),
    ]
}

/// Handlers run concurrently after the pre-handlers.
pub fn default_handlers() -> Vec<Box<dyn Handler>> {
    vec![
        Box::new(ComponentHandler),
        Box::new(PropHandler),
        Box::new(ClassPropHandler),
        Box::new(DataHandler),
        Box::new(ComputedHandler),
        Box::new(MethodHandler),
        Box::new(EventHandler),
        Box::new(SlotHandler),
        Box::new(ModelHandler),
    ]
}

fn docblock(raw: Option<&str>) -> DocBlock {
    raw.map(parse_docblock).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::resolver::resolve_exports;
    use crate::syntax::{parse, Grammar};

    /// Runs one handler over the first definition of `source`.
    pub async fn try_run(handler: &dyn Handler, source: &str) -> Result<Documentation> {
        let script = parse(source, Grammar::default()).expect("fixture should parse");
        let definitions = resolve_exports(&script);
        let (_, definition) = definitions.first().expect("fixture should export a component");
        let options = ParseOptions::new("Fixture.ts");
        let cache = ParseCache::unbounded();
        let ctx = HandlerContext {
            script: &script,
            options: &options,
            cache: &cache,
            depth: 0,
        };
        let mut doc = Documentation::new();
        handler.handle(&mut doc, definition, &ctx).await?;
        Ok(doc)
    }

    pub async fn run(handler: &dyn Handler, source: &str) -> Documentation {
        try_run(handler, source).await.expect("handler should succeed")
    }
}
