use async_trait::async_trait;

use super::{docblock, Handler, HandlerContext};
use crate::jsdoc::DocBlock;
use crate::model::{merge_tags, Documentation};
use crate::syntax::ComponentDefinition;
use crate::Result;

/// Documents slots used by render functions and `@slot` docblock tags.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlotHandler;

#[async_trait]
impl Handler for SlotHandler {
    fn name(&self) -> &'static str {
        "slots"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        for usage in definition.usages().slots {
            let slot = doc.slot_mut(&usage.name);
            slot.scoped |= usage.scoped;
        }

        for block in ctx.script.docblocks_within(definition.span()) {
            let block = docblock(Some(&block.text));
            if block.has_tag("slot") {
                document_slot_tag(doc, &block);
            }
        }
        Ok(())
    }
}

/// Applies `@slot name description` and its `@binding` tags.
pub(crate) fn document_slot_tag(doc: &mut Documentation, block: &DocBlock) {
    let Some(tag) = block.tag("slot") else {
        return;
    };
    let text = tag.description.as_deref().unwrap_or_default();
    let (name, description) = match text.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim())),
        None if !text.is_empty() => (text, None),
        None => ("default", None),
    };

    let slot = doc.slot_mut(name);
    let description = description
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| block.description.clone());
    if description.is_some() {
        slot.description = description;
    }
    let bindings = block.params(&["binding"]);
    if !bindings.is_empty() {
        slot.scoped = true;
        slot.bindings = bindings;
    }
    merge_tags(&mut slot.tags, block.tag_map(&["slot", "binding"]));
}
