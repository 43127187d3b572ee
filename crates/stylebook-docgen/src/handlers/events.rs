use async_trait::async_trait;
use tracing::trace;

use super::{docblock, Handler, HandlerContext};
use crate::jsdoc::DocBlock;
use crate::model::{merge_tags, Documentation, TypeDescriptor};
use crate::syntax::{ComponentDefinition, ExprKind, MemberKind, PropertyKind};
use crate::Result;

const PAYLOAD_TAGS: &[&str] = &["property", "prop", "arg", "argument"];
const CONSUMED_TAGS: &[&str] = &["event", "type", "property", "prop", "arg", "argument"];

/// Documents emitted events.
///
/// Sources, in order: `$emit` calls, the `emits` option, `@Emit` method
/// decorators and `@event` tags in any docblock of the definition.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventHandler;

#[async_trait]
impl Handler for EventHandler {
    fn name(&self) -> &'static str {
        "events"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        for emit in definition.usages().emits {
            let block = docblock(emit.doc.as_deref());
            let name = event_tag_name(&block).or(emit.event);
            match name {
                Some(name) => document(doc, &name, &block),
                None => trace!(event = %emit.event_source, "skipping $emit with a dynamic event name"),
            }
        }

        if let Some(emits) = definition.options().and_then(|options| options.get("emits")) {
            match &emits.kind {
                ExprKind::Array(names) => {
                    for name in names.iter().filter_map(|name| name.as_str()) {
                        doc.event_mut(name);
                    }
                }
                ExprKind::Object(object) => {
                    for property in &object.properties {
                        if matches!(property.kind, PropertyKind::Spread | PropertyKind::Computed) {
                            continue;
                        }
                        document(doc, &property.key, &docblock(property.doc.as_deref()));
                    }
                }
                _ => {}
            }
        }

        if let Some(class) = definition.class() {
            for member in &class.members {
                if member.kind != MemberKind::Method {
                    continue;
                }
                let Some(decorator) = member.decorator(&["Emit"]) else {
                    continue;
                };
                let name = decorator
                    .arguments
                    .first()
                    .and_then(|arg| arg.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| hyphenate(&member.name));
                document(doc, &name, &docblock(member.doc.as_deref()));
            }
        }

        for block in ctx.script.docblocks_within(definition.span()) {
            let block = docblock(Some(&block.text));
            if let Some(name) = event_tag_name(&block) {
                document(doc, &name, &block);
            }
        }
        Ok(())
    }
}

fn event_tag_name(block: &DocBlock) -> Option<String> {
    let tag = block.tag("event")?;
    tag.name
        .clone()
        .or_else(|| tag.description.clone())
        .filter(|name| !name.is_empty())
}

fn document(doc: &mut Documentation, name: &str, block: &DocBlock) {
    let event = doc.event_mut(name);
    if event.description.is_none() {
        event.description = block.description.clone();
    }
    if let Some(type_hint) = block.tag("type").and_then(|tag| tag.type_hint.as_deref()) {
        event.type_ = Some(TypeDescriptor::named(type_hint));
    }
    let properties = block.params(PAYLOAD_TAGS);
    if !properties.is_empty() {
        event.properties = properties;
    }
    merge_tags(&mut event.tags, block.tag_map(CONSUMED_TAGS));
}

/// `resetCount` -> `reset-count`
fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.char_indices() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::run;

    #[tokio::test]
    async fn documents_emit_calls() {
        let doc = run(
            &EventHandler,
            r#"
            export default {
              methods: {
                onClick(e) {
                  /**
                   * Triggered when the button is clicked
                   * @type {MouseEvent}
                   * @property {number} x horizontal position
                   */
                  this.$emit('click', e)
                  this.$emit(EVENTS.HOVER)
                  /** @event close */
                  this.$emit(EVENTS.CLOSE)
                },
              },
            }
            "#,
        )
        .await;

        let names: Vec<_> = doc.events.keys().map(String::as_str).collect();
        assert_eq!(names, ["click", "close"]);
        let click = &doc.events["click"];
        assert_eq!(click.description.as_deref(), Some("Triggered when the button is clicked"));
        assert_eq!(click.type_, Some(TypeDescriptor::named("MouseEvent")));
        assert_eq!(click.properties[0].name, "x");
        assert!(click.tags.is_empty());
    }

    #[tokio::test]
    async fn documents_emits_option_and_tags() {
        let doc = run(
            &EventHandler,
            r#"
            /**
             * @event opened fired once the dialog is visible
             */
            export default defineComponent({
              emits: {
                /** Dialog was closed */
                close: null,
              },
              setup(props, { emit }) {
                emit('update:modelValue', 1)
              },
            })
            "#,
        )
        .await;
        assert_eq!(doc.events["close"].description.as_deref(), Some("Dialog was closed"));
        assert!(doc.events.contains_key("update:modelValue"));
        assert!(!doc.events.contains_key("opened"), "docblock before the export is outside the definition");
    }

    #[tokio::test]
    async fn documents_emit_decorators() {
        let doc = run(
            &EventHandler,
            r#"
            @Component
            export default class Counter extends Vue {
              /** Count was reset */
              @Emit()
              resetCount() { return 0 }

              @Emit('changed')
              change(n: number) { return n }
            }
            "#,
        )
        .await;
        assert_eq!(doc.events["reset-count"].description.as_deref(), Some("Count was reset"));
        assert!(doc.events.contains_key("changed"));
    }

    #[test]
    fn hyphenates_camel_case() {
        assert_eq!(hyphenate("resetCount"), "reset-count");
        assert_eq!(hyphenate("close"), "close");
    }
}
