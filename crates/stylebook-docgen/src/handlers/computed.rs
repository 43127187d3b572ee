use async_trait::async_trait;

use super::{docblock, Handler, HandlerContext};
use crate::model::{merge_tags, Documentation, TypeDescriptor};
use crate::syntax::{ComponentDefinition, ExprKind, FunctionLit, MemberKind, PropertyKind};
use crate::types::type_from_annotation;
use crate::Result;

/// Documents `computed` options and class getters.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComputedHandler;

#[async_trait]
impl Handler for ComputedHandler {
    fn name(&self) -> &'static str {
        "computed"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        _ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let computed = definition
            .options()
            .and_then(|options| options.get("computed"))
            .and_then(|computed| computed.as_object());

        for property in computed.iter().flat_map(|object| object.properties.iter()) {
            let (getter, settable) = match (&property.kind, &property.value.kind) {
                (PropertyKind::Spread | PropertyKind::Computed, _) => continue,
                (_, ExprKind::Function(function)) => (Some(function), false),
                (_, ExprKind::Object(accessors)) => (
                    accessors.get("get").and_then(|get| get.as_function()),
                    accessors.get("set").is_some(),
                ),
                _ => continue,
            };
            document(doc, &property.key, property.doc.as_deref(), getter, settable);
        }

        if let Some(class) = definition.class() {
            for member in &class.members {
                if member.kind != MemberKind::Getter || member.is_static {
                    continue;
                }
                let settable = class
                    .members
                    .iter()
                    .any(|other| other.kind == MemberKind::Setter && other.name == member.name);
                document(
                    doc,
                    &member.name,
                    member.doc.as_deref(),
                    member.function.as_ref(),
                    settable,
                );
            }
        }
        Ok(())
    }
}

fn document(
    doc: &mut Documentation,
    name: &str,
    raw_doc: Option<&str>,
    getter: Option<&FunctionLit>,
    settable: bool,
) {
    let block = docblock(raw_doc);
    if block.has_tag("ignore") {
        return;
    }
    let computed = doc.computed_mut(name);
    computed.description = block.description.clone();
    computed.settable = settable;
    computed.type_ = block
        .tag("type")
        .and_then(|tag| tag.type_hint.as_deref())
        .map(TypeDescriptor::named)
        .or_else(|| {
            getter
                .and_then(|function| function.return_type.as_ref())
                .map(type_from_annotation)
        });
    merge_tags(&mut computed.tags, block.tag_map(&["type", "ignore"]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::run;

    #[tokio::test]
    async fn documents_computed_options() {
        let doc = run(
            &ComputedHandler,
            r#"
            export default {
              computed: {
                ...mapGetters(['user']),
                /** Full name of the user */
                fullName(): string { return this.first + ' ' + this.last },
                value: {
                  get() { return this.inner },
                  set(v) { this.inner = v },
                },
                /** @type {number} */
                total: function () { return 1 },
              },
            }
            "#,
        )
        .await;
        let names: Vec<_> = doc.computed.keys().map(String::as_str).collect();
        assert_eq!(names, ["fullName", "value", "total"]);
        assert_eq!(doc.computed["fullName"].type_, Some(TypeDescriptor::named("string")));
        assert_eq!(
            doc.computed["fullName"].description.as_deref(),
            Some("Full name of the user")
        );
        assert!(doc.computed["value"].settable);
        assert!(!doc.computed["fullName"].settable);
        assert_eq!(doc.computed["total"].type_, Some(TypeDescriptor::named("number")));
    }

    #[tokio::test]
    async fn documents_class_getters() {
        let doc = run(
            &ComputedHandler,
            r#"
            @Component
            export default class Counter extends Vue {
              get double(): number { return this.value * 2 }
              get label() { return '' }
              set label(v: string) {}
            }
            "#,
        )
        .await;
        assert_eq!(doc.computed["double"].type_, Some(TypeDescriptor::named("number")));
        assert!(doc.computed["label"].settable);
    }
}
