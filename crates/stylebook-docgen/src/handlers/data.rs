use async_trait::async_trait;

use super::{default_value, docblock, Handler, HandlerContext};
use crate::model::{merge_tags, Documentation, TypeDescriptor};
use crate::syntax::{ClassMember, ComponentDefinition, Expr, ExprKind, MemberKind, PropertyKind};
use crate::types::type_from_annotation;
use crate::Result;

/// Documents reactive data: keys of the object returned by `data()` and
/// undecorated class fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataHandler;

#[async_trait]
impl Handler for DataHandler {
    fn name(&self) -> &'static str {
        "data"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        _ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        if let Some(data) = definition.options().and_then(|options| options.get("data")) {
            let returned = match &data.kind {
                ExprKind::Function(function) => function.returned.as_deref(),
                _ => Some(data),
            };
            if let Some(object) = returned.and_then(Expr::as_object) {
                for property in &object.properties {
                    if property.kind != PropertyKind::Init {
                        continue;
                    }
                    document_entry(doc, &property.key, property.doc.as_deref(), None, &property.value);
                }
            }
        }

        if let Some(class) = definition.class() {
            for member in class.members.iter().filter(|member| is_data_field(member)) {
                let Some(value) = &member.value else {
                    if let Some(annotation) = &member.type_annotation {
                        let entry = doc.data_mut(&member.name);
                        entry.type_ = Some(type_from_annotation(annotation));
                        apply_doc(entry, member.doc.as_deref());
                    }
                    continue;
                };
                let annotation = member.type_annotation.as_ref().map(type_from_annotation);
                document_entry(doc, &member.name, member.doc.as_deref(), annotation, value);
            }
        }
        Ok(())
    }
}

fn is_data_field(member: &ClassMember) -> bool {
    member.kind == MemberKind::Field
        && !member.is_static
        && member.decorators.is_empty()
        && !member.name.starts_with('#')
        && !matches!(member.value.as_ref().map(|v| &v.kind), Some(ExprKind::Function(_)))
}

fn document_entry(
    doc: &mut Documentation,
    name: &str,
    raw_doc: Option<&str>,
    annotation: Option<TypeDescriptor>,
    value: &Expr,
) {
    if docblock(raw_doc).has_tag("ignore") {
        return;
    }
    let entry = doc.data_mut(name);
    entry.type_ = annotation.or_else(|| literal_type(value));
    entry.default_value = Some(default_value(value, false));
    apply_doc(entry, raw_doc);
}

fn apply_doc(entry: &mut crate::model::DataDescriptor, raw_doc: Option<&str>) {
    let block = docblock(raw_doc);
    if block.description.is_some() {
        entry.description = block.description.clone();
    }
    if let Some(type_hint) = block.tag("type").and_then(|tag| tag.type_hint.as_ref()) {
        entry.type_ = Some(TypeDescriptor::named(type_hint.as_str()));
    }
    merge_tags(&mut entry.tags, block.tag_map(&["type", "ignore"]));
}

/// Type of a literal initializer.
fn literal_type(value: &Expr) -> Option<TypeDescriptor> {
    let name = match &value.kind {
        ExprKind::Str(_) | ExprKind::Template => "string",
        ExprKind::Number(_) => "number",
        ExprKind::Bool(_) => "boolean",
        ExprKind::Array(_) => "array",
        ExprKind::Object(_) => "object",
        ExprKind::Null => "null",
        ExprKind::TypeCast {
            type_annotation, ..
        } => return Some(type_from_annotation(type_annotation)),
        _ => return None,
    };
    Some(TypeDescriptor::named(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::run;
    use crate::model::DefaultValue;

    #[tokio::test]
    async fn documents_data_function() {
        let doc = run(
            &DataHandler,
            r#"
            export default {
              data() {
                const initial = 0
                return {
                  /** Number of clicks */
                  count: initial,
                  label: 'Go',
                  items: [] as string[],
                }
              },
            }
            "#,
        )
        .await;
        let count = &doc.data["count"];
        assert_eq!(count.description.as_deref(), Some("Number of clicks"));
        assert_eq!(count.default_value, Some(DefaultValue::new("initial", true)));
        assert!(count.type_.is_none());

        assert_eq!(doc.data["label"].type_, Some(TypeDescriptor::named("string")));
        assert_eq!(doc.data["label"].default_value, Some(DefaultValue::new("\"Go\"", false)));
        assert_eq!(doc.data["items"].type_, Some(TypeDescriptor::named("string[]")));
    }

    #[tokio::test]
    async fn documents_class_fields() {
        let doc = run(
            &DataHandler,
            r#"
            @Component
            export default class Counter extends Vue {
              @Prop() readonly start!: number
              /** Current value */
              current: number = 0
              open = false
              static registry = []
              handler = () => {}
            }
            "#,
        )
        .await;
        let names: Vec<_> = doc.data.keys().map(String::as_str).collect();
        assert_eq!(names, ["current", "open"]);
        assert_eq!(doc.data["current"].type_, Some(TypeDescriptor::named("number")));
        assert_eq!(doc.data["open"].type_, Some(TypeDescriptor::named("boolean")));
    }
}
