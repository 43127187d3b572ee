use indexmap::IndexMap;
use tracing::trace;

use crate::syntax::{ComponentDefinition, ExportTarget, Expr, ExprKind, ParsedScript};

/// Decorators that mark a class as a component.
const COMPONENT_DECORATORS: &[&str] = &["Component", "Options"];

/// Maps every exported component definition of a script by export name.
///
/// Exports are returned in declaration order. Exports that do not describe a
/// component (functions, constants, re-exports) are skipped.
pub fn resolve_exports(script: &ParsedScript) -> IndexMap<String, ComponentDefinition> {
    let mut definitions = IndexMap::new();

    for export in &script.exports {
        let (expr, binding_doc) = match &export.target {
            ExportTarget::Expr(expr) => (expr, None),
            ExportTarget::Local(name) => match script.bindings.get(name) {
                Some(binding) => (&binding.value, binding.doc.clone()),
                None => {
                    trace!(export = %export.name, local = %name, "export does not refer to a local binding");
                    continue;
                }
            },
        };
        let doc = export.doc.clone().or(binding_doc);
        if let Some(definition) = definition_from_expr(expr, doc) {
            definitions.entry(export.name.clone()).or_insert(definition);
        }
    }

    definitions
}

/// Recognizes a component definition in an expression.
pub fn definition_from_expr(expr: &Expr, doc: Option<String>) -> Option<ComponentDefinition> {
    match &expr.kind {
        ExprKind::Object(options) => Some(ComponentDefinition::Object {
            options: options.clone(),
            doc,
        }),
        ExprKind::Class(class) => {
            let options = class
                .decorators
                .iter()
                .find(|decorator| COMPONENT_DECORATORS.contains(&decorator.name.as_str()));
            if options.is_none() && class.super_class.is_none() {
                return None;
            }
            let options = options
                .and_then(|decorator| decorator.arguments.first())
                .and_then(Expr::as_object)
                .cloned();
            Some(ComponentDefinition::Class {
                doc: doc.or_else(|| class.doc.clone()),
                class: class.clone(),
                options,
            })
        }
        ExprKind::Call { callee, arguments } if is_component_factory(callee) => {
            let options = arguments.iter().rev().find_map(Expr::as_object)?;
            Some(ComponentDefinition::Object {
                options: options.clone(),
                doc,
            })
        }
        ExprKind::TypeCast { expression, .. } => definition_from_expr(expression, doc),
        _ => None,
    }
}

/// `defineComponent(...)`, `Vue.extend(...)`, `Vue.component('name', ...)`.
fn is_component_factory(callee: &Expr) -> bool {
    match &callee.kind {
        ExprKind::Ident(name) => name == "defineComponent",
        ExprKind::Member { property, .. } => property == "extend" || property == "component",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, Grammar};

    fn resolve(source: &str) -> IndexMap<String, ComponentDefinition> {
        resolve_exports(&parse(source, Grammar::default()).unwrap())
    }

    #[test]
    fn resolves_default_object() {
        let defs = resolve("export default { name: 'A' }");
        assert_eq!(defs.len(), 1);
        assert!(matches!(defs["default"], ComponentDefinition::Object { .. }));
    }

    #[test]
    fn resolves_wrapped_options() {
        for source in [
            "export default defineComponent({ name: 'A' })",
            "export default Vue.extend({ name: 'A' })",
            "export default Vue.component('a', { name: 'A' })",
        ] {
            let defs = resolve(source);
            let options = defs["default"].options().unwrap();
            assert_eq!(options.get("name").and_then(Expr::as_str), Some("A"), "{source}");
        }
    }

    #[test]
    fn resolves_identifiers_through_bindings() {
        let defs = resolve(
            r#"
            /** Described */
            const Button = { name: 'Button' }
            export default Button
            "#,
        );
        assert!(defs["default"].doc().unwrap().contains("Described"));
    }

    #[test]
    fn resolves_named_exports_in_order() {
        let defs = resolve(
            r#"
            export const First = { name: 'First' }
            export const helper = () => 1
            export class Second extends Vue {}
            "#,
        );
        let names: Vec<_> = defs.keys().map(String::as_str).collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[test]
    fn decorated_class_carries_options() {
        let defs = resolve(
            r#"
            @Component({ props: { size: String } })
            export default class Button extends Vue {}
            "#,
        );
        let def = &defs["default"];
        assert!(def.class().is_some());
        assert!(def.options().unwrap().get("props").is_some());
    }

    #[test]
    fn ignores_plain_classes_and_functions() {
        assert!(resolve("export default class Util {}").is_empty());
        assert!(resolve("export default function render() {}").is_empty());
        assert!(resolve("export const VERSION = '1.0'").is_empty());
    }
}
