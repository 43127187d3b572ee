use async_trait::async_trait;

use super::class_props::decorated_prop_names;
use super::{docblock, Handler, HandlerContext};
use crate::model::{merge_tags, DefaultValue, Documentation, PropDescriptor};
use crate::syntax::{ComponentDefinition, Expr, ExprKind, Property, PropertyKind, TypeNode};
use crate::types::{literal_values, type_from_constructor};
use crate::Result;

/// Documents the `props` option of object components and `@Component` options.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropHandler;

#[async_trait]
impl Handler for PropHandler {
    fn name(&self) -> &'static str {
        "props"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        _ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let Some(props) = definition.options().and_then(|options| options.get("props")) else {
            return Ok(());
        };
        let decorated = decorated_prop_names(definition);
        let declared_by_member = |name: &str| decorated.iter().any(|member| member == name);

        match &props.kind {
            ExprKind::Array(names) => {
                for name in names.iter().filter_map(Expr::as_str) {
                    if !declared_by_member(name) {
                        doc.prop_mut(name);
                    }
                }
            }
            ExprKind::Object(object) => {
                for property in &object.properties {
                    if matches!(property.kind, PropertyKind::Spread | PropertyKind::Computed)
                        || declared_by_member(&property.key)
                    {
                        continue;
                    }
                    document_prop(doc, property);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn document_prop(doc: &mut Documentation, property: &Property) {
    let block = docblock(property.doc.as_deref());
    if block.has_tag("ignore") {
        return;
    }

    let prop = doc.prop_mut(&property.key);
    apply_docblock(prop, &block);

    match &property.value.kind {
        ExprKind::Object(config) => {
            let type_expr = config.get("type");
            if let Some(type_expr) = type_expr {
                prop.type_ = Some(type_from_constructor(type_expr));
                if prop.values.is_none() {
                    prop.values = prop_type_values(type_expr);
                }
            }
            if let Some(required) = config.get("required").and_then(Expr::as_bool) {
                prop.required = required;
            }
            if let Some(default) = config.get("default") {
                let is_func = prop.type_.as_ref().is_some_and(|ty| ty.name == "func");
                prop.default_value = Some(default_value(default, is_func));
            }
            if prop.values.is_none() {
                prop.values = config.get("validator").and_then(validator_values);
            }
        }
        _ => {
            prop.type_ = Some(type_from_constructor(&property.value));
            if prop.values.is_none() {
                prop.values = prop_type_values(&property.value);
            }
        }
    }
}

/// Description, tags and `@values` from a prop docblock.
pub(super) fn apply_docblock(prop: &mut PropDescriptor, block: &crate::jsdoc::DocBlock) {
    if block.description.is_some() {
        prop.description = block.description.clone();
    }
    if let Some(values) = block.values() {
        prop.values = Some(values);
    }
    merge_tags(&mut prop.tags, block.tag_map(&["values", "ignore"]));
}

/// Renders a default value as re-insertable source.
///
/// String literals are re-quoted with double quotes. Factory functions whose
/// body is a single return are replaced by the returned expression, unless
/// the prop itself is a function.
pub(crate) fn default_value(expr: &Expr, is_func: bool) -> DefaultValue {
    match &expr.kind {
        ExprKind::Str(value) => {
            let quoted = serde_json::to_string(value).unwrap_or_else(|_| expr.source.clone());
            DefaultValue::new(quoted, false)
        }
        ExprKind::Function(_) if is_func => DefaultValue::new(expr.source.clone(), false),
        ExprKind::Function(function) => match &function.returned {
            Some(returned) if function.returns_only => {
                let rendered = default_value(returned, false);
                DefaultValue::new(rendered.value, false)
            }
            _ => DefaultValue::new(expr.source.clone(), true),
        },
        ExprKind::Template
        | ExprKind::Number(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Array(_)
        | ExprKind::Object(_) => DefaultValue::new(expr.source.clone(), false),
        _ => DefaultValue::new(expr.source.clone(), true),
    }
}

/// Values of `String as PropType<'a' | 'b'>`.
fn prop_type_values(type_expr: &Expr) -> Option<Vec<String>> {
    match &type_expr.kind {
        ExprKind::TypeCast {
            type_annotation: TypeNode::Reference { name, arguments },
            ..
        } if name == "PropType" => arguments.first().and_then(literal_values),
        _ => None,
    }
}

/// Values checked by `validator: v => ['a', 'b'].includes(v)` or
/// `['a', 'b'].indexOf(v) !== -1`.
fn validator_values(validator: &Expr) -> Option<Vec<String>> {
    let function = validator.as_function()?;
    let returned = function.returned.as_deref()?;
    let call = match &returned.kind {
        ExprKind::Binary {
            left, operator, ..
        } if matches!(operator.as_str(), "!==" | "!=" | ">" | ">=") => left.as_ref(),
        _ => returned,
    };
    let ExprKind::Call { callee, .. } = &call.kind else {
        return None;
    };
    let ExprKind::Member { object, property } = &callee.kind else {
        return None;
    };
    if property != "includes" && property != "indexOf" {
        return None;
    }
    let ExprKind::Array(items) = &object.kind else {
        return None;
    };
    items
        .iter()
        .map(|item| match &item.kind {
            ExprKind::Str(value) => Some(value.clone()),
            ExprKind::Number(raw) => Some(raw.clone()),
            _ => None,
        })
        .collect()
}
