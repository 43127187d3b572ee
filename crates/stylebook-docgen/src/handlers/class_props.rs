use async_trait::async_trait;

use super::props::apply_docblock;
use super::{default_value, docblock, Handler, HandlerContext};
use crate::error::DocgenError;
use crate::model::Documentation;
use crate::syntax::{ClassMember, ComponentDefinition, DecoratorNode, Expr, ExprKind, MemberKind};
use crate::types::{literal_values, structured_type_from_annotation, type_from_constructor};
use crate::Result;

/// Decorators that declare a prop on a class member.
pub(crate) const PROP_DECORATORS: &[&str] = &["Prop", "PropSync", "Model", "ModelSync"];

/// Typed arguments of a prop decorator, parsed once per member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropDecoratorConfig {
    /// Prop name when it differs from the member name (`@PropSync('value')`).
    pub name: Option<String>,
    pub default: Option<Expr>,
    pub required: Option<bool>,
    /// Runtime type (`String`, `[String, Number]`).
    pub type_expr: Option<Expr>,
}

impl PropDecoratorConfig {
    /// Parses the arguments of `@Prop`, `@PropSync` or `@Model`.
    ///
    /// Returns a message describing the first argument shape that cannot be
    /// documented.
    pub fn from_decorator(decorator: &DecoratorNode) -> std::result::Result<Self, String> {
        let mut args = decorator.arguments.iter();
        let mut config = Self::default();

        match decorator.name.as_str() {
            "PropSync" | "Model" | "ModelSync" => {
                let Some(first) = args.next() else {
                    if decorator.name == "PropSync" {
                        return Err("@PropSync requires the prop name".to_string());
                    }
                    return Ok(config);
                };
                let Some(value) = first.as_str() else {
                    return Err(format!(
                        "@{} expects a string literal as first argument, found `{}`",
                        decorator.name, first.source
                    ));
                };
                if decorator.name == "PropSync" {
                    config.name = Some(value.to_string());
                }
            }
            _ => {}
        }

        if let Some(options) = args.next() {
            config.apply_options(options, &decorator.name)?;
        }
        Ok(config)
    }

    fn apply_options(&mut self, options: &Expr, decorator: &str) -> std::result::Result<(), String> {
        match &options.kind {
            ExprKind::Object(object) => {
                self.type_expr = object.get("type").cloned();
                self.default = object.get("default").cloned();
                self.required = object.get("required").and_then(Expr::as_bool);
                Ok(())
            }
            ExprKind::Ident(_) | ExprKind::Array(_) | ExprKind::TypeCast { .. } => {
                self.type_expr = Some(options.clone());
                Ok(())
            }
            _ => Err(format!(
                "unsupported @{decorator} argument `{}`",
                options.source
            )),
        }
    }
}

/// Documents class members decorated with `@Prop`, `@PropSync` or `@Model`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassPropHandler;

#[async_trait]
impl Handler for ClassPropHandler {
    fn name(&self) -> &'static str {
        "classProps"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let Some(class) = definition.class() else {
            return Ok(());
        };

        for member in &class.members {
            if member.kind != MemberKind::Field {
                continue;
            }
            let Some(decorator) = member.decorator(PROP_DECORATORS) else {
                continue;
            };
            let config = PropDecoratorConfig::from_decorator(decorator).map_err(|message| {
                DocgenError::handler(self.name(), &ctx.options.file_path, message)
            })?;
            document_member(doc, member, &config);
        }
        Ok(())
    }
}

/// Prop names declared by decorated members of a class component. These
/// take precedence over `props` entries in the `@Component` options.
pub(crate) fn decorated_prop_names(definition: &ComponentDefinition) -> Vec<String> {
    let Some(class) = definition.class() else {
        return Vec::new();
    };
    class
        .members
        .iter()
        .filter(|member| member.kind == MemberKind::Field)
        .filter_map(|member| {
            let decorator = member.decorator(PROP_DECORATORS)?;
            let config = PropDecoratorConfig::from_decorator(decorator).ok()?;
            Some(config.name.unwrap_or_else(|| member.name.clone()))
        })
        .collect()
}

fn document_member(doc: &mut Documentation, member: &ClassMember, config: &PropDecoratorConfig) {
    let block = docblock(member.doc.as_deref());
    if block.has_tag("ignore") {
        return;
    }

    let name = config.name.as_deref().unwrap_or(&member.name);
    let prop = doc.prop_mut(name);

    if let Some(annotation) = &member.type_annotation {
        prop.type_ = Some(structured_type_from_annotation(annotation));
        prop.values = literal_values(annotation);
    }
    if let Some(type_expr) = &config.type_expr {
        prop.type_ = Some(type_from_constructor(type_expr));
    }
    if let Some(required) = config.required {
        prop.required = required;
    }
    if let Some(default) = &config.default {
        let is_func = prop.type_.as_ref().is_some_and(|ty| ty.name == "func");
        prop.default_value = Some(default_value(default, is_func));
    }
    apply_docblock(prop, &block);
}
