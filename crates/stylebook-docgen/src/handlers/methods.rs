use async_trait::async_trait;

use super::{docblock, Handler, HandlerContext};
use crate::jsdoc::DocBlock;
use crate::model::{merge_tags, Documentation, ParamDescriptor, ReturnDescriptor, TypeDescriptor};
use crate::syntax::{ComponentDefinition, FunctionLit, MemberKind, PropertyKind};
use crate::types::type_from_annotation;
use crate::Result;

const PARAM_TAGS: &[&str] = &["param", "arg", "argument"];
const RETURN_TAGS: &[&str] = &["returns", "return"];

/// Documents methods tagged `@public`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MethodHandler;

#[async_trait]
impl Handler for MethodHandler {
    fn name(&self) -> &'static str {
        "methods"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        _ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let methods = definition
            .options()
            .and_then(|options| options.get("methods"))
            .and_then(|methods| methods.as_object());

        for property in methods.iter().flat_map(|object| object.properties.iter()) {
            if matches!(property.kind, PropertyKind::Spread | PropertyKind::Computed) {
                continue;
            }
            let Some(function) = property.value.as_function() else {
                continue;
            };
            document(doc, &property.key, property.doc.as_deref(), function, false);
        }

        if let Some(class) = definition.class() {
            for member in &class.members {
                if member.kind != MemberKind::Method {
                    continue;
                }
                if let Some(function) = &member.function {
                    document(doc, &member.name, member.doc.as_deref(), function, member.is_static);
                }
            }
        }
        Ok(())
    }
}

fn document(
    doc: &mut Documentation,
    name: &str,
    raw_doc: Option<&str>,
    function: &FunctionLit,
    is_static: bool,
) {
    let block = docblock(raw_doc);
    if !block.has_tag("public") {
        return;
    }

    let method = doc.method_mut(name);
    method.description = block.description.clone();
    method.params = params(&block, function);
    method.returns = returns(&block, function);
    if function.is_async {
        method.modifiers.push("async".to_string());
    }
    if is_static {
        method.modifiers.push("static".to_string());
    }

    let mut skip = vec!["public"];
    skip.extend_from_slice(PARAM_TAGS);
    skip.extend_from_slice(RETURN_TAGS);
    merge_tags(&mut method.tags, block.tag_map(&skip));
}

/// Signature params, completed by `@param` tags. Tag-only params are appended.
fn params(block: &DocBlock, function: &FunctionLit) -> Vec<ParamDescriptor> {
    let mut tagged = block.params(PARAM_TAGS);
    let mut params: Vec<ParamDescriptor> = function
        .params
        .iter()
        .map(|param| {
            let mut descriptor = ParamDescriptor::new(param.name.clone());
            descriptor.type_ = param.type_annotation.as_ref().map(type_from_annotation);
            if let Some(index) = tagged.iter().position(|tag| tag.name == param.name) {
                let tag = tagged.remove(index);
                descriptor.description = tag.description;
                if descriptor.type_.is_none() {
                    descriptor.type_ = tag.type_;
                }
            }
            descriptor
        })
        .collect();
    params.extend(tagged);
    params
}

fn returns(block: &DocBlock, function: &FunctionLit) -> Option<ReturnDescriptor> {
    let tag = block.tags_named(RETURN_TAGS).next();
    let type_ = tag
        .and_then(|tag| tag.type_hint.as_deref())
        .map(TypeDescriptor::named)
        .or_else(|| function.return_type.as_ref().map(type_from_annotation));
    let description = tag.and_then(|tag| tag.description.clone());
    (type_.is_some() || description.is_some()).then_some(ReturnDescriptor { type_, description })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::run;

    #[tokio::test]
    async fn documents_public_methods_only() {
        let doc = run(
            &MethodHandler,
            r#"
            export default {
              methods: {
                /**
                 * Focuses the input
                 * @public
                 * @param {boolean} select - select the content too
                 * @param {string} reason why focus was requested
                 * @returns {Promise<void>} resolved when focused
                 */
                async focus(select, delay: number = 0) {},
                /** Internal helper */
                helper() {},
              },
            }
            "#,
        )
        .await;

        assert_eq!(doc.methods.len(), 1);
        let focus = &doc.methods["focus"];
        assert_eq!(focus.description.as_deref(), Some("Focuses the input"));
        assert_eq!(focus.modifiers, ["async"]);

        let names: Vec<_> = focus.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["select", "delay", "reason"]);
        assert_eq!(focus.params[0].type_, Some(TypeDescriptor::named("boolean")));
        assert_eq!(focus.params[0].description.as_deref(), Some("select the content too"));
        assert_eq!(focus.params[1].type_, Some(TypeDescriptor::named("number")));

        let returns = focus.returns.as_ref().unwrap();
        assert_eq!(returns.type_, Some(TypeDescriptor::named("Promise<void>")));
        assert_eq!(returns.description.as_deref(), Some("resolved when focused"));
        assert!(focus.tags.is_empty());
    }

    #[tokio::test]
    async fn documents_class_methods() {
        let doc = run(
            &MethodHandler,
            r#"
            @Component
            export default class Form extends Vue {
              /** @public */
              reset(): void {}
              /** @public */
              static create() {}
              submit() {}
            }
            "#,
        )
        .await;
        let names: Vec<_> = doc.methods.keys().map(String::as_str).collect();
        assert_eq!(names, ["reset", "create"]);
        assert_eq!(
            doc.methods["reset"].returns.as_ref().and_then(|r| r.type_.clone()),
            Some(TypeDescriptor::named("void"))
        );
        assert_eq!(doc.methods["create"].modifiers, ["static"]);
    }
}
