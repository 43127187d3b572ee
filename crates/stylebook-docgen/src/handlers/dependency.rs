use async_trait::async_trait;
use tracing::debug;

use super::{default_handlers, default_pre_handlers, Handler, HandlerContext};
use crate::model::Documentation;
use crate::pipeline::{document_definition, document_dependency};
use crate::resolver::definition_from_expr;
use crate::syntax::{ComponentDefinition, Expr, ExprKind};
use crate::Result;

/// Base classes that carry no documentation.
const FRAMEWORK_BASES: &[&str] = &["Vue"];

/// Documents the component named in `extends` (or the class superclass)
/// before the local handlers run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtendsHandler;

#[async_trait]
impl Handler for ExtendsHandler {
    fn name(&self) -> &'static str {
        "extends"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        if !ctx.options.resolve_mixins {
            return Ok(());
        }
        let from_options = definition
            .options()
            .and_then(|options| options.get("extends"))
            .and_then(Expr::as_ident);
        let from_class = definition
            .class()
            .and_then(|class| class.super_class.as_deref())
            .and_then(Expr::as_ident)
            .filter(|name| !FRAMEWORK_BASES.contains(name));

        if let Some(name) = from_options.or(from_class) {
            absorb_reference(doc, name, ctx).await?;
        }
        Ok(())
    }
}

/// Documents every mixin listed in `mixins: [...]` or `extends Mixins(...)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MixinsHandler;

#[async_trait]
impl Handler for MixinsHandler {
    fn name(&self) -> &'static str {
        "mixins"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        if !ctx.options.resolve_mixins {
            return Ok(());
        }
        let mut names: Vec<&str> = Vec::new();
        if let Some(ExprKind::Array(items)) = definition
            .options()
            .and_then(|options| options.get("mixins"))
            .map(|mixins| &mixins.kind)
        {
            names.extend(items.iter().filter_map(Expr::as_ident));
        }
        if let Some(ExprKind::Call { callee, arguments }) = definition
            .class()
            .and_then(|class| class.super_class.as_deref())
            .map(|super_class| &super_class.kind)
        {
            if matches!(callee.as_ident(), Some("Mixins" | "mixins")) {
                names.extend(arguments.iter().filter_map(Expr::as_ident));
            }
        }

        for name in names {
            absorb_reference(doc, name, ctx).await?;
        }
        Ok(())
    }
}

/// Documents a local or imported component reference and folds its members
/// into `doc`.
async fn absorb_reference(doc: &mut Documentation, name: &str, ctx: &HandlerContext<'_>) -> Result<()> {
    let dependency = if let Some(import) = ctx.script.imports.get(name) {
        document_dependency(&import.source, &import.imported, ctx).await?
    } else if let Some(binding) = ctx.script.bindings.get(name) {
        document_local(&binding.value, ctx).await?
    } else {
        debug!(name, "unknown extends/mixins reference");
        None
    };

    if let Some(dependency) = dependency {
        absorb_members(doc, dependency);
    }
    Ok(())
}

async fn document_local(value: &Expr, ctx: &HandlerContext<'_>) -> Result<Option<Documentation>> {
    if ctx.depth >= ctx.options.max_mixin_depth {
        return Ok(None);
    }
    let Some(definition) = definition_from_expr(value, None) else {
        return Ok(None);
    };
    let local_ctx = HandlerContext {
        depth: ctx.depth + 1,
        ..*ctx
    };
    let doc = document_definition(
        &definition,
        &local_ctx,
        &default_pre_handlers(),
        &default_handlers(),
        Documentation::new(),
    )
    .await?;
    Ok(Some(doc))
}

/// Inherited members only: names, descriptions and tags of the dependency
/// itself are not part of the documented component.
fn absorb_members(doc: &mut Documentation, dependency: Documentation) {
    let Documentation {
        props,
        methods,
        events,
        slots,
        computed,
        data,
        model,
        ..
    } = dependency;
    doc.merge(Documentation {
        props,
        methods,
        events,
        slots,
        computed,
        data,
        model,
        ..Documentation::default()
    });
}
