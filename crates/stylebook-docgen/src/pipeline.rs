//! Handler pipeline: resolve definitions, run pre-handlers then handlers,
//! stamp the export name.

use std::path::{Component, Path, PathBuf};

use futures::future::{try_join_all, BoxFuture};
use stylebook_sfc::parse_sfc;
use tracing::{debug, trace, warn};

use crate::cache::ParseCache;
use crate::error::{DocgenError, Result};
use crate::handlers::{default_handlers, default_pre_handlers, Handler, HandlerContext};
use crate::model::Documentation;
use crate::options::ParseOptions;
use crate::resolver::resolve_exports;
use crate::syntax::{ComponentDefinition, Imported, ParsedScript};

/// The blocks of a component file the pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ComponentSource {
    /// Script text and its `lang` attribute.
    pub script: Option<(String, Option<String>)>,
    /// `true` when the script came from `<script setup>`.
    pub script_setup: bool,
    pub template: Option<String>,
    pub docs: Vec<String>,
}

impl ComponentSource {
    /// Splits `.vue` files into blocks; any other file is a plain script.
    pub(crate) fn split(path: &Path, source: &str) -> Result<Self> {
        if path.extension().and_then(|ext| ext.to_str()) != Some("vue") {
            return Ok(Self {
                script: Some((source.to_string(), None)),
                ..Self::default()
            });
        }

        let sfc = parse_sfc(source).map_err(|source| DocgenError::Sfc {
            path: path.to_path_buf(),
            source,
        })?;
        let script_setup = sfc.script.is_none() && sfc.script_setup.is_some();
        let script = sfc
            .script
            .or(sfc.script_setup)
            .map(|block| (block.content.to_string(), Some(block.lang.to_string())));
        Ok(Self {
            script,
            script_setup,
            template: sfc.template.map(|block| block.content.to_string()),
            docs: sfc.docs.iter().map(|block| block.content.trim().to_string()).collect(),
        })
    }
}

/// Parses a script through the cache.
pub(crate) fn parse_through_cache(
    cache: &ParseCache,
    options: &ParseOptions,
    source: &str,
    script_lang: Option<&str>,
) -> Result<std::sync::Arc<ParsedScript>> {
    cache
        .get_or_parse(source, options.grammar(script_lang))
        .map_err(|diagnostics| DocgenError::parse_error(options.file_path.clone(), &diagnostics))
}

/// Documents every qualifying export of `script`, in resolver order.
///
/// With `existing` set only one export may qualify; its record starts from
/// `existing`.
pub(crate) async fn document_exports(
    script: &ParsedScript,
    ctx_options: &ParseOptions,
    cache: &ParseCache,
    pre_handlers: &[Box<dyn Handler>],
    handlers: &[Box<dyn Handler>],
    existing: Option<Documentation>,
    depth: usize,
) -> Result<Vec<Documentation>> {
    let definitions: Vec<(String, ComponentDefinition)> = resolve_exports(script)
        .into_iter()
        .filter(|(name, _)| ctx_options.accepts_export(name))
        .collect();

    if definitions.is_empty() {
        return Err(DocgenError::NoDefinition {
            path: ctx_options.file_path.clone(),
        });
    }
    if existing.is_some() && definitions.len() > 1 {
        return Err(DocgenError::MultipleExports {
            path: ctx_options.file_path.clone(),
            count: definitions.len(),
        });
    }
    debug!(
        file = %ctx_options.file_path.display(),
        exports = ?definitions.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
        "resolved component definitions"
    );

    let ctx = HandlerContext {
        script,
        options: ctx_options,
        cache,
        depth,
    };
    let ctx = &ctx;
    let existing = &existing;
    try_join_all(definitions.iter().map(|(name, definition)| async move {
        let initial = existing.clone().unwrap_or_default();
        let mut doc = document_definition(definition, ctx, pre_handlers, handlers, initial).await?;
        doc.export_name = name.clone();
        Ok::<_, DocgenError>(doc)
    }))
    .await
}

/// Runs the pre-handlers in order, then the handlers concurrently.
pub(crate) async fn document_definition(
    definition: &ComponentDefinition,
    ctx: &HandlerContext<'_>,
    pre_handlers: &[Box<dyn Handler>],
    handlers: &[Box<dyn Handler>],
    initial: Documentation,
) -> Result<Documentation> {
    let mut doc = initial;
    for handler in pre_handlers {
        trace!(handler = handler.name(), "running pre-handler");
        handler.handle(&mut doc, definition, ctx).await?;
    }

    let scratches = try_join_all(handlers.iter().map(|handler| async move {
        trace!(handler = handler.name(), "running handler");
        let mut scratch = Documentation::new();
        handler.handle(&mut scratch, definition, ctx).await?;
        Ok::<_, DocgenError>(scratch)
    }))
    .await?;

    for scratch in scratches {
        doc.merge(scratch);
    }
    Ok(doc)
}

/// Documents the component an `extends`/`mixins` import points at.
///
/// Returns `Ok(None)` when the dependency cannot be followed: package
/// imports, files outside `validExtends`, missing files and exports that are
/// not components are skipped.
pub(crate) fn document_dependency<'a>(
    specifier: &'a str,
    imported: &'a Imported,
    ctx: &'a HandlerContext<'a>,
) -> BoxFuture<'a, Result<Option<Documentation>>> {
    Box::pin(async move {
        if ctx.depth >= ctx.options.max_mixin_depth {
            debug!(specifier, depth = ctx.depth, "mixin depth limit reached");
            return Ok(None);
        }
        if !specifier.starts_with('.') {
            trace!(specifier, "skipping package import");
            return Ok(None);
        }
        let export_name = match imported {
            Imported::Default => "default",
            Imported::Named(name) => name.as_str(),
            Imported::Namespace => return Ok(None),
        };

        let base = ctx.options.file_path.parent().unwrap_or_else(|| Path::new(""));
        let Some(path) = resolve_relative(&normalize(&base.join(specifier))).await else {
            warn!(
                specifier,
                from = %ctx.options.file_path.display(),
                "could not resolve extended component or mixin"
            );
            return Ok(None);
        };
        if !ctx.options.accepts_dependency(&path) {
            debug!(path = %path.display(), "dependency outside validExtends");
            return Ok(None);
        }

        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|error| DocgenError::Io {
                path: path.clone(),
                error,
            })?;
        let component = ComponentSource::split(&path, &source)?;
        let Some((script_source, lang)) = component.script else {
            return Ok(None);
        };

        let options = ctx.options.for_file(&path);
        let script = parse_through_cache(ctx.cache, &options, &script_source, lang.as_deref())?;
        let definitions = resolve_exports(&script);
        let Some(definition) = definitions.get(export_name) else {
            debug!(path = %path.display(), export = export_name, "dependency export is not a component");
            return Ok(None);
        };

        let dep_ctx = HandlerContext {
            script: &script,
            options: &options,
            cache: ctx.cache,
            depth: ctx.depth + 1,
        };
        let doc = document_definition(
            definition,
            &dep_ctx,
            &default_pre_handlers(),
            &default_handlers(),
            Documentation::new(),
        )
        .await?;
        Ok(Some(doc))
    })
}

/// Extensions tried, in order, for extension-less imports.
const RESOLVE_EXTENSIONS: &[&str] = &["vue", "ts", "js", "tsx", "jsx"];

async fn resolve_relative(candidate: &Path) -> Option<PathBuf> {
    if is_file(candidate).await {
        return Some(candidate.to_path_buf());
    }
    for ext in RESOLVE_EXTENSIONS {
        let mut with_ext = candidate.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(ext);
        let with_ext = PathBuf::from(with_ext);
        if is_file(&with_ext).await {
            return Some(with_ext);
        }
    }
    for ext in RESOLVE_EXTENSIONS {
        let index = candidate.join(format!("index.{ext}"));
        if is_file(&index).await {
            return Some(index);
        }
    }
    None
}

/// Resolves `.` and `..` lexically so prefix checks see the real location.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
