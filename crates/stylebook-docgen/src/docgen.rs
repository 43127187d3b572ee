use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cache::ParseCache;
use crate::config::DocgenConfig;
use crate::error::{DocgenError, Result};
use crate::handlers::{default_handlers, default_pre_handlers, Handler};
use crate::model::Documentation;
use crate::options::ParseOptions;
use crate::pipeline::{document_exports, parse_through_cache, ComponentSource};
use crate::template::document_template;

const DEFAULT_EXPORT: &str = "default";

/// Extracts documentation records from component files.
///
/// Holds the handler lists and the parse cache; cheap to share between
/// tasks behind an `Arc`.
pub struct DocGen {
    cache: Arc<ParseCache>,
    pre_handlers: Vec<Box<dyn Handler>>,
    handlers: Vec<Box<dyn Handler>>,
}

impl DocGen {
    /// Default handlers over the process-wide cache.
    pub fn new() -> Self {
        Self {
            cache: ParseCache::global(),
            pre_handlers: default_pre_handlers(),
            handlers: default_handlers(),
        }
    }

    /// Default handlers over a cache sized by `config`.
    pub fn from_config(config: &DocgenConfig) -> Self {
        Self::new().with_cache(config.build_cache())
    }

    pub fn with_cache(mut self, cache: Arc<ParseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replaces the sequential pre-handlers.
    pub fn with_pre_handlers(mut self, pre_handlers: Vec<Box<dyn Handler>>) -> Self {
        self.pre_handlers = pre_handlers;
        self
    }

    /// Replaces the concurrent handlers.
    pub fn with_handlers(mut self, handlers: Vec<Box<dyn Handler>>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Appends a handler after the defaults.
    pub fn add_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn cache(&self) -> &Arc<ParseCache> {
        &self.cache
    }

    /// Documents the single component exported by the file at `path`.
    ///
    /// Fails with [`DocgenError::MultipleExports`] when several exports
    /// qualify; use [`DocGen::parse_multi`] for those files.
    pub async fn parse(&self, path: impl AsRef<Path>, options: &ParseOptions) -> Result<Documentation> {
        let options = options.for_file(path.as_ref());
        let source = read_source(&options.file_path).await?;
        self.parse_source(&source, &options).await
    }

    /// Documents every component exported by the file at `path`.
    pub async fn parse_multi(&self, path: impl AsRef<Path>, options: &ParseOptions) -> Result<Vec<Documentation>> {
        let options = options.for_file(path.as_ref());
        let source = read_source(&options.file_path).await?;
        self.parse_multi_source(&source, &options).await
    }

    /// Documents the single component in `source`; `options.file_path`
    /// names the file it came from.
    pub async fn parse_source(&self, source: &str, options: &ParseOptions) -> Result<Documentation> {
        let mut docs = self.document(source, options, Some(Documentation::new())).await?;
        match docs.len() {
            1 => Ok(docs.remove(0)),
            count => Err(DocgenError::MultipleExports {
                path: options.file_path.clone(),
                count,
            }),
        }
    }

    /// Documents every component in `source`, in export order.
    pub async fn parse_multi_source(&self, source: &str, options: &ParseOptions) -> Result<Vec<Documentation>> {
        self.document(source, options, None).await
    }

    async fn document(
        &self,
        source: &str,
        options: &ParseOptions,
        existing: Option<Documentation>,
    ) -> Result<Vec<Documentation>> {
        debug!(file = %options.file_path.display(), "documenting component file");
        let component = ComponentSource::split(&options.file_path, source)?;

        let mut docs = match &component.script {
            Some((script, lang)) => {
                let parsed = parse_through_cache(&self.cache, options, script, lang.as_deref())?;
                let documented = document_exports(
                    &parsed,
                    options,
                    &self.cache,
                    &self.pre_handlers,
                    &self.handlers,
                    existing.clone(),
                    0,
                )
                .await;
                match documented {
                    Err(DocgenError::NoDefinition { .. }) if component.script_setup => {
                        debug!(file = %options.file_path.display(), "script setup without options, documenting template only");
                        vec![template_only(existing)]
                    }
                    result => result?,
                }
            }
            None => vec![template_only(existing)],
        };

        let target = docs
            .iter()
            .position(|doc| doc.export_name == DEFAULT_EXPORT)
            .unwrap_or(0);
        if let Some(doc) = docs.get_mut(target) {
            if let Some(template) = &component.template {
                document_template(doc, template);
            }
            doc.docs_blocks.extend(component.docs.iter().cloned());
        }

        for doc in &mut docs {
            if doc.display_name.is_none() {
                doc.display_name = Some(fallback_display_name(doc, &options.file_path));
            }
        }
        Ok(docs)
    }
}

impl Default for DocGen {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocGen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |handlers: &[Box<dyn Handler>]| handlers.iter().map(|h| h.name()).collect::<Vec<_>>();
        f.debug_struct("DocGen")
            .field("cache", &self.cache)
            .field("pre_handlers", &names(&self.pre_handlers))
            .field("handlers", &names(&self.handlers))
            .finish()
    }
}

async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|error| DocgenError::Io {
            path: path.to_path_buf(),
            error,
        })
}

fn template_only(existing: Option<Documentation>) -> Documentation {
    let mut doc = existing.unwrap_or_default();
    doc.export_name = DEFAULT_EXPORT.to_string();
    doc
}

/// File stem for the default export, the export name otherwise.
fn fallback_display_name(doc: &Documentation, path: &Path) -> String {
    if doc.export_name != DEFAULT_EXPORT {
        return doc.export_name.clone();
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(DEFAULT_EXPORT)
        .to_string()
}
