//! Batch loading of component files for a style guide.
//!
//! A [`ComponentLoader`] documents a set of files and attaches what the
//! style guide needs beside the records: a unique URL slug, the optional
//! `X.json` metadata side-file and whether an `X.md` examples file exists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::docgen::DocGen;
use crate::error::{DocgenError, Result};
use crate::model::Documentation;
use crate::options::ParseOptions;

/// GitHub-style heading slugs, unique within one slugger.
#[derive(Debug, Default, Clone)]
pub struct Slugger {
    occurrences: FxHashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `value`; repeated values get `-1`, `-2`, ... suffixes.
    pub fn slug(&mut self, value: &str) -> String {
        let base = slugify(value);
        let mut candidate = base.clone();
        while self.occurrences.contains_key(&candidate) {
            let count = self.occurrences.entry(base.clone()).or_default();
            *count += 1;
            candidate = format!("{base}-{count}");
        }
        self.occurrences.insert(candidate.clone(), 0);
        candidate
    }

    /// Forgets every slug handed out so far.
    pub fn reset(&mut self) {
        self.occurrences.clear();
    }
}

/// Lowercases and keeps letters, digits, `-` and `_`; whitespace becomes `-`.
pub fn slugify(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        })
        .collect()
}

/// State scoped to one loader run.
#[derive(Debug, Default)]
pub struct LoaderContext {
    pub slugger: Slugger,
}

impl LoaderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.slugger.reset();
    }
}

/// One documented component file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedComponent {
    /// Path relative to the loader root.
    pub filepath: PathBuf,
    pub slug: String,
    pub docs: Vec<Documentation>,
    /// Contents of the sibling `X.json`, `{}` when there is none.
    pub metadata: serde_json::Value,
    /// Whether a sibling `X.md` examples file exists.
    pub has_examples: bool,
}

/// Documents component files relative to a root directory.
#[derive(Debug, Clone)]
pub struct ComponentLoader {
    root: PathBuf,
    docgen: Arc<DocGen>,
    options: ParseOptions,
}

impl ComponentLoader {
    pub fn new(root: impl Into<PathBuf>, docgen: Arc<DocGen>, options: ParseOptions) -> Self {
        Self {
            root: root.into(),
            docgen,
            options,
        }
    }

    /// Loads `paths` with a fresh context.
    pub async fn load_all<I, P>(&self, paths: I) -> Result<Vec<LoadedComponent>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut ctx = LoaderContext::new();
        self.load_with(&mut ctx, paths).await
    }

    /// Loads `paths` concurrently; slugs are assigned in input order.
    pub async fn load_with<I, P>(&self, ctx: &mut LoaderContext, paths: I) -> Result<Vec<LoadedComponent>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(|p| self.root.join(p.as_ref())).collect();
        let loaded = try_join_all(paths.iter().map(|path| self.load_unslugged(path))).await?;

        Ok(loaded
            .into_iter()
            .map(|mut component| {
                let name = component
                    .docs
                    .first()
                    .and_then(|doc| doc.display_name.clone())
                    .unwrap_or_else(|| file_stem(&component.filepath));
                component.slug = ctx.slugger.slug(&name);
                component
            })
            .collect())
    }

    async fn load_unslugged(&self, path: &Path) -> Result<LoadedComponent> {
        let docs = self.docgen.parse_multi(path, &self.options).await?;
        let metadata = read_metadata(&path.with_extension("json")).await?;
        let has_examples = tokio::fs::try_exists(path.with_extension("md"))
            .await
            .unwrap_or(false);
        trace!(path = %path.display(), has_examples, "loaded component");

        Ok(LoadedComponent {
            filepath: path.strip_prefix(&self.root).unwrap_or(path).to_path_buf(),
            slug: String::new(),
            docs,
            metadata,
            has_examples,
        })
    }
}

async fn read_metadata(path: &Path) -> Result<serde_json::Value> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        Err(error) => {
            return Err(DocgenError::Io {
                path: path.to_path_buf(),
                error,
            });
        }
    };
    debug!(path = %path.display(), "reading component metadata");
    serde_json::from_str(&raw).map_err(|e| DocgenError::Metadata {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}
