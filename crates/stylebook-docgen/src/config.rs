//! Layered configuration for documentation extraction.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::cache::ParseCache;
use crate::error::{DocgenError, Result};
use crate::options::{ParseOptions, DEFAULT_MAX_MIXIN_DEPTH};
use crate::syntax::Lang;

/// File picked up from the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "stylebook.config.json";

/// Prefix of environment overrides (`STYLEBOOK_JSX=true`, ...).
pub const ENV_PREFIX: &str = "STYLEBOOK_";

/// Extraction settings shared by every documented file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocgenConfig {
    /// Annotation dialect; inferred from the file extension when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<Lang>,
    pub jsx: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_filter: Option<Vec<String>>,
    /// Maximum number of cached scripts. Unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
    pub resolve_mixins: bool,
    pub max_mixin_depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_extends: Option<Vec<PathBuf>>,
}

impl Default for DocgenConfig {
    fn default() -> Self {
        Self {
            lang: None,
            jsx: false,
            name_filter: None,
            cache_capacity: None,
            resolve_mixins: true,
            max_mixin_depth: DEFAULT_MAX_MIXIN_DEPTH,
            valid_extends: None,
        }
    }
}

impl DocgenConfig {
    /// Load configuration from multiple sources.
    /// Priority: environment variables > config file > defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(config_path)?)
    }

    /// The layered sources, without extracting them.
    pub fn figment(config_path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(DocgenError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };
        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        // Merge environment variables (STYLEBOOK_JSX, STYLEBOOK_MAX_MIXIN_DEPTH, etc.)
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).map(|key| env_key(key.as_str()).into())))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| DocgenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cache_capacity == Some(0) {
            return Err(DocgenError::Config(
                "cacheCapacity must be at least 1 (omit it for an unbounded cache)".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for documenting `file_path`.
    pub fn to_parse_options(&self, file_path: impl Into<PathBuf>) -> ParseOptions {
        ParseOptions {
            file_path: file_path.into(),
            lang: self.lang,
            jsx: self.jsx,
            name_filter: self.name_filter.clone(),
            resolve_mixins: self.resolve_mixins,
            max_mixin_depth: self.max_mixin_depth,
            valid_extends: self.valid_extends.clone(),
        }
    }

    /// A fresh cache honoring `cacheCapacity`.
    pub fn build_cache(&self) -> Arc<ParseCache> {
        let capacity = self.cache_capacity.and_then(NonZeroUsize::new);
        Arc::new(ParseCache::with_capacity(capacity))
    }
}

const FIELDS: &[&str] = &[
    "lang",
    "jsx",
    "nameFilter",
    "cacheCapacity",
    "resolveMixins",
    "maxMixinDepth",
    "validExtends",
];

/// Maps a lowercased environment key (`max_mixin_depth`) to its field name.
fn env_key(key: &str) -> String {
    let compact = key.replace('_', "");
    FIELDS
        .iter()
        .find(|field| field.eq_ignore_ascii_case(&compact))
        .map_or(compact, |field| field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parse_options() {
        let config = DocgenConfig::default();
        assert_eq!(config.to_parse_options("A.vue"), ParseOptions::new("A.vue"));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{ "lang": "flow", "jsx": true, "nameFilter": ["Button"], "cacheCapacity": 64 }"#,
        )
        .unwrap();

        let figment = Figment::new()
            .merge(Serialized::defaults(DocgenConfig::default()))
            .merge(Json::file(&path));
        let config = DocgenConfig::from_figment(figment).unwrap();
        assert_eq!(config.lang, Some(Lang::Flow));
        assert!(config.jsx);
        assert_eq!(config.name_filter, Some(vec!["Button".to_string()]));
        assert!(config.resolve_mixins);

        let options = config.to_parse_options("src/Button.js");
        assert_eq!(options.lang, Some(Lang::Flow));
        assert_eq!(options.max_mixin_depth, DEFAULT_MAX_MIXIN_DEPTH);
    }

    #[test]
    fn maps_environment_keys_to_fields() {
        assert_eq!(env_key("max_mixin_depth"), "maxMixinDepth");
        assert_eq!(env_key("resolvemixins"), "resolveMixins");
        assert_eq!(env_key("jsx"), "jsx");
        assert_eq!(env_key("unknown_key"), "unknownkey");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocgenConfig::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, DocgenError::Config(_)));
    }

    #[test]
    fn rejects_zero_capacity() {
        let figment = Figment::new()
            .merge(Serialized::defaults(DocgenConfig::default()))
            .merge(Json::string(r#"{ "cacheCapacity": 0 }"#));
        assert!(matches!(
            DocgenConfig::from_figment(figment),
            Err(DocgenError::Config(_))
        ));
    }

    #[test]
    fn rejects_wrong_types() {
        let figment = Figment::new()
            .merge(Serialized::defaults(DocgenConfig::default()))
            .merge(Json::string(r#"{ "jsx": "sometimes" }"#));
        assert!(DocgenConfig::from_figment(figment).is_err());
    }
}
