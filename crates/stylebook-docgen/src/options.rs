use std::path::{Path, PathBuf};

use crate::syntax::{Grammar, Lang};

/// Default nesting limit for extends/mixins resolution.
pub const DEFAULT_MAX_MIXIN_DEPTH: usize = 4;

/// Per-file extraction options.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Path of the documented file. Used for errors, relative imports and
    /// the fallback display name.
    pub file_path: PathBuf,
    /// Annotation dialect. Inferred from the file when `None`.
    pub lang: Option<Lang>,
    /// Force JSX parsing for files whose extension does not imply it.
    pub jsx: bool,
    /// Only document exports with these names.
    pub name_filter: Option<Vec<String>>,
    /// Follow `extends` and `mixins` imports.
    pub resolve_mixins: bool,
    pub max_mixin_depth: usize,
    /// Path prefixes extends/mixins files must live under.
    pub valid_extends: Option<Vec<PathBuf>>,
}

impl ParseOptions {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            lang: None,
            jsx: false,
            name_filter: None,
            resolve_mixins: true,
            max_mixin_depth: DEFAULT_MAX_MIXIN_DEPTH,
            valid_extends: None,
        }
    }

    /// Same options for another file.
    pub fn for_file(&self, file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..self.clone()
        }
    }

    pub fn with_lang(mut self, lang: Lang) -> Self {
        self.lang = Some(lang);
        self
    }

    pub fn with_jsx(mut self, jsx: bool) -> Self {
        self.jsx = jsx;
        self
    }

    pub fn with_name_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_filter = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Grammar for a script, from the file extension and an optional
    /// `<script lang>` attribute. Without an explicit `lang`, only `ts` and
    /// `tsx` select TypeScript.
    pub fn grammar(&self, script_lang: Option<&str>) -> Grammar {
        let ext = script_lang.or_else(|| extension(&self.file_path));
        let lang = self.lang.unwrap_or(match ext {
            Some("ts" | "tsx" | "typescript") => Lang::Ts,
            _ => Lang::Flow,
        });
        let jsx = self.jsx || matches!(ext, Some("tsx" | "jsx"));
        Grammar::new(lang, jsx)
    }

    /// Whether `name` passes the export name filter.
    pub fn accepts_export(&self, name: &str) -> bool {
        self.name_filter
            .as_ref()
            .is_none_or(|names| names.iter().any(|n| n == name))
    }

    /// Whether an extended component or mixin at `path` may be followed.
    pub fn accepts_dependency(&self, path: &Path) -> bool {
        self.valid_extends
            .as_ref()
            .is_none_or(|prefixes| prefixes.iter().any(|prefix| path.starts_with(prefix)))
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_follows_extension_and_script_lang() {
        let options = ParseOptions::new("Button.tsx");
        assert_eq!(options.grammar(None), Grammar::new(Lang::Ts, true));

        let options = ParseOptions::new("Button.vue");
        assert_eq!(options.grammar(Some("ts")), Grammar::new(Lang::Ts, false));
        assert_eq!(options.grammar(Some("jsx")), Grammar::new(Lang::Ts, true));

        let options = ParseOptions::new("Button.js").with_lang(Lang::Flow).with_jsx(true);
        assert_eq!(options.grammar(None), Grammar::new(Lang::Flow, true));
    }

    #[test]
    fn plain_scripts_default_to_flow() {
        assert_eq!(
            ParseOptions::new("Button.js").grammar(None),
            Grammar::new(Lang::Flow, false)
        );
        assert_eq!(
            ParseOptions::new("Button.jsx").grammar(None),
            Grammar::new(Lang::Flow, true)
        );
        // `<script>` without `lang` reports "js"
        let vue = ParseOptions::new("Button.vue");
        assert_eq!(vue.grammar(Some("js")), Grammar::new(Lang::Flow, false));
        assert_eq!(vue.grammar(None), Grammar::new(Lang::Flow, false));

        let forced = ParseOptions::new("Button.js").with_lang(Lang::Ts);
        assert_eq!(forced.grammar(None), Grammar::new(Lang::Ts, false));
    }

    #[test]
    fn name_filter_limits_exports() {
        let options = ParseOptions::new("a.js").with_name_filter(["Button"]);
        assert!(options.accepts_export("Button"));
        assert!(!options.accepts_export("default"));
        assert!(ParseOptions::new("a.js").accepts_export("anything"));
    }

    #[test]
    fn valid_extends_limits_dependencies() {
        let mut options = ParseOptions::new("src/a.vue");
        assert!(options.accepts_dependency(Path::new("/anywhere/mixin.js")));
        options.valid_extends = Some(vec![PathBuf::from("src")]);
        assert!(options.accepts_dependency(Path::new("src/mixins/a.js")));
        assert!(!options.accepts_dependency(Path::new("node_modules/lib/a.js")));
    }
}
