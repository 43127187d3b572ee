//! Common types for single file component block extraction.

/// A top-level block found in a single file component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcBlock<'a> {
    /// Raw text between the opening and closing tag
    pub content: &'a str,

    /// Byte offset of `content` from the start of the original file
    ///
    /// Used to translate parse errors back to the original file location.
    pub offset: usize,

    /// Which kind of block this is
    pub kind: BlockKind,

    /// Language identifier from the `lang` attribute (js, ts, jsx, tsx, html, ...)
    pub lang: &'a str,
}

impl<'a> SfcBlock<'a> {
    /// Creates a new block with the given parameters.
    pub fn new(content: &'a str, offset: usize, kind: BlockKind, lang: &'a str) -> Self {
        Self {
            content,
            offset,
            kind,
            lang,
        }
    }

    /// Returns `true` for `lang="ts"` / `lang="tsx"` blocks.
    pub fn is_typescript(&self) -> bool {
        matches!(self.lang, "ts" | "tsx" | "typescript")
    }

    /// Returns `true` for `lang="jsx"` / `lang="tsx"` blocks.
    pub fn is_jsx(&self) -> bool {
        matches!(self.lang, "jsx" | "tsx")
    }
}

/// Kind of a top-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Regular `<script>` block (options API, class components)
    Script,
    /// `<script setup>` block (composition API sugar)
    ScriptSetup,
    /// The outermost `<template>` block
    Template,
    /// Custom `<docs>` block holding markdown documentation
    Docs,
    /// `<style>` blocks
    Style,
    /// Any other custom block (`<i18n>`, ...)
    Custom,
}

/// Errors produced while splitting a component into blocks.
#[derive(Debug, thiserror::Error)]
pub enum SfcError {
    /// File exceeds maximum allowed size
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        /// Actual file size in bytes
        size: usize,
        /// Maximum allowed size in bytes
        max: usize,
    },

    /// Too many top-level blocks found in the file
    #[error("Too many blocks: {count} found (max: {max} allowed)")]
    TooManyBlocks {
        /// Number of blocks found
        count: usize,
        /// Maximum allowed blocks
        max: usize,
    },

    /// Block opened but never closed
    #[error("Unclosed <{tag}> block starting at byte position {position}")]
    UnclosedBlock {
        /// Tag name of the unclosed block
        tag: String,
        /// Byte position where the unclosed tag begins
        position: usize,
    },

    /// HTML comment opened but never closed
    #[error("Unclosed comment starting at byte position {position}")]
    UnclosedComment {
        /// Byte position where the comment begins
        position: usize,
    },
}

/// Trait for single file component block extractors.
pub trait Extractor {
    /// Split the given source into its top-level blocks, in document order.
    fn extract<'a>(&self, source: &'a str) -> Result<Vec<SfcBlock<'a>>, SfcError>;

    /// Get the file extension this extractor handles (e.g. ".vue").
    fn file_extension(&self) -> &'static str;
}

/// Maximum file size in bytes (10 MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of top-level blocks to process
pub const MAX_BLOCKS: usize = 100;
