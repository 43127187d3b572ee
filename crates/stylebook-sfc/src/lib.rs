#![deny(clippy::all)]

//! Block splitting for Vue single file components.
//!
//! The documentation extractor only needs to know where the `<script>`,
//! `<template>` and `<docs>` blocks of a `.vue` file live. This crate finds
//! them with plain byte scanning (memchr), enforces size limits, and never
//! panics on malformed input.
//!
//! ```rust
//! use stylebook_sfc::parse_sfc;
//!
//! let sfc = parse_sfc("<template><div /></template><script>export default {}</script>").unwrap();
//! assert_eq!(sfc.script.unwrap().content, "export default {}");
//! ```

mod common;
mod vue;

pub use common::{BlockKind, Extractor, SfcBlock, SfcError, MAX_BLOCKS, MAX_FILE_SIZE};
pub use vue::VueExtractor;

/// The blocks of one single file component that matter for documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfcDescriptor<'a> {
    /// First regular `<script>` block
    pub script: Option<SfcBlock<'a>>,
    /// First `<script setup>` block
    pub script_setup: Option<SfcBlock<'a>>,
    /// Outermost `<template>` block
    pub template: Option<SfcBlock<'a>>,
    /// Every `<docs>` block, in document order
    pub docs: Vec<SfcBlock<'a>>,
}

/// Splits a `.vue` source into its documentation-relevant blocks.
pub fn parse_sfc(source: &str) -> Result<SfcDescriptor<'_>, SfcError> {
    let mut descriptor = SfcDescriptor::default();
    for block in VueExtractor.extract(source)? {
        match block.kind {
            BlockKind::Script if descriptor.script.is_none() => descriptor.script = Some(block),
            BlockKind::ScriptSetup if descriptor.script_setup.is_none() => {
                descriptor.script_setup = Some(block)
            }
            BlockKind::Template if descriptor.template.is_none() => {
                descriptor.template = Some(block)
            }
            BlockKind::Docs => descriptor.docs.push(block),
            _ => {}
        }
    }
    Ok(descriptor)
}
