#![deny(clippy::all)]

//! Static documentation extraction for Vue-style components.
//!
//! This crate provides:
//! - An owned syntax model lowered from the OXC AST, cached by content hash.
//! - A resolver that finds component definitions among a module's exports:
//!   options objects, `defineComponent`/`Vue.extend` wrappers and decorated
//!   classes.
//! - A handler pipeline filling a [`Documentation`] record with props, data,
//!   computed values, methods, events, slots and the `v-model` binding.
//! - Template scanning for `.vue` files and a loader that adds slugs and
//!   metadata side-files for style guides.
//!
//! ```rust,no_run
//! use stylebook_docgen::{DocGen, ParseOptions};
//!
//! # async fn run() -> stylebook_docgen::Result<()> {
//! let doc = DocGen::new()
//!     .parse("src/components/Button.vue", &ParseOptions::default())
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod docgen;
pub mod error;
pub mod handlers;
pub mod jsdoc;
pub mod loader;
pub mod model;
pub mod options;
mod pipeline;
pub mod resolver;
pub mod syntax;
pub mod template;
pub mod types;

pub use cache::{CacheStats, ParseCache};
pub use config::DocgenConfig;
pub use docgen::DocGen;
pub use error::{DocgenError, Result};
pub use handlers::{Handler, HandlerContext};
pub use loader::{ComponentLoader, LoadedComponent, LoaderContext, Slugger};
pub use model::{
    ComputedDescriptor, DataDescriptor, DefaultValue, Documentation, EventDescriptor,
    MethodDescriptor, ModelDescriptor, ParamDescriptor, PropDescriptor, ReturnDescriptor,
    SlotDescriptor, Tag, TypeDescriptor,
};
pub use options::ParseOptions;
pub use syntax::{ComponentDefinition, Lang};
