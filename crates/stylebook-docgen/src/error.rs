use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for documentation extraction.
pub type Result<T> = std::result::Result<T, DocgenError>;

/// Message used when a file contains no recognizable component export.
pub const ERROR_MISSING_DEFINITION: &str = "No suitable component definition found";

/// Error variants for documentation extraction.
#[derive(Debug, Error)]
pub enum DocgenError {
    /// Failed to read or access a source file.
    #[error("failed to read source '{path}': {error}")]
    Io {
        /// Path to the source file that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// Parsing the script with OXC failed.
    #[error("failed to parse source '{path}': {message}")]
    Parse {
        /// Path to the source file.
        path: PathBuf,
        /// Aggregated parser error message.
        message: String,
    },

    /// Splitting a single file component into blocks failed.
    #[error("failed to split component '{path}': {source}")]
    Sfc {
        /// Path to the component file.
        path: PathBuf,
        /// Underlying block extraction error.
        #[source]
        source: stylebook_sfc::SfcError,
    },

    /// No exported component definition could be resolved.
    #[error("No suitable component definition found on \"{}\"", path.display())]
    NoDefinition {
        /// Path to the source file.
        path: PathBuf,
    },

    /// Single-definition extraction was requested on a file with several exports.
    #[error(
        "multiple exports ({count}) in '{}' are not handled by parse, use parse_multi instead",
        path.display()
    )]
    MultipleExports {
        /// Path to the source file.
        path: PathBuf,
        /// Number of qualifying exports.
        count: usize,
    },

    /// A handler rejected a construct it cannot describe.
    #[error("{handler} handler failed in '{}': {message}", path.display())]
    Handler {
        /// Name of the failing handler.
        handler: &'static str,
        /// Path to the source file.
        path: PathBuf,
        /// Human-readable description of the unsupported construct.
        message: String,
    },

    /// Loading the configuration failed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A component metadata side-file could not be decoded.
    #[error("invalid metadata file '{path}': {message}")]
    Metadata {
        /// Path to the metadata file.
        path: PathBuf,
        /// Decoder error message.
        message: String,
    },
}

impl DocgenError {
    /// Helper to create a parse error from multiple diagnostic strings.
    pub fn parse_error(path: PathBuf, diagnostics: &[String]) -> Self {
        let message = diagnostics.join("; ");
        Self::Parse { path, message }
    }

    /// Helper to create a handler error.
    pub fn handler(handler: &'static str, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Handler {
            handler,
            path: path.into(),
            message: message.into(),
        }
    }
}
