//! Error types for template alignment and field extraction.
//!
//! Content-level problems (malformed streams, undecodable text, unaligned
//! documents, bad regex rules) never surface here: they degrade to empty or
//! sentinel results. These errors cover the boundaries only, i.e. the
//! document model and configuration loading.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the document-model and configuration boundaries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a field map or other configuration file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A regex rule that does not compile
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Object id not present in the document
    #[error("Object not found: {0}")]
    ObjectNotFound(u32),

    /// Object exists but carries no stream
    #[error("Object {0} is not a stream")]
    NotAStream(u32),

    /// Page index past the end of the document
    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Requested page (0-based)
        page: usize,
        /// Number of pages in the document
        count: usize,
    },

    /// Stream filter or text decoding failure
    #[error("Decode error: {0}")]
    Decode(String),

    /// Stream filter this crate does not implement
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),
}
