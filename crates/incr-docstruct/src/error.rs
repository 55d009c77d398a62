//! Error types for the document-structure core.

use thiserror::Error;

/// Errors raised by the document-structure and segmentation-search core.
#[derive(Error, Debug)]
pub enum DocStructError {
    /// A structural invariant was violated while building or mutating the
    /// chopping graph (chain-code step out of range, outline not legally
    /// nested, a seam split that cannot be found in any blob, ...).
    ///
    /// Per the propagation policy, this always aborts recognition of the
    /// enclosing word; callers should tag the word `tess_failed` and pass
    /// it through unrecognized rather than panic.
    #[error("invariant violated in word {word}: {reason}")]
    InvariantViolation {
        /// Index of the word being processed, for diagnostics.
        word: usize,
        /// Human-readable description of the violated invariant.
        reason: String,
    },

    /// The external classifier returned no choices for a blob, or the
    /// chopped word was degenerate (zero blobs). Recognition of the word
    /// stops, but the caller is expected to route the word through its
    /// reject map rather than propagate the error further.
    #[error("recognition failed for blob {blob} in word {word}: {reason}")]
    Recognition {
        /// Index of the word being processed.
        word: usize,
        /// Index of the blob that failed to classify.
        blob: usize,
        /// Human-readable description.
        reason: String,
    },

    /// The params-model file was missing a required feature, or contained
    /// an unparseable line. The model pass remains uninitialized; callers
    /// must not call `ParamsModel::compute_cost` for that pass.
    #[error("failed to load params model pass {pass}: {reason}")]
    ParamsModelLoad {
        /// Which pass (adapted / non-adapted) failed to load.
        pass: &'static str,
        /// Human-readable description.
        reason: String,
    },

    /// I/O failure while loading or saving a params model or configuration
    /// file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the document-structure core.
pub type Result<T> = std::result::Result<T, DocStructError>;
