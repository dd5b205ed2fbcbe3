//! Error types for editor core operations.

use thiserror::Error;

/// Why a word replacement was refused. The tree is untouched in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReplaceError {
    /// There is no word at the caret.
    #[error("no word at the caret")]
    NoWord,

    /// Another replacement is still running.
    #[error("a replacement is already in progress")]
    Busy,

    /// The span ends past the end of the document.
    #[error("word span {start}..{end} is outside a document of {len} chars")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
}

/// Page store operations that were rejected as no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PageError {
    /// The only remaining page cannot be deleted.
    #[error("cannot delete the last remaining page")]
    LastPage,

    /// Page index outside `0..count`.
    #[error("page index {index} out of range for {count} pages")]
    OutOfRange { index: usize, count: usize },

    /// Two pages in a loaded notebook share an id.
    #[error("page id {0} appears more than once")]
    DuplicateId(u32),
}

/// A suggestion lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LookupError {
    /// The request never got a response.
    #[error("suggestion request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("suggestion service returned status {0}")]
    Status(u16),

    /// The response body was not JSON.
    #[error("could not decode suggestion response: {0}")]
    Decode(String),
}
