//! Platform abstraction for the live caret.
//!
//! The rendering surface owns the real caret and selection. The core only
//! reads and writes them as tree locations through [`CaretPlatform`], so the
//! same editing logic runs against a browser DOM, a native text view, or the
//! in-memory [`ModelCaret`] used by the CLI and tests.

use crate::tree::TreeLocation;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Read and place the caret/selection of a rendering surface.
pub trait CaretPlatform {
    /// Current selection as `(anchor, focus)`, or `None` when the surface has
    /// no selection inside the editor. A collapsed caret has equal ends.
    fn selection(&self) -> Option<(TreeLocation, TreeLocation)>;

    /// Select from `anchor` to `focus`.
    fn set_selection(
        &mut self,
        anchor: TreeLocation,
        focus: TreeLocation,
    ) -> Result<(), PlatformError>;
}

/// Caret state held in memory, with no rendering surface behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCaret {
    selection: Option<(TreeLocation, TreeLocation)>,
}

impl ModelCaret {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaretPlatform for ModelCaret {
    fn selection(&self) -> Option<(TreeLocation, TreeLocation)> {
        self.selection.clone()
    }

    fn set_selection(
        &mut self,
        anchor: TreeLocation,
        focus: TreeLocation,
    ) -> Result<(), PlatformError> {
        self.selection = Some((anchor, focus));
        Ok(())
    }
}
