//! notepad-editor-core: rich-text note editing without a rendering surface.
//!
//! This crate provides:
//! - `DocumentTree` - formatted content of one page, with linear-offset mapping
//! - caret save/restore through the `CaretPlatform` trait
//! - word location, safe word replacement and debounced suggestions
//! - toolbar formatting commands, pages and plain-text export
//! - `EditorSession`, which drives all of the above for one notebook

pub mod bubble;
pub mod caret;
pub mod error;
pub mod export;
pub mod format;
pub mod highlight;
pub mod offset_map;
pub mod page;
pub mod platform;
pub mod replace;
pub mod session;
pub mod suggest;
pub mod tree;
pub mod types;
pub mod word;

pub use bubble::{BubbleGeometry, Point, Size, Viewport, place};
pub use caret::{place_caret, restore_caret, restore_selection, save_caret, save_selection};
pub use error::{LookupError, PageError, ReplaceError};
pub use export::{PageExport, export_page, plain_text};
pub use format::{ActiveFormats, FormatCommand, FormatOutcome, SelectionRestore, active_formats};
pub use highlight::{HighlightPart, highlight};
pub use offset_map::{to_linear, to_tree, to_tree_with_affinity};
pub use page::{PALETTE, Page, PageStore};
pub use platform::{CaretPlatform, ModelCaret, PlatformError};
pub use replace::{Replacement, WordReplacer};
pub use session::EditorSession;
pub use smol_str::SmolStr;
pub use suggest::{
    KeyOutcome, Phase, SuggestionKey, SuggestionOrchestrator, SuggestionQuery,
    SuggestionSettings, SuggestionSource, SuggestionState,
};
pub use tree::{Alignment, Container, DocumentTree, ListKind, Node, NodePath, TreeLocation};
pub use types::{Affinity, Selection};
pub use word::{WordSpan, locate};
