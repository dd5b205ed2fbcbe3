//! Replacing the word at the caret with a chosen suggestion.

use std::cell::Cell;

use tracing::{debug, warn};

use crate::caret::restore_caret;
use crate::error::ReplaceError;
use crate::platform::CaretPlatform;
use crate::tree::{DocumentTree, Node, byte_index};
use crate::word::WordSpan;

/// Result of a committed replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    /// Linear offset just after the inserted word and its trailing space.
    pub new_caret: usize,
    /// The word crossed a run boundary and was rewritten as plain text,
    /// dropping the formatting inside the replaced region.
    pub lossy: bool,
    /// Whether the caret could be placed at `new_caret`. A failed placement
    /// does not undo the edit.
    pub caret_restored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ReplacerState {
    #[default]
    Idle,
    Replacing,
}

/// Performs word replacements, one at a time.
///
/// While a replacement runs the replacer is in the `Replacing` state and any
/// nested call (for example from a platform callback fired by the caret
/// restore) is refused with [`ReplaceError::Busy`]. The state returns to
/// `Idle` when the replacement finishes on any path.
#[derive(Debug, Default)]
pub struct WordReplacer {
    state: Cell<ReplacerState>,
}

struct ReplacingGuard<'a>(&'a Cell<ReplacerState>);

impl Drop for ReplacingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(ReplacerState::Idle);
    }
}

impl WordReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_replacing(&self) -> bool {
        self.state.get() == ReplacerState::Replacing
    }

    fn begin(&self) -> Result<ReplacingGuard<'_>, ReplaceError> {
        match self.state.replace(ReplacerState::Replacing) {
            ReplacerState::Idle => Ok(ReplacingGuard(&self.state)),
            ReplacerState::Replacing => Err(ReplaceError::Busy),
        }
    }

    /// Replace `span` with `replacement` followed by a space, then put the
    /// caret after the space.
    ///
    /// When the whole word sits in one text run the run is spliced in place
    /// and keeps its formatting. Otherwise the region is rewritten as plain
    /// text in the run where the word starts, taking that run's formatting;
    /// the formatting changes inside the old word are lost.
    pub fn replace<P: CaretPlatform + ?Sized>(
        &self,
        tree: &mut DocumentTree,
        platform: &mut P,
        span: &WordSpan,
        replacement: &str,
    ) -> Result<Replacement, ReplaceError> {
        let _guard = self.begin()?;
        if span.is_empty() {
            return Err(ReplaceError::NoWord);
        }
        let len = tree.len_chars();
        if span.end > len || span.start > span.end {
            return Err(ReplaceError::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len,
            });
        }

        let inserted = format!("{replacement} ");
        let lossy = !splice_single_run(tree, span, &inserted);
        if lossy {
            warn!(
                target: "notepad::replace",
                start = span.start,
                end = span.end,
                "word crosses a formatting boundary, replacing as plain text"
            );
            // Resolved before the delete: the run holding the word's first
            // char survives it, and its chars before the word are untouched.
            let at = tree.location_after(span.start);
            tree.delete_range(span.full_span());
            if !at.is_some_and(|at| tree.insert_text_at(&at, &inserted)) {
                tree.insert_text(span.start, &inserted);
            }
            tree.normalize();
        }

        let new_caret = span.start + inserted.chars().count();
        let caret_restored = restore_caret(tree, platform, new_caret);
        debug!(
            target: "notepad::replace",
            word = %span.word,
            replacement,
            new_caret,
            lossy,
            caret_restored,
            "replaced word"
        );
        Ok(Replacement {
            new_caret,
            lossy,
            caret_restored,
        })
    }
}

/// Splice `inserted` over `span` inside the run holding the span's first
/// char. Returns `false` without touching the tree if the span does not fit
/// in that run.
fn splice_single_run(tree: &mut DocumentTree, span: &WordSpan, inserted: &str) -> bool {
    let Some(location) = tree.location_after(span.start) else {
        return false;
    };
    let Some(Node::Text { text }) = tree.node_mut(&location.path) else {
        return false;
    };
    let local_end = location.offset + span.len();
    if local_end > text.chars().count() {
        return false;
    }
    let start = byte_index(text, location.offset);
    let end = byte_index(text, local_end);
    text.replace_range(start..end, inserted);
    true
}
