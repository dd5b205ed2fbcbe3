//! Core editor types: selection and affinity.
//!
//! Offsets here are linear char offsets into a page's text runs, never byte
//! offsets and never tree locations.

use std::ops::Range;

/// Which side of a run boundary an offset prefers.
///
/// An offset equal to the end of one run is also the start of the next.
/// `Before` resolves it to the end of the earlier run (where typed text
/// lands), `After` to the start of the later run (where an edit that begins
/// at the offset should operate).
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    #[default]
    Before,
    After,
}

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the caret is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where the caret is now
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection (bare caret).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Ordered range covered by the selection.
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

}
