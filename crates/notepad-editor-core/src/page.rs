//! Pages of a notebook.
//!
//! Exactly one page is current at a time. The store holds committed
//! snapshots; the live tree being edited belongs to the session and is
//! committed back here after every change.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::debug;

use crate::error::PageError;
use crate::tree::DocumentTree;

pub const DEFAULT_PAGE_COLOR: &str = "#FFFFFF";

/// Preset page colors, as (name, hex).
pub const PALETTE: [(&str, &str); 6] = [
    ("rose", "#eaaeb4"),
    ("peach", "#ffbe89"),
    ("sunny", "#ffd484"),
    ("mint", "#cdeab3"),
    ("aqua", "#91dcd7"),
    ("lavender", "#b0b2e4"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Unique, never reused while the page exists.
    pub id: u32,
    pub content: DocumentTree,
    pub color: SmolStr,
}

impl Page {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            content: DocumentTree::default(),
            color: SmolStr::new_static(DEFAULT_PAGE_COLOR),
        }
    }
}

/// Loading a store checks the same invariants its operations keep: at least
/// one page, a current index in range and unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageStore")]
pub struct PageStore {
    pages: Vec<Page>,
    current: usize,
}

#[derive(Deserialize)]
struct RawPageStore {
    pages: Vec<Page>,
    current: usize,
}

impl TryFrom<RawPageStore> for PageStore {
    type Error = PageError;

    fn try_from(raw: RawPageStore) -> Result<Self, Self::Error> {
        let count = raw.pages.len();
        if raw.current >= count {
            return Err(PageError::OutOfRange { index: raw.current, count });
        }
        let mut ids: Vec<u32> = raw.pages.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(PageError::DuplicateId(pair[0]));
        }
        Ok(Self {
            pages: raw.pages,
            current: raw.current,
        })
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore {
    /// A store holding a single blank page with id 1.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::new(1)],
            current: 0,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false; a store never runs out of pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Page {
        &self.pages[self.current]
    }

    /// Store a snapshot of the live tree into the current page.
    pub fn commit(&mut self, content: &DocumentTree) {
        self.pages[self.current].content = content.clone();
    }

    pub fn set_color(&mut self, color: impl Into<SmolStr>) {
        self.pages[self.current].color = color.into();
    }

    /// Append a blank page and make it current.
    pub fn add_page(&mut self) -> &Page {
        let id = self.pages.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.pages.push(Page::new(id));
        self.current = self.pages.len() - 1;
        debug!(target: "notepad::pages", id, count = self.pages.len(), "page added");
        self.current()
    }

    /// Remove the page at `index` and return the page that is now current.
    ///
    /// The current page stays current if it survives. If it was the one
    /// deleted, the page that took its slot (or the new last page) becomes
    /// current.
    pub fn delete_page(&mut self, index: usize) -> Result<&Page, PageError> {
        let count = self.pages.len();
        if index >= count {
            return Err(PageError::OutOfRange { index, count });
        }
        if count == 1 {
            return Err(PageError::LastPage);
        }
        let removed = self.pages.remove(index);
        if index < self.current {
            self.current -= 1;
        }
        self.current = self.current.min(self.pages.len() - 1);
        debug!(target: "notepad::pages", id = removed.id, count = self.pages.len(), "page deleted");
        Ok(self.current())
    }

    pub fn switch_to(&mut self, index: usize) -> Result<&Page, PageError> {
        let count = self.pages.len();
        if index >= count {
            return Err(PageError::OutOfRange { index, count });
        }
        self.current = index;
        Ok(self.current())
    }

    /// Step back one page. Returns `false` on the first page.
    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Step forward one page. Returns `false` on the last page.
    pub fn next(&mut self) -> bool {
        if self.current + 1 >= self.pages.len() {
            return false;
        }
        self.current += 1;
        true
    }

    /// `Page N of M`, 1-based.
    pub fn indicator(&self) -> String {
        format!("Page {} of {}", self.current + 1, self.pages.len())
    }
}
