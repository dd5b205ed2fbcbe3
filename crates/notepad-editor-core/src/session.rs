//! An editing session: the live page, its caret, and the suggestion flow.
//!
//! The session ties the pieces together in the order the surface drives
//! them. An edit changes the tree, moves the caret, commits the tree into the
//! current page, and reports the word at the caret to the orchestrator. The
//! host then polls for a due query, runs it, and hands the result back. A
//! committed suggestion goes through the word replacer.

use smol_str::SmolStr;
use tracing::debug;
use web_time::Instant;

use crate::bubble::BubbleGeometry;
use crate::caret::{place_caret, restore_caret, restore_selection, save_caret, save_selection};
use crate::error::{LookupError, PageError, ReplaceError};
use crate::export::{PageExport, export_page};
use crate::format::{self, FormatCommand, FormatOutcome};
use crate::page::PageStore;
use crate::platform::CaretPlatform;
use crate::replace::{Replacement, WordReplacer};
use crate::suggest::{
    KeyOutcome, SuggestionKey, SuggestionOrchestrator, SuggestionQuery, SuggestionSettings,
    SuggestionSource, SuggestionState,
};
use crate::tree::{DocumentTree, Node};
use crate::types::{Affinity, Selection};
use crate::word::{WordSpan, locate};

pub struct EditorSession<P> {
    pages: PageStore,
    tree: DocumentTree,
    platform: P,
    suggestions: SuggestionOrchestrator,
    replacer: WordReplacer,
}

impl<P: CaretPlatform> EditorSession<P> {
    /// A session over a fresh single-page store.
    pub fn new(platform: P, settings: SuggestionSettings) -> Self {
        Self::with_pages(PageStore::new(), platform, settings)
    }

    /// A session over existing pages, editing the store's current page.
    pub fn with_pages(pages: PageStore, platform: P, settings: SuggestionSettings) -> Self {
        let mut session = Self {
            tree: pages.current().content.clone(),
            pages,
            platform,
            suggestions: SuggestionOrchestrator::new(settings),
            replacer: WordReplacer::new(),
        };
        session.place_caret_at_end();
        session
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn text(&self) -> String {
        self.tree.linear_text()
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn suggestions(&self) -> &SuggestionState {
        self.suggestions.state()
    }

    pub fn orchestrator(&self) -> &SuggestionOrchestrator {
        &self.suggestions
    }

    /// Linear offset of the caret.
    pub fn caret(&self) -> usize {
        save_caret(&self.tree, &self.platform)
    }

    pub fn selection(&self) -> Option<Selection> {
        save_selection(&self.tree, &self.platform)
    }

    /// The word around the caret.
    pub fn current_word(&self) -> WordSpan {
        locate(&self.tree, self.caret())
    }

    pub fn set_caret(&mut self, offset: usize) -> bool {
        restore_caret(&self.tree, &mut self.platform, offset)
    }

    pub fn select(&mut self, selection: Selection) -> bool {
        restore_selection(&self.tree, &mut self.platform, selection)
    }

    /// Type `text` at the caret, replacing any selection.
    pub fn type_text(&mut self, text: &str, now: Instant) {
        self.insert_plain(text);
        self.input(now);
    }

    /// Paste clipboard text as plain text. Newlines become line breaks and
    /// other control characters are dropped.
    pub fn paste(&mut self, text: &str, now: Instant) {
        let cleaned: String = text
            .replace("\r\n", "\n")
            .chars()
            .filter(|c| *c == '\n' || !c.is_control())
            .collect();
        self.insert_plain(&cleaned);
        self.input(now);
    }

    fn insert_plain(&mut self, text: &str) {
        let selection = self
            .selection()
            .unwrap_or_else(|| Selection::collapsed(self.tree.len_chars()));
        let mut lines = text.split('\n');
        let first = lines.next().unwrap_or_default();
        let mut caret = selection.start();

        // Typing lands where the surface shows the caret, which matters on a
        // run boundary such as just after a line break.
        let focus = self.platform.selection().map(|(_, focus)| focus);
        let at_focus = selection.is_collapsed()
            && focus.is_some_and(|focus| self.tree.insert_text_at(&focus, first));
        if at_focus {
            caret += first.chars().count();
        } else {
            if !selection.is_collapsed() {
                self.tree.delete_range(selection.to_range());
            }
            if !first.is_empty() {
                caret = self.tree.insert_text(caret, first);
            }
        }

        // Later lines go in as one sequence so each break lands before its line.
        let at = caret;
        let mut rest = Vec::new();
        let mut ends_with_break = false;
        for line in lines {
            caret += line.chars().count();
            rest.push(Node::LineBreak);
            rest.push(Node::text(line));
            ends_with_break = line.is_empty();
        }
        if !rest.is_empty() {
            self.tree.insert_nodes(at, rest);
        }
        self.tree.normalize();

        let affinity = if ends_with_break {
            Affinity::After
        } else {
            Affinity::Before
        };
        place_caret(&self.tree, &mut self.platform, caret, affinity);
        self.commit();
    }

    /// Tell the orchestrator the caret's word changed.
    pub fn input(&mut self, now: Instant) {
        let span = self.current_word();
        self.suggestions.on_input(&span, now);
    }

    pub fn poll(&mut self, now: Instant) -> Option<SuggestionQuery> {
        self.suggestions.poll(now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.suggestions.next_deadline()
    }

    /// Hand back the result of `query`. Returns whether suggestions are
    /// now showing.
    pub fn complete(
        &mut self,
        query: &SuggestionQuery,
        result: Result<Vec<SmolStr>, LookupError>,
        geometry: Option<&BubbleGeometry>,
    ) -> bool {
        self.suggestions.on_response(query, result, geometry)
    }

    /// Run `query` against `source` and apply the result.
    pub async fn fetch<S: SuggestionSource>(
        &mut self,
        source: &S,
        query: &SuggestionQuery,
        geometry: Option<&BubbleGeometry>,
    ) -> bool {
        let result = source.lookup(&query.word).await;
        self.complete(query, result, geometry)
    }

    /// Route a key to the suggestion bubble. A commit replaces the word at
    /// the caret; if the replacer refuses, the page is left as it was, the
    /// bubble stays closed and the refusal is returned.
    pub fn key(&mut self, key: SuggestionKey) -> Result<KeyOutcome, ReplaceError> {
        let outcome = self.suggestions.key(key);
        if let KeyOutcome::Commit(word) = &outcome {
            self.accept(word)?;
        }
        Ok(outcome)
    }

    pub fn hover(&mut self, index: usize) {
        self.suggestions.hover(index);
    }

    /// Click suggestion `index`. `None` if nothing was showing there.
    pub fn click(&mut self, index: usize) -> Option<Result<Replacement, ReplaceError>> {
        let word = self.suggestions.click(index)?;
        Some(self.accept(&word))
    }

    /// Replace the word at the caret with `word`.
    pub fn accept(&mut self, word: &str) -> Result<Replacement, ReplaceError> {
        let span = self.current_word();
        let result = self
            .replacer
            .replace(&mut self.tree, &mut self.platform, &span, word);
        match &result {
            Ok(_) => self.commit(),
            Err(e) => debug!(target: "notepad::replace", error = %e, "suggestion not applied"),
        }
        result
    }

    pub fn format(&mut self, command: &FormatCommand) -> FormatOutcome {
        let outcome = format::apply(&mut self.tree, &mut self.platform, command);
        match &outcome {
            FormatOutcome::Background(color) => self.pages.set_color(color.clone()),
            FormatOutcome::Structural { .. } => self.commit(),
        }
        outcome
    }

    pub fn add_page(&mut self) {
        self.commit();
        self.pages.add_page();
        self.load_current();
    }

    pub fn delete_page(&mut self, index: usize) -> Result<(), PageError> {
        self.commit();
        let before = self.pages.current().id;
        self.pages.delete_page(index)?;
        if self.pages.current().id != before {
            self.load_current();
        }
        Ok(())
    }

    /// Make page `index` current, keeping the outgoing page's edits.
    pub fn switch_to(&mut self, index: usize) -> Result<(), PageError> {
        self.commit();
        self.pages.switch_to(index)?;
        self.load_current();
        Ok(())
    }

    pub fn previous_page(&mut self) -> bool {
        self.commit();
        let moved = self.pages.previous();
        if moved {
            self.load_current();
        }
        moved
    }

    pub fn next_page(&mut self) -> bool {
        self.commit();
        let moved = self.pages.next();
        if moved {
            self.load_current();
        }
        moved
    }

    pub fn export_current(&self) -> PageExport {
        let mut page = self.pages.current().clone();
        page.content = self.tree.clone();
        export_page(&page, self.pages.current_index() + 1)
    }

    fn commit(&mut self) {
        self.pages.commit(&self.tree);
    }

    fn load_current(&mut self) {
        self.tree = self.pages.current().content.clone();
        self.suggestions.reset();
        self.place_caret_at_end();
        debug!(
            target: "notepad::pages",
            id = self.pages.current().id,
            indicator = %self.pages.indicator(),
            "page loaded"
        );
    }

    fn place_caret_at_end(&mut self) {
        let end = self.tree.len_chars();
        restore_caret(&self.tree, &mut self.platform, end);
    }
}
