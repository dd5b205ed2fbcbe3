//! Debounced word suggestions.
//!
//! [`SuggestionOrchestrator`] is a plain state machine. It never sleeps and
//! never performs I/O itself: the host feeds it input events with a timestamp,
//! polls it for a due query, runs the lookup through a [`SuggestionSource`],
//! and hands the result back. Every query carries the generation it was
//! issued under, and a response whose generation is no longer current is
//! dropped on arrival.

use std::future::Future;
use std::time::Duration;

use smol_str::SmolStr;
use tracing::{debug, trace, warn};
use web_time::Instant;

use crate::bubble::{BubbleGeometry, Point};
use crate::error::LookupError;
use crate::word::WordSpan;

/// Something that can complete a lowercase prefix into ranked words.
pub trait SuggestionSource {
    fn lookup(&self, word: &str) -> impl Future<Output = Result<Vec<SmolStr>, LookupError>>;
}

/// Tunables for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionSettings {
    /// Quiet period after the last keystroke before a lookup is issued.
    pub debounce: Duration,
    /// Typed prefixes shorter than this never query. Empty prefixes never
    /// query, so 0 behaves like 1.
    pub min_prefix_len: usize,
    /// Suggestions beyond this many are dropped. With 0 the bubble never
    /// shows.
    pub max_items: usize,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            min_prefix_len: 2,
            max_items: 5,
        }
    }
}

/// A lookup the host should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionQuery {
    pub generation: u64,
    /// Lowercased typed prefix.
    pub word: SmolStr,
}

/// A single cancellable deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    /// Arm the timer, replacing any earlier deadline.
    pub fn arm(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Debouncing,
    Querying,
    Showing,
}

/// What the bubble shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuggestionState {
    pub visible: bool,
    pub items: Vec<SmolStr>,
    /// Highlighted item; `None` until the user navigates or hovers.
    pub selected_index: Option<usize>,
    /// Top-left corner of the bubble.
    pub anchor: Point,
    /// Prefix the items were fetched for.
    pub query_word: SmolStr,
}

/// Keys the bubble reacts to while it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Tab,
    Escape,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The bubble is closed or the key is not one it handles; let the
    /// surface process it.
    NotHandled,
    /// The highlight moved.
    Navigated,
    /// Replace the word at the caret with this suggestion.
    Commit(SmolStr),
    /// The bubble closed without a choice.
    Dismissed,
}

#[derive(Debug, Default)]
pub struct SuggestionOrchestrator {
    settings: SuggestionSettings,
    phase: Phase,
    timer: DebounceTimer,
    generation: u64,
    pending_word: SmolStr,
    state: SuggestionState,
}

impl SuggestionOrchestrator {
    pub fn new(settings: SuggestionSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &SuggestionSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the pending debounce fires, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Whether key events should be routed here before the surface.
    pub fn wants_keyboard(&self) -> bool {
        self.state.visible
    }

    /// React to an edit that left the caret in `span`.
    ///
    /// Any earlier timer or in-flight lookup is invalidated and the bubble is
    /// hidden. A long enough typed prefix re-arms the debounce.
    pub fn on_input(&mut self, span: &WordSpan, now: Instant) {
        self.generation += 1;
        self.timer.cancel();
        self.hide();

        let word = span.query_word();
        // An empty prefix never queries, whatever the threshold.
        if word.is_empty() || word.len() < self.settings.min_prefix_len {
            trace!(target: "notepad::suggest", %word, "prefix too short, not querying");
            self.phase = Phase::Idle;
            return;
        }

        self.timer.arm(now + self.settings.debounce);
        self.pending_word = word;
        self.phase = Phase::Debouncing;
    }

    /// Issue the query if the debounce has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SuggestionQuery> {
        if self.phase != Phase::Debouncing || !self.timer.fire(now) {
            return None;
        }
        self.phase = Phase::Querying;
        let query = SuggestionQuery {
            generation: self.generation,
            word: self.pending_word.clone(),
        };
        debug!(
            target: "notepad::suggest",
            word = %query.word,
            generation = query.generation,
            "querying"
        );
        Some(query)
    }

    /// Apply a lookup result. Returns whether the bubble is now showing.
    ///
    /// Results for a superseded query are ignored. Failures and empty results
    /// hide the bubble; failures are logged and otherwise swallowed.
    pub fn on_response(
        &mut self,
        query: &SuggestionQuery,
        result: Result<Vec<SmolStr>, LookupError>,
        geometry: Option<&BubbleGeometry>,
    ) -> bool {
        if query.generation != self.generation || self.phase != Phase::Querying {
            debug!(
                target: "notepad::suggest",
                word = %query.word,
                generation = query.generation,
                current = self.generation,
                "discarding stale suggestions"
            );
            return false;
        }

        let mut items = match result {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    target: "notepad::suggest",
                    word = %query.word,
                    error = %e,
                    "suggestion lookup failed"
                );
                self.dismiss();
                return false;
            }
        };
        items.truncate(self.settings.max_items);
        if items.is_empty() {
            self.dismiss();
            return false;
        }

        self.state = SuggestionState {
            visible: true,
            items,
            selected_index: None,
            anchor: geometry.map(BubbleGeometry::place).unwrap_or_default(),
            query_word: query.word.clone(),
        };
        self.phase = Phase::Showing;
        true
    }

    /// Handle a key while the bubble may be open.
    pub fn key(&mut self, key: SuggestionKey) -> KeyOutcome {
        if !self.state.visible {
            return KeyOutcome::NotHandled;
        }
        let len = self.state.items.len();
        match key {
            SuggestionKey::ArrowDown => {
                self.state.selected_index = Some(match self.state.selected_index {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                });
                KeyOutcome::Navigated
            }
            SuggestionKey::ArrowUp => {
                self.state.selected_index = Some(match self.state.selected_index {
                    Some(i) if i > 0 => i - 1,
                    _ => len - 1,
                });
                KeyOutcome::Navigated
            }
            SuggestionKey::Enter | SuggestionKey::Tab => {
                let idx = self.state.selected_index.unwrap_or(0);
                match self.take(idx) {
                    Some(word) => KeyOutcome::Commit(word),
                    None => KeyOutcome::Dismissed,
                }
            }
            SuggestionKey::Escape => {
                self.dismiss();
                KeyOutcome::Dismissed
            }
            SuggestionKey::Other => KeyOutcome::NotHandled,
        }
    }

    /// Pointer moved over item `index`.
    pub fn hover(&mut self, index: usize) {
        if self.state.visible && index < self.state.items.len() {
            self.state.selected_index = Some(index);
        }
    }

    /// Pointer clicked item `index`; returns the word to commit.
    pub fn click(&mut self, index: usize) -> Option<SmolStr> {
        if !self.state.visible {
            return None;
        }
        self.take(index)
    }

    /// Close the bubble and go idle. A pending debounce is left alone.
    pub fn dismiss(&mut self) {
        self.hide();
        if self.phase != Phase::Debouncing {
            self.phase = Phase::Idle;
        }
    }

    /// Drop everything: timer, in-flight lookup and bubble.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.timer.cancel();
        self.hide();
        self.phase = Phase::Idle;
    }

    fn take(&mut self, index: usize) -> Option<SmolStr> {
        let word = self.state.items.get(index).cloned();
        self.dismiss();
        word
    }

    fn hide(&mut self) {
        self.state.visible = false;
        self.state.items.clear();
        self.state.selected_index = None;
    }
}
