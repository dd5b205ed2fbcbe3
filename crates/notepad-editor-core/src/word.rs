//! Locating the word at the caret.
//!
//! A word is a maximal run of ASCII letters in the linear text. Everything
//! else (spaces, digits, punctuation, non-ASCII letters) ends a word.

use std::ops::Range;

use smol_str::SmolStr;

use crate::tree::DocumentTree;

/// The word around a caret.
///
/// `start..end` is the full alphabetic run and is what a replacement
/// overwrites. The part before the caret, `start..caret`, is what the user has
/// typed so far and is what suggestions are looked up for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordSpan {
    /// Text of the full run, case preserved.
    pub word: SmolStr,
    pub start: usize,
    pub end: usize,
    /// Caret offset the span was located from.
    pub caret: usize,
}

impl WordSpan {
    /// `start == end`: there is no word at this position.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn full_span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Letters between the start of the word and the caret.
    pub fn typed_prefix(&self) -> &str {
        // Words are ASCII, so char counts are byte counts.
        let typed = self.caret.saturating_sub(self.start).min(self.word.len());
        &self.word[..typed]
    }

    /// The typed prefix lowercased, as sent to the suggestion source.
    pub fn query_word(&self) -> SmolStr {
        SmolStr::new(self.typed_prefix().to_ascii_lowercase())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Find the word containing or immediately preceding `caret`.
///
/// Carets past the end of the text are clamped to the end.
pub fn locate(tree: &DocumentTree, caret: usize) -> WordSpan {
    let chars: Vec<char> = tree.linear_text().chars().collect();
    let caret = caret.min(chars.len());

    let mut start = caret;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }

    let mut end = caret;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    WordSpan {
        word: chars[start..end].iter().copied().collect(),
        start,
        end,
        caret,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Container, Node};

    #[test]
    fn test_locate_at_end_of_word() {
        let tree = DocumentTree::from_text("I like ca");
        let span = locate(&tree, 9);
        assert_eq!(span.full_span(), 7..9);
        assert_eq!(span.typed_prefix(), "ca");
        assert_eq!(span.word, "ca");
    }

    #[test]
    fn test_locate_mid_word_splits_prefix() {
        let tree = DocumentTree::new(vec![Node::element(
            Container::Block,
            vec![
                Node::element(Container::Bold, vec![Node::text("Hello")]),
                Node::text(" wrld"),
            ],
        )]);
        let span = locate(&tree, 7);
        assert_eq!(span.full_span(), 6..10);
        assert_eq!(span.word, "wrld");
        assert_eq!(span.typed_prefix(), "w");
    }

    #[test]
    fn test_word_spans_formatting_boundaries() {
        let tree = DocumentTree::new(vec![Node::element(
            Container::Block,
            vec![
                Node::element(Container::Italic, vec![Node::text("ca")]),
                Node::text("t!"),
            ],
        )]);
        let span = locate(&tree, 3);
        assert_eq!(span.full_span(), 0..3);
        assert_eq!(span.word, "cat");
    }

    #[test]
    fn test_query_word_is_lowercased() {
        let span = locate(&DocumentTree::from_text("say HELlo"), 7);
        assert_eq!(span.typed_prefix(), "HEL");
        assert_eq!(span.query_word(), "hel");
        assert_eq!(span.word, "HELlo");
    }

    #[test]
    fn test_empty_document() {
        let span = locate(&DocumentTree::default(), 0);
        assert_eq!((span.start, span.end), (0, 0));
        assert!(span.is_empty());
        assert_eq!(span.typed_prefix(), "");
    }

    #[test]
    fn test_non_letters_terminate_words() {
        let tree = DocumentTree::from_text("ab1cd é x");
        assert_eq!(locate(&tree, 0).full_span(), 0..2);
        assert_eq!(locate(&tree, 3).full_span(), 3..5);
        assert!(locate(&tree, 7).is_empty());
        // Caret right after a space has nothing before it to complete.
        assert_eq!(locate(&tree, 8).typed_prefix(), "");
    }
}
