use std::collections::HashMap;
use std::time::Duration;

use notepad_editor_core::{
    BubbleGeometry, Container, DocumentTree, EditorSession, FormatCommand, KeyOutcome,
    LookupError, ModelCaret, Node, PageError, PageStore, Phase, Point, ReplaceError, Selection,
    SmolStr, SuggestionKey, SuggestionSettings, SuggestionSource, Viewport,
};
use web_time::Instant;

const DEBOUNCE: Duration = Duration::from_millis(200);

struct MemorySource(HashMap<&'static str, Vec<&'static str>>);

impl MemorySource {
    fn new() -> Self {
        Self(HashMap::from([
            ("ca", vec!["cat", "car", "cap"]),
            ("cat", vec!["cat", "catalog", "cattle"]),
            ("wo", vec!["world", "word", "work"]),
        ]))
    }
}

impl SuggestionSource for MemorySource {
    async fn lookup(&self, word: &str) -> Result<Vec<SmolStr>, LookupError> {
        match self.0.get(word) {
            Some(items) => Ok(items.iter().map(|s| SmolStr::new(s)).collect()),
            None => Err(LookupError::Status(404)),
        }
    }
}

fn session() -> EditorSession<ModelCaret> {
    EditorSession::new(ModelCaret::new(), SuggestionSettings::default())
}

fn session_with(tree: DocumentTree) -> EditorSession<ModelCaret> {
    let mut pages = PageStore::new();
    pages.commit(&tree);
    EditorSession::with_pages(pages, ModelCaret::new(), SuggestionSettings::default())
}

fn words(items: &[&str]) -> Vec<SmolStr> {
    items.iter().map(|s| SmolStr::new(s)).collect()
}

#[tokio::test]
async fn test_completes_word_at_end_of_line() {
    let source = MemorySource::new();
    let mut session = session();
    let t0 = Instant::now();

    session.type_text("I like ca", t0);
    assert_eq!(session.caret(), 9);
    let span = session.current_word();
    assert_eq!(span.typed_prefix(), "ca");
    assert_eq!(span.full_span(), 7..9);

    assert_eq!(session.poll(t0 + DEBOUNCE / 2), None);
    let query = session.poll(t0 + DEBOUNCE).unwrap();
    assert_eq!(query.word, "ca");

    let geometry = BubbleGeometry::new(
        Point::new(120.0, 40.0),
        Viewport::new(0.0, 0.0, 1280.0, 800.0),
    );
    assert!(session.fetch(&source, &query, Some(&geometry)).await);
    assert_eq!(session.suggestions().items, words(&["cat", "car", "cap"]));
    assert_eq!(session.suggestions().anchor, Point::new(128.0, 48.0));

    assert_eq!(
        session.key(SuggestionKey::Enter),
        Ok(KeyOutcome::Commit("cat".into()))
    );
    assert_eq!(session.text(), "I like cat ");
    assert_eq!(session.caret(), 11);
    assert_eq!(session.pages().current().content.linear_text(), "I like cat ");
    assert!(!session.suggestions().visible);
}

#[test]
fn test_single_letter_prefix_does_not_query() {
    let mut session = session_with(DocumentTree::new(vec![Node::element(
        Container::Block,
        vec![
            Node::element(Container::Bold, vec![Node::text("Hello")]),
            Node::text(" wrld"),
        ],
    )]));
    let t0 = Instant::now();
    assert!(session.set_caret(7));
    session.input(t0);

    assert_eq!(session.current_word().typed_prefix(), "w");
    assert_eq!(session.orchestrator().phase(), Phase::Idle);
    assert_eq!(session.poll(t0 + DEBOUNCE * 10), None);
}

#[test]
fn test_last_page_cannot_be_deleted() {
    let mut session = session();
    assert_eq!(session.delete_page(0), Err(PageError::LastPage));
    assert_eq!(session.pages().len(), 1);
}

#[test]
fn test_bold_selection_is_reselected() {
    let mut session = session_with(DocumentTree::from_text("abcdefghij"));
    assert!(session.select(Selection::new(2, 5)));

    session.format(&FormatCommand::Bold);

    assert_eq!(session.selection(), Some(Selection::new(2, 5)));
    assert_eq!(session.text(), "abcdefghij");
    assert!(notepad_editor_core::active_formats(session.tree(), 3).bold);
}

#[test]
fn test_rapid_typing_issues_one_lookup() {
    let mut session = session();
    let t0 = Instant::now();
    let mut queries = Vec::new();
    for (i, ch) in "catal".chars().enumerate() {
        let now = t0 + Duration::from_millis(40) * i as u32;
        session.type_text(&ch.to_string(), now);
        queries.extend(session.poll(now));
    }
    let last = t0 + Duration::from_millis(160);
    queries.extend(session.poll(last + DEBOUNCE));

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].word, "catal");
}

#[test]
fn test_slow_response_for_older_prefix_is_ignored() {
    let mut session = session();
    let t0 = Instant::now();

    session.type_text("ca", t0);
    let ca = session.poll(t0 + DEBOUNCE).unwrap();
    session.type_text("t", t0 + DEBOUNCE * 2);
    let cat = session.poll(t0 + DEBOUNCE * 3).unwrap();

    assert!(session.complete(&cat, Ok(words(&["cat", "catalog"])), None));
    assert!(!session.complete(&ca, Ok(words(&["car", "cap"])), None));
    assert_eq!(session.suggestions().query_word, "cat");
    assert_eq!(session.suggestions().items, words(&["cat", "catalog"]));
}

#[tokio::test]
async fn test_transport_failure_hides_bubble() {
    let source = MemorySource::new();
    let mut session = session();
    let t0 = Instant::now();
    session.type_text("zq", t0);
    let query = session.poll(t0 + DEBOUNCE).unwrap();

    assert!(!session.fetch(&source, &query, None).await);
    assert!(!session.suggestions().visible);
    assert_eq!(session.text(), "zq");
}

#[test]
fn test_click_commits_hovered_item_and_keeps_formatting() {
    let mut session = session_with(DocumentTree::new(vec![Node::element(
        Container::Block,
        vec![
            Node::element(Container::Bold, vec![Node::text("Hello")]),
            Node::text(" wo"),
        ],
    )]));
    let t0 = Instant::now();
    session.input(t0);
    let query = session.poll(t0 + DEBOUNCE).unwrap();
    assert!(session.complete(&query, Ok(words(&["world", "word"])), None));

    session.hover(1);
    assert_eq!(session.suggestions().selected_index, Some(1));
    let result = session.click(1).unwrap().unwrap();

    assert!(!result.lossy);
    assert_eq!(session.text(), "Hello word ");
    assert_eq!(session.caret(), 11);
    assert!(notepad_editor_core::active_formats(session.tree(), 2).bold);
    assert!(!notepad_editor_core::active_formats(session.tree(), 8).bold);
}

#[test]
fn test_word_across_formatting_uses_plain_fallback() {
    let mut session = session_with(DocumentTree::new(vec![Node::element(
        Container::Block,
        vec![
            Node::text("my "),
            Node::element(Container::Italic, vec![Node::text("ca")]),
            Node::text("t"),
        ],
    )]));
    let result = session.accept("catalog").unwrap();
    assert!(result.lossy);
    assert_eq!(session.text(), "my catalog ");
    assert_eq!(session.caret(), 11);
}

#[test]
fn test_escape_leaves_text_alone() {
    let mut session = session();
    let t0 = Instant::now();
    session.type_text("ca", t0);
    let query = session.poll(t0 + DEBOUNCE).unwrap();
    session.complete(&query, Ok(words(&["cat"])), None);

    assert_eq!(session.key(SuggestionKey::Escape), Ok(KeyOutcome::Dismissed));
    assert_eq!(session.key(SuggestionKey::Enter), Ok(KeyOutcome::NotHandled));
    assert_eq!(session.text(), "ca");
}

#[test]
fn test_refused_commit_is_reported() {
    let mut session = session_with(DocumentTree::from_text("ca "));
    let t0 = Instant::now();
    assert!(session.set_caret(2));
    session.input(t0);
    let query = session.poll(t0 + DEBOUNCE).unwrap();
    assert!(session.complete(&query, Ok(words(&["cat"])), None));

    // Caret moves past the space without an input event; no word is left.
    assert!(session.set_caret(3));
    assert_eq!(session.key(SuggestionKey::Enter), Err(ReplaceError::NoWord));
    assert_eq!(session.text(), "ca ");
    assert!(!session.suggestions().visible);
}

#[test]
fn test_pages_keep_their_own_content() {
    let mut session = session();
    let t0 = Instant::now();
    session.type_text("first page", t0);

    session.add_page();
    assert_eq!(session.pages().indicator(), "Page 2 of 2");
    assert_eq!(session.text(), "");
    session.type_text("second ca", t0);
    assert!(session.next_deadline().is_some());

    session.switch_to(0).unwrap();
    assert_eq!(session.text(), "first page");
    assert_eq!(session.caret(), 10);
    assert_eq!(session.next_deadline(), None);
    assert_eq!(session.poll(t0 + DEBOUNCE * 5), None);

    assert!(session.next_page());
    assert_eq!(session.text(), "second ca");
    assert_eq!(
        session.switch_to(5),
        Err(PageError::OutOfRange { index: 5, count: 2 })
    );

    session.delete_page(1).unwrap();
    assert_eq!(session.text(), "first page");
    assert_eq!(session.pages().len(), 1);
}

#[test]
fn test_export_current_page() {
    let mut session = session();
    let t0 = Instant::now();
    session.add_page();
    session.type_text("groceries", t0);
    session.format(&FormatCommand::LineBreak);
    session.type_text("eggs", t0);

    let export = session.export_current();
    assert_eq!(export.filename, "note-page-2.txt");
    assert_eq!(export.text, "groceries\neggs");
}
