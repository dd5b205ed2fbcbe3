//! Plain-text export of a page.

use serde::Serialize;

use crate::page::Page;
use crate::tree::{DocumentTree, Node};

/// A page rendered for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageExport {
    pub filename: String,
    pub text: String,
}

/// Export `page` as plain text. `page_number` is 1-based.
pub fn export_page(page: &Page, page_number: usize) -> PageExport {
    PageExport {
        filename: format!("note-page-{page_number}.txt"),
        text: plain_text(&page.content),
    }
}

/// Text as a browser would render it: formatting dropped, one line per
/// block, line breaks kept.
pub fn plain_text(tree: &DocumentTree) -> String {
    let mut out = String::new();
    write_nodes(tree.children(), &mut out);
    out.trim_end_matches('\n').to_string()
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text { text } => out.push_str(text),
            Node::LineBreak => out.push('\n'),
            Node::Element {
                container,
                children,
            } => {
                if container.is_block() {
                    end_line(out);
                    write_nodes(children, out);
                    end_line(out);
                } else {
                    write_nodes(children, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Alignment, Container, ListKind};

    #[test]
    fn test_export_filename_and_lines() {
        let mut page = Page::new(7);
        page.content = DocumentTree::from_text("first\n\nthird");
        let export = export_page(&page, 2);
        assert_eq!(export.filename, "note-page-2.txt");
        assert_eq!(export.text, "first\n\nthird");
    }

    #[test]
    fn test_formatting_is_stripped() {
        let tree = DocumentTree::new(vec![
            Node::element(
                Container::Align(Alignment::Center),
                vec![Node::element(
                    Container::Block,
                    vec![
                        Node::text("Shopping "),
                        Node::element(Container::Bold, vec![Node::text("list")]),
                        Node::LineBreak,
                        Node::text("for today"),
                    ],
                )],
            ),
            Node::element(
                Container::List(ListKind::Unordered),
                vec![
                    Node::element(Container::ListItem, vec![Node::text("eggs")]),
                    Node::element(
                        Container::ListItem,
                        vec![Node::element(Container::Italic, vec![Node::text("milk")])],
                    ),
                ],
            ),
        ]);
        insta::assert_snapshot!(plain_text(&tree), @r"
        Shopping list
        for today
        eggs
        milk
        ");
    }

    #[test]
    fn test_empty_page_exports_empty_text() {
        assert_eq!(export_page(&Page::new(1), 1).text, "");
    }
}
