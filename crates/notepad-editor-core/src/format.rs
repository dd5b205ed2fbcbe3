//! Toolbar formatting commands.
//!
//! Every structural command runs inside the same wrapper: the selection is
//! saved as linear offsets, the tree is mutated and normalized, and the
//! selection is mapped back into the new tree. Formatting never changes the
//! linear text except where a command inserts or deletes text itself, so the
//! saved offsets stay meaningful across the restructuring.

use smol_str::SmolStr;
use tracing::debug;

use crate::caret::{place_caret, restore_caret, restore_selection, save_selection};
use crate::offset_map::to_tree;
use crate::platform::CaretPlatform;
use crate::tree::{Alignment, Container, DocumentTree, ListKind, Node, TreeLocation};
use crate::types::{Affinity, Selection};

/// Text inserted by [`FormatCommand::InsertBullet`].
pub const BULLET: &str = "\u{2022}  ";

/// Font sizes offered by the toolbar, as (size, label).
pub const FONT_SIZES: [(u8, &str); 4] = [
    (1, "Small"),
    (3, "Normal"),
    (5, "Large"),
    (7, "Extra Large"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    /// Relative size, clamped to 1..=7.
    FontSize(u8),
    FontName(SmolStr),
    ForeColor(SmolStr),
    Justify(Alignment),
    List(ListKind),
    LineBreak,
    InsertBullet,
    /// Page background. Not a tree edit.
    BackgroundColor(SmolStr),
}

/// How the selection came back after a structural command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRestore {
    /// The saved selection was reselected.
    Exact,
    /// Reselection failed; the caret was collapsed to the selection start.
    CollapsedToStart,
    /// The command placed the caret itself.
    Relocated,
    /// Not even a collapsed caret could be placed.
    Failed,
    /// There was no selection, so the command did nothing.
    NoSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// Apply this color to the current page.
    Background(SmolStr),
    Structural { restore: SelectionRestore },
}

/// Where the caret goes once the mutation is done.
enum CaretPlan {
    Keep(Selection),
    Relocate(usize, Affinity),
}

/// Apply `command` to the tree at the platform's current selection.
pub fn apply<P: CaretPlatform + ?Sized>(
    tree: &mut DocumentTree,
    platform: &mut P,
    command: &FormatCommand,
) -> FormatOutcome {
    if let FormatCommand::BackgroundColor(color) = command {
        return FormatOutcome::Background(color.clone());
    }

    let Some(selection) = save_selection(tree, platform) else {
        debug!(target: "notepad::format", ?command, "no selection, command skipped");
        return FormatOutcome::Structural {
            restore: SelectionRestore::NoSelection,
        };
    };

    let focus = platform.selection().map(|(_, focus)| focus);
    let plan = execute(tree, command, selection, focus.as_ref());
    tree.normalize();

    let restore = match plan {
        CaretPlan::Keep(selection) => {
            if restore_selection(tree, platform, selection) {
                SelectionRestore::Exact
            } else if restore_caret(tree, platform, selection.start()) {
                debug!(
                    target: "notepad::format",
                    ?selection,
                    "selection lost, caret collapsed to start"
                );
                SelectionRestore::CollapsedToStart
            } else {
                debug!(target: "notepad::format", ?selection, "selection could not be restored");
                SelectionRestore::Failed
            }
        }
        CaretPlan::Relocate(offset, affinity) => {
            if place_caret(tree, platform, offset, affinity) {
                SelectionRestore::Relocated
            } else {
                SelectionRestore::Failed
            }
        }
    };
    FormatOutcome::Structural { restore }
}

fn execute(
    tree: &mut DocumentTree,
    command: &FormatCommand,
    selection: Selection,
    focus: Option<&TreeLocation>,
) -> CaretPlan {
    match command {
        FormatCommand::Bold => toggle_inline(tree, Container::Bold, selection),
        FormatCommand::Italic => toggle_inline(tree, Container::Italic, selection),
        FormatCommand::Underline => toggle_inline(tree, Container::Underline, selection),
        FormatCommand::Strikethrough => toggle_inline(tree, Container::Strikethrough, selection),
        FormatCommand::FontSize(size) => {
            set_inline(tree, Container::FontSize((*size).clamp(1, 7)), selection)
        }
        FormatCommand::FontName(name) => {
            set_inline(tree, Container::FontName(name.clone()), selection)
        }
        FormatCommand::ForeColor(color) => {
            set_inline(tree, Container::ForeColor(color.clone()), selection)
        }
        FormatCommand::Justify(alignment) => justify(tree, *alignment, selection),
        FormatCommand::List(kind) => toggle_list(tree, *kind, selection),
        FormatCommand::LineBreak => {
            let at = delete_selection(tree, selection);
            tree.insert_nodes(at, vec![Node::LineBreak, Node::text("")]);
            CaretPlan::Relocate(at, Affinity::After)
        }
        FormatCommand::InsertBullet => {
            // A bare caret inserts exactly where the surface shows it.
            let at_focus = selection.is_collapsed()
                && focus.is_some_and(|focus| tree.insert_text_at(focus, BULLET));
            let caret = if at_focus {
                selection.start() + BULLET.chars().count()
            } else {
                let at = delete_selection(tree, selection);
                tree.insert_text(at, BULLET)
            };
            CaretPlan::Relocate(caret, Affinity::Before)
        }
        FormatCommand::BackgroundColor(_) => CaretPlan::Keep(selection),
    }
}

fn delete_selection(tree: &mut DocumentTree, selection: Selection) -> usize {
    if !selection.is_collapsed() {
        tree.delete_range(selection.to_range());
    }
    selection.start()
}

/// Remove `container` from the selection if all of it already has it,
/// otherwise add it.
fn toggle_inline(tree: &mut DocumentTree, container: Container, selection: Selection) -> CaretPlan {
    let range = selection.to_range();
    if !range.is_empty() {
        let same = |c: &Container| *c == container;
        if tree.range_has_container(range.clone(), &same) {
            tree.unwrap_range(range, &same);
        } else {
            tree.unwrap_range(range.clone(), &same);
            tree.wrap_range(range, &container);
        }
    }
    CaretPlan::Keep(selection)
}

/// Replace any value of the same kind on the selection with `container`.
fn set_inline(tree: &mut DocumentTree, container: Container, selection: Selection) -> CaretPlan {
    let range = selection.to_range();
    if !range.is_empty() {
        tree.unwrap_range(range.clone(), &|c| c.same_kind(&container));
        tree.wrap_range(range, &container);
    }
    CaretPlan::Keep(selection)
}

/// Align every top-level line the selection touches. Left is the default
/// alignment, so it removes the wrapper instead of adding one.
fn justify(tree: &mut DocumentTree, alignment: Alignment, selection: Selection) -> CaretPlan {
    let Some(span) = tree.top_level_span(selection.to_range()) else {
        return CaretPlan::Keep(selection);
    };
    let children = tree.children_mut();
    for idx in span.rev() {
        let node = std::mem::replace(&mut children[idx], Node::LineBreak);
        match (alignment, node) {
            (
                Alignment::Left,
                Node::Element {
                    container: Container::Align(_),
                    children: inner,
                },
            ) => {
                children.splice(idx..idx + 1, inner);
            }
            (Alignment::Left, other) => children[idx] = other,
            (
                _,
                Node::Element {
                    container: Container::Align(_),
                    children: inner,
                },
            ) => children[idx] = Node::element(Container::Align(alignment), inner),
            (_, other) => children[idx] = Node::element(Container::Align(alignment), vec![other]),
        }
    }
    CaretPlan::Keep(selection)
}

/// Turn the touched lines into a list, switch an existing list's kind, or
/// turn a list of the same kind back into plain lines. The caret moves to the
/// end of the affected lines.
fn toggle_list(tree: &mut DocumentTree, kind: ListKind, selection: Selection) -> CaretPlan {
    let Some(span) = tree.top_level_span(selection.to_range()) else {
        return CaretPlan::Keep(selection);
    };
    let children = tree.children_mut();
    let before: usize = children[..span.start].iter().map(Node::char_len).sum();
    let affected: usize = children[span.clone()].iter().map(Node::char_len).sum();
    let caret = CaretPlan::Relocate(before + affected, Affinity::Before);

    if span.len() == 1 {
        if let Node::Element {
            container: Container::List(existing),
            children: items,
        } = &mut children[span.start]
        {
            if *existing != kind {
                *existing = kind;
                return caret;
            }
            let lines: Vec<Node> = std::mem::take(items).into_iter().map(item_to_line).collect();
            children.splice(span, lines);
            return caret;
        }
    }

    let mut items = Vec::new();
    for node in children.drain(span.clone()) {
        match node {
            Node::Element {
                container: Container::Block | Container::ListItem,
                children,
            } => items.push(Node::element(Container::ListItem, children)),
            Node::Element {
                container: Container::List(_),
                children,
            } => items.extend(children),
            other => items.push(Node::element(Container::ListItem, vec![other])),
        }
    }
    children.insert(span.start, Node::element(Container::List(kind), items));
    caret
}

fn item_to_line(node: Node) -> Node {
    match node {
        Node::Element {
            container: Container::ListItem,
            children,
        } => Node::element(Container::Block, children),
        other => other,
    }
}

/// Formatting in effect at a caret offset, for toolbar active states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFormats {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub font_size: Option<u8>,
    pub font_name: Option<SmolStr>,
    pub fore_color: Option<SmolStr>,
    pub alignment: Option<Alignment>,
    pub list: Option<ListKind>,
}

pub fn active_formats(tree: &DocumentTree, offset: usize) -> ActiveFormats {
    let mut active = ActiveFormats::default();
    let Some(location) = to_tree(tree, offset) else {
        return active;
    };
    // Outermost first, so inner values win.
    for container in tree.ancestors(&location.path) {
        match container {
            Container::Bold => active.bold = true,
            Container::Italic => active.italic = true,
            Container::Underline => active.underline = true,
            Container::Strikethrough => active.strikethrough = true,
            Container::FontSize(size) => active.font_size = Some(*size),
            Container::FontName(name) => active.font_name = Some(name.clone()),
            Container::ForeColor(color) => active.fore_color = Some(color.clone()),
            Container::Align(alignment) => active.alignment = Some(*alignment),
            Container::List(kind) => active.list = Some(*kind),
            Container::Block | Container::ListItem => {}
        }
    }
    active
}
