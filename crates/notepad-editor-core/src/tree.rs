//! Rich-text document tree.
//!
//! Leaves are text runs and line breaks; internal nodes are formatting
//! containers. The concatenation of every text run, in document order, is the
//! linear text that all offsets in this crate index into. Line breaks render
//! as a visual break but contribute no characters, the same way a `<br>`
//! contributes nothing to a DOM range's text.

use std::fmt::Write as _;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::offset_map::{to_tree, to_tree_with_affinity};
use crate::types::Affinity;

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// List flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// A formatting container wrapping other nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Container {
    /// One line/paragraph of content.
    Block,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    /// Relative font size, 1 (smallest) to 7 (largest).
    FontSize(u8),
    FontName(SmolStr),
    /// Text color.
    ForeColor(SmolStr),
    Align(Alignment),
    List(ListKind),
    ListItem,
}

impl Container {
    /// Whether both containers are the same kind of wrapper, ignoring values.
    pub fn same_kind(&self, other: &Container) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Block-level containers start a new line when rendered.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Container::Block | Container::Align(_) | Container::List(_) | Container::ListItem
        )
    }

    fn label(&self) -> String {
        match self {
            Container::Block => "block".into(),
            Container::Bold => "bold".into(),
            Container::Italic => "italic".into(),
            Container::Underline => "underline".into(),
            Container::Strikethrough => "strikethrough".into(),
            Container::FontSize(size) => format!("font-size({size})"),
            Container::FontName(name) => format!("font-name({name})"),
            Container::ForeColor(color) => format!("fore-color({color})"),
            Container::Align(align) => format!("align({align:?})").to_lowercase(),
            Container::List(kind) => format!("list({kind:?})").to_lowercase(),
            Container::ListItem => "list-item".into(),
        }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// A run of text. Its formatting is whatever its ancestors say.
    Text { text: String },
    /// A hard line break inside a block.
    LineBreak,
    Element {
        container: Container,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn element(container: Container, children: Vec<Node>) -> Self {
        Node::Element {
            container,
            children,
        }
    }

    /// Shorthand for a `Block` holding a single text run.
    pub fn block(text: impl Into<String>) -> Self {
        Node::element(Container::Block, vec![Node::text(text)])
    }

    /// Length of this subtree's contribution to the linear text, in chars.
    pub fn char_len(&self) -> usize {
        match self {
            Node::Text { text } => text.chars().count(),
            Node::LineBreak => 0,
            Node::Element { children, .. } => children.iter().map(Node::char_len).sum(),
        }
    }

    /// A node with nothing to render: empty text, or an element made only of
    /// such nodes.
    pub fn is_hollow(&self) -> bool {
        match self {
            Node::Text { text } => text.is_empty(),
            Node::LineBreak => false,
            Node::Element { children, .. } => children.iter().all(Node::is_hollow),
        }
    }

    /// Split this node at a local char offset into a left and a right part.
    ///
    /// Elements are duplicated on both sides (like splitting a DOM subtree);
    /// either side may come back hollow.
    pub fn split_at(self, at: usize) -> (Node, Node) {
        match self {
            Node::Text { text } => {
                let idx = byte_index(&text, at);
                let (left, right) = text.split_at(idx);
                (Node::text(left), Node::text(right))
            }
            Node::LineBreak => (Node::LineBreak, Node::text("")),
            Node::Element {
                container,
                children,
            } => {
                let mut left = Vec::new();
                let mut right = Vec::new();
                let mut pos = 0;
                for child in children {
                    let len = child.char_len();
                    let start = pos;
                    pos += len;
                    if pos <= at {
                        left.push(child);
                    } else if start >= at {
                        right.push(child);
                    } else {
                        let (l, r) = child.split_at(at - start);
                        left.push(l);
                        right.push(r);
                    }
                }
                (
                    Node::element(container.clone(), left),
                    Node::element(container, right),
                )
            }
        }
    }
}

/// Child-index path from the document root down to a node.
///
/// Lexicographic order of paths is document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn child(&self, idx: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(idx);
        Self(indices)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

/// A position inside the tree: a text run plus a char offset within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeLocation {
    pub path: NodePath,
    pub offset: usize,
}

impl TreeLocation {
    pub fn new(path: impl Into<NodePath>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// A borrowed text run together with where it sits in the linear text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun<'a> {
    pub path: NodePath,
    pub text: &'a str,
    /// Linear offset of the run's first char.
    pub start: usize,
    /// Length in chars.
    pub len: usize,
}

impl TextRun<'_> {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Ordered tree of formatting containers and text runs for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTree {
    children: Vec<Node>,
}

impl DocumentTree {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Build a tree of plain blocks, one per line. Empty lines hold a line
    /// break so they still render.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        let children = text
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    Node::element(Container::Block, vec![Node::LineBreak])
                } else {
                    Node::block(line)
                }
            })
            .collect();
        Self { children }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// All text runs in document order.
    pub fn text_runs(&self) -> Vec<TextRun<'_>> {
        let mut runs = Vec::new();
        let mut pos = 0;
        collect_runs(&self.children, &NodePath::default(), &mut pos, &mut runs);
        runs
    }

    pub fn len_chars(&self) -> usize {
        self.children.iter().map(Node::char_len).sum()
    }

    /// The linear text: every text run concatenated.
    pub fn linear_text(&self) -> String {
        self.text_runs().iter().map(|run| run.text).collect()
    }

    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.children.get(*first)?;
        for idx in rest {
            match node {
                Node::Element { children, .. } => node = children.get(*idx)?,
                _ => return None,
            }
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for idx in rest {
            match node {
                Node::Element { children, .. } => node = children.get_mut(*idx)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Mutable access to the text of the run at `path`.
    pub fn run_text_mut(&mut self, path: &NodePath) -> Option<&mut String> {
        match self.node_mut(path)? {
            Node::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Containers enclosing the node at `path`, outermost first.
    pub fn ancestors(&self, path: &NodePath) -> Vec<&Container> {
        let mut out = Vec::new();
        let mut nodes = &self.children;
        let indices = path.indices();
        for (depth, idx) in indices.iter().enumerate() {
            let Some(node) = nodes.get(*idx) else {
                break;
            };
            if depth + 1 == indices.len() {
                break;
            }
            match node {
                Node::Element {
                    container,
                    children,
                } => {
                    out.push(container);
                    nodes = children;
                }
                _ => break,
            }
        }
        out
    }

    /// Insert plain text at a linear offset, inside the run that ends at or
    /// contains it. Returns the offset just after the inserted text.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> usize {
        let inserted = text.chars().count();
        match to_tree(self, offset) {
            Some(loc) => {
                if let Some(run) = self.run_text_mut(&loc.path) {
                    let idx = byte_index(run, loc.offset);
                    run.insert_str(idx, text);
                }
                offset.min(self.len_chars() - inserted) + inserted
            }
            None => {
                self.push_first_run(text);
                inserted
            }
        }
    }

    /// Insert plain text into the run at `location`. Returns `false` when the
    /// location doesn't name a run of this tree.
    pub fn insert_text_at(&mut self, location: &TreeLocation, text: &str) -> bool {
        let Some(run) = self.run_text_mut(&location.path) else {
            return false;
        };
        if location.offset > run.chars().count() {
            return false;
        }
        let idx = byte_index(run, location.offset);
        run.insert_str(idx, text);
        true
    }

    /// Remove the chars in `range` from every run it touches. Runs are edited
    /// in place, so formatting outside the range is untouched.
    pub fn delete_range(&mut self, range: Range<usize>) -> usize {
        let targets: Vec<(NodePath, Range<usize>)> = self
            .text_runs()
            .into_iter()
            .filter(|run| run.start < range.end && run.end() > range.start)
            .map(|run| {
                let local_start = range.start.max(run.start) - run.start;
                let local_end = range.end.min(run.end()) - run.start;
                (run.path, local_start..local_end)
            })
            .collect();

        let mut removed = 0;
        for (path, local) in targets {
            if let Some(text) = self.run_text_mut(&path) {
                let start = byte_index(text, local.start);
                let end = byte_index(text, local.end);
                text.drain(start..end);
                removed += local.len();
            }
        }
        removed
    }

    /// Insert a sequence of sibling nodes at a linear offset, splitting the
    /// run there. Without any text run to split they are appended to the
    /// last block.
    pub fn insert_nodes(&mut self, offset: usize, nodes: Vec<Node>) {
        let mut pending = Some(nodes);
        insert_into(&mut self.children, 0, offset, &mut pending);
        let Some(nodes) = pending else {
            return;
        };
        match self.children.last_mut() {
            Some(Node::Element {
                container,
                children,
            }) if container.is_block() => children.extend(nodes),
            _ => self.children.push(Node::element(Container::Block, nodes)),
        }
    }

    /// Wrap every char in `range` with `container`.
    pub fn wrap_range(&mut self, range: Range<usize>, container: &Container) {
        if range.is_empty() {
            return;
        }
        let children = std::mem::take(&mut self.children);
        self.children = wrap_nodes(children, 0, &range, container);
    }

    /// Remove every container matching `pred` from the chars in `range`.
    /// Containers straddling the range boundary are split so the parts
    /// outside the range keep their formatting.
    pub fn unwrap_range(&mut self, range: Range<usize>, pred: &dyn Fn(&Container) -> bool) {
        if range.is_empty() {
            return;
        }
        let children = std::mem::take(&mut self.children);
        self.children = unwrap_nodes(children, 0, &range, pred);
    }

    /// Whether every char in `range` sits under a container matching `pred`.
    pub fn range_has_container(
        &self,
        range: Range<usize>,
        pred: &dyn Fn(&Container) -> bool,
    ) -> bool {
        let mut any = false;
        for run in self.text_runs() {
            if run.start >= range.end || run.end() <= range.start || run.len == 0 {
                continue;
            }
            any = true;
            if !self.ancestors(&run.path).into_iter().any(|c| pred(c)) {
                return false;
            }
        }
        any
    }

    /// Linear range of each top-level child.
    pub fn top_level_ranges(&self) -> Vec<Range<usize>> {
        let mut pos = 0;
        self.children
            .iter()
            .map(|child| {
                let start = pos;
                pos += child.char_len();
                start..pos
            })
            .collect()
    }

    /// Indices of the top-level children a selection touches. A collapsed
    /// selection touches the first child whose range includes the caret.
    pub fn top_level_span(&self, range: Range<usize>) -> Option<Range<usize>> {
        let ranges = self.top_level_ranges();
        let hits: Vec<usize> = ranges
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                if range.is_empty() {
                    r.start <= range.start && range.start <= r.end
                } else {
                    r.start < range.end && r.end > range.start
                }
            })
            .map(|(idx, _)| idx)
            .collect();
        let first = *hits.first()?;
        let last = if range.is_empty() {
            first
        } else {
            *hits.last()?
        };
        Some(first..last + 1)
    }

    /// Merge adjacent text runs and identical adjacent inline containers, and
    /// drop hollow inline nodes. Blocks are never merged.
    pub fn normalize(&mut self) {
        let children = std::mem::take(&mut self.children);
        self.children = normalize_nodes(children);
    }

    /// Indented outline of the tree, for debugging and snapshots.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_nodes(&self.children, 0, &mut out);
        out
    }

    /// Location of the run containing the char after `offset`, which is what
    /// edits that start at `offset` want.
    pub fn location_after(&self, offset: usize) -> Option<TreeLocation> {
        to_tree_with_affinity(self, offset, Affinity::After)
    }

    fn push_first_run(&mut self, text: &str) {
        if matches!(self.children.first(), Some(Node::Element { .. })) {
            push_into_first_leaf(&mut self.children, text);
        } else {
            self.children.insert(0, Node::block(text));
        }
    }
}

/// Byte index of the `char_idx`-th char, or the string length past the end.
pub fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

fn push_into_first_leaf(nodes: &mut Vec<Node>, text: &str) {
    match nodes.first_mut() {
        Some(Node::Element { children, .. }) => push_into_first_leaf(children, text),
        _ => nodes.insert(0, Node::text(text)),
    }
}

fn has_text_run(node: &Node) -> bool {
    match node {
        Node::Text { .. } => true,
        Node::LineBreak => false,
        Node::Element { children, .. } => children.iter().any(has_text_run),
    }
}

fn collect_runs<'a>(
    nodes: &'a [Node],
    parent: &NodePath,
    pos: &mut usize,
    runs: &mut Vec<TextRun<'a>>,
) {
    for (idx, node) in nodes.iter().enumerate() {
        match node {
            Node::Text { text } => {
                let len = text.chars().count();
                runs.push(TextRun {
                    path: parent.child(idx),
                    text,
                    start: *pos,
                    len,
                });
                *pos += len;
            }
            Node::LineBreak => {}
            Node::Element { children, .. } => {
                collect_runs(children, &parent.child(idx), pos, runs);
            }
        }
    }
}

fn insert_into(
    nodes: &mut Vec<Node>,
    base: usize,
    offset: usize,
    pending: &mut Option<Vec<Node>>,
) -> bool {
    let mut pos = base;
    let mut idx = 0;
    while idx < nodes.len() {
        let len = nodes[idx].char_len();
        let start = pos;
        let end = start + len;
        if start <= offset && offset <= end {
            if matches!(nodes[idx], Node::Text { .. }) {
                let Some(inserted) = pending.take() else {
                    return true;
                };
                let text = nodes.remove(idx);
                let (left, right) = text.split_at(offset - start);
                let mut replacement = Vec::with_capacity(inserted.len() + 2);
                if !left.is_hollow() {
                    replacement.push(left);
                }
                replacement.extend(inserted);
                if !right.is_hollow() {
                    replacement.push(right);
                }
                nodes.splice(idx..idx, replacement);
                return true;
            }
            if let Node::Element { children, .. } = &mut nodes[idx] {
                if has_text_run_in(children) && insert_into(children, start, offset, pending) {
                    return true;
                }
            }
        }
        pos = end;
        idx += 1;
    }
    false
}

fn has_text_run_in(nodes: &[Node]) -> bool {
    nodes.iter().any(has_text_run)
}

fn wrap_nodes(
    nodes: Vec<Node>,
    base: usize,
    range: &Range<usize>,
    container: &Container,
) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut pos = base;
    for node in nodes {
        let start = pos;
        let len = node.char_len();
        let end = start + len;
        pos = end;
        if len == 0 || end <= range.start || start >= range.end {
            out.push(node);
            continue;
        }
        match node {
            Node::Text { .. } => {
                let local_start = range.start.saturating_sub(start);
                let local_end = (range.end - start).min(len);
                let (before, rest) = node.split_at(local_start);
                let (mid, after) = rest.split_at(local_end - local_start);
                if !before.is_hollow() {
                    out.push(before);
                }
                out.push(Node::element(container.clone(), vec![mid]));
                if !after.is_hollow() {
                    out.push(after);
                }
            }
            Node::Element {
                container: own,
                children,
            } => {
                let children = wrap_nodes(children, start, range, container);
                out.push(Node::element(own, children));
            }
            Node::LineBreak => out.push(node),
        }
    }
    out
}

fn unwrap_nodes(
    nodes: Vec<Node>,
    base: usize,
    range: &Range<usize>,
    pred: &dyn Fn(&Container) -> bool,
) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut pos = base;
    for node in nodes {
        let start = pos;
        let len = node.char_len();
        let end = start + len;
        pos = end;
        if len == 0 || end <= range.start || start >= range.end {
            out.push(node);
            continue;
        }
        let matched = matches!(&node, Node::Element { container, .. } if pred(container));
        if matched {
            let local_start = range.start.saturating_sub(start).min(len);
            let local_end = range.end.saturating_sub(start).min(len);
            let (left, rest) = node.split_at(local_start);
            let (mid, right) = rest.split_at(local_end - local_start);
            if !left.is_hollow() {
                out.push(left);
            }
            if let Node::Element { children, .. } = mid {
                out.extend(unwrap_nodes(children, start + local_start, range, pred));
            }
            if !right.is_hollow() {
                out.push(right);
            }
            continue;
        }
        match node {
            Node::Element {
                container,
                children,
            } => {
                let children = unwrap_nodes(children, start, range, pred);
                out.push(Node::element(container, children));
            }
            other => out.push(other),
        }
    }
    out
}

fn normalize_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = match node {
            Node::Element {
                container,
                children,
            } => Node::element(container, normalize_nodes(children)),
            other => other,
        };
        match &node {
            // An empty run right after a break holds the caret on the new line.
            Node::Text { text }
                if text.is_empty() && !matches!(out.last(), Some(Node::LineBreak)) =>
            {
                continue;
            }
            Node::Element { container, .. } if !container.is_block() && node.is_hollow() => {
                continue;
            }
            _ => {}
        }
        let leftover = match out.last_mut() {
            Some(prev) => merge_into(prev, node),
            None => Some(node),
        };
        if let Some(node) = leftover {
            out.push(node);
        }
    }
    out
}

/// Fold `node` into `prev` when they are mergeable neighbours; otherwise hand
/// it back.
fn merge_into(prev: &mut Node, node: Node) -> Option<Node> {
    match (prev, node) {
        (Node::Text { text: prev }, Node::Text { text }) => {
            prev.push_str(&text);
            None
        }
        (
            Node::Element {
                container: prev_container,
                children: prev_children,
            },
            Node::Element {
                container,
                children,
            },
        ) if *prev_container == container && !container.is_block() => {
            prev_children.extend(children);
            let merged = normalize_nodes(std::mem::take(prev_children));
            *prev_children = merged;
            None
        }
        (_, node) => Some(node),
    }
}

fn dump_nodes(nodes: &[Node], depth: usize, out: &mut String) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node {
            Node::Text { text } => {
                let _ = writeln!(out, "{indent}{text:?}");
            }
            Node::LineBreak => {
                let _ = writeln!(out, "{indent}<br>");
            }
            Node::Element {
                container,
                children,
            } => {
                let _ = writeln!(out, "{indent}{}", container.label());
                dump_nodes(children, depth + 1, out);
            }
        }
    }
}
