//! Saving and restoring the caret across tree mutations.
//!
//! A caret is saved as a linear offset, which survives any restructuring that
//! keeps the linear text stable, and restored by mapping the offset back into
//! whatever tree exists afterwards. Nothing here fails loudly: a restore that
//! cannot be placed reports `false` and leaves the surface alone.

use tracing::{debug, trace};

use crate::offset_map::{to_linear, to_tree_with_affinity};
use crate::platform::CaretPlatform;
use crate::tree::DocumentTree;
use crate::types::{Affinity, Selection};

/// Linear offset of the caret (the selection's focus). Falls back to 0 when
/// the surface has no selection.
pub fn save_caret<P: CaretPlatform + ?Sized>(tree: &DocumentTree, platform: &P) -> usize {
    match platform.selection() {
        Some((_, focus)) => to_linear(tree, &focus),
        None => 0,
    }
}

/// Put a collapsed caret at `offset`, clamping past-the-end offsets to the end
/// of the document. Returns whether the caret was placed.
pub fn restore_caret<P: CaretPlatform + ?Sized>(
    tree: &DocumentTree,
    platform: &mut P,
    offset: usize,
) -> bool {
    place_caret(tree, platform, offset, Affinity::Before)
}

/// Like [`restore_caret`], choosing which run a boundary offset lands in.
pub fn place_caret<P: CaretPlatform + ?Sized>(
    tree: &DocumentTree,
    platform: &mut P,
    offset: usize,
    affinity: Affinity,
) -> bool {
    let Some(location) = to_tree_with_affinity(tree, offset, affinity) else {
        trace!(target: "notepad::caret", offset, "no text runs, caret not restored");
        return false;
    };
    match platform.set_selection(location.clone(), location) {
        Ok(()) => {
            trace!(target: "notepad::caret", offset, "caret restored");
            true
        }
        Err(e) => {
            debug!(target: "notepad::caret", offset, error = %e, "caret restore failed");
            false
        }
    }
}

/// The current selection as linear offsets.
pub fn save_selection<P: CaretPlatform + ?Sized>(
    tree: &DocumentTree,
    platform: &P,
) -> Option<Selection> {
    let (anchor, focus) = platform.selection()?;
    Some(Selection::new(
        to_linear(tree, &anchor),
        to_linear(tree, &focus),
    ))
}

/// Reselect `selection` in `tree`.
///
/// Each end is mapped on its own. The start of a non-empty selection binds to
/// the run after a boundary and the end to the run before it, so a selection
/// that exactly covers a freshly wrapped run selects inside that run.
pub fn restore_selection<P: CaretPlatform + ?Sized>(
    tree: &DocumentTree,
    platform: &mut P,
    selection: Selection,
) -> bool {
    if selection.is_collapsed() {
        return restore_caret(tree, platform, selection.head);
    }
    let bind = |offset: usize| {
        let affinity = if offset == selection.start() {
            Affinity::After
        } else {
            Affinity::Before
        };
        to_tree_with_affinity(tree, offset, affinity)
    };
    let (Some(anchor), Some(focus)) = (bind(selection.anchor), bind(selection.head)) else {
        trace!(target: "notepad::caret", ?selection, "no text runs, selection not restored");
        return false;
    };
    match platform.set_selection(anchor, focus) {
        Ok(()) => true,
        Err(e) => {
            debug!(target: "notepad::caret", ?selection, error = %e, "selection restore failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ModelCaret, PlatformError};
    use crate::tree::{Container, Node, TreeLocation};

    struct Detached;

    impl CaretPlatform for Detached {
        fn selection(&self) -> Option<(TreeLocation, TreeLocation)> {
            None
        }

        fn set_selection(&mut self, _: TreeLocation, _: TreeLocation) -> Result<(), PlatformError> {
            Err("editor is not attached".into())
        }
    }

    fn tree() -> DocumentTree {
        DocumentTree::new(vec![Node::element(
            Container::Block,
            vec![
                Node::element(Container::Bold, vec![Node::text("Hello")]),
                Node::text(" wrld"),
            ],
        )])
    }

    #[test]
    fn test_save_and_restore_caret() {
        let tree = tree();
        let mut caret = ModelCaret::new();
        assert!(restore_caret(&tree, &mut caret, 7));
        assert_eq!(save_caret(&tree, &caret), 7);
        assert_eq!(
            caret.selection().map(|(_, focus)| focus),
            Some(TreeLocation::new(vec![0, 1], 2))
        );
    }

    #[test]
    fn test_restore_clamps_past_end() {
        let tree = tree();
        let mut caret = ModelCaret::new();
        assert!(restore_caret(&tree, &mut caret, 500));
        assert_eq!(save_caret(&tree, &caret), 10);
    }

    #[test]
    fn test_restore_on_empty_tree_is_noop() {
        let mut caret = ModelCaret::new();
        assert!(!restore_caret(&DocumentTree::default(), &mut caret, 0));
        assert_eq!(caret.selection(), None);
    }

    #[test]
    fn test_platform_failure_reports_false() {
        let tree = tree();
        assert!(!restore_caret(&tree, &mut Detached, 3));
        assert_eq!(save_caret(&tree, &Detached), 0);
        assert_eq!(save_selection(&tree, &Detached), None);
    }

    #[test]
    fn test_selection_round_trip() {
        let tree = tree();
        let mut caret = ModelCaret::new();
        assert!(restore_selection(&tree, &mut caret, Selection::new(5, 2)));
        assert_eq!(save_selection(&tree, &caret), Some(Selection::new(5, 2)));
    }

    #[test]
    fn test_selection_start_binds_to_following_run() {
        let tree = tree();
        let mut caret = ModelCaret::new();
        assert!(restore_selection(&tree, &mut caret, Selection::new(5, 8)));
        let (anchor, focus) = caret.selection().unwrap();
        assert_eq!(anchor, TreeLocation::new(vec![0, 1], 0));
        assert_eq!(focus, TreeLocation::new(vec![0, 1], 3));
    }
}
