//! Conversion between linear char offsets and tree locations.
//!
//! The linear offset of a location is the number of chars in every text run
//! before it in document order, plus the offset inside its own run. Runs are
//! treated as end-inclusive: an offset that lands exactly on the boundary
//! between two runs resolves to the end of the earlier one unless the caller
//! asks for [`Affinity::After`].

use crate::tree::{DocumentTree, TreeLocation};
use crate::types::Affinity;

/// Linear offset of a tree location.
///
/// A location whose run is not in the tree still counts every run that sorts
/// before its path, so stale locations degrade to a nearby offset instead of
/// failing.
pub fn to_linear(tree: &DocumentTree, location: &TreeLocation) -> usize {
    let mut consumed = 0;
    for run in tree.text_runs() {
        if run.path == location.path {
            return consumed + location.offset.min(run.len);
        }
        if run.path > location.path {
            break;
        }
        consumed += run.len;
    }
    consumed
}

/// Tree location of a linear offset, preferring the end of the earlier run on
/// a boundary.
///
/// Offsets past the end clamp to the end of the last run. Returns `None` only
/// when the tree has no text runs at all.
pub fn to_tree(tree: &DocumentTree, offset: usize) -> Option<TreeLocation> {
    to_tree_with_affinity(tree, offset, Affinity::Before)
}

/// Tree location of a linear offset. With [`Affinity::After`] a boundary
/// offset resolves to the start of the later run, and the end of the document
/// resolves to the last run, even an empty one.
pub fn to_tree_with_affinity(
    tree: &DocumentTree,
    offset: usize,
    affinity: Affinity,
) -> Option<TreeLocation> {
    let runs = tree.text_runs();
    let last = runs.last()?;

    let hit = match affinity {
        Affinity::Before => runs.iter().find(|run| offset <= run.end()),
        Affinity::After => runs
            .iter()
            .find(|run| offset < run.end())
            .or_else(|| {
                runs.iter()
                    .rev()
                    .find(|run| run.start <= offset && offset <= run.end())
            }),
    };

    Some(match hit {
        Some(run) => TreeLocation {
            path: run.path.clone(),
            offset: offset.saturating_sub(run.start),
        },
        None => TreeLocation {
            path: last.path.clone(),
            offset: last.len,
        },
    })
}
