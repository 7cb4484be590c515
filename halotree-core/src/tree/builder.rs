//! Tree construction from a contiguous block of catalog rows.
//!
//! Linking is a depth-first search over the block. From each node the
//! builder scans the rows after it, claims every unvisited row whose
//! `descendant_id` equals the node's id as a child, and descends into that
//! child before continuing the scan. The scan is driven by an explicit
//! frame stack, so tree depth is bounded by memory rather than the call
//! stack.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::tree::node::{NodeId, ROOT_DESCENDANT_ID};
use crate::tree::{Tree, TreeKeys, TreeRange};
use std::time::Instant;

/// Link columns of one row, prefetched for the scan
#[derive(Debug, Clone, Copy)]
struct RowLink {
    id: i64,
    descendant_id: i64,
}

/// Pending scan of one node: rows before `next` (range-relative) are done
#[derive(Debug)]
struct Frame {
    node: NodeId,
    id: i64,
    next: usize,
}

impl Tree {
    /// Builds the tree whose root is at `root_row` from rows
    /// `[root_row, end_row)`.
    ///
    /// Columns are resolved by name, so the catalog must have loaded `id`
    /// and `descendant_id`. `scale` and `virial_mass` are copied into each
    /// [`crate::tree::Halo`] when present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if a link column is missing,
    /// [`Error::OutOfRange`] if the range is empty or runs past the catalog,
    /// and [`Error::MalformedInput`] if a second root shows up inside the
    /// range.
    pub fn build(catalog: &Catalog, root_row: usize, end_row: usize) -> Result<Self> {
        let keys = TreeKeys::resolve(catalog)?;
        Self::build_with_keys(catalog, &keys, TreeRange::new(root_row, end_row))
    }

    /// Same as [`Tree::build`], with column keys resolved up front
    ///
    /// # Errors
    ///
    /// See [`Tree::build`].
    pub fn build_with_keys(catalog: &Catalog, keys: &TreeKeys, range: TreeRange) -> Result<Self> {
        if range.is_empty() || range.end_row > catalog.row_count() {
            return Err(Error::OutOfRange {
                row: range.end_row.max(range.root_row),
                column: keys.id.index(),
                rows: catalog.row_count(),
                columns: catalog.column_count(),
            });
        }

        let started = Instant::now();

        let links = (range.root_row..range.end_row)
            .map(|row| {
                Ok(RowLink {
                    id: catalog.get(row, keys.id)?,
                    descendant_id: catalog.get(row, keys.descendant_id)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Whatever the root row says, it is treated as the root
        let mut root = keys.read_halo(catalog, range.root_row)?;
        root.descendant_id = ROOT_DESCENDANT_ID;

        let mut tree = Tree::with_root(root, range);
        let mut visited = vec![false; links.len()];
        if let Some(first) = visited.first_mut() {
            *first = true;
        }

        link_progenitors(catalog, keys, &mut tree, &links, &mut visited)?;

        let unlinked = visited.iter().filter(|&&seen| !seen).count();
        tree.set_unlinked(unlinked);
        if unlinked > 0 {
            tracing::warn!(
                root_row = range.root_row,
                end_row = range.end_row,
                unlinked,
                "rows in tree range are not connected to its root"
            );
        }

        tracing::debug!(
            root_id = root.id,
            root_row = range.root_row,
            nodes = tree.len(),
            seconds = started.elapsed().as_secs_f64(),
            "built tree"
        );

        Ok(tree)
    }
}

/// Depth-first linking pass.
///
/// Produces the same node order as recursing into each child as soon as it
/// is found.
#[allow(clippy::indexing_slicing)]
fn link_progenitors(
    catalog: &Catalog,
    keys: &TreeKeys,
    tree: &mut Tree,
    links: &[RowLink],
    visited: &mut [bool],
) -> Result<()> {
    let range = tree.range();
    let root = tree.root();
    let mut stack = vec![Frame { node: root.id(), id: root.halo().id, next: 1 }];

    while let Some(frame) = stack.last_mut() {
        let parent = frame.node;
        let mut found = None;

        while frame.next < links.len() {
            let offset = frame.next;
            frame.next += 1;

            if visited[offset] {
                continue;
            }

            let link = links[offset];
            if link.descendant_id == frame.id {
                visited[offset] = true;
                found = Some((offset, link.id));
                break;
            }
            if link.descendant_id == ROOT_DESCENDANT_ID {
                return Err(Error::MalformedInput {
                    row: range.root_row + offset,
                    start: range.root_row,
                    end: range.end_row,
                });
            }
        }

        match found {
            Some((offset, id)) => {
                let halo = keys.read_halo(catalog, range.root_row + offset)?;
                let child = tree.add_child(parent, halo);
                stack.push(Frame { node: child, id, next: offset + 1 });
            }
            None => {
                stack.pop();
            }
        }
    }

    Ok(())
}
