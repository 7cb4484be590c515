use crate::catalog::{Catalog, ColumnKey};
use crate::error::Result;
use crate::tree::node::ROOT_DESCENDANT_ID;
use crate::tree::{Tree, TreeKeys, TreeRange};
use std::time::Instant;

/// Every tree of one catalog, in file order
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    keys: TreeKeys,
}

impl Forest {
    /// Splits the catalog into per-tree row ranges.
    ///
    /// A tree starts at each row whose `descendant_id` is `-1` and runs up to
    /// the next such row or the end of the catalog. Rows before the first
    /// root belong to no tree; they are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] for an invalid key and
    /// [`crate::Error::TypeMismatch`] if the column is not an integer column.
    pub fn discover_roots(catalog: &Catalog, descendant_id: ColumnKey) -> Result<Vec<TreeRange>> {
        let mut roots = Vec::new();
        for row in 0..catalog.row_count() {
            if catalog.get::<i64>(row, descendant_id)? == ROOT_DESCENDANT_ID {
                roots.push(row);
            }
        }

        match roots.first() {
            Some(&first) if first > 0 => {
                tracing::warn!(rows = first, "rows before the first root belong to no tree");
            }
            None if !catalog.is_empty() => {
                tracing::warn!(rows = catalog.row_count(), "catalog has no root rows");
            }
            _ => {}
        }

        let ends = roots.iter().skip(1).copied().chain(std::iter::once(catalog.row_count()));
        Ok(roots.iter().zip(ends).map(|(&root_row, end_row)| TreeRange::new(root_row, end_row)).collect())
    }

    /// Builds every tree in the catalog
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] if `id` or `descendant_id` was
    /// not loaded, and the first error any tree build reports.
    pub fn build(catalog: &Catalog) -> Result<Self> {
        let keys = TreeKeys::resolve(catalog)?;
        Self::build_with_keys(catalog, keys)
    }

    /// Same as [`Forest::build`], with column keys resolved up front
    ///
    /// # Errors
    ///
    /// See [`Forest::build`].
    pub fn build_with_keys(catalog: &Catalog, keys: TreeKeys) -> Result<Self> {
        let started = Instant::now();

        let ranges = Self::discover_roots(catalog, keys.descendant_id)?;
        let trees = ranges
            .into_iter()
            .map(|range| Tree::build_with_keys(catalog, &keys, range))
            .collect::<Result<Vec<_>>>()?;

        let nodes: usize = trees.iter().map(Tree::len).sum();
        tracing::info!(
            trees = trees.len(),
            nodes,
            seconds = started.elapsed().as_secs_f64(),
            "built forest"
        );

        Ok(Self { trees, keys })
    }

    /// Number of trees
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// True if the catalog held no roots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Tree by position in the file
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tree> {
        self.trees.get(index)
    }

    /// All trees in file order
    #[must_use]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Iterator over the trees
    pub fn iter(&self) -> std::slice::Iter<'_, Tree> {
        self.trees.iter()
    }

    /// Column keys the trees were built with
    #[must_use]
    pub fn keys(&self) -> &TreeKeys {
        &self.keys
    }

    /// Tree containing catalog row `row`
    #[must_use]
    pub fn tree_for_row(&self, row: usize) -> Option<&Tree> {
        let index = self.trees.partition_point(|tree| tree.range().end_row <= row);
        self.trees.get(index).filter(|tree| tree.range().contains(row))
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a Tree;
    type IntoIter = std::slice::Iter<'a, Tree>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
