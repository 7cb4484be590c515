//! Merger trees rebuilt from `descendant_id` links.
//!
//! A catalog is a sequence of contiguous row blocks, one per tree, each
//! starting at a root (`descendant_id == -1`). [`Forest`] finds the blocks,
//! [`Tree`] links the halos of one block, and the free functions in this
//! module walk the result.

mod assembly;
mod builder;
mod forest;
mod graph;
mod node;
mod search;

pub use assembly::{assembly_scale, assembly_scales};
pub use forest::Forest;
pub use graph::Tree;
pub use node::{Ancestors, Children, Halo, LevelOrder, MainBranch, NodeId, NodeRef, ROOT_DESCENDANT_ID};
pub use search::{breadth_first_search, traverse_most_massive_branch};

use crate::catalog::{Catalog, ColumnKey};
use crate::error::Result;

/// Field holding the halo id
pub const ID_FIELD: &str = "id";
/// Field holding the descendant's id
pub const DESCENDANT_ID_FIELD: &str = "descendant_id";
/// Field holding the scale factor
pub const SCALE_FIELD: &str = "scale";
/// Field holding the virial mass
pub const VIRIAL_MASS_FIELD: &str = "virial_mass";

/// Half-open row interval `[root_row, end_row)` holding one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeRange {
    /// Row of the tree's root
    pub root_row: usize,
    /// One past the tree's last row
    pub end_row: usize,
}

impl TreeRange {
    /// Creates a range
    #[must_use]
    pub fn new(root_row: usize, end_row: usize) -> Self {
        Self { root_row, end_row }
    }

    /// Number of rows in the range
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_row.saturating_sub(self.root_row)
    }

    /// True if the range holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `row` lies inside the range
    #[must_use]
    pub fn contains(&self, row: usize) -> bool {
        (self.root_row..self.end_row).contains(&row)
    }
}

/// Column keys the tree builder reads, resolved once per catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeKeys {
    /// `id` column
    pub id: ColumnKey,
    /// `descendant_id` column
    pub descendant_id: ColumnKey,
    /// `scale` column, if loaded
    pub scale: Option<ColumnKey>,
    /// `virial_mass` column, if loaded
    pub virial_mass: Option<ColumnKey>,
}

impl TreeKeys {
    /// Resolves the tree columns of `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] if `id` or `descendant_id` was
    /// not loaded. `scale` and `virial_mass` are optional.
    pub fn resolve(catalog: &Catalog) -> Result<Self> {
        Ok(Self {
            id: catalog.internal_key(ID_FIELD)?,
            descendant_id: catalog.internal_key(DESCENDANT_ID_FIELD)?,
            scale: catalog.optional_key(SCALE_FIELD),
            virial_mass: catalog.optional_key(VIRIAL_MASS_FIELD),
        })
    }

    /// Reads the halo stored at `row`
    pub(crate) fn read_halo(&self, catalog: &Catalog, row: usize) -> Result<Halo> {
        Ok(Halo {
            id: catalog.get(row, self.id)?,
            descendant_id: catalog.get(row, self.descendant_id)?,
            scale: self.scale.map(|key| catalog.get(row, key)).transpose()?,
            virial_mass: self.virial_mass.map(|key| catalog.get(row, key)).transpose()?,
            storage_row: row,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogFormat;
    use crate::error::Error;

    const TEXT: &str = "\
1.00000 100 0.00000 -1 2 -1 -1 -1 0 5.0e12 5.1e12
0.95000 90 1.00000 100 1 -1 -1 -1 0 3.0e12 3.1e12
";

    #[test]
    fn test_range() {
        let range = TreeRange::new(3, 7);
        assert_eq!(range.len(), 4);
        assert!(range.contains(3));
        assert!(!range.contains(7));
        assert!(TreeRange::new(5, 5).is_empty());
    }

    #[test]
    fn test_resolve_optional_columns() {
        let catalog = Catalog::parse(TEXT, CatalogFormat::ConsistentTrees, &["id", "descendant_id"]).unwrap();
        let keys = TreeKeys::resolve(&catalog).unwrap();

        assert_eq!(keys.scale, None);
        assert_eq!(keys.virial_mass, None);

        let halo = keys.read_halo(&catalog, 1).unwrap();
        assert_eq!(halo.id, 90);
        assert_eq!(halo.descendant_id, 100);
        assert_eq!(halo.scale, None);
        assert_eq!(halo.storage_row, 1);
    }

    #[test]
    fn test_read_halo_with_all_columns() {
        let catalog = Catalog::parse::<&str>(TEXT, CatalogFormat::ConsistentTrees, &[
            "id",
            "descendant_id",
            "scale",
            "virial_mass",
        ])
        .unwrap();
        let keys = TreeKeys::resolve(&catalog).unwrap();
        let halo = keys.read_halo(&catalog, 0).unwrap();

        assert_eq!(halo.scale, Some(1.0));
        assert_eq!(halo.virial_mass, Some(5.1e12));
        assert!(halo.is_root());
    }

    #[test]
    fn test_resolve_requires_links() {
        let catalog = Catalog::parse(TEXT, CatalogFormat::ConsistentTrees, &["id", "scale"]).unwrap();
        let err = TreeKeys::resolve(&catalog).unwrap_err();
        assert!(matches!(err, Error::UnknownField(name) if name == DESCENDANT_ID_FIELD));
    }
}
