//! HaloTree - merger-tree reconstruction for halo catalogs
//!
//! HaloTree reads the whitespace-delimited catalogs written by Rockstar and
//! consistent-trees, rebuilds every merger tree from `descendant_id` links,
//! and walks the result: main-branch histories, breadth-first subtree
//! searches, ancestry and assembly times.
//!
//! # Features
//!
//! - Memory-mapped, read-only catalog loading under a shared file lock
//! - Column masks: only the fields you name are parsed and stored
//! - Typed field access with a runtime kind check (`i64` / `f64`)
//! - Arena-backed trees, built without recursion
//! - Borrowed node handles that cannot outlive their tree
//!
//! # Example
//!
//! ```no_run
//! use halotree_core::{CatalogOptions, MergerTreeCatalog};
//! use halotree_core::tree::traverse_most_massive_branch;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut catalog = MergerTreeCatalog::open("tree_0_0_0.dat", CatalogOptions::default())?;
//! catalog.build_forest()?;
//!
//! let forest = catalog.forest().expect("forest was just built");
//! let tree = forest.get(0).expect("catalog has at least one tree");
//!
//! let mvir = catalog.catalog().internal_key("virial_mass")?;
//! let history: Vec<f64> = traverse_most_massive_branch(catalog.catalog(), tree.root(), mvir)?;
//! println!("main branch: {} snapshots", history.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Layout
//!
//! The crate is a library. It does not plot, write catalogs, or run halo
//! finders; those belong to the application layer.

pub mod catalog;
pub mod error;
pub mod header;
pub mod tree;

pub use catalog::{Catalog, CatalogFormat, ColumnKey, FieldKind, FieldSpec, FieldType, FieldValue};
pub use error::Error;
pub use header::{CatalogHeader, Cosmology};
pub use tree::{Forest, Halo, NodeRef, Tree, TreeKeys, TreeRange};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration options for [`MergerTreeCatalog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Column layout of the file
    pub format: CatalogFormat,

    /// Fields to load; empty loads every field of the format
    pub columns: Vec<String>,
}

impl CatalogOptions {
    /// Options loading just the tree columns of `format`
    #[must_use]
    pub fn for_format(format: CatalogFormat) -> Self {
        Self { format, columns: format.tree_columns().iter().map(ToString::to_string).collect() }
    }

    /// Adds fields to the column mask
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::for_format(CatalogFormat::default())
    }
}

/// Public facade over one catalog file and its merger trees
///
/// Loading is eager, tree building is deferred to
/// [`MergerTreeCatalog::build_forest`] so that callers who only need field
/// access do not pay for it.
#[derive(Debug)]
pub struct MergerTreeCatalog {
    path: PathBuf,
    catalog: Catalog,
    keys: TreeKeys,
    forest: Option<Forest>,
}

impl MergerTreeCatalog {
    /// Loads a catalog file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened, locked or mapped
    /// - A column name is not part of the format
    /// - `id` or `descendant_id` is missing from the column mask
    /// - A row is too short or a field does not parse
    pub fn open<P: AsRef<Path>>(path: P, options: CatalogOptions) -> Result<Self> {
        let path = path.as_ref();

        let catalog = Catalog::read_data_from_file(path, options.format, options.columns.as_slice())
            .with_context(|| format!("failed to load {} catalog {}", options.format, path.display()))?;

        let keys = TreeKeys::resolve(&catalog).context("catalog cannot be linked into trees")?;

        Ok(Self { path: path.to_path_buf(), catalog, keys, forest: None })
    }

    /// Builds every tree, or returns the forest built earlier
    ///
    /// # Errors
    ///
    /// Returns an error if a tree range holds a second root.
    pub fn build_forest(&mut self) -> Result<&Forest> {
        if self.forest.is_none() {
            let forest = Forest::build_with_keys(&self.catalog, self.keys)
                .with_context(|| format!("failed to build merger trees from {}", self.path.display()))?;
            self.forest = Some(forest);
        }

        self.forest.as_ref().context("forest missing after build")
    }

    /// The forest, if [`MergerTreeCatalog::build_forest`] has run
    pub fn forest(&self) -> Option<&Forest> {
        self.forest.as_ref()
    }

    /// Underlying column store
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Leading comment block of the file
    pub fn header(&self) -> &CatalogHeader {
        self.catalog.header()
    }

    /// File the catalog was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.catalog.row_count()
    }

    /// True if the file held no data rows
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Resolves a field by name
    ///
    /// # Errors
    ///
    /// Returns an error if the field was not loaded.
    pub fn field(&self, name: &str) -> Result<ColumnKey> {
        self.catalog
            .internal_key(name)
            .with_context(|| format!("field `{name}` is not loaded from {}", self.path.display()))
    }

    /// Column keys used to link trees
    pub fn keys(&self) -> &TreeKeys {
        &self.keys
    }
}
