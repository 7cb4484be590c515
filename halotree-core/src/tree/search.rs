use crate::catalog::{Catalog, ColumnKey, FieldType};
use crate::error::Result;
use crate::tree::NodeRef;

/// Reads `key` along the main branch starting at `node`.
///
/// The first value is `node`'s own; each following value belongs to the
/// first child of the previous node. The walk stops at a leaf.
///
/// # Errors
///
/// Returns [`crate::Error::TypeMismatch`] if `T` does not match the column
/// kind, or [`crate::Error::OutOfRange`] if `key` is not a column of
/// `catalog`.
pub fn traverse_most_massive_branch<T: FieldType>(
    catalog: &Catalog,
    node: NodeRef<'_>,
    key: ColumnKey,
) -> Result<Vec<T>> {
    node.main_branch().map(|branch| catalog.get(branch.storage_row(), key)).collect()
}

/// Collects every node in the subtree of `node` for which
/// `predicate(value, query)` holds, where `value` is the node's `key` field.
///
/// Nodes are visited breadth-first, level by level, children in discovery
/// order, and matches are returned in visiting order. `node` itself is
/// tested too.
///
/// ```
/// use halotree_core::tree::breadth_first_search;
/// use halotree_core::{Catalog, CatalogFormat, Tree};
///
/// let text = "1.0 1 0.0 -1 2 -1 -1 -1 0 5e12 5e12\n\
///             0.9 2 1.0 1 0 -1 -1 -1 0 4e12 4e12\n\
///             0.9 3 1.0 1 0 -1 -1 -1 0 2e9 2e9\n";
/// let catalog = Catalog::parse(text, CatalogFormat::ConsistentTrees, &[
///     "id", "descendant_id", "virial_mass",
/// ])?;
/// let tree = Tree::build(&catalog, 0, catalog.row_count())?;
/// let mvir = catalog.internal_key("virial_mass")?;
///
/// let heavy = breadth_first_search(&catalog, tree.root(), mvir, 1e12, f64::gt)?;
/// assert_eq!(heavy.len(), 2);
/// # Ok::<(), halotree_core::Error>(())
/// ```
///
/// # Errors
///
/// Same as [`traverse_most_massive_branch`].
pub fn breadth_first_search<'t, T, P>(
    catalog: &Catalog,
    node: NodeRef<'t>,
    key: ColumnKey,
    query: T,
    predicate: P,
) -> Result<Vec<NodeRef<'t>>>
where
    T: FieldType,
    P: Fn(&T, &T) -> bool,
{
    let mut matches = Vec::new();

    for current in node.level_order() {
        let value: T = catalog.get(current.storage_row(), key)?;
        if predicate(&value, &query) {
            matches.push(current);
        }
    }

    Ok(matches)
}
