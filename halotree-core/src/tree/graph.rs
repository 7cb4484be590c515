use crate::tree::node::{Halo, Node, NodeId, NodeRef};
use crate::tree::TreeRange;

/// Arena index of every tree's root
const ROOT: NodeId = 0;

/// One merger tree, owning all of its nodes.
///
/// Nodes are stored in discovery order: the root first, then a depth-first
/// pre-order walk in which each node's progenitors appear in catalog order.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    /// Arena index per row of `range`, `None` for rows not in the tree
    rows: Vec<Option<NodeId>>,
    range: TreeRange,
    unlinked: usize,
}

impl Tree {
    /// Creates a tree holding only `root`
    pub(crate) fn with_root(root: Halo, range: TreeRange) -> Self {
        let mut rows = vec![None; range.len()];
        if let Some(slot) = rows.get_mut(root.storage_row.wrapping_sub(range.root_row)) {
            *slot = Some(ROOT);
        }

        Self { nodes: vec![Node::new(root, None)], rows, range, unlinked: 0 }
    }

    /// Appends `halo` as the last child of `parent` and returns its id
    pub(crate) fn add_child(&mut self, parent: NodeId, halo: Halo) -> NodeId {
        debug_assert!(parent < self.nodes.len());

        let id = self.nodes.len();
        let offset = halo.storage_row.wrapping_sub(self.range.root_row);
        self.nodes.push(Node::new(halo, Some(parent)));
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(id);
        }
        if let Some(slot) = self.rows.get_mut(offset) {
            *slot = Some(id);
        }
        id
    }

    pub(crate) fn set_unlinked(&mut self, unlinked: usize) {
        self.unlinked = unlinked;
    }

    pub(crate) fn arena(&self) -> &[Node] {
        &self.nodes
    }

    /// The tree's root
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(self, ROOT)
    }

    /// Node by arena id
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then(|| NodeRef::new(self, id))
    }

    /// Node built from catalog row `row`, if that row belongs to this tree
    #[must_use]
    pub fn node_at_row(&self, row: usize) -> Option<NodeRef<'_>> {
        if !self.range.contains(row) {
            return None;
        }
        let id = (*self.rows.get(row - self.range.root_row)?)?;
        Some(NodeRef::new(self, id))
    }

    /// All nodes in discovery order
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |id| NodeRef::new(self, id))
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false, a tree holds at least its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Catalog rows this tree was built from
    #[must_use]
    pub fn range(&self) -> TreeRange {
        self.range
    }

    /// Rows of the range that no node links to
    #[must_use]
    pub fn unlinked_rows(&self) -> usize {
        self.unlinked
    }
}
