//! Halo records, arena nodes, and borrowed node handles.
//!
//! # Ownership Model
//!
//! All nodes of a tree live in one arena (`Vec<Node>`) owned by the [`Tree`].
//! A node's children are a list of arena indices, and its parent is a plain
//! index as well. Nothing is reference counted, so there is no cycle to
//! break: dropping the tree drops every node.
//!
//! Callers see nodes through [`NodeRef`], a `Copy` handle that borrows the
//! tree. A handle cannot outlive the tree it came from:
//!
//! ```compile_fail
//! use halotree_core::{Catalog, CatalogFormat, Tree};
//!
//! let root = {
//!     let catalog = Catalog::parse(
//!         "1.0 7 0.0 -1 0 -1 -1 -1 0 1e12 1e12\n",
//!         CatalogFormat::ConsistentTrees,
//!         &["id", "descendant_id"],
//!     )
//!     .unwrap();
//!     let tree = Tree::build(&catalog, 0, 1).unwrap();
//!
//!     // ERROR: `tree` does not live long enough
//!     tree.root()
//! };
//!
//! println!("{}", root.halo().id);
//! ```

use crate::tree::Tree;
use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;

/// Index of a node in its tree's arena
pub type NodeId = usize;

/// `descendant_id` of a halo with no descendant in the catalog
pub const ROOT_DESCENDANT_ID: i64 = -1;

/// Identity of one halo as read from the catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Halo {
    /// Halo id, unique within one catalog file
    pub id: i64,
    /// Id of the descendant halo, [`ROOT_DESCENDANT_ID`] for roots
    pub descendant_id: i64,
    /// Scale factor, when the `scale` column is loaded
    pub scale: Option<f64>,
    /// Virial mass in Msun/h, when the `virial_mass` column is loaded
    pub virial_mass: Option<f64>,
    /// Row in the catalog this halo was read from
    pub storage_row: usize,
}

impl Halo {
    /// True if this halo has no descendant
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.descendant_id == ROOT_DESCENDANT_ID
    }
}

impl fmt::Display for Halo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "halo {} (descendant {}, row {}", self.id, self.descendant_id, self.storage_row)?;
        if let Some(scale) = self.scale {
            write!(f, ", a = {scale}")?;
        }
        if let Some(mass) = self.virial_mass {
            write!(f, ", Mvir = {mass:e} Msun/h")?;
        }
        write!(f, ")")
    }
}

/// Arena slot for one halo
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) halo: Halo,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(halo: Halo, parent: Option<NodeId>) -> Self {
        Self { halo, parent, children: Vec::new() }
    }
}

/// Read-only handle to a node, borrowing its tree
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    /// Caller guarantees `id` is a valid arena index of `tree`
    pub(crate) fn new(tree: &'t Tree, id: NodeId) -> Self {
        debug_assert!(id < tree.len());
        Self { tree, id }
    }

    #[allow(clippy::indexing_slicing)]
    fn entry(&self) -> &'t Node {
        // Handles are only created for ids that exist in the arena
        &self.tree.arena()[self.id]
    }

    /// Arena index of this node
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Tree this node belongs to
    #[must_use]
    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// Halo stored in this node
    #[must_use]
    pub fn halo(&self) -> &'t Halo {
        &self.entry().halo
    }

    /// Catalog row of this node's halo
    #[must_use]
    pub fn storage_row(&self) -> usize {
        self.entry().halo.storage_row
    }

    /// The node this halo descends into, `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.entry().parent.map(|id| NodeRef::new(self.tree, id))
    }

    /// Direct progenitors in discovery order
    #[must_use]
    pub fn children(&self) -> Children<'t> {
        Children { tree: self.tree, ids: self.entry().children.iter() }
    }

    /// First discovered progenitor
    #[must_use]
    pub fn first_child(&self) -> Option<NodeRef<'t>> {
        self.entry().children.first().map(|&id| NodeRef::new(self.tree, id))
    }

    /// Number of direct progenitors
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.entry().children.len()
    }

    /// True for the tree's root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.entry().parent.is_none()
    }

    /// True if the node has no progenitors
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.entry().children.is_empty()
    }

    /// Parent, grandparent, ... up to and including the root
    #[must_use]
    pub fn ancestors(&self) -> Ancestors<'t> {
        Ancestors { next: self.parent() }
    }

    /// Number of edges between this node and the root
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// This node, then its first child, then that child's first child, ...
    #[must_use]
    pub fn main_branch(&self) -> MainBranch<'t> {
        MainBranch { next: Some(*self) }
    }

    /// Subtree rooted here in breadth-first order, this node first.
    ///
    /// Children are queued in discovery order.
    #[must_use]
    pub fn level_order(&self) -> LevelOrder<'t> {
        LevelOrder { queue: VecDeque::from([*self]) }
    }

    /// Number of nodes in the subtree rooted here, this node included
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("halo", self.halo())
            .field("children", &self.child_count())
            .finish()
    }
}

/// Iterator over a node's direct children
#[derive(Debug, Clone)]
pub struct Children<'t> {
    tree: &'t Tree,
    ids: std::slice::Iter<'t, NodeId>,
}

impl<'t> Iterator for Children<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| NodeRef::new(self.tree, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| NodeRef::new(self.tree, id))
    }
}

impl ExactSizeIterator for Children<'_> {}
impl FusedIterator for Children<'_> {}

/// Iterator walking parent links towards the root
#[derive(Debug, Clone)]
pub struct Ancestors<'t> {
    next: Option<NodeRef<'t>>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl FusedIterator for Ancestors<'_> {}

/// Iterator following the first child at every step.
///
/// This is the most massive progenitor branch only if the catalog lists each
/// halo's most massive progenitor first, which consistent-trees does. The
/// order is not checked.
#[derive(Debug, Clone)]
pub struct MainBranch<'t> {
    next: Option<NodeRef<'t>>,
}

impl<'t> Iterator for MainBranch<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.first_child();
        Some(current)
    }
}

impl FusedIterator for MainBranch<'_> {}

/// Breadth-first walk over a subtree, see [`NodeRef::level_order`]
#[derive(Debug, Clone)]
pub struct LevelOrder<'t> {
    queue: VecDeque<NodeRef<'t>>,
}

impl<'t> Iterator for LevelOrder<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.pop_front()?;
        self.queue.extend(current.children());
        Some(current)
    }
}

impl FusedIterator for LevelOrder<'_> {}
