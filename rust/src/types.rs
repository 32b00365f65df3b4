//! Core types and data structures for the B-Tree and B+ tree maps.
//!
//! This module contains the fundamental data structures, type definitions,
//! and constants shared by both tree variants.

use crate::compact_arena::CompactArena;
use std::marker::PhantomData;

pub use crate::compact_arena::{NodeId, NULL_NODE};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest minimum degree admitting well-defined splits; lower values are clamped.
pub const MIN_DEGREE: usize = 2;

/// Minimum degree used by `Default` and `with_default_degree`.
pub const DEFAULT_DEGREE: usize = 2;

/// Largest accepted minimum degree; keeps `2t + 1` within `usize`.
pub const MAX_DEGREE: usize = usize::MAX / 4;

/// Upper bound on the slots a fresh node reserves up front.
pub const PREALLOCATED_SLOTS: usize = 64;

// ============================================================================
// B-TREE
// ============================================================================

/// B-Tree ordered map: every node holds key-value entries, internal nodes included.
///
/// With minimum degree `t`, every node except the root holds between `t - 1`
/// and `2t - 1` entries, and all leaves sit at the same depth.
///
/// # Examples
///
/// ```
/// use multiway_tree::BTree;
///
/// let mut tree = BTree::new(2);
/// for k in [5, 3, 7, 1, 9] {
///     tree.insert(k, k * 10);
/// }
/// assert!(tree.remove(&3));
/// assert_eq!(tree.len(), 4);
/// let keys: Vec<_> = tree.keys().copied().collect();
/// assert_eq!(keys, [1, 5, 7, 9]);
/// ```
#[derive(Debug)]
pub struct BTree<K, V> {
    /// Minimum degree `t` (already clamped into `[MIN_DEGREE, MAX_DEGREE]`).
    pub(crate) min_degree: usize,
    /// Root node, absent while the tree is empty.
    pub(crate) root: Option<NodeId>,
    /// Number of entries stored.
    pub(crate) len: usize,
    pub(crate) arena: CompactArena<BTreeNode<K, V>>,
}

/// A key with its value, stored inline in B-Tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// B-Tree node. The leaf flag is fixed at creation.
#[derive(Debug, Clone)]
pub struct BTreeNode<K, V> {
    pub(crate) min_degree: usize,
    /// Entries in ascending key order.
    pub(crate) entries: Vec<Entry<K, V>>,
    /// `entries.len() + 1` children for internal nodes, empty for leaves.
    pub(crate) children: Vec<NodeId>,
    pub(crate) is_leaf: bool,
}

// ============================================================================
// B+ TREE
// ============================================================================

/// B+ tree ordered map.
///
/// Values live only in leaves; internal nodes hold routing separators. The
/// leaves form a doubly linked chain in key order, which makes ordered scans
/// and range queries a walk along siblings instead of a tree traversal.
///
/// # Examples
///
/// ```
/// use multiway_tree::BPlusTree;
///
/// let mut tree = BPlusTree::new(2);
/// for i in 1..=20 {
///     tree.insert(i, i.to_string());
/// }
/// let keys: Vec<_> = tree.range(&5, &10).map(|(k, _)| *k).collect();
/// assert_eq!(keys, [5, 6, 7, 8, 9, 10]);
/// assert_eq!(tree.get_first().unwrap(), (&1, &"1".to_string()));
/// ```
///
/// # Performance Characteristics
///
/// - **Insertion**: O(log n)
/// - **Lookup**: O(log n)
/// - **Deletion**: O(log n)
/// - **Range queries**: O(log n + k) where k is the number of items in range
/// - **First / last**: O(1)
#[derive(Debug)]
pub struct BPlusTree<K, V> {
    /// Minimum degree `t` (already clamped into `[MIN_DEGREE, MAX_DEGREE]`).
    pub(crate) min_degree: usize,
    /// Root node, absent while the tree is empty.
    pub(crate) root: Option<NodeRef<K, V>>,
    /// Number of key-value pairs stored.
    pub(crate) len: usize,
    /// Leftmost leaf of the chain, `NULL_NODE` when empty.
    pub(crate) first_leaf: NodeId,
    /// Rightmost leaf of the chain, `NULL_NODE` when empty.
    pub(crate) last_leaf: NodeId,
    pub(crate) leaf_arena: CompactArena<LeafNode<K, V>>,
    pub(crate) branch_arena: CompactArena<BranchNode<K, V>>,
}

/// Leaf node containing key-value pairs.
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    pub(crate) min_degree: usize,
    /// Sorted list of keys.
    pub(crate) keys: Vec<K>,
    /// Values, parallel to `keys`.
    pub(crate) values: Vec<V>,
    /// Previous leaf in key order (non-owning), or `NULL_NODE`.
    pub(crate) prev: NodeId,
    /// Next leaf in key order (non-owning), or `NULL_NODE`.
    pub(crate) next: NodeId,
}

/// Internal (branch) node containing separator keys and child pointers.
#[derive(Debug, Clone)]
pub struct BranchNode<K, V> {
    pub(crate) min_degree: usize,
    /// Sorted list of separator keys.
    pub(crate) keys: Vec<K>,
    /// Child nodes (leaves or other branches), `keys.len() + 1` of them.
    pub(crate) children: Vec<NodeRef<K, V>>,
}

// ============================================================================
// ENUMS AND RESULT TYPES
// ============================================================================

/// Node reference that can be either a leaf or branch node
#[derive(Debug, PartialEq, Eq)]
pub enum NodeRef<K, V> {
    Leaf(NodeId, PhantomData<(K, V)>),
    Branch(NodeId, PhantomData<(K, V)>),
}

impl<K, V> Clone for NodeRef<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<K, V> {}

impl<K, V> NodeRef<K, V> {
    pub(crate) fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    pub(crate) fn branch(id: NodeId) -> Self {
        NodeRef::Branch(id, PhantomData)
    }

    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Branch(id, _) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }
}

/// Result of a B+ tree insertion into a subtree.
pub(crate) enum InsertResult<K, V> {
    /// Insertion completed without splitting. Contains the old value if key existed.
    Updated(Option<V>),
    /// The subtree root split; the parent must adopt `new_node` right of `separator_key`.
    Split {
        new_node: NodeRef<K, V>,
        separator_key: K,
    },
}
