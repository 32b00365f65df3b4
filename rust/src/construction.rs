//! Construction and initialization logic for both tree variants and their nodes.
//!
//! The only configuration knob is the minimum degree `t`. Values below
//! `MIN_DEGREE` are clamped rather than rejected.

use crate::compact_arena::CompactArena;
use crate::types::{
    BPlusTree, BTree, BTreeNode, BranchNode, LeafNode, DEFAULT_DEGREE, NULL_NODE,
    PREALLOCATED_SLOTS,
};

/// Room for a node's overflow state (`2t + 1` slots), capped so that huge
/// degrees grow on demand instead of reserving it all.
fn initial_capacity(min_degree: usize) -> usize {
    min_degree
        .saturating_mul(2)
        .saturating_add(1)
        .min(PREALLOCATED_SLOTS)
}

impl<K, V> BTree<K, V> {
    /// Create an empty B-Tree with the given minimum degree.
    ///
    /// A degree below 2 is clamped to 2.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BTree;
    ///
    /// let tree = BTree::<i32, String>::new(0);
    /// assert_eq!(tree.min_degree(), 2);
    /// assert!(tree.is_empty());
    /// ```
    pub fn new(min_degree: usize) -> Self {
        Self {
            min_degree: validation::normalize_degree(min_degree),
            root: None,
            len: 0,
            arena: CompactArena::new(),
        }
    }

    /// Create a B-Tree with `DEFAULT_DEGREE`.
    pub fn with_default_degree() -> Self {
        Self::new(DEFAULT_DEGREE)
    }
}

impl<K, V> BPlusTree<K, V> {
    /// Create an empty B+ tree with the given minimum degree.
    ///
    /// A degree below 2 is clamped to 2. No node is allocated until the first
    /// insert.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BPlusTree;
    ///
    /// let tree = BPlusTree::<i32, String>::new(16);
    /// assert_eq!(tree.max_keys(), 31);
    /// assert!(tree.is_empty());
    /// ```
    pub fn new(min_degree: usize) -> Self {
        Self {
            min_degree: validation::normalize_degree(min_degree),
            root: None,
            len: 0,
            first_leaf: NULL_NODE,
            last_leaf: NULL_NODE,
            leaf_arena: CompactArena::new(),
            branch_arena: CompactArena::new(),
        }
    }

    /// Create a B+ tree with `DEFAULT_DEGREE`.
    pub fn with_default_degree() -> Self {
        Self::new(DEFAULT_DEGREE)
    }
}

impl<K, V> BTreeNode<K, V> {
    /// Creates an empty leaf node.
    pub fn new_leaf(min_degree: usize) -> Self {
        Self {
            min_degree,
            entries: Vec::with_capacity(initial_capacity(min_degree)),
            children: Vec::new(),
            is_leaf: true,
        }
    }

    /// Creates an empty internal node.
    pub fn new_internal(min_degree: usize) -> Self {
        Self {
            min_degree,
            entries: Vec::with_capacity(initial_capacity(min_degree)),
            children: Vec::with_capacity(initial_capacity(min_degree)),
            is_leaf: false,
        }
    }
}

impl<K, V> LeafNode<K, V> {
    /// Creates a new unlinked leaf node.
    pub fn new(min_degree: usize) -> Self {
        // A leaf briefly holds 2t keys before it splits.
        Self {
            min_degree,
            keys: Vec::with_capacity(initial_capacity(min_degree)),
            values: Vec::with_capacity(initial_capacity(min_degree)),
            prev: NULL_NODE,
            next: NULL_NODE,
        }
    }
}

impl<K, V> BranchNode<K, V> {
    /// Creates a new branch node with no keys or children.
    pub fn new(min_degree: usize) -> Self {
        Self {
            min_degree,
            keys: Vec::with_capacity(initial_capacity(min_degree)),
            children: Vec::with_capacity(initial_capacity(min_degree)),
        }
    }
}

// Default implementations
impl<K, V> Default for BTree<K, V> {
    fn default() -> Self {
        Self::with_default_degree()
    }
}

impl<K, V> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self::with_default_degree()
    }
}

// Node defaults fill freed arena slots.
impl<K, V> Default for BTreeNode<K, V> {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_DEGREE,
            entries: Vec::new(),
            children: Vec::new(),
            is_leaf: true,
        }
    }
}

impl<K, V> Default for LeafNode<K, V> {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_DEGREE,
            keys: Vec::new(),
            values: Vec::new(),
            prev: NULL_NODE,
            next: NULL_NODE,
        }
    }
}

impl<K, V> Default for BranchNode<K, V> {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_DEGREE,
            keys: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Validation utilities for construction
pub mod validation {
    use crate::types::{MAX_DEGREE, MIN_DEGREE};

    /// Clamp a requested minimum degree into `[MIN_DEGREE, MAX_DEGREE]`.
    pub fn normalize_degree(min_degree: usize) -> usize {
        let effective = min_degree.clamp(MIN_DEGREE, MAX_DEGREE);
        if effective != min_degree {
            tracing::debug!(
                requested = min_degree,
                effective = effective,
                "minimum degree clamped"
            );
        }
        effective
    }

    /// Get the recommended minimum degree for an expected number of elements.
    ///
    /// Larger trees amortize wider nodes better; the result is always at
    /// least `MIN_DEGREE`.
    pub fn recommended_degree(expected_elements: usize) -> usize {
        if expected_elements < 100 {
            MIN_DEGREE
        } else if expected_elements < 10_000 {
            8
        } else if expected_elements < 1_000_000 {
            16
        } else {
            32
        }
    }
}
