//! Tree structure management operations.
//!
//! Size queries, clearing, extreme-key accessors, node counting and the
//! degree-derived bounds for both variants.

use crate::error::{TreeError, TreeResult, TreeResultExt};
use crate::types::{BPlusTree, BTree, NodeId, NodeRef, NULL_NODE};

// ============================================================================
// B+ TREE STRUCTURE OPERATIONS
// ============================================================================

impl<K, V> BPlusTree<K, V> {
    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels from the root to the leaves; 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(node) = current {
            height += 1;
            current = match node {
                NodeRef::Leaf(_, _) => None,
                NodeRef::Branch(id, _) => self
                    .branch_arena
                    .get(id)
                    .and_then(|branch| branch.children.first().copied()),
            };
        }
        height
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        matches!(self.root, Some(NodeRef::Leaf(_, _)))
    }

    /// Clear all items from the tree.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.branch_arena.clear();
        self.root = None;
        self.len = 0;
        self.first_leaf = NULL_NODE;
        self.last_leaf = NULL_NODE;
        tracing::debug!("bplus tree cleared");
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Most keys any node may hold: `2t - 1`.
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Fewest keys a non-root node may hold: `t - 1`.
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        self.count_nodes_in_tree().0
    }

    /// Count the number of leaf and branch nodes actually in the tree structure.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        let mut counts = (0, 0);
        let mut stack: Vec<NodeRef<K, V>> = self.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            match node {
                NodeRef::Leaf(_, _) => counts.0 += 1,
                NodeRef::Branch(id, _) => {
                    counts.1 += 1;
                    if let Some(branch) = self.branch_arena.get(id) {
                        stack.extend(branch.children.iter().copied());
                    }
                }
            }
        }
        counts
    }

    /// Id of the leftmost leaf, if the tree is non-empty.
    pub fn first_leaf_id(&self) -> Option<NodeId> {
        (self.first_leaf != NULL_NODE).then_some(self.first_leaf)
    }

    /// Id of the rightmost leaf, if the tree is non-empty.
    pub fn last_leaf_id(&self) -> Option<NodeId> {
        (self.last_leaf != NULL_NODE).then_some(self.last_leaf)
    }

    /// Returns the first key-value pair in the tree.
    pub fn first(&self) -> Option<(&K, &V)> {
        let leaf = self.leaf_arena.get(self.first_leaf)?;
        Some((leaf.keys.first()?, leaf.values.first()?))
    }

    /// Returns the last key-value pair in the tree.
    pub fn last(&self) -> Option<(&K, &V)> {
        let leaf = self.leaf_arena.get(self.last_leaf)?;
        Some((leaf.keys.last()?, leaf.values.last()?))
    }

    /// Smallest pair, failing with `EmptyTree` when there is none.
    ///
    /// ```
    /// use multiway_tree::{BPlusTree, TreeError};
    ///
    /// let mut tree = BPlusTree::new(2);
    /// assert_eq!(tree.get_first(), Err(TreeError::EmptyTree));
    /// tree.insert(2, 'b');
    /// tree.insert(1, 'a');
    /// assert_eq!(tree.get_first(), Ok((&1, &'a')));
    /// assert_eq!(tree.get_last(), Ok((&2, &'b')));
    /// ```
    pub fn get_first(&self) -> TreeResult<(&K, &V)> {
        self.first().ok_or(TreeError::EmptyTree)
    }

    /// Largest pair, failing with `EmptyTree` when there is none.
    pub fn get_last(&self) -> TreeResult<(&K, &V)> {
        self.last().ok_or(TreeError::EmptyTree)
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Remove and return the smallest pair.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let key = self.first()?.0.clone();
        self.remove_entry_impl(&key).or_default_with_log()
    }

    /// Remove and return the largest pair.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let key = self.last()?.0.clone();
        self.remove_entry_impl(&key).or_default_with_log()
    }
}

// ============================================================================
// B-TREE STRUCTURE OPERATIONS
// ============================================================================

impl<K, V> BTree<K, V> {
    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels from the root to the leaves; 0 for an empty tree.
    ///
    /// ```
    /// use multiway_tree::BTree;
    ///
    /// let mut tree = BTree::new(2);
    /// assert_eq!(tree.height(), 0);
    /// for k in 1..=10 {
    ///     tree.insert(k, ());
    /// }
    /// assert!(tree.height() > 1);
    /// ```
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root.and_then(|id| self.arena.get(id));
        while let Some(node) = current {
            height += 1;
            current = match node.is_leaf {
                true => None,
                false => node.children.first().and_then(|&id| self.arena.get(id)),
            };
        }
        height
    }

    /// Clear all items from the tree.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
        tracing::debug!("btree cleared");
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Most entries any node may hold: `2t - 1`.
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Fewest entries a non-root node may hold: `t - 1`.
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            count += 1;
            if let Some(node) = self.arena.get(id) {
                stack.extend(node.children.iter().copied());
            }
        }
        count
    }

    /// Returns the first key-value pair in the tree.
    pub fn first(&self) -> Option<(&K, &V)> {
        let mut node = self.arena.get(self.root?)?;
        while !node.is_leaf {
            node = self.arena.get(*node.children.first()?)?;
        }
        node.entries.first().map(|e| (&e.key, &e.value))
    }

    /// Returns the last key-value pair in the tree.
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut node = self.arena.get(self.root?)?;
        while !node.is_leaf {
            node = self.arena.get(*node.children.last()?)?;
        }
        node.entries.last().map(|e| (&e.key, &e.value))
    }

    /// Smallest pair, failing with `EmptyTree` when there is none.
    pub fn get_first(&self) -> TreeResult<(&K, &V)> {
        self.first().ok_or(TreeError::EmptyTree)
    }

    /// Largest pair, failing with `EmptyTree` when there is none.
    pub fn get_last(&self) -> TreeResult<(&K, &V)> {
        self.last().ok_or(TreeError::EmptyTree)
    }
}

impl<K: Ord + Clone, V> BTree<K, V> {
    /// Remove and return the smallest pair.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let key = self.first()?.0.clone();
        self.remove_entry(&key).map(|entry| (entry.key, entry.value))
    }

    /// Remove and return the largest pair.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let key = self.last()?.0.clone();
        self.remove_entry(&key).map(|entry| (entry.key, entry.value))
    }
}
