//! Node-local operations for both tree variants.
//!
//! Everything here touches a single node (or a node and a detached sibling):
//! occupancy predicates, splitting, and the borrow/merge primitives that the
//! insert and delete engines compose. Arena bookkeeping and leaf links are
//! the tree's job.

use crate::types::{BTreeNode, BranchNode, Entry, LeafNode, NodeId, NodeRef};

// ============================================================================
// B-TREE NODE IMPLEMENTATION
// ============================================================================

impl<K: Ord, V> BTreeNode<K, V> {
    /// Locate `key` among this node's entries: `Ok(index)` on a hit,
    /// `Err(index)` with the child slot to descend into otherwise.
    pub fn find_entry(&self, key: &K) -> Result<usize, usize> {
        self.entries.binary_search_by(|entry| entry.key.cmp(key))
    }
}

impl<K, V> BTreeNode<K, V> {
    /// Returns the number of entries in this node.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    /// A full node must be split before the insert path descends into it.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_keys()
    }

    /// Returns true if this node can give up an entry and stay within bounds.
    pub fn can_donate(&self) -> bool {
        self.entries.len() > self.min_keys()
    }

    /// Split a full node around its median.
    ///
    /// Keeps the lower `t - 1` entries (and `t` children), returns the median
    /// entry for the parent and a new sibling holding the upper half.
    /// Returns `None` (leaving the node untouched) if the node is not full.
    pub fn split_full(&mut self) -> Option<(Entry<K, V>, BTreeNode<K, V>)> {
        if !self.is_full() {
            return None;
        }
        let t = self.min_degree;
        let right_entries = self.entries.split_off(t);
        let right_children = if self.is_leaf {
            Vec::new()
        } else {
            self.children.split_off(t)
        };
        // split_off(t) left exactly t entries; the last one is the median
        let median = self.entries.pop()?;

        let sibling = BTreeNode {
            min_degree: t,
            entries: right_entries,
            children: right_children,
            is_leaf: self.is_leaf,
        };

        Some((median, sibling))
    }

    /// Rotate in from the left sibling: the parent separator becomes our
    /// first entry and the sibling's last child (if any) our first child.
    pub fn accept_from_left(&mut self, separator: Entry<K, V>, child: Option<NodeId>) {
        self.entries.insert(0, separator);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    /// Rotate in from the right sibling.
    pub fn accept_from_right(&mut self, separator: Entry<K, V>, child: Option<NodeId>) {
        self.entries.push(separator);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Give up the last entry and, for internal nodes, the last child.
    pub fn borrow_last(&mut self) -> Option<(Entry<K, V>, Option<NodeId>)> {
        if !self.can_donate() {
            return None;
        }
        let entry = self.entries.pop()?;
        let child = if self.is_leaf { None } else { self.children.pop() };
        Some((entry, child))
    }

    /// Give up the first entry and, for internal nodes, the first child.
    pub fn borrow_first(&mut self) -> Option<(Entry<K, V>, Option<NodeId>)> {
        if !self.can_donate() {
            return None;
        }
        let entry = self.entries.remove(0);
        let child = if self.is_leaf {
            None
        } else {
            Some(self.children.remove(0))
        };
        Some((entry, child))
    }

    /// Absorb the right sibling, with the parent separator between the halves.
    pub fn merge_from(&mut self, separator: Entry<K, V>, mut other: BTreeNode<K, V>) {
        self.entries.push(separator);
        self.entries.append(&mut other.entries);
        self.children.append(&mut other.children);
    }
}

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<K, V> LeafNode<K, V> {
    /// Returns the number of key-value pairs in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this leaf node is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    /// A leaf is allowed to hold one key over the maximum until it splits.
    pub fn needs_split(&self) -> bool {
        self.keys.len() > self.max_keys()
    }

    /// Returns true if this leaf node is underfull (below minimum occupancy).
    pub fn is_underfull(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    /// Returns true if this leaf can donate a key to a sibling.
    pub fn can_donate(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    /// Insert a key-value pair at the specified index.
    pub fn insert_at_index(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Remove the pair at `index`.
    pub fn remove_at(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Split this leaf, returning the new right node holding the upper half.
    ///
    /// The new node is unlinked; the tree wires `prev`/`next` once it has an id.
    pub fn split(&mut self) -> LeafNode<K, V> {
        let mid = self.keys.len() / 2;
        LeafNode {
            min_degree: self.min_degree,
            keys: self.keys.split_off(mid),
            values: self.values.split_off(mid),
            prev: crate::types::NULL_NODE,
            next: crate::types::NULL_NODE,
        }
    }

    /// Borrow the last key-value pair from this leaf (used when this is the left sibling)
    pub fn borrow_last(&mut self) -> Option<(K, V)> {
        if !self.can_donate() {
            return None;
        }
        Some((self.keys.pop()?, self.values.pop()?))
    }

    /// Borrow the first key-value pair from this leaf (used when this is the right sibling)
    pub fn borrow_first(&mut self) -> Option<(K, V)> {
        if self.keys.is_empty() || !self.can_donate() {
            return None;
        }
        Some(self.remove_at(0))
    }

    /// Accept a borrowed key-value pair at the beginning (from left sibling)
    pub fn accept_from_left(&mut self, key: K, value: V) {
        self.insert_at_index(0, key, value);
    }

    /// Accept a borrowed key-value pair at the end (from right sibling)
    pub fn accept_from_right(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    /// Merge all content from the right sibling into this one.
    pub fn merge_from(&mut self, mut other: LeafNode<K, V>) {
        self.keys.append(&mut other.keys);
        self.values.append(&mut other.values);
    }
}

// ============================================================================
// BRANCH NODE IMPLEMENTATION
// ============================================================================

impl<K, V> BranchNode<K, V> {
    /// Returns the number of keys in this branch node.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this branch node is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    pub fn needs_split(&self) -> bool {
        self.keys.len() > self.max_keys()
    }

    /// Returns true if this branch node is underfull (below minimum occupancy).
    pub fn is_underfull(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    /// Returns true if this branch can donate a key to a sibling.
    pub fn can_donate(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    /// Adopt `new_child` to the right of `children[child_index]`, separated by `separator_key`.
    pub fn insert_child(&mut self, child_index: usize, separator_key: K, new_child: NodeRef<K, V>) {
        self.keys.insert(child_index, separator_key);
        self.children.insert(child_index + 1, new_child);
    }

    /// Split this overfull branch, returning the new right node and promoted key.
    ///
    /// The promoted median leaves this level entirely: separators are routing
    /// metadata and are never duplicated into either half.
    /// Returns `None` (leaving the node untouched) if there is nothing to split.
    pub fn split(&mut self) -> Option<(BranchNode<K, V>, K)> {
        let mid = self.min_keys();
        if self.keys.len() <= mid + 1 {
            return None;
        }

        let right_keys = self.keys.split_off(mid + 1);
        let right_children = self.children.split_off(mid + 1);
        let promoted_key = self.keys.pop()?;

        let new_right = BranchNode {
            min_degree: self.min_degree,
            keys: right_keys,
            children: right_children,
        };

        Some((new_right, promoted_key))
    }

    /// Remove separator `keys[key_index]` and the child to its right.
    pub fn remove_child_after(&mut self, key_index: usize) -> (K, NodeRef<K, V>) {
        let key = self.keys.remove(key_index);
        let child = self.children.remove(key_index + 1);
        (key, child)
    }

    /// Borrow the last key and child from this branch (used when this is the left sibling)
    pub fn borrow_last(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if !self.can_donate() {
            return None;
        }
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Borrow the first key and child from this branch (used when this is the right sibling)
    pub fn borrow_first(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if self.keys.is_empty() || !self.can_donate() {
            return None;
        }
        let key = self.keys.remove(0);
        let child = self.children.remove(0);
        Some((key, child))
    }

    /// Accept a borrowed child at the beginning (from left sibling).
    /// The parent separator comes down as our first key.
    pub fn accept_from_left(&mut self, separator: K, moved_child: NodeRef<K, V>) {
        self.keys.insert(0, separator);
        self.children.insert(0, moved_child);
    }

    /// Accept a borrowed child at the end (from right sibling).
    pub fn accept_from_right(&mut self, separator: K, moved_child: NodeRef<K, V>) {
        self.keys.push(separator);
        self.children.push(moved_child);
    }

    /// Merge all content from another branch into this one, with separator from parent
    pub fn merge_from(&mut self, separator: K, mut other: BranchNode<K, V>) {
        self.keys.push(separator);
        self.keys.append(&mut other.keys);
        self.children.append(&mut other.children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btree_leaf(t: usize, keys: &[i32]) -> BTreeNode<i32, i32> {
        let mut node = BTreeNode::new_leaf(t);
        for &k in keys {
            node.entries.push(Entry { key: k, value: k * 10 });
        }
        node
    }

    #[test]
    fn test_btree_node_split_full() {
        let mut node = btree_leaf(3, &[1, 2, 3, 4, 5]);
        assert!(node.is_full());

        let (median, right) = node.split_full().unwrap();
        assert_eq!(median.key, 3);
        assert_eq!(node.entries.iter().map(|e| e.key).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(right.entries.iter().map(|e| e.key).collect::<Vec<_>>(), [4, 5]);
        assert!(right.is_leaf);
    }

    #[test]
    fn test_btree_internal_split_partitions_children() {
        let mut node = btree_leaf(2, &[10, 20, 30]);
        node.is_leaf = false;
        node.children = vec![0, 1, 2, 3];

        let (median, right) = node.split_full().unwrap();
        assert_eq!(median.key, 20);
        assert_eq!(node.children, [0, 1]);
        assert_eq!(right.children, [2, 3]);
    }

    #[test]
    fn test_btree_node_find_entry() {
        let node = btree_leaf(2, &[10, 20, 30]);
        assert_eq!(node.find_entry(&20), Ok(1));
        assert_eq!(node.find_entry(&5), Err(0));
        assert_eq!(node.find_entry(&25), Err(2));
        assert_eq!(node.find_entry(&35), Err(3));
    }

    #[test]
    fn test_btree_node_borrow_respects_minimum() {
        let mut node = btree_leaf(2, &[1]);
        assert!(!node.can_donate());
        assert!(node.borrow_last().is_none());

        let mut node = btree_leaf(2, &[1, 2]);
        let (entry, child) = node.borrow_first().unwrap();
        assert_eq!(entry.key, 1);
        assert!(child.is_none());
    }

    #[test]
    fn test_btree_node_merge() {
        let mut left = btree_leaf(2, &[1]);
        let right = btree_leaf(2, &[5]);
        left.merge_from(Entry { key: 3, value: 30 }, right);
        assert_eq!(left.entries.iter().map(|e| e.key).collect::<Vec<_>>(), [1, 3, 5]);
    }

    #[test]
    fn test_leaf_split_moves_upper_half() {
        let mut leaf = LeafNode::new(2);
        for k in 1..=4 {
            leaf.insert_at_index(leaf.len(), k, k);
        }
        assert!(leaf.needs_split());

        let right = leaf.split();
        assert_eq!(leaf.keys(), [1, 2]);
        assert_eq!(right.keys(), [3, 4]);
        assert_eq!(right.values(), [3, 4]);
        assert!(!leaf.is_underfull() && !right.is_underfull());
    }

    #[test]
    fn test_leaf_borrow_and_accept() {
        let mut left = LeafNode::new(2);
        let mut right = LeafNode::new(2);
        for k in [1, 2, 3] {
            left.accept_from_right(k, k);
        }
        right.accept_from_right(10, 10);

        let (k, v) = left.borrow_last().unwrap();
        right.accept_from_left(k, v);
        assert_eq!(left.keys(), [1, 2]);
        assert_eq!(right.keys(), [3, 10]);

        // at minimum occupancy (t - 1 = 1) a leaf cannot donate
        let mut single = LeafNode::new(2);
        single.accept_from_right(7, 7);
        assert!(single.borrow_first().is_none());
    }

    #[test]
    fn test_branch_split_removes_median() {
        let mut branch = BranchNode::<i32, i32>::new(2);
        branch.keys = vec![10, 20, 30, 40];
        branch.children = (0..5).map(NodeRef::leaf).collect();
        assert!(branch.needs_split());

        let (right, promoted) = branch.split().unwrap();
        assert_eq!(promoted, 20);
        assert_eq!(branch.keys, [10]);
        assert_eq!(branch.children.len(), 2);
        assert_eq!(right.keys, [30, 40]);
        assert_eq!(right.children.len(), 3);
    }

    #[test]
    fn test_branch_rotation_and_merge() {
        let mut left = BranchNode::<i32, i32>::new(2);
        left.keys = vec![10, 20];
        left.children = (0..3).map(NodeRef::leaf).collect();

        let (moved_key, moved_child) = left.borrow_last().unwrap();
        assert_eq!(moved_key, 20);
        assert_eq!(moved_child, NodeRef::leaf(2));

        let mut right = BranchNode::<i32, i32>::new(2);
        right.keys = vec![40];
        right.children = vec![NodeRef::leaf(3), NodeRef::leaf(4)];
        right.accept_from_left(30, moved_child);
        assert_eq!(right.keys, [30, 40]);
        assert_eq!(right.children[0], NodeRef::leaf(2));

        left.merge_from(25, right);
        assert_eq!(left.keys, [10, 25, 30, 40]);
        assert_eq!(left.children.len(), 5);

        let (key, child) = left.remove_child_after(1);
        assert_eq!(key, 25);
        assert_eq!(child, NodeRef::leaf(2));
        assert_eq!(left.keys, [10, 30, 40]);
    }
}
