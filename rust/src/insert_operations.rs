//! INSERT operations for both tree variants.
//!
//! The B-Tree splits eagerly on the way down: a full child is split before
//! the descent enters it, so the parent always has room for the promoted
//! median and a single pass suffices. The B+ tree inserts at a leaf and lets
//! splits propagate bottom-up through the recursion.

use crate::error::{ModifyResult, TreeError, TreeResult, TreeResultExt};
use crate::types::{
    BPlusTree, BTree, BTreeNode, BranchNode, Entry, InsertResult, LeafNode, NodeId, NodeRef,
};
use std::cmp::Ordering;

// ============================================================================
// B-TREE INSERTION
// ============================================================================

impl<K: Ord, V> BTree<K, V> {
    /// Insert a key-value pair, returning the previous value for the key.
    ///
    /// An existing key has its value replaced in place; the structure and
    /// length are unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BTree;
    ///
    /// let mut tree = BTree::new(2);
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "uno"), Some("one"));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_entry(key, value).or_default_with_log()
    }

    /// Insert with invariant checks before and after the mutation.
    pub fn try_insert(&mut self, key: K, value: V) -> ModifyResult<Option<V>> {
        self.check_invariants_detailed()?;
        let old_value = self.insert_entry(key, value).with_context("insert")?;
        self.check_invariants_detailed()?;
        Ok(old_value)
    }

    pub(crate) fn insert_entry(&mut self, key: K, value: V) -> TreeResult<Option<V>> {
        // Duplicates are resolved before any pre-splitting can reshape the tree.
        if let Some(existing) = self.get_mut(&key) {
            return Ok(Some(std::mem::replace(existing, value)));
        }

        let root_id = match self.root {
            Some(root_id) => root_id,
            None => {
                let mut leaf = BTreeNode::new_leaf(self.min_degree);
                leaf.entries.push(Entry { key, value });
                self.root = Some(self.arena.allocate(leaf)?);
                self.len = 1;
                return Ok(None);
            }
        };

        let root_id = if self.node(root_id)?.is_full() {
            self.grow_root(root_id)?
        } else {
            root_id
        };

        let old_value = self.insert_non_full(root_id, key, value)?;
        if old_value.is_none() {
            self.len += 1;
        }
        Ok(old_value)
    }

    /// Put a new empty root above the full `old_root` and split it.
    fn grow_root(&mut self, old_root: NodeId) -> TreeResult<NodeId> {
        let mut new_root = BTreeNode::new_internal(self.min_degree);
        new_root.children.push(old_root);
        let new_root_id = self.arena.allocate(new_root)?;
        self.split_child(new_root_id, 0)?;
        self.root = Some(new_root_id);
        tracing::debug!(root = new_root_id, "btree root split, height grew");
        Ok(new_root_id)
    }

    /// Descend from a non-full node to the leaf that receives `key`.
    fn insert_non_full(&mut self, start: NodeId, key: K, value: V) -> TreeResult<Option<V>> {
        let mut node_id = start;
        loop {
            let node = self.node(node_id)?;
            let index = match node.find_entry(&key) {
                Ok(index) => {
                    let entry = &mut self.node_mut(node_id)?.entries[index];
                    return Ok(Some(std::mem::replace(&mut entry.value, value)));
                }
                Err(index) => index,
            };

            if node.is_leaf {
                self.node_mut(node_id)?
                    .entries
                    .insert(index, Entry { key, value });
                return Ok(None);
            }

            let mut child_index = index;
            if self.node(self.child_at(node_id, index)?)?.is_full() {
                self.split_child(node_id, index)?;
                let promoted = &self.node(node_id)?.entries[index];
                match key.cmp(&promoted.key) {
                    Ordering::Less => {}
                    Ordering::Greater => child_index += 1,
                    Ordering::Equal => {
                        let entry = &mut self.node_mut(node_id)?.entries[index];
                        return Ok(Some(std::mem::replace(&mut entry.value, value)));
                    }
                }
            }
            node_id = self.child_at(node_id, child_index)?;
        }
    }
}

impl<K, V> BTree<K, V> {
    /// Split the full child at `children[index]`, promoting its median into the parent.
    pub(crate) fn split_child(&mut self, parent_id: NodeId, index: usize) -> TreeResult<()> {
        let child_id = self.child_at(parent_id, index)?;
        let (median, sibling) = self.node_mut(child_id)?.split_full().ok_or_else(|| {
            TreeError::data_integrity("split_child", &format!("node {} is not full", child_id))
        })?;
        let sibling_id = self.arena.allocate(sibling)?;

        let parent = self.node_mut(parent_id)?;
        parent.entries.insert(index, median);
        parent.children.insert(index + 1, sibling_id);
        tracing::trace!(parent = parent_id, left = child_id, right = sibling_id, "btree node split");
        Ok(())
    }
}

// ============================================================================
// B+ TREE INSERTION
// ============================================================================

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Insert a key-value pair, returning the previous value for the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(2);
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "uno"), Some("one"));
    /// assert_eq!(tree.get(&1), Some(&"uno"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_entry(key, value).or_default_with_log()
    }

    /// Insert with invariant checks before and after the mutation.
    pub fn try_insert(&mut self, key: K, value: V) -> ModifyResult<Option<V>> {
        self.check_invariants_detailed()?;
        let old_value = self.insert_entry(key, value).with_context("insert")?;
        self.check_invariants_detailed()?;
        Ok(old_value)
    }

    pub(crate) fn insert_entry(&mut self, key: K, value: V) -> TreeResult<Option<V>> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let mut leaf = LeafNode::new(self.min_degree);
                leaf.insert_at_index(0, key, value);
                let leaf_id = self.leaf_arena.allocate(leaf)?;
                self.root = Some(NodeRef::leaf(leaf_id));
                self.first_leaf = leaf_id;
                self.last_leaf = leaf_id;
                self.len = 1;
                return Ok(None);
            }
        };

        match self.insert_recursive(root, key, value)? {
            InsertResult::Updated(old_value) => {
                if old_value.is_none() {
                    self.len += 1;
                }
                Ok(old_value)
            }
            InsertResult::Split {
                new_node,
                separator_key,
            } => {
                self.len += 1;
                self.new_root(root, separator_key, new_node)?;
                Ok(None)
            }
        }
    }

    fn insert_recursive(
        &mut self,
        node: NodeRef<K, V>,
        key: K,
        value: V,
    ) -> TreeResult<InsertResult<K, V>> {
        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self.leaf_mut(id)?;
                match leaf.keys.binary_search(&key) {
                    Ok(index) => {
                        let old_value = std::mem::replace(&mut leaf.values[index], value);
                        Ok(InsertResult::Updated(Some(old_value)))
                    }
                    Err(index) => {
                        leaf.insert_at_index(index, key, value);
                        if !leaf.needs_split() {
                            return Ok(InsertResult::Updated(None));
                        }
                        let (new_node, separator_key) = self.split_leaf(id)?;
                        Ok(InsertResult::Split {
                            new_node,
                            separator_key,
                        })
                    }
                }
            }
            NodeRef::Branch(id, _) => {
                let (child_index, child) = {
                    let branch = self.branch(id)?;
                    let child_index = branch.find_child_index(&key);
                    let child = *branch.children.get(child_index).ok_or_else(|| {
                        TreeError::data_integrity(
                            "insert",
                            &format!("branch {} has no child {}", id, child_index),
                        )
                    })?;
                    (child_index, child)
                };

                match self.insert_recursive(child, key, value)? {
                    InsertResult::Updated(old_value) => Ok(InsertResult::Updated(old_value)),
                    InsertResult::Split {
                        new_node,
                        separator_key,
                    } => {
                        let branch = self.branch_mut(id)?;
                        branch.insert_child(child_index, separator_key, new_node);
                        if !branch.needs_split() {
                            return Ok(InsertResult::Updated(None));
                        }
                        let (new_node, separator_key) = self.split_branch(id)?;
                        Ok(InsertResult::Split {
                            new_node,
                            separator_key,
                        })
                    }
                }
            }
        }
    }

    /// Split an overfull leaf. The new right leaf is linked in after it and
    /// its first key is returned as the separator for the parent.
    fn split_leaf(&mut self, leaf_id: NodeId) -> TreeResult<(NodeRef<K, V>, K)> {
        let right = self.leaf_mut(leaf_id)?.split();
        let separator_key = right.first_key().cloned().ok_or_else(|| {
            TreeError::data_integrity("split_leaf", &format!("leaf {} split empty", leaf_id))
        })?;
        let right_id = self.leaf_arena.allocate(right)?;
        self.link_leaf_after(leaf_id, right_id)?;
        tracing::trace!(left = leaf_id, right = right_id, "leaf split");
        Ok((NodeRef::leaf(right_id), separator_key))
    }
}

impl<K, V> BPlusTree<K, V> {
    fn split_branch(&mut self, branch_id: NodeId) -> TreeResult<(NodeRef<K, V>, K)> {
        let (right, promoted_key) = self.branch_mut(branch_id)?.split().ok_or_else(|| {
            TreeError::data_integrity("split_branch", &format!("branch {} too small", branch_id))
        })?;
        let right_id = self.branch_arena.allocate(right)?;
        tracing::trace!(left = branch_id, right = right_id, "branch split");
        Ok((NodeRef::branch(right_id), promoted_key))
    }

    /// Create a new root above a split old root.
    fn new_root(
        &mut self,
        old_root: NodeRef<K, V>,
        separator_key: K,
        new_node: NodeRef<K, V>,
    ) -> TreeResult<()> {
        let mut root = BranchNode::new(self.min_degree);
        root.keys.push(separator_key);
        root.children.push(old_root);
        root.children.push(new_node);
        let root_id = self.branch_arena.allocate(root)?;
        self.root = Some(NodeRef::branch(root_id));
        tracing::debug!(root = root_id, "bplus root split, height grew");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btree_first_insert_creates_leaf_root() {
        let mut tree = BTree::new(2);
        assert_eq!(tree.insert(1, "a"), None);
        let root = tree.node(tree.root.unwrap()).unwrap();
        assert!(root.is_leaf);
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn test_btree_root_split_at_capacity() {
        let mut tree = BTree::new(2);
        for k in [10, 20, 30] {
            tree.insert(k, k);
        }
        assert_eq!(tree.height(), 1);

        // root is full (2t - 1 = 3), the next insert splits it first
        tree.insert(40, 40);
        assert_eq!(tree.height(), 2);
        let root = tree.node(tree.root.unwrap()).unwrap();
        assert_eq!(root.entries[0].key, 20);
        assert_eq!(root.children.len(), 2);
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_btree_duplicate_insert_leaves_structure_alone() {
        let mut tree = BTree::new(2);
        for k in [10, 20, 30] {
            tree.insert(k, k);
        }
        // the root is full, but updating an existing key must not split it
        assert_eq!(tree.insert(20, 200), Some(20));
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(&20), Some(&200));
    }

    #[test]
    fn test_btree_sequential_and_reverse_inserts() {
        for t in 2..5 {
            let mut ascending = BTree::new(t);
            let mut descending = BTree::new(t);
            for k in 0..200 {
                ascending.insert(k, k);
                descending.insert(199 - k, k);
            }
            ascending.check_invariants_detailed().unwrap();
            descending.check_invariants_detailed().unwrap();
            assert_eq!(ascending.len(), 200);
            assert_eq!(descending.len(), 200);
        }
    }

    #[test]
    fn test_bplus_leaf_split_promotes_first_key_of_new_leaf() {
        let mut tree = BPlusTree::new(2);
        for k in 1..=4 {
            tree.insert(k, k * 10);
        }
        // 4 keys exceed 2t - 1 = 3: [1, 2] | [3, 4] with separator 3
        let root = tree.root.unwrap();
        assert!(!root.is_leaf());
        let branch = tree.branch(root.id()).unwrap();
        assert_eq!(branch.keys, [3]);
        assert_eq!(tree.leaf_sizes(), [2, 2]);
        assert_eq!(tree.leaf_chain_ids().unwrap().len(), 2);
        assert_eq!(tree.get(&3), Some(&30));
    }

    #[test]
    fn test_bplus_branch_split_grows_height() {
        let mut tree = BPlusTree::new(2);
        for k in 0..40 {
            tree.insert(k, k);
        }
        assert!(tree.height() >= 3);
        tree.check_invariants_detailed().unwrap();
        assert_eq!(tree.len(), 40);
    }

    #[test]
    fn test_bplus_update_does_not_change_len() {
        let mut tree = BPlusTree::new(3);
        for k in 0..50 {
            tree.insert(k, k);
        }
        for k in 0..50 {
            assert_eq!(tree.insert(k, k + 1), Some(k));
        }
        assert_eq!(tree.len(), 50);
        assert_eq!(tree.get(&10), Some(&11));
    }

    #[test]
    fn test_try_insert_reports_success() {
        let mut tree = BPlusTree::new(2);
        assert_eq!(tree.try_insert(1, 1), Ok(None));
        assert_eq!(tree.try_insert(1, 2), Ok(Some(1)));

        let mut tree = BTree::new(2);
        assert_eq!(tree.try_insert(1, 1), Ok(None));
        assert_eq!(tree.try_insert(1, 2), Ok(Some(1)));
    }
}
