//! GET operations for both tree variants.
//!
//! Lookups walk a single root-to-leaf path and never mutate structure. The
//! B-Tree can stop at any level on an exact hit; the B+ tree always descends
//! to a leaf, since its internal keys are routing separators only.

use crate::error::{KeyResult, TreeError, TreeResult};
use crate::types::{BPlusTree, BTree, BTreeNode, BranchNode, LeafNode, NodeId, NodeRef};

// ============================================================================
// B-TREE LOOKUPS
// ============================================================================

impl<K: Ord, V> BTree<K, V> {
    /// Get a reference to the value associated with a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BTree;
    ///
    /// let mut tree = BTree::new(2);
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get(&1), Some(&"one"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Alias for [`BTree::get`].
    pub fn search(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    /// Get the stored key and its value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let (node_id, index) = self.find_position(key)?;
        let entry = self.arena.get(node_id)?.entries.get(index)?;
        Some((&entry.key, &entry.value))
    }

    /// Check if key exists in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_position(key).is_some()
    }

    /// Alias for [`BTree::contains_key`].
    pub fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    /// Get a mutable reference to the value for a key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (node_id, index) = self.find_position(key)?;
        self.arena
            .get_mut(node_id)?
            .entries
            .get_mut(index)
            .map(|entry| &mut entry.value)
    }

    /// Get value for a key, returning an error if the key doesn't exist.
    pub fn get_item(&self, key: &K) -> KeyResult<&V> {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    /// Alias for [`BTree::get_item`].
    pub fn try_get(&self, key: &K) -> KeyResult<&V> {
        self.get_item(key)
    }

    /// Look up every key, failing with `KeyNotFound` if any is missing.
    pub fn get_many(&self, keys: &[K]) -> KeyResult<Vec<&V>> {
        keys.iter().map(|key| self.get_item(key)).collect()
    }

    /// Node id and entry index holding `key`, if present.
    pub(crate) fn find_position(&self, key: &K) -> Option<(NodeId, usize)> {
        let mut node_id = self.root?;
        loop {
            let node = self.arena.get(node_id)?;
            match node.find_entry(key) {
                Ok(index) => return Some((node_id, index)),
                Err(_) if node.is_leaf => return None,
                Err(index) => node_id = *node.children.get(index)?,
            }
        }
    }
}

impl<K, V> BTree<K, V> {
    // ============================================================================
    // ARENA ACCESS METHODS
    // ============================================================================

    pub(crate) fn node(&self, id: NodeId) -> TreeResult<&BTreeNode<K, V>> {
        self.arena
            .get(id)
            .ok_or_else(|| TreeError::missing_node("BTree", id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut BTreeNode<K, V>> {
        self.arena
            .get_mut(id)
            .ok_or_else(|| TreeError::missing_node("BTree", id))
    }

    pub(crate) fn child_at(&self, parent_id: NodeId, index: usize) -> TreeResult<NodeId> {
        self.node(parent_id)?
            .children
            .get(index)
            .copied()
            .ok_or_else(|| {
                TreeError::data_integrity(
                    "child lookup",
                    &format!("node {} has no child {}", parent_id, index),
                )
            })
    }
}

// ============================================================================
// B+ TREE LOOKUPS
// ============================================================================

impl<K: Ord, V> BPlusTree<K, V> {
    /// Get a reference to the value associated with a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(2);
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get(&1), Some(&"one"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Alias for [`BPlusTree::get`].
    pub fn search(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    /// Get the stored key and its value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let leaf = self.leaf_arena.get(self.find_leaf_for_key(key)?)?;
        let index = leaf.keys.binary_search(key).ok()?;
        Some((&leaf.keys[index], &leaf.values[index]))
    }

    /// Check if key exists in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Alias for [`BPlusTree::contains_key`].
    pub fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    /// Get a mutable reference to the value for a key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let leaf_id = self.find_leaf_for_key(key)?;
        self.leaf_arena.get_mut(leaf_id)?.get_mut(key)
    }

    /// Get value for a key, returning an error if the key doesn't exist.
    ///
    /// ```
    /// use multiway_tree::{BPlusTree, TreeError};
    ///
    /// let mut tree = BPlusTree::new(2);
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get_item(&1), Ok(&"one"));
    /// assert_eq!(tree.get_item(&2), Err(TreeError::KeyNotFound));
    /// ```
    pub fn get_item(&self, key: &K) -> KeyResult<&V> {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    /// Alias for [`BPlusTree::get_item`].
    pub fn try_get(&self, key: &K) -> KeyResult<&V> {
        self.get_item(key)
    }

    /// Look up every key, failing with `KeyNotFound` if any is missing.
    pub fn get_many(&self, keys: &[K]) -> KeyResult<Vec<&V>> {
        keys.iter().map(|key| self.get_item(key)).collect()
    }

    /// Id of the leaf whose key range covers `key`.
    pub(crate) fn find_leaf_for_key(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Branch(id, _) => {
                    current = *self.branch_arena.get(id)?.get_child(key)?;
                }
            }
        }
    }
}

impl<K, V> BPlusTree<K, V> {
    // ============================================================================
    // ARENA ACCESS METHODS
    // ============================================================================

    pub(crate) fn leaf(&self, id: NodeId) -> TreeResult<&LeafNode<K, V>> {
        self.leaf_arena
            .get(id)
            .ok_or_else(|| TreeError::missing_node("Leaf", id))
    }

    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> TreeResult<&mut LeafNode<K, V>> {
        self.leaf_arena
            .get_mut(id)
            .ok_or_else(|| TreeError::missing_node("Leaf", id))
    }

    pub(crate) fn branch(&self, id: NodeId) -> TreeResult<&BranchNode<K, V>> {
        self.branch_arena
            .get(id)
            .ok_or_else(|| TreeError::missing_node("Branch", id))
    }

    pub(crate) fn branch_mut(&mut self, id: NodeId) -> TreeResult<&mut BranchNode<K, V>> {
        self.branch_arena
            .get_mut(id)
            .ok_or_else(|| TreeError::missing_node("Branch", id))
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    /// Get value for a key from this leaf node.
    pub fn get(&self, key: &K) -> Option<&V> {
        match self.keys.binary_search(key) {
            Ok(index) => Some(&self.values[index]),
            Err(_) => None,
        }
    }

    /// Get a mutable reference to the value for a key from this leaf node.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.keys.binary_search(key) {
            Ok(index) => Some(&mut self.values[index]),
            Err(_) => None,
        }
    }
}

impl<K: Ord, V> BranchNode<K, V> {
    /// Get the child node for a given key.
    pub fn get_child(&self, key: &K) -> Option<&NodeRef<K, V>> {
        self.children.get(self.find_child_index(key))
    }

    /// Find the index of the child that should contain the given key.
    ///
    /// A key equal to a separator routes right: the separator is the first
    /// key of its right subtree.
    pub fn find_child_index(&self, key: &K) -> usize {
        match self.keys.binary_search(key) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btree_basic_get_operations() {
        let mut tree = BTree::new(2);

        assert_eq!(tree.get(&1), None);
        assert!(!tree.contains_key(&1));

        for (k, v) in [(1, "one"), (2, "two"), (3, "three"), (4, "four")] {
            tree.insert(k, v);
        }

        assert_eq!(tree.get(&1), Some(&"one"));
        assert_eq!(tree.search(&3), Some(&"three"));
        assert_eq!(tree.get(&5), None);
        assert!(tree.contains_key(&4));
        assert_eq!(tree.get_key_value(&2), Some((&2, &"two")));
    }

    #[test]
    fn test_btree_get_hits_internal_entries() {
        let mut tree = BTree::new(2);
        for i in 0..20 {
            tree.insert(i, i * 10);
        }
        // keys stored in internal nodes are returned without reaching a leaf
        let root = tree.root.unwrap();
        let root_key = tree.arena.get(root).unwrap().entries[0].key;
        assert_eq!(tree.find_position(&root_key), Some((root, 0)));
        assert_eq!(tree.get(&root_key), Some(&(root_key * 10)));
    }

    #[test]
    fn test_btree_get_mut_and_errors() {
        let mut tree = BTree::new(3);
        tree.insert(1, "one");
        *tree.get_mut(&1).unwrap() = "ONE";
        assert_eq!(tree.get(&1), Some(&"ONE"));
        assert_eq!(tree.get_mut(&2), None);

        assert_eq!(tree.get_item(&1), Ok(&"ONE"));
        assert_eq!(tree.try_get(&2), Err(TreeError::KeyNotFound));
        assert!(tree.get_many(&[1, 2]).is_err());
        assert_eq!(tree.get_many(&[1]).unwrap(), vec![&"ONE"]);
    }

    #[test]
    fn test_bplus_basic_get_operations() {
        let mut tree = BPlusTree::new(2);
        assert_eq!(tree.get(&1), None);

        for i in 0..30 {
            tree.insert(i, i * 100);
        }
        for i in 0..30 {
            assert_eq!(tree.get(&i), Some(&(i * 100)));
        }
        assert_eq!(tree.get(&30), None);
        assert_eq!(tree.get(&-1), None);
    }

    #[test]
    fn test_bplus_get_many() {
        let mut tree = BPlusTree::new(2);
        tree.insert(1, "one");
        tree.insert(2, "two");
        tree.insert(3, "three");

        let values = tree.get_many(&[1, 2, 3]).unwrap();
        assert_eq!(values, vec![&"one", &"two", &"three"]);
        assert!(tree.get_many(&[1, 2, 4]).is_err());
        assert!(tree.get_many(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_bplus_get_mut() {
        let mut tree = BPlusTree::new(2);
        for i in 0..10 {
            tree.insert(i, i);
        }
        if let Some(value) = tree.get_mut(&7) {
            *value = 700;
        }
        assert_eq!(tree.get(&7), Some(&700));
        assert_eq!(tree.get_mut(&11), None);
    }

    #[test]
    fn test_branch_find_child_index_routes_equal_keys_right() {
        let mut branch = BranchNode::<i32, String>::new(2);
        branch.keys = vec![5, 10];
        branch.children = (0..3).map(NodeRef::leaf).collect();

        assert_eq!(branch.find_child_index(&3), 0);
        assert_eq!(branch.find_child_index(&5), 1);
        assert_eq!(branch.find_child_index(&7), 1);
        assert_eq!(branch.find_child_index(&10), 2);
        assert_eq!(branch.find_child_index(&15), 2);
        assert_eq!(branch.get_child(&15), Some(&NodeRef::leaf(2)));
    }

    #[test]
    fn test_leaf_node_get_operations() {
        let mut leaf = LeafNode::new(2);
        assert_eq!(leaf.get(&1), None);

        leaf.accept_from_right(1, "one");
        leaf.accept_from_right(3, "three");

        assert_eq!(leaf.get(&1), Some(&"one"));
        assert_eq!(leaf.get(&2), None);
        if let Some(value) = leaf.get_mut(&3) {
            *value = "THREE";
        }
        assert_eq!(leaf.get(&3), Some(&"THREE"));
    }
}
