//! DELETE operations for both tree variants.
//!
//! B-Tree removal is a single top-down pass: before the descent enters a
//! child, that child is topped up above the minimum (borrowing from a sibling
//! or merging with one), so removing from a leaf can never underflow it. Keys
//! found in internal nodes are replaced by their predecessor or successor.
//!
//! B+ tree removal deletes from a leaf first and then repairs underflow
//! bottom-up. The descent records an explicit path of `(branch, child index)`
//! pairs, which the repair pops one level at a time.

use crate::error::{ModifyResult, TreeError, TreeResult, TreeResultExt};
use crate::types::{BPlusTree, BTree, Entry, NodeId, NodeRef, NULL_NODE};

// ============================================================================
// B-TREE DELETION
// ============================================================================

impl<K: Ord, V> BTree<K, V> {
    /// Remove a key, returning whether it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BTree;
    ///
    /// let mut tree = BTree::new(2);
    /// tree.insert(3, "three");
    /// assert!(tree.remove(&3));
    /// assert!(!tree.remove(&3));
    /// assert!(tree.is_empty());
    /// ```
    pub fn remove(&mut self, key: &K) -> bool {
        self.remove_item(key).is_some()
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove_item(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|entry| entry.value)
    }

    /// Remove a key, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Option<Entry<K, V>> {
        self.remove_entry_impl(key).or_default_with_log()
    }

    /// Remove with invariant checks, failing with `KeyNotFound` on a miss.
    pub fn try_remove(&mut self, key: &K) -> ModifyResult<V> {
        self.check_invariants_detailed()?;
        let entry = self
            .remove_entry_impl(key)
            .with_context("remove")?
            .ok_or(TreeError::KeyNotFound)?;
        self.check_invariants_detailed()?;
        Ok(entry.value)
    }

    pub(crate) fn remove_entry_impl(&mut self, key: &K) -> TreeResult<Option<Entry<K, V>>> {
        // A miss must leave the tree untouched, so don't start rebalancing blind.
        let Some(root_id) = self.root else {
            return Ok(None);
        };
        if !self.contains_key(key) {
            return Ok(None);
        }

        let removed = self.remove_from(root_id, key)?;
        if removed.is_some() {
            self.len -= 1;
        }
        self.shrink_root()?;
        Ok(removed)
    }

    fn remove_from(&mut self, start: NodeId, key: &K) -> TreeResult<Option<Entry<K, V>>> {
        let mut node_id = start;
        loop {
            let node = self.node(node_id)?;
            match node.find_entry(key) {
                Ok(index) if node.is_leaf => {
                    return Ok(Some(self.node_mut(node_id)?.entries.remove(index)));
                }
                Ok(index) => {
                    let left_id = self.child_at(node_id, index)?;
                    let right_id = self.child_at(node_id, index + 1)?;

                    // Prefer the predecessor when both sides could spare one.
                    let replacement = if self.node(left_id)?.can_donate() {
                        Some(self.pop_max(left_id)?)
                    } else if self.node(right_id)?.can_donate() {
                        Some(self.pop_min(right_id)?)
                    } else {
                        None
                    };

                    match replacement {
                        Some(replacement) => {
                            let slot = &mut self.node_mut(node_id)?.entries[index];
                            return Ok(Some(std::mem::replace(slot, replacement)));
                        }
                        None => {
                            // Both neighbours at minimum: pull the key down into
                            // their merge and keep going from there.
                            self.merge_children(node_id, index)?;
                            node_id = left_id;
                        }
                    }
                }
                Err(_) if node.is_leaf => return Ok(None),
                Err(index) => node_id = self.ensure_child_can_lose(node_id, index)?,
            }
        }
    }

    /// Remove and return the largest entry of the subtree rooted at `subtree`.
    fn pop_max(&mut self, subtree: NodeId) -> TreeResult<Entry<K, V>> {
        let mut node_id = subtree;
        loop {
            let node = self.node(node_id)?;
            if node.is_leaf {
                return self.node_mut(node_id)?.entries.pop().ok_or_else(|| {
                    TreeError::data_integrity("pop_max", &format!("leaf {} is empty", node_id))
                });
            }
            let last = node.children.len() - 1;
            node_id = self.ensure_child_can_lose(node_id, last)?;
        }
    }

    /// Remove and return the smallest entry of the subtree rooted at `subtree`.
    fn pop_min(&mut self, subtree: NodeId) -> TreeResult<Entry<K, V>> {
        let mut node_id = subtree;
        loop {
            let node = self.node(node_id)?;
            if node.is_leaf {
                let leaf = self.node_mut(node_id)?;
                if leaf.entries.is_empty() {
                    return Err(TreeError::data_integrity(
                        "pop_min",
                        &format!("leaf {} is empty", node_id),
                    ));
                }
                return Ok(leaf.entries.remove(0));
            }
            node_id = self.ensure_child_can_lose(node_id, 0)?;
        }
    }
}

impl<K, V> BTree<K, V> {
    /// Make sure `children[index]` holds more than `t - 1` entries before the
    /// descent enters it. Returns the id of the node to descend into, which
    /// is the left sibling when the child was merged into it.
    fn ensure_child_can_lose(&mut self, parent_id: NodeId, index: usize) -> TreeResult<NodeId> {
        let child_id = self.child_at(parent_id, index)?;
        if self.node(child_id)?.can_donate() {
            return Ok(child_id);
        }

        let child_count = self.node(parent_id)?.children.len();
        let left_id = match index {
            0 => None,
            _ => Some(self.child_at(parent_id, index - 1)?),
        };
        let right_id = if index + 1 < child_count {
            Some(self.child_at(parent_id, index + 1)?)
        } else {
            None
        };

        if let Some(left_id) = left_id {
            if self.node(left_id)?.can_donate() {
                self.borrow_from_left(parent_id, index, left_id, child_id)?;
                return Ok(child_id);
            }
        }
        if let Some(right_id) = right_id {
            if self.node(right_id)?.can_donate() {
                self.borrow_from_right(parent_id, index, right_id, child_id)?;
                return Ok(child_id);
            }
        }

        match (left_id, right_id) {
            (_, Some(_)) => {
                self.merge_children(parent_id, index)?;
                Ok(child_id)
            }
            (Some(left_id), None) => {
                self.merge_children(parent_id, index - 1)?;
                Ok(left_id)
            }
            (None, None) => Err(TreeError::corrupted_tree(
                "BTree",
                &format!("internal node {} has a single child", parent_id),
            )),
        }
    }

    /// Rotate the left sibling's last entry up into the parent and the
    /// parent separator down into the child.
    fn borrow_from_left(
        &mut self,
        parent_id: NodeId,
        index: usize,
        left_id: NodeId,
        child_id: NodeId,
    ) -> TreeResult<()> {
        let (moved, moved_child) = self.node_mut(left_id)?.borrow_last().ok_or_else(|| {
            TreeError::data_integrity("borrow_from_left", "sibling cannot donate")
        })?;
        let separator = std::mem::replace(&mut self.node_mut(parent_id)?.entries[index - 1], moved);
        self.node_mut(child_id)?.accept_from_left(separator, moved_child);
        tracing::trace!(from = left_id, to = child_id, "btree borrow from left");
        Ok(())
    }

    fn borrow_from_right(
        &mut self,
        parent_id: NodeId,
        index: usize,
        right_id: NodeId,
        child_id: NodeId,
    ) -> TreeResult<()> {
        let (moved, moved_child) = self.node_mut(right_id)?.borrow_first().ok_or_else(|| {
            TreeError::data_integrity("borrow_from_right", "sibling cannot donate")
        })?;
        let separator = std::mem::replace(&mut self.node_mut(parent_id)?.entries[index], moved);
        self.node_mut(child_id)?.accept_from_right(separator, moved_child);
        tracing::trace!(from = right_id, to = child_id, "btree borrow from right");
        Ok(())
    }

    /// Merge `children[index + 1]` and the separator `entries[index]` into
    /// `children[index]`, removing the slot from the parent.
    fn merge_children(&mut self, parent_id: NodeId, index: usize) -> TreeResult<()> {
        let left_id = self.child_at(parent_id, index)?;
        let (separator, right_id) = {
            let parent = self.node_mut(parent_id)?;
            (parent.entries.remove(index), parent.children.remove(index + 1))
        };
        let right = self
            .arena
            .deallocate(right_id)
            .ok_or_else(|| TreeError::missing_node("BTree", right_id))?;
        self.node_mut(left_id)?.merge_from(separator, right);
        tracing::trace!(left = left_id, right = right_id, "btree merge");
        Ok(())
    }

    /// Drop an emptied root: its only child takes over, or the tree empties.
    fn shrink_root(&mut self) -> TreeResult<()> {
        let Some(root_id) = self.root else {
            return Ok(());
        };
        let root = self.node(root_id)?;
        if !root.is_empty() {
            return Ok(());
        }

        self.root = if root.is_leaf {
            None
        } else {
            Some(self.child_at(root_id, 0)?)
        };
        self.arena.deallocate(root_id);
        tracing::debug!(old_root = root_id, new_root = ?self.root, "btree root collapsed");
        Ok(())
    }
}

// ============================================================================
// B+ TREE DELETION
// ============================================================================

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Remove a key, returning whether it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(2);
    /// for i in 0..10 {
    ///     tree.insert(i, i);
    /// }
    /// assert!(tree.remove(&4));
    /// assert!(!tree.remove(&4));
    /// assert_eq!(tree.len(), 9);
    /// ```
    pub fn remove(&mut self, key: &K) -> bool {
        self.remove_item(key).is_some()
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove_item(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove a key, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.remove_entry_impl(key).or_default_with_log()
    }

    /// Remove with invariant checks, failing with `KeyNotFound` on a miss.
    pub fn try_remove(&mut self, key: &K) -> ModifyResult<V> {
        self.check_invariants_detailed()?;
        let (_, value) = self
            .remove_entry_impl(key)
            .with_context("remove")?
            .ok_or(TreeError::KeyNotFound)?;
        self.check_invariants_detailed()?;
        Ok(value)
    }

    pub(crate) fn remove_entry_impl(&mut self, key: &K) -> TreeResult<Option<(K, V)>> {
        let Some(root) = self.root else {
            return Ok(None);
        };

        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut current = root;
        let leaf_id = loop {
            match current {
                NodeRef::Leaf(id, _) => break id,
                NodeRef::Branch(id, _) => {
                    let branch = self.branch(id)?;
                    let child_index = branch.find_child_index(key);
                    current = *branch.children.get(child_index).ok_or_else(|| {
                        TreeError::data_integrity(
                            "remove",
                            &format!("branch {} has no child {}", id, child_index),
                        )
                    })?;
                    path.push((id, child_index));
                }
            }
        };

        let leaf = self.leaf_mut(leaf_id)?;
        let Ok(index) = leaf.keys.binary_search(key) else {
            return Ok(None);
        };
        let removed = leaf.remove_at(index);
        let underfull = leaf.is_underfull();
        let emptied = leaf.is_empty();
        self.len -= 1;

        if path.is_empty() {
            // The root leaf may hold any number of keys; only an empty one goes.
            if emptied {
                self.unlink_leaf(leaf_id)?;
                self.leaf_arena.deallocate(leaf_id);
                self.root = None;
                tracing::debug!("bplus tree emptied");
            }
        } else if underfull {
            // The pair is gone and counted; a failed repair must not hide that.
            if let Err(e) = self.rebalance_leaf(leaf_id, &mut path) {
                tracing::error!(error = %e, leaf = leaf_id, "leaf repair failed after removal");
            }
        }

        Ok(Some(removed))
    }

    /// Repair an underfull non-root leaf: borrow from a sibling leaf with a
    /// spare key, otherwise merge into one and continue at the parent.
    fn rebalance_leaf(&mut self, leaf_id: NodeId, path: &mut Vec<(NodeId, usize)>) -> TreeResult<()> {
        let (parent_id, child_index) = path
            .pop()
            .ok_or_else(|| TreeError::data_integrity("rebalance_leaf", "empty path"))?;
        let (left_id, right_id) = self.sibling_ids(parent_id, child_index)?;

        if let Some(left_id) = left_id {
            if self.leaf(left_id)?.can_donate() {
                let (key, value) = self.leaf_mut(left_id)?.borrow_last().ok_or_else(|| {
                    TreeError::data_integrity("rebalance_leaf", "left leaf cannot donate")
                })?;
                let separator = key.clone();
                self.leaf_mut(leaf_id)?.accept_from_left(key, value);
                self.branch_mut(parent_id)?.keys[child_index - 1] = separator;
                tracing::trace!(from = left_id, to = leaf_id, "leaf borrow from left");
                return Ok(());
            }
        }

        if let Some(right_id) = right_id {
            if self.leaf(right_id)?.can_donate() {
                let (key, value) = self.leaf_mut(right_id)?.borrow_first().ok_or_else(|| {
                    TreeError::data_integrity("rebalance_leaf", "right leaf cannot donate")
                })?;
                let separator = self.leaf(right_id)?.first_key().cloned().ok_or_else(|| {
                    TreeError::data_integrity("rebalance_leaf", "right leaf emptied by borrow")
                })?;
                self.leaf_mut(leaf_id)?.accept_from_right(key, value);
                self.branch_mut(parent_id)?.keys[child_index] = separator;
                tracing::trace!(from = right_id, to = leaf_id, "leaf borrow from right");
                return Ok(());
            }
        }

        match (left_id, right_id) {
            (Some(left_id), _) => {
                self.branch_mut(parent_id)?.remove_child_after(child_index - 1);
                self.merge_leaves(left_id, leaf_id)?;
            }
            (None, Some(right_id)) => {
                self.branch_mut(parent_id)?.remove_child_after(child_index);
                self.merge_leaves(leaf_id, right_id)?;
            }
            (None, None) => {
                return Err(TreeError::corrupted_tree(
                    "BPlusTree",
                    &format!("branch {} has a single child", parent_id),
                ))
            }
        }

        self.rebalance_branch(parent_id, path)
    }
}

impl<K, V> BPlusTree<K, V> {
    /// Ids of the children either side of `children[child_index]`.
    fn sibling_ids(
        &self,
        parent_id: NodeId,
        child_index: usize,
    ) -> TreeResult<(Option<NodeId>, Option<NodeId>)> {
        let parent = self.branch(parent_id)?;
        let left = child_index
            .checked_sub(1)
            .and_then(|i| parent.children.get(i))
            .map(NodeRef::id);
        let right = parent.children.get(child_index + 1).map(NodeRef::id);
        Ok((left, right))
    }

    /// Fold `right_id` into its left neighbour `left_id` and discard it.
    /// The parent slot must already have been removed by the caller.
    fn merge_leaves(&mut self, left_id: NodeId, right_id: NodeId) -> TreeResult<()> {
        self.unlink_leaf(right_id)?;
        let right = self
            .leaf_arena
            .deallocate(right_id)
            .ok_or_else(|| TreeError::missing_node("Leaf", right_id))?;
        self.leaf_mut(left_id)?.merge_from(right);
        tracing::trace!(left = left_id, right = right_id, "leaf merge");
        Ok(())
    }

    /// Walk back up the recorded path fixing underfull branches, and
    /// collapse the root once it routes to a single child.
    fn rebalance_branch(
        &mut self,
        start: NodeId,
        path: &mut Vec<(NodeId, usize)>,
    ) -> TreeResult<()> {
        let mut branch_id = start;
        loop {
            let Some(&(parent_id, child_index)) = path.last() else {
                return self.collapse_root(branch_id);
            };
            if !self.branch(branch_id)?.is_underfull() {
                return Ok(());
            }
            path.pop();

            let (left_id, right_id) = self.sibling_ids(parent_id, child_index)?;

            if let Some(left_id) = left_id {
                if self.branch(left_id)?.can_donate() {
                    let (moved_key, moved_child) =
                        self.branch_mut(left_id)?.borrow_last().ok_or_else(|| {
                            TreeError::data_integrity("rebalance_branch", "left cannot donate")
                        })?;
                    let separator = std::mem::replace(
                        &mut self.branch_mut(parent_id)?.keys[child_index - 1],
                        moved_key,
                    );
                    self.branch_mut(branch_id)?
                        .accept_from_left(separator, moved_child);
                    tracing::trace!(from = left_id, to = branch_id, "branch borrow from left");
                    return Ok(());
                }
            }

            if let Some(right_id) = right_id {
                if self.branch(right_id)?.can_donate() {
                    let (moved_key, moved_child) =
                        self.branch_mut(right_id)?.borrow_first().ok_or_else(|| {
                            TreeError::data_integrity("rebalance_branch", "right cannot donate")
                        })?;
                    let separator = std::mem::replace(
                        &mut self.branch_mut(parent_id)?.keys[child_index],
                        moved_key,
                    );
                    self.branch_mut(branch_id)?
                        .accept_from_right(separator, moved_child);
                    tracing::trace!(from = right_id, to = branch_id, "branch borrow from right");
                    return Ok(());
                }
            }

            let (left, right, separator_index) = match (left_id, right_id) {
                (Some(left_id), _) => (left_id, branch_id, child_index - 1),
                (None, Some(right_id)) => (branch_id, right_id, child_index),
                (None, None) => {
                    return Err(TreeError::corrupted_tree(
                        "BPlusTree",
                        &format!("branch {} has a single child", parent_id),
                    ))
                }
            };
            let (separator, _) = self.branch_mut(parent_id)?.remove_child_after(separator_index);
            let right_node = self
                .branch_arena
                .deallocate(right)
                .ok_or_else(|| TreeError::missing_node("Branch", right))?;
            self.branch_mut(left)?.merge_from(separator, right_node);
            tracing::trace!(left = left, right = right, "branch merge");

            branch_id = parent_id;
        }
    }

    /// Replace a root branch left with no separators by its only child.
    fn collapse_root(&mut self, root_id: NodeId) -> TreeResult<()> {
        let root = self.branch(root_id)?;
        if !root.is_empty() {
            return Ok(());
        }
        let child = *root.children.first().ok_or_else(|| {
            TreeError::corrupted_tree("BPlusTree", &format!("root {} has no children", root_id))
        })?;
        self.branch_arena.deallocate(root_id);
        self.root = Some(child);
        if let NodeRef::Leaf(leaf_id, _) = child {
            self.first_leaf = leaf_id;
            self.last_leaf = leaf_id;
            let leaf = self.leaf_mut(leaf_id)?;
            leaf.prev = NULL_NODE;
            leaf.next = NULL_NODE;
        }
        tracing::debug!(old_root = root_id, new_root = child.id(), "bplus root collapsed");
        Ok(())
    }
}
