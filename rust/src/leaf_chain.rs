//! Leaf linkage maintenance for BPlusTree.
//!
//! Every leaf carries non-owning `prev`/`next` ids forming a doubly linked
//! chain in key order; the tree tracks both ends. Splits and merges go
//! through the two primitives here so that both neighbours and the tracked
//! ends are patched in the same step.

use crate::error::{TreeError, TreeResult};
use crate::types::{BPlusTree, NodeId, NULL_NODE};

impl<K, V> BPlusTree<K, V> {
    /// Splice `new_id` into the chain immediately after `left_id`.
    pub(crate) fn link_leaf_after(&mut self, left_id: NodeId, new_id: NodeId) -> TreeResult<()> {
        let old_next = {
            let left = self.leaf_mut(left_id)?;
            std::mem::replace(&mut left.next, new_id)
        };

        {
            let new_leaf = self.leaf_mut(new_id)?;
            new_leaf.prev = left_id;
            new_leaf.next = old_next;
        }

        if old_next == NULL_NODE {
            self.last_leaf = new_id;
        } else {
            self.leaf_mut(old_next)?.prev = new_id;
        }
        Ok(())
    }

    /// Remove `leaf_id` from the chain, joining its neighbours.
    ///
    /// The leaf itself is left allocated with cleared links; the caller
    /// decides what happens to it.
    pub(crate) fn unlink_leaf(&mut self, leaf_id: NodeId) -> TreeResult<()> {
        let (prev, next) = {
            let leaf = self.leaf_mut(leaf_id)?;
            let links = (leaf.prev, leaf.next);
            leaf.prev = NULL_NODE;
            leaf.next = NULL_NODE;
            links
        };

        if prev == NULL_NODE {
            self.first_leaf = next;
        } else {
            self.leaf_mut(prev)?.next = next;
        }
        if next == NULL_NODE {
            self.last_leaf = prev;
        } else {
            self.leaf_mut(next)?.prev = prev;
        }
        Ok(())
    }

    /// Leaf ids in chain order, following `next` from the first leaf.
    pub(crate) fn leaf_chain_ids(&self) -> TreeResult<Vec<NodeId>> {
        self.walk_chain(self.first_leaf, |id| self.leaf(id).map(|leaf| leaf.next))
    }

    /// Leaf ids in reverse chain order, following `prev` from the last leaf.
    pub(crate) fn leaf_chain_ids_rev(&self) -> TreeResult<Vec<NodeId>> {
        self.walk_chain(self.last_leaf, |id| self.leaf(id).map(|leaf| leaf.prev))
    }

    fn walk_chain<F>(&self, start: NodeId, step: F) -> TreeResult<Vec<NodeId>>
    where
        F: Fn(NodeId) -> TreeResult<NodeId>,
    {
        let limit = self.leaf_arena.len();
        let mut ids = Vec::with_capacity(limit);
        let mut current = start;
        while current != NULL_NODE {
            if ids.len() >= limit {
                return Err(TreeError::corrupted_tree(
                    "Leaf chain",
                    &format!("walk exceeded {} allocated leaves", limit),
                ));
            }
            ids.push(current);
            current = step(current)?;
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{BPlusTree, LeafNode, NULL_NODE};

    fn tree_with_leaves(count: usize) -> (BPlusTree<i32, i32>, Vec<u32>) {
        let mut tree = BPlusTree::new(2);
        let first = tree.leaf_arena.allocate(LeafNode::new(2)).unwrap();
        tree.first_leaf = first;
        tree.last_leaf = first;
        let mut ids = vec![first];
        for _ in 1..count {
            let id = tree.leaf_arena.allocate(LeafNode::new(2)).unwrap();
            let left = *ids.last().unwrap();
            tree.link_leaf_after(left, id).unwrap();
            ids.push(id);
        }
        (tree, ids)
    }

    #[test]
    fn test_link_after_last_moves_last_leaf() {
        let (tree, ids) = tree_with_leaves(3);
        assert_eq!(tree.last_leaf, ids[2]);
        assert_eq!(tree.leaf_chain_ids().unwrap(), ids);

        let mut reversed = ids.clone();
        reversed.reverse();
        assert_eq!(tree.leaf_chain_ids_rev().unwrap(), reversed);
    }

    #[test]
    fn test_link_in_middle() {
        let (mut tree, ids) = tree_with_leaves(2);
        let middle = tree.leaf_arena.allocate(LeafNode::new(2)).unwrap();
        tree.link_leaf_after(ids[0], middle).unwrap();

        assert_eq!(tree.leaf_chain_ids().unwrap(), vec![ids[0], middle, ids[1]]);
        assert_eq!(tree.leaf_arena.get(ids[1]).unwrap().prev, middle);
        assert_eq!(tree.last_leaf, ids[1]);
    }

    #[test]
    fn test_unlink_ends_and_middle() {
        let (mut tree, ids) = tree_with_leaves(4);

        tree.unlink_leaf(ids[1]).unwrap();
        assert_eq!(tree.leaf_chain_ids().unwrap(), vec![ids[0], ids[2], ids[3]]);
        assert_eq!(tree.leaf_arena.get(ids[1]).unwrap().next, NULL_NODE);

        tree.unlink_leaf(ids[0]).unwrap();
        assert_eq!(tree.first_leaf, ids[2]);
        assert_eq!(tree.leaf_arena.get(ids[2]).unwrap().prev, NULL_NODE);

        tree.unlink_leaf(ids[3]).unwrap();
        assert_eq!(tree.last_leaf, ids[2]);
        assert_eq!(tree.leaf_chain_ids_rev().unwrap(), vec![ids[2]]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let (mut tree, ids) = tree_with_leaves(2);
        tree.leaf_arena.get_mut(ids[1]).unwrap().next = ids[0];
        assert!(tree.leaf_chain_ids().is_err());
    }
}
