//! Iterator implementations for both tree variants.
//!
//! Every iterator borrows the tree immutably and starts a fresh walk, so a
//! traversal always reflects the tree at the moment it was created. The B+
//! tree iterators follow the leaf chain and cache the current leaf reference;
//! the B-Tree iterator keeps an explicit stack of `(node, next entry)` frames
//! in place of recursion.

use crate::types::{BPlusTree, BTree, BTreeNode, LeafNode, NodeId, NULL_NODE};
use std::ops::Bound;

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over key-value pairs in the B+ tree using the leaf linked list.
pub struct ItemIterator<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    current_leaf_ref: Option<&'a LeafNode<K, V>>,
    current_leaf_index: usize,
    end_bound: Bound<K>,
    finished: bool,
}

/// Descending iterator over the B+ tree, walking `prev` links from the last leaf.
pub struct ReverseItemIterator<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    current_leaf_ref: Option<&'a LeafNode<K, V>>,
    /// Number of entries of the current leaf not yet yielded.
    remaining: usize,
}

/// Iterator over keys in the B+ tree.
pub struct KeyIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over values in the B+ tree.
pub struct ValueIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over a bounded slice of the B+ tree.
/// Uses tree navigation to find the start, then the leaf chain.
pub struct RangeIterator<'a, K, V> {
    iterator: Option<ItemIterator<'a, K, V>>,
}

/// In-order iterator over a B-Tree.
///
/// The top frame always points at the next entry to yield; frames whose
/// index has run past their entries are popped lazily.
pub struct BTreeIter<'a, K, V> {
    tree: &'a BTree<K, V>,
    stack: Vec<(&'a BTreeNode<K, V>, usize)>,
    end_bound: Bound<K>,
    finished: bool,
}

/// Iterator over B-Tree keys.
pub struct BTreeKeys<'a, K, V> {
    items: BTreeIter<'a, K, V>,
}

/// Iterator over B-Tree values in key order.
pub struct BTreeValues<'a, K, V> {
    items: BTreeIter<'a, K, V>,
}

fn beyond_end<K: Ord>(key: &K, end: &Bound<K>) -> bool {
    match end {
        Bound::Included(end) => key > end,
        Bound::Excluded(end) => key >= end,
        Bound::Unbounded => false,
    }
}

// ============================================================================
// B+ TREE ITERATOR METHODS
// ============================================================================

impl<K: Ord, V> BPlusTree<K, V> {
    /// Returns an iterator over all key-value pairs in sorted order.
    pub fn items(&self) -> ItemIterator<'_, K, V> {
        ItemIterator::new(self)
    }

    /// Alias for [`BPlusTree::items`].
    pub fn in_order(&self) -> ItemIterator<'_, K, V> {
        self.items()
    }

    /// Returns an iterator over all keys in sorted order.
    pub fn keys(&self) -> KeyIterator<'_, K, V> {
        KeyIterator {
            items: self.items(),
        }
    }

    /// Returns an iterator over all values in key order.
    pub fn values(&self) -> ValueIterator<'_, K, V> {
        ValueIterator {
            items: self.items(),
        }
    }

    /// Returns an iterator over all key-value pairs in descending order.
    ///
    /// ```
    /// use multiway_tree::BPlusTree;
    ///
    /// let tree: BPlusTree<_, _> = (1..=5).map(|k| (k, ())).collect();
    /// let keys: Vec<_> = tree.items_rev().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [5, 4, 3, 2, 1]);
    /// ```
    pub fn items_rev(&self) -> ReverseItemIterator<'_, K, V> {
        let current_leaf_ref = self.leaf_arena.get(self.last_leaf);
        ReverseItemIterator {
            tree: self,
            current_leaf_ref,
            remaining: current_leaf_ref.map_or(0, LeafNode::len),
        }
    }
}

// ============================================================================
// ITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, V> ItemIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTree<K, V>) -> Self {
        Self::new_from_position(tree, tree.first_leaf, 0, Bound::Unbounded)
    }

    /// Start at entry `index` of `leaf_id` and stop at `end_bound`.
    /// An index past the end of the leaf simply moves on to the next one.
    pub(crate) fn new_from_position(
        tree: &'a BPlusTree<K, V>,
        leaf_id: NodeId,
        index: usize,
        end_bound: Bound<K>,
    ) -> Self {
        Self {
            tree,
            current_leaf_ref: tree.leaf_arena.get(leaf_id),
            current_leaf_index: index,
            end_bound,
            finished: false,
        }
    }

    /// Move to the next leaf; returns false once the chain is exhausted.
    fn advance_to_next_leaf(&mut self) -> bool {
        let next = match self.current_leaf_ref {
            Some(leaf) if leaf.next != NULL_NODE => leaf.next,
            _ => return false,
        };
        self.current_leaf_ref = self.tree.leaf_arena.get(next);
        self.current_leaf_index = 0;
        self.current_leaf_ref.is_some()
    }
}

impl<'a, K: Ord, V> Iterator for ItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let leaf = self.current_leaf_ref?;
            if let (Some(key), Some(value)) = (
                leaf.keys.get(self.current_leaf_index),
                leaf.values.get(self.current_leaf_index),
            ) {
                // the chain is sorted, so the first key past the end finishes the walk
                if beyond_end(key, &self.end_bound) {
                    self.finished = true;
                    return None;
                }
                self.current_leaf_index += 1;
                return Some((key, value));
            }

            if !self.advance_to_next_leaf() {
                self.finished = true;
                return None;
            }
        }
    }
}

impl<'a, K, V> Iterator for ReverseItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.current_leaf_ref?;
            if self.remaining > 0 {
                self.remaining -= 1;
                return Some((&leaf.keys[self.remaining], &leaf.values[self.remaining]));
            }
            self.current_leaf_ref = match leaf.prev {
                NULL_NODE => None,
                prev => self.tree.leaf_arena.get(prev),
            };
            self.remaining = self.current_leaf_ref.map_or(0, LeafNode::len);
        }
    }
}

// ============================================================================
// KEY / VALUE ITERATORS
// ============================================================================

impl<'a, K: Ord, V> Iterator for KeyIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }
}

impl<'a, K: Ord, V> Iterator for ValueIterator<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }
}

// ============================================================================
// RANGEITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K: Ord, V> RangeIterator<'a, K, V> {
    pub(crate) fn new(
        tree: &'a BPlusTree<K, V>,
        start: Option<(NodeId, usize)>,
        end_bound: Bound<K>,
    ) -> Self {
        Self {
            iterator: start.map(|(leaf_id, index)| {
                ItemIterator::new_from_position(tree, leaf_id, index, end_bound)
            }),
        }
    }
}

impl<'a, K: Ord, V> Iterator for RangeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.iterator.as_mut()?.next()
    }
}

// ============================================================================
// B-TREE ITERATION
// ============================================================================

impl<K: Ord, V> BTree<K, V> {
    /// Returns an iterator over all key-value pairs in sorted order.
    ///
    /// ```
    /// use multiway_tree::BTree;
    ///
    /// let mut tree = BTree::new(2);
    /// for k in [3, 1, 2] {
    ///     tree.insert(k, k * 100);
    /// }
    /// let items: Vec<_> = tree.items().collect();
    /// assert_eq!(items, [(&1, &100), (&2, &200), (&3, &300)]);
    /// ```
    pub fn items(&self) -> BTreeIter<'_, K, V> {
        BTreeIter::new(self, Bound::Unbounded, Bound::Unbounded)
    }

    /// Alias for [`BTree::items`].
    pub fn in_order(&self) -> BTreeIter<'_, K, V> {
        self.items()
    }

    pub fn keys(&self) -> BTreeKeys<'_, K, V> {
        BTreeKeys {
            items: self.items(),
        }
    }

    pub fn values(&self) -> BTreeValues<'_, K, V> {
        BTreeValues {
            items: self.items(),
        }
    }
}

impl<'a, K: Ord, V> BTreeIter<'a, K, V> {
    /// Position the stack on the first entry admitted by `start` and stop
    /// once `end` is passed.
    pub(crate) fn new(tree: &'a BTree<K, V>, start: Bound<&K>, end: Bound<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
            end_bound: end,
            finished: false,
        };
        iter.seek(tree.root, start);
        iter
    }

    /// Descend from `node_id` toward `start`, leaving one frame per level.
    ///
    /// Each frame's index is the first entry at or after the bound; the
    /// child to its left may still hold qualifying keys, so the descent
    /// continues there.
    fn seek(&mut self, node_id: Option<NodeId>, start: Bound<&K>) {
        let mut current = node_id.and_then(|id| self.tree.arena.get(id));
        while let Some(node) = current {
            let index = match start {
                Bound::Included(low) => node.entries.partition_point(|e| e.key < *low),
                Bound::Excluded(low) => node.entries.partition_point(|e| e.key <= *low),
                Bound::Unbounded => 0,
            };
            self.stack.push((node, index));
            current = match node.is_leaf {
                true => None,
                false => node
                    .children
                    .get(index)
                    .and_then(|&child| self.tree.arena.get(child)),
            };
        }
    }
}

impl<'a, K, V> BTreeIter<'a, K, V> {
    /// Push the leftmost path of the subtree rooted at `node_id`.
    fn push_leftmost(&mut self, node_id: NodeId) {
        let mut current = self.tree.arena.get(node_id);
        while let Some(node) = current {
            self.stack.push((node, 0));
            current = match node.is_leaf {
                true => None,
                false => node
                    .children
                    .first()
                    .and_then(|&child| self.tree.arena.get(child)),
            };
        }
    }
}

impl<'a, K: Ord, V> Iterator for BTreeIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while let Some(frame) = self.stack.last_mut() {
            let (node, index) = *frame;
            let Some(entry) = node.entries.get(index) else {
                self.stack.pop();
                continue;
            };
            frame.1 += 1;

            if beyond_end(&entry.key, &self.end_bound) {
                self.finished = true;
                self.stack.clear();
                return None;
            }
            if !node.is_leaf {
                if let Some(&right) = node.children.get(index + 1) {
                    self.push_leftmost(right);
                }
            }
            return Some((&entry.key, &entry.value));
        }

        self.finished = true;
        None
    }
}

impl<'a, K: Ord, V> Iterator for BTreeKeys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }
}

impl<'a, K: Ord, V> Iterator for BTreeValues<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }
}

// ============================================================================
// STANDARD TRAIT IMPLEMENTATIONS
// ============================================================================

impl<'a, K: Ord, V> IntoIterator for &'a BPlusTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = ItemIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a BTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = BTreeIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for BPlusTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = BPlusTree::with_default_degree();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = BTree::with_default_degree();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for BPlusTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for BTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bplus_items_follow_leaf_chain() {
        let mut tree = BPlusTree::new(2);
        for k in (0..50).rev() {
            tree.insert(k, k * 2);
        }
        assert!(tree.leaf_count() > 1);

        let items: Vec<_> = tree.items().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<_> = (0..50).map(|k| (k, k * 2)).collect();
        assert_eq!(items, expected);
        assert_eq!(tree.values().count(), 50);
    }

    #[test]
    fn test_bplus_items_rev_matches_forward() {
        let tree: BPlusTree<i32, i32> = (0..40).map(|k| (k, k)).collect();
        let mut forward: Vec<_> = tree.keys().copied().collect();
        forward.reverse();
        let backward: Vec<_> = tree.items_rev().map(|(k, _)| *k).collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_iterators() {
        let bplus: BPlusTree<i32, i32> = BPlusTree::new(3);
        assert_eq!(bplus.items().next(), None);
        assert_eq!(bplus.items_rev().next(), None);

        let btree: BTree<i32, i32> = BTree::new(3);
        assert_eq!(btree.items().next(), None);
        assert_eq!(btree.keys().count(), 0);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let tree: BTree<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
        let first: Vec<_> = tree.in_order().collect();
        let second: Vec<_> = tree.in_order().collect();
        assert_eq!(first, second);
        assert_eq!(first, [(&1, &"a"), (&2, &"b")]);
    }

    #[test]
    fn test_btree_items_visit_internal_entries_in_order() {
        let mut tree = BTree::new(2);
        for k in [50, 10, 90, 30, 70, 20, 80, 40, 60, 0] {
            tree.insert(k, ());
        }
        assert!(tree.height() > 2);
        let keys: Vec<_> = tree.keys().copied().collect();
        assert_eq!(keys, (0..=90).step_by(10).collect::<Vec<_>>());
    }

    #[test]
    fn test_btree_seek_starts_mid_tree() {
        let tree: BTree<i32, ()> = (0..100).map(|k| (k * 2, ())).collect();
        let from_included: Vec<_> =
            BTreeIter::new(&tree, Bound::Included(&41), Bound::Included(50))
                .map(|(k, _)| *k)
                .collect();
        assert_eq!(from_included, [42, 44, 46, 48, 50]);

        let from_excluded: Vec<_> =
            BTreeIter::new(&tree, Bound::Excluded(&42), Bound::Excluded(50))
                .map(|(k, _)| *k)
                .collect();
        assert_eq!(from_excluded, [44, 46, 48]);
    }

    #[test]
    fn test_into_iterator_and_extend() {
        let mut tree = BPlusTree::new(2);
        tree.extend((0..10).map(|k| (k, k)));
        let mut sum = 0;
        for (_, v) in &tree {
            sum += v;
        }
        assert_eq!(sum, 45);

        let mut btree: BTree<i32, i32> = BTree::new(2);
        btree.extend([(1, 1), (1, 2)]);
        assert_eq!(btree.len(), 1);
        assert_eq!((&btree).into_iter().next(), Some((&1, &2)));
    }
}
