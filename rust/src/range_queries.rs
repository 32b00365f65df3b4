//! Range query operations for both tree variants.
//!
//! Both variants seek to the start of the range with a single root-to-leaf
//! descent and then scan forward, stopping at the first key past the end.
//! An inverted range is simply empty.

use crate::iteration::{BTreeIter, RangeIterator};
use crate::types::{BPlusTree, BTree, NodeId};
use std::ops::{Bound, RangeBounds};

// ============================================================================
// B+ TREE RANGE QUERIES
// ============================================================================

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Returns an iterator over the pairs with `low <= key <= high`.
    ///
    /// # Examples
    ///
    /// ```
    /// use multiway_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(2);
    /// for i in 1..=20 {
    ///     tree.insert(i, i * 10);
    /// }
    /// let keys: Vec<_> = tree.range(&5, &10).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [5, 6, 7, 8, 9, 10]);
    ///
    /// // an inverted range is empty, not an error
    /// assert_eq!(tree.range(&10, &5).count(), 0);
    /// ```
    pub fn range(&self, low: &K, high: &K) -> RangeIterator<'_, K, V> {
        self.range_bounds((Bound::Included(low), Bound::Included(high)))
    }

    /// Returns an iterator over key-value pairs in a range using Rust's range syntax.
    ///
    /// ```
    /// use multiway_tree::BPlusTree;
    ///
    /// let tree: BPlusTree<_, _> = (0..10).map(|i| (i, ())).collect();
    ///
    /// let range1: Vec<_> = tree.range_bounds(3..7).map(|(k, _)| *k).collect();
    /// assert_eq!(range1, [3, 4, 5, 6]);
    ///
    /// let range2: Vec<_> = tree.range_bounds(5..).map(|(k, _)| *k).collect();
    /// assert_eq!(range2, [5, 6, 7, 8, 9]);
    ///
    /// let range3: Vec<_> = tree.range_bounds(..=2).map(|(k, _)| *k).collect();
    /// assert_eq!(range3, [0, 1, 2]);
    /// ```
    pub fn range_bounds<R>(&self, range: R) -> RangeIterator<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        let start = match range.start_bound() {
            Bound::Unbounded => (self.first_leaf != crate::types::NULL_NODE)
                .then_some((self.first_leaf, 0)),
            bound => self.find_range_start(bound),
        };
        RangeIterator::new(self, start, range.end_bound().cloned())
    }

    // ============================================================================
    // RANGE QUERY HELPERS
    // ============================================================================

    /// Leaf and index of the first key admitted by `start`.
    ///
    /// The index may equal the leaf's length, in which case the scan starts
    /// at the next leaf in the chain.
    fn find_range_start(&self, start: Bound<&K>) -> Option<(NodeId, usize)> {
        let (key, inclusive) = match start {
            Bound::Included(key) => (key, true),
            Bound::Excluded(key) => (key, false),
            Bound::Unbounded => return None,
        };
        let leaf_id = self.find_leaf_for_key(key)?;
        let leaf = self.leaf_arena.get(leaf_id)?;
        let index = match inclusive {
            true => leaf.keys.partition_point(|k| k < key),
            false => leaf.keys.partition_point(|k| k <= key),
        };
        Some((leaf_id, index))
    }
}

// ============================================================================
// B-TREE RANGE QUERIES
// ============================================================================

impl<K: Ord + Clone, V> BTree<K, V> {
    /// Returns an iterator over the pairs with `low <= key <= high`.
    ///
    /// ```
    /// use multiway_tree::BTree;
    ///
    /// let tree: BTree<_, _> = (1..=20).map(|i| (i, ())).collect();
    /// let keys: Vec<_> = tree.range(&5, &10).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [5, 6, 7, 8, 9, 10]);
    /// ```
    pub fn range(&self, low: &K, high: &K) -> BTreeIter<'_, K, V> {
        self.range_bounds((Bound::Included(low), Bound::Included(high)))
    }

    /// Returns an iterator over the pairs inside `range`.
    ///
    /// The in-order stack is seeded by descending toward the start bound,
    /// so entries before the range are never visited.
    pub fn range_bounds<R>(&self, range: R) -> BTreeIter<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        BTreeIter::new(self, range.start_bound(), range.end_bound().cloned())
    }
}
