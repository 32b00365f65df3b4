//! B-Tree and B+ tree ordered maps in Rust.
//!
//! Both maps are parameterised by a minimum degree `t`: every node other
//! than the root holds between `t - 1` and `2t - 1` keys and all leaves sit
//! at the same depth, so lookups, inserts and removals touch O(log n) nodes.
//!
//! - [`BTree`] stores key-value entries in every node, internal ones included.
//! - [`BPlusTree`] keeps values in leaves only and links the leaves into a
//!   doubly linked chain, so ordered scans and range queries walk siblings.
//!
//! Nodes live in per-tree arenas and refer to each other by [`NodeId`].
//!
//! ```
//! use multiway_tree::{BPlusTree, BTree};
//!
//! let mut btree = BTree::new(2);
//! let mut bplus = BPlusTree::new(2);
//! for k in 1..=10 {
//!     btree.insert(k, k * k);
//!     bplus.insert(k, k * k);
//! }
//! assert!(btree.height() > 1);
//! assert_eq!(btree.keys().copied().collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
//! assert_eq!(bplus.range(&3, &5).map(|(_, v)| *v).collect::<Vec<_>>(), [9, 16, 25]);
//! ```

mod compact_arena;
pub mod construction;
mod delete_operations;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod leaf_chain;
mod node;
mod range_queries;
mod tree_structure;
mod types;
mod validation;

pub use compact_arena::{CompactArena, CompactArenaStats};
pub use error::{KeyResult, ModifyResult, TreeError, TreeResult, TreeResultExt};
pub use iteration::{
    BTreeIter, BTreeKeys, BTreeValues, ItemIterator, KeyIterator, RangeIterator,
    ReverseItemIterator, ValueIterator,
};
pub use types::{
    BPlusTree, BTree, BTreeNode, BranchNode, Entry, LeafNode, NodeId, NodeRef, DEFAULT_DEGREE,
    MAX_DEGREE, MIN_DEGREE, NULL_NODE, PREALLOCATED_SLOTS,
};
