//! Validation and debugging utilities for both tree variants.
//!
//! The checkers walk the whole structure and report the first violated
//! invariant: node occupancy, key ordering against ancestor bounds, uniform
//! leaf depth, the cached length, arena bookkeeping and, for the B+ tree,
//! agreement between the leaf chain and the structural leaf order.

use crate::error::{TreeError, TreeResult};
use crate::types::{BPlusTree, BTree, NodeId, NodeRef, NULL_NODE};

/// Bounds inherited from ancestors while descending.
struct KeyBounds<'a, K> {
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

fn check_sorted<K: Ord>(keys: impl Iterator<Item = K>, node: &str, id: NodeId) -> TreeResult<()> {
    let mut previous: Option<K> = None;
    for key in keys {
        if previous.as_ref().is_some_and(|p| *p >= key) {
            return Err(TreeError::corrupted_tree(
                node,
                &format!("keys of node {} are not strictly ascending", id),
            ));
        }
        previous = Some(key);
    }
    Ok(())
}

fn check_occupancy(
    node: &str,
    id: NodeId,
    len: usize,
    is_root: bool,
    min_keys: usize,
    max_keys: usize,
) -> TreeResult<()> {
    if len > max_keys {
        return Err(TreeError::corrupted_tree(
            node,
            &format!("node {} holds {} keys, more than {}", id, len, max_keys),
        ));
    }
    let floor = if is_root { 1 } else { min_keys };
    if len < floor {
        return Err(TreeError::corrupted_tree(
            node,
            &format!("node {} holds {} keys, fewer than {}", id, len, floor),
        ));
    }
    Ok(())
}

fn record_leaf_depth(leaf_depth: &mut Option<usize>, depth: usize, id: NodeId) -> TreeResult<()> {
    match *leaf_depth {
        None => *leaf_depth = Some(depth),
        Some(expected) if expected != depth => {
            return Err(TreeError::corrupted_tree(
                "Balance",
                &format!("leaf {} at depth {}, expected {}", id, depth, expected),
            ))
        }
        Some(_) => {}
    }
    Ok(())
}

// ============================================================================
// B-TREE VALIDATION
// ============================================================================

impl<K: Ord, V> BTree<K, V> {
    /// Check if the tree maintains B-Tree invariants.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants, reporting the first violation found.
    pub fn check_invariants_detailed(&self) -> TreeResult<()> {
        let Some(root_id) = self.root else {
            if self.len != 0 || !self.arena.is_empty() {
                return Err(TreeError::data_integrity(
                    "BTree",
                    &format!("no root but len {} and {} nodes", self.len, self.arena.len()),
                ));
            }
            return Ok(());
        };

        let mut leaf_depth = None;
        let bounds = KeyBounds {
            lower: None,
            upper: None,
        };
        let count = self.check_node(root_id, bounds, 0, &mut leaf_depth)?;

        if count != self.len {
            return Err(TreeError::data_integrity(
                "BTree",
                &format!("len is {} but {} entries are stored", self.len, count),
            ));
        }
        let reachable = self.node_count();
        if reachable != self.arena.len() {
            return Err(TreeError::arena_error(
                "BTree consistency check",
                &format!("{} in tree vs {} in arena", reachable, self.arena.len()),
            ));
        }
        Ok(())
    }

    /// Alias for [`BTree::check_invariants_detailed`].
    pub fn validate(&self) -> TreeResult<()> {
        self.check_invariants_detailed()
    }

    /// Recursively check a subtree, returning its entry count.
    fn check_node(
        &self,
        id: NodeId,
        bounds: KeyBounds<'_, K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> TreeResult<usize> {
        let node = self.node(id)?;
        check_occupancy(
            "BTree",
            id,
            node.len(),
            depth == 0,
            self.min_keys(),
            self.max_keys(),
        )?;
        check_sorted(node.entries.iter().map(|e| &e.key), "BTree", id)?;

        let (first, last) = match (node.entries.first(), node.entries.last()) {
            (Some(first), Some(last)) => (&first.key, &last.key),
            _ => return Ok(0),
        };
        if bounds.lower.is_some_and(|lower| first <= lower)
            || bounds.upper.is_some_and(|upper| last >= upper)
        {
            return Err(TreeError::corrupted_tree(
                "BTree",
                &format!("node {} has keys outside its parent's range", id),
            ));
        }

        if node.is_leaf {
            if !node.children.is_empty() {
                return Err(TreeError::corrupted_tree(
                    "BTree",
                    &format!("leaf {} has children", id),
                ));
            }
            record_leaf_depth(leaf_depth, depth, id)?;
            return Ok(node.len());
        }

        if node.children.len() != node.len() + 1 {
            return Err(TreeError::corrupted_tree(
                "BTree",
                &format!(
                    "node {} has {} entries but {} children",
                    id,
                    node.len(),
                    node.children.len()
                ),
            ));
        }

        let mut count = node.len();
        for (i, &child) in node.children.iter().enumerate() {
            let child_bounds = KeyBounds {
                lower: match i {
                    0 => bounds.lower,
                    _ => Some(&node.entries[i - 1].key),
                },
                upper: node.entries.get(i).map(|e| &e.key).or(bounds.upper),
            };
            count += self.check_node(child, child_bounds, depth + 1, leaf_depth)?;
        }
        Ok(count)
    }
}

impl<K, V> BTree<K, V> {
    /// Returns the entry counts of all leaves, left to right.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaf_sizes(root, &mut sizes);
        }
        sizes
    }

    fn collect_leaf_sizes(&self, id: NodeId, sizes: &mut Vec<usize>) {
        if let Some(node) = self.arena.get(id) {
            if node.is_leaf {
                sizes.push(node.len());
            }
            for &child in &node.children {
                self.collect_leaf_sizes(child, sizes);
            }
        }
    }

    /// Prints the node structure for debugging.
    pub fn print_node_chain(&self) {
        println!("BTree structure (t = {}):", self.min_degree);
        if let Some(root) = self.root {
            self.print_node(root, 0);
        }
    }

    fn print_node(&self, id: NodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.arena.get(id) {
            Some(node) => {
                let kind = if node.is_leaf { "Leaf" } else { "Node" };
                println!("{}{}[id={}]: {} entries", indent, kind, id, node.len());
                for &child in &node.children {
                    self.print_node(child, depth + 1);
                }
            }
            None => println!("{}Node[id={}]: <missing>", indent, id),
        }
    }
}

// ============================================================================
// B+ TREE VALIDATION
// ============================================================================

impl<K: Ord, V> BPlusTree<K, V> {
    /// Check if the tree maintains B+ tree invariants.
    /// Returns true if all invariants are satisfied.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants with detailed error reporting.
    pub fn check_invariants_detailed(&self) -> TreeResult<()> {
        let Some(root) = self.root else {
            return self.check_empty_state();
        };

        let mut leaf_order = Vec::new();
        let mut leaf_depth = None;
        let bounds = KeyBounds {
            lower: None,
            upper: None,
        };
        let count = self.check_node(root, bounds, 0, &mut leaf_depth, &mut leaf_order)?;

        if count != self.len {
            return Err(TreeError::data_integrity(
                "BPlusTree",
                &format!("len is {} but {} pairs are stored", self.len, count),
            ));
        }

        self.check_arena_tree_consistency()?;
        self.check_leaf_chain(&leaf_order)
    }

    /// Alias for check_invariants_detailed.
    pub fn validate(&self) -> TreeResult<()> {
        self.check_invariants_detailed()
    }

    fn check_empty_state(&self) -> TreeResult<()> {
        if self.len != 0
            || self.first_leaf != NULL_NODE
            || self.last_leaf != NULL_NODE
            || !self.leaf_arena.is_empty()
            || !self.branch_arena.is_empty()
        {
            return Err(TreeError::data_integrity(
                "BPlusTree",
                "no root but the tree still holds state",
            ));
        }
        Ok(())
    }

    /// Check that arena allocation matches tree structure
    fn check_arena_tree_consistency(&self) -> TreeResult<()> {
        let (tree_leaf_count, tree_branch_count) = self.count_nodes_in_tree();
        let leaf_stats = self.leaf_arena.stats();
        let branch_stats = self.branch_arena.stats();

        if tree_leaf_count != leaf_stats.allocated_count {
            return Err(TreeError::arena_error(
                "Leaf consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_leaf_count, leaf_stats.allocated_count
                ),
            ));
        }
        if tree_branch_count != branch_stats.allocated_count {
            return Err(TreeError::arena_error(
                "Branch consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_branch_count, branch_stats.allocated_count
                ),
            ));
        }
        Ok(())
    }

    /// The chain must visit exactly the structural leaves, in order, both ways.
    fn check_leaf_chain(&self, leaf_order: &[NodeId]) -> TreeResult<()> {
        let forward = self.leaf_chain_ids()?;
        if forward != leaf_order {
            return Err(TreeError::corrupted_tree(
                "Leaf chain",
                &format!("tree has {:?}, chain has {:?}", leaf_order, forward),
            ));
        }

        let mut backward = self.leaf_chain_ids_rev()?;
        backward.reverse();
        if backward != leaf_order {
            return Err(TreeError::corrupted_tree(
                "Leaf chain",
                &format!("prev links give {:?}, expected {:?}", backward, leaf_order),
            ));
        }
        Ok(())
    }

    /// Recursively check a subtree, returning its pair count and appending
    /// its leaves to `leaf_order` left to right.
    ///
    /// Keys of a subtree satisfy `lower <= key < upper`: a separator may be
    /// stale after deletions but still bounds its right subtree from below.
    fn check_node(
        &self,
        node: NodeRef<K, V>,
        bounds: KeyBounds<'_, K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        leaf_order: &mut Vec<NodeId>,
    ) -> TreeResult<usize> {
        let in_bounds = |key: &K| {
            bounds.lower.is_none_or(|lower| key >= lower)
                && bounds.upper.is_none_or(|upper| key < upper)
        };

        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self.leaf(id)?;
                if leaf.keys.len() != leaf.values.len() {
                    return Err(TreeError::data_integrity(
                        "Leaf",
                        &format!("leaf {} has mismatched keys and values", id),
                    ));
                }
                check_occupancy(
                    "Leaf",
                    id,
                    leaf.len(),
                    depth == 0,
                    self.min_keys(),
                    self.max_keys(),
                )?;
                check_sorted(leaf.keys.iter(), "Leaf", id)?;
                if !leaf.keys.iter().all(in_bounds) {
                    return Err(TreeError::corrupted_tree(
                        "Leaf",
                        &format!("leaf {} has keys outside its parent's range", id),
                    ));
                }
                record_leaf_depth(leaf_depth, depth, id)?;
                leaf_order.push(id);
                Ok(leaf.len())
            }
            NodeRef::Branch(id, _) => {
                let branch = self.branch(id)?;
                if branch.children.len() != branch.keys.len() + 1 {
                    return Err(TreeError::corrupted_tree(
                        "Branch",
                        &format!(
                            "branch {} has {} keys but {} children",
                            id,
                            branch.keys.len(),
                            branch.children.len()
                        ),
                    ));
                }
                check_occupancy(
                    "Branch",
                    id,
                    branch.len(),
                    depth == 0,
                    self.min_keys(),
                    self.max_keys(),
                )?;
                check_sorted(branch.keys.iter(), "Branch", id)?;
                if !branch.keys.iter().all(in_bounds) {
                    return Err(TreeError::corrupted_tree(
                        "Branch",
                        &format!("branch {} has separators outside its range", id),
                    ));
                }

                let mut count = 0;
                for (i, &child) in branch.children.iter().enumerate() {
                    let child_bounds = KeyBounds {
                        lower: match i {
                            0 => bounds.lower,
                            _ => Some(&branch.keys[i - 1]),
                        },
                        upper: branch.keys.get(i).or(bounds.upper),
                    };
                    count +=
                        self.check_node(child, child_bounds, depth + 1, leaf_depth, leaf_order)?;
                }
                Ok(count)
            }
        }
    }
}

impl<K, V> BPlusTree<K, V> {
    /// Returns the sizes of all leaf nodes, left to right.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaf_sizes(root, &mut sizes);
        }
        sizes
    }

    /// Recursively collect leaf sizes for debugging.
    fn collect_leaf_sizes(&self, node: NodeRef<K, V>, sizes: &mut Vec<usize>) {
        match node {
            NodeRef::Leaf(id, _) => {
                if let Some(leaf) = self.leaf_arena.get(id) {
                    sizes.push(leaf.len());
                }
            }
            NodeRef::Branch(id, _) => {
                if let Some(branch) = self.branch_arena.get(id) {
                    for &child in &branch.children {
                        self.collect_leaf_sizes(child, sizes);
                    }
                }
            }
        }
    }

    /// Prints the node chain for debugging.
    pub fn print_node_chain(&self) {
        println!("Tree structure (t = {}):", self.min_degree);
        if let Some(root) = self.root {
            self.print_node(root, 0);
        }
        println!("Leaf chain: {:?}", self.leaf_chain_ids());
    }

    /// Print a node and its children recursively for debugging.
    fn print_node(&self, node: NodeRef<K, V>, depth: usize) {
        let indent = "  ".repeat(depth);
        match node {
            NodeRef::Leaf(id, _) => match self.leaf_arena.get(id) {
                Some(leaf) => println!(
                    "{}Leaf[id={}, prev={}, next={}]: {} keys",
                    indent,
                    id,
                    leaf.prev,
                    leaf.next,
                    leaf.len()
                ),
                None => println!("{}Leaf[id={}]: <missing>", indent, id),
            },
            NodeRef::Branch(id, _) => match self.branch_arena.get(id) {
                Some(branch) => {
                    println!(
                        "{}Branch[id={}]: {} keys, {} children",
                        indent,
                        id,
                        branch.keys.len(),
                        branch.children.len()
                    );
                    for &child in &branch.children {
                        self.print_node(child, depth + 1);
                    }
                }
                None => println!("{}Branch[id={}]: <missing>", indent, id),
            },
        }
    }
}
