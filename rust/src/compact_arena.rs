//! Compact arena implementation using Vec<T> instead of Vec<Option<T>>.
//!
//! Tree nodes live in an arena and refer to each other by `NodeId`. Freed
//! slots go on a free list and are handed out again by later allocations.

use crate::error::{TreeError, TreeResult};
use std::convert::TryFrom;

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Sentinel meaning "no node" (used for absent leaf links).
pub const NULL_NODE: NodeId = u32::MAX;

/// Statistics for a compact arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactArenaStats {
    pub total_slots: usize,
    pub allocated_count: usize,
    pub free_count: usize,
}

/// Arena allocator that stores items directly, tracking live slots in a mask.
#[derive(Debug)]
pub struct CompactArena<T> {
    storage: Vec<T>,
    free_list: Vec<usize>,
    allocated_mask: Vec<bool>,
    allocated: usize,
}

impl<T> CompactArena<T> {
    /// Create a new empty compact arena
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
            allocated_mask: Vec::new(),
            allocated: 0,
        }
    }

    /// Allocate a new item in the arena and return its ID
    #[inline]
    pub fn allocate(&mut self, item: T) -> TreeResult<NodeId> {
        let index = match self.free_list.pop() {
            Some(free_index) => {
                self.storage[free_index] = item;
                self.allocated_mask[free_index] = true;
                free_index
            }
            None => {
                let index = self.storage.len();
                // NULL_NODE is reserved, so the last representable id is never handed out
                if index >= NULL_NODE as usize {
                    return Err(TreeError::arena_error(
                        "allocate",
                        &format!("arena exhausted at {} slots", index),
                    ));
                }
                self.storage.push(item);
                self.allocated_mask.push(true);
                index
            }
        };

        self.allocated += 1;
        NodeId::try_from(index)
            .map_err(|_| TreeError::arena_error("allocate", "index does not fit in NodeId"))
    }

    #[inline]
    fn live_index(&self, id: NodeId) -> Option<usize> {
        if id == NULL_NODE {
            return None;
        }
        let index = usize::try_from(id).ok()?;
        self.allocated_mask
            .get(index)
            .copied()
            .unwrap_or(false)
            .then_some(index)
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.live_index(id).map(|index| &self.storage[index])
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.live_index(id).map(move |index| &mut self.storage[index])
    }

    /// Check if an ID is valid and allocated
    pub fn contains(&self, id: NodeId) -> bool {
        self.live_index(id).is_some()
    }

    /// Get arena statistics
    pub fn stats(&self) -> CompactArenaStats {
        CompactArenaStats {
            total_slots: self.storage.len(),
            allocated_count: self.allocated,
            free_count: self.free_list.len(),
        }
    }

    /// Get the number of allocated items
    pub fn len(&self) -> usize {
        self.allocated
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Clear all items from the arena
    pub fn clear(&mut self) {
        self.storage.clear();
        self.allocated_mask.clear();
        self.free_list.clear();
        self.allocated = 0;
    }

    /// Get the number of free slots
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }
}

impl<T: Default> CompactArena<T> {
    /// Deallocate an item, leaving a default value in its slot, and return it
    #[inline]
    pub fn deallocate(&mut self, id: NodeId) -> Option<T> {
        let index = self.live_index(id)?;
        self.allocated_mask[index] = false;
        self.free_list.push(index);
        self.allocated -= 1;
        Some(std::mem::take(&mut self.storage[index]))
    }
}

impl<T> Default for CompactArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
