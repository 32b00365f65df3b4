//! Error handling and result types for tree operations.
//!
//! Missing keys and empty trees are ordinary outcomes and surface through
//! `Option`/`bool` on the everyday API; `TreeError` is what the `try_*` and
//! accessor variants return, and what internal structural routines propagate
//! when they find the node graph in an inconsistent state.

use std::fmt;

/// Error type for B-Tree and B+ tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Key not found in the tree.
    KeyNotFound,
    /// A min/max style accessor was called on an empty tree.
    EmptyTree,
    /// Internal data structure integrity violation.
    DataIntegrityError(String),
    /// Arena operation failed (dangling or exhausted node id).
    ArenaError(String),
    /// Tree corruption detected.
    CorruptedTree(String),
}

impl TreeError {
    /// Create a DataIntegrityError with context
    pub fn data_integrity(context: &str, details: &str) -> Self {
        Self::DataIntegrityError(format!("{}: {}", context, details))
    }

    /// Create an ArenaError with context
    pub fn arena_error(operation: &str, details: &str) -> Self {
        Self::ArenaError(format!("{} failed: {}", operation, details))
    }

    /// Create an ArenaError for a node id that does not resolve.
    pub fn missing_node(node_type: &str, node_id: u32) -> Self {
        Self::ArenaError(format!("{} node {} not found", node_type, node_id))
    }

    /// Create a CorruptedTree error with context
    pub fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{} corruption: {}", component, details))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound)
    }

    pub fn is_empty_tree(&self) -> bool {
        matches!(self, Self::EmptyTree)
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::KeyNotFound => write!(f, "Key not found in tree"),
            TreeError::EmptyTree => write!(f, "Operation requires a non-empty tree"),
            TreeError::DataIntegrityError(msg) => write!(f, "Data integrity error: {}", msg),
            TreeError::ArenaError(msg) => write!(f, "Arena error: {}", msg),
            TreeError::CorruptedTree(msg) => write!(f, "Corrupted tree: {}", msg),
        }
    }
}

impl std::error::Error for TreeError {}

/// Result type for internal structural routines.
pub type TreeResult<T> = Result<T, TreeError>;

/// Result type for key lookup operations
pub type KeyResult<T> = Result<T, TreeError>;

/// Result type for tree modification operations
pub type ModifyResult<T> = Result<T, TreeError>;

/// Result extension trait for improved error handling
pub trait TreeResultExt<T> {
    /// Prefix the error message with additional context.
    fn with_context(self, context: &str) -> TreeResult<T>;

    /// Log the error and continue with the default value.
    fn or_default_with_log(self) -> T
    where
        T: Default;
}

impl<T> TreeResultExt<T> for Result<T, TreeError> {
    fn with_context(self, context: &str) -> TreeResult<T> {
        self.map_err(|e| match e {
            TreeError::KeyNotFound => TreeError::KeyNotFound,
            TreeError::EmptyTree => TreeError::EmptyTree,
            TreeError::DataIntegrityError(msg) => TreeError::data_integrity(context, &msg),
            TreeError::ArenaError(msg) => TreeError::ArenaError(format!("{}: {}", context, msg)),
            TreeError::CorruptedTree(msg) => TreeError::corrupted_tree(context, &msg),
        })
    }

    fn or_default_with_log(self) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "tree operation failed, using default result");
                T::default()
            }
        }
    }
}
