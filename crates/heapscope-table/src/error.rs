use crate::object::ObjectKey;

/// Errors produced by applying a command to the object table.
///
/// Each one is scoped to the command that caused it; the table is left
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// A write, lift, or drop targeted a key with no live object.
    #[error("no live object {key}")]
    NotFound { key: ObjectKey },

    /// An alloc targeted a key that is already live.
    #[error("duplicate allocation for live object {key}")]
    DuplicateAllocation { key: ObjectKey },

    /// A drop found a live object whose count is already zero. Live objects
    /// hold at least one reference, so this indicates a corrupted stream.
    #[error("reference count underflow on object {key}")]
    RefcountUnderflow { key: ObjectKey },
}

pub type TableResult<T> = Result<T, TableError>;
