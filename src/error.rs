//! Errors shared by the linked and tree sequences.

use thiserror::Error;

/// Everything a sequence, iterator or cursor operation can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The index does not name an element (or an insertion point, for
    /// operations that accept `index == len`).
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// Stepped past either end, or asked an empty list for an end element.
    #[error("no such element")]
    NoSuchElement,
    /// `set`/`remove` without a preceding `next`/`previous`, or called twice
    /// without an intervening step.
    #[error("no element was returned by the last step")]
    IllegalState,
    /// The list was structurally modified behind a fail-fast iterator or
    /// sub-list.
    #[error("list was modified outside of this iterator")]
    ConcurrentModification,
    /// The cursor has been closed.
    #[error("cursor closed")]
    ClosedCursor,
    /// `from > to` when taking a sub-list.
    #[error("invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },
    /// The tree engine broke one of its own invariants.
    #[error("tree inconsistent: {reason}")]
    InvariantViolation { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Checks an index that must name an existing element.
pub(crate) fn check_element_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::IndexOutOfRange { index, len });
    }
    return Ok(());
}

/// Checks an index that may also be the end-of-list insertion point.
pub(crate) fn check_position_index(index: usize, len: usize) -> Result<()> {
    if index > len {
        return Err(Error::IndexOutOfRange { index, len });
    }
    return Ok(());
}
