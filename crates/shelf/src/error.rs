//! Shelf Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::models::{EditionId, ShelfId};
use derive_more::{Display, Error};

/// A shelf error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for shelf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("shelf not found: {_0}")]
    ShelfNotFound(#[error(not(source))] ShelfId),
    #[display("edition not found: {_0}")]
    EditionNotFound(#[error(not(source))] EditionId),
    /// The edition is already on the shelf; adding it again is a caller error.
    #[display("edition {edition} is already on shelf {shelf}")]
    DuplicateMembership { shelf: ShelfId, edition: EditionId },
    #[display("edition {edition} is not on shelf {shelf}")]
    MembershipNotFound { shelf: ShelfId, edition: EditionId },
    /// A shelf kind or status could not be parsed.
    #[display("failed to parse {field}, found value: {value}")]
    ParseError { field: &'static str, value: String },
    /// The backing store failed (see the error tree for details).
    #[display("shelf store error")]
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
