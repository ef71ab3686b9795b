//! Genre Error Types
//!
//! Normalization itself never fails: a subject that matches nothing is simply
//! absent from the result. Errors only exist for building a [`Normalizer`]
//! from (user-supplied) settings.
//!
//! [`Normalizer`]: crate::Normalizer

use derive_more::{Display, Error};

/// A genre error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for genre operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The maximum number of genres per book must be at least one.
    #[display("genre limit must be greater than zero")]
    InvalidLimit,
    /// The configured genre is not part of the canonical vocabulary.
    #[display("unknown genre: {_0}")]
    UnknownGenre(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Settings are either valid or they're not.
        false
    }
}
