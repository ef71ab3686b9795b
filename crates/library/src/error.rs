//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The configuration can't be used to open a library.
    #[display("invalid library configuration")]
    Config,
    /// The database could not be opened or created.
    #[display("could not open library database")]
    Database,
    /// A catalog lookup or update failed.
    #[display("catalog error")]
    Catalog,
    /// A book could not be imported (see the error tree for why).
    #[display("book import failed")]
    Import,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
