//! SQLite persistence for the catalog and shelves.
//!
//! # Architecture
//! The database stores two groups of entities:
//! - **Catalog**: books (with their normalized genres, stored as JSON) and the
//!   editions users can actually put on shelves. See [`Catalog`].
//! - **Shelves**: shelves, shelf memberships and the `user_books` aggregates
//!   derived from them. [`Repository`] implements
//!   [`ShelfStore`](folio_shelf::ShelfStore) and keeps both in sync inside a
//!   single transaction per change.

mod catalog;
mod db;
pub mod error;
mod models;
mod repo;

pub use crate::catalog::Catalog;
pub use crate::db::Database;
pub use crate::models::{Author, Book, EditionRecord, NewBook, NewEdition};
pub use crate::repo::Repository;
