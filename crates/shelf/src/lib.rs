//! Shelves, memberships and the reading status derived from them.
//!
//! Users organize editions of books on shelves. Four shelf kinds are special:
//! Read, Reading and Want to Read record a reading status (a book can only be
//! in one of those states at a time), while Owned records ownership. The
//! [`UserBookStatus`](models::UserBookStatus) aggregate mirrors those
//! memberships and is kept in sync by the [`sync`] planner whenever a
//! [`store`] changes a membership.

pub mod error;
pub mod models;
pub mod store;
pub mod sync;

pub use crate::store::{MemoryStore, ShelfStore, Synced};
pub use crate::sync::{Plan, Snapshot, StatusChange};
