//! Shelf store trait and implementations.
//!
//! A [`ShelfStore`] owns shelves, memberships and the derived
//! [`UserBookStatus`] aggregates. Every membership change goes through
//! [`add_to_shelf`](ShelfStore::add_to_shelf) or
//! [`remove_from_shelf`](ShelfStore::remove_from_shelf), which run the
//! [synchronizer](crate::sync) and apply its plan atomically with the change.

mod memory;

pub use self::memory::MemoryStore;
use crate::error::Result;
use crate::models::{BookId, EditionId, Placement, Shelf, ShelfId, ShelfKind, UserBookStatus, UserId};
use async_trait::async_trait;

/// The result of a synchronized membership change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synced {
    /// Memberships that were removed to keep status shelves exclusive.
    pub evicted: Vec<Placement>,
    /// The aggregate after the change, if one exists.
    pub status: Option<UserBookStatus>,
}

/// Unified interface for shelf persistence.
///
/// Implementations must make each membership change and the application of
/// its synchronization plan a single atomic unit: a crash (or error) between
/// the two must never be observable.
///
/// No permission checks happen here; callers decide who may touch which shelf.
///
/// # Examples
///
/// ```
/// use folio_shelf::error::Result;
/// use folio_shelf::models::{EditionId, ReadStatus, ShelfKind, UserId};
/// use folio_shelf::store::ShelfStore;
///
/// async fn start_reading(store: &dyn ShelfStore, user: UserId, edition: EditionId) -> Result<()> {
///     let shelves = store.create_default_shelves(user).await?;
///     let reading = shelves.iter().find(|shelf| shelf.kind == ShelfKind::Reading).unwrap();
///     let synced = store.add_to_shelf(reading.id, edition).await?;
///     assert_eq!(synced.status.unwrap().read_status, Some(ReadStatus::Reading));
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ShelfStore: Send + Sync {
    /// Create a new shelf for `owner`.
    async fn create_shelf(&self, owner: UserId, kind: ShelfKind, name: &str) -> Result<Shelf>;

    /// Create the built-in shelves ([`ShelfKind::DEFAULTS`]) for a new user,
    /// named after their kind.
    async fn create_default_shelves(&self, owner: UserId) -> Result<Vec<Shelf>> {
        let mut shelves = Vec::with_capacity(ShelfKind::DEFAULTS.len());
        for kind in ShelfKind::DEFAULTS {
            shelves.push(self.create_shelf(owner, kind, kind.as_str()).await?);
        }
        Ok(shelves)
    }

    /// Look up a shelf.
    ///
    /// Returns [`ShelfNotFound`](crate::error::ErrorKind::ShelfNotFound) if
    /// it doesn't exist.
    async fn shelf(&self, id: ShelfId) -> Result<Shelf>;

    /// List a user's shelves, ordered by id.
    async fn shelves_for_user(&self, owner: UserId) -> Result<Vec<Shelf>>;

    /// Editions currently on a shelf, ordered by id.
    async fn shelf_editions(&self, id: ShelfId) -> Result<Vec<EditionId>>;

    /// Put an edition on a shelf and synchronize the owner's status for the
    /// edition's book.
    ///
    /// Returns [`DuplicateMembership`](crate::error::ErrorKind::DuplicateMembership)
    /// without changing anything if the edition is already on the shelf.
    async fn add_to_shelf(&self, shelf: ShelfId, edition: EditionId) -> Result<Synced>;

    /// Take an edition off a shelf and synchronize the owner's status for the
    /// edition's book.
    ///
    /// Returns [`MembershipNotFound`](crate::error::ErrorKind::MembershipNotFound)
    /// if the edition isn't on the shelf.
    async fn remove_from_shelf(&self, shelf: ShelfId, edition: EditionId) -> Result<Synced>;

    /// The derived status of a book for a user, if any.
    async fn user_book(&self, user: UserId, book: BookId) -> Result<Option<UserBookStatus>>;

    /// Rebuild the derived status of a book for a user from their current
    /// shelf memberships. See [`sync::reconcile`](crate::sync::reconcile).
    async fn reconcile(&self, user: UserId, book: BookId) -> Result<Option<UserBookStatus>>;
}
