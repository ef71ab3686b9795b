//! In-memory shelf store.

use super::{ShelfStore, Synced};
use crate::error::{ErrorKind, Result};
use crate::models::{BookId, Edition, EditionId, Placement, Shelf, ShelfId, ShelfKind, UserBookStatus, UserId};
use crate::sync::{self, Plan, Snapshot, StatusChange, now};
use async_trait::async_trait;
use exn::OptionExt;
use std::collections::{BTreeMap, HashMap};
use time::UtcDateTime;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct State {
    last_shelf_id: u64,
    shelves: BTreeMap<ShelfId, Shelf>,
    editions: HashMap<EditionId, Edition>,
    memberships: BTreeMap<(ShelfId, EditionId), UtcDateTime>,
    statuses: HashMap<(UserId, BookId), UserBookStatus>,
}
impl State {
    fn shelf(&self, id: ShelfId) -> Result<&Shelf> {
        self.shelves.get(&id).ok_or_raise(|| ErrorKind::ShelfNotFound(id))
    }

    fn edition(&self, id: EditionId) -> Result<Edition> {
        self.editions.get(&id).copied().ok_or_raise(|| ErrorKind::EditionNotFound(id))
    }

    fn snapshot(&self, user: UserId, book: BookId) -> Snapshot {
        let placements = self.memberships.keys().filter_map(|(shelf_id, edition_id)| {
            let shelf = self.shelves.get(shelf_id)?;
            let edition = self.editions.get(edition_id)?;
            (shelf.owner == user && shelf.kind.is_special() && edition.book == book)
                .then(|| Placement::new(shelf, *edition_id))
        });
        Snapshot::new(user, book)
            .with_placements(placements)
            .with_status(self.statuses.get(&(user, book)).cloned())
    }

    fn apply(&mut self, snapshot: Snapshot, plan: Plan) -> Synced {
        for placement in &plan.evict {
            self.memberships.remove(&(placement.shelf, placement.edition));
        }
        let key = (snapshot.user, snapshot.book);
        let status = match plan.status {
            StatusChange::Unchanged => snapshot.status,
            StatusChange::Save(status) => {
                self.statuses.insert(key, status.clone());
                Some(status)
            },
            StatusChange::Delete => {
                self.statuses.remove(&key);
                None
            },
        };
        Synced { evicted: plan.evict, status }
    }
}

/// In-memory shelf store.
///
/// All state lives behind a single [`RwLock`]: every operation takes the
/// write lock for its whole duration, which makes each membership change and
/// its synchronization atomic. Useful for tests and for callers that keep
/// their own persistence.
///
/// Editions belong to the catalog, not to the shelves, so they must be
/// registered up front.
///
/// # Examples
///
/// ```
/// use folio_shelf::models::{BookId, Edition, EditionId, ShelfKind, UserId};
/// use folio_shelf::store::{MemoryStore, ShelfStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::with_editions([Edition::new(EditionId(1), BookId(7))]);
/// let owned = store.create_shelf(UserId(1), ShelfKind::Owned, "Owned").await?;
/// let synced = store.add_to_shelf(owned.id, EditionId(1)).await?;
/// assert!(synced.status.is_some_and(|status| status.is_owned));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create a store that knows about the given editions.
    pub fn with_editions(editions: impl IntoIterator<Item = Edition>) -> Self {
        let state = State {
            editions: editions.into_iter().map(|edition| (edition.id, edition)).collect(),
            ..State::default()
        };
        Self { state: RwLock::new(state) }
    }

    /// Register (or replace) an edition.
    pub async fn insert_edition(&self, edition: Edition) {
        self.state.write().await.editions.insert(edition.id, edition);
    }
}

#[async_trait]
impl ShelfStore for MemoryStore {
    async fn create_shelf(&self, owner: UserId, kind: ShelfKind, name: &str) -> Result<Shelf> {
        let mut state = self.state.write().await;
        state.last_shelf_id += 1;
        let shelf = Shelf::new(ShelfId(state.last_shelf_id), owner, kind, name);
        state.shelves.insert(shelf.id, shelf.clone());
        Ok(shelf)
    }

    async fn shelf(&self, id: ShelfId) -> Result<Shelf> {
        self.state.read().await.shelf(id).cloned()
    }

    async fn shelves_for_user(&self, owner: UserId) -> Result<Vec<Shelf>> {
        let state = self.state.read().await;
        Ok(state.shelves.values().filter(|shelf| shelf.owner == owner).cloned().collect())
    }

    async fn shelf_editions(&self, id: ShelfId) -> Result<Vec<EditionId>> {
        let state = self.state.read().await;
        state.shelf(id)?;
        Ok(state.memberships.keys().filter(|(shelf, _)| *shelf == id).map(|(_, edition)| *edition).collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn add_to_shelf(&self, shelf: ShelfId, edition: EditionId) -> Result<Synced> {
        let mut state = self.state.write().await;
        let shelf = state.shelf(shelf)?.clone();
        let edition = state.edition(edition)?;
        if state.memberships.contains_key(&(shelf.id, edition.id)) {
            exn::bail!(ErrorKind::DuplicateMembership { shelf: shelf.id, edition: edition.id });
        }
        let now = now();
        state.memberships.insert((shelf.id, edition.id), now);
        let snapshot = state.snapshot(shelf.owner, edition.book);
        let plan = sync::on_edition_added(&shelf, &edition, &snapshot, now);
        debug!(?plan, "synchronizing shelf addition");
        Ok(state.apply(snapshot, plan))
    }

    #[instrument(level = "debug", skip(self))]
    async fn remove_from_shelf(&self, shelf: ShelfId, edition: EditionId) -> Result<Synced> {
        let mut state = self.state.write().await;
        let shelf = state.shelf(shelf)?.clone();
        let edition = state.edition(edition)?;
        if state.memberships.remove(&(shelf.id, edition.id)).is_none() {
            exn::bail!(ErrorKind::MembershipNotFound { shelf: shelf.id, edition: edition.id });
        }
        let snapshot = state.snapshot(shelf.owner, edition.book);
        let plan = sync::on_edition_removed(&shelf, &edition, &snapshot, now());
        debug!(?plan, "synchronizing shelf removal");
        Ok(state.apply(snapshot, plan))
    }

    async fn user_book(&self, user: UserId, book: BookId) -> Result<Option<UserBookStatus>> {
        Ok(self.state.read().await.statuses.get(&(user, book)).cloned())
    }

    #[instrument(level = "debug", skip(self))]
    async fn reconcile(&self, user: UserId, book: BookId) -> Result<Option<UserBookStatus>> {
        let mut state = self.state.write().await;
        let snapshot = state.snapshot(user, book);
        let plan = sync::reconcile(&snapshot, now());
        Ok(state.apply(snapshot, plan).status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReadStatus;
    use rstest::rstest;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);
    const DUNE: BookId = BookId(10);
    const EMMA: BookId = BookId(20);
    const DUNE_HARDCOVER: EditionId = EditionId(100);
    const DUNE_PAPERBACK: EditionId = EditionId(101);
    const EMMA_PAPERBACK: EditionId = EditionId(200);

    struct Fixture {
        store: MemoryStore,
        shelves: HashMap<ShelfKind, Shelf>,
    }
    impl Fixture {
        async fn new(user: UserId) -> Self {
            let store = MemoryStore::with_editions([
                Edition::new(DUNE_HARDCOVER, DUNE),
                Edition::new(DUNE_PAPERBACK, DUNE),
                Edition::new(EMMA_PAPERBACK, EMMA),
            ]);
            let mut shelves = HashMap::new();
            for shelf in store.create_default_shelves(user).await.unwrap() {
                shelves.insert(shelf.kind, shelf);
            }
            let custom = store.create_shelf(user, ShelfKind::Custom, "Beach reads").await.unwrap();
            shelves.insert(ShelfKind::Custom, custom);
            Self { store, shelves }
        }

        fn id(&self, kind: ShelfKind) -> ShelfId {
            self.shelves[&kind].id
        }

        async fn add(&self, kind: ShelfKind, edition: EditionId) -> Synced {
            self.store.add_to_shelf(self.id(kind), edition).await.unwrap()
        }

        async fn remove(&self, kind: ShelfKind, edition: EditionId) -> Synced {
            self.store.remove_from_shelf(self.id(kind), edition).await.unwrap()
        }

        async fn editions(&self, kind: ShelfKind) -> Vec<EditionId> {
            self.store.shelf_editions(self.id(kind)).await.unwrap()
        }
    }

    #[tokio::test]
    async fn test_default_shelves() {
        let fixture = Fixture::new(ALICE).await;
        let shelves = fixture.store.shelves_for_user(ALICE).await.unwrap();
        assert_eq!(shelves.len(), ShelfKind::DEFAULTS.len() + 1);
        assert_eq!(fixture.shelves[&ShelfKind::WantToRead].name, "Want to Read");
        assert!(fixture.store.shelves_for_user(BOB).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_moving_edition_between_status_shelves() {
        let fixture = Fixture::new(ALICE).await;
        fixture.add(ShelfKind::WantToRead, DUNE_HARDCOVER).await;
        let synced = fixture.add(ShelfKind::Reading, DUNE_PAPERBACK).await;
        assert_eq!(synced.evicted.len(), 1);
        assert!(fixture.editions(ShelfKind::WantToRead).await.is_empty());
        assert_eq!(fixture.editions(ShelfKind::Reading).await, vec![DUNE_PAPERBACK]);
        let status = fixture.store.user_book(ALICE, DUNE).await.unwrap().unwrap();
        assert_eq!(status.read_status, Some(ReadStatus::Reading));
    }

    #[tokio::test]
    async fn test_owned_and_read_coexist() {
        let fixture = Fixture::new(ALICE).await;
        fixture.add(ShelfKind::Owned, DUNE_HARDCOVER).await;
        let synced = fixture.add(ShelfKind::Read, DUNE_HARDCOVER).await;
        assert!(synced.evicted.is_empty());
        let status = synced.status.unwrap();
        assert!(status.is_owned);
        assert_eq!(status.read_status, Some(ReadStatus::Read));
        assert_eq!(fixture.editions(ShelfKind::Owned).await, vec![DUNE_HARDCOVER]);
    }

    #[tokio::test]
    async fn test_removing_only_status_deletes_aggregate() {
        let fixture = Fixture::new(ALICE).await;
        fixture.add(ShelfKind::Reading, DUNE_HARDCOVER).await;
        let synced = fixture.remove(ShelfKind::Reading, DUNE_HARDCOVER).await;
        assert_eq!(synced.status, None);
        assert_eq!(fixture.store.user_book(ALICE, DUNE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_removing_owned_keeps_status() {
        let fixture = Fixture::new(ALICE).await;
        fixture.add(ShelfKind::Owned, DUNE_HARDCOVER).await;
        fixture.add(ShelfKind::WantToRead, DUNE_PAPERBACK).await;
        fixture.remove(ShelfKind::Owned, DUNE_HARDCOVER).await;
        let status = fixture.store.user_book(ALICE, DUNE).await.unwrap().unwrap();
        assert!(!status.is_owned);
        assert_eq!(status.read_status, Some(ReadStatus::WantToRead));
    }

    #[tokio::test]
    async fn test_second_owned_shelf_keeps_book_owned() {
        let fixture = Fixture::new(ALICE).await;
        let office = fixture.store.create_shelf(ALICE, ShelfKind::Owned, "Office").await.unwrap();
        fixture.add(ShelfKind::Owned, DUNE_HARDCOVER).await;
        fixture.store.add_to_shelf(office.id, DUNE_PAPERBACK).await.unwrap();

        let synced = fixture.remove(ShelfKind::Owned, DUNE_HARDCOVER).await;
        assert!(synced.status.unwrap().is_owned);
        assert!(fixture.store.user_book(ALICE, DUNE).await.unwrap().unwrap().is_owned);

        let synced = fixture.store.remove_from_shelf(office.id, DUNE_PAPERBACK).await.unwrap();
        assert_eq!(synced.status, None);
        assert_eq!(fixture.store.user_book(ALICE, DUNE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_timestamps_are_whole_seconds() {
        let fixture = Fixture::new(ALICE).await;
        let synced = fixture.add(ShelfKind::Reading, DUNE_HARDCOVER).await;
        let status = synced.status.unwrap();
        assert_eq!(status.updated_at.nanosecond(), 0);
        let state = fixture.store.state.read().await;
        assert!(state.memberships.values().all(|added_at| added_at.nanosecond() == 0));
    }

    #[rstest]
    #[case(ShelfKind::Custom)]
    #[case(ShelfKind::Available)]
    #[case(ShelfKind::LentOut)]
    #[tokio::test]
    async fn test_inert_shelves_never_create_status(#[case] kind: ShelfKind) {
        let fixture = Fixture::new(ALICE).await;
        let synced = fixture.add(kind, EMMA_PAPERBACK).await;
        assert_eq!(synced, Synced { evicted: vec![], status: None });
        assert_eq!(fixture.store.user_book(ALICE, EMMA).await.unwrap(), None);
        fixture.remove(kind, EMMA_PAPERBACK).await;
        assert_eq!(fixture.store.user_book(ALICE, EMMA).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_membership_is_rejected() {
        let fixture = Fixture::new(ALICE).await;
        fixture.add(ShelfKind::Read, DUNE_HARDCOVER).await;
        let err = fixture.store.add_to_shelf(fixture.id(ShelfKind::Read), DUNE_HARDCOVER).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::DuplicateMembership { .. }));
        assert_eq!(fixture.editions(ShelfKind::Read).await, vec![DUNE_HARDCOVER]);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let fixture = Fixture::new(ALICE).await;
        let err = fixture.store.add_to_shelf(ShelfId(999), DUNE_HARDCOVER).await.unwrap_err();
        assert_eq!(*err, ErrorKind::ShelfNotFound(ShelfId(999)));
        let err = fixture.store.add_to_shelf(fixture.id(ShelfKind::Read), EditionId(999)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::EditionNotFound(EditionId(999)));
        let err = fixture.store.remove_from_shelf(fixture.id(ShelfKind::Read), DUNE_HARDCOVER).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::MembershipNotFound { .. }));
    }

    #[tokio::test]
    async fn test_users_do_not_affect_each_other() {
        let fixture = Fixture::new(ALICE).await;
        let bobs_reading = fixture.store.create_shelf(BOB, ShelfKind::Reading, "Reading").await.unwrap();
        fixture.add(ShelfKind::WantToRead, DUNE_HARDCOVER).await;
        let synced = fixture.store.add_to_shelf(bobs_reading.id, DUNE_HARDCOVER).await.unwrap();
        assert!(synced.evicted.is_empty());
        assert_eq!(fixture.editions(ShelfKind::WantToRead).await, vec![DUNE_HARDCOVER]);
        let alice = fixture.store.user_book(ALICE, DUNE).await.unwrap().unwrap();
        assert_eq!(alice.read_status, Some(ReadStatus::WantToRead));
        let bob = fixture.store.user_book(BOB, DUNE).await.unwrap().unwrap();
        assert_eq!(bob.read_status, Some(ReadStatus::Reading));
    }

    #[tokio::test]
    async fn test_reconcile_repairs_missing_status() {
        let fixture = Fixture::new(ALICE).await;
        fixture.add(ShelfKind::Read, EMMA_PAPERBACK).await;
        fixture.add(ShelfKind::Owned, EMMA_PAPERBACK).await;
        // Simulate an aggregate lost behind the store's back.
        fixture.store.state.write().await.statuses.clear();
        let status = fixture.store.reconcile(ALICE, EMMA).await.unwrap().unwrap();
        assert_eq!(status.read_status, Some(ReadStatus::Read));
        assert!(status.is_owned);
        assert_eq!(fixture.store.user_book(ALICE, EMMA).await.unwrap(), Some(status));
    }
}
