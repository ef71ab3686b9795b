//! Reading-status synchronization.
//!
//! A user's [`UserBookStatus`] for a book is derived from which of their
//! special shelves hold *any* edition of that book:
//!
//! - the status shelves (Read, Reading, Want to Read) behave like radio
//!   buttons: a book lives on at most one of them, and moving it to another
//!   status shelf evicts it from the previous one (across editions);
//! - the Owned shelf toggles ownership independently of the status;
//! - every other shelf kind is ignored.
//!
//! Synchronization is split in two. The functions in this module are pure:
//! given a [`Snapshot`] of the user's special-shelf placements for the book
//! (taken *after* the membership row was inserted or deleted) and the current
//! aggregate, they compute a [`Plan`]. The [store](crate::store) then applies
//! the plan in the same transaction as the membership change, so the two can
//! never drift apart.

use crate::models::{BookId, Edition, Placement, ReadStatus, Shelf, ShelfKind, UserBookStatus, UserId};
use time::UtcDateTime;
use tracing::debug;

/// The current time in whole seconds, the precision stores keep timestamps
/// at. A status handed back by a store then compares equal to a later read.
pub fn now() -> UtcDateTime {
    let now = UtcDateTime::now();
    now.replace_nanosecond(0).unwrap_or(now)
}

/// Everything the synchronizer needs to know about one (user, book) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub user: UserId,
    pub book: BookId,
    /// Placements of any edition of the book on the user's *special* shelves,
    /// reflecting the membership change being synchronized.
    pub placements: Vec<Placement>,
    /// The current aggregate, if one exists.
    pub status: Option<UserBookStatus>,
}
impl Snapshot {
    pub fn new(user: UserId, book: BookId) -> Self {
        Self { user, book, placements: vec![], status: None }
    }

    pub fn with_placements(mut self, placements: impl IntoIterator<Item = Placement>) -> Self {
        self.placements.extend(placements);
        self
    }

    pub fn with_status(mut self, status: Option<UserBookStatus>) -> Self {
        self.status = status;
        self
    }

    fn status_or_new(&self, now: UtcDateTime) -> UserBookStatus {
        self.status.clone().unwrap_or_else(|| UserBookStatus::new(self.user, self.book, now))
    }
}

/// What should happen to the [`UserBookStatus`] aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// Leave the aggregate (or its absence) as it is.
    Unchanged,
    /// Create or overwrite the aggregate.
    Save(UserBookStatus),
    /// The aggregate carries no information anymore; delete it.
    Delete,
}

/// The outcome of synchronizing one membership change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Memberships to remove to keep status shelves mutually exclusive.
    pub evict: Vec<Placement>,
    pub status: StatusChange,
}
impl Plan {
    /// A plan that changes nothing.
    pub fn noop() -> Self {
        Self { evict: vec![], status: StatusChange::Unchanged }
    }

    pub fn is_noop(&self) -> bool {
        self.evict.is_empty() && self.status == StatusChange::Unchanged
    }

    /// The aggregate as it will exist once the plan is applied.
    pub fn resulting_status(&self, current: Option<UserBookStatus>) -> Option<UserBookStatus> {
        match &self.status {
            StatusChange::Unchanged => current,
            StatusChange::Save(status) => Some(status.clone()),
            StatusChange::Delete => None,
        }
    }

    fn save_or_delete(evict: Vec<Placement>, status: UserBookStatus) -> Self {
        let status = if status.is_empty() { StatusChange::Delete } else { StatusChange::Save(status) };
        Self { evict, status }
    }
}

/// Synchronize after `edition` was put on `shelf`.
///
/// - Status shelves evict the book (any edition) from the user's *other*
///   status shelves and set the read status to the shelf's status.
/// - Owned marks the book as owned without touching the read status.
/// - Any other kind is a no-op.
///
/// Adding an edition to a shelf it's already on is rejected before this is
/// ever called.
pub fn on_edition_added(shelf: &Shelf, edition: &Edition, snapshot: &Snapshot, now: UtcDateTime) -> Plan {
    debug_assert_eq!(shelf.owner, snapshot.user, "snapshot taken for another user");
    debug_assert_eq!(edition.book, snapshot.book, "snapshot taken for another book");
    if !shelf.kind.is_special() {
        return Plan::noop();
    }
    let mut status = snapshot.status_or_new(now);
    status.updated_at = now;
    let evict = match shelf.kind.read_status() {
        Some(read_status) => {
            status.read_status = Some(read_status);
            snapshot
                .placements
                .iter()
                .filter(|placement| placement.kind.is_status() && placement.shelf != shelf.id)
                .copied()
                .collect::<Vec<_>>()
        },
        None => {
            status.is_owned = true;
            vec![]
        },
    };
    if !evict.is_empty() {
        debug!(
            user = %snapshot.user,
            book = %snapshot.book,
            evicted = evict.len(),
            "moving book to {}",
            shelf.kind
        );
    }
    Plan::save_or_delete(evict, status)
}

/// Synchronize after `edition` was taken off `shelf`.
///
/// Whatever special placements remain for the book decide the new state.
/// That includes other editions still on the *same* shelf, not only other
/// shelves: removing one of two editions from Reading leaves the book
/// Reading. This is stricter than only looking at other shelves, which would
/// clear the status while an edition still sits on a status shelf.
///
/// - Owned: the book stays owned while any Owned shelf still holds an edition.
/// - Status shelves: the read status follows the remaining status placement
///   (preferring the same shelf, then the lowest shelf id), or is cleared.
///
/// An aggregate left without status and ownership is deleted. A missing
/// aggregate is not an error; there is simply nothing to update.
pub fn on_edition_removed(shelf: &Shelf, edition: &Edition, snapshot: &Snapshot, now: UtcDateTime) -> Plan {
    debug_assert_eq!(shelf.owner, snapshot.user, "snapshot taken for another user");
    debug_assert_eq!(edition.book, snapshot.book, "snapshot taken for another book");
    if !shelf.kind.is_special() {
        return Plan::noop();
    }
    let Some(mut status) = snapshot.status.clone() else {
        debug!(user = %snapshot.user, book = %snapshot.book, "no status to update");
        return Plan::noop();
    };
    status.updated_at = now;
    if shelf.kind == ShelfKind::Owned {
        status.is_owned = snapshot.placements.iter().any(|placement| placement.kind == ShelfKind::Owned);
    } else {
        status.read_status = remaining_status(snapshot, Some(shelf));
    }
    Plan::save_or_delete(vec![], status)
}

/// Recompute the aggregate from the placements alone, discarding whatever
/// the current aggregate says.
///
/// Used to repair aggregates after memberships were edited behind the
/// synchronizer's back. Never evicts anything.
pub fn reconcile(snapshot: &Snapshot, now: UtcDateTime) -> Plan {
    let mut status = UserBookStatus::new(snapshot.user, snapshot.book, now);
    status.read_status = remaining_status(snapshot, None);
    status.is_owned = snapshot.placements.iter().any(|placement| placement.kind == ShelfKind::Owned);
    match &snapshot.status {
        Some(current) if current.same_state(&status) => Plan::noop(),
        None if status.is_empty() => Plan::noop(),
        _ => Plan::save_or_delete(vec![], status),
    }
}

fn remaining_status(snapshot: &Snapshot, preferred: Option<&Shelf>) -> Option<ReadStatus> {
    snapshot
        .placements
        .iter()
        .filter(|placement| placement.kind.is_status())
        .min_by_key(|placement| (Some(placement.shelf) != preferred.map(|shelf| shelf.id), placement.shelf))
        .and_then(|placement| placement.kind.read_status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EditionId, ShelfId};
    use rstest::rstest;

    const USER: UserId = UserId(1);
    const BOOK: BookId = BookId(10);

    fn shelf(id: u64, kind: ShelfKind) -> Shelf {
        Shelf::new(ShelfId(id), USER, kind, kind.as_str())
    }

    fn edition(id: u64) -> Edition {
        Edition::new(EditionId(id), BOOK)
    }

    fn status(read_status: Option<ReadStatus>, is_owned: bool) -> UserBookStatus {
        UserBookStatus {
            read_status,
            is_owned,
            ..UserBookStatus::new(USER, BOOK, UtcDateTime::now())
        }
    }

    fn saved(plan: &Plan) -> &UserBookStatus {
        match &plan.status {
            StatusChange::Save(status) => status,
            other => panic!("expected a saved status, got {other:?}"),
        }
    }

    #[test]
    fn test_adding_to_status_shelf_creates_status() {
        let reading = shelf(2, ShelfKind::Reading);
        let snapshot = Snapshot::new(USER, BOOK).with_placements([Placement::new(&reading, EditionId(100))]);
        let plan = on_edition_added(&reading, &edition(100), &snapshot, UtcDateTime::now());
        assert!(plan.evict.is_empty());
        let status = saved(&plan);
        assert_eq!(status.read_status, Some(ReadStatus::Reading));
        assert!(!status.is_owned);
    }

    #[test]
    fn test_moving_between_status_shelves_evicts_other_editions() {
        let want = shelf(3, ShelfKind::WantToRead);
        let reading = shelf(2, ShelfKind::Reading);
        let owned = shelf(4, ShelfKind::Owned);
        let snapshot = Snapshot::new(USER, BOOK)
            .with_placements([
                Placement::new(&want, EditionId(100)),
                Placement::new(&owned, EditionId(100)),
                Placement::new(&reading, EditionId(200)),
            ])
            .with_status(Some(status(Some(ReadStatus::WantToRead), true)));
        let plan = on_edition_added(&reading, &edition(200), &snapshot, UtcDateTime::now());
        assert_eq!(plan.evict, vec![Placement::new(&want, EditionId(100))]);
        let status = saved(&plan);
        assert_eq!(status.read_status, Some(ReadStatus::Reading));
        assert!(status.is_owned, "ownership must be left alone");
    }

    #[test]
    fn test_other_editions_on_the_same_shelf_are_kept() {
        let read = shelf(1, ShelfKind::Read);
        let snapshot = Snapshot::new(USER, BOOK).with_placements([
            Placement::new(&read, EditionId(100)),
            Placement::new(&read, EditionId(200)),
        ]);
        let plan = on_edition_added(&read, &edition(200), &snapshot, UtcDateTime::now());
        assert!(plan.evict.is_empty());
    }

    #[test]
    fn test_adding_to_owned_keeps_read_status() {
        let owned = shelf(4, ShelfKind::Owned);
        let snapshot = Snapshot::new(USER, BOOK)
            .with_placements([Placement::new(&owned, EditionId(100))])
            .with_status(Some(status(Some(ReadStatus::Read), false)));
        let plan = on_edition_added(&owned, &edition(100), &snapshot, UtcDateTime::now());
        assert!(plan.evict.is_empty());
        let status = saved(&plan);
        assert_eq!(status.read_status, Some(ReadStatus::Read));
        assert!(status.is_owned);
    }

    #[rstest]
    #[case(ShelfKind::Custom)]
    #[case(ShelfKind::Available)]
    #[case(ShelfKind::LentOut)]
    fn test_inert_shelves_are_ignored(#[case] kind: ShelfKind) {
        let inert = shelf(9, kind);
        let snapshot = Snapshot::new(USER, BOOK);
        assert!(on_edition_added(&inert, &edition(100), &snapshot, UtcDateTime::now()).is_noop());
        let snapshot = snapshot.with_status(Some(status(Some(ReadStatus::Read), true)));
        assert!(on_edition_removed(&inert, &edition(100), &snapshot, UtcDateTime::now()).is_noop());
    }

    #[test]
    fn test_removing_last_status_deletes_status() {
        let read = shelf(1, ShelfKind::Read);
        let snapshot = Snapshot::new(USER, BOOK).with_status(Some(status(Some(ReadStatus::Read), false)));
        let plan = on_edition_removed(&read, &edition(100), &snapshot, UtcDateTime::now());
        assert_eq!(plan.status, StatusChange::Delete);
        assert_eq!(plan.resulting_status(snapshot.status.clone()), None);
    }

    #[test]
    fn test_removing_last_status_keeps_ownership() {
        let read = shelf(1, ShelfKind::Read);
        let owned = shelf(4, ShelfKind::Owned);
        let snapshot = Snapshot::new(USER, BOOK)
            .with_placements([Placement::new(&owned, EditionId(100))])
            .with_status(Some(status(Some(ReadStatus::Read), true)));
        let plan = on_edition_removed(&read, &edition(100), &snapshot, UtcDateTime::now());
        let status = saved(&plan);
        assert_eq!(status.read_status, None);
        assert!(status.is_owned);
    }

    #[test]
    fn test_removing_from_owned_keeps_read_status() {
        let owned = shelf(4, ShelfKind::Owned);
        let reading = shelf(2, ShelfKind::Reading);
        let snapshot = Snapshot::new(USER, BOOK)
            .with_placements([Placement::new(&reading, EditionId(100))])
            .with_status(Some(status(Some(ReadStatus::Reading), true)));
        let plan = on_edition_removed(&owned, &edition(100), &snapshot, UtcDateTime::now());
        let status = saved(&plan);
        assert_eq!(status.read_status, Some(ReadStatus::Reading));
        assert!(!status.is_owned);
    }

    #[test]
    fn test_removing_from_owned_with_another_owned_edition() {
        let owned = shelf(4, ShelfKind::Owned);
        let snapshot = Snapshot::new(USER, BOOK)
            .with_placements([Placement::new(&owned, EditionId(200))])
            .with_status(Some(status(None, true)));
        let plan = on_edition_removed(&owned, &edition(100), &snapshot, UtcDateTime::now());
        assert!(saved(&plan).is_owned);
    }

    #[test]
    fn test_removing_falls_back_to_remaining_status_shelf() {
        // Only reachable if the radio-button invariant was broken elsewhere.
        let read = shelf(1, ShelfKind::Read);
        let want = shelf(3, ShelfKind::WantToRead);
        let reading = shelf(2, ShelfKind::Reading);
        let snapshot = Snapshot::new(USER, BOOK)
            .with_placements([Placement::new(&want, EditionId(100)), Placement::new(&reading, EditionId(300))])
            .with_status(Some(status(Some(ReadStatus::Read), false)));
        let plan = on_edition_removed(&read, &edition(200), &snapshot, UtcDateTime::now());
        assert_eq!(saved(&plan).read_status, Some(ReadStatus::Reading));
    }

    #[test]
    fn test_removing_one_of_two_editions_keeps_status() {
        let reading = shelf(2, ShelfKind::Reading);
        let snapshot = Snapshot::new(USER, BOOK)
            .with_placements([Placement::new(&reading, EditionId(200))])
            .with_status(Some(status(Some(ReadStatus::Reading), false)));
        let plan = on_edition_removed(&reading, &edition(100), &snapshot, UtcDateTime::now());
        assert_eq!(saved(&plan).read_status, Some(ReadStatus::Reading));
    }

    #[test]
    fn test_removing_without_status_is_noop() {
        let read = shelf(1, ShelfKind::Read);
        let snapshot = Snapshot::new(USER, BOOK);
        assert!(on_edition_removed(&read, &edition(100), &snapshot, UtcDateTime::now()).is_noop());
    }

    #[test]
    fn test_reconcile() {
        let want = shelf(3, ShelfKind::WantToRead);
        let owned = shelf(4, ShelfKind::Owned);
        let placements = [Placement::new(&want, EditionId(100)), Placement::new(&owned, EditionId(200))];

        // Missing aggregate is recreated.
        let snapshot = Snapshot::new(USER, BOOK).with_placements(placements);
        let plan = reconcile(&snapshot, UtcDateTime::now());
        let status = saved(&plan);
        assert_eq!(status.read_status, Some(ReadStatus::WantToRead));
        assert!(status.is_owned);

        // A consistent aggregate is left alone.
        let snapshot = snapshot.with_status(Some(status.clone()));
        assert!(reconcile(&snapshot, UtcDateTime::now()).is_noop());

        // A stale aggregate without placements is removed.
        let snapshot = Snapshot::new(USER, BOOK).with_status(Some(status.clone()));
        assert_eq!(reconcile(&snapshot, UtcDateTime::now()).status, StatusChange::Delete);

        // Nothing to do when there's nothing at all.
        assert!(reconcile(&Snapshot::new(USER, BOOK), UtcDateTime::now()).is_noop());
    }
}
