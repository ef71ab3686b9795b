//! SQLite-backed shelf store.
//!
//! Memberships and the derived `user_books` rows are tightly coupled: every
//! membership change is written in the same transaction as the evictions and
//! status update the synchronizer planned for it.

use crate::Database;
use crate::db::{WriteTx, begin_write};
use crate::error::{ErrorKind, Result};
use crate::models::{EditionRow, PlacementRow, ShelfRow, UserBookRow, from_sql_id, to_sql_id};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use folio_shelf::ShelfStore;
use folio_shelf::error::{ErrorKind as StoreErrorKind, Result as StoreResult};
use folio_shelf::models::{BookId, Edition, EditionId, Placement, Shelf, ShelfId, ShelfKind, UserBookStatus, UserId};
use folio_shelf::store::Synced;
use folio_shelf::sync::{self, Plan, Snapshot, StatusChange, now};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, instrument};

/// Repository for shelves, memberships and reading statuses.
///
/// Editions must exist in the [`Catalog`](crate::Catalog) before they can be
/// shelved.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<WriteTx> {
        begin_write(&self.pool).await
    }

    async fn commit(tx: WriteTx) -> Result<()> {
        tx.commit().await.or_raise(|| ErrorKind::Database)
    }
}

// =========================================================================
// Queries
// =========================================================================

async fn fetch_shelf(conn: &mut SqliteConnection, id: ShelfId) -> Result<Option<Shelf>> {
    let row: Option<ShelfRow> = sqlx::query_as(include_str!("../queries/get_shelf.sql"))
        .bind(to_sql_id(id.get(), "shelf id")?)
        .fetch_optional(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(Shelf::try_from).transpose()
}

async fn fetch_edition(conn: &mut SqliteConnection, id: EditionId) -> Result<Option<Edition>> {
    let row: Option<EditionRow> = sqlx::query_as(include_str!("../queries/get_edition.sql"))
        .bind(to_sql_id(id.get(), "edition id")?)
        .fetch_optional(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(row.map(crate::EditionRecord::try_from).transpose()?.map(|record| record.edition))
}

async fn fetch_status(conn: &mut SqliteConnection, user: UserId, book: BookId) -> Result<Option<UserBookStatus>> {
    let row: Option<UserBookRow> = sqlx::query_as(include_str!("../queries/get_user_book.sql"))
        .bind(to_sql_id(user.get(), "user id")?)
        .bind(to_sql_id(book.get(), "book id")?)
        .fetch_optional(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(UserBookStatus::try_from).transpose()
}

/// Load the shelf and edition of a membership, or raise the matching
/// not-found error.
async fn fetch_membership(
    conn: &mut SqliteConnection,
    shelf: ShelfId,
    edition: EditionId,
) -> StoreResult<(Shelf, Edition)> {
    let found_shelf = fetch_shelf(conn, shelf).await.or_raise(|| StoreErrorKind::Store)?;
    let found_shelf = found_shelf.ok_or_raise(|| StoreErrorKind::ShelfNotFound(shelf))?;
    let found_edition = fetch_edition(conn, edition).await.or_raise(|| StoreErrorKind::Store)?;
    let found_edition = found_edition.ok_or_raise(|| StoreErrorKind::EditionNotFound(edition))?;
    Ok((found_shelf, found_edition))
}

async fn snapshot(conn: &mut SqliteConnection, user: UserId, book: BookId) -> Result<Snapshot> {
    let rows: Vec<PlacementRow> = sqlx::query_as(include_str!("../queries/special_placements.sql"))
        .bind(to_sql_id(user.get(), "user id")?)
        .bind(to_sql_id(book.get(), "book id")?)
        .fetch_all(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    let placements = rows.into_iter().map(Placement::try_from).collect::<Result<Vec<_>>>()?;
    let status = fetch_status(conn, user, book).await?;
    Ok(Snapshot::new(user, book).with_placements(placements).with_status(status))
}

async fn delete_membership(conn: &mut SqliteConnection, shelf: ShelfId, edition: EditionId) -> Result<u64> {
    let result = sqlx::query(include_str!("../queries/delete_membership.sql"))
        .bind(to_sql_id(shelf.get(), "shelf id")?)
        .bind(to_sql_id(edition.get(), "edition id")?)
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(result.rows_affected())
}

async fn apply(conn: &mut SqliteConnection, snapshot: Snapshot, plan: Plan) -> Result<Synced> {
    for placement in &plan.evict {
        delete_membership(conn, placement.shelf, placement.edition).await?;
    }
    let status = match plan.status {
        StatusChange::Unchanged => snapshot.status,
        StatusChange::Save(status) => {
            let row = UserBookRow::try_from(&status)?;
            sqlx::query(include_str!("../queries/upsert_user_book.sql"))
                .bind(row.user_id)
                .bind(row.book_id)
                .bind(row.read_status)
                .bind(row.is_owned)
                .bind(row.updated_at)
                .execute(&mut *conn)
                .await
                .or_raise(|| ErrorKind::Database)?;
            Some(status)
        },
        StatusChange::Delete => {
            sqlx::query(include_str!("../queries/delete_user_book.sql"))
                .bind(to_sql_id(snapshot.user.get(), "user id")?)
                .bind(to_sql_id(snapshot.book.get(), "book id")?)
                .execute(&mut *conn)
                .await
                .or_raise(|| ErrorKind::Database)?;
            None
        },
    };
    Ok(Synced { evicted: plan.evict, status })
}

// =========================================================================
// Store
// =========================================================================

#[async_trait]
impl ShelfStore for Repository {
    #[instrument(level = "debug", skip(self))]
    async fn create_shelf(&self, owner: UserId, kind: ShelfKind, name: &str) -> StoreResult<Shelf> {
        let (id,): (i64,) = sqlx::query_as(include_str!("../queries/insert_shelf.sql"))
            .bind(to_sql_id(owner.get(), "owner id").or_raise(|| StoreErrorKind::Store)?)
            .bind(kind.as_slug())
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
            .or_raise(|| StoreErrorKind::Store)?;
        let id = from_sql_id(id, "shelf id").or_raise(|| StoreErrorKind::Store)?;
        Ok(Shelf::new(ShelfId(id), owner, kind, name))
    }

    async fn shelf(&self, id: ShelfId) -> StoreResult<Shelf> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database).or_raise(|| StoreErrorKind::Store)?;
        let shelf = fetch_shelf(&mut conn, id).await.or_raise(|| StoreErrorKind::Store)?;
        shelf.ok_or_raise(|| StoreErrorKind::ShelfNotFound(id))
    }

    async fn shelves_for_user(&self, owner: UserId) -> StoreResult<Vec<Shelf>> {
        let rows: Vec<ShelfRow> = sqlx::query_as(include_str!("../queries/list_shelves.sql"))
            .bind(to_sql_id(owner.get(), "owner id").or_raise(|| StoreErrorKind::Store)?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
            .or_raise(|| StoreErrorKind::Store)?;
        rows.into_iter().map(Shelf::try_from).collect::<Result<Vec<_>>>().or_raise(|| StoreErrorKind::Store)
    }

    async fn shelf_editions(&self, id: ShelfId) -> StoreResult<Vec<EditionId>> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database).or_raise(|| StoreErrorKind::Store)?;
        if fetch_shelf(&mut conn, id).await.or_raise(|| StoreErrorKind::Store)?.is_none() {
            exn::bail!(StoreErrorKind::ShelfNotFound(id));
        }
        let rows: Vec<(i64,)> = sqlx::query_as(include_str!("../queries/list_shelf_editions.sql"))
            .bind(to_sql_id(id.get(), "shelf id").or_raise(|| StoreErrorKind::Store)?)
            .fetch_all(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)
            .or_raise(|| StoreErrorKind::Store)?;
        rows.into_iter()
            .map(|(edition,)| from_sql_id(edition, "edition id").map(EditionId))
            .collect::<Result<Vec<_>>>()
            .or_raise(|| StoreErrorKind::Store)
    }

    #[instrument(level = "debug", skip(self))]
    async fn add_to_shelf(&self, shelf: ShelfId, edition: EditionId) -> StoreResult<Synced> {
        let mut tx = self.begin().await.or_raise(|| StoreErrorKind::Store)?;
        let (shelf, edition) = fetch_membership(&mut tx, shelf, edition).await?;
        let now = now();
        let inserted = sqlx::query(include_str!("../queries/insert_membership.sql"))
            .bind(to_sql_id(shelf.id.get(), "shelf id").or_raise(|| StoreErrorKind::Store)?)
            .bind(to_sql_id(edition.id.get(), "edition id").or_raise(|| StoreErrorKind::Store)?)
            .bind(now.unix_timestamp())
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)
            .or_raise(|| StoreErrorKind::Store)?
            .rows_affected();
        if inserted == 0 {
            // Dropping the transaction rolls it back.
            exn::bail!(StoreErrorKind::DuplicateMembership { shelf: shelf.id, edition: edition.id });
        }
        let snapshot = snapshot(&mut tx, shelf.owner, edition.book).await.or_raise(|| StoreErrorKind::Store)?;
        let plan = sync::on_edition_added(&shelf, &edition, &snapshot, now);
        debug!(?plan, "synchronizing shelf addition");
        let synced = apply(&mut tx, snapshot, plan).await.or_raise(|| StoreErrorKind::Store)?;
        Self::commit(tx).await.or_raise(|| StoreErrorKind::Store)?;
        Ok(synced)
    }

    #[instrument(level = "debug", skip(self))]
    async fn remove_from_shelf(&self, shelf: ShelfId, edition: EditionId) -> StoreResult<Synced> {
        let mut tx = self.begin().await.or_raise(|| StoreErrorKind::Store)?;
        let (shelf, edition) = fetch_membership(&mut tx, shelf, edition).await?;
        let removed = delete_membership(&mut tx, shelf.id, edition.id).await.or_raise(|| StoreErrorKind::Store)?;
        if removed == 0 {
            exn::bail!(StoreErrorKind::MembershipNotFound { shelf: shelf.id, edition: edition.id });
        }
        let snapshot = snapshot(&mut tx, shelf.owner, edition.book).await.or_raise(|| StoreErrorKind::Store)?;
        let plan = sync::on_edition_removed(&shelf, &edition, &snapshot, now());
        debug!(?plan, "synchronizing shelf removal");
        let synced = apply(&mut tx, snapshot, plan).await.or_raise(|| StoreErrorKind::Store)?;
        Self::commit(tx).await.or_raise(|| StoreErrorKind::Store)?;
        Ok(synced)
    }

    async fn user_book(&self, user: UserId, book: BookId) -> StoreResult<Option<UserBookStatus>> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database).or_raise(|| StoreErrorKind::Store)?;
        fetch_status(&mut conn, user, book).await.or_raise(|| StoreErrorKind::Store)
    }

    #[instrument(level = "debug", skip(self))]
    async fn reconcile(&self, user: UserId, book: BookId) -> StoreResult<Option<UserBookStatus>> {
        let mut tx = self.begin().await.or_raise(|| StoreErrorKind::Store)?;
        let snapshot = snapshot(&mut tx, user, book).await.or_raise(|| StoreErrorKind::Store)?;
        let plan = sync::reconcile(&snapshot, now());
        let synced = apply(&mut tx, snapshot, plan).await.or_raise(|| StoreErrorKind::Store)?;
        Self::commit(tx).await.or_raise(|| StoreErrorKind::Store)?;
        Ok(synced.status)
    }
}
