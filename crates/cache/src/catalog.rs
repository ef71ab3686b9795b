//! Repository for books and their editions.

use crate::Database;
use crate::db::begin_write;
use crate::error::{ErrorKind, Result};
use crate::models::{
    Book, BookRow, EditionRecord, EditionRow, NewBook, NewEdition, encode_authors, encode_genres, from_sql_id,
    to_sql_id,
};
use exn::ResultExt;
use folio_shelf::models::{BookId, Edition, EditionId};
use folio_shelf::sync::now;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Repository for the book catalog.
///
/// Books are works; editions are the physical or digital things users put on
/// shelves. Genres are stored already normalized, alongside the primary genre
/// chosen for listings.
#[derive(Debug, Clone)]
pub struct Catalog {
    pool: SqlitePool,
}
impl From<&Database> for Catalog {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Catalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a book and all of its editions in one transaction.
    #[instrument(level = "debug", skip(self, book), fields(title = %book.title))]
    pub async fn insert_book(&self, book: &NewBook) -> Result<(Book, Vec<EditionRecord>)> {
        let imported_at = now();
        let mut tx = begin_write(&self.pool).await?;
        let (id,): (i64,) = sqlx::query_as(include_str!("../queries/insert_book.sql"))
            .bind(&book.title)
            .bind(encode_authors(&book.authors)?)
            .bind(encode_genres(&book.genres)?)
            .bind(&book.primary_genre)
            .bind(imported_at.unix_timestamp())
            .fetch_one(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let id = BookId(from_sql_id(id, "book id")?);
        let mut editions = Vec::with_capacity(book.editions.len());
        for edition in &book.editions {
            editions.push(insert_edition(&mut tx, id, edition).await?);
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        debug!(book = %id, editions = editions.len(), "inserted book");
        let book = Book {
            id,
            title: book.title.clone(),
            authors: book.authors.clone(),
            genres: book.genres.clone(),
            primary_genre: book.primary_genre.clone(),
            imported_at,
        };
        Ok((book, editions))
    }

    /// Add another edition to an existing book.
    ///
    /// Returns [`ErrorKind::BookNotFound`] if the book doesn't exist.
    pub async fn insert_edition(&self, book: BookId, edition: &NewEdition) -> Result<EditionRecord> {
        let mut tx = begin_write(&self.pool).await?;
        if fetch_book(&mut tx, book).await?.is_none() {
            exn::bail!(ErrorKind::BookNotFound(book));
        }
        let record = insert_edition(&mut tx, book, edition).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(record)
    }

    pub async fn get_book(&self, id: BookId) -> Result<Option<Book>> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        fetch_book(&mut conn, id).await
    }

    pub async fn get_edition(&self, id: EditionId) -> Result<Option<EditionRecord>> {
        let row: Option<EditionRow> = sqlx::query_as(include_str!("../queries/get_edition.sql"))
            .bind(to_sql_id(id.get(), "edition id")?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(EditionRecord::try_from).transpose()
    }

    /// All editions of a book, ordered by id.
    pub async fn editions_of(&self, book: BookId) -> Result<Vec<EditionRecord>> {
        let rows: Vec<EditionRow> = sqlx::query_as(include_str!("../queries/list_editions.sql"))
            .bind(to_sql_id(book.get(), "book id")?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(EditionRecord::try_from).collect()
    }

    /// Books tagged with a canonical genre (not only those whose *primary*
    /// genre it is), ordered by title.
    pub async fn list_books_by_genre(&self, genre: impl AsRef<str>) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/list_books_by_genre.sql"))
            .bind(genre.as_ref())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Book::try_from).collect()
    }

    /// Replace a book's genres, e.g. after the genre tables changed.
    ///
    /// Returns [`ErrorKind::BookNotFound`] if the book doesn't exist.
    #[instrument(level = "debug", skip(self, genres))]
    pub async fn set_genres(&self, book: BookId, genres: &BTreeSet<String>, primary_genre: &str) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/set_genres.sql"))
            .bind(to_sql_id(book.get(), "book id")?)
            .bind(encode_genres(genres)?)
            .bind(primary_genre)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::BookNotFound(book));
        }
        Ok(())
    }
}

async fn fetch_book(conn: &mut SqliteConnection, id: BookId) -> Result<Option<Book>> {
    let row: Option<BookRow> = sqlx::query_as(include_str!("../queries/get_book.sql"))
        .bind(to_sql_id(id.get(), "book id")?)
        .fetch_optional(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(Book::try_from).transpose()
}

async fn insert_edition(conn: &mut SqliteConnection, book: BookId, edition: &NewEdition) -> Result<EditionRecord> {
    let (id,): (i64,) = sqlx::query_as(include_str!("../queries/insert_edition.sql"))
        .bind(to_sql_id(book.get(), "book id")?)
        .bind(edition.isbn.as_deref())
        .bind(edition.format.as_deref())
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(EditionRecord {
        edition: Edition::new(EditionId(from_sql_id(id, "edition id")?), book),
        isbn: edition.isbn.clone(),
        format: edition.format.clone(),
    })
}
