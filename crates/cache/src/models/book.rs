use crate::error::{Error, ErrorKind, Result};
use crate::models::facet::AuthorProxy;
use crate::models::{from_sql_id, from_sql_timestamp};
use exn::ResultExt;
use facet_json::{from_str as from_json, to_string as to_json};
use folio_shelf::models::{BookId, Edition, EditionId};
use std::collections::BTreeSet;
use time::UtcDateTime;

/// A contributor to a book. The role is only recorded when it isn't plain
/// authorship ("editor", "translator", "illustrator"...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub role: Option<String>,
}
impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), role: None }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// A published edition waiting to be added to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEdition {
    pub isbn: Option<String>,
    /// Free-form format ("hardcover", "ebook"...).
    pub format: Option<String>,
}

/// A book waiting to be added to the catalog, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub authors: Vec<Author>,
    pub genres: BTreeSet<String>,
    pub primary_genre: String,
    pub editions: Vec<NewEdition>,
}

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<Author>,
    pub genres: BTreeSet<String>,
    pub primary_genre: String,
    pub imported_at: UtcDateTime,
}

/// An edition in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionRecord {
    pub edition: Edition,
    pub isbn: Option<String>,
    pub format: Option<String>,
}
impl EditionRecord {
    pub fn id(&self) -> EditionId {
        self.edition.id
    }

    pub fn book(&self) -> BookId {
        self.edition.book
    }
}

pub(crate) fn encode_authors(authors: &[Author]) -> Result<String> {
    let authors = authors.iter().map(AuthorProxy::from).collect::<Vec<_>>();
    to_json(&authors).or_raise(|| ErrorKind::InvalidData("authors"))
}

pub(crate) fn encode_genres(genres: &BTreeSet<String>) -> Result<String> {
    let genres = genres.iter().cloned().collect::<Vec<_>>();
    to_json(&genres).or_raise(|| ErrorKind::InvalidData("genres"))
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) authors: String,
    pub(crate) genres: String,
    pub(crate) primary_genre: String,
    pub(crate) imported_at: i64,
}
impl TryFrom<BookRow> for Book {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self> {
        Ok(Self {
            id: BookId(from_sql_id(row.id, "book id")?),
            title: row.title,
            authors: from_json::<Vec<AuthorProxy>>(&row.authors)
                .or_raise(|| ErrorKind::InvalidData("authors"))?
                .into_iter()
                .map(Author::from)
                .collect(),
            genres: from_json::<Vec<String>>(&row.genres)
                .or_raise(|| ErrorKind::InvalidData("genres"))?
                .into_iter()
                .collect(),
            primary_genre: row.primary_genre,
            imported_at: from_sql_timestamp(row.imported_at, "import date")?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct EditionRow {
    pub(crate) id: i64,
    pub(crate) book_id: i64,
    #[sqlx(default)]
    pub(crate) isbn: Option<String>,
    #[sqlx(default)]
    pub(crate) format: Option<String>,
}
impl TryFrom<EditionRow> for EditionRecord {
    type Error = Error;
    fn try_from(row: EditionRow) -> Result<Self> {
        Ok(Self {
            edition: Edition::new(
                EditionId(from_sql_id(row.id, "edition id")?),
                BookId(from_sql_id(row.book_id, "book id")?),
            ),
            isbn: row.isbn,
            format: row.format,
        })
    }
}
