mod book;
mod facet;
mod shelf;

pub use self::book::{Author, Book, EditionRecord, NewBook, NewEdition};
pub(crate) use self::book::{BookRow, EditionRow, encode_authors, encode_genres};
pub(crate) use self::shelf::{PlacementRow, ShelfRow, UserBookRow};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::UtcDateTime;

/// SQLite integers are signed; identifiers are not.
pub(crate) fn to_sql_id(id: u64, field: &'static str) -> Result<i64> {
    i64::try_from(id).or_raise(|| ErrorKind::InvalidData(field))
}

pub(crate) fn from_sql_id(id: i64, field: &'static str) -> Result<u64> {
    u64::try_from(id).or_raise(|| ErrorKind::InvalidData(field))
}

pub(crate) fn from_sql_timestamp(timestamp: i64, field: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(timestamp).or_raise(|| ErrorKind::InvalidData(field))
}
