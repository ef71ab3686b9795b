use crate::error::{Error, ErrorKind, Result};
use crate::models::{from_sql_id, from_sql_timestamp, to_sql_id};
use exn::ResultExt;
use folio_shelf::models::{BookId, EditionId, Placement, ReadStatus, Shelf, ShelfId, ShelfKind, UserBookStatus, UserId};

#[derive(sqlx::FromRow)]
pub(crate) struct ShelfRow {
    id: i64,
    owner_id: i64,
    kind: String,
    name: String,
}
impl TryFrom<ShelfRow> for Shelf {
    type Error = Error;
    fn try_from(row: ShelfRow) -> Result<Self> {
        Ok(Shelf::new(
            ShelfId(from_sql_id(row.id, "shelf id")?),
            UserId(from_sql_id(row.owner_id, "owner id")?),
            row.kind.parse::<ShelfKind>().or_raise(|| ErrorKind::InvalidData("shelf kind"))?,
            row.name,
        ))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PlacementRow {
    shelf_id: i64,
    kind: String,
    edition_id: i64,
}
impl TryFrom<PlacementRow> for Placement {
    type Error = Error;
    fn try_from(row: PlacementRow) -> Result<Self> {
        Ok(Placement {
            shelf: ShelfId(from_sql_id(row.shelf_id, "shelf id")?),
            kind: row.kind.parse::<ShelfKind>().or_raise(|| ErrorKind::InvalidData("shelf kind"))?,
            edition: EditionId(from_sql_id(row.edition_id, "edition id")?),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserBookRow {
    pub(crate) user_id: i64,
    pub(crate) book_id: i64,
    #[sqlx(default)]
    pub(crate) read_status: Option<String>,
    pub(crate) is_owned: bool,
    pub(crate) updated_at: i64,
}
impl TryFrom<&UserBookStatus> for UserBookRow {
    type Error = Error;
    fn try_from(status: &UserBookStatus) -> Result<Self> {
        Ok(Self {
            user_id: to_sql_id(status.user.get(), "user id")?,
            book_id: to_sql_id(status.book.get(), "book id")?,
            read_status: status.read_status.map(|status| status.as_slug().to_string()),
            is_owned: status.is_owned,
            updated_at: status.updated_at.unix_timestamp(),
        })
    }
}
impl TryFrom<UserBookRow> for UserBookStatus {
    type Error = Error;
    fn try_from(row: UserBookRow) -> Result<Self> {
        Ok(Self {
            user: UserId(from_sql_id(row.user_id, "user id")?),
            book: BookId(from_sql_id(row.book_id, "book id")?),
            read_status: row
                .read_status
                .map(|status| status.parse::<ReadStatus>().or_raise(|| ErrorKind::InvalidData("read status")))
                .transpose()?,
            is_owned: row.is_owned,
            updated_at: from_sql_timestamp(row.updated_at, "update date")?,
        })
    }
}
