mod ids;
mod kind;
mod shelf;
mod status;

pub use self::ids::{BookId, EditionId, ShelfId, UserId};
pub use self::kind::{ReadStatus, ShelfKind};
pub use self::shelf::{Edition, Placement, Shelf};
pub use self::status::UserBookStatus;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace(['-', '_', ' '], "")
}
