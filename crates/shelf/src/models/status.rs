use super::{BookId, ReadStatus, UserId};
use time::UtcDateTime;

/// Derived reading status and ownership of one book for one user.
///
/// Never created directly by a user: it exists exactly while at least one
/// edition of the book sits on one of the user's special shelves, and is
/// maintained by the [synchronizer](crate::sync).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBookStatus {
    pub user: UserId,
    pub book: BookId,
    pub read_status: Option<ReadStatus>,
    pub is_owned: bool,
    pub updated_at: UtcDateTime,
}
impl UserBookStatus {
    /// A fresh, empty aggregate. Only valid once a status or ownership is set.
    pub fn new(user: UserId, book: BookId, now: UtcDateTime) -> Self {
        Self {
            user,
            book,
            read_status: None,
            is_owned: false,
            updated_at: now,
        }
    }

    /// Returns `true` if the aggregate carries no information and must not exist.
    pub fn is_empty(&self) -> bool {
        self.read_status.is_none() && !self.is_owned
    }

    /// Compare the derived state, ignoring when it was last touched.
    pub fn same_state(&self, other: &Self) -> bool {
        self.user == other.user
            && self.book == other.book
            && self.read_status == other.read_status
            && self.is_owned == other.is_owned
    }
}
