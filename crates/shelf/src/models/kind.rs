use super::sanitize;
use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Shelf kind enum.
///
/// Read, Reading, Want to Read and Owned are *special*: putting a book on them
/// says something about the user's relationship to it. The first three are
/// *status* shelves and are mutually exclusive per book; Owned varies
/// independently. Every other kind is inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShelfKind {
    Read,
    Reading,
    WantToRead,
    Owned,
    Available,
    LentOut,
    /// User-created shelf with a free-form name.
    Custom,
}
impl ShelfKind {
    /// The shelves every user starts out with.
    pub const DEFAULTS: [ShelfKind; 6] = [
        Self::Read,
        Self::Reading,
        Self::WantToRead,
        Self::Owned,
        Self::Available,
        Self::LentOut,
    ];

    /// Returns the display string for the shelf kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Reading => "Reading",
            Self::WantToRead => "Want to Read",
            Self::Owned => "Owned",
            Self::Available => "Available",
            Self::LentOut => "Lent Out",
            Self::Custom => "Custom",
        }
    }

    /// Returns the stable identifier used when persisting the shelf kind.
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Reading => "reading",
            Self::WantToRead => "want_to_read",
            Self::Owned => "owned",
            Self::Available => "available",
            Self::LentOut => "lent_out",
            Self::Custom => "custom",
        }
    }

    /// Returns `true` for kinds that affect a user's reading status or ownership.
    pub fn is_special(&self) -> bool {
        self.is_status() || matches!(self, Self::Owned)
    }

    /// Returns `true` for the mutually exclusive reading-status kinds.
    pub fn is_status(&self) -> bool {
        self.read_status().is_some()
    }

    /// The reading status implied by a book being on a shelf of this kind.
    pub fn read_status(&self) -> Option<ReadStatus> {
        match self {
            Self::Read => Some(ReadStatus::Read),
            Self::Reading => Some(ReadStatus::Reading),
            Self::WantToRead => Some(ReadStatus::WantToRead),
            _ => None,
        }
    }
}
impl FromStr for ShelfKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sanitized = sanitize(s);
        Ok(match sanitized.as_str() {
            "read" => Self::Read,
            "reading" | "currentlyreading" => Self::Reading,
            "wanttoread" | "toread" => Self::WantToRead,
            "owned" => Self::Owned,
            "available" => Self::Available,
            "lentout" | "lent" => Self::LentOut,
            "custom" => Self::Custom,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "shelf kind",
                value: s.to_string(),
            }),
        })
    }
}
impl TryFrom<String> for ShelfKind {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl From<ReadStatus> for ShelfKind {
    fn from(status: ReadStatus) -> Self {
        match status {
            ReadStatus::Read => Self::Read,
            ReadStatus::Reading => Self::Reading,
            ReadStatus::WantToRead => Self::WantToRead,
        }
    }
}
impl Display for ShelfKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A user's reading status for a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadStatus {
    Read,
    Reading,
    WantToRead,
}
impl ReadStatus {
    pub fn as_str(&self) -> &'static str {
        ShelfKind::from(*self).as_str()
    }

    pub fn as_slug(&self) -> &'static str {
        ShelfKind::from(*self).as_slug()
    }
}
impl FromStr for ReadStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = s.parse::<ShelfKind>()?;
        match kind.read_status() {
            Some(status) => Ok(status),
            None => exn::bail!(ErrorKind::ParseError {
                field: "read status",
                value: s.to_string(),
            }),
        }
    }
}
impl TryFrom<String> for ReadStatus {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl Display for ReadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
