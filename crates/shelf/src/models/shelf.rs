use super::{BookId, EditionId, ShelfId, ShelfKind, UserId};

/// A shelf belonging to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shelf {
    pub id: ShelfId,
    pub owner: UserId,
    pub kind: ShelfKind,
    /// Display name; defaults to the kind's label for built-in shelves.
    pub name: String,
}
impl Shelf {
    pub fn new(id: ShelfId, owner: UserId, kind: ShelfKind, name: impl Into<String>) -> Self {
        Self { id, owner, kind, name: name.into() }
    }
}

/// One published edition of a book. Editions of the same book are
/// interchangeable as far as reading status and ownership are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edition {
    pub id: EditionId,
    pub book: BookId,
}
impl Edition {
    pub fn new(id: EditionId, book: BookId) -> Self {
        Self { id, book }
    }
}

/// A single (shelf, edition) membership, seen from the perspective of one
/// user and one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub shelf: ShelfId,
    pub kind: ShelfKind,
    pub edition: EditionId,
}
impl Placement {
    pub fn new(shelf: &Shelf, edition: EditionId) -> Self {
        Self { shelf: shelf.id, kind: shelf.kind, edition }
    }
}
