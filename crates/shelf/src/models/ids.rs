use derive_more::{Display, From};

macro_rules! id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);
        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }
    };
}

id!(
    /// Identifies the account that owns shelves.
    UserId
);
id!(
    /// Identifies a work, independent of any particular edition.
    BookId
);
id!(
    /// Identifies one published edition of a [`BookId`].
    EditionId
);
id!(ShelfId);
