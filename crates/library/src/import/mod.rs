pub mod error;
mod book;

pub use self::book::{BookImport, ImportedBook, import_book};
