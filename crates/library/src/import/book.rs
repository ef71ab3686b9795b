use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::import::error::{ErrorKind, Result as ImportResult};
use exn::ResultExt;
use folio_cache::{Author, Book, Catalog, EditionRecord, NewBook, NewEdition};
use folio_genre::Normalizer;
use tracing::{debug, info, instrument};

/// A book as delivered by an external catalog.
///
/// Subjects are the catalog's free-text subject headings, most relevant
/// first; they are only used for genre classification and are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookImport {
    pub title: String,
    pub authors: Vec<Author>,
    pub subjects: Vec<String>,
    pub editions: Vec<NewEdition>,
}

/// The catalog records created for a [`BookImport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedBook {
    pub book: Book,
    pub editions: Vec<EditionRecord>,
}

/// Classify a book's subjects into genres and store it with its editions.
///
/// Titles and author names are trimmed and authors without a name dropped. A
/// book whose subjects match no genre is stored without genres, under the
/// normalizer's default primary genre.
pub async fn import_book(catalog: &Catalog, normalizer: &Normalizer, import: BookImport) -> LibraryResult<ImportedBook> {
    import_book_inner(catalog, normalizer, import).await.or_raise(|| LibraryErrorKind::Import)
}

#[instrument(level = "debug", skip_all, fields(title = %import.title))]
pub(crate) async fn import_book_inner(
    catalog: &Catalog,
    normalizer: &Normalizer,
    import: BookImport,
) -> ImportResult<ImportedBook> {
    let title = import.title.trim();
    if title.is_empty() {
        exn::bail!(ErrorKind::MissingTitle);
    }
    let genres = normalizer.classify(&import.subjects);
    debug!(subjects = import.subjects.len(), genres = genres.all.len(), "classified subjects");
    let authors = import
        .authors
        .into_iter()
        .filter_map(|author| {
            let name = author.name.trim();
            (!name.is_empty()).then(|| Author { name: name.to_string(), role: author.role })
        })
        .collect();
    let new = NewBook {
        title: title.to_string(),
        authors,
        genres: genres.iter().map(str::to_string).collect(),
        primary_genre: genres.primary.to_string(),
        editions: import.editions,
    };
    let (book, editions) = catalog.insert_book(&new).await.or_raise(|| ErrorKind::Catalog)?;
    info!(book = %book.id, primary_genre = %book.primary_genre, editions = editions.len(), "imported book");
    Ok(ImportedBook { book, editions })
}
