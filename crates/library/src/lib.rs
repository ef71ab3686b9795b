//! Catalog imports and shelf management.
//!
//! [`Library`] ties the pieces together: it opens the database described by a
//! [`Config`], classifies imported books with a [`Normalizer`] and routes shelf
//! changes through the synchronizing [`Repository`].

pub mod error;
pub mod import;

pub use crate::import::{BookImport, ImportedBook};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use folio_cache::{Book, Catalog, Database, Repository};
use folio_config::Config;
use folio_genre::{Genres, Normalizer};
use folio_shelf::ShelfStore;
use folio_shelf::error::Result as ShelfResult;
use folio_shelf::models::{BookId, EditionId, Shelf, ShelfId, ShelfKind, UserBookStatus, UserId};
use folio_shelf::store::Synced;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct Library {
    db: Database,
    catalog: Catalog,
    shelves: Repository,
    normalizer: Normalizer,
}

impl Library {
    fn new(db: Database, normalizer: Normalizer) -> Self {
        Self {
            catalog: Catalog::from(&db),
            shelves: Repository::from(&db),
            db,
            normalizer,
        }
    }

    /// Open (creating if necessary) the library described by `config`.
    #[instrument(skip(config), fields(database = %config.database.display()))]
    pub async fn open(config: &Config) -> Result<Self> {
        config.validate().or_raise(|| ErrorKind::Config)?;
        let normalizer =
            Normalizer::new(config.genres.max_genres, &config.genres.default_genre).or_raise(|| ErrorKind::Config)?;
        if let Some(parent) = config.database.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Database)?;
        }
        let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Database)?;
        info!("opened library");
        Ok(Self::new(db, normalizer))
    }

    /// Open a throwaway library backed by an in-memory database.
    pub async fn open_in_memory(normalizer: Normalizer) -> Result<Self> {
        let db = Database::connect_in_memory().await.or_raise(|| ErrorKind::Database)?;
        Ok(Self::new(db, normalizer))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shelves(&self) -> &Repository {
        &self.shelves
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Classify and store a book from an external catalog.
    pub async fn import_book(&self, import: BookImport) -> Result<ImportedBook> {
        import::import_book(&self.catalog, &self.normalizer, import).await
    }

    /// Re-run genre classification for a stored book, e.g. after the genre
    /// tables or limits changed.
    #[instrument(skip(self, subjects))]
    pub async fn reclassify<I, S>(&self, book: BookId, subjects: I) -> Result<Genres>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let genres = self.normalizer.classify(subjects);
        let all = genres.iter().map(str::to_string).collect();
        self.catalog.set_genres(book, &all, genres.primary).await.or_raise(|| ErrorKind::Catalog)?;
        Ok(genres)
    }

    /// Books tagged with a genre. The genre is normalized first, so any
    /// alias ("Sci-Fi", "Whodunit") finds the same books as its canonical
    /// name; something that isn't a genre at all finds nothing.
    pub async fn books_in_genre(&self, genre: impl AsRef<str>) -> Result<Vec<Book>> {
        let Some(genre) = self.normalizer.normalize(genre) else {
            return Ok(vec![]);
        };
        self.catalog.list_books_by_genre(genre).await.or_raise(|| ErrorKind::Catalog)
    }

    // =========================================================================
    // Shelves
    // =========================================================================

    /// Give a new user the built-in shelves.
    pub async fn create_user_shelves(&self, user: UserId) -> ShelfResult<Vec<Shelf>> {
        self.shelves.create_default_shelves(user).await
    }

    pub async fn create_shelf(&self, owner: UserId, name: &str) -> ShelfResult<Shelf> {
        self.shelves.create_shelf(owner, ShelfKind::Custom, name).await
    }

    #[instrument(skip(self))]
    pub async fn shelve(&self, shelf: ShelfId, edition: EditionId) -> ShelfResult<Synced> {
        self.shelves.add_to_shelf(shelf, edition).await
    }

    #[instrument(skip(self))]
    pub async fn unshelve(&self, shelf: ShelfId, edition: EditionId) -> ShelfResult<Synced> {
        self.shelves.remove_from_shelf(shelf, edition).await
    }

    pub async fn status(&self, user: UserId, book: BookId) -> ShelfResult<Option<UserBookStatus>> {
        self.shelves.user_book(user, book).await
    }

    pub async fn reconcile(&self, user: UserId, book: BookId) -> ShelfResult<Option<UserBookStatus>> {
        self.shelves.reconcile(user, book).await
    }

    /// Close the database. The library must not be used afterwards.
    pub async fn close(self) {
        self.db.close().await;
    }
}
