use crate::error::{ErrorKind, Result};
use crate::tables::{CANONICAL, DEFAULT_GENRE, DEFAULT_MAX_GENRES};
use crate::{extract_genres, normalize_genre, pick_primary};
use std::collections::BTreeSet;

/// The genres of a single book, as stored against the catalog record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genres {
    /// All canonical genres found, at most the configured maximum.
    pub all: BTreeSet<&'static str>,
    /// The genre used to represent the book in listings.
    pub primary: &'static str,
}
impl Genres {
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.all.iter().copied()
    }
}

/// Genre normalization with user-configurable limits.
///
/// The free functions ([`extract_genres`], [`primary_genre`](crate::primary_genre))
/// take their settings as arguments or use the built-in defaults; a
/// `Normalizer` carries validated settings around so that the import pipeline
/// doesn't have to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    max_genres: usize,
    default_genre: &'static str,
}
impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_genres: DEFAULT_MAX_GENRES,
            default_genre: DEFAULT_GENRE,
        }
    }
}
impl Normalizer {
    /// Create a normalizer keeping at most `max_genres` genres per book, and
    /// falling back to `default_genre` for books without any.
    ///
    /// The default genre is itself normalized, so `"Sci-Fi"` is accepted as
    /// `"science fiction"`.
    ///
    /// # Errors
    /// - [`ErrorKind::InvalidLimit`] if `max_genres` is zero.
    /// - [`ErrorKind::UnknownGenre`] if `default_genre` does not normalize to
    ///   a canonical genre.
    pub fn new(max_genres: usize, default_genre: impl AsRef<str>) -> Result<Self> {
        if max_genres == 0 {
            exn::bail!(ErrorKind::InvalidLimit);
        }
        let default_genre = default_genre.as_ref();
        let Some(canonical) = normalize_genre(default_genre) else {
            exn::bail!(ErrorKind::UnknownGenre(default_genre.to_string()));
        };
        debug_assert!(CANONICAL.contains(canonical));
        Ok(Self { max_genres, default_genre: canonical })
    }

    pub fn max_genres(&self) -> usize {
        self.max_genres
    }

    pub fn default_genre(&self) -> &'static str {
        self.default_genre
    }

    /// See [`normalize_genre`].
    pub fn normalize(&self, subject: impl AsRef<str>) -> Option<&'static str> {
        normalize_genre(subject)
    }

    /// See [`extract_genres`].
    pub fn extract<I, S>(&self, subjects: I) -> BTreeSet<&'static str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extract_genres(subjects, self.max_genres)
    }

    /// See [`primary_genre`](crate::primary_genre), using this normalizer's
    /// default genre for empty sets.
    pub fn primary<I, S>(&self, genres: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let genres = genres.into_iter().collect::<Vec<_>>();
        pick_primary(genres.iter().map(AsRef::<str>::as_ref), self.default_genre).to_string()
    }

    /// Extract genres from subject headings and choose the primary genre in
    /// one go.
    pub fn classify<I, S>(&self, subjects: I) -> Genres
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let all = self.extract(subjects);
        let primary = pick_primary(all.iter().copied(), self.default_genre);
        Genres { all, primary }
    }
}
