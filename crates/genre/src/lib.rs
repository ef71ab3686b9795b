//! Genre normalization for catalog imports.
//!
//! External catalogs attach free-text subject headings to books ("Fiction,
//! fantasy, general", "Detective and mystery stories", "Sci-Fi"). This crate
//! maps them onto a small, closed vocabulary of lowercase canonical genres and
//! picks a single "primary" genre for display.
//!
//! Everything here is a pure function over static tables: safe to call from
//! any number of threads, and never fails on string input.

pub mod error;
mod normalizer;
mod tables;

use std::collections::BTreeSet;
use tracing::{instrument, trace};

pub use crate::normalizer::{Genres, Normalizer};
pub use crate::tables::{DEFAULT_GENRE, DEFAULT_MAX_GENRES};
use crate::tables::{CANONICAL, CANONICAL_GENRES, GENRE_ALIASES, GENRE_KEYWORDS, PRIMARY_GENRE_PRIORITY};

/// Returns `true` if `genre` is a member of the canonical vocabulary.
///
/// The check is exact: canonical genres are always lowercase.
pub fn is_canonical(genre: &str) -> bool {
    CANONICAL.contains(genre)
}

/// All canonical genres, in declaration order.
pub fn canonical_genres() -> &'static [&'static str] {
    CANONICAL_GENRES
}

/// Map a single subject heading to its canonical genre.
///
/// Matching happens in strict order, and the first tier to match wins:
/// 1. The lowercased, trimmed subject *is* a canonical genre.
/// 2. The subject is a known alias of a canonical genre.
/// 3. The subject contains a known keyword (checked in declaration order).
///
/// Returns `None` when nothing matches; that includes empty or
/// whitespace-only subjects.
///
/// # Examples
///
/// ```
/// use folio_genre::normalize_genre;
/// assert_eq!(normalize_genre("  Fantasy "), Some("fantasy"));
/// assert_eq!(normalize_genre("Sci-Fi"), Some("science fiction"));
/// assert_eq!(normalize_genre("Dragons -- Juvenile fiction"), Some("fantasy"));
/// assert_eq!(normalize_genre("Accounting"), None);
/// ```
pub fn normalize_genre(subject: impl AsRef<str>) -> Option<&'static str> {
    let subject = subject.as_ref().trim().to_lowercase();
    if subject.is_empty() {
        return None;
    }
    if let Some(genre) = CANONICAL.get(subject.as_str()).copied() {
        return Some(genre);
    }
    if let Some(genre) = GENRE_ALIASES.get(subject.as_str()).copied() {
        return Some(genre);
    }
    GENRE_KEYWORDS.iter().find(|(keyword, _)| subject.contains(keyword)).map(|(_, genre)| *genre)
}

/// Normalize a list of subject headings into a set of at most `max_genres`
/// canonical genres.
///
/// Subjects are processed in order and collection stops as soon as the set is
/// full, so genres found in earlier subjects take precedence over later ones.
/// Catalogs tend to list the most relevant subjects first.
///
/// # Examples
///
/// ```
/// use folio_genre::extract_genres;
/// let subjects = ["Fantasy fiction", "Dragons", "Love stories", "Ghost stories"];
/// let genres = extract_genres(subjects, 2);
/// assert_eq!(genres.into_iter().collect::<Vec<_>>(), vec!["fantasy", "romance"]);
/// ```
#[instrument(level = "debug", skip(subjects))]
pub fn extract_genres<I, S>(subjects: I, max_genres: usize) -> BTreeSet<&'static str>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut genres = BTreeSet::new();
    for subject in subjects {
        if genres.len() >= max_genres {
            break;
        }
        match normalize_genre(&subject) {
            Some(genre) => {
                genres.insert(genre);
            },
            None => trace!(subject = subject.as_ref(), "subject does not map to a genre"),
        }
    }
    genres
}

/// Choose the primary genre of a set of genres.
///
/// The first genre of the priority list (fantasy, science fiction, mystery,
/// ...) present in the set wins. Otherwise the alphabetically smallest genre
/// is chosen, and an empty set falls back to [`DEFAULT_GENRE`].
///
/// # Examples
///
/// ```
/// use folio_genre::primary_genre;
/// assert_eq!(primary_genre(["romance", "fantasy"]), "fantasy");
/// assert_eq!(primary_genre(["travel", "cooking"]), "cooking");
/// assert_eq!(primary_genre(Vec::<&str>::new()), "fiction");
/// ```
pub fn primary_genre<I, S>(genres: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let genres = genres.into_iter().collect::<Vec<_>>();
    pick_primary(genres.iter().map(AsRef::<str>::as_ref), DEFAULT_GENRE).to_string()
}

pub(crate) fn pick_primary<'a>(genres: impl IntoIterator<Item = &'a str>, fallback: &'a str) -> &'a str {
    let genres = genres.into_iter().collect::<Vec<_>>();
    PRIMARY_GENRE_PRIORITY
        .iter()
        .find_map(|priority| genres.iter().find(|genre| *genre == priority).copied())
        .or_else(|| genres.iter().min().copied())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_canonical_genres_normalize_to_themselves() {
        for genre in CANONICAL_GENRES {
            assert_eq!(normalize_genre(genre), Some(*genre));
            assert_eq!(normalize_genre(genre.to_uppercase()), Some(*genre));
            assert_eq!(normalize_genre(format!("\t {genre}  \n")), Some(*genre));
        }
    }

    #[test]
    fn test_aliases_normalize_to_their_genre() {
        for (alias, genre) in GENRE_ALIASES.iter() {
            assert_eq!(normalize_genre(alias), Some(*genre), "alias {alias:?}");
        }
    }

    #[test]
    fn test_tables_only_reference_canonical_genres() {
        for (alias, genre) in GENRE_ALIASES.iter() {
            assert!(is_canonical(genre), "alias {alias:?} maps to unknown genre {genre:?}");
            assert_eq!(*alias, alias.trim().to_lowercase(), "alias {alias:?} is not normalized");
        }
        for (keyword, genre) in GENRE_KEYWORDS {
            assert!(is_canonical(genre), "keyword {keyword:?} maps to unknown genre {genre:?}");
            assert_eq!(*keyword, keyword.trim().to_lowercase(), "keyword {keyword:?} is not normalized");
        }
        for genre in PRIMARY_GENRE_PRIORITY {
            assert!(is_canonical(genre), "priority genre {genre:?} is unknown");
        }
        assert!(is_canonical(DEFAULT_GENRE));
    }

    #[rstest]
    #[case("Science Fiction", Some("science fiction"))]
    #[case("Detective and mystery stories", Some("mystery"))]
    #[case("FICTION, HISTORICAL, GENERAL", Some("historical fiction"))]
    #[case("Juvenile fiction", Some("children's fiction"))]
    #[case("Fiction, science fiction, space opera", Some("science fiction"))]
    #[case("Magic -- Fiction", Some("fantasy"))]
    #[case("Autobiographies", Some("memoir"))]
    #[case("Biographies of composers", Some("biography"))]
    #[case("Nonfiction, essays", Some("essays"))]
    #[case("Non-fiction writing", Some("nonfiction"))]
    #[case("English fiction", Some("fiction"))]
    #[case("Popular science", Some("science"))]
    #[case("", None)]
    #[case("   ", None)]
    #[case("Accounting", None)]
    #[case("Cookery, French", Some("cooking"))]
    #[case("Sports stories", Some("sports"))]
    #[case("Theater -- History", Some("drama"))]
    #[case("Playwrights, American", Some("drama"))]
    fn test_normalize_genre(#[case] subject: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_genre(subject), expected);
    }

    #[rstest]
    #[case("Transportation", None)]
    #[case("Displays and exhibits", None)]
    #[case("Cookeville (Tenn.) -- History", Some("history"))]
    #[case("Airports", None)]
    fn test_short_words_inside_other_words_do_not_match(#[case] subject: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_genre(subject), expected);
    }

    #[test]
    fn test_keyword_tie_break_uses_declaration_order() {
        // Contains "historical", "mystery" and "fiction": mystery is declared first.
        assert_eq!(normalize_genre("Historical mystery fiction"), Some("mystery"));
        // Contains both "science" and "fiction", but not the phrase "science fiction".
        assert_eq!(normalize_genre("Fiction about science"), Some("science"));
    }

    #[test]
    fn test_extract_genres_respects_limit() {
        let subjects = [
            "Fantasy",
            "Romance",
            "Horror",
            "Mystery",
            "Thrillers",
            "Poems",
            "Cookbooks",
            "Travel",
        ];
        for max in 0..10 {
            let genres = extract_genres(subjects, max);
            assert!(genres.len() <= max);
            assert!(genres.iter().all(|genre| is_canonical(genre)));
        }
        assert_eq!(extract_genres(subjects, 5).len(), 5);
    }

    #[test]
    fn test_extract_genres_keeps_earliest_subjects() {
        let genres = extract_genres(["Love stories", "Romance fiction", "Ghost stories", "Sci-fi"], 2);
        assert_eq!(genres, BTreeSet::from(["romance", "horror"]));
    }

    #[test]
    fn test_extract_genres_skips_unknown_subjects() {
        let genres = extract_genres(["Accounting", "", "Tax law", "Fantasy fiction"], DEFAULT_MAX_GENRES);
        assert_eq!(genres, BTreeSet::from(["fantasy"]));
        assert!(extract_genres(Vec::<String>::new(), DEFAULT_MAX_GENRES).is_empty());
    }

    #[rstest]
    #[case(&["fantasy", "romance"], "fantasy")]
    #[case(&["romance", "science fiction", "mystery"], "science fiction")]
    #[case(&["children's fiction", "poetry"], "children's fiction")]
    #[case(&["obscure_genre_x"], "obscure_genre_x")]
    #[case(&["travel", "cooking", "sports"], "cooking")]
    #[case(&[], "fiction")]
    fn test_primary_genre(#[case] genres: &[&str], #[case] expected: &str) {
        assert_eq!(primary_genre(genres), expected);
    }

    #[test]
    fn test_primary_genre_accepts_sets() {
        let genres = BTreeSet::from(["horror".to_string(), "thriller".to_string()]);
        assert_eq!(primary_genre(&genres), "thriller");
    }
}
