//! Static genre vocabulary.
//!
//! Catalog sources (library subject headings, bookseller categories, user
//! tags) describe the same genre in dozens of ways. These tables collapse that
//! noise into a small, closed vocabulary of lowercase canonical genres.
//!
//! Lookup happens in three tiers (see [`normalize_genre`](crate::normalize_genre)):
//! the canonical whitelist, then exact aliases, then substring keywords.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Genre used when a book has no recognisable genre at all.
pub const DEFAULT_GENRE: &str = "fiction";

/// Maximum number of genres kept per book unless configured otherwise.
pub const DEFAULT_MAX_GENRES: usize = 5;

/// The closed vocabulary every normalized genre belongs to.
pub(crate) const CANONICAL_GENRES: &[&str] = &[
    "fiction",
    "nonfiction",
    "fantasy",
    "science fiction",
    "mystery",
    "thriller",
    "horror",
    "romance",
    "historical fiction",
    "literary fiction",
    "classics",
    "young adult",
    "children's fiction",
    "contemporary fiction",
    "dystopian",
    "paranormal",
    "adventure",
    "crime",
    "true crime",
    "western",
    "war",
    "humor",
    "poetry",
    "drama",
    "short stories",
    "graphic novels",
    "fairy tales",
    "mythology",
    "biography",
    "memoir",
    "history",
    "philosophy",
    "psychology",
    "religion",
    "science",
    "self-help",
    "business",
    "politics",
    "travel",
    "cooking",
    "art",
    "music",
    "essays",
    "nature",
    "sports",
];

/// Genres that win the "primary genre" slot, most important first.
pub(crate) const PRIMARY_GENRE_PRIORITY: &[&str] = &[
    "fantasy",
    "science fiction",
    "mystery",
    "thriller",
    "horror",
    "romance",
    "historical fiction",
    "literary fiction",
    "classics",
    "young adult",
    "children's fiction",
];

/// Substring keywords, consulted only when neither the whitelist nor the alias
/// table matched.
///
/// **Order matters**: the first keyword contained in the subject wins. More
/// specific phrases must be declared before the generic phrases they contain
/// ("nonfiction" before "fiction", "autobiograph" before "biograph", "science
/// fiction" before "science"). Genre keywords otherwise follow the primary
/// genre priority, so "historical mystery fiction" resolves to mystery.
pub(crate) const GENRE_KEYWORDS: &[(&str, &str)] = &[
    ("science fiction", "science fiction"),
    ("sci-fi", "science fiction"),
    ("space opera", "science fiction"),
    ("time travel", "science fiction"),
    ("robots", "science fiction"),
    ("fantasy", "fantasy"),
    ("magic", "fantasy"),
    ("dragons", "fantasy"),
    ("wizard", "fantasy"),
    ("mystery", "mystery"),
    ("detective", "mystery"),
    ("whodunit", "mystery"),
    ("thriller", "thriller"),
    ("suspense", "thriller"),
    ("espionage", "thriller"),
    ("spy stor", "thriller"),
    ("spies", "thriller"),
    ("horror", "horror"),
    ("ghost", "horror"),
    ("haunted", "horror"),
    ("romance", "romance"),
    ("love stor", "romance"),
    ("historical fiction", "historical fiction"),
    ("historical", "historical fiction"),
    ("literary fiction", "literary fiction"),
    ("classic", "classics"),
    ("young adult", "young adult"),
    ("teen fiction", "young adult"),
    ("teenage", "young adult"),
    ("juvenile", "children's fiction"),
    ("children", "children's fiction"),
    ("dystopia", "dystopian"),
    ("apocalyp", "dystopian"),
    ("vampire", "paranormal"),
    ("werewol", "paranormal"),
    ("supernatural", "paranormal"),
    ("paranormal", "paranormal"),
    ("adventure", "adventure"),
    ("true crime", "true crime"),
    ("crime", "crime"),
    ("western", "western"),
    ("world war", "war"),
    ("military", "war"),
    ("humor", "humor"),
    ("humour", "humor"),
    ("comedy", "humor"),
    ("graphic novel", "graphic novels"),
    ("comics", "graphic novels"),
    ("manga", "graphic novels"),
    ("poetry", "poetry"),
    ("poems", "poetry"),
    ("drama", "drama"),
    ("playwright", "drama"),
    ("theater", "drama"),
    ("theatre", "drama"),
    ("short stor", "short stories"),
    ("fairy tale", "fairy tales"),
    ("folklore", "fairy tales"),
    ("mytholog", "mythology"),
    ("myths", "mythology"),
    ("autobiograph", "memoir"),
    ("memoir", "memoir"),
    ("biograph", "biography"),
    ("philosoph", "philosophy"),
    ("psycholog", "psychology"),
    ("religio", "religion"),
    ("christian", "religion"),
    ("spiritual", "religion"),
    ("self-help", "self-help"),
    ("self help", "self-help"),
    ("business", "business"),
    ("econom", "business"),
    ("politic", "politics"),
    ("travel", "travel"),
    ("cookery", "cooking"),
    ("cooking", "cooking"),
    ("cookbook", "cooking"),
    ("essays", "essays"),
    ("fine arts", "art"),
    ("painting", "art"),
    ("music", "music"),
    ("nature", "nature"),
    ("sports", "sports"),
    ("athlet", "sports"),
    ("science", "science"),
    ("history", "history"),
    ("nonfiction", "nonfiction"),
    ("non-fiction", "nonfiction"),
    ("fiction", "fiction"),
];

/// Fast membership check for [`CANONICAL_GENRES`].
pub(crate) static CANONICAL: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| CANONICAL_GENRES.iter().copied().collect());

/// Exact (lowercase, trimmed) variant phrases mapped to their canonical genre.
pub(crate) static GENRE_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // Science fiction
        ("sci-fi", "science fiction"),
        ("scifi", "science fiction"),
        ("sf", "science fiction"),
        ("science-fiction", "science fiction"),
        ("speculative fiction", "science fiction"),
        ("fiction, science fiction", "science fiction"),
        ("fiction, science fiction, general", "science fiction"),
        ("science fiction & fantasy", "science fiction"),
        // Fantasy
        ("fantasy fiction", "fantasy"),
        ("fiction, fantasy", "fantasy"),
        ("fiction, fantasy, general", "fantasy"),
        ("fiction, fantasy, epic", "fantasy"),
        ("epic fantasy", "fantasy"),
        ("high fantasy", "fantasy"),
        ("urban fantasy", "fantasy"),
        ("sword and sorcery", "fantasy"),
        // Mystery
        ("detective and mystery stories", "mystery"),
        ("mystery fiction", "mystery"),
        ("detective fiction", "mystery"),
        ("cozy mystery", "mystery"),
        ("whodunits", "mystery"),
        ("fiction, mystery & detective, general", "mystery"),
        // Thriller
        ("thrillers", "thriller"),
        ("suspense", "thriller"),
        ("suspense fiction", "thriller"),
        ("psychological thriller", "thriller"),
        ("spy stories", "thriller"),
        ("fiction, thrillers, general", "thriller"),
        // Horror
        ("ghost stories", "horror"),
        ("horror fiction", "horror"),
        ("horror tales", "horror"),
        ("gothic fiction", "horror"),
        // Romance
        ("love stories", "romance"),
        ("romance fiction", "romance"),
        ("romantic fiction", "romance"),
        ("fiction, romance, general", "romance"),
        ("chick lit", "romance"),
        // Historical fiction
        ("historical novel", "historical fiction"),
        ("historical novels", "historical fiction"),
        ("fiction, historical", "historical fiction"),
        ("fiction, historical, general", "historical fiction"),
        // Literary fiction
        ("literary", "literary fiction"),
        ("literature", "literary fiction"),
        ("fiction, literary", "literary fiction"),
        // Classics
        ("classic", "classics"),
        ("classic literature", "classics"),
        ("classic fiction", "classics"),
        // Young adult
        ("ya", "young adult"),
        ("ya fiction", "young adult"),
        ("young adult fiction", "young adult"),
        ("teen", "young adult"),
        // Children's fiction
        ("juvenile fiction", "children's fiction"),
        ("children's stories", "children's fiction"),
        ("children's literature", "children's fiction"),
        ("picture books", "children's fiction"),
        ("kids", "children's fiction"),
        // Contemporary fiction
        ("contemporary", "contemporary fiction"),
        ("general fiction", "contemporary fiction"),
        ("fiction, general", "contemporary fiction"),
        // Nonfiction
        ("non-fiction", "nonfiction"),
        ("non fiction", "nonfiction"),
        // Dystopian
        ("dystopia", "dystopian"),
        ("dystopias", "dystopian"),
        ("post-apocalyptic", "dystopian"),
        // Paranormal
        ("vampires", "paranormal"),
        ("werewolves", "paranormal"),
        ("supernatural", "paranormal"),
        // Adventure
        ("action & adventure", "adventure"),
        ("adventure stories", "adventure"),
        ("sea stories", "adventure"),
        // Crime
        ("crime fiction", "crime"),
        ("noir", "crime"),
        // Western
        ("westerns", "western"),
        ("western stories", "western"),
        // War
        ("war stories", "war"),
        ("war fiction", "war"),
        ("military fiction", "war"),
        // Humor
        ("humour", "humor"),
        ("comedy", "humor"),
        ("satire", "humor"),
        ("humorous stories", "humor"),
        ("wit and humor", "humor"),
        // Poetry and drama
        ("poems", "poetry"),
        ("verse", "poetry"),
        ("plays", "drama"),
        ("theatre", "drama"),
        // Short stories
        ("short story", "short stories"),
        ("anthologies", "short stories"),
        // Graphic novels
        ("comics", "graphic novels"),
        ("manga", "graphic novels"),
        ("graphic novel", "graphic novels"),
        ("comic books, strips, etc.", "graphic novels"),
        // Folklore and myth
        ("folk tales", "fairy tales"),
        ("folklore", "fairy tales"),
        ("myths", "mythology"),
        ("legends", "mythology"),
        // Lives
        ("biographies", "biography"),
        ("biography & autobiography", "biography"),
        ("autobiography", "memoir"),
        ("memoirs", "memoir"),
        ("diaries", "memoir"),
        // Everything else
        ("world history", "history"),
        ("ethics", "philosophy"),
        ("spirituality", "religion"),
        ("christianity", "religion"),
        ("popular science", "science"),
        ("self help", "self-help"),
        ("personal development", "self-help"),
        ("economics", "business"),
        ("political science", "politics"),
        ("travel writing", "travel"),
        ("cookbooks", "cooking"),
        ("cookery", "cooking"),
    ])
});
