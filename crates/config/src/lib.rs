//! Configuration loading and validation.
//!
//! Settings are merged from three layers, later layers winning:
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, chosen by extension),
//! 3. environment variables prefixed with `FOLIO_`, using `__` to reach
//!    nested keys (`FOLIO_GENRES__MAX_GENRES=3`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "FOLIO_";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "folio.db";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "folio")
}

/// Settings for genre classification during catalog imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreConfig {
    /// Upper bound on the genres stored per book.
    pub max_genres: usize,
    /// Primary genre of books whose subjects match no genre at all.
    pub default_genre: String,
}
impl Default for GenreConfig {
    fn default() -> Self {
        Self {
            max_genres: folio_genre::DEFAULT_MAX_GENRES,
            default_genre: folio_genre::DEFAULT_GENRE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the SQLite database; created on first use.
    pub database: PathBuf,
    pub genres: GenreConfig,
}
impl Default for Config {
    fn default() -> Self {
        let database = project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE));
        Self { database, genres: GenreConfig::default() }
    }
}

impl Config {
    /// Where [`Config::load`] looks for a configuration file when none is
    /// given.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = project_dirs().ok_or_raise(|| ErrorKind::NoHomeDirectory)?;
        Ok(dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load and validate the configuration.
    ///
    /// An explicit `path` must exist. Without one, the file at
    /// [`Config::default_path`] is used if it exists, and skipped otherwise.
    #[instrument(level = "debug")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => match Self::default_path() {
                Ok(path) if path.is_file() => Some(path),
                Ok(_) => None,
                Err(err) => {
                    debug!("skipping configuration file: {err}");
                    None
                },
            },
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            debug!(path = %file.display(), "loading configuration file");
            figment = figment.merge(file_provider(&file)?);
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate the configuration from custom sources.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but can't be used.
    pub fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database path must not be empty"));
        }
        if self.genres.max_genres == 0 {
            exn::bail!(ErrorKind::Invalid("genres.max_genres must be at least 1"));
        }
        if folio_genre::normalize_genre(&self.genres.default_genre).is_none() {
            exn::bail!(ErrorKind::Invalid("genres.default_genre is not a known genre"));
        }
        Ok(())
    }
}

fn file_provider(path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => Figment::from(Toml::file(path)),
        Some("yaml" | "yml") => Figment::from(Yaml::file(path)),
        Some("json") => Figment::from(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}
