//! Configuration loading for the cinelog catalog.
//!
//! A single [`Config`] struct covers the catalog snapshot location, the
//! library folder to scan, provider API keys, and listing defaults.
//! Values come from an optional TOML/JSON file with environment
//! variables layered on top, so a bare `TMDB_API_KEY=... cinelogctl`
//! works without any file at all.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Source that produced the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    File(PathBuf),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Path of the JSON catalog snapshot.
    pub catalog_path: PathBuf,
    /// Folder scanned for video files when no path is given on the
    /// command line.
    pub library_root: Option<PathBuf>,
    /// Primary metadata provider key (TMDB).
    pub tmdb_api_key: Option<String>,
    /// Critic-ratings provider key (OMDb).
    pub omdb_api_key: Option<String>,
    /// Movies per page in listings.
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("catalog.json"),
            library_root: None,
            tmdb_api_key: None,
            omdb_api_key: None,
            page_size: 24,
        }
    }
}

impl Config {
    /// Load configuration. Evaluation order:
    /// 1) `$CINELOG_CONFIG_PATH` (TOML or JSON file),
    /// 2) the first of `cinelog.toml` / `config/cinelog.toml` that exists,
    /// 3) defaults.
    /// Environment variables are applied on top in every case.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        let (mut config, source) = if let Ok(path_str) = env::var("CINELOG_CONFIG_PATH")
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            (Self::load_from_file(&path)?, ConfigSource::EnvPath(path))
        } else if let Some(path) = Self::find_default_file() {
            (Self::load_from_file(&path)?, ConfigSource::File(path))
        } else {
            (Self::default(), ConfigSource::Default)
        };

        config.apply_env_overrides();
        Ok((config, source))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .map_err(|err| anyhow!("invalid config {}: {}", path.display(), err)),
            _ => toml::from_str(&contents)
                .map_err(|err| anyhow!("invalid config {}: {}", path.display(), err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(key) = env_value("TMDB_API_KEY") {
            self.tmdb_api_key = Some(key);
        }
        if let Some(key) = env_value("OMDB_API_KEY") {
            self.omdb_api_key = Some(key);
        }
        if let Some(root) = env_value("CINELOG_LIBRARY_ROOT") {
            self.library_root = Some(PathBuf::from(root));
        }
        if let Some(path) = env_value("CINELOG_CATALOG") {
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(size) = env_value("CINELOG_PAGE_SIZE")
            && let Ok(parsed) = size.parse()
        {
            self.page_size = parsed;
        }
        // Keys left at their .env placeholder behave as unset.
        self.tmdb_api_key = self.tmdb_api_key.take().filter(|k| is_real_key(k));
        self.omdb_api_key = self.omdb_api_key.take().filter(|k| is_real_key(k));
    }

    fn find_default_file() -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &["cinelog.toml", "config/cinelog.toml"];

        CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(|path| path.to_path_buf())
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn is_real_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !key.starts_with("your_") && key != "changeme"
}
