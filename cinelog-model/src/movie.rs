use serde::{Deserialize, Serialize};

/// A single catalog entry.
///
/// Records are created either by a filesystem scan (minimal fields plus
/// file information) or by a spreadsheet import (title always present,
/// no file yet). Metadata sweeps and manual edits mutate them afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Store-assigned id; 0 until the record has been inserted.
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub year: Option<u16>,
    /// Possibly a comma-joined list, e.g. "Drama, Thriller".
    pub genre: Option<String>,
    pub director: Option<String>,
    #[serde(default)]
    pub watched: bool,
    /// User-assigned rating, 1-10.
    pub rating: Option<f32>,
    /// Aggregate score from the primary metadata provider.
    pub public_rating: Option<f32>,
    pub public_votes: Option<u32>,
    /// Critic score from the secondary provider (e.g. Metascore, 0-10).
    pub critic_rating: Option<f32>,
    pub critic_source: Option<String>,
    pub critic_votes: Option<u32>,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    /// Cross-reference id at an external database (IMDb-style).
    pub external_id: Option<String>,
    /// Absolute path on disk. Present and unique for scanned records,
    /// absent for imported titles until a file is linked.
    pub file_path: Option<String>,
    pub file_size_mb: Option<f64>,
    pub codec: Option<String>,
    /// Lower-cased extension including the dot, e.g. ".mkv".
    pub extension: Option<String>,
}

impl MovieRecord {
    /// Minimal record carrying just a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// "Title (Year)" when the year is known, bare title otherwise.
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({year})", self.title),
            None => self.title.clone(),
        }
    }
}
