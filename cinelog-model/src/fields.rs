use serde::{Deserialize, Serialize};
use std::fmt;

/// The record fields the metadata merge may touch.
///
/// Sweeps persist only the fields they actually changed, so stores take a
/// `&[MovieField]` rather than rewriting whole records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieField {
    PosterUrl,
    Overview,
    Year,
    Director,
    Genre,
    ExternalId,
    PublicRating,
    PublicVotes,
    CriticRating,
    CriticSource,
    CriticVotes,
}

impl MovieField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieField::PosterUrl => "poster_url",
            MovieField::Overview => "overview",
            MovieField::Year => "year",
            MovieField::Director => "director",
            MovieField::Genre => "genre",
            MovieField::ExternalId => "external_id",
            MovieField::PublicRating => "public_rating",
            MovieField::PublicVotes => "public_votes",
            MovieField::CriticRating => "critic_rating",
            MovieField::CriticSource => "critic_source",
            MovieField::CriticVotes => "critic_votes",
        }
    }
}

impl fmt::Display for MovieField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
