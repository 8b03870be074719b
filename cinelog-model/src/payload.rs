use serde::{Deserialize, Serialize};

/// Ephemeral result of a provider lookup.
///
/// Never persisted as-is: individual fields are copied into a
/// [`MovieRecord`](crate::MovieRecord) by the merge policy, which treats
/// `None` (and blank strings) as "nothing fetched" for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataPayload {
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    pub year: Option<u16>,
    pub director: Option<String>,
    /// Comma-joined genre list, e.g. "Drama, Thriller".
    pub genres: Option<String>,
    pub public_rating: Option<f32>,
    pub public_votes: Option<u32>,
    pub critic_rating: Option<f32>,
    pub critic_source: Option<String>,
    pub critic_votes: Option<u32>,
    pub external_id: Option<String>,
}

impl MetadataPayload {
    /// True when the lookup produced nothing usable.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
