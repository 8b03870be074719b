use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::{MetadataSource, ProviderError, RatingsSource};
use cinelog_model::MetadataPayload;

const OMDB_API_BASE: &str = "https://www.omdbapi.com/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// OMDb-backed provider. Serves two roles: full title search (used by
/// the bulk import) and a by-IMDb-id lookup that yields the Metascore
/// critic rating scaled to 0-10.
#[derive(Debug, Clone)]
pub struct OmdbProvider {
    api_key: String,
    client: Client,
}

/// OMDb answers with `Response: "False"` and HTTP 200 for misses; absent
/// fields come back as the literal string "N/A".
#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    imdb_votes: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Metascore")]
    metascore: Option<String>,
}

impl OmdbProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Option<OmdbResponse>, ProviderError> {
        let response = self
            .client
            .get(OMDB_API_BASE)
            .timeout(REQUEST_TIMEOUT)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if response.status() == 401 {
            return Err(ProviderError::InvalidApiKey);
        }
        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "OMDb API returned status: {}",
                response.status()
            )));
        }

        let body: OmdbResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if body.response != "True" {
            return Ok(None);
        }
        Ok(Some(body))
    }
}

#[async_trait]
impl MetadataSource for OmdbProvider {
    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<Option<MetadataPayload>, ProviderError> {
        tracing::debug!("OMDb search for {:?} ({:?})", title, year);

        let year_str = year.map(|y| y.to_string());
        let mut params = vec![("t", title), ("type", "movie")];
        if let Some(y) = &year_str {
            params.push(("y", y));
        }

        let Some(body) = self.query(&params).await? else {
            return Ok(None);
        };

        let critic_rating = metascore_to_rating(body.metascore.as_deref());
        Ok(Some(MetadataPayload {
            poster_url: clean(body.poster),
            overview: clean(body.plot),
            year: clean(body.year).as_deref().and_then(parse_year),
            director: clean(body.director),
            genres: clean(body.genre),
            public_rating: clean(body.imdb_rating).and_then(|r| r.parse().ok()),
            public_votes: clean(body.imdb_votes).as_deref().and_then(parse_votes),
            critic_source: critic_rating.map(|_| "Metascore".to_string()),
            critic_rating,
            critic_votes: None,
            external_id: clean(body.imdb_id),
        }))
    }

    fn name(&self) -> &'static str {
        "OMDb"
    }
}

#[async_trait]
impl RatingsSource for OmdbProvider {
    async fn lookup_by_id(
        &self,
        external_id: &str,
    ) -> Result<Option<MetadataPayload>, ProviderError> {
        tracing::debug!("OMDb ratings lookup for {}", external_id);

        let Some(body) = self.query(&[("i", external_id)]).await? else {
            return Ok(None);
        };

        let critic_rating = metascore_to_rating(body.metascore.as_deref());
        // Only the critic trio; OMDb has no critic vote count.
        Ok(Some(MetadataPayload {
            critic_source: critic_rating.map(|_| "Metascore".to_string()),
            critic_rating,
            critic_votes: None,
            ..MetadataPayload::default()
        }))
    }

    fn name(&self) -> &'static str {
        "OMDb"
    }
}

/// Drop blank and "N/A" values.
fn clean(value: Option<String>) -> Option<String> {
    value.filter(|s| {
        let s = s.trim();
        !s.is_empty() && s != "N/A"
    })
}

/// Metascore is 0-100; the catalog stores critic ratings on a 0-10 scale.
fn metascore_to_rating(metascore: Option<&str>) -> Option<f32> {
    let raw = metascore?.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<f32>().ok().map(|score| score / 10.0)
}

/// OMDb year can be a range like "2009-2012"; the first 4 chars decide.
fn parse_year(year: &str) -> Option<u16> {
    year.get(..4)?.parse().ok()
}

/// Vote counts arrive formatted, e.g. "1,234,567".
fn parse_votes(votes: &str) -> Option<u32> {
    votes.replace(',', "").parse().ok()
}
