use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::{MetadataSource, ProviderError};
use cinelog_model::MetadataPayload;

const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// TMDB-backed metadata source: title search, then a details+credits
/// call for genres, director, votes, and the IMDb cross-reference.
#[derive(Debug, Clone)]
pub struct TmdbProvider {
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    results: Vec<TmdbSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResult {
    id: u32,
    release_date: Option<String>,
    poster_path: Option<String>,
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    imdb_id: Option<String>,
    overview: Option<String>,
    genres: Vec<TmdbGenre>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
    credits: Option<TmdbCredits>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    crew: Vec<TmdbCrew>,
}

#[derive(Debug, Deserialize)]
struct TmdbCrew {
    name: String,
    job: String,
}

impl TmdbProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    async fn fetch_details(&self, movie_id: u32) -> Result<TmdbMovieDetails, ProviderError> {
        let url = format!("{TMDB_API_BASE}/movie/{movie_id}");
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "credits"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "TMDB details returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MetadataSource for TmdbProvider {
    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<Option<MetadataPayload>, ProviderError> {
        tracing::debug!("TMDB search for {:?} ({:?})", title, year);

        let mut params = vec![
            ("api_key", self.api_key.to_string()),
            ("query", title.to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }

        let url = format!("{TMDB_API_BASE}/search/movie");
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(&params)
            .send()
            .await?;

        if response.status() == 401 {
            return Err(ProviderError::InvalidApiKey);
        }
        if response.status() == 429 {
            return Err(ProviderError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "TMDB API returned status: {}",
                response.status()
            )));
        }

        let search: TmdbSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let Some(hit) = search.results.into_iter().next() else {
            tracing::debug!("TMDB search for {:?} returned no results", title);
            return Ok(None);
        };

        let mut payload = MetadataPayload {
            poster_url: hit
                .poster_path
                .map(|path| format!("{TMDB_IMAGE_BASE}{path}")),
            overview: non_blank(hit.overview),
            year: hit.release_date.as_deref().and_then(year_from_release_date),
            ..MetadataPayload::default()
        };

        // A failed details call degrades to the base search fields
        // rather than failing the lookup.
        match self.fetch_details(hit.id).await {
            Ok(details) => {
                payload.genres = join_genres(&details.genres);
                payload.director = details.credits.as_ref().and_then(director_from_crew);
                payload.public_rating = details.vote_average;
                payload.public_votes = details.vote_count;
                payload.external_id = non_blank(details.imdb_id);
                if payload.overview.is_none() {
                    payload.overview = non_blank(details.overview);
                }
            }
            Err(e) => {
                tracing::warn!("TMDB details lookup failed for {:?}: {}", title, e);
            }
        }

        Ok(Some(payload))
    }

    fn name(&self) -> &'static str {
        "TMDB"
    }
}

fn year_from_release_date(date: &str) -> Option<u16> {
    date.get(..4)?.parse().ok()
}

fn join_genres(genres: &[TmdbGenre]) -> Option<String> {
    if genres.is_empty() {
        return None;
    }
    Some(
        genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn director_from_crew(credits: &TmdbCredits) -> Option<String> {
    credits
        .crew
        .iter()
        .find(|person| person.job == "Director")
        .map(|person| person.name.clone())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
