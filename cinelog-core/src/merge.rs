//! Reconciles a catalog record with a freshly fetched metadata payload.
//!
//! Two policies: force-overwrite (manual one-shot refresh) replaces every
//! field the payload carries; fill-gaps (bulk sweep) only writes fields
//! the record does not have yet. Either way the caller gets back the list
//! of fields actually changed, so persistence can stay partial.

use cinelog_model::{MetadataPayload, MovieField, MovieRecord};

/// Apply `payload` to `movie` under the given policy and return the
/// fields that changed, in a fixed order.
///
/// An absent payload value (`None`, or a blank string) never touches the
/// record. Numeric zero is a present value: `public_votes = 0` fills an
/// empty field like any other count would.
pub fn apply_metadata(
    movie: &mut MovieRecord,
    payload: &MetadataPayload,
    overwrite: bool,
) -> Vec<MovieField> {
    let mut changed = Vec::new();

    if let Some(url) = present(&payload.poster_url)
        && (overwrite || vacant(&movie.poster_url))
    {
        movie.poster_url = Some(url.to_string());
        changed.push(MovieField::PosterUrl);
    }

    if let Some(overview) = present(&payload.overview)
        && (overwrite || vacant(&movie.overview))
    {
        movie.overview = Some(overview.to_string());
        changed.push(MovieField::Overview);
    }

    if let Some(year) = payload.year
        && (overwrite || movie.year.is_none())
    {
        movie.year = Some(year);
        changed.push(MovieField::Year);
    }

    if let Some(director) = present(&payload.director)
        && (overwrite || vacant(&movie.director))
    {
        movie.director = Some(director.to_string());
        changed.push(MovieField::Director);
    }

    if let Some(genres) = present(&payload.genres)
        && (overwrite || vacant(&movie.genre))
    {
        movie.genre = Some(genres.to_string());
        changed.push(MovieField::Genre);
    }

    if let Some(id) = present(&payload.external_id)
        && (overwrite || vacant(&movie.external_id))
    {
        movie.external_id = Some(id.to_string());
        changed.push(MovieField::ExternalId);
    }

    if let Some(rating) = payload.public_rating
        && (overwrite || movie.public_rating.is_none())
    {
        movie.public_rating = Some(rating);
        changed.push(MovieField::PublicRating);
    }

    if let Some(votes) = payload.public_votes
        && (overwrite || movie.public_votes.is_none())
    {
        movie.public_votes = Some(votes);
        changed.push(MovieField::PublicVotes);
    }

    if let Some(rating) = payload.critic_rating
        && (overwrite || movie.critic_rating.is_none())
    {
        movie.critic_rating = Some(rating);
        changed.push(MovieField::CriticRating);
    }

    if let Some(source) = present(&payload.critic_source)
        && (overwrite || vacant(&movie.critic_source))
    {
        movie.critic_source = Some(source.to_string());
        changed.push(MovieField::CriticSource);
    }

    if let Some(votes) = payload.critic_votes
        && (overwrite || movie.critic_votes.is_none())
    {
        movie.critic_votes = Some(votes);
        changed.push(MovieField::CriticVotes);
    }

    changed
}

/// Payload string with content, if any.
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// A record string field counts as empty when missing or blank.
fn vacant(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}
