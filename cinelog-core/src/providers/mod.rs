pub mod omdb;
pub mod tmdb;
pub mod traits;

pub use omdb::OmdbProvider;
pub use tmdb::TmdbProvider;
pub use traits::{MetadataSource, ProviderError, RatingsSource};

#[cfg(test)]
pub use traits::{MockMetadataSource, MockRatingsSource};
