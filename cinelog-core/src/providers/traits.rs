use async_trait::async_trait;
use cinelog_model::MetadataPayload;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Primary metadata database, searched by title.
///
/// "Nothing found" is `Ok(None)`; errors are real transport or API
/// failures. Sweeps treat both the same way (no metadata for this
/// record), but callers that want to distinguish can.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<Option<MetadataPayload>, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Secondary provider queried by external id for critic-style ratings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingsSource: Send + Sync {
    async fn lookup_by_id(
        &self,
        external_id: &str,
    ) -> Result<Option<MetadataPayload>, ProviderError>;

    fn name(&self) -> &'static str;
}
