use std::sync::Arc;

use tracing::{error, info};
use url::Url;

use crate::config::CatalogConfig;
use crate::error::{ConfigError, FetchError};
use crate::mapping::parse_movie_list;
use crate::model::MovieRecord;
use crate::ranking::RankingKind;
use crate::transport::{HttpTransport, Transport};

pub const API_KEY_PARAM: &str = "api_key";

/// Builds ranking requests, runs them, and maps the payload into records.
/// Holds no state between calls.
#[derive(Clone)]
pub struct CatalogFetcher {
    base_url: Url,
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for CatalogFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogFetcher").field("base_url", &self.base_url.as_str()).finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] FetchError),
}

impl CatalogFetcher {
    /// HTTP-backed fetcher. Fails when no credential is configured.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, BuildError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(config, Arc::new(transport))?)
    }

    pub fn with_transport(config: &CatalogConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.credential()?.to_string(),
            transport,
        })
    }

    /// `{base}{ranking path}?api_key={credential}`.
    pub fn ranking_url(&self, kind: RankingKind) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        // Only the credential goes in the query.
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(kind.path().split('/').filter(|s| !s.is_empty()));
        url.query_pairs_mut().append_pair(API_KEY_PARAM, &self.api_key);
        Ok(url)
    }

    /// Same as [`ranking_url`](Self::ranking_url) with the credential masked, for display.
    pub fn redacted_ranking_url(&self, kind: RankingKind) -> Result<Url, FetchError> {
        let mut url = self.ranking_url(kind)?;
        url.query_pairs_mut().clear().append_pair(API_KEY_PARAM, "***");
        Ok(url)
    }

    /// Fetch and parse one ranking, reporting transport and payload failures.
    /// Malformed elements are skipped, not reported.
    pub async fn try_fetch_ranking(&self, kind: RankingKind) -> Result<Vec<MovieRecord>, FetchError> {
        let url = self.ranking_url(kind)?;
        let body = self.transport.get_text(&url).await?;
        parse_movie_list(&body)
    }

    /// Fetch one ranking; every whole-fetch failure is logged and yields an empty list.
    pub async fn fetch_ranking(&self, kind: RankingKind) -> Vec<MovieRecord> {
        match self.try_fetch_ranking(kind).await {
            Ok(list) => {
                info!(ranking = %kind, count = list.len(), "fetched ranking");
                list
            }
            Err(e) => {
                error!(ranking = %kind, error = %e, "could not fetch ranking");
                Vec::new()
            }
        }
    }
}
