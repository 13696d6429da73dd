pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod mapping;
pub mod model;
pub mod ranking;
pub mod session;
pub mod transport;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::config::CatalogConfig;
    pub use crate::error::{ConfigError, ElementError, FetchError};
    pub use crate::fetcher::CatalogFetcher;
    pub use crate::model::MovieRecord;
    pub use crate::ranking::RankingKind;
    pub use crate::session::{FetchStatus, GridSession, MovieList};
}

use std::path::Path;

use anyhow::{Context, Result};

use crate::prelude::*;

/// Load configuration (file + environment) and build an HTTP-backed fetcher.
pub fn connect(config_path: Option<&Path>) -> Result<CatalogFetcher> {
    let config = CatalogConfig::load(config_path).context("loading catalog configuration")?;
    CatalogFetcher::from_config(&config).context("building catalog fetcher")
}

/// Load configuration and start a grid session with no fetch in flight.
pub fn open_session(config_path: Option<&Path>) -> Result<GridSession> {
    Ok(GridSession::new(connect(config_path)?))
}
