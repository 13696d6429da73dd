//! Flutter bridge for the cinegrid library API.
//! Exposes one grid screen as a thin async wrapper suitable for flutter_rust_bridge.

use std::path::PathBuf;

use anyhow::{Context, Result};
use flutter_rust_bridge::frb;
use tracing::debug;

use cinegrid::prelude::*;

#[frb(opaque)]
pub struct MovieGridBridge {
    // No outer lock: teardown and status must not wait behind a pending refresh.
    session: GridSession,
}

impl MovieGridBridge {
    /// Load configuration (optional file path, then `CINEGRID_*` env) and open a session.
    pub fn new(config_path: Option<String>) -> Result<Self> {
        cinegrid::logging::init();
        let session = cinegrid::open_session(config_path.map(PathBuf::from).as_deref())?;
        Ok(Self { session })
    }

    /// Begin loading `kind` in the background, replacing any fetch in flight.
    pub async fn start(&self, kind: String) -> Result<()> {
        let kind = parse_kind(&kind)?;
        debug!(ranking = %kind, "screen start");
        self.session.start(kind);
        Ok(())
    }

    /// Load `kind` and wait for the result. Resolves with `Cancelled` if the
    /// screen is torn down first.
    pub async fn refresh(&self, kind: String) -> Result<FetchStatus> {
        let kind = parse_kind(&kind)?;
        Ok(self.session.refresh(kind).await)
    }

    #[frb(sync)]
    pub fn status(&self) -> FetchStatus { self.session.status() }

    #[frb(sync)]
    pub fn movies(&self) -> Vec<MovieRecord> { self.session.list().snapshot().to_vec() }

    #[frb(sync)]
    pub fn movies_json(&self) -> Result<String> {
        serde_json::to_string(&*self.session.list().snapshot()).context("serializing movie list")
    }

    /// The record for the details view; `None` if the index is past the list.
    #[frb(sync)]
    pub fn select(&self, index: usize) -> Option<MovieRecord> { self.session.select(index) }

    /// Screen torn down: cancel anything still loading.
    #[frb(sync)]
    pub fn teardown(&self) { self.session.teardown(); }
}

fn parse_kind(kind: &str) -> Result<RankingKind> {
    if kind.trim().is_empty() {
        return Ok(RankingKind::default());
    }
    kind.parse::<RankingKind>().map_err(Into::into)
}
