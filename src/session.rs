//! Screen-level fetch lifecycle.
//!
//! A [`GridSession`] owns the list a grid renders from. Each started fetch runs
//! on its own tokio task; its result is assigned to the list exactly once, and
//! only if the session has not been torn down or restarted in the meantime.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::{Deserialize, Serialize};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info};

use crate::fetcher::CatalogFetcher;
use crate::model::MovieRecord;
use crate::ranking::RankingKind;

/// Caller-owned handle to the last fetched list. Clones share the list.
///
/// Updates replace the whole list; readers hold a snapshot that never changes.
#[derive(Debug, Clone, Default)]
pub struct MovieList {
    inner: Arc<RwLock<Arc<[MovieRecord]>>>,
}

impl MovieList {
    pub fn new() -> Self { Self::default() }

    pub fn replace(&self, records: Vec<MovieRecord>) {
        let next: Arc<[MovieRecord]> = records.into();
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = next;
    }

    pub fn snapshot(&self) -> Arc<[MovieRecord]> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize { self.snapshot().len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// The record at `index`, by value, for a details view.
    pub fn get(&self, index: usize) -> Option<MovieRecord> { self.snapshot().get(index).cloned() }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum FetchStatus {
    Idle,
    Loading(RankingKind),
    Loaded(usize),
    Failed(String),
    Cancelled,
}

#[derive(Debug)]
struct SessionState {
    generation: u64,
    status: FetchStatus,
    abort: Option<AbortHandle>,
}

/// One grid screen: a fetcher, the list it fills, and at most one fetch in flight.
///
/// All methods take `&self` and only hold internal locks briefly, so
/// [`teardown`](Self::teardown) and [`status`](Self::status) never wait
/// behind a caller awaiting [`refresh`](Self::refresh).
pub struct GridSession {
    fetcher: CatalogFetcher,
    list: MovieList,
    state: Arc<Mutex<SessionState>>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl GridSession {
    pub fn new(fetcher: CatalogFetcher) -> Self {
        Self::with_list(fetcher, MovieList::new())
    }

    pub fn with_list(fetcher: CatalogFetcher, list: MovieList) -> Self {
        Self {
            fetcher,
            list,
            state: Arc::new(Mutex::new(SessionState { generation: 0, status: FetchStatus::Idle, abort: None })),
            join: Mutex::new(None),
        }
    }

    pub fn list(&self) -> &MovieList { &self.list }
    pub fn status(&self) -> FetchStatus { lock(&self.state).status.clone() }
    pub fn is_loading(&self) -> bool { matches!(self.status(), FetchStatus::Loading(_)) }

    /// Spawn a fetch for `kind` on the current tokio runtime, cancelling any fetch
    /// still in flight. Must be called from within a runtime.
    pub fn start(&self, kind: RankingKind) {
        let fetcher = self.fetcher.clone();
        let list = self.list.clone();
        let state = self.state.clone();

        let mut st = lock(&self.state);
        if let Some(prev) = st.abort.take() {
            prev.abort();
        }
        st.generation += 1;
        st.status = FetchStatus::Loading(kind);
        let generation = st.generation;
        debug!(ranking = %kind, generation, "starting ranking fetch");

        let handle = tokio::spawn(async move {
            let result = fetcher.try_fetch_ranking(kind).await;
            let mut st = lock(&state);
            if st.generation != generation {
                debug!(ranking = %kind, generation, "discarding superseded fetch result");
                return;
            }
            st.abort = None;
            st.status = match result {
                Ok(records) => {
                    info!(ranking = %kind, count = records.len(), "ranking loaded");
                    let count = records.len();
                    list.replace(records);
                    FetchStatus::Loaded(count)
                }
                Err(e) => {
                    error!(ranking = %kind, error = %e, "could not fetch ranking");
                    list.replace(Vec::new());
                    FetchStatus::Failed(e.to_string())
                }
            };
        });
        st.abort = Some(handle.abort_handle());
        drop(st);
        *lock_join(&self.join) = Some(handle);
    }

    /// Wait for the most recently started fetch, if any, and return the resulting status.
    /// Returns early with `Cancelled` if the session is torn down meanwhile.
    pub async fn wait(&self) -> FetchStatus {
        let handle = lock_join(&self.join).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!(error = %e, "ranking fetch task failed");
                }
            }
        }
        self.status()
    }

    /// Start a fetch and wait for it.
    pub async fn refresh(&self, kind: RankingKind) -> FetchStatus {
        self.start(kind);
        self.wait().await
    }

    pub fn select(&self, index: usize) -> Option<MovieRecord> { self.list.get(index) }

    /// Cancel any in-flight fetch. After this returns the list is not written
    /// again until the next [`start`](Self::start).
    pub fn teardown(&self) {
        let mut st = lock(&self.state);
        st.generation += 1;
        if let Some(handle) = st.abort.take() {
            handle.abort();
        }
        if matches!(st.status, FetchStatus::Loading(_)) {
            st.status = FetchStatus::Cancelled;
            info!("in-flight ranking fetch cancelled");
        }
    }
}

impl Drop for GridSession {
    fn drop(&mut self) { self.teardown(); }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn lock_join(join: &Mutex<Option<JoinHandle<()>>>) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    join.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::error::FetchError;
    use crate::fetcher::tests::{StubTransport, TWO_GOOD};
    use crate::transport::Transport;
    use async_trait::async_trait;
    use tokio::sync::Semaphore;
    use url::Url;

    /// Blocks every request until a permit is released.
    struct GatedTransport {
        gate: Semaphore,
        body: &'static str,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn get_text(&self, _url: &Url) -> Result<String, FetchError> {
            let _permit = self.gate.acquire().await.map_err(|_| FetchError::EmptyBody)?;
            Ok(self.body.to_string())
        }
    }

    fn session(transport: Arc<dyn Transport>) -> GridSession {
        GridSession::new(CatalogFetcher::with_transport(&CatalogConfig::new("k"), transport).unwrap())
    }

    #[tokio::test]
    async fn refresh_fills_list_and_selects_by_value() {
        let s = session(StubTransport::body(TWO_GOOD));
        assert_eq!(s.status(), FetchStatus::Idle);
        assert_eq!(s.refresh(RankingKind::TopRated).await, FetchStatus::Loaded(2));
        assert_eq!(s.list().len(), 2);

        let picked = s.select(1).unwrap();
        assert_eq!(picked.title, "The Shawshank Redemption");
        assert!(s.select(2).is_none());

        // The selected value is independent of later list replacements.
        s.list().replace(Vec::new());
        assert_eq!(picked.id, "278");
    }

    #[tokio::test]
    async fn failure_assigns_empty_list() {
        let s = session(StubTransport::body(TWO_GOOD));
        s.refresh(RankingKind::Popular).await;
        assert_eq!(s.list().len(), 2);

        let s2 = GridSession::with_list(
            CatalogFetcher::with_transport(&CatalogConfig::new("k"), StubTransport::failing(|| FetchError::Status(503))).unwrap(),
            s.list().clone(),
        );
        let status = s2.refresh(RankingKind::Popular).await;
        assert!(matches!(status, FetchStatus::Failed(ref msg) if msg.contains("503")));
        assert!(s.list().is_empty());
    }

    #[tokio::test]
    async fn snapshots_are_stable_across_replacement() {
        let s = session(StubTransport::body(TWO_GOOD));
        s.refresh(RankingKind::TopRated).await;
        let before = s.list().snapshot();
        s.list().replace(Vec::new());
        assert_eq!(before.len(), 2);
        assert!(s.list().snapshot().is_empty());
    }

    #[tokio::test]
    async fn teardown_cancels_before_completion() {
        let gated = Arc::new(GatedTransport { gate: Semaphore::new(0), body: TWO_GOOD });
        let s = session(gated.clone());
        s.start(RankingKind::TopRated);
        assert!(s.is_loading());
        tokio::task::yield_now().await;

        s.teardown();
        gated.gate.add_permits(1);
        tokio::task::yield_now().await;

        assert_eq!(s.status(), FetchStatus::Cancelled);
        assert!(s.list().is_empty());
        assert_eq!(s.wait().await, FetchStatus::Cancelled);
    }

    #[tokio::test]
    async fn restart_supersedes_previous_fetch() {
        let gated = Arc::new(GatedTransport { gate: Semaphore::new(0), body: TWO_GOOD });
        let s = session(gated.clone());
        s.start(RankingKind::Popular);
        tokio::task::yield_now().await;
        s.start(RankingKind::TopRated);
        assert_eq!(s.status(), FetchStatus::Loading(RankingKind::TopRated));

        gated.gate.add_permits(1);
        assert_eq!(s.wait().await, FetchStatus::Loaded(2));
    }

    #[tokio::test]
    async fn teardown_when_idle_keeps_status() {
        let s = session(StubTransport::body(TWO_GOOD));
        s.teardown();
        assert_eq!(s.status(), FetchStatus::Idle);
        s.refresh(RankingKind::TopRated).await;
        s.teardown();
        assert_eq!(s.status(), FetchStatus::Loaded(2));
        assert_eq!(s.list().len(), 2);
    }

    #[tokio::test]
    async fn teardown_releases_a_pending_refresh() {
        let gated = Arc::new(GatedTransport { gate: Semaphore::new(0), body: TWO_GOOD });
        let s = session(gated.clone());
        let (status, ()) = tokio::join!(s.refresh(RankingKind::Popular), async {
            tokio::task::yield_now().await;
            assert_eq!(s.status(), FetchStatus::Loading(RankingKind::Popular));
            s.teardown();
        });
        assert_eq!(status, FetchStatus::Cancelled);

        gated.gate.add_permits(1);
        tokio::task::yield_now().await;
        assert!(s.list().is_empty());
    }
}
