//! Scripted catalog for state machine tests.
//!
//! Each expected request gets a oneshot gate; the test decides when (and in
//! which order) replies are released.

use async_trait::async_trait;
use popcorn_catalog::{Catalog, CatalogError, CancellationToken};
use popcorn_models::{DetailRecord, SearchResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type SearchReply = Result<Vec<SearchResult>, CatalogError>;
pub type DetailReply = Result<DetailRecord, CatalogError>;

pub struct GatedCatalog {
    honor_cancel: bool,
    searches: Mutex<HashMap<String, oneshot::Receiver<SearchReply>>>,
    details: Mutex<HashMap<String, oneshot::Receiver<DetailReply>>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl GatedCatalog {
    /// A catalog that returns `Cancelled` as soon as the token fires.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with_cancel_policy(true))
    }

    /// A catalog that ignores cancellation, like a request already on the wire.
    pub fn ignoring_cancel() -> Arc<Self> {
        Arc::new(Self::with_cancel_policy(false))
    }

    fn with_cancel_policy(honor_cancel: bool) -> Self {
        Self {
            honor_cancel,
            searches: Mutex::new(HashMap::new()),
            details: Mutex::new(HashMap::new()),
            search_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    pub fn gate_search(&self, query: &str) -> oneshot::Sender<SearchReply> {
        let (tx, rx) = oneshot::channel();
        self.searches.lock().unwrap().insert(query.to_string(), rx);
        tx
    }

    pub fn gate_detail(&self, imdb_id: &str) -> oneshot::Sender<DetailReply> {
        let (tx, rx) = oneshot::channel();
        self.details.lock().unwrap().insert(imdb_id.to_string(), rx);
        tx
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    async fn wait<T>(
        &self,
        gate: Option<oneshot::Receiver<Result<T, CatalogError>>>,
        cancel: &CancellationToken,
    ) -> Result<T, CatalogError> {
        let Some(gate) = gate else {
            return Err(CatalogError::NetworkFailure("no scripted reply".to_string()));
        };

        if self.honor_cancel {
            tokio::select! {
                _ = cancel.cancelled() => Err(CatalogError::Cancelled),
                reply = gate => reply.unwrap_or(Err(CatalogError::Cancelled)),
            }
        } else {
            gate.await.unwrap_or(Err(CatalogError::Cancelled))
        }
    }
}

#[async_trait]
impl Catalog for GatedCatalog {
    fn catalog_name(&self) -> &str {
        "gated"
    }

    async fn search(&self, query: &str, cancel: &CancellationToken) -> SearchReply {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let gate = {
            let mut searches = self.searches.lock().unwrap();
            searches.remove(query)
        };
        self.wait(gate, cancel).await
    }

    async fn fetch_detail(&self, imdb_id: &str, cancel: &CancellationToken) -> DetailReply {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let gate = {
            let mut details = self.details.lock().unwrap();
            details.remove(imdb_id)
        };
        self.wait(gate, cancel).await
    }
}

pub fn search_results(prefix: &str, count: usize) -> Vec<SearchResult> {
    (1..=count)
        .map(|i| SearchResult {
            imdb_id: format!("tt{}{:02}", prefix, i),
            title: format!("{} {}", prefix, i),
            year: "2009".to_string(),
            poster: None,
        })
        .collect()
}

pub fn detail(imdb_id: &str, title: &str, runtime: &str, imdb_rating: Option<f64>) -> DetailRecord {
    DetailRecord {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2009".to_string(),
        poster: None,
        runtime: runtime.to_string(),
        imdb_rating,
        released: Some("10 Apr 2009".to_string()),
        plot: Some("A plot.".to_string()),
        actors: Some("Someone, Someone Else".to_string()),
        director: Some("A Director".to_string()),
        genre: Some("Comedy".to_string()),
    }
}
