use popcorn_catalog::{Catalog, CatalogError};
use popcorn_models::SearchResult;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use crate::event::SessionEvent;
use crate::failure::FetchFailure;
use crate::fetch::{FetchSlot, Generation, SlotKind};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Empty query: no results, no error, no request.
    Idle,
    Loading,
    Ready(Vec<SearchResult>),
    Failed(FetchFailure),
}

/// Query-driven search lifecycle. Every query change invalidates the previous request.
pub struct SearchSession {
    query: String,
    state: SearchState,
    slot: FetchSlot,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            state: SearchState::Idle,
            slot: FetchSlot::new(SlotKind::Search),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Current results; empty unless the state is `Ready`.
    pub fn results(&self) -> &[SearchResult] {
        match &self.state {
            SearchState::Ready(results) => results,
            _ => &[],
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match &self.state {
            SearchState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.slot.is_busy()
    }

    /// Apply a query change. Returns true when a catalog request was started.
    ///
    /// An unchanged query is not a change and does nothing.
    pub fn set_query(
        &mut self,
        query: String,
        catalog: &Arc<dyn Catalog>,
        events: &UnboundedSender<SessionEvent>,
    ) -> bool {
        if query == self.query {
            return false;
        }
        self.query = query;

        if self.query.is_empty() {
            self.slot.cancel();
            self.state = SearchState::Idle;
            debug!("Query cleared, search idle");
            return false;
        }

        // Entering Loading drops any previous failure
        self.state = SearchState::Loading;

        let catalog = Arc::clone(catalog);
        let request_query = self.query.clone();
        let event_query = self.query.clone();
        let generation = self.slot.start(
            events,
            move |cancel| async move { catalog.search(&request_query, &cancel).await },
            move |generation, result| SessionEvent::SearchFinished {
                generation,
                query: event_query,
                result,
            },
        );
        debug!(query = %self.query, %generation, "Search started");
        true
    }

    /// Apply a finished search. Returns false when the result was stale and ignored.
    pub fn apply(
        &mut self,
        generation: Generation,
        query: &str,
        result: Result<Vec<SearchResult>, CatalogError>,
    ) -> bool {
        if !self.slot.accept(generation) {
            return false;
        }

        match result {
            Ok(results) if results.is_empty() => {
                warn!(query, "Catalog returned success without results");
                self.state = SearchState::Failed(FetchFailure::Transport {
                    detail: "success without results".to_string(),
                });
            }
            Ok(results) => {
                info!(query, count = results.len(), "Search ready");
                self.state = SearchState::Ready(results);
            }
            Err(error) => match FetchFailure::from_catalog_error(error) {
                Some(FetchFailure::NotFound(message)) => {
                    info!(query, %message, "Catalog reported no match");
                    self.state = SearchState::Failed(FetchFailure::NotFound(message));
                }
                Some(failure) => {
                    warn!(query, ?failure, "Search failed");
                    self.state = SearchState::Failed(failure);
                }
                None => {
                    // The slot clears a request it cancels, so a fresh one reporting
                    // Cancelled was stopped by the catalog itself
                    warn!(query, %generation, "Catalog cancelled a live search");
                    self.state = SearchState::Failed(FetchFailure::Transport {
                        detail: CatalogError::Cancelled.to_string(),
                    });
                }
            },
        }
        true
    }

    /// Teardown: stop the in-flight search so it can no longer post results.
    pub fn shutdown(&mut self) {
        self.slot.shutdown();
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}
