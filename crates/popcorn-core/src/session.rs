use popcorn_catalog::Catalog;
use popcorn_config::SessionConfig;
use popcorn_models::{SearchResult, UserRating, WatchedEntry};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use crate::event::SessionEvent;
use crate::search::{SearchSession, SearchState};
use crate::selection::{DetailState, SelectionSession, TitleObserver};
use crate::watchlist::{WatchedCollection, WatchedStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub default_query: String,
    pub app_title: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionConfig::default().into()
    }
}

impl From<SessionConfig> for SessionOptions {
    fn from(config: SessionConfig) -> Self {
        Self {
            default_query: config.default_query,
            app_title: config.app_title,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("user rating must be between 1 and 10, got {0}")]
    InvalidUserRating(u8),

    #[error("no movie is open")]
    NothingSelected,

    #[error("{0} is already in the watched list")]
    AlreadyWatched(String),
}

/// Why "add to watched" is not offered right now. Not a failure, an availability state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddUnavailable {
    #[error("no movie is open")]
    NoSelection,

    #[error("details are not loaded")]
    DetailNotLoaded,

    #[error("pick a rating first")]
    NoUserRating,

    #[error("{0} is already in the watched list")]
    AlreadyWatched(String),

    #[error("the catalog has no usable runtime for this title")]
    IncompleteDetail,
}

/// All state for one user session: query and results, the open title, and the watched list.
///
/// Intents mutate state synchronously and may start fetches. Fetch results come back
/// as [`SessionEvent`]s through [`Session::next_event`] and are applied with
/// [`Session::apply`], which drops anything stale. Must live inside a tokio runtime.
pub struct Session {
    catalog: Arc<dyn Catalog>,
    search: SearchSession,
    selection: SelectionSession,
    watched: WatchedCollection,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl Session {
    /// Create a session and immediately search for the default query (if any).
    pub fn new(catalog: Arc<dyn Catalog>, options: SessionOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        info!(catalog = catalog.catalog_name(), default_query = %options.default_query, "Session started");

        let mut session = Self {
            catalog,
            search: SearchSession::new(),
            selection: SelectionSession::new(options.app_title),
            watched: WatchedCollection::new(),
            events_tx,
            events_rx,
        };
        session.set_query(options.default_query);
        session
    }

    pub fn with_title_observer(mut self, observer: impl TitleObserver + 'static) -> Self {
        self.selection.set_title_observer(Box::new(observer));
        self
    }

    // Intents

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.search.set_query(query.into(), &self.catalog, &self.events_tx);
    }

    /// Open a title. Selecting the title that is already open closes it instead.
    pub fn select_movie(&mut self, imdb_id: impl Into<String>) {
        let imdb_id = imdb_id.into();
        if self.selection.selected_id() == Some(imdb_id.as_str()) {
            debug!(imdb_id = %imdb_id, "Selected the open title again, closing");
            self.close_movie();
            return;
        }
        self.selection.select(imdb_id, &self.catalog, &self.events_tx);
    }

    pub fn close_movie(&mut self) {
        self.selection.close();
    }

    pub fn set_user_rating(&mut self, value: u8) -> Result<(), SessionError> {
        let rating = UserRating::new(value).ok_or(SessionError::InvalidUserRating(value))?;
        let imdb_id = self.selection.selected_id().ok_or(SessionError::NothingSelected)?;
        if self.watched.contains(imdb_id) {
            return Err(SessionError::AlreadyWatched(imdb_id.to_string()));
        }
        self.selection.set_user_rating(rating);
        Ok(())
    }

    /// Add the open title with the chosen rating, then close the detail view.
    pub fn confirm_add_to_watched(&mut self) -> Result<(), AddUnavailable> {
        let entry = self.pending_entry()?;
        info!(imdb_id = %entry.imdb_id, user_rating = entry.user_rating.value(), "Marked as watched");
        self.watched.add(entry);
        self.close_movie();
        Ok(())
    }

    pub fn remove_from_watched(&mut self, imdb_id: &str) -> bool {
        let removed = self.watched.remove(imdb_id).is_some();
        if removed {
            info!(imdb_id, "Removed from watched list");
        }
        removed
    }

    // Event driving

    /// Wait for the next finished fetch (fresh or stale).
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply a finished fetch. Returns false when it was stale and discarded.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::SearchFinished { generation, query, result } => {
                self.search.apply(generation, &query, result)
            }
            SessionEvent::DetailFinished { generation, imdb_id, result } => {
                self.selection.apply(generation, &imdb_id, result)
            }
        }
    }

    /// Drive events until neither slot has a fetch in flight.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            match self.next_event().await {
                Some(event) => {
                    self.apply(event);
                }
                None => break,
            }
        }
    }

    /// Teardown: no fetch started so far may update this session afterwards.
    pub fn shutdown(&mut self) {
        self.search.shutdown();
        self.selection.shutdown();
        info!("Session shut down");
    }

    // Outbound state

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn search_state(&self) -> &SearchState {
        self.search.state()
    }

    pub fn results(&self) -> &[SearchResult] {
        self.search.results()
    }

    pub fn result_count(&self) -> usize {
        self.search.results().len()
    }

    pub fn detail_state(&self) -> &DetailState {
        self.selection.state()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selection.selected_id()
    }

    pub fn user_rating(&self) -> Option<UserRating> {
        self.selection.user_rating()
    }

    /// The rating given earlier if the open title is already watched.
    pub fn watched_user_rating(&self) -> Option<UserRating> {
        let imdb_id = self.selection.selected_id()?;
        self.watched.get(imdb_id).map(|entry| entry.user_rating)
    }

    pub fn watched(&self) -> &WatchedCollection {
        &self.watched
    }

    pub fn aggregates(&self) -> WatchedStats {
        self.watched.aggregates()
    }

    pub fn display_title(&self) -> &str {
        self.selection.display_title()
    }

    pub fn is_busy(&self) -> bool {
        self.search.is_loading() || self.selection.is_loading()
    }

    pub fn can_add_to_watched(&self) -> bool {
        self.pending_entry().is_ok()
    }

    /// Why adding is not available, or `None` when it is.
    pub fn add_unavailable_reason(&self) -> Option<AddUnavailable> {
        self.pending_entry().err()
    }

    fn pending_entry(&self) -> Result<WatchedEntry, AddUnavailable> {
        let imdb_id = self.selection.selected_id().ok_or(AddUnavailable::NoSelection)?;
        if self.watched.contains(imdb_id) {
            return Err(AddUnavailable::AlreadyWatched(imdb_id.to_string()));
        }
        let detail = self.selection.detail().ok_or(AddUnavailable::DetailNotLoaded)?;
        let rating = self.selection.user_rating().ok_or(AddUnavailable::NoUserRating)?;
        WatchedEntry::from_detail(detail, rating).ok_or(AddUnavailable::IncompleteDetail)
    }
}

#[cfg(test)]
mod tests;
