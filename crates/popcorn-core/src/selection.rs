use popcorn_catalog::{Catalog, CatalogError};
use popcorn_models::{DetailRecord, UserRating};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use crate::event::SessionEvent;
use crate::failure::FetchFailure;
use crate::fetch::{FetchSlot, Generation, SlotKind};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Closed,
    Loading { imdb_id: String },
    Ready(DetailRecord),
    Failed { imdb_id: String, failure: FetchFailure },
}

/// Receives the session's display title whenever it changes.
pub trait TitleObserver: Send {
    fn title_changed(&mut self, title: &str);
}

impl<F> TitleObserver for F
where
    F: FnMut(&str) + Send,
{
    fn title_changed(&mut self, title: &str) {
        self(title)
    }
}

/// Selected title and its lazily fetched detail record.
pub struct SelectionSession {
    state: DetailState,
    slot: FetchSlot,
    user_rating: Option<UserRating>,
    app_title: String,
    display_title: String,
    observer: Option<Box<dyn TitleObserver>>,
}

impl SelectionSession {
    pub fn new(app_title: impl Into<String>) -> Self {
        let app_title = app_title.into();
        Self {
            state: DetailState::Closed,
            slot: FetchSlot::new(SlotKind::Detail),
            user_rating: None,
            display_title: app_title.clone(),
            app_title,
            observer: None,
        }
    }

    pub fn set_title_observer(&mut self, observer: Box<dyn TitleObserver>) {
        self.observer = Some(observer);
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn selected_id(&self) -> Option<&str> {
        match &self.state {
            DetailState::Closed => None,
            DetailState::Loading { imdb_id } | DetailState::Failed { imdb_id, .. } => Some(imdb_id),
            DetailState::Ready(detail) => Some(&detail.imdb_id),
        }
    }

    /// The detail record, only while it belongs to the current selection.
    pub fn detail(&self) -> Option<&DetailRecord> {
        match &self.state {
            DetailState::Ready(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.slot.is_busy()
    }

    pub fn user_rating(&self) -> Option<UserRating> {
        self.user_rating
    }

    pub fn set_user_rating(&mut self, rating: UserRating) {
        self.user_rating = Some(rating);
    }

    pub fn display_title(&self) -> &str {
        &self.display_title
    }

    /// Open `imdb_id`, superseding any detail fetch already running.
    pub fn select(
        &mut self,
        imdb_id: String,
        catalog: &Arc<dyn Catalog>,
        events: &UnboundedSender<SessionEvent>,
    ) {
        self.user_rating = None;
        self.state = DetailState::Loading { imdb_id: imdb_id.clone() };
        self.sync_title();

        let catalog = Arc::clone(catalog);
        let request_id = imdb_id.clone();
        let generation = self.slot.start(
            events,
            move |cancel| async move { catalog.fetch_detail(&request_id, &cancel).await },
            move |generation, result| SessionEvent::DetailFinished {
                generation,
                imdb_id,
                result,
            },
        );
        debug!(%generation, "Detail fetch started");
    }

    pub fn close(&mut self) {
        self.slot.cancel();
        self.user_rating = None;
        if self.state != DetailState::Closed {
            debug!("Detail view closed");
        }
        self.state = DetailState::Closed;
        self.sync_title();
    }

    /// Apply a finished detail fetch. Returns false when the result was stale and ignored.
    pub fn apply(
        &mut self,
        generation: Generation,
        imdb_id: &str,
        result: Result<DetailRecord, CatalogError>,
    ) -> bool {
        if !self.slot.accept(generation) {
            return false;
        }

        match result {
            Ok(detail) => {
                info!(imdb_id, title = %detail.title, "Detail ready");
                self.state = DetailState::Ready(detail);
            }
            Err(error) => match FetchFailure::from_catalog_error(error) {
                Some(failure) => {
                    warn!(imdb_id, ?failure, "Detail fetch failed");
                    self.state = DetailState::Failed {
                        imdb_id: imdb_id.to_string(),
                        failure,
                    };
                }
                None => {
                    warn!(imdb_id, %generation, "Catalog cancelled a live detail fetch");
                    self.state = DetailState::Failed {
                        imdb_id: imdb_id.to_string(),
                        failure: FetchFailure::Transport {
                            detail: CatalogError::Cancelled.to_string(),
                        },
                    };
                }
            },
        }
        self.sync_title();
        true
    }

    pub fn shutdown(&mut self) {
        self.slot.shutdown();
    }

    /// Title follows the state: "Movie | <title>" while a titled detail is ready, app title otherwise.
    fn sync_title(&mut self) {
        let desired = match &self.state {
            DetailState::Ready(detail) if detail.has_title() => format!("Movie | {}", detail.title),
            _ => self.app_title.clone(),
        };

        if desired != self.display_title {
            debug!(title = %desired, "Display title changed");
            self.display_title = desired;
            if let Some(observer) = self.observer.as_mut() {
                observer.title_changed(&self.display_title);
            }
        }
    }
}
