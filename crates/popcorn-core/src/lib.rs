pub mod event;
pub mod failure;
pub mod fetch;
pub mod search;
pub mod selection;
pub mod session;
pub mod watchlist;

pub use event::SessionEvent;
pub use failure::FetchFailure;
pub use fetch::{FetchSlot, Generation, SlotKind};
pub use search::{SearchSession, SearchState};
pub use selection::{DetailState, SelectionSession, TitleObserver};
pub use session::{AddUnavailable, Session, SessionError, SessionOptions};
pub use watchlist::{WatchedCollection, WatchedStats};

#[cfg(test)]
mod testing;
