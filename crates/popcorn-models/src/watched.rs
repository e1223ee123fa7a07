use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::detail::DetailRecord;
use crate::rating::UserRating;

/// A title the user has watched and rated. All numbers are parsed at construction time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
    pub imdb_rating: Option<f64>, // None when the catalog has no numeric rating
    pub runtime: u32, // Minutes
    pub user_rating: UserRating,
    pub date_added: DateTime<Utc>,
}

impl WatchedEntry {
    /// Build an entry from a loaded detail record and the rating the user picked.
    ///
    /// Returns `None` when the runtime has no leading numeric token. A missing
    /// catalog rating is carried over as `None`.
    pub fn from_detail(detail: &DetailRecord, user_rating: UserRating) -> Option<Self> {
        let runtime = detail.runtime_minutes()?;

        Some(Self {
            imdb_id: detail.imdb_id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster: detail.poster.clone(),
            imdb_rating: detail.imdb_rating,
            runtime,
            user_rating,
            date_added: Utc::now(),
        })
    }
}
