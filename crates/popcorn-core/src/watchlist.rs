use popcorn_models::WatchedEntry;
use serde::Serialize;
use tracing::debug;

/// Insertion-ordered list of watched titles for the session.
///
/// `add` does not check for duplicates; the session guards that before adding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchedCollection {
    entries: Vec<WatchedEntry>,
}

/// Aggregates derived from the collection on every call. Means of nothing are 0.
///
/// `mean_imdb_rating` only averages entries that have a catalog rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WatchedStats {
    pub count: usize,
    pub mean_imdb_rating: f64,
    pub mean_user_rating: f64,
    pub mean_runtime: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (count, sum) = values.fold((0usize, 0.0), |(count, sum), v| (count + 1, sum + v));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

impl WatchedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: WatchedEntry) {
        debug!(imdb_id = %entry.imdb_id, "Adding to watched list");
        self.entries.push(entry);
    }

    /// Remove the first entry with `imdb_id`. Returns it, or `None` if absent.
    pub fn remove(&mut self, imdb_id: &str) -> Option<WatchedEntry> {
        let index = self.entries.iter().position(|e| e.imdb_id == imdb_id)?;
        debug!(imdb_id, "Removing from watched list");
        Some(self.entries.remove(index))
    }

    pub fn get(&self, imdb_id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.imdb_id == imdb_id)
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.get(imdb_id).is_some()
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn aggregates(&self) -> WatchedStats {
        WatchedStats {
            count: self.entries.len(),
            mean_imdb_rating: mean(self.entries.iter().filter_map(|e| e.imdb_rating)),
            mean_user_rating: mean(self.entries.iter().map(|e| f64::from(e.user_rating.value()))),
            mean_runtime: mean(self.entries.iter().map(|e| f64::from(e.runtime))),
        }
    }
}
