use serde::{Deserialize, Serialize};
use crate::runtime::parse_runtime_minutes;

/// The expanded record for one catalog identifier, fetched lazily on selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailRecord {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
    pub runtime: String, // As reported by the catalog, e.g. "142 min"
    pub imdb_rating: Option<f64>,
    pub released: Option<String>,
    pub plot: Option<String>,
    pub actors: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
}

impl DetailRecord {
    pub fn runtime_minutes(&self) -> Option<u32> {
        parse_runtime_minutes(&self.runtime)
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(title: &str, runtime: &str) -> DetailRecord {
        DetailRecord {
            imdb_id: "tt0100".to_string(),
            title: title.to_string(),
            year: "1999".to_string(),
            poster: None,
            runtime: runtime.to_string(),
            imdb_rating: Some(7.1),
            released: None,
            plot: None,
            actors: None,
            director: None,
            genre: None,
        }
    }

    #[test]
    fn test_runtime_minutes() {
        assert_eq!(detail("Heat", "170 min").runtime_minutes(), Some(170));
        assert_eq!(detail("Heat", "N/A").runtime_minutes(), None);
    }

    #[test]
    fn test_has_title() {
        assert!(detail("Heat", "170 min").has_title());
        assert!(!detail("  ", "170 min").has_title());
    }
}
