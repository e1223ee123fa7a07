use serde::{Deserialize, Serialize};

/// One entry of a catalog search. Replaced wholesale on every successful search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub imdb_id: String,
    pub title: String,
    pub year: String, // Free text: "2009", "2006–2011"
    pub poster: Option<String>,
}
