use popcorn_catalog::CatalogError;
use popcorn_models::{DetailRecord, SearchResult};
use crate::fetch::Generation;

/// A finished catalog fetch, posted back to the session that started it.
#[derive(Debug)]
pub enum SessionEvent {
    SearchFinished {
        generation: Generation,
        query: String,
        result: Result<Vec<SearchResult>, CatalogError>,
    },
    DetailFinished {
        generation: Generation,
        imdb_id: String,
        result: Result<DetailRecord, CatalogError>,
    },
}
