use popcorn_models::{DetailRecord, SearchResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use crate::error::CatalogError;

#[derive(Debug, Deserialize)]
struct OmdbSearchPage {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbDetail {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Released")]
    released: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Actors")]
    actors: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
}

/// OMDb uses "N/A" for every missing string field
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && v != "N/A"
    })
}

/// Split the `Response` envelope: `"False"` is a business outcome with the catalog's own message.
fn check_envelope(body: &Value) -> Result<(), CatalogError> {
    match body.get("Response").and_then(Value::as_str) {
        Some("True") => Ok(()),
        Some("False") => {
            let message = body
                .get("Error")
                .and_then(Value::as_str)
                .ok_or_else(|| CatalogError::InvalidResponse("Response=False without Error message".to_string()))?;
            Err(CatalogError::NotFound(message.to_string()))
        }
        Some(other) => Err(CatalogError::InvalidResponse(format!("unexpected Response value: {}", other))),
        None => Err(CatalogError::InvalidResponse("missing Response field".to_string())),
    }
}

/// Normalize a `?s=` payload into search results.
pub fn parse_search_response(body: Value) -> Result<Vec<SearchResult>, CatalogError> {
    check_envelope(&body)?;

    let page: OmdbSearchPage = serde_json::from_value(body)?;
    debug!(
        "OMDb search page: {} items (totalResults={})",
        page.search.len(),
        page.total_results.as_deref().unwrap_or("?")
    );

    // "no results" is always reported through Response=False
    if page.search.is_empty() {
        return Err(CatalogError::InvalidResponse("Response=True with an empty Search list".to_string()));
    }

    Ok(page
        .search
        .into_iter()
        .map(|item| SearchResult {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: present(item.poster),
        })
        .collect())
}

/// Normalize an `?i=` payload into a detail record.
pub fn parse_detail_response(body: Value) -> Result<DetailRecord, CatalogError> {
    check_envelope(&body)?;

    let detail: OmdbDetail = serde_json::from_value(body)?;
    let imdb_rating = present(detail.imdb_rating).and_then(|r| r.trim().parse::<f64>().ok());

    Ok(DetailRecord {
        imdb_id: detail.imdb_id,
        title: detail.title,
        year: detail.year,
        poster: present(detail.poster),
        runtime: detail.runtime,
        imdb_rating,
        released: present(detail.released),
        plot: present(detail.plot),
        actors: present(detail.actors),
        director: present(detail.director),
        genre: present(detail.genre),
    })
}
