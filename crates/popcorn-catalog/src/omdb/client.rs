use crate::error::CatalogError;
use crate::omdb::api;
use crate::traits::Catalog;
use async_trait::async_trait;
use popcorn_models::{DetailRecord, SearchResult};
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// One GET against the catalog root with the api key plus `params`.
    async fn get_json(&self, params: &[(&str, &str)]) -> Result<Value, CatalogError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::InvalidResponse(format!("{} - {}", status, error_text)));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Race `request` against `cancel`; a fired token wins without waiting for the transport.
async fn cancellable<T>(
    cancel: &CancellationToken,
    request: impl Future<Output = Result<T, CatalogError>>,
) -> Result<T, CatalogError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CatalogError::Cancelled),
        result = request => result,
    }
}

#[async_trait]
impl Catalog for OmdbClient {
    fn catalog_name(&self) -> &str {
        "omdb"
    }

    #[instrument(skip(self, cancel))]
    async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<SearchResult>, CatalogError> {
        let body = cancellable(cancel, self.get_json(&[("s", query)])).await?;
        let results = api::parse_search_response(body)?;
        debug!("OMDb search returned {} results", results.len());
        Ok(results)
    }

    #[instrument(skip(self, cancel))]
    async fn fetch_detail(&self, imdb_id: &str, cancel: &CancellationToken) -> Result<DetailRecord, CatalogError> {
        let body = cancellable(cancel, self.get_json(&[("i", imdb_id)])).await?;
        api::parse_detail_response(body)
    }
}
