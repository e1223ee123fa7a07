//! Builds the configured catalog client.

use anyhow::Result;
use popcorn_config::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use crate::{Catalog, OmdbClient};

pub fn create_catalog(config: &Config) -> Result<Arc<dyn Catalog>> {
    config.validate()?;

    let catalog = &config.catalog;
    debug!(base_url = %catalog.base_url, timeout_secs = catalog.timeout_secs, "Creating OMDb catalog client");

    let client = OmdbClient::new(
        catalog.base_url.clone(),
        catalog.api_key.clone(),
        Duration::from_secs(catalog.timeout_secs),
    )?;
    Ok(Arc::new(client))
}
