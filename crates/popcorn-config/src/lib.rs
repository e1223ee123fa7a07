pub mod config;
pub mod paths;

pub use config::{CatalogConfig, Config, LoggingConfig, SessionConfig, API_KEY_ENV, PLACEHOLDER_API_KEY};
pub use paths::PathManager;
