pub mod error;
pub mod factory;
pub mod omdb;
pub mod traits;

pub use error::CatalogError;
pub use factory::create_catalog;
pub use omdb::OmdbClient;
pub use traits::Catalog;
pub use tokio_util::sync::CancellationToken;
