pub mod detail;
pub mod rating;
pub mod runtime;
pub mod search_result;
pub mod watched;

pub use detail::DetailRecord;
pub use rating::UserRating;
pub use runtime::parse_runtime_minutes;
pub use search_result::SearchResult;
pub use watched::WatchedEntry;
