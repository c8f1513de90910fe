pub mod archive;
pub mod cache;
pub mod error;
mod fetchers;
pub mod links;
pub mod rate_limit;
mod readability;

pub use archive::{Archive, ArchiveConfig};
pub use cache::{CacheHit, CacheKind, CacheMetadata, CacheStore};
pub use error::{ArchiveError, Result};
pub use links::extract_page_links;
pub use rate_limit::RateLimiter;
