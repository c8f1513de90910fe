pub mod types;
pub mod output;
pub mod config;
pub mod error;

pub use types::*;
pub use output::*;
pub use config::{Budget, Config, PageBackendConfig};
pub use error::{FairScoutError, FetchError};
