pub mod context;
pub mod domain_guard;
pub mod fetch;
pub mod keywords;
pub mod orchestrator;
pub mod run_log;
pub mod schedule;
pub mod scoring;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use orchestrator::Orchestrator;
pub use traits::ContentFetcher;
