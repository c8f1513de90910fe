/// Internal fetcher implementations. Not exposed outside the archive crate.
/// Each fetcher handles one collaborator: renderer, search, HTTP, PDF.

pub(crate) mod download;
pub(crate) mod page;
pub(crate) mod pdf;
pub(crate) mod search;
