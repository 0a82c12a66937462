//! The Static-Data Export working tree: File Tree Adapter, HTTP Fetcher,
//! SDE Loader, and SDE Updater.

pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod fingerprint;
pub mod loader;
pub mod updater;
pub mod yaml_json;

pub use error::SdeError;
pub use fetcher::HttpFetcher;
pub use fingerprint::DataDir;
pub use loader::SdlCatalog;
pub use updater::{ApplyUpdateOutcome, ProcessingLog, ProcessingLogEntry, SdeUpdater, UpdateCheck};
