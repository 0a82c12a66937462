//! Orchestration layer: the Bulk Alliance Importer,
//! the Keyed-Cache Import Pipeline, and the Alliance Detail Service,
//! gluing the five leaf crates and the Status Fabric together.

pub mod alliance_detail;
pub mod bulk_import;
pub mod cache_pipeline;
pub mod clock;
pub mod error;
pub mod family;

pub use bulk_import::{run_bulk_import, BulkImportStats};
pub use cache_pipeline::{run_cache_import, start_cache_import, CacheImportRequest};
pub use error::CoreError;
pub use family::{Family, FamilyKeying, UnknownFamily};
