//! Keyed Cache: a Redis-shaped string-keyed store used by the
//! Keyed-Cache Import Pipeline to persist SDE families under
//! `sde:<family>:<key>`.

pub mod cache;
pub mod error;

pub use cache::{family_item_key, KeyedCache, LAST_IMPORT_KEY};
pub use error::CacheError;
