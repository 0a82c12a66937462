//! Typed configuration, loaded entirely from `INGEST_*` environment
//! variables with documented defaults. Every governing literal
//! (batch_size default 1000, its [100, 10000] range, the HTTP Fetcher's
//! 30-minute timeout floor) is a named constant in the crate that owns
//! it, not duplicated here as a magic number.

use ingest_resilience::pacing::DEFAULT_BATCH_SIZE;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Process-wide configuration. Constructed once at startup via [`Config::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Path (or `sqlite:` URL) to the Document Store's SQLite database.
    pub document_store_path: String,
    /// Connection URL for the Keyed Cache's Redis backend.
    pub redis_url: String,
    /// Base URL of the upstream alliance/character JSON API.
    pub upstream_base_url: String,
    /// URL of the SDE manifest, published alongside the archive.
    pub sde_manifest_url: String,
    /// URL of the downloadable SDE archive (`sde.zip`).
    pub sde_archive_url: String,
    /// Directory the SDE Loader reads its `<family>.json` files from.
    pub sde_data_dir: String,
    /// Staging sibling used by the SDE Updater during `apply_update`.
    pub sde_temp_dir: String,
    /// Default `batch_size` for a cache-import request that omits one.
    pub default_batch_size: usize,
    /// Address the HTTP surface binds to.
    pub http_bind: String,
    /// How often the Status Fabric's eviction sweeper runs.
    pub eviction_sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            document_store_path: env_or("INGEST_DOCUMENT_STORE_PATH", "ingest.db"),
            redis_url: env_or("INGEST_REDIS_URL", "redis://127.0.0.1:6379"),
            upstream_base_url: env_or("INGEST_UPSTREAM_BASE_URL", "http://localhost:9000"),
            sde_manifest_url: env_or("INGEST_SDE_MANIFEST_URL", "http://localhost:9001/manifest.json"),
            sde_archive_url: env_or("INGEST_SDE_ARCHIVE_URL", "http://localhost:9001/sde.zip"),
            sde_data_dir: env_or("INGEST_SDE_DATA_DIR", "./sde-data"),
            sde_temp_dir: env_or("INGEST_SDE_TEMP_DIR", "./sde-data/.staging"),
            default_batch_size: env_parse_or("INGEST_DEFAULT_BATCH_SIZE", DEFAULT_BATCH_SIZE),
            http_bind: env_or("INGEST_HTTP_BIND", "0.0.0.0:8080"),
            eviction_sweep_interval: Duration::from_secs(env_parse_or(
                "INGEST_EVICTION_SWEEP_INTERVAL_SECS",
                30,
            )),
        }
    }
}
