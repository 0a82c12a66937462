//! Structured logging init. `RUST_LOG`-driven `EnvFilter`
//! over a human-readable formatter by default; set `INGEST_LOG_JSON=1`
//! for line-delimited JSON, useful when this binary runs under a log
//! collector rather than a terminal.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("INGEST_LOG_JSON")
        .map(|v| v == "1")
        .unwrap_or(false);

    if json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}
