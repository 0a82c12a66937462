//! Clock & ID: the monotonic wall-clock source and UUID generator
//! used by the orchestration layer's own timestamps (alliance record
//! `created_at`/`updated_at`, cache-import's `last_import`). Kept as a
//! thin wrapper rather than a trait object: there is exactly one
//! implementation and no test currently needs to fake time.

use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
