//! The Bulk Alliance Importer's fixed pacing schedule.
//!
//! The importer processes alliance IDs one at a time, sleeping briefly
//! between each, and sleeps longer every `BATCH_STRIDE` ids to give the
//! upstream API room to breathe. These are deliberately named constants,
//! not knobs: the numbers themselves are fixed, not configurable.

use std::time::Duration;

/// Delay after every individual alliance fetch.
pub const INTRA_ITEM_DELAY: Duration = Duration::from_millis(200);

/// Additional delay every `BATCH_STRIDE` items, on top of the per-item delay.
pub const INTER_BATCH_DELAY: Duration = Duration::from_millis(1000);

/// How many items make up one pacing batch.
pub const BATCH_STRIDE: usize = 10;

/// Default `batch_size` for a cache-import family page, and its
/// allowed range.
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const MIN_BATCH_SIZE: usize = 100;
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Clamp a caller-supplied batch size into the allowed range.
pub fn clamp_batch_size(requested: usize) -> usize {
    requested.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE)
}

/// A sequence position within the Bulk Alliance Importer's pacing
/// schedule: after processing the `index`-th (0-based) item, sleep for
/// whatever this returns before moving to the next one.
pub fn delay_after(index: usize) -> Duration {
    if (index + 1) % BATCH_STRIDE == 0 {
        INTER_BATCH_DELAY
    } else {
        INTRA_ITEM_DELAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_after_is_short_within_a_batch() {
        assert_eq!(delay_after(0), INTRA_ITEM_DELAY);
        assert_eq!(delay_after(8), INTRA_ITEM_DELAY);
    }

    #[test]
    fn delay_after_adds_inter_batch_pause_on_stride_boundary() {
        assert_eq!(delay_after(9), INTER_BATCH_DELAY);
        assert_eq!(delay_after(19), INTER_BATCH_DELAY);
    }

    #[test]
    fn clamp_batch_size_respects_bounds() {
        assert_eq!(clamp_batch_size(50), MIN_BATCH_SIZE);
        assert_eq!(clamp_batch_size(50_000), MAX_BATCH_SIZE);
        assert_eq!(clamp_batch_size(2500), 2500);
    }
}
