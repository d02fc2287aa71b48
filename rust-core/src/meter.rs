//! Soft-knee meter compression
//!
//! `tanh` keeps small magnitudes roughly linear (scaled by `sensitivity`)
//! and squeezes transients so no band can exceed the display limit.

/// Compress a raw magnitude into `[0, limit]`
///
/// # Arguments
/// * `raw` - Non-negative band magnitude
/// * `sensitivity` - Gain applied before compression
/// * `limit` - Upper bound of the display range
pub fn scale(raw: f64, sensitivity: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }

    let value = (raw * sensitivity / limit).tanh() * limit;
    value.clamp(0.0, limit)
}
