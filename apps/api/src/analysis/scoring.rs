//! Score aggregation: six [1, 100] sub-scores into one [0, 10] risk score.
//!
//!   total   = vigor + immunity + depth + width + variance + experience_context
//!   base10  = 10 - total / 60
//!   final   = clamp(round(base10 * 2) / 2, 0, 10)
//!
//! `f64::round` rounds half away from zero, so total = 330 gives exactly 4.5 and
//! totals landing on a quarter step round up in magnitude. Round first, then clamp.

use crate::models::report::ScoreBundle;

pub const MIN_RISK: f64 = 0.0;
pub const MAX_RISK: f64 = 10.0;

pub fn aggregate(
    vigor: u32,
    immunity: u32,
    depth: u32,
    width: u32,
    variance: u32,
    experience_context: u32,
) -> f64 {
    let total = vigor + immunity + depth + width + variance + experience_context;
    let base10 = 10.0 - f64::from(total) / 60.0;
    ((base10 * 2.0).round() / 2.0).clamp(MIN_RISK, MAX_RISK)
}

pub fn aggregate_bundle(bundle: &ScoreBundle) -> f64 {
    aggregate(
        bundle.vigor,
        bundle.immunity,
        bundle.depth,
        bundle.width,
        bundle.variance,
        bundle.experience_context,
    )
}
