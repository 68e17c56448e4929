//! Raw-count scaling and decibel conversion.

use crate::config;
use libm::log10f;

/// Mean raw code to volts.
pub fn volts_from_count(mean_count: f32) -> f32 {
    mean_count * config::adc::VOLTS_PER_COUNT
}

/// Volts to dB relative to the microphone reference level.
///
/// `None` for a non-positive input (the log10 domain edge); callers map
/// that onto the all-samples-invalid path instead of surfacing NaN.
pub fn decibels(volts: f32) -> Option<f32> {
    if volts > 0.0 {
        Some(20.0 * log10f(volts / config::noise::DB_REFERENCE_VOLTS))
    } else {
        None
    }
}
