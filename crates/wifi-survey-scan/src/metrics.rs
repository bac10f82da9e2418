//! Derived signal metrics computed for every detection.
//!
//! Both estimators are pure, total functions: every input maps to exactly one
//! output and there is no failure path.

/// Channel width assumed for each frequency band, as `(upper bound, width)`.
///
/// Upper bounds are exclusive and the first matching row wins. This is a fixed
/// approximation of common channel bonding, kept as-is for output compatibility.
const CHANNEL_WIDTH_TABLE: [(f64, f64); 6] = [
    (2.422e9, 20e6),
    (2.462e9, 40e6),
    (2.484e9, 20e6),
    (5.18e9, 20e6),
    (5.25e9, 40e6),
    (5.32e9, 80e6),
];

/// Width assumed above the last table row.
const WIDEST_CHANNEL_HZ: f64 = 160e6;

/// Power level mapped to 1 % quality.
pub const WORST_DBM: i32 = -85;

/// Power level mapped to 100 % quality.
pub const BEST_DBM: i32 = -18;

/// Estimate the channel width (Hz) in use at a centre frequency (Hz).
#[must_use]
pub fn estimate_channel_width(frequency_hz: f64) -> f64 {
    CHANNEL_WIDTH_TABLE
        .iter()
        .find(|(upper, _)| frequency_hz < *upper)
        .map_or(WIDEST_CHANNEL_HZ, |&(_, width)| width)
}

/// Normalise a received power level (dBm) to a quality percentage in `1..=100`.
///
/// Linear between [`WORST_DBM`] (1 %) and [`BEST_DBM`] (100 %), rounded to the
/// nearest integer and clamped so the result is never 0 and never above 100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 1..=100
pub fn quality_from_power(dbm: i32) -> u8 {
    let span = f64::from(BEST_DBM - WORST_DBM);
    let quality = (100.0 * (f64::from(dbm) - f64::from(WORST_DBM)) / span).round();
    quality.clamp(1.0, 100.0) as u8
}
