//! Slope unit normalization
//!
//! Historical slopes arrive in whatever units the source used. The core only
//! ever consumes per-year fractional deltas, so conversion happens here, once,
//! before a [`SlopeTable`] is built.

use serde::{Deserialize, Serialize};

use crate::catalog::indicator::{Indicator, IndicatorMap};
use crate::core::types::ZoneId;
use crate::simulation::zone::{median, SlopeTable};

/// Median |slope| above which `Auto` assumes percentage points
pub const PERCENT_POINT_THRESHOLD: f64 = 0.05;

/// How to interpret raw slope magnitudes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeUnits {
    /// Per indicator: treat as percentage points when the median |slope|
    /// exceeds [`PERCENT_POINT_THRESHOLD`], otherwise as fractions
    #[default]
    Auto,
    /// Already fractions on the 0–1 scale
    Fraction,
    /// Percentage points on the 0–100 scale
    PercentagePoints,
}

impl SlopeUnits {
    /// Divisor to apply to one indicator's column of slopes
    fn divisor(self, column: &[f64]) -> f64 {
        match self {
            SlopeUnits::Fraction => 1.0,
            SlopeUnits::PercentagePoints => 100.0,
            SlopeUnits::Auto => {
                let med = median(column.iter().map(|v| v.abs()).collect());
                if med > PERCENT_POINT_THRESHOLD {
                    100.0
                } else {
                    1.0
                }
            }
        }
    }
}

/// Convert raw per-zone slopes into per-year fractions
///
/// `window_years` divides slopes measured as change over a multi-year
/// window; values below 1 are treated as 1.
pub fn normalize_slopes(
    raw: Vec<(ZoneId, IndicatorMap<f64>)>,
    units: SlopeUnits,
    window_years: u32,
) -> SlopeTable {
    let window = window_years.max(1) as f64;

    let divisors = IndicatorMap::from_fn(|indicator: Indicator| {
        let column: Vec<f64> = raw
            .iter()
            .map(|(_, s)| s[indicator])
            .filter(|v| v.is_finite())
            .collect();
        let d = units.divisor(&column);
        if d != 1.0 {
            tracing::debug!("Treating {} slopes as percentage points", indicator);
        }
        d * window
    });

    raw.into_iter()
        .map(|(zone, slopes)| (zone, slopes.map(|i, v| v / divisors[i])))
        .collect()
}
