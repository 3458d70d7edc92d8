//! Composite equity-and-outcome score

use crate::catalog::indicator::Indicator;
use crate::core::types::clamp01;
use crate::simulation::engine::ZoneRecord;

/// Indicators whose cross-zone spread counts against equity
const DISPERSION_INDICATORS: [Indicator; 6] = [
    Indicator::NoDoctor,
    Indicator::HealthIndex,
    Indicator::Employed,
    Indicator::Diabetes,
    Indicator::HighBp,
    Indicator::KidneyDisease,
];

// Outcome weights (sum to 1.0 together with EQUITY_WEIGHT)
const EMPLOYED_WEIGHT: f64 = 0.18;
const HEALTH_INDEX_WEIGHT: f64 = 0.18;
const NO_DOCTOR_WEIGHT: f64 = 0.18;
const DIABETES_WEIGHT: f64 = 0.18;
const HIGH_BP_WEIGHT: f64 = 0.14;
const KIDNEY_WEIGHT: f64 = 0.04;
const EQUITY_WEIGHT: f64 = 0.10;

fn mean(records: &[ZoneRecord], indicator: Indicator) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.values[indicator]).sum::<f64>() / records.len() as f64
}

/// Sample standard deviation across zones (0 with fewer than two zones)
fn std_dev(records: &[ZoneRecord], indicator: Indicator) -> f64 {
    let n = records.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(records, indicator);
    let var = records
        .iter()
        .map(|r| (r.values[indicator] - m).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    var.sqrt()
}

/// Mean standard deviation of the dispersion indicators
pub fn dispersion(records: &[ZoneRecord]) -> f64 {
    DISPERSION_INDICATORS
        .iter()
        .map(|&i| std_dev(records, i))
        .sum::<f64>()
        / DISPERSION_INDICATORS.len() as f64
}

/// Score a year's record table on [0, 100], rounded to one decimal
pub fn composite_score(records: &[ZoneRecord]) -> f64 {
    let good = |i: Indicator| clamp01(mean(records, i));
    let bad = |i: Indicator| clamp01(1.0 - mean(records, i));
    let equity = clamp01(1.0 - 2.0 * dispersion(records));

    let composite = EMPLOYED_WEIGHT * good(Indicator::Employed)
        + HEALTH_INDEX_WEIGHT * good(Indicator::HealthIndex)
        + NO_DOCTOR_WEIGHT * bad(Indicator::NoDoctor)
        + DIABETES_WEIGHT * bad(Indicator::Diabetes)
        + HIGH_BP_WEIGHT * bad(Indicator::HighBp)
        + KIDNEY_WEIGHT * bad(Indicator::KidneyDisease)
        + EQUITY_WEIGHT * equity;

    (1000.0 * composite).round() / 10.0
}
