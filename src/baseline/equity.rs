//! Equity index loading and baseline synthesis
//!
//! The equity index (zone -> equity score) is the minimum data a session
//! needs. When no historical indicator data is available, a plausible
//! baseline is synthesized from it.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::indicator::{Indicator, IndicatorMap};
use crate::core::error::{PolicySimError, Result};
use crate::core::types::{clamp01, ZoneId};
use crate::simulation::zone::{median, SlopeTable, ZoneState, ZoneStates};

pub const ZIP_FIELD: &str = "zip";
pub const EQUITY_FIELD: &str = "equityscore";

/// Population assumed for every synthesized zone
pub const SYNTHETIC_POPULATION: f64 = 20_000.0;

/// A loader-neutral row: field name -> raw text
pub type RawRecord = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityScore {
    pub zone: ZoneId,
    pub score: f64,
}

/// Validate and clean equity rows
///
/// Raises [`PolicySimError::Schema`] when the `zip` or `equityscore`
/// field is absent from every row. Unparseable scores are filled with the
/// median of the parsed ones; rows with a blank zip are skipped and
/// duplicate zones keep their first row.
pub fn load_equity_index(records: &[RawRecord]) -> Result<Vec<EquityScore>> {
    let found: BTreeSet<&str> = records.iter().flat_map(|r| r.keys().map(String::as_str)).collect();
    if !found.contains(ZIP_FIELD) || !found.contains(EQUITY_FIELD) {
        return Err(PolicySimError::Schema {
            expected: vec![ZIP_FIELD.to_string(), EQUITY_FIELD.to_string()],
            found: found.into_iter().map(str::to_string).collect(),
        });
    }

    let mut seen = BTreeSet::new();
    let mut parsed: Vec<(ZoneId, Option<f64>)> = Vec::new();
    for record in records {
        let Some(raw_zip) = record.get(ZIP_FIELD).filter(|z| !z.trim().is_empty()) else {
            tracing::warn!("Skipping equity row without a zip");
            continue;
        };
        let zone = ZoneId::new(raw_zip)?;
        if !seen.insert(zone.clone()) {
            continue;
        }
        let score = record
            .get(EQUITY_FIELD)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        parsed.push((zone, score));
    }

    let fill = median(parsed.iter().filter_map(|(_, s)| *s).collect());
    Ok(parsed
        .into_iter()
        .map(|(zone, score)| EquityScore { zone, score: score.unwrap_or(fill) })
        .collect())
}

/// Synthesize baseline zone states from equity scores alone
///
/// Equity is min-max normalized into `health_index`; employment rises with
/// it, disease burden falls with it. Slopes are all zero.
pub fn synthesize_from_equity(scores: &[EquityScore]) -> (ZoneStates, SlopeTable) {
    let min = scores.iter().map(|s| s.score).fold(f64::INFINITY, f64::min);
    let max = scores.iter().map(|s| s.score).fold(f64::NEG_INFINITY, f64::max);
    let span = if max - min != 0.0 { max - min } else { 1.0 };

    let mut states = ZoneStates::new();
    let mut slopes = SlopeTable::new();
    for entry in scores {
        let health = clamp01((entry.score - min) / span);
        let burden = 0.2 * (1.0 - health) + 0.2;
        let values = IndicatorMap::from_fn(|i| match i {
            Indicator::HealthIndex => health,
            Indicator::Employed => 0.4 * health + 0.4,
            Indicator::Bipoc => 0.5,
            _ => burden,
        });
        states.insert(entry.zone.clone(), ZoneState::new(values, SYNTHETIC_POPULATION));
        slopes.insert(entry.zone.clone(), IndicatorMap::splat(0.0));
    }

    tracing::info!("Synthesized baseline for {} zones from equity scores", states.len());
    (states, slopes)
}
