//! Historical zone records
//!
//! One record per zone carrying the latest observed indicator levels, the
//! observed trend slopes and the population, any of which may be missing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::baseline::equity::SYNTHETIC_POPULATION;
use crate::baseline::slopes::{normalize_slopes, SlopeUnits};
use crate::catalog::indicator::{Indicator, IndicatorMap};
use crate::core::error::Result;
use crate::core::types::ZoneId;
use crate::simulation::zone::{SlopeTable, ZoneState, ZoneStates};

/// `health_index` levels above this are taken to be on a 0–100 scale
pub const PERCENT_SCALE_THRESHOLD: f64 = 1.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub zip: String,
    /// Latest observed level per indicator name
    #[serde(default)]
    pub levels: BTreeMap<String, f64>,
    /// Observed annual trend per indicator name, in source units
    #[serde(default)]
    pub slopes: BTreeMap<String, f64>,
    #[serde(default)]
    pub population: Option<f64>,
}

struct ParsedRecord {
    zone: ZoneId,
    levels: IndicatorMap<Option<f64>>,
    slopes: IndicatorMap<f64>,
    population: Option<f64>,
}

fn parse_keyed(values: &BTreeMap<String, f64>) -> Result<IndicatorMap<Option<f64>>> {
    let mut out = IndicatorMap::splat(None);
    for (name, &v) in values {
        let indicator: Indicator = name.parse()?;
        out[indicator] = Some(v).filter(|v| v.is_finite());
    }
    Ok(out)
}

fn parse_record(record: &HistoryRecord) -> Result<ParsedRecord> {
    Ok(ParsedRecord {
        zone: ZoneId::new(&record.zip)?,
        levels: parse_keyed(&record.levels)?,
        slopes: parse_keyed(&record.slopes)?.map(|_, s| s.unwrap_or(0.0)),
        population: record.population.filter(|p| p.is_finite()),
    })
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Build baseline states and slopes from historical records
///
/// Unknown indicator names and malformed zone keys are errors. Missing
/// levels fall back to the city mean of zones reporting that indicator,
/// then to the indicator's default level. Missing populations fall back to
/// the mean reported population.
pub fn baseline_from_history(
    records: &[HistoryRecord],
    units: SlopeUnits,
    window_years: u32,
) -> Result<(ZoneStates, SlopeTable)> {
    let mut seen = BTreeSet::new();
    let mut parsed = Vec::with_capacity(records.len());
    for record in records {
        let p = parse_record(record)?;
        if seen.insert(p.zone.clone()) {
            parsed.push(p);
        }
    }

    let city_means = IndicatorMap::from_fn(|i| mean_of(parsed.iter().filter_map(|p| p.levels[i])));
    let percent_scale = parsed
        .iter()
        .filter_map(|p| p.levels[Indicator::HealthIndex])
        .any(|v| v > PERCENT_SCALE_THRESHOLD);
    let mean_pop = mean_of(parsed.iter().filter_map(|p| p.population)).unwrap_or(SYNTHETIC_POPULATION);

    let mut states = ZoneStates::new();
    let mut raw_slopes = Vec::with_capacity(parsed.len());
    for p in parsed {
        let values = IndicatorMap::from_fn(|i| {
            let level = p.levels[i]
                .or(city_means[i])
                .unwrap_or_else(|| i.default_level());
            if i == Indicator::HealthIndex && percent_scale {
                level / 100.0
            } else {
                level
            }
        });
        states.insert(p.zone.clone(), ZoneState::new(values, p.population.unwrap_or(mean_pop)));
        raw_slopes.push((p.zone, p.slopes));
    }

    let slopes = normalize_slopes(raw_slopes, units, window_years);
    tracing::info!("Loaded historical baseline for {} zones", states.len());
    Ok((states, slopes))
}
