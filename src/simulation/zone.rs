//! Zone state and historical slopes

use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::catalog::indicator::{Indicator, IndicatorMap};
use crate::core::types::{clamp01, ZoneId};

/// Population never drops below this, keeping per-capita math well defined
pub const MIN_POPULATION: f64 = 100.0;

/// Current state of one zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneState {
    pub values: IndicatorMap<f64>,
    pub population: f64,
}

impl ZoneState {
    /// Build a state, sanitizing every value into [0,1] and flooring population
    pub fn new(values: IndicatorMap<f64>, population: f64) -> Self {
        let population = if population.is_finite() { population } else { MIN_POPULATION };
        Self {
            values: values.map(|_, v| clamp01(v)),
            population: population.max(MIN_POPULATION),
        }
    }

    pub fn get(&self, indicator: Indicator) -> f64 {
        self.values[indicator]
    }

    /// Composite risk shown on the zone map: disease burden, lack of access
    /// and low health index averaged together
    pub fn risk(&self) -> f64 {
        (self.get(Indicator::Diabetes)
            + self.get(Indicator::HighBp)
            + self.get(Indicator::NoDoctor)
            + (1.0 - self.get(Indicator::HealthIndex)))
            / 4.0
    }
}

/// All zones, ordered by key so iteration (and RNG consumption) is stable
pub type ZoneStates = BTreeMap<ZoneId, ZoneState>;

/// Mean population across zones (20000 when there are none)
pub fn mean_population(states: &ZoneStates) -> f64 {
    if states.is_empty() {
        return 20_000.0;
    }
    states.values().map(|s| s.population).sum::<f64>() / states.len() as f64
}

/// Per-zone expected organic annual change of each indicator
///
/// Values are per-year fractions; unit conversion happens before data
/// reaches this table.
#[derive(Debug, Clone, Default)]
pub struct SlopeTable {
    slopes: AHashMap<ZoneId, IndicatorMap<f64>>,
}

impl SlopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, zone: ZoneId, slopes: IndicatorMap<f64>) {
        let sanitized = slopes.map(|_, v| if v.is_finite() { v } else { 0.0 });
        self.slopes.insert(zone, sanitized);
    }

    /// Slopes for a zone; zero drift for zones without history
    pub fn get(&self, zone: &ZoneId) -> IndicatorMap<f64> {
        self.slopes.get(zone).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.slopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slopes.is_empty()
    }

    /// Override one indicator's slope in every zone
    pub fn set_all(&mut self, indicator: Indicator, slope: f64) {
        for entry in self.slopes.values_mut() {
            entry[indicator] = slope;
        }
    }

    /// Median slope per indicator across all zones (0 when empty)
    pub fn median(&self) -> IndicatorMap<f64> {
        IndicatorMap::from_fn(|indicator| {
            median(self.slopes.values().map(|s| s[indicator]).collect())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ZoneId, &IndicatorMap<f64>)> {
        self.slopes.iter()
    }
}

impl FromIterator<(ZoneId, IndicatorMap<f64>)> for SlopeTable {
    fn from_iter<I: IntoIterator<Item = (ZoneId, IndicatorMap<f64>)>>(iter: I) -> Self {
        let mut table = SlopeTable::new();
        for (zone, slopes) in iter {
            table.insert(zone, slopes);
        }
        table
    }
}

pub(crate) fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
