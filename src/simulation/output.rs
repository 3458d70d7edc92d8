//! Run output and serialization

use serde::Serialize;
use std::time::Duration;

use crate::catalog::indicator::IndicatorMap;
use crate::core::types::Year;
use crate::simulation::engine::{PolicyInputs, ZoneRecord};
use crate::simulation::session::{Session, YearScore};
use crate::simulation::tuner::Calibration;

/// Complete output of a multi-year run
#[derive(Clone, Debug, Serialize)]
pub struct RunOutput {
    pub inputs: PolicyInputs,
    pub calibration: Calibration,
    pub scores: Vec<YearScore>,
    pub city_averages: Vec<CityAverage>,
    /// Record table of the last simulated year
    pub final_records: Vec<ZoneRecord>,
    pub statistics: RunStats,
}

#[derive(Clone, Debug, Serialize)]
pub struct CityAverage {
    pub year: Year,
    pub values: IndicatorMap<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunStats {
    pub zones: usize,
    pub years_simulated: usize,
    pub simulation_time_ms: u64,
    pub zone_years_with_events: usize,
    pub first_score: Option<f64>,
    pub final_score: Option<f64>,
}

impl RunOutput {
    pub fn new(session: &Session, inputs: PolicyInputs, calibration: Calibration, elapsed: Duration) -> Self {
        let zone_years_with_events = session
            .history()
            .iter()
            .flatten()
            .filter(|r| !r.events.is_empty())
            .count();

        let scores = session.scores().to_vec();

        Self {
            inputs,
            calibration,
            city_averages: session
                .city_averages()
                .into_iter()
                .map(|(year, values)| CityAverage { year, values })
                .collect(),
            final_records: session.history().last().cloned().unwrap_or_default(),
            statistics: RunStats {
                zones: session.states().len(),
                years_simulated: session.years_run(),
                simulation_time_ms: elapsed.as_millis() as u64,
                zone_years_with_events,
                first_score: scores.first().map(|s| s.score),
                final_score: scores.last().map(|s| s.score),
            },
            scores,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let fmt_score = |s: Option<f64>| s.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string());
        format!(
            "Simulated {} years over {} zones in {}ms\nScore {} -> {}, {} zone-years struck by events, floor ${:.0}/capita",
            self.statistics.years_simulated,
            self.statistics.zones,
            self.statistics.simulation_time_ms,
            fmt_score(self.statistics.first_score),
            fmt_score(self.statistics.final_score),
            self.statistics.zone_years_with_events,
            self.calibration.floor_pc,
        )
    }
}
