//! Simulation session: caller-owned state threaded between year-advances

use rand::Rng;
use serde::Serialize;

use crate::catalog::indicator::IndicatorMap;
use crate::core::types::{Year, ZoneId};
use crate::simulation::engine::{advance_year, PolicyInputs, YearOutcome, ZoneRecord};
use crate::simulation::tuner::{auto_stability_tune, Calibration};
use crate::simulation::zone::{SlopeTable, ZoneStates};

/// Composite score of one simulated year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearScore {
    pub year: Year,
    pub score: f64,
}

/// Session state: current zones plus append-only per-year history
///
/// The zone set is fixed for the life of a session. History only grows
/// through [`Session::advance`] and is cleared by [`Session::reset`].
#[derive(Debug, Clone)]
pub struct Session {
    start_year: Year,
    baseline: ZoneStates,
    slopes: SlopeTable,
    states: ZoneStates,
    history: Vec<Vec<ZoneRecord>>,
    scores: Vec<YearScore>,
}

impl Session {
    /// Start a session from a baseline snapshot taken at `start_year - 1`
    pub fn new(baseline: ZoneStates, slopes: SlopeTable, start_year: Year) -> Self {
        tracing::info!(
            "Session started: {} zones, {} with slope history, first year {}",
            baseline.len(),
            slopes.len(),
            start_year
        );
        Self {
            start_year,
            states: baseline.clone(),
            baseline,
            slopes,
            history: Vec::new(),
            scores: Vec::new(),
        }
    }

    /// Year the next call to [`Session::advance`] will simulate
    pub fn current_year(&self) -> Year {
        self.start_year + self.scores.len() as Year
    }

    pub fn start_year(&self) -> Year {
        self.start_year
    }

    pub fn baseline(&self) -> &ZoneStates {
        &self.baseline
    }

    pub fn slopes(&self) -> &SlopeTable {
        &self.slopes
    }

    pub fn states(&self) -> &ZoneStates {
        &self.states
    }

    pub fn history(&self) -> &[Vec<ZoneRecord>] {
        &self.history
    }

    pub fn scores(&self) -> &[YearScore] {
        &self.scores
    }

    pub fn years_run(&self) -> usize {
        self.scores.len()
    }

    /// Calibrate for the given budget inputs
    ///
    /// With the stability preset the auto-tuner runs against the baseline
    /// snapshot; without it the catalog tables are used with `default_floor`.
    pub fn recalibrate(&self, inputs: &PolicyInputs, stability_preset: bool, default_floor: f64) -> Calibration {
        let calibration = if stability_preset {
            auto_stability_tune(&self.slopes, inputs.city_budget, &inputs.splits, &self.baseline)
        } else {
            Calibration::base(default_floor)
        };
        tracing::info!(
            "Calibrated: preset={}, floor ${:.0}/capita, unmet targets {:?}",
            stability_preset,
            calibration.floor_pc,
            calibration.unmet_targets
        );
        calibration
    }

    /// Simulate one year and append it to history
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        inputs: &PolicyInputs,
        calibration: &Calibration,
        rng: &mut R,
    ) -> &[ZoneRecord] {
        let year = self.current_year();
        let YearOutcome { states, records, score, .. } =
            advance_year(year, &self.states, &self.slopes, inputs, calibration, rng);

        self.states = states;
        self.scores.push(YearScore { year, score });
        self.history.push(records);
        self.history.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop all history and restore the baseline snapshot
    pub fn reset(&mut self) {
        tracing::info!("Session reset after {} simulated years", self.scores.len());
        self.states = self.baseline.clone();
        self.history.clear();
        self.scores.clear();
    }

    /// Citywide mean of every indicator, one entry per simulated year
    pub fn city_averages(&self) -> Vec<(Year, IndicatorMap<f64>)> {
        self.history
            .iter()
            .filter_map(|records| {
                let first = records.first()?;
                let n = records.len() as f64;
                let avg = IndicatorMap::from_fn(|i| records.iter().map(|r| r.values[i]).sum::<f64>() / n);
                Some((first.year, avg))
            })
            .collect()
    }

    /// Every record for one zone across history
    pub fn zone_history(&self, zone: &ZoneId) -> Vec<&ZoneRecord> {
        self.history
            .iter()
            .flat_map(|records| records.iter().filter(move |r| &r.zone == zone))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::indicator::Indicator;
    use crate::simulation::zone::ZoneState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session() -> Session {
        let mut baseline = ZoneStates::new();
        for code in ["1", "2", "3"] {
            baseline.insert(ZoneId::new(code).unwrap(), ZoneState::new(IndicatorMap::splat(0.5), 20_000.0));
        }
        Session::new(baseline, SlopeTable::new(), 2025)
    }

    #[test]
    fn test_advance_appends_history() {
        let mut s = session();
        let inputs = PolicyInputs::default();
        let cal = s.recalibrate(&inputs, false, 25.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        assert_eq!(s.current_year(), 2025);
        let rows = s.advance(&inputs, &cal, &mut rng).len();
        assert_eq!(rows, 3);
        s.advance(&inputs, &cal, &mut rng);

        assert_eq!(s.years_run(), 2);
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.scores()[0].year, 2025);
        assert_eq!(s.scores()[1].year, 2026);
        assert_eq!(s.current_year(), 2027);
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut s = session();
        let inputs = PolicyInputs::default();
        let cal = s.recalibrate(&inputs, true, 25.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        s.advance(&inputs, &cal, &mut rng);
        assert_ne!(s.states(), s.baseline());

        s.reset();
        assert_eq!(s.states(), s.baseline());
        assert!(s.history().is_empty());
        assert!(s.scores().is_empty());
        assert_eq!(s.current_year(), 2025);
    }

    #[test]
    fn test_city_averages_and_zone_history() {
        let mut s = session();
        let inputs = PolicyInputs::default();
        let cal = s.recalibrate(&inputs, false, 25.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..3 {
            s.advance(&inputs, &cal, &mut rng);
        }

        let avgs = s.city_averages();
        assert_eq!(avgs.len(), 3);
        assert!(avgs[2].1[Indicator::Employed] > avgs[0].1[Indicator::Employed]);

        let zone = ZoneId::new("2").unwrap();
        let rows = s.zone_history(&zone);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.zone == zone));
    }
}
