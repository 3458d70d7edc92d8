//! Stability auto-tuner
//!
//! Rescales policy max-effects and raises the per-capita floor until the
//! expected annual change of the headline metrics (historical median slope
//! plus expected policy gain at mean population) clears a small positive
//! target. A bounded greedy search: deterministic, but with no global
//! optimality guarantee. Targets the search fails to reach within its
//! iteration budget are reported in [`Calibration::unmet_targets`].

use serde::Serialize;

use crate::catalog::indicator::{Indicator, IndicatorMap};
use crate::catalog::policy::{diminishing_returns, EffectTable, HalfPoints, Policy, PolicyMap, PolicySplits};
use crate::simulation::zone::{mean_population, SlopeTable, ZoneStates};

/// Floor the search starts from (USD per capita)
pub const TUNER_START_FLOOR: f64 = 30.0;
/// Floor increment per headline iteration
pub const TUNER_FLOOR_STEP: f64 = 5.0;
/// Floor ceiling
pub const TUNER_MAX_FLOOR: f64 = 120.0;

/// Headline metrics must gain at least this much per year
pub const HEADLINE_TARGET: f64 = 0.002;
pub const HEADLINE_MAX_ITERATIONS: u32 = 12;
pub const HEADLINE_EFFECT_STEP: f64 = 1.25;

/// Adverse-trending secondary metrics must improve at least this much
pub const SECONDARY_TARGET: f64 = 0.001;
pub const SECONDARY_MAX_ITERATIONS: u32 = 8;
pub const SECONDARY_EFFECT_STEP: f64 = 1.15;

const HEADLINE_LEVERS: [(Indicator, Policy); 2] = [
    (Indicator::Employed, Policy::Jobs),
    (Indicator::HealthIndex, Policy::Clinics),
];

const SECONDARY_LEVERS: [(Indicator, Policy); 3] = [
    (Indicator::NoDoctor, Policy::Clinics),
    (Indicator::Diabetes, Policy::Campaigns),
    (Indicator::HighBp, Policy::Campaigns),
];

/// Parameters the year-transition engine runs with
///
/// Always replaced wholesale when budget, splits or the preset change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibration {
    /// Minimum per-capita spend for every policy in every zone
    pub floor_pc: f64,
    pub max_effects: EffectTable,
    pub half_points: HalfPoints,
    /// Metrics whose target the bounded search could not reach
    pub unmet_targets: Vec<Indicator>,
}

impl Calibration {
    /// Untuned catalog tables with the given floor
    pub fn base(floor_pc: f64) -> Self {
        Self {
            floor_pc,
            max_effects: EffectTable::base(),
            half_points: HalfPoints::base(),
            unmet_targets: Vec::new(),
        }
    }

    pub fn is_fully_met(&self) -> bool {
        self.unmet_targets.is_empty()
    }
}

struct Search<'a> {
    city_budget: f64,
    splits_pct: PolicyMap<f64>,
    mean_pop: f64,
    median: &'a IndicatorMap<f64>,
    calibration: Calibration,
}

impl Search<'_> {
    /// Expected gain on `indicator` from `policy` in a typical zone
    ///
    /// Assumes a full (unit) need weight and the current floor.
    fn expected_gain(&self, indicator: Indicator, policy: Policy) -> f64 {
        let share = self.splits_pct[policy] / 100.0;
        let pc = (self.city_budget * share / self.mean_pop.max(1.0)).max(self.calibration.floor_pc);
        let sat = diminishing_returns(pc, self.calibration.half_points.get(policy));
        self.calibration.max_effects.get(policy, indicator) * sat
    }

    /// Net drift in the indicator's favorable direction
    fn favorable_net(&self, indicator: Indicator, policy: Policy) -> f64 {
        let dir = if indicator.direction().sign() > 0.0 { 1.0 } else { -1.0 };
        dir * self.median[indicator] + dir * self.expected_gain(indicator, policy)
    }

    fn tune_headline(&mut self, indicator: Indicator, policy: Policy) -> bool {
        for _ in 0..HEADLINE_MAX_ITERATIONS {
            if self.median[indicator] + self.expected_gain(indicator, policy) >= HEADLINE_TARGET {
                return true;
            }
            self.calibration.max_effects.scale(policy, indicator, HEADLINE_EFFECT_STEP);
            self.calibration.floor_pc = (self.calibration.floor_pc + TUNER_FLOOR_STEP).min(TUNER_MAX_FLOOR);
        }
        self.median[indicator] + self.expected_gain(indicator, policy) >= HEADLINE_TARGET
    }

    fn tune_secondary(&mut self, indicator: Indicator, policy: Policy) -> bool {
        for _ in 0..SECONDARY_MAX_ITERATIONS {
            if self.favorable_net(indicator, policy) >= SECONDARY_TARGET {
                return true;
            }
            self.calibration.max_effects.scale(policy, indicator, SECONDARY_EFFECT_STEP);
        }
        self.favorable_net(indicator, policy) >= SECONDARY_TARGET
    }
}

/// Calibrate floor and max-effects for the stability preset
///
/// Pure function of budget, splits, the snapshot's populations and the
/// slopes' medians.
pub fn auto_stability_tune(
    slopes: &SlopeTable,
    city_budget: f64,
    splits: &PolicySplits,
    snapshot: &ZoneStates,
) -> Calibration {
    let median = slopes.median();
    let mut search = Search {
        city_budget,
        splits_pct: splits.normalized(),
        mean_pop: mean_population(snapshot),
        median: &median,
        calibration: Calibration::base(TUNER_START_FLOOR),
    };

    let mut unmet = Vec::new();
    for (indicator, policy) in HEADLINE_LEVERS {
        if !search.tune_headline(indicator, policy) {
            unmet.push(indicator);
        }
    }
    for (indicator, policy) in SECONDARY_LEVERS {
        if !search.tune_secondary(indicator, policy) {
            unmet.push(indicator);
        }
    }

    if !unmet.is_empty() {
        tracing::warn!(
            "Stability tuning left targets unmet for {:?} (floor ${:.0}/capita)",
            unmet,
            search.calibration.floor_pc
        );
    }

    let mut calibration = search.calibration;
    calibration.unmet_targets = unmet;
    calibration
}
