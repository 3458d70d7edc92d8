//! Year-transition engine
//!
//! One call advances every zone by one year:
//! 1. Need-weight zones and allocate each policy's pool per capita
//! 2. Sample adverse events (sequentially, in zone order)
//! 3. Start each indicator's delta from its historical slope
//! 4. Add saturating policy effects, then event effects
//! 5. Clip to annual caps, apply the headline non-worsening bias, clamp to [0,1]
//! 6. Nudge population by employment
//!
//! Allocation and events are computed from a frozen snapshot, after which
//! zones are independent and are transitioned in parallel above
//! [`PARALLEL_THRESHOLD`] zones.

use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::catalog::event::{combined_effects, event_label, sample_events, EventKind};
use crate::catalog::indicator::{Indicator, IndicatorMap};
use crate::catalog::policy::{diminishing_returns, Policy, PolicyMap, PolicySplits};
use crate::core::types::{clamp01, Year, ZoneId};
use crate::simulation::allocation::{allocate, need_weights};
use crate::simulation::score::composite_score;
use crate::simulation::tuner::Calibration;
use crate::simulation::zone::{SlopeTable, ZoneState, ZoneStates, MIN_POPULATION};

/// Minimum zone count before transitions run on the rayon pool
pub const PARALLEL_THRESHOLD: usize = 1000;

/// Headline deltas in (-BIAS_BAND, 0) are forced to zero
pub const BIAS_BAND: f64 = 0.002;

/// Employment rate at which population is stable
pub const POPULATION_PIVOT: f64 = 0.6;
/// Population growth per unit of employment above the pivot
pub const POPULATION_SENSITIVITY: f64 = 0.002;

/// Budget-side inputs to a year-advance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyInputs {
    pub city_budget: f64,
    pub splits: PolicySplits,
    pub effect_multiplier: f64,
    pub events_enabled: bool,
}

impl Default for PolicyInputs {
    fn default() -> Self {
        Self {
            city_budget: 30_000_000.0,
            splits: PolicySplits::default(),
            effect_multiplier: 1.0,
            events_enabled: false,
        }
    }
}

/// One zone's row in a year's record table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRecord {
    pub year: Year,
    pub zone: ZoneId,
    pub population: f64,
    /// Comma-joined names of the events that struck this year
    pub events: String,
    pub values: IndicatorMap<f64>,
    /// Composite risk after this year's transition, see [`ZoneState::risk`]
    pub risk: f64,
    /// Per-capita allocation for each policy (USD)
    pub per_capita: PolicyMap<f64>,
}

/// Everything one year-advance produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearOutcome {
    pub year: Year,
    #[serde(skip)]
    pub states: ZoneStates,
    pub records: Vec<ZoneRecord>,
    pub score: f64,
}

/// Clip a delta to the indicator's annual cap, then shield headline
/// metrics from small erosion
pub fn bounded_delta(indicator: Indicator, delta: f64) -> f64 {
    let cap = indicator.annual_cap();
    let clipped = if delta.is_nan() { 0.0 } else { delta.clamp(-cap, cap) };
    apply_stability_bias(indicator, clipped)
}

/// Headline metrics never erode by less than [`BIAS_BAND`] in a year
pub fn apply_stability_bias(indicator: Indicator, delta: f64) -> f64 {
    if indicator.is_headline() && delta < 0.0 && delta > -BIAS_BAND {
        0.0
    } else {
        delta
    }
}

/// Population drifts up when employment exceeds the pivot, down otherwise
pub fn next_population(population: f64, employed: f64) -> f64 {
    (population * (1.0 + POPULATION_SENSITIVITY * (employed - POPULATION_PIVOT))).max(MIN_POPULATION)
}

/// Pre-cap delta for every indicator of one zone
fn applied_deltas(
    slopes: &IndicatorMap<f64>,
    per_capita: &PolicyMap<f64>,
    calibration: &Calibration,
    effect_multiplier: f64,
    events: &[EventKind],
) -> IndicatorMap<f64> {
    let mut applied = *slopes;

    for policy in Policy::ALL {
        let sat = diminishing_returns(per_capita[policy], calibration.half_points.get(policy));
        for &target in policy.targets() {
            applied[target] += effect_multiplier * calibration.max_effects.get(policy, target) * sat;
        }
    }

    let shocks = combined_effects(events);
    applied.map(|i, d| d + shocks[i])
}

struct ZonePlan<'a> {
    zone: &'a ZoneId,
    state: &'a ZoneState,
    per_capita: PolicyMap<f64>,
    events: Vec<EventKind>,
}

fn transition(
    plan: &ZonePlan<'_>,
    year: Year,
    slopes: &SlopeTable,
    calibration: &Calibration,
    effect_multiplier: f64,
) -> (ZoneState, ZoneRecord) {
    let applied = applied_deltas(
        &slopes.get(plan.zone),
        &plan.per_capita,
        calibration,
        effect_multiplier,
        &plan.events,
    );

    let values = plan
        .state
        .values
        .map(|i, old| clamp01(old + bounded_delta(i, applied[i])));
    let population = next_population(plan.state.population, values[Indicator::Employed]);
    let next = ZoneState { values, population };

    let record = ZoneRecord {
        year,
        zone: plan.zone.clone(),
        population,
        events: event_label(&plan.events),
        values,
        risk: next.risk(),
        per_capita: plan.per_capita,
    };

    (next, record)
}

/// Advance every zone by one year
///
/// Deterministic given identical inputs and an identically-seeded `rng`.
/// Zones present in `states` but absent from `slopes` drift with zero slope.
pub fn advance_year<R: Rng + ?Sized>(
    year: Year,
    states: &ZoneStates,
    slopes: &SlopeTable,
    inputs: &PolicyInputs,
    calibration: &Calibration,
    rng: &mut R,
) -> YearOutcome {
    let splits_pct = inputs.splits.normalized();
    let weights = need_weights(states);

    // Sequential: RNG draws must happen in a fixed zone order
    let plans: Vec<ZonePlan<'_>> = states
        .iter()
        .map(|(zone, state)| {
            let weight = weights.get(zone).copied().unwrap_or(0.0);
            let per_capita = allocate(
                inputs.city_budget,
                &splits_pct,
                state.population,
                weight,
                calibration.floor_pc,
            );
            let events = if inputs.events_enabled { sample_events(rng) } else { Vec::new() };
            ZonePlan { zone, state, per_capita, events }
        })
        .collect();

    let run = |plan: &ZonePlan<'_>| {
        transition(plan, year, slopes, calibration, inputs.effect_multiplier)
    };
    let results: Vec<(ZoneState, ZoneRecord)> = if plans.len() >= PARALLEL_THRESHOLD {
        plans.par_iter().map(run).collect()
    } else {
        plans.iter().map(run).collect()
    };

    let struck = plans.iter().filter(|p| !p.events.is_empty()).count();
    let mut next_states = ZoneStates::new();
    let mut records = Vec::with_capacity(results.len());
    for (state, record) in results {
        next_states.insert(record.zone.clone(), state);
        records.push(record);
    }

    let score = composite_score(&records);
    tracing::debug!(
        "Year {}: {} zones advanced, {} struck by events, score {:.1}",
        year,
        records.len(),
        struck,
        score
    );

    YearOutcome {
        year,
        states: next_states,
        records,
        score,
    }
}
