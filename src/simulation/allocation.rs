//! Need-weighting and per-capita budget allocation
//!
//! Each policy's city-wide pool is shared between zones in proportion to
//! need, then converted to dollars per resident. A per-capita floor keeps
//! low-weighted zones from stagnating entirely.

use std::collections::BTreeMap;

use crate::catalog::indicator::Indicator;
use crate::catalog::policy::{Policy, PolicyMap};
use crate::core::types::ZoneId;
use crate::simulation::zone::{ZoneState, ZoneStates};

/// Raw need of a zone: a fixed convex combination of disease burden,
/// lack of access, unemployment and low health index
pub fn raw_need(state: &ZoneState) -> f64 {
    0.25 * state.get(Indicator::Diabetes)
        + 0.25 * state.get(Indicator::HighBp)
        + 0.20 * state.get(Indicator::NoDoctor)
        + 0.15 * (1.0 - state.get(Indicator::Employed))
        + 0.15 * (1.0 - state.get(Indicator::HealthIndex))
}

/// Normalized need weights summing to 1 across zones
///
/// A zero total is treated as 1.0, so an all-zero city yields all-zero
/// weights and every zone falls back to the per-capita floor.
pub fn need_weights(states: &ZoneStates) -> BTreeMap<ZoneId, f64> {
    let needs: BTreeMap<ZoneId, f64> = states
        .iter()
        .map(|(zone, state)| (zone.clone(), raw_need(state)))
        .collect();
    let total: f64 = needs.values().sum();
    let total = if total == 0.0 { 1.0 } else { total };
    needs.into_iter().map(|(zone, n)| (zone, n / total)).collect()
}

/// Dollars per resident for one policy in one zone
///
/// `split_pct` is the policy's normalized share of the budget (0..=100).
pub fn per_capita(city_budget: f64, split_pct: f64, population: f64, weight: f64, floor_pc: f64) -> f64 {
    let pc = city_budget * (split_pct / 100.0) * weight / population.max(1.0);
    pc.max(floor_pc)
}

/// Per-capita allocation for every policy in one zone
pub fn allocate(
    city_budget: f64,
    splits_pct: &PolicyMap<f64>,
    population: f64,
    weight: f64,
    floor_pc: f64,
) -> PolicyMap<f64> {
    PolicyMap::from_fn(|p: Policy| per_capita(city_budget, splits_pct[p], population, weight, floor_pc))
}
