//! Policy catalog: budget levers and their saturating effects
//!
//! Each policy targets a subset of indicators. At full funding saturation it
//! moves each target by a fixed signed amount per year; below saturation the
//! effect is scaled by [`diminishing_returns`].

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::catalog::indicator::{Indicator, IndicatorMap};
use crate::core::error::PolicySimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Clinics and access to care
    Clinics,
    /// Public health campaigns
    Campaigns,
    /// Job programs
    Jobs,
    /// Education and equity programs
    Equity,
}

impl Policy {
    pub const COUNT: usize = 4;

    pub const ALL: [Policy; Self::COUNT] =
        [Policy::Clinics, Policy::Campaigns, Policy::Jobs, Policy::Equity];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Policy::Clinics => "clinics",
            Policy::Campaigns => "campaigns",
            Policy::Jobs => "jobs",
            Policy::Equity => "equity",
        }
    }

    pub fn targets(self) -> &'static [Indicator] {
        match self {
            Policy::Clinics => &[Indicator::NoDoctor, Indicator::HealthIndex, Indicator::Employed],
            Policy::Campaigns => &[Indicator::Diabetes, Indicator::HighBp, Indicator::KidneyDisease],
            Policy::Jobs => &[Indicator::Employed, Indicator::Disabled],
            Policy::Equity => &[Indicator::NoDoctor, Indicator::HealthIndex],
        }
    }

    /// Per-capita spend (USD) at which the policy reaches ~63% of its maximum effect
    pub fn base_half_point(self) -> f64 {
        match self {
            Policy::Clinics => 120.0,
            Policy::Campaigns => 140.0,
            Policy::Jobs => 160.0,
            Policy::Equity => 100.0,
        }
    }

    /// Maximum annual effect on a target at full saturation (0 for non-targets)
    pub fn base_max_effect(self, indicator: Indicator) -> f64 {
        use Indicator::*;
        match (self, indicator) {
            (Policy::Clinics, NoDoctor) => -0.004,
            (Policy::Clinics, HealthIndex) => 0.003,
            (Policy::Clinics, Employed) => 0.0010,
            (Policy::Campaigns, Diabetes) => -0.0035,
            (Policy::Campaigns, HighBp) => -0.0035,
            (Policy::Campaigns, KidneyDisease) => -0.0012,
            (Policy::Jobs, Employed) => 0.0100,
            (Policy::Jobs, Disabled) => -0.0010,
            (Policy::Equity, NoDoctor) => -0.0025,
            (Policy::Equity, HealthIndex) => 0.0025,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = PolicySimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|p| p.name() == s.trim())
            .ok_or_else(|| PolicySimError::UnknownPolicy(s.to_string()))
    }
}

/// Saturation curve mapping per-capita spend to an effect fraction in [0, 1)
///
/// Negative spend is treated as zero. `half_point` must be positive; it is
/// floored at a tiny epsilon so the function stays total. Very large spend
/// would round to exactly 1.0, so the result is held just below it.
pub fn diminishing_returns(per_capita: f64, half_point: f64) -> f64 {
    let pc = per_capita.max(0.0);
    (1.0 - (-pc / half_point.max(1e-9)).exp()).min(1.0 - f64::EPSILON)
}

/// A fixed-size record holding one value per policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyMap<T>([T; Policy::COUNT]);

impl<T: Copy> PolicyMap<T> {
    pub fn splat(value: T) -> Self {
        Self([value; Policy::COUNT])
    }

    pub fn from_fn(mut f: impl FnMut(Policy) -> T) -> Self {
        Self(Policy::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Policy, T)> + '_ {
        Policy::ALL.into_iter().map(move |p| (p, self.0[p.slot()]))
    }
}

impl<T: Copy + Default> Default for PolicyMap<T> {
    fn default() -> Self {
        Self::splat(T::default())
    }
}

impl<T> Index<Policy> for PolicyMap<T> {
    type Output = T;

    fn index(&self, policy: Policy) -> &T {
        &self.0[policy.slot()]
    }
}

impl<T> IndexMut<Policy> for PolicyMap<T> {
    fn index_mut(&mut self, policy: Policy) -> &mut T {
        &mut self.0[policy.slot()]
    }
}

impl<T: Serialize> Serialize for PolicyMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Policy::COUNT))?;
        for policy in Policy::ALL {
            map.serialize_entry(policy.name(), &self.0[policy.slot()])?;
        }
        map.end()
    }
}

/// Max-effect table for every (policy, indicator) pair
///
/// Calibration produces scaled copies of this table; the base table is
/// never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectTable(PolicyMap<IndicatorMap<f64>>);

impl EffectTable {
    pub fn base() -> Self {
        Self(PolicyMap::from_fn(|p| {
            IndicatorMap::from_fn(|i| p.base_max_effect(i))
        }))
    }

    pub fn get(&self, policy: Policy, indicator: Indicator) -> f64 {
        self.0[policy][indicator]
    }

    /// Multiply one entry by `factor`
    pub fn scale(&mut self, policy: Policy, indicator: Indicator, factor: f64) {
        self.0[policy][indicator] *= factor;
    }
}

impl Default for EffectTable {
    fn default() -> Self {
        Self::base()
    }
}

/// Saturation half-points for every policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HalfPoints(PolicyMap<f64>);

impl HalfPoints {
    pub fn base() -> Self {
        Self(PolicyMap::from_fn(Policy::base_half_point))
    }

    pub fn get(&self, policy: Policy) -> f64 {
        self.0[policy]
    }
}

impl Default for HalfPoints {
    fn default() -> Self {
        Self::base()
    }
}

/// Raw budget split weights, as entered by a user
///
/// Magnitudes are arbitrary; [`PolicySplits::normalized`] rescales them to
/// percentages summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySplits {
    pub clinics: f64,
    pub campaigns: f64,
    pub jobs: f64,
    pub equity: f64,
}

impl Default for PolicySplits {
    fn default() -> Self {
        Self {
            clinics: 25.0,
            campaigns: 35.0,
            jobs: 30.0,
            equity: 10.0,
        }
    }
}

impl PolicySplits {
    pub fn get(&self, policy: Policy) -> f64 {
        match policy {
            Policy::Clinics => self.clinics,
            Policy::Campaigns => self.campaigns,
            Policy::Jobs => self.jobs,
            Policy::Equity => self.equity,
        }
    }

    /// Percentages summing to 100 (a zero total is treated as 1.0)
    pub fn normalized(&self) -> PolicyMap<f64> {
        let total: f64 = Policy::ALL.iter().map(|&p| self.get(p)).sum();
        let total = if total == 0.0 { 1.0 } else { total };
        PolicyMap::from_fn(|p| 100.0 * self.get(p) / total)
    }
}
