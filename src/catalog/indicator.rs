//! Indicator schema: the fixed set of tracked metrics
//!
//! Every indicator is a fraction in [0,1]. Each has an improvement
//! direction (used for scoring and calibration) and an annual cap that
//! bounds how far it can move in a single simulated year.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::core::error::PolicySimError;

/// Which way is "better" for an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
    /// Tracked for equity reporting only
    Neutral,
}

impl Direction {
    /// Sign multiplier used for scoring (+1 / -1 / 0)
    pub fn sign(self) -> f64 {
        match self {
            Direction::HigherIsBetter => 1.0,
            Direction::LowerIsBetter => -1.0,
            Direction::Neutral => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Diabetes,
    Disabled,
    Employed,
    HealthIndex,
    HighBp,
    KidneyDisease,
    Bipoc,
    NoDoctor,
}

impl Indicator {
    pub const COUNT: usize = 8;

    pub const ALL: [Indicator; Self::COUNT] = [
        Indicator::Diabetes,
        Indicator::Disabled,
        Indicator::Employed,
        Indicator::HealthIndex,
        Indicator::HighBp,
        Indicator::KidneyDisease,
        Indicator::Bipoc,
        Indicator::NoDoctor,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Indicator::Diabetes => "diabetes",
            Indicator::Disabled => "disabled",
            Indicator::Employed => "employed",
            Indicator::HealthIndex => "health_index",
            Indicator::HighBp => "high_bp",
            Indicator::KidneyDisease => "kidney_disease",
            Indicator::Bipoc => "bipoc",
            Indicator::NoDoctor => "no_doctor",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Indicator::Employed | Indicator::HealthIndex => Direction::HigherIsBetter,
            Indicator::Bipoc => Direction::Neutral,
            _ => Direction::LowerIsBetter,
        }
    }

    /// Maximum absolute change permitted in one year
    ///
    /// Kept tight so that no combination of policies and events
    /// produces drastic year-over-year swings.
    pub fn annual_cap(self) -> f64 {
        match self {
            Indicator::Diabetes => 0.010,
            Indicator::HighBp => 0.010,
            Indicator::KidneyDisease => 0.005,
            Indicator::NoDoctor => 0.015,
            Indicator::Employed => 0.015,
            Indicator::Disabled => 0.006,
            Indicator::HealthIndex => 0.015,
            Indicator::Bipoc => 0.020,
        }
    }

    /// Typical city level, used when a data source omits the indicator entirely
    pub fn default_level(self) -> f64 {
        match self {
            Indicator::Diabetes => 0.10,
            Indicator::Disabled => 0.08,
            Indicator::Employed => 0.60,
            Indicator::HealthIndex => 0.50,
            Indicator::HighBp => 0.25,
            Indicator::KidneyDisease => 0.03,
            Indicator::Bipoc => 0.50,
            Indicator::NoDoctor => 0.12,
        }
    }

    /// Headline metrics shielded from small erosion each year
    pub fn is_headline(self) -> bool {
        matches!(self, Indicator::Employed | Indicator::HealthIndex)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Indicator {
    type Err = PolicySimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Indicator::ALL
            .into_iter()
            .find(|i| i.name() == s.trim())
            .ok_or_else(|| PolicySimError::UnknownIndicator(s.to_string()))
    }
}

/// A fixed-size record holding one value per indicator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorMap<T>([T; Indicator::COUNT]);

impl<T: Copy> IndicatorMap<T> {
    pub fn splat(value: T) -> Self {
        Self([value; Indicator::COUNT])
    }

    pub fn from_fn(mut f: impl FnMut(Indicator) -> T) -> Self {
        Self(Indicator::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Indicator, T)> + '_ {
        Indicator::ALL.into_iter().map(move |i| (i, self.0[i.slot()]))
    }

    pub fn map<U: Copy>(&self, mut f: impl FnMut(Indicator, T) -> U) -> IndicatorMap<U> {
        IndicatorMap::from_fn(|i| f(i, self[i]))
    }
}

impl<T: Copy + Default> Default for IndicatorMap<T> {
    fn default() -> Self {
        Self::splat(T::default())
    }
}

impl<T> Index<Indicator> for IndicatorMap<T> {
    type Output = T;

    fn index(&self, indicator: Indicator) -> &T {
        &self.0[indicator.slot()]
    }
}

impl<T> IndexMut<Indicator> for IndicatorMap<T> {
    fn index_mut(&mut self, indicator: Indicator) -> &mut T {
        &mut self.0[indicator.slot()]
    }
}

impl<T: Serialize> Serialize for IndicatorMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Indicator::COUNT))?;
        for indicator in Indicator::ALL {
            map.serialize_entry(indicator.name(), &self.0[indicator.slot()])?;
        }
        map.end()
    }
}
