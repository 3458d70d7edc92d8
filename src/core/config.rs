//! Simulation configuration with documented defaults
//!
//! Defaults reproduce the stock scenario: a $30M annual budget split
//! 25/35/30/10 across clinics, campaigns, jobs and equity, events off and
//! the stability preset on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::baseline::equity::RawRecord;
use crate::baseline::history::HistoryRecord;
use crate::baseline::slopes::SlopeUnits;
use crate::catalog::policy::PolicySplits;
use crate::core::error::{PolicySimError, Result};
use crate::core::types::Year;
use crate::simulation::engine::PolicyInputs;

/// Upper bound on years a single run may simulate
pub const MAX_YEARS: u32 = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// First simulated year; the baseline snapshot is `start_year - 1`
    pub start_year: Year,

    /// Years to simulate in one run
    pub years: u32,

    /// Annual city budget (USD)
    pub city_budget: f64,

    /// Raw budget split weights; normalized to 100 before use
    pub splits: PolicySplits,

    /// Global multiplier on every policy effect
    ///
    /// The interactive range is 0.7–1.5. Values outside [0, 5] are rejected.
    pub effect_multiplier: f64,

    /// Sample random adverse events each year
    ///
    /// Off by default so that runs show policy effects without noise.
    pub events_enabled: bool,

    /// Run the stability auto-tuner before simulating
    pub stability_preset: bool,

    /// Per-capita floor (USD) used when the stability preset is off
    pub default_floor_pc: f64,

    /// Seed for the event random source
    pub seed: u64,

    /// Unit interpretation for historical slopes
    pub slope_units: SlopeUnits,

    /// Years spanned by each historical slope measurement
    pub slope_window_years: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_year: 2025,
            years: 10,
            city_budget: 30_000_000.0,
            splits: PolicySplits::default(),
            effect_multiplier: 1.0,
            events_enabled: false,
            stability_preset: true,
            default_floor_pc: 25.0,
            seed: 0x5EED_0FC1_7E,
            slope_units: SlopeUnits::Auto,
            slope_window_years: 1,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !self.city_budget.is_finite() || self.city_budget < 0.0 {
            return Err(PolicySimError::InvalidConfig(format!(
                "city_budget must be a non-negative number, got {}",
                self.city_budget
            )));
        }

        let splits = [
            ("clinics", self.splits.clinics),
            ("campaigns", self.splits.campaigns),
            ("jobs", self.splits.jobs),
            ("equity", self.splits.equity),
        ];
        for (name, value) in splits {
            if !value.is_finite() || value < 0.0 {
                return Err(PolicySimError::InvalidConfig(format!(
                    "split for {} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=5.0).contains(&self.effect_multiplier) {
            return Err(PolicySimError::InvalidConfig(format!(
                "effect_multiplier ({}) must be within [0, 5]",
                self.effect_multiplier
            )));
        }

        if self.years == 0 || self.years > MAX_YEARS {
            return Err(PolicySimError::InvalidConfig(format!(
                "years ({}) must be within 1..={}",
                self.years, MAX_YEARS
            )));
        }

        if !self.default_floor_pc.is_finite() || self.default_floor_pc < 0.0 {
            return Err(PolicySimError::InvalidConfig("default_floor_pc must be non-negative".into()));
        }

        if self.slope_window_years == 0 {
            return Err(PolicySimError::InvalidConfig("slope_window_years must be at least 1".into()));
        }

        Ok(())
    }

    /// Budget-side inputs for the engine
    pub fn policy_inputs(&self) -> PolicyInputs {
        PolicyInputs {
            city_budget: self.city_budget,
            splits: self.splits,
            effect_multiplier: self.effect_multiplier,
            events_enabled: self.events_enabled,
        }
    }
}

/// A scenario file: configuration plus the zone data to run it on
///
/// Historical records take precedence; equity rows are used to synthesize
/// a baseline when no history is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub simulation: SimulationConfig,
    pub equity: Vec<BTreeMap<String, toml::Value>>,
    pub history: Vec<HistoryRecord>,
}

impl Scenario {
    pub fn from_toml(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.simulation.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Equity rows as loader-neutral text records
    pub fn equity_records(&self) -> Vec<RawRecord> {
        self.equity
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(k, v)| {
                        let text = match v {
                            toml::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (k.trim().to_string(), text)
                    })
                    .collect()
            })
            .collect()
    }
}
