//! Core type definitions used throughout the codebase

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::core::error::{PolicySimError, Result};

/// Width of a canonical zone key (ZIP code)
pub const ZONE_ID_WIDTH: usize = 5;

/// Simulation year
pub type Year = u32;

/// Unique identifier for a zone: a fixed-width, zero-padded code
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Canonicalize a raw key: trim, then left-pad with zeros to 5 characters.
    ///
    /// Keys that are empty, longer than 5 characters, or contain anything
    /// other than ASCII alphanumerics are rejected.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.len() > ZONE_ID_WIDTH
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(PolicySimError::InvalidZoneId(raw.to_string()));
        }
        Ok(Self(format!("{:0>width$}", trimmed, width = ZONE_ID_WIDTH)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ZoneId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ZoneId::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Clamp to the unit interval, coercing NaN to 0.0
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
