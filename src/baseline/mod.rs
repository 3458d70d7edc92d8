//! Data-loading boundary
//!
//! Everything between raw tabular data and the simulation core: equity
//! index validation, baseline synthesis, defaulting of missing levels and
//! slope unit normalization.

pub mod equity;
pub mod history;
pub mod slopes;

pub use equity::{load_equity_index, synthesize_from_equity, EquityScore, RawRecord};
pub use history::{baseline_from_history, HistoryRecord};
pub use slopes::{normalize_slopes, SlopeUnits};

use crate::core::config::Scenario;
use crate::core::error::Result;
use crate::simulation::zone::{SlopeTable, ZoneStates};

/// Build the starting snapshot for a scenario
///
/// Historical records are used when present. Otherwise the equity index is
/// required, and a missing `zip`/`equityscore` field is a schema error.
pub fn build_baseline(scenario: &Scenario) -> Result<(ZoneStates, SlopeTable)> {
    if !scenario.history.is_empty() {
        return baseline_from_history(
            &scenario.history,
            scenario.simulation.slope_units,
            scenario.simulation.slope_window_years,
        );
    }
    let scores = load_equity_index(&scenario.equity_records())?;
    Ok(synthesize_from_equity(&scores))
}
