//! Simulation core
//!
//! Need-weighted allocation, the stability auto-tuner, the year-transition
//! engine and the composite scorer, plus the session object that threads
//! zone state between years.

pub mod allocation;
pub mod engine;
pub mod output;
pub mod score;
pub mod session;
pub mod tuner;
pub mod zone;

pub use engine::{advance_year, PolicyInputs, YearOutcome, ZoneRecord};
pub use output::RunOutput;
pub use score::composite_score;
pub use session::{Session, YearScore};
pub use tuner::{auto_stability_tune, Calibration};
pub use zone::{SlopeTable, ZoneState, ZoneStates};
