pub mod config;
pub mod error;
pub mod types;

pub use config::{Scenario, SimulationConfig};
pub use error::{PolicySimError, Result};
pub use types::{Year, ZoneId};
