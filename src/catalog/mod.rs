//! Static registries: indicators, policies and event templates

pub mod event;
pub mod indicator;
pub mod policy;

pub use event::EventKind;
pub use indicator::{Direction, Indicator, IndicatorMap};
pub use policy::{diminishing_returns, EffectTable, HalfPoints, Policy, PolicyMap, PolicySplits};
