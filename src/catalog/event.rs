//! Random adverse events
//!
//! Each template has a fixed per-indicator effect and a fixed annual
//! probability. Activation is sampled independently per zone per year.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::indicator::{Indicator, IndicatorMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    DiseaseOutbreak,
    ClinicClosure,
    NaturalDisaster,
    FundingCut,
}

impl EventKind {
    /// Templates in sampling order
    pub const ALL: [EventKind; 4] = [
        EventKind::DiseaseOutbreak,
        EventKind::ClinicClosure,
        EventKind::NaturalDisaster,
        EventKind::FundingCut,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::DiseaseOutbreak => "Disease outbreak",
            EventKind::ClinicClosure => "Clinic closure",
            EventKind::NaturalDisaster => "Natural disaster",
            EventKind::FundingCut => "Funding cut",
        }
    }

    pub fn annual_probability(self) -> f64 {
        match self {
            EventKind::DiseaseOutbreak => 0.04,
            EventKind::ClinicClosure => 0.03,
            EventKind::NaturalDisaster => 0.02,
            EventKind::FundingCut => 0.03,
        }
    }

    pub fn effects(self) -> &'static [(Indicator, f64)] {
        use Indicator::*;
        match self {
            EventKind::DiseaseOutbreak => &[(Diabetes, 0.0015), (HighBp, 0.0020), (HealthIndex, -0.0020)],
            EventKind::ClinicClosure => &[(NoDoctor, 0.0020), (HealthIndex, -0.0010)],
            EventKind::NaturalDisaster => &[(Employed, -0.0040), (Disabled, 0.0010), (HealthIndex, -0.0030)],
            EventKind::FundingCut => &[(Employed, -0.0015), (NoDoctor, 0.0010)],
        }
    }
}

/// Sample the events that strike one zone this year
///
/// Draws exactly one uniform value per template, in template order, so the
/// number of draws consumed is independent of the outcome.
pub fn sample_events<R: Rng + ?Sized>(rng: &mut R) -> Vec<EventKind> {
    EventKind::ALL
        .into_iter()
        .filter(|kind| rng.gen::<f64>() < kind.annual_probability())
        .collect()
}

/// Sum of the fixed effects of every activated event
pub fn combined_effects(events: &[EventKind]) -> IndicatorMap<f64> {
    let mut total = IndicatorMap::splat(0.0);
    for event in events {
        for &(indicator, delta) in event.effects() {
            total[indicator] += delta;
        }
    }
    total
}

/// Comma-joined event names, as shown in a zone record
pub fn event_label(events: &[EventKind]) -> String {
    events.iter().map(|e| e.name()).collect::<Vec<_>>().join(", ")
}
