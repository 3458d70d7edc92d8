//! Property tests for the simulation invariants
//!
//! - Values stay in [0,1] and never move more than their annual cap
//! - Headline erosion under the bias band is suppressed
//! - Saturation, weights, splits and score stay within their ranges

use health_policy_sim::catalog::{diminishing_returns, Indicator, IndicatorMap, PolicySplits};
use health_policy_sim::core::ZoneId;
use health_policy_sim::simulation::allocation::need_weights;
use health_policy_sim::simulation::engine::{apply_stability_bias, BIAS_BAND};
use health_policy_sim::simulation::{
    advance_year, auto_stability_tune, Calibration, PolicyInputs, SlopeTable, ZoneState, ZoneStates,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn levels() -> impl Strategy<Value = IndicatorMap<f64>> {
    prop::array::uniform8(0.0f64..=1.0).prop_map(|a| IndicatorMap::from_fn(|i| a[i as usize]))
}

fn wild_slopes() -> impl Strategy<Value = IndicatorMap<f64>> {
    prop::array::uniform8(-2.0f64..2.0).prop_map(|a| IndicatorMap::from_fn(|i| a[i as usize]))
}

fn any_splits() -> impl Strategy<Value = PolicySplits> {
    (0.0f64..500.0, 0.0f64..500.0, 0.0f64..500.0, 0.0f64..500.0).prop_map(|(c, p, j, e)| PolicySplits {
        clinics: c,
        campaigns: p,
        jobs: j,
        equity: e,
    })
}

fn city() -> impl Strategy<Value = (ZoneStates, SlopeTable)> {
    prop::collection::vec((levels(), wild_slopes(), 100.0f64..200_000.0), 1..12).prop_map(|zones| {
        let mut states = ZoneStates::new();
        let mut slopes = SlopeTable::new();
        for (n, (values, slope, pop)) in zones.into_iter().enumerate() {
            let id = ZoneId::new(&(20_000 + n).to_string()).unwrap();
            states.insert(id.clone(), ZoneState::new(values, pop));
            slopes.insert(id, slope);
        }
        (states, slopes)
    })
}

proptest! {
    #[test]
    fn prop_values_clamped_and_capped(
        (states, slopes) in city(),
        budget in 0.0f64..5e9,
        splits in any_splits(),
        multiplier in 0.0f64..5.0,
        events in any::<bool>(),
        tuned in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let inputs = PolicyInputs { city_budget: budget, splits, effect_multiplier: multiplier, events_enabled: events };
        let cal = if tuned {
            auto_stability_tune(&slopes, budget, &splits, &states)
        } else {
            Calibration::base(25.0)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let out = advance_year(2025, &states, &slopes, &inputs, &cal, &mut rng);

        prop_assert_eq!(out.states.len(), states.len());
        for (zone, next) in &out.states {
            let prev = &states[zone];
            prop_assert!(next.population >= 100.0);
            for (indicator, value) in next.values.iter() {
                prop_assert!((0.0..=1.0).contains(&value));
                let change = (value - prev.get(indicator)).abs();
                prop_assert!(change <= indicator.annual_cap() + 1e-12, "{} moved {}", indicator, change);
            }
        }
        prop_assert!((0.0..=100.0).contains(&out.score));
    }

    #[test]
    fn prop_headline_bias(delta in -0.05f64..0.05) {
        for indicator in [Indicator::Employed, Indicator::HealthIndex] {
            let biased = apply_stability_bias(indicator, delta);
            if delta < 0.0 && delta > -BIAS_BAND {
                prop_assert_eq!(biased, 0.0);
            } else {
                prop_assert_eq!(biased, delta);
            }
        }
        prop_assert_eq!(apply_stability_bias(Indicator::Diabetes, delta), delta);
    }

    #[test]
    fn prop_saturation_bounds(pc in 0.0f64..1e9, half in 0.01f64..1e4) {
        let s = diminishing_returns(pc, half);
        prop_assert!((0.0..1.0).contains(&s), "saturation {} at {}/{}", s, pc, half);
        prop_assert!(diminishing_returns(pc + 1.0, half) >= s);
    }

    #[test]
    fn prop_need_weights_sum_to_one((states, _) in city()) {
        let weights = need_weights(&states);
        let total: f64 = weights.values().sum();
        let any_need = weights.values().any(|w| *w > 0.0);
        if any_need {
            prop_assert!((total - 1.0).abs() < 1e-9);
        }
        prop_assert!(weights.values().all(|w| *w >= 0.0));
    }

    #[test]
    fn prop_split_normalization(splits in any_splits()) {
        let raw_total = splits.clinics + splits.campaigns + splits.jobs + splits.equity;
        prop_assume!(raw_total > 0.0);
        let total: f64 = splits.normalized().iter().map(|(_, v)| v).sum();
        prop_assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn prop_tuner_is_deterministic((states, slopes) in city(), budget in 0.0f64..1e9) {
        let a = auto_stability_tune(&slopes, budget, &PolicySplits::default(), &states);
        let b = auto_stability_tune(&slopes, budget, &PolicySplits::default(), &states);
        prop_assert_eq!(&a, &b);
        prop_assert!(a.floor_pc >= 30.0 && a.floor_pc <= 120.0);
    }
}
