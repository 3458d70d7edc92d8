//! Integration tests for whole-session behavior
//!
//! These tests drive the public API the way a front end would:
//! - Build a baseline, calibrate, advance years
//! - Check headline metrics under the stability preset
//! - Check event reproducibility and the events-off guarantee

use health_policy_sim::catalog::{Indicator, IndicatorMap, Policy, PolicySplits};
use health_policy_sim::core::ZoneId;
use health_policy_sim::simulation::{
    advance_year, auto_stability_tune, Calibration, PolicyInputs, Session, SlopeTable, ZoneState,
    ZoneStates,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn zone(code: &str) -> ZoneId {
    ZoneId::new(code).unwrap()
}

fn reference_inputs() -> PolicyInputs {
    PolicyInputs {
        city_budget: 30_000_000.0,
        splits: PolicySplits { clinics: 25.0, campaigns: 35.0, jobs: 30.0, equity: 10.0 },
        effect_multiplier: 1.0,
        events_enabled: false,
    }
}

fn single_zone_city() -> ZoneStates {
    let mut states = ZoneStates::new();
    states.insert(zone("10001"), ZoneState::new(IndicatorMap::splat(0.5), 20_000.0));
    states
}

/// A varied city of `n` zones with random levels and mild random slopes
fn random_city(n: usize, seed: u64) -> (ZoneStates, SlopeTable) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut states = ZoneStates::new();
    let mut slopes = SlopeTable::new();
    for i in 0..n {
        let id = zone(&format!("{}", 10_000 + i));
        let values = IndicatorMap::from_fn(|_| rng.gen_range(0.05..0.95));
        let population = rng.gen_range(2_000.0..60_000.0);
        states.insert(id.clone(), ZoneState::new(values, population));
        slopes.insert(id, IndicatorMap::from_fn(|_| rng.gen_range(-0.004..0.004)));
    }
    (states, slopes)
}

#[test]
fn test_reference_scenario_employment_rises() {
    let states = single_zone_city();
    let calibration = Calibration::base(25.0);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let out = advance_year(2025, &states, &SlopeTable::new(), &reference_inputs(), &calibration, &mut rng);

    let before = states[&zone("10001")];
    let after = out.states[&zone("10001")];
    assert!(
        after.get(Indicator::Employed) > before.get(Indicator::Employed),
        "employed should rise, got {}",
        after.get(Indicator::Employed)
    );
    for (indicator, value) in after.values.iter() {
        assert!((0.0..=1.0).contains(&value));
        let change = (value - before.get(indicator)).abs();
        assert!(
            change <= indicator.annual_cap() + 1e-12,
            "{} moved {} (cap {})",
            indicator,
            change,
            indicator.annual_cap()
        );
    }
    assert!(out.records[0].per_capita[Policy::Jobs] > 0.0);
}

#[test]
fn test_stability_preset_holds_against_adverse_slopes() {
    let states = single_zone_city();
    let mut slopes = SlopeTable::new();
    slopes.insert(zone("10001"), IndicatorMap::splat(0.0));
    slopes.set_all(Indicator::Employed, -0.01);
    slopes.set_all(Indicator::HealthIndex, -0.01);

    let inputs = reference_inputs();
    let mut session = Session::new(states, slopes, 2025);
    let calibration = session.recalibrate(&inputs, true, 25.0);
    assert!(
        calibration.is_fully_met(),
        "targets should be reachable within the search bounds: {:?}",
        calibration.unmet_targets
    );

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let before = session.states()[&zone("10001")];
    for _ in 0..5 {
        session.advance(&inputs, &calibration, &mut rng);
    }
    let after = session.states()[&zone("10001")];

    assert!(after.get(Indicator::Employed) >= before.get(Indicator::Employed));
    assert!(after.get(Indicator::HealthIndex) >= before.get(Indicator::HealthIndex));
}

#[test]
fn test_without_preset_adverse_slopes_erode_health() {
    let states = single_zone_city();
    let mut slopes = SlopeTable::new();
    let mut s = IndicatorMap::splat(0.0);
    s[Indicator::HealthIndex] = -0.01;
    slopes.insert(zone("10001"), s);

    let inputs = reference_inputs();
    let mut session = Session::new(states, slopes, 2025);
    let calibration = session.recalibrate(&inputs, false, 25.0);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    session.advance(&inputs, &calibration, &mut rng);

    assert!(session.states()[&zone("10001")].get(Indicator::HealthIndex) < 0.5);
}

#[test]
fn test_preset_counters_adverse_secondary_drift() {
    let states = single_zone_city();
    let mut slopes = SlopeTable::new();
    slopes.insert(zone("10001"), IndicatorMap::splat(0.0));
    slopes.set_all(Indicator::Diabetes, 0.002);
    slopes.set_all(Indicator::HighBp, 0.01);

    let inputs = reference_inputs();
    let mut session = Session::new(states, slopes, 2025);
    let calibration = session.recalibrate(&inputs, true, 25.0);
    assert_eq!(calibration.unmet_targets, vec![Indicator::HighBp]);

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let before = session.states()[&zone("10001")];
    session.advance(&inputs, &calibration, &mut rng);
    let after = session.states()[&zone("10001")];

    // Both now fall, but high_bp by less than the 0.001 the search aimed for
    assert!(after.get(Indicator::Diabetes) < before.get(Indicator::Diabetes));
    let high_bp_fall = before.get(Indicator::HighBp) - after.get(Indicator::HighBp);
    assert!(high_bp_fall > 0.0 && high_bp_fall < 0.001, "high_bp fell {}", high_bp_fall);
}

#[test]
fn test_tuner_terminates_on_pathological_input() {
    let states = single_zone_city();
    let mut slopes = SlopeTable::new();
    slopes.insert(zone("10001"), IndicatorMap::splat(-1.0));

    let cal = auto_stability_tune(&slopes, 1.0, &PolicySplits::default(), &states);
    assert!(!cal.is_fully_met());
    assert!(cal.floor_pc <= 120.0);
}

#[test]
fn test_events_reproduce_with_same_seed() {
    let (states, slopes) = random_city(150, 4);
    let inputs = PolicyInputs { events_enabled: true, ..reference_inputs() };

    let run = || {
        let mut session = Session::new(states.clone(), slopes.clone(), 2025);
        let cal = session.recalibrate(&inputs, true, 25.0);
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        for _ in 0..6 {
            session.advance(&inputs, &cal, &mut rng);
        }
        session
    };

    let a = run();
    let b = run();
    let events = |s: &Session| -> Vec<String> {
        s.history().iter().flatten().map(|r| r.events.clone()).collect()
    };
    assert_eq!(events(&a), events(&b));
    assert!(events(&a).iter().any(|e| !e.is_empty()), "some zone should be struck in 900 zone-years");
    assert_eq!(a.scores(), b.scores());
    assert_eq!(a.states(), b.states());
}

#[test]
fn test_events_disabled_never_fire() {
    let (states, slopes) = random_city(150, 4);
    let inputs = reference_inputs();
    let mut session = Session::new(states, slopes, 2025);
    let cal = session.recalibrate(&inputs, true, 25.0);
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for _ in 0..6 {
        session.advance(&inputs, &cal, &mut rng);
    }
    assert!(session.history().iter().flatten().all(|r| r.events.is_empty()));
}

#[test]
fn test_large_city_is_deterministic() {
    // Above the parallel threshold
    let (states, slopes) = random_city(1_200, 77);
    let inputs = PolicyInputs { events_enabled: true, ..reference_inputs() };
    let cal = auto_stability_tune(&slopes, inputs.city_budget, &inputs.splits, &states);

    let mut rng_a = ChaCha8Rng::seed_from_u64(5);
    let mut rng_b = ChaCha8Rng::seed_from_u64(5);
    let a = advance_year(2025, &states, &slopes, &inputs, &cal, &mut rng_a);
    let b = advance_year(2025, &states, &slopes, &inputs, &cal, &mut rng_b);

    assert_eq!(a, b);
    assert_eq!(a.records.len(), 1_200);
    let ordered = a.records.windows(2).all(|w| w[0].zone < w[1].zone);
    assert!(ordered, "records should come out in zone order");
}

#[test]
fn test_reset_then_rerun_matches_first_run() {
    let (states, slopes) = random_city(40, 12);
    let inputs = PolicyInputs { events_enabled: true, ..reference_inputs() };
    let mut session = Session::new(states, slopes, 2025);
    let cal = session.recalibrate(&inputs, true, 25.0);

    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..3 {
        session.advance(&inputs, &cal, &mut rng);
    }
    let first: Vec<_> = session.scores().to_vec();

    session.reset();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..3 {
        session.advance(&inputs, &cal, &mut rng);
    }
    assert_eq!(session.scores(), first.as_slice());
}

#[test]
fn test_missing_slopes_mean_no_drift() {
    let states = single_zone_city();
    let inputs = PolicyInputs { city_budget: 0.0, ..reference_inputs() };
    let cal = Calibration::base(0.0);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let out = advance_year(2025, &states, &SlopeTable::new(), &inputs, &cal, &mut rng);
    let id = zone("10001");
    assert_eq!(out.states[&id].values, states[&id].values);
    // employment below the pivot shrinks population slightly
    assert!(out.states[&id].population < states[&id].population);
}
