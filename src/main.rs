//! Health Policy Sim - command line runner
//!
//! Loads a scenario, calibrates, and simulates a run of years with a single
//! seeded random source threaded through every year-advance.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use health_policy_sim::baseline::build_baseline;
use health_policy_sim::core::{Result, Scenario};
use health_policy_sim::simulation::{RunOutput, Session};

/// Health Policy Sim - simulate budget allocations over zone health indicators
#[derive(Parser, Debug)]
#[command(name = "policy_sim")]
#[command(about = "Run a multi-year municipal health policy simulation")]
struct Args {
    /// Scenario file (TOML)
    #[arg(long, default_value = "data/scenarios/default.toml")]
    scenario: PathBuf,

    /// Years to simulate (overrides the scenario)
    #[arg(long)]
    years: Option<u32>,

    /// Random seed (overrides the scenario)
    #[arg(long)]
    seed: Option<u64>,

    /// Annual city budget in USD (overrides the scenario)
    #[arg(long)]
    budget: Option<f64>,

    /// Enable random adverse events
    #[arg(long)]
    events: bool,

    /// Disable the stability auto-tuner
    #[arg(long)]
    no_stability: bool,

    /// Print the full run as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("health_policy_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut scenario = Scenario::load(&args.scenario)?;
    let config = &mut scenario.simulation;
    if let Some(years) = args.years {
        config.years = years;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(budget) = args.budget {
        config.city_budget = budget;
    }
    config.events_enabled |= args.events;
    config.stability_preset &= !args.no_stability;
    config.validate()?;

    let config = scenario.simulation.clone();
    let (baseline, slopes) = build_baseline(&scenario)?;
    let mut session = Session::new(baseline, slopes, config.start_year);

    let inputs = config.policy_inputs();
    let calibration = session.recalibrate(&inputs, config.stability_preset, config.default_floor_pc);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let start = Instant::now();
    for _ in 0..config.years {
        session.advance(&inputs, &calibration, &mut rng);
        if let Some(last) = session.scores().last() {
            tracing::info!("Year {} composite score {:.1}", last.year, last.score);
        }
    }
    let output = RunOutput::new(&session, inputs, calibration, start.elapsed());

    if args.json {
        println!("{}", output.to_json());
    } else {
        println!("{}", output.summary());
        println!();
        println!("{:>6}  {:>6}", "year", "score");
        for s in &output.scores {
            println!("{:>6}  {:>6.1}", s.year, s.score);
        }
    }

    Ok(())
}
