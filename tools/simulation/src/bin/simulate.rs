//! Run a momentum-strategy simulation and print the report

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use market_data::Scenario;
use simulation::{Simulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Momentum strategy simulation over a synthetic market")]
struct Args {
    /// JSON configuration file; defaults apply to anything it omits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of feed ticks to run
    #[arg(long)]
    ticks: Option<usize>,

    /// Seed for the synthetic feed
    #[arg(long)]
    seed: Option<u64>,

    /// Market scenario: normal, high, low, crash or rally
    #[arg(long)]
    scenario: Option<Scenario>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.feed.seed = seed;
    }
    if let Some(scenario) = args.scenario {
        config.feed.scenario = scenario;
    }

    let mut simulation = Simulation::new(config).context("building simulation")?;
    let report = simulation.run().context("running simulation")?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
