//! One working day at a single-checkout store.
//!
//! Customers arrive on average every three minutes and are served one at a time. Whoever reaches the counter is
//! assigned a class: browsers (A) are quick and spend nothing, regulars (B) all take the same time, drawn once for the
//! day, and big baskets (C) take longest and spend most. The store closes its doors after eight hours but serves
//! everyone already in line.
//!
//! Run with `cargo run --example checkout_day -- --config demos/store.toml`, optionally overriding the seed or the
//! horizon. Set `RUST_LOG=checkout_sim=trace` to watch every event.

use checkout_sim::{Simulation, StoreConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Single-server queueing system with fixed run length")]
struct Args {
    /// TOML store configuration; the reference store is used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Override the configured run length, in minutes.
    #[arg(long)]
    horizon: Option<f64>,
    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(horizon) = args.horizon {
        config = config.with_horizon(horizon);
    }

    let mut sim = Simulation::seeded(config)?;
    let report = sim.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let rule = "-".repeat(55);
        println!("{rule}");
        println!("Single-server queueing system with fixed run length");
        println!("Mean interarrival time: {:.3} minutes", sim.config().mean_interarrival());
        println!("Simulation run length: {} minutes", sim.config().horizon());
        println!("{rule}");
        print!("{report}");
        println!("{rule}");
    }

    Ok(())
}
