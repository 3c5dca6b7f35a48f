//! Byzantine Consensus Simulator CLI
//!
//! Run deterministic consensus rounds with configurable parameters.
//!
//! # Example
//!
//! ```bash
//! # One automatic PBFT-style round with 7 nodes, 2 Byzantine
//! byzsim --nodes 7 --faulty 2
//!
//! # Five rounds of the simpler agreement variant, fixed seed
//! byzsim -n 10 -f 3 --variant simple --rounds 5 --seed 7
//! ```

use byzsim_core::LogEvent;
use byzsim_engine::EngineConfig;
use byzsim_simulation::SimulationRunner;
use byzsim_types::{Mode, ProtocolVariant};
use clap::{Parser, ValueEnum};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Pbft,
    Simple,
}

impl From<VariantArg> for ProtocolVariant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Pbft => ProtocolVariant::Pbft,
            VariantArg::Simple => ProtocolVariant::Simple,
        }
    }
}

/// Byzantine Consensus Simulator
///
/// Drives full consensus rounds in a fully deterministic environment.
/// Given the same seed, produces identical results every run.
#[derive(Parser, Debug)]
#[command(name = "byzsim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Total number of nodes
    #[arg(short = 'n', long, default_value = "7")]
    nodes: u32,

    /// Requested Byzantine node count (clamped to the tolerance bound)
    #[arg(short = 'f', long, default_value = "2")]
    faulty: u32,

    /// Protocol rendition to simulate
    #[arg(long, value_enum, default_value = "pbft")]
    variant: VariantArg,

    /// Number of automatic rounds to run
    #[arg(short = 'r', long, default_value = "1")]
    rounds: u32,

    /// Reassign roles between rounds
    #[arg(long)]
    reassign: bool,

    /// Random seed for deterministic simulation
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn render(event: &LogEvent) -> String {
    format!("[{:?}] {:?}", event.severity(), event)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!(
        nodes = args.nodes,
        faulty = args.faulty,
        variant = ?args.variant,
        rounds = args.rounds,
        seed = args.seed,
        "Starting simulation"
    );

    let config = EngineConfig {
        node_count: args.nodes,
        fault_count: args.faulty,
        variant: args.variant.into(),
        ..EngineConfig::default()
    };
    let round_length = config.schedule.idle + Duration::from_secs(1);

    let mut runner = match SimulationRunner::new(config, args.seed) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("failed to set up simulation: {err}");
            std::process::exit(1);
        }
    };

    let mut reached = 0u32;
    for round in 1..=args.rounds {
        if args.reassign && round > 1 {
            if let Err(err) = runner.reassign_roles() {
                eprintln!("round {round}: {err}");
                break;
            }
        }
        if let Err(err) = runner.start_round(Mode::Automatic) {
            eprintln!("round {round}: {err}");
            break;
        }
        runner.run_for(round_length);

        for event in runner.drain_notifications() {
            println!("{}", render(&event));
        }
        if runner.engine().last_verdict().map(|v| v.reached) == Some(true) {
            reached += 1;
        }
    }

    println!("\n=== Simulation Complete ===");
    println!("Rounds:    {}", args.rounds);
    println!("Consensus: {reached}");
    println!("Messages:  {}", runner.engine().message_count());
    println!("Phase:     {}", runner.engine().phase_label());
}
