//! `weft`: run collision scenarios, benchmark them and inspect the
//! contact recordings they leave behind.

use clap::{Parser, Subcommand};
use weft_bench::{ScenarioKind, SolveMode};

mod commands;

#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about = "Weft: position-based soft-body collision solver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a config file.
    Simulate {
        /// Path to simulation config (TOML).
        #[arg(short, long, default_value = "simulation.toml")]
        config: String,
    },

    /// Time every scenario (or one) in a solve mode.
    Benchmark {
        /// Scenario to run (sphere_drop, capsule_opening, level_set_drape,
        /// skinned_lattice, neural_ground, fast_projectile). Runs all when omitted.
        #[arg(short, long)]
        scenario: Option<ScenarioKind>,

        /// Solver mode (direct, cached).
        #[arg(short, long, default_value = "cached")]
        mode: SolveMode,

        /// Outer steps per scenario, replacing each scenario's own count.
        #[arg(long)]
        steps: Option<u32>,

        /// Output file path (.csv or .json).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Inspect a contact recording.
    Inspect {
        /// Path to recording file.
        path: String,
    },

    /// Validate a simulation or solver config.
    Validate {
        /// Path to config file (TOML).
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate { config } => commands::simulate(&config),
        Commands::Benchmark {
            scenario,
            mode,
            steps,
            output,
        } => commands::benchmark(scenario, mode, steps, output.as_deref()),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
