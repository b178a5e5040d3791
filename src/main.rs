use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use forest_stand_simulator::{
    config::SimulationConfig,
    growth::ModelVariant,
    io,
    visualization::{format_trajectory_summary, print_stand_summary, print_yield_table},
    VolumeEquation,
};

#[derive(Parser)]
#[command(
    name = "stand-simulator",
    about = "Forest stand growth simulator with harvest scheduling",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow a stand through the configured horizon and report yields
    Simulate {
        /// Stand file (JSON)
        #[arg(short, long)]
        stand: PathBuf,

        /// Simulation config (TOML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Override the number of periods in the config
        #[arg(short, long)]
        periods: Option<usize>,

        /// Write per-period yields to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check that a stand file can be grown under a model variant
    Validate {
        /// Stand file (JSON)
        #[arg(short, long)]
        stand: PathBuf,

        /// Model variant: NWO, SMC or SWO
        #[arg(short, long, default_value = "NWO")]
        variant: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            stand,
            config,
            periods,
            output,
            pretty,
        } => {
            let mut config = SimulationConfig::load(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            if let Some(periods) = periods {
                config.periods = periods;
            }
            let initial = io::read_stand_json(&stand)
                .with_context(|| format!("loading stand {}", stand.display()))?;

            println!(
                "\n{}",
                format!(
                    "Stand Simulation: {} ({} variant, {} periods)",
                    stand.display(),
                    config.variant,
                    config.periods
                )
                .bold()
                .cyan()
            );
            print_stand_summary(&initial, &config.volume);

            let mut trajectory = config.build_trajectory(initial)?;
            trajectory.simulate_through(config.periods)?;
            let yields = trajectory.yields();
            print_yield_table(&yields);

            let npv = trajectory.net_present_value(&config.financial)?;
            let summary = trajectory.summary()?;
            print!("{}", format_trajectory_summary(summary, Some(npv)));
            println!();

            if let Some(output) = output {
                io::write_yields_json(&yields, &output, pretty)?;
                println!(
                    "{} Wrote {} periods -> {}",
                    "Success:".green().bold(),
                    yields.len(),
                    output.display()
                );
            }
        }

        Commands::Validate { stand, variant } => {
            let variant: ModelVariant = variant.parse()?;
            let initial = io::read_stand_json(&stand)
                .with_context(|| format!("loading stand {}", stand.display()))?;
            if let Err(e) = variant.validate_stand(&initial) {
                anyhow::bail!("{} is not valid for {variant}: {e}", stand.display());
            }
            println!(
                "{} {} trees in {} cohorts can be grown under {variant}",
                "Valid:".green().bold(),
                initial.num_trees(),
                initial.cohorts().len()
            );
            print_stand_summary(&initial, &VolumeEquation::default());
        }
    }

    Ok(())
}
