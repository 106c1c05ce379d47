use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lineup_allocator::display::{print_allocation, write_allocation_to_file};
use lineup_allocator::parser::load_roster;
use lineup_allocator::records::write_lineup_csv;
use lineup_allocator::schedule::{allocate, allocate_with_rng, MatchConfig};
use lineup_allocator::web;

#[derive(Parser, Debug)]
#[command(name = "lineup-allocator")]
#[command(about = "Build fair quarter-by-quarter lineups for small-sided football")]
struct Cli {
    /// Match rules as JSON; missing fields use the defaults
    #[arg(long, global = true, env = "LINEUP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a lineup from a roster CSV and print it
    Generate {
        /// Roster CSV with a name column and optional available/goalkeeper columns
        #[arg(short, long)]
        roster: PathBuf,

        /// Seed for reproducible lineups
        #[arg(long)]
        seed: Option<u64>,

        /// Write the lineup rows (quarter, position, wave, player, minutes) to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the printed schedule to this text file as well
        #[arg(long)]
        text: Option<String>,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "LINEUP_PORT", default_value_t = 8080)]
        port: u16,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lineup_allocator=info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MatchConfig::from_json_file(path)
            .with_context(|| format!("loading match config from {}", path.display()))?,
        None => MatchConfig::default(),
    };

    match cli.command {
        Commands::Generate { roster, seed, output, text } => {
            let roster_file = load_roster(&roster)
                .with_context(|| format!("loading roster from {}", roster.display()))?;
            if roster_file.players.is_empty() {
                bail!("roster {} has no available players", roster.display());
            }
            info!(players = roster_file.players.len(), "roster loaded");

            let allocation = match seed {
                Some(seed) => allocate_with_rng(
                    &roster_file.players,
                    &config,
                    &roster_file.manual_goalkeepers,
                    &mut ChaCha8Rng::seed_from_u64(seed),
                )?,
                None => allocate(&roster_file.players, &config, &roster_file.manual_goalkeepers)?,
            };

            print_allocation("Match Lineup", &allocation, &roster_file.players)?;

            if let Some(path) = output {
                write_lineup_csv(&allocation, &path)
                    .with_context(|| format!("writing lineup to {}", path.display()))?;
                println!("Lineup saved to {}", path.display());
            }
            if let Some(path) = text {
                write_allocation_to_file("Match Lineup", &allocation, &roster_file.players, &path)
                    .map_err(|e| anyhow::anyhow!("writing schedule to {}: {}", path, e))?;
                println!("Schedule saved to {}", path);
            }
        }
        Commands::Serve { port } => {
            println!("Starting web server on port {}...", port);
            println!("Access the API at http://localhost:{}/api/allocation", port);
            web::start_server(port, config).await?;
        }
    }

    Ok(())
}
