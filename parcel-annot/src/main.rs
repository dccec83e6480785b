//! Point d'entrée CLI pour parcel-annot

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;
use parcel_annot::Config;

/// Annoter une couche parcellaire: notes, dessins, accrochage
#[derive(Parser)]
#[command(name = "parcel-annot")]
#[command(author, version)]
#[command(about = "Annotate a cadastral parcel layer: notes, drawings and parcel snapping")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// GeoJSON parcel layer (défaut: env ANNOT_PARCELS / parcels.geojson)
    #[arg(long, global = true)]
    parcels: Option<PathBuf>,

    /// Document store directory (défaut: env ANNOT_STORE / .parcel-annot)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let mut config = Config::from_env();
    if let Some(parcels) = cli.parcels {
        config.parcels = parcels;
    }
    if let Some(store) = cli.store {
        config.store_dir = store;
    }

    cli::run(cli.command, &config)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
