//! Définition et implémentation des commandes CLI
//!
//! Toutes les commandes suivent le même cycle: charger l'index, restaurer
//! la session depuis le magasin, opérer, persister si l'état a changé.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use geo::{Coord, Geometry};
use geojson::GeoJson;
use tracing::info;

use parcel_annot::config::Config;
use parcel_annot::export::export_annotations;
use parcel_annot::session::AnnotationSession;
use parcel_annot::store::DocumentStore;
use parcel_index::load_parcels;

#[derive(Subcommand)]
pub enum Commands {
    /// Find the parcel under a point
    Lookup {
        /// Longitude (x)
        #[arg(short, allow_hyphen_values = true)]
        x: f64,

        /// Latitude (y)
        #[arg(short, allow_hyphen_values = true)]
        y: f64,
    },

    /// Attach a note to a parcel (empty text removes it)
    Note {
        /// Parcel identifier
        id: String,

        /// Note text (omit with --remove)
        text: Option<String>,

        /// Remove the note instead of setting it
        #[arg(long)]
        remove: bool,
    },

    /// List parcel notes
    Notes,

    /// Add a drawing from a GeoJSON geometry or feature file
    Draw {
        /// Path to the GeoJSON file with the drawn shape
        #[arg(short, long)]
        shape: PathBuf,

        /// Note attached to the drawing
        #[arg(short, long)]
        note: Option<String>,

        /// Bypass parcel snapping for this drawing
        #[arg(long)]
        no_snap: bool,
    },

    /// List stored drawings
    Drawings,

    /// Export annotations (drawings + noted parcels) as GeoJSON
    Export {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show session status
    Status,
}

/// Charge l'index et la session puis exécute la commande
pub fn run(command: Commands, config: &Config) -> Result<()> {
    let index = load_parcels(&config.parcels).with_context(|| {
        format!("Failed to load parcels from {}", config.parcels.display())
    })?;
    info!(
        parcels = index.len(),
        unmatchable = index.unmatchable(),
        "Parcel index ready"
    );

    let store = DocumentStore::open(&config.store_dir)?;
    let mut session = AnnotationSession::restore(index, &store, config.snap);

    match command {
        Commands::Lookup { x, y } => cmd_lookup(&session, x, y),
        Commands::Note { id, text, remove } => {
            cmd_note(&mut session, &store, &id, text.as_deref(), remove)
        }
        Commands::Notes => cmd_notes(&session),
        Commands::Draw {
            shape,
            note,
            no_snap,
        } => cmd_draw(&mut session, &store, &shape, note, no_snap),
        Commands::Drawings => cmd_drawings(&session),
        Commands::Export { output } => cmd_export(&session, &output),
        Commands::Status => cmd_status(&session, config),
    }
}

/// Exécute la commande lookup
fn cmd_lookup(session: &AnnotationSession, x: f64, y: f64) -> Result<()> {
    match session.lookup(Coord { x, y }) {
        Some(hit) => {
            println!("Parcel: {} ({})", hit.label, hit.id);
            match hit.note {
                Some(note) => println!("Note: {}", note),
                None => println!("Note: -"),
            }
        }
        None => println!("No parcel at ({}, {})", x, y),
    }
    Ok(())
}

/// Exécute la commande note (ajout ou suppression)
fn cmd_note(
    session: &mut AnnotationSession,
    store: &DocumentStore,
    parcel_id: &str,
    text: Option<&str>,
    remove: bool,
) -> Result<()> {
    if remove {
        if session.remove_note(parcel_id) {
            println!("Note removed from {}", parcel_id);
        } else {
            println!("No note on {}", parcel_id);
        }
    } else {
        let text = text.context("Note text required (or use --remove)")?;
        session.set_note(parcel_id, text)?;
        println!("Note set on {}", parcel_id);
    }

    session.persist(store)
}

/// Exécute la commande notes
fn cmd_notes(session: &AnnotationSession) -> Result<()> {
    if session.notes().is_empty() {
        println!("No parcel notes");
        return Ok(());
    }

    let mut notes: Vec<(&str, &str)> = session.notes().iter().collect();
    notes.sort_by_key(|(id, _)| *id);

    println!("Parcel notes ({}):", notes.len());
    for (parcel_id, note) in notes {
        let label = session
            .index()
            .get(parcel_id)
            .map(|parcel| parcel.label.clone())
            .unwrap_or_else(|| parcel_id.to_string());
        println!("  {} [{}]: {}", parcel_id, label, note);
    }
    Ok(())
}

/// Exécute la commande draw
fn cmd_draw(
    session: &mut AnnotationSession,
    store: &DocumentStore,
    shape_path: &Path,
    note: Option<String>,
    no_snap: bool,
) -> Result<()> {
    let shape = read_shape(shape_path)?;

    if no_snap {
        session.set_snap_enabled(false);
    }

    let drawing = session.add_drawing(shape, note);
    match &drawing.snapped_to {
        Some(parcel_id) => println!("Added {} (snapped to {})", drawing.id, parcel_id),
        None => println!("Added {}", drawing.id),
    }

    session.persist(store)
}

/// Exécute la commande drawings
fn cmd_drawings(session: &AnnotationSession) -> Result<()> {
    if session.drawings().is_empty() {
        println!("No drawings");
        return Ok(());
    }

    println!("Drawings ({}):", session.drawings().len());
    for drawing in session.drawings().iter() {
        let snap = drawing
            .snapped_to
            .as_deref()
            .map(|parcel_id| format!(" -> {}", parcel_id))
            .unwrap_or_default();
        let note = drawing
            .note
            .as_deref()
            .map(|note| format!(": {}", note))
            .unwrap_or_default();
        println!("  {}{}{}", drawing.id, snap, note);
    }
    Ok(())
}

/// Exécute la commande export
fn cmd_export(session: &AnnotationSession, output: &Path) -> Result<()> {
    export_annotations(session, output)?;

    let count = session.drawings().len() + session.notes().len();
    println!("Exported {} annotations to {}", count, output.display());
    Ok(())
}

/// Exécute la commande status
fn cmd_status(session: &AnnotationSession, config: &Config) -> Result<()> {
    println!("=== parcel-annot ===");
    println!("Parcels: {}", config.parcels.display());
    println!("Store: {}", config.store_dir.display());
    println!(
        "Index: {} parcels ({} unmatchable)",
        session.index().len(),
        session.index().unmatchable()
    );
    println!("Notes: {}", session.notes().len());
    println!("Drawings: {}", session.drawings().len());
    println!("Snap: {}", if session.snap_enabled() { "on" } else { "off" });
    Ok(())
}

/// Lit une forme dessinée depuis un fichier GeoJSON (géométrie ou feature)
fn read_shape(path: &Path) -> Result<Geometry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read shape file: {}", path.display()))?;

    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("Invalid GeoJSON in {}", path.display()))?;

    let raw = match geojson {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature
            .geometry
            .with_context(|| format!("Feature without geometry in {}", path.display()))?,
        GeoJson::FeatureCollection(_) => {
            anyhow::bail!("Expected a single geometry or feature, got a collection")
        }
    };

    Geometry::try_from(raw).context("Unsupported shape geometry")
}
