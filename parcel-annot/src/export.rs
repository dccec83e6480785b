//! Export GeoJSON des annotations avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use parcel_index::Parcel;

use crate::drawings::Drawing;
use crate::session::AnnotationSession;

/// Exporte les annotations de la session en FeatureCollection GeoJSON:
/// les dessins puis les parcelles annotées, géométries comprises
pub fn export_annotations(session: &AnnotationSession, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    let mut first = true;
    for drawing in session.drawings().iter() {
        if !first {
            write!(writer, ",")?;
        }
        first = false;
        write_drawing(&mut writer, drawing)?;
    }

    // Ordre stable pour les notes (la map sous-jacente ne l'est pas)
    let mut noted: Vec<(&str, &str)> = session.notes().iter().collect();
    noted.sort_by_key(|(id, _)| *id);

    for (parcel_id, note) in noted {
        let Some(parcel) = session.index().get(parcel_id) else {
            continue;
        };
        if parcel.geometry.is_none() {
            continue;
        }
        if !first {
            write!(writer, ",")?;
        }
        first = false;
        write_noted_parcel(&mut writer, parcel, note)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

/// Écrit un dessin en feature GeoJSON
fn write_drawing<W: Write>(writer: &mut W, drawing: &Drawing) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"Feature","id":"{}","geometry":"#,
        escape_json(&drawing.id)
    )?;
    write_geometry(writer, &drawing.geometry)?;

    write!(writer, r#","properties":{{"kind":"drawing""#)?;
    if let Some(note) = &drawing.note {
        write!(writer, r#","note":"{}""#, escape_json(note))?;
    }
    if let Some(parcel_id) = &drawing.snapped_to {
        write!(writer, r#","snapped_to":"{}""#, escape_json(parcel_id))?;
    }
    write!(writer, "}}}}")?;

    Ok(())
}

/// Écrit une parcelle annotée en feature GeoJSON
fn write_noted_parcel<W: Write>(writer: &mut W, parcel: &Parcel, note: &str) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"Feature","id":"{}","geometry":"#,
        escape_json(&parcel.id)
    )?;
    let geometry = parcel.geometry.as_ref().expect("checked by caller");
    write_geometry(writer, geometry)?;

    write!(
        writer,
        r#","properties":{{"kind":"parcel_note","label":"{}","note":"{}"}}}}"#,
        escape_json(&parcel.label),
        escape_json(note)
    )?;

    Ok(())
}

/// Géométrie via geozero (efficace, zero-copy)
fn write_geometry<W: Write>(writer: &mut W, geometry: &geo::Geometry) -> Result<()> {
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;
    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
