//! Tests de contenance point-dans-polygone par lancer de rayon

use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};

/// Dénominateur de substitution pour les arêtes horizontales.
///
/// Stabilité numérique plutôt que géométrie exacte: le résultat est
/// indéfini pour un point exactement sur une arête, limitation acceptée.
const HORIZONTAL_EDGE_EPSILON: f64 = 1e-12;

/// Test point-dans-ring (crossing number).
///
/// Le ring est traité comme cycliquement fermé, que le dernier point répète
/// ou non le premier. Un rayon horizontal part du point vers +x; chaque
/// arête traversée inverse l'état intérieur/extérieur.
pub fn point_in_ring(point: Coord, ring: &LineString) -> bool {
    let coords = &ring.0;
    if coords.is_empty() {
        return false;
    }

    let mut inside = false;
    let mut j = coords.len() - 1;
    for i in 0..coords.len() {
        let (xi, yi) = coords[i].x_y();
        let (xj, yj) = coords[j].x_y();

        if (yi > point.y) != (yj > point.y) {
            let mut dy = yj - yi;
            if dy == 0.0 {
                dy = HORIZONTAL_EDGE_EPSILON;
            }
            let cross_x = (xj - xi) * (point.y - yi) / dy + xi;
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Point dans le polygone: dans le ring extérieur et dans aucun trou.
///
/// Les trous sont traités comme simples et non imbriqués.
pub fn point_in_polygon(point: Coord, polygon: &Polygon) -> bool {
    if !point_in_ring(point, polygon.exterior()) {
        return false;
    }
    !polygon
        .interiors()
        .iter()
        .any(|hole| point_in_ring(point, hole))
}

/// Point dans au moins un des polygones membres
pub fn point_in_multi_polygon(point: Coord, multi: &MultiPolygon) -> bool {
    multi.0.iter().any(|polygon| point_in_polygon(point, polygon))
}

/// Dispatch par type de géométrie.
///
/// Seules les géométries surfaciques peuvent contenir un point; tout autre
/// type retourne `false`, jamais une erreur.
pub fn geometry_contains(point: Coord, geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Polygon(polygon) => point_in_polygon(point, polygon),
        Geometry::MultiPolygon(multi) => point_in_multi_polygon(point, multi),
        _ => false,
    }
}
