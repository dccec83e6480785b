//! Boîtes englobantes alignées sur les axes

use geo::{Coord, CoordsIter, Geometry};

/// Boîte englobante d'une géométrie, calculée une seule fois à la construction.
///
/// La boîte vide est inversée-infinie: elle ne contient aucun point, ce qui
/// rend les entrées sans géométrie exploitable définitivement inatteignables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Boîte vide (ne contient rien)
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Calcule la boîte serrée d'une géométrie (tous types confondus)
    pub fn of_geometry(geometry: &Geometry) -> Self {
        let mut bbox = Self::EMPTY;
        for coord in geometry.coords_iter() {
            bbox.expand(coord);
        }
        bbox
    }

    /// Étend la boîte pour couvrir la coordonnée
    pub fn expand(&mut self, coord: Coord) {
        self.min_x = self.min_x.min(coord.x);
        self.min_y = self.min_y.min(coord.y);
        self.max_x = self.max_x.max(coord.x);
        self.max_y = self.max_y.max(coord.y);
    }

    /// Test d'appartenance, bornes incluses
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.min_x
            && coord.x <= self.max_x
            && coord.y >= self.min_y
            && coord.y <= self.max_y
    }

    /// Vraie si la boîte ne couvre aucun point
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Centre de la boîte, `None` si elle est vide
    pub fn center(&self) -> Option<Coord> {
        if self.is_empty() {
            return None;
        }
        Some(Coord {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        })
    }
}
