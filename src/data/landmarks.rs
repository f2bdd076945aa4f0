use serde::Serialize;

use crate::data::GeometryRecord;
use crate::error::ConvertError;

/// Landmarks are always three dimensional.
pub const DIMENSIONS: usize = 3;

/// Paired landmark coordinates shared by every reader and writer.
///
/// Coordinates are stored flat as consecutive `(x, y, z)` triples in document
/// order. The moving sequence is either empty or exactly as long as the fixed
/// one. A set is built once by a reader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkSet {
    image_dimensions: String,
    offset: [f64; DIMENSIONS],
    spacing: [f64; DIMENSIONS],
    fixed: Vec<f64>,
    moving: Vec<f64>,
}

impl LandmarkSet {
    /// Build a set from physical coordinates, checking the triple invariants.
    pub fn new(fixed: Vec<f64>, moving: Vec<f64>) -> Result<Self, ConvertError> {
        if fixed.len() % DIMENSIONS != 0 {
            return Err(ConvertError::RaggedCoordinates(fixed.len()));
        }
        if !moving.is_empty() && moving.len() != fixed.len() {
            return Err(ConvertError::MismatchedSets {
                fixed: fixed.len(),
                moving: moving.len(),
            });
        }

        Ok(Self {
            image_dimensions: String::new(),
            offset: [0.0; DIMENSIONS],
            spacing: [0.0; DIMENSIONS],
            fixed,
            moving,
        })
    }

    /// Attach the image geometry that downstream parameter files echo.
    pub fn with_geometry(mut self, geometry: &GeometryRecord) -> Self {
        self.image_dimensions = geometry.dimensions.clone();
        self.offset = geometry.offset;
        self.spacing = geometry.spacing;
        self
    }

    /// Number of landmark pairs, not individual coordinates.
    pub fn point_count(&self) -> usize {
        self.fixed.len() / DIMENSIONS
    }

    pub fn dimension_count(&self) -> usize {
        DIMENSIONS
    }

    pub fn image_dimensions(&self) -> &str {
        &self.image_dimensions
    }

    pub fn offset(&self) -> [f64; DIMENSIONS] {
        self.offset
    }

    pub fn spacing(&self) -> [f64; DIMENSIONS] {
        self.spacing
    }

    pub fn fixed(&self) -> &[f64] {
        &self.fixed
    }

    pub fn moving(&self) -> &[f64] {
        &self.moving
    }

    pub fn has_moving(&self) -> bool {
        !self.moving.is_empty()
    }

    /// Iterate the triples of one coordinate set.
    pub fn triples(&self, set: CoordinateSet) -> impl Iterator<Item = [f64; DIMENSIONS]> + '_ {
        let coords = match set {
            CoordinateSet::Fixed => &self.fixed,
            CoordinateSet::Moving => &self.moving,
        };
        coords.chunks_exact(DIMENSIONS).map(|c| [c[0], c[1], c[2]])
    }
}

/// Which half of a landmark pair a writer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CoordinateSet {
    Fixed,
    Moving,
}

impl CoordinateSet {
    pub fn label(&self) -> &'static str {
        match self {
            CoordinateSet::Fixed => "fixed",
            CoordinateSet::Moving => "moving",
        }
    }
}

/// Map triples through `f`, walking from the last triple to the first.
///
/// Readers gather coordinates this way, so the result holds the points in
/// reverse document order until [`reverse_triples`] is applied.
pub fn collect_reversed<F>(coords: &[f64], mut f: F) -> Vec<f64>
where
    F: FnMut([f64; DIMENSIONS]) -> [f64; DIMENSIONS],
{
    let mut out = Vec::with_capacity(coords.len() - coords.len() % DIMENSIONS);
    for chunk in coords.chunks_exact(DIMENSIONS).rev() {
        out.extend_from_slice(&f([chunk[0], chunk[1], chunk[2]]));
    }
    out
}

/// Reverse the order of whole triples in place; axis order inside each triple is kept.
pub fn reverse_triples(coords: &mut [f64]) {
    let n = coords.len() / DIMENSIONS;
    for i in 0..n / 2 {
        let j = n - 1 - i;
        for axis in 0..DIMENSIONS {
            coords.swap(i * DIMENSIONS + axis, j * DIMENSIONS + axis);
        }
    }
}
