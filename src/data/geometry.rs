//! Image geometry read from MetaImage-style header documents.
//!
//! Only the handful of `Key = value` tags needed to turn voxel indices into
//! physical positions are read. Unknown keys are ignored and key order does not
//! matter.

use std::path::Path;

use serde::Serialize;

use crate::data::DIMENSIONS;
use crate::error::ConvertError;
use crate::readers::{read_document, FormatIssue, WarningSink};

/// Geometry of the fixed image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeometryRecord {
    /// `DimSize` value, passed through verbatim.
    pub dimensions: String,
    pub offset: [f64; DIMENSIONS],
    pub spacing: [f64; DIMENSIONS],
    /// Direction matrix as written; nothing downstream uses it.
    pub orientation: Option<String>,
}

impl GeometryRecord {
    /// `physical = voxel * spacing + offset`, per axis.
    pub fn to_physical(&self, voxel: [f64; DIMENSIONS]) -> [f64; DIMENSIONS] {
        let mut physical = [0.0; DIMENSIONS];
        for axis in 0..DIMENSIONS {
            physical[axis] = voxel[axis] * self.spacing[axis] + self.offset[axis];
        }
        physical
    }
}

/// Parse a header document.
pub fn parse_geometry(content: &str, sink: &mut WarningSink) -> Result<GeometryRecord, ConvertError> {
    let mut geometry = GeometryRecord::default();

    for (idx, line) in content.lines().enumerate() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "DimSize" => geometry.dimensions = value.to_string(),
            "Offset" | "Origin" | "Position" => {
                geometry.offset = parse_vector(key, value, idx + 1, sink)?;
            }
            "ElementSpacing" => {
                geometry.spacing = parse_vector(key, value, idx + 1, sink)?;
            }
            "Orientation" | "TransformMatrix" | "Rotation" => {
                geometry.orientation = Some(value.to_string());
            }
            _ => {}
        }
    }

    Ok(geometry)
}

/// Read the header at `path`.
///
/// An unreadable header yields a zero geometry unless `strict_io` is set.
pub fn read_geometry(
    path: &Path,
    strict_io: bool,
    sink: &mut WarningSink,
) -> Result<GeometryRecord, ConvertError> {
    tracing::info!(path = %path.display(), "Opening image header");

    match read_document(path, strict_io)? {
        Some(content) => {
            let geometry = parse_geometry(&content, sink)?;
            tracing::debug!(
                dimensions = %geometry.dimensions,
                offset = ?geometry.offset,
                spacing = ?geometry.spacing,
                "Image geometry loaded"
            );
            Ok(geometry)
        }
        None => {
            tracing::warn!(path = %path.display(), "Continuing with zero geometry");
            Ok(GeometryRecord::default())
        }
    }
}

// Components after the first unreadable one stay zero.
fn parse_vector(
    key: &str,
    value: &str,
    line: usize,
    sink: &mut WarningSink,
) -> Result<[f64; DIMENSIONS], ConvertError> {
    let mut out = [0.0; DIMENSIONS];
    let mut parts = value.split_whitespace();

    for (axis, slot) in out.iter_mut().enumerate() {
        match parts.next().map(str::parse::<f64>) {
            Some(Ok(v)) => *slot = v,
            _ => {
                sink.report(
                    line,
                    FormatIssue::MissingComponent {
                        key: key.to_string(),
                        axis,
                    },
                )?;
                break;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ObjectType = Image\n\
NDims = 3\n\
Offset = -120.5 -98.25 40\n\
ElementSpacing = 0.5 0.5 2\n\
Orientation = 1 0 0 0 1 0 0 0 1\n\
DimSize = 512 512 128\n\
ElementType = MET_SHORT\n\
ElementDataFile = fixed.raw\n";

    #[test]
    fn test_parse_known_tags() {
        let mut sink = WarningSink::new(false);
        let geometry = parse_geometry(HEADER, &mut sink).unwrap();
        assert_eq!(geometry.dimensions, "512 512 128");
        assert_eq!(geometry.offset, [-120.5, -98.25, 40.0]);
        assert_eq!(geometry.spacing, [0.5, 0.5, 2.0]);
        assert_eq!(geometry.orientation.as_deref(), Some("1 0 0 0 1 0 0 0 1"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_origin_alias() {
        let mut sink = WarningSink::new(false);
        let geometry = parse_geometry("Origin = 1 2 3\n", &mut sink).unwrap();
        assert_eq!(geometry.offset, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_short_vector_warns_and_zero_fills() {
        let mut sink = WarningSink::new(false);
        let geometry = parse_geometry("ElementSpacing = 0.7 0.7\n", &mut sink).unwrap();
        assert_eq!(geometry.spacing, [0.7, 0.7, 0.0]);
        let warnings = sink.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 1);
    }

    #[test]
    fn test_short_vector_is_fatal_when_strict() {
        let mut sink = WarningSink::new(true);
        assert!(parse_geometry("Offset = 1\n", &mut sink).is_err());
    }

    #[test]
    fn test_to_physical_is_affine_per_axis() {
        let geometry = GeometryRecord {
            offset: [10.0, -20.0, 5.0],
            spacing: [0.5, 0.25, 2.0],
            ..Default::default()
        };
        assert_eq!(geometry.to_physical([4.0, 8.0, 3.0]), [12.0, -18.0, 11.0]);
    }

    #[test]
    fn test_missing_header_gives_zero_geometry() {
        let mut sink = WarningSink::new(false);
        let geometry = read_geometry(Path::new("/nonexistent/fixed.mhd"), false, &mut sink).unwrap();
        assert_eq!(geometry, GeometryRecord::default());
        assert!(read_geometry(Path::new("/nonexistent/fixed.mhd"), true, &mut sink).is_err());
    }
}
