//! 3D Slicer fiducial list (`.fcsv`).
//!
//! Slicer expects RAS coordinates, so each stored triple `v` is written as
//! `x = -v[2]`, `y = -v[1]`, `z = v[0]`.

use crate::data::{CoordinateSet, LandmarkSet};
use crate::error::ConvertError;
use crate::writers::{format_number, require_set, LandmarkWriter};

const DISPLAY_HEADER: &str = "# symbolScale = 5.5\n\
# symbolType = 11\n\
# visibility = 1\n\
# textScale = 12.5\n\
# color = 0.4,1,1\n\
# selectedColor = 0.807843,0.560784,1\n\
# opacity = 1\n\
# ambient = 0\n\
# diffuse = 1\n\
# specular = 0\n\
# power = 1\n\
# locked = 1\n\
# columns = label,x,y,z,sel,vis\n";

pub struct FiducialWriter;

impl LandmarkWriter for FiducialWriter {
    fn name(&self) -> &str {
        "slr_fid"
    }

    fn suffix(&self, set: CoordinateSet) -> &'static str {
        match set {
            CoordinateSet::Fixed => "_fixed_slicer.fcsv",
            CoordinateSet::Moving => "_moving_slicer.fcsv",
        }
    }

    fn render(&self, landmarks: &LandmarkSet, set: CoordinateSet) -> Result<String, ConvertError> {
        require_set(landmarks, set)?;

        let mut out = format!("# name = lmk\n# numPoints = {}\n", landmarks.point_count());
        out.push_str(DISPLAY_HEADER);

        // No terminator after the last row.
        let rows: Vec<String> = landmarks
            .triples(set)
            .enumerate()
            .map(|(idx, v)| {
                format!(
                    "{}, {}, {}, {}, 0, 1",
                    idx + 1,
                    format_number(-v[2]),
                    format_number(-v[1]),
                    format_number(v[0])
                )
            })
            .collect();
        out.push_str(&rows.join("\n"));

        Ok(out)
    }
}
