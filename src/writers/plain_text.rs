use crate::data::{CoordinateSet, LandmarkSet};
use crate::error::ConvertError;
use crate::writers::{format_number, require_set, LandmarkWriter};

/// Minimal point list: `point`, the count, then one `z y x` line per point.
pub struct PlainTextWriter;

impl LandmarkWriter for PlainTextWriter {
    fn name(&self) -> &str {
        "std_txt"
    }

    fn suffix(&self, set: CoordinateSet) -> &'static str {
        match set {
            CoordinateSet::Fixed => "_fixed_landmarks.txt",
            CoordinateSet::Moving => "_moving_landmarks.txt",
        }
    }

    fn render(&self, landmarks: &LandmarkSet, set: CoordinateSet) -> Result<String, ConvertError> {
        require_set(landmarks, set)?;

        let mut out = format!("point\n{}\n", landmarks.point_count());
        for [x, y, z] in landmarks.triples(set) {
            out.push_str(&format!(
                "{} {} {}\n",
                format_number(z),
                format_number(y),
                format_number(x)
            ));
        }
        Ok(out)
    }
}
