//! Transformix spline-kernel transform parameter file.
//!
//! Moving landmarks become the `TransformParameters` and fixed landmarks the
//! `FixedImageLandmarks`, each point written in z, y, x order. Everything
//! except the image geometry echo and the landmark lists is a fixed default.

use std::fmt::Write as _;

use crate::data::{CoordinateSet, LandmarkSet};
use crate::error::ConvertError;
use crate::writers::{format_number, require_set, LandmarkWriter};

const IDENTITY_DIRECTION: &str = "1.0000000000 0.0000000000 0.0000000000 \
0.0000000000 1.0000000000 0.0000000000 \
0.0000000000 0.0000000000 1.0000000000";

pub struct TransformixWriter;

impl LandmarkWriter for TransformixWriter {
    fn name(&self) -> &str {
        "tfx_lmk"
    }

    fn suffix(&self, _set: CoordinateSet) -> &'static str {
        "_transformix.txt"
    }

    /// Both sets always go into the one document; `set` only names the file.
    fn render(&self, landmarks: &LandmarkSet, _set: CoordinateSet) -> Result<String, ConvertError> {
        require_set(landmarks, CoordinateSet::Moving)?;

        let parameter_count = landmarks.dimension_count() * landmarks.point_count();
        let spacing = landmarks.spacing();
        let offset = landmarks.offset();

        let mut out = String::new();
        out.push_str("(Transform \"SplineKernelTransform\")\n");
        let _ = writeln!(out, "(NumberOfParameters {parameter_count})");
        let _ = writeln!(
            out,
            "(TransformParameters{})",
            reversed_axis_list(landmarks, CoordinateSet::Moving)
        );
        out.push_str("(InitialTransformParametersFileName \"NoInitialTransform\")\n");
        out.push_str("(HowToCombineTransforms \"Compose\")\n\n");

        out.push_str("// Image specific\n");
        out.push_str("(FixedImageDimension 3)\n");
        out.push_str("(MovingImageDimension 3)\n");
        out.push_str("(FixedInternalImagePixelType \"float\")\n");
        out.push_str("(MovingInternalImagePixelType \"float\")\n");
        let _ = writeln!(out, "(Size {})", landmarks.image_dimensions());
        out.push_str("(Index 0 0 0)\n");
        let _ = writeln!(
            out,
            "(Spacing {} {} {})",
            format_number(spacing[0]),
            format_number(spacing[1]),
            format_number(spacing[2])
        );
        let _ = writeln!(
            out,
            "(Origin {} {} {})",
            format_number(offset[0]),
            format_number(offset[1]),
            format_number(offset[2])
        );
        let _ = writeln!(out, "(Direction {IDENTITY_DIRECTION})");
        out.push_str("(UseDirectionCosines \"true\")\n\n");

        out.push_str("// SplineKernelTransform specific\n");
        out.push_str("(SplineKernelType \"ThinPlateSpline\")\n");
        out.push_str("(SplinePoissonRatio 0.0)\n");
        out.push_str("(SplineRelaxationFactor 0.0)\n");
        let _ = writeln!(
            out,
            "(FixedImageLandmarks{})\n",
            reversed_axis_list(landmarks, CoordinateSet::Fixed)
        );

        out.push_str("// ResampleInterpolator specific\n");
        out.push_str("(ResampleInterpolator \"FinalBSplineInterpolator\")\n");
        out.push_str("(FinalBSplineInterpolationOrder 3)\n\n");

        out.push_str("// Resampler specific\n");
        out.push_str("(Resampler \"DefaultResampler\")\n");
        out.push_str("(DefaultPixelValue 0.000000)\n");
        out.push_str("(ResultImageFormat \"mhd\")\n");
        out.push_str("(ResultImagePixelType \"short\")\n");
        out.push_str("(CompressResultImage \"false\")\n");

        Ok(out)
    }
}

// " z y x" for every point, concatenated.
fn reversed_axis_list(landmarks: &LandmarkSet, set: CoordinateSet) -> String {
    let mut list = String::new();
    for [x, y, z] in landmarks.triples(set) {
        let _ = write!(
            list,
            " {} {} {}",
            format_number(z),
            format_number(y),
            format_number(x)
        );
    }
    list
}
