use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::data::CoordinateSet;
use crate::error::ConvertError;
use crate::readers::FormatWarning;

/// Supported input landmark formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputType {
    /// Annotator point-pair export (`ix_pp`)
    PointPairs,
    /// Registration tool landmark list (`ireg`)
    RegistrationList,
}

impl InputType {
    pub fn cli_name(&self) -> &'static str {
        match self {
            InputType::PointPairs => "ix_pp",
            InputType::RegistrationList => "ireg",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

impl FromStr for InputType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ix_pp" => Ok(InputType::PointPairs),
            "ireg" => Ok(InputType::RegistrationList),
            other => Err(ConvertError::UnknownFormat {
                kind: "input",
                name: other.to_string(),
                options: "ix_pp, ireg",
            }),
        }
    }
}

/// Supported output landmark formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutputType {
    /// Transformix landmark-based transform parameters (`tfx_lmk`)
    Transformix,
    /// 3D Slicer fiducial list (`slr_fid`)
    Fiducial,
    /// Plain text point list (`std_txt`)
    PlainText,
}

impl OutputType {
    pub fn cli_name(&self) -> &'static str {
        match self {
            OutputType::Transformix => "tfx_lmk",
            OutputType::Fiducial => "slr_fid",
            OutputType::PlainText => "std_txt",
        }
    }

    /// Whether the output repeats the fixed image geometry.
    pub fn echoes_geometry(&self) -> bool {
        matches!(self, OutputType::Transformix)
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

impl FromStr for OutputType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tfx_lmk" => Ok(OutputType::Transformix),
            "slr_fid" => Ok(OutputType::Fiducial),
            "std_txt" => Ok(OutputType::PlainText),
            other => Err(ConvertError::UnknownFormat {
                kind: "output",
                name: other.to_string(),
                options: "tfx_lmk, slr_fid, std_txt",
            }),
        }
    }
}

/// One conversion as requested on the command line.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input_file: PathBuf,
    pub input_type: InputType,
    pub output_dir: PathBuf,
    pub output_type: OutputType,
    /// Keep manually chosen points flagged as very unsure.
    pub keep_all: bool,
}

impl ConversionRequest {
    /// Reject format pairings that cannot be produced. Runs before any I/O.
    pub fn validate_pairing(&self) -> Result<(), ConvertError> {
        match (self.input_type, self.output_type) {
            // Registration lists carry neither a moving set nor geometry.
            (InputType::RegistrationList, OutputType::Transformix) => {
                Err(ConvertError::UnsupportedPairing {
                    input: self.input_type,
                    output: self.output_type,
                })
            }
            _ => Ok(()),
        }
    }

    /// Coordinate sets to emit, one output document each.
    pub fn coordinate_sets(&self) -> Vec<CoordinateSet> {
        match (self.output_type, self.input_type) {
            (OutputType::Transformix, _) => vec![CoordinateSet::Fixed],
            (_, InputType::PointPairs) => vec![CoordinateSet::Fixed, CoordinateSet::Moving],
            (_, InputType::RegistrationList) => vec![CoordinateSet::Fixed],
        }
    }
}

/// What a finished conversion produced.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub point_count: usize,
    pub warnings: Vec<FormatWarning>,
    pub written: Vec<PathBuf>,
}
