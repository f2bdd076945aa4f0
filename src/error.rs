use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::{InputType, OutputType};
use crate::readers::FormatWarning;

/// Errors raised while reading, converting or writing landmarks.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input at {0}")]
    Format(#[from] FormatWarning),

    #[error("{input} landmarks cannot be converted to {output}")]
    UnsupportedPairing { input: InputType, output: OutputType },

    #[error("landmark set has no moving coordinates")]
    MissingMovingSet,

    #[error("coordinate sequence of length {0} is not a whole number of triples")]
    RaggedCoordinates(usize),

    #[error("fixed and moving sets differ in length ({fixed} vs {moving})")]
    MismatchedSets { fixed: usize, moving: usize },

    #[error("unknown {kind} format `{name}` (options are: {options})")]
    UnknownFormat {
        kind: &'static str,
        name: String,
        options: &'static str,
    },
}
