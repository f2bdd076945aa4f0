pub mod point_pairs;
pub mod registration_list;
pub mod tokens;

pub use point_pairs::*;
pub use registration_list::*;
pub use tokens::*;

use std::fs;
use std::path::Path;

use crate::data::LandmarkSet;
use crate::error::ConvertError;

/// Landmarks read from one input document, with any tolerated format problems.
#[derive(Debug, Clone)]
pub struct ReadResult {
    pub landmarks: LandmarkSet,
    pub warnings: Vec<FormatWarning>,
}

/// Input side of a conversion.
pub trait LandmarkReader {
    /// Returns the CLI name of the format this reader understands
    fn name(&self) -> &str;

    /// Read and convert the landmarks stored at `path`
    fn read(&self, path: &Path) -> Result<ReadResult, ConvertError>;
}

/// Read a whole document, tolerating an unopenable file unless `strict_io` is set.
///
/// `Ok(None)` means the failure was logged and the caller should carry on with
/// an empty document.
pub fn read_document(path: &Path, strict_io: bool) -> Result<Option<String>, ConvertError> {
    match fs::read_to_string(path) {
        Ok(content) => {
            tracing::info!(path = %path.display(), bytes = content.len(), "Opened document");
            Ok(Some(content))
        }
        Err(source) if strict_io => Err(ConvertError::Read {
            path: path.to_path_buf(),
            source,
        }),
        Err(source) => {
            tracing::warn!(path = %path.display(), error = %source, "Failed to open document");
            Ok(None)
        }
    }
}
