//! Reader for the registration tool's flat landmark list.
//!
//! The list is a stream of whitespace-separated numbers, optionally led by a
//! point count, and always ends with one artifact value that is not a
//! coordinate. Values are already physical, so no geometry is involved and no
//! moving set exists.

use std::path::Path;

use crate::config::ConversionConfig;
use crate::data::{collect_reversed, reverse_triples, LandmarkSet, DIMENSIONS};
use crate::error::ConvertError;
use crate::readers::{read_document, FormatIssue, LandmarkReader, ReadResult, TokenStream, WarningSink};

/// Parse the list into coordinates in document order.
pub fn parse_registration_list(
    content: &str,
    sink: &mut WarningSink,
) -> Result<Vec<f64>, ConvertError> {
    let mut stream = TokenStream::new(content);
    let mut tokens: Vec<_> = std::iter::from_fn(|| stream.next_token()).collect();

    // The last value is an artifact of the exporting tool.
    if tokens.pop().is_none() {
        return Ok(Vec::new());
    }

    let mut values = Vec::with_capacity(tokens.len());
    for token in &tokens {
        match token.text.parse::<f64>() {
            Ok(v) => values.push(v),
            Err(_) => {
                sink.report(
                    token.line,
                    FormatIssue::InvalidNumber {
                        key: "coordinate".to_string(),
                        value: token.text.to_string(),
                    },
                )?;
                values.push(0.0);
            }
        }
    }

    let declared = if values.len() % DIMENSIONS != 0 {
        Some(values.remove(0))
    } else {
        None
    };

    let trailing = values.len() % DIMENSIONS;
    if trailing != 0 {
        sink.report(stream.line(), FormatIssue::TrailingValues(trailing))?;
        values.truncate(values.len() - trailing);
    }

    if let Some(declared) = declared {
        let found = values.len() / DIMENSIONS;
        let declared = if declared >= 0.0 { declared as usize } else { 0 };
        if declared != found {
            let line = tokens.first().map_or(0, |t| t.line);
            sink.report(line, FormatIssue::CountMismatch { declared, found })?;
            if declared < found {
                values.truncate(declared * DIMENSIONS);
            }
        }
    }

    Ok(values)
}

/// Reads registration landmark lists (`ireg`).
pub struct RegistrationListReader<'a> {
    config: &'a ConversionConfig,
}

impl<'a> RegistrationListReader<'a> {
    pub fn new(config: &'a ConversionConfig) -> Self {
        Self { config }
    }
}

impl LandmarkReader for RegistrationListReader<'_> {
    fn name(&self) -> &str {
        "ireg"
    }

    fn read(&self, path: &Path) -> Result<ReadResult, ConvertError> {
        let mut sink = WarningSink::new(self.config.strict_format);

        tracing::info!(path = %path.display(), "Opening landmarks file");
        let content = read_document(path, self.config.strict_io)?.unwrap_or_default();
        let values = parse_registration_list(&content, &mut sink)?;

        let mut fixed = collect_reversed(&values, |t| t);
        reverse_triples(&mut fixed);

        Ok(ReadResult {
            landmarks: LandmarkSet::new(fixed, Vec::new())?,
            warnings: sink.into_warnings(),
        })
    }
}
