use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::logging::{self, ConversionSpan};
use crate::pipeline::{ConversionOutcome, ConversionRequest, InputType, OutputType};
use crate::readers::{LandmarkReader, PointPairReader, RegistrationListReader};
use crate::utils::paths::file_stem;
use crate::writers::{FiducialWriter, LandmarkWriter, PlainTextWriter, TransformixWriter};
use crate::Result;

/// Pick the reader for the requested input format.
pub fn reader_for<'a>(
    request: &ConversionRequest,
    config: &'a ConversionConfig,
) -> Box<dyn LandmarkReader + 'a> {
    match request.input_type {
        InputType::PointPairs => Box::new(PointPairReader::new(
            config,
            request.output_type,
            request.keep_all,
        )),
        InputType::RegistrationList => Box::new(RegistrationListReader::new(config)),
    }
}

/// Pick the writer for the requested output format.
pub fn writer_for(output_type: OutputType) -> Box<dyn LandmarkWriter> {
    match output_type {
        OutputType::Transformix => Box::new(TransformixWriter),
        OutputType::Fiducial => Box::new(FiducialWriter),
        OutputType::PlainText => Box::new(PlainTextWriter),
    }
}

/// Read one input document and write every output it maps to.
pub fn run_conversion(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionOutcome> {
    request.validate_pairing()?;

    let span = ConversionSpan::new(
        request.input_type,
        request.output_type,
        logging::get_correlation_id(),
    );
    let _entered = span.span().enter();

    tracing::info!("Starting conversion");
    let reader = reader_for(request, config);
    let read = reader
        .read(&request.input_file)
        .with_context(|| format!("reading {} landmarks from {}", reader.name(), request.input_file.display()))?;
    span.record_read(read.landmarks.point_count(), read.warnings.len());

    tracing::info!("Starting write");
    let writer = writer_for(request.output_type);
    let stem = file_stem(&request.input_file);
    let mut written = Vec::new();

    for set in request.coordinate_sets() {
        let content = writer
            .render(&read.landmarks, set)
            .with_context(|| format!("rendering {} {} landmarks", writer.name(), set.label()))?;
        let path = request.output_dir.join(writer.file_name(&stem, set));

        tracing::info!(path = %path.display(), set = set.label(), "Creating output file");
        if write_document(&path, &content, config.strict_io)? {
            written.push(path);
        }
    }

    span.record_result(true, written.len());
    tracing::info!("Conversion complete");

    Ok(ConversionOutcome {
        point_count: read.landmarks.point_count(),
        warnings: read.warnings,
        written,
    })
}

// Ok(false) when a tolerated failure was logged instead.
fn write_document(path: &Path, content: &str, strict_io: bool) -> std::result::Result<bool, ConvertError> {
    match fs::write(path, content) {
        Ok(()) => Ok(true),
        Err(source) if strict_io => Err(ConvertError::Write {
            path: path.to_path_buf(),
            source,
        }),
        Err(source) => {
            tracing::warn!(path = %path.display(), error = %source, "Failed to create output file");
            Ok(false)
        }
    }
}
