//! Structured spans for conversion runs
//!
//! Every conversion is wrapped in one span so that reader and writer events
//! share the formats, correlation id and timing of the run they belong to.

use std::time::Instant;
use tracing::{field, span, Level, Span};
use uuid::Uuid;

use crate::pipeline::{InputType, OutputType};

/// Span covering one input document and the outputs written from it
pub struct ConversionSpan {
    span: Span,
    start_time: Instant,
}

impl ConversionSpan {
    /// Create a new conversion span
    pub fn new(input_type: InputType, output_type: OutputType, correlation_id: Option<Uuid>) -> Self {
        let span = span!(
            Level::INFO,
            "conversion",
            input_type = %input_type,
            output_type = %output_type,
            correlation_id = field::Empty,
            points = field::Empty,
            format_warnings = field::Empty,
            files_written = field::Empty,
            success = field::Empty,
            execution_time_ms = field::Empty,
        );
        if let Some(id) = correlation_id {
            span.record("correlation_id", field::display(id));
        }

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Record what the reader produced
    pub fn record_read(&self, points: usize, warnings: usize) {
        self.span.record("points", points);
        self.span.record("format_warnings", warnings);
        tracing::debug!(
            parent: &self.span,
            points = points,
            format_warnings = warnings,
            "Landmarks read"
        );
    }

    /// Record the final outcome of the run
    pub fn record_result(&self, success: bool, files_written: usize) {
        let duration = self.start_time.elapsed();
        self.span.record("success", success);
        self.span.record("files_written", files_written);
        self.span.record("execution_time_ms", duration.as_secs_f64() * 1000.0);

        tracing::info!(
            parent: &self.span,
            success = success,
            files_written = files_written,
            execution_time_ms = duration.as_millis() as u64,
            "Conversion finished"
        );
    }
}
