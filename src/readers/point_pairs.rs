//! Reader for the annotator's point-pair export.
//!
//! The document starts with two `Scan_<n>=<path>` tokens naming the fixed and
//! moving images, followed by one record per landmark:
//!
//! ```text
//! Point_0->Distinctiveness=0.92
//! Point_0->ManuallyChosen=1
//! Point_0->SqDiffRegion=7
//! Point_0->VeryUnsure=0
//! Point_0->0=112
//! Point_0->0_Corresp=118
//! Point_0->0_SystemGuess=117
//! Point_0->1=...
//! ```
//!
//! Each axis carries a fixed voxel index, the corresponding moving index and
//! optionally a system-guess token that is skipped. Voxel indices are turned
//! into physical positions with the fixed image's header geometry.

use std::path::Path;

use crate::config::ConversionConfig;
use crate::data::{
    collect_reversed, read_geometry, reverse_triples, GeometryRecord, LandmarkSet, DIMENSIONS,
};
use crate::error::ConvertError;
use crate::pipeline::OutputType;
use crate::readers::{
    read_document, FormatIssue, LandmarkReader, ReadResult, Token, TokenStream, WarningSink,
};
use crate::utils::paths::{header_path, resolve_image_path};

const SYSTEM_GUESS_SUFFIX: &str = "_SystemGuess";

/// One landmark record as it appears in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub point: usize,
    pub manually_chosen: bool,
    /// Only ever set for manually chosen points.
    pub very_unsure: bool,
    pub fixed_voxel: [f64; DIMENSIONS],
    pub moving_voxel: [f64; DIMENSIONS],
    pub system_guesses: usize,
    /// Tokens this record occupied, system guesses included.
    pub tokens: usize,
}

impl PointRecord {
    /// Whether the point survives the certainty filter.
    pub fn is_kept(&self, keep_all: bool) -> bool {
        keep_all || !self.very_unsure
    }
}

/// Parsed point-pair export, still in voxel space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointPairDocument {
    pub fixed_image: String,
    pub moving_image: String,
    pub records: Vec<PointRecord>,
}

impl PointPairDocument {
    /// Voxel triples of the kept records, in document order.
    pub fn kept_voxels(&self, keep_all: bool) -> (Vec<f64>, Vec<f64>) {
        let mut fixed = Vec::with_capacity(self.records.len() * DIMENSIONS);
        let mut moving = Vec::with_capacity(self.records.len() * DIMENSIONS);

        for record in &self.records {
            tracing::trace!(
                point = record.point,
                tokens = record.tokens,
                system_guesses = record.system_guesses,
                "Record parsed"
            );
            if record.is_kept(keep_all) {
                fixed.extend_from_slice(&record.fixed_voxel);
                moving.extend_from_slice(&record.moving_voxel);
            } else {
                tracing::debug!(point = record.point, "Discarding very unsure point");
            }
        }

        (fixed, moving)
    }
}

/// Parse a point-pair export. Structural problems go to `sink`.
pub fn parse_point_pairs(
    content: &str,
    sink: &mut WarningSink,
) -> Result<PointPairDocument, ConvertError> {
    let mut stream = TokenStream::new(content);

    let Some(fixed_image) = next_image_path(&mut stream, sink)? else {
        sink.report(stream.line(), FormatIssue::MissingImagePaths)?;
        return Ok(PointPairDocument::default());
    };
    let moving_image = next_image_path(&mut stream, sink)?.unwrap_or_default();

    let mut records = Vec::new();
    let mut expected = 0;
    while let Some(record) = parse_record(&mut stream, expected, sink)? {
        expected = record.point + 1;
        records.push(record);
    }

    Ok(PointPairDocument {
        fixed_image,
        moving_image,
        records,
    })
}

fn next_image_path(
    stream: &mut TokenStream<'_>,
    sink: &mut WarningSink,
) -> Result<Option<String>, ConvertError> {
    let Some(token) = stream.next_token() else {
        return Ok(None);
    };

    match token.key_value() {
        Some((key, value)) if key.starts_with("Scan_") => Ok(Some(value.to_string())),
        _ => {
            sink.report(
                token.line,
                FormatIssue::UnexpectedKey {
                    expected: "Scan_<n>=<path>".to_string(),
                    found: token.text.to_string(),
                },
            )?;
            Ok(Some(token.text.to_string()))
        }
    }
}

// Returns None at end of input, including after a truncated record.
fn parse_record(
    stream: &mut TokenStream<'_>,
    expected: usize,
    sink: &mut WarningSink,
) -> Result<Option<PointRecord>, ConvertError> {
    let start = stream.consumed();
    let Some(head) = stream.next_token() else {
        return Ok(None);
    };

    let point = match head.point_key() {
        Some(key) if key.field == "Distinctiveness" => key.point,
        Some(key) => {
            sink.report(
                head.line,
                FormatIssue::UnexpectedKey {
                    expected: format!("Point_{}->Distinctiveness", key.point),
                    found: head.text.to_string(),
                },
            )?;
            key.point
        }
        None => {
            sink.report(
                head.line,
                FormatIssue::UnexpectedKey {
                    expected: format!("Point_{expected}->Distinctiveness"),
                    found: head.text.to_string(),
                },
            )?;
            expected
        }
    };

    let mut cursor = RecordCursor {
        stream,
        sink,
        point,
    };

    let Some(manually_chosen) = cursor.flag("ManuallyChosen")? else {
        return cursor.truncated();
    };

    // Region descriptor
    if cursor.skip().is_none() {
        return cursor.truncated();
    }

    // Automatically chosen points are never flagged unsure.
    let very_unsure = if manually_chosen {
        match cursor.flag("VeryUnsure")? {
            Some(flag) => flag,
            None => return cursor.truncated(),
        }
    } else {
        if cursor.skip().is_none() {
            return cursor.truncated();
        }
        false
    };

    let mut fixed_voxel = [0.0; DIMENSIONS];
    let mut moving_voxel = [0.0; DIMENSIONS];
    let mut system_guesses = 0;

    for axis in 0..DIMENSIONS {
        system_guesses += cursor.skip_system_guesses();

        let Some(fixed) = cursor.coordinate(&axis.to_string())? else {
            return cursor.truncated();
        };
        system_guesses += cursor.skip_system_guesses();
        let Some(moving) = cursor.coordinate(&format!("{axis}_Corresp"))? else {
            return cursor.truncated();
        };

        fixed_voxel[axis] = fixed;
        moving_voxel[axis] = moving;
    }
    system_guesses += cursor.skip_system_guesses();

    Ok(Some(PointRecord {
        point,
        manually_chosen,
        very_unsure,
        fixed_voxel,
        moving_voxel,
        system_guesses,
        tokens: cursor.stream.consumed() - start,
    }))
}

/// Per-record parse state.
struct RecordCursor<'s, 'a> {
    stream: &'s mut TokenStream<'a>,
    sink: &'s mut WarningSink,
    point: usize,
}

impl<'a> RecordCursor<'_, 'a> {
    fn truncated<T>(self) -> Result<Option<T>, ConvertError> {
        self.sink
            .report(self.stream.line(), FormatIssue::TruncatedRecord(self.point))?;
        Ok(None)
    }

    fn skip(&mut self) -> Option<Token<'a>> {
        self.stream.next_token()
    }

    /// Consume the next token, check its key, and return its value.
    fn field(&mut self, field: &str) -> Result<Option<&'a str>, ConvertError> {
        let Some(token) = self.stream.next_token() else {
            return Ok(None);
        };
        let value = token.key_value().map_or(token.text, |(_, v)| v);

        match token.point_key() {
            Some(key) if key.field == field => {
                if key.point != self.point {
                    self.sink.report(
                        token.line,
                        FormatIssue::PointMismatch {
                            expected: self.point,
                            found: key.point,
                        },
                    )?;
                }
            }
            _ => {
                self.sink.report(
                    token.line,
                    FormatIssue::UnexpectedKey {
                        expected: format!("Point_{}->{}", self.point, field),
                        found: token.text.to_string(),
                    },
                )?;
            }
        }

        Ok(Some(value))
    }

    fn flag(&mut self, field: &str) -> Result<Option<bool>, ConvertError> {
        Ok(self.field(field)?.map(|value| value.trim() != "0"))
    }

    fn coordinate(&mut self, field: &str) -> Result<Option<f64>, ConvertError> {
        let Some(value) = self.field(field)? else {
            return Ok(None);
        };

        match value.trim().parse::<f64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                self.sink.report(
                    self.stream.line(),
                    FormatIssue::InvalidNumber {
                        key: format!("Point_{}->{}", self.point, field),
                        value: value.to_string(),
                    },
                )?;
                Ok(Some(0.0))
            }
        }
    }

    fn skip_system_guesses(&mut self) -> usize {
        let mut skipped = 0;
        while self
            .stream
            .peek()
            .and_then(|t| t.point_key())
            .is_some_and(|key| key.field.ends_with(SYSTEM_GUESS_SUFFIX))
        {
            self.stream.next_token();
            skipped += 1;
        }
        skipped
    }
}

/// Convert voxel triples to physical ones with `geometry`.
///
/// Triples are gathered last point first and then restored to document
/// order. When `echo_geometry` is set the geometry is attached to the set for
/// writers that repeat it.
pub fn to_physical_landmarks(
    fixed_voxels: &[f64],
    moving_voxels: &[f64],
    geometry: &GeometryRecord,
    echo_geometry: bool,
) -> Result<LandmarkSet, ConvertError> {
    let mut fixed = collect_reversed(fixed_voxels, |v| geometry.to_physical(v));
    let mut moving = collect_reversed(moving_voxels, |v| geometry.to_physical(v));
    reverse_triples(&mut fixed);
    reverse_triples(&mut moving);

    let landmarks = LandmarkSet::new(fixed, moving)?;
    Ok(if echo_geometry {
        landmarks.with_geometry(geometry)
    } else {
        landmarks
    })
}

/// Reads point-pair exports (`ix_pp`).
pub struct PointPairReader<'a> {
    config: &'a ConversionConfig,
    target: OutputType,
    keep_all: bool,
}

impl<'a> PointPairReader<'a> {
    pub fn new(config: &'a ConversionConfig, target: OutputType, keep_all: bool) -> Self {
        Self {
            config,
            target,
            keep_all,
        }
    }
}

impl LandmarkReader for PointPairReader<'_> {
    fn name(&self) -> &str {
        "ix_pp"
    }

    fn read(&self, path: &Path) -> Result<ReadResult, ConvertError> {
        let mut sink = WarningSink::new(self.config.strict_format);

        tracing::info!(path = %path.display(), "Opening point pairs file");
        let content = read_document(path, self.config.strict_io)?.unwrap_or_default();
        let document = parse_point_pairs(&content, &mut sink)?;
        let (fixed_voxels, moving_voxels) = document.kept_voxels(self.keep_all);

        tracing::debug!(
            records = document.records.len(),
            kept = fixed_voxels.len() / DIMENSIONS,
            moving_image = %document.moving_image,
            "Point pairs parsed"
        );

        // Only the fixed image's header is consulted; both sets share its geometry.
        let geometry = if document.fixed_image.is_empty() {
            GeometryRecord::default()
        } else {
            let image = resolve_image_path(&document.fixed_image, &self.config.drive_map);
            let header = header_path(&image, &self.config.header_extension);
            read_geometry(&header, self.config.strict_io, &mut sink)?
        };

        let landmarks = to_physical_landmarks(
            &fixed_voxels,
            &moving_voxels,
            &geometry,
            self.target.echoes_geometry(),
        )?;

        Ok(ReadResult {
            landmarks,
            warnings: sink.into_warnings(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(point: usize, manual: bool, unsure: bool, guesses: bool) -> String {
        let mut lines = vec![
            format!("Point_{point}->Distinctiveness=0.5"),
            format!("Point_{point}->ManuallyChosen={}", u8::from(manual)),
            format!("Point_{point}->SqDiffRegion=3"),
            format!("Point_{point}->VeryUnsure={}", u8::from(unsure)),
        ];
        for axis in 0..3 {
            lines.push(format!("Point_{point}->{axis}={}", point * 10 + axis));
            lines.push(format!("Point_{point}->{axis}_Corresp={}", point * 10 + axis + 100));
            if guesses {
                lines.push(format!("Point_{point}->{axis}_SystemGuess=9"));
            }
        }
        lines.join("\n")
    }

    #[test]
    fn test_parse_records_in_document_order() {
        let doc = format!(
            "Scan_1=/img/fixed.mhd\nScan_2=/img/moving.mhd\n{}\n{}\n",
            record(0, false, false, false),
            record(1, true, false, true)
        );
        let mut sink = WarningSink::new(true);
        let parsed = parse_point_pairs(&doc, &mut sink).unwrap();

        assert_eq!(parsed.fixed_image, "/img/fixed.mhd");
        assert_eq!(parsed.moving_image, "/img/moving.mhd");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].fixed_voxel, [0.0, 1.0, 2.0]);
        assert_eq!(parsed.records[0].moving_voxel, [100.0, 101.0, 102.0]);
        assert_eq!(parsed.records[0].tokens, 10);
        assert_eq!(parsed.records[1].fixed_voxel, [10.0, 11.0, 12.0]);
        assert_eq!(parsed.records[1].system_guesses, 3);
        assert_eq!(parsed.records[1].tokens, 13);
    }

    #[test]
    fn test_unsure_flag_ignored_for_automatic_points() {
        let doc = format!("Scan_1=a.mhd Scan_2=b.mhd {}", record(0, false, true, false));
        let mut sink = WarningSink::new(false);
        let parsed = parse_point_pairs(&doc, &mut sink).unwrap();
        assert!(!parsed.records[0].very_unsure);
        assert!(parsed.records[0].is_kept(false));
    }

    #[test]
    fn test_truncated_record_is_dropped() {
        let full = record(0, false, false, false);
        let second = record(1, false, false, false);
        let partial: Vec<&str> = second.lines().take(6).collect();
        let doc = format!("Scan_1=a.mhd\nScan_2=b.mhd\n{full}\n{}\n", partial.join("\n"));

        let mut sink = WarningSink::new(false);
        let parsed = parse_point_pairs(&doc, &mut sink).unwrap();
        assert_eq!(parsed.records.len(), 1);

        let warnings = sink.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].issue, FormatIssue::TruncatedRecord(1));
    }

    #[test]
    fn test_key_mismatch_reports_line() {
        let doc = format!("Scan_1=a.mhd\nScan_2=b.mhd\n{}", record(0, false, false, false))
            .replace("Point_0->1_Corresp", "Point_0->1_Correspondence");
        let mut sink = WarningSink::new(false);
        let parsed = parse_point_pairs(&doc, &mut sink).unwrap();
        assert_eq!(parsed.records[0].moving_voxel, [100.0, 101.0, 102.0]);

        let warnings = sink.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 10);
    }

    // Guess token sits between the fixed index and its correspondence.
    fn record_with_inner_guesses(point: usize, manual: bool, unsure: bool) -> String {
        let mut lines = vec![
            format!("Point_{point}->Distinctiveness=0.5"),
            format!("Point_{point}->ManuallyChosen={}", u8::from(manual)),
            format!("Point_{point}->SqDiffRegion=3"),
            format!("Point_{point}->VeryUnsure={}", u8::from(unsure)),
        ];
        for axis in 0..3 {
            lines.push(format!("Point_{point}->{axis}={}", 10 + axis));
            lines.push(format!("Point_{point}->{axis}_SystemGuess=99"));
            lines.push(format!("Point_{point}->{axis}_Corresp={}", 20 + axis));
        }
        lines.join("\n")
    }

    #[test]
    fn test_guess_between_fixed_and_corresp_is_skipped() {
        let doc = format!(
            "Scan_1=a.mhd\nScan_2=b.mhd\n{}\n{}\n",
            record_with_inner_guesses(0, true, false),
            record(1, false, false, false)
        );
        let mut sink = WarningSink::new(true);
        let parsed = parse_point_pairs(&doc, &mut sink).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].fixed_voxel, [10.0, 11.0, 12.0]);
        assert_eq!(parsed.records[0].moving_voxel, [20.0, 21.0, 22.0]);
        assert_eq!(parsed.records[0].system_guesses, 3);
        assert_eq!(parsed.records[1].fixed_voxel, [10.0, 11.0, 12.0]);
        assert_eq!(parsed.records[1].moving_voxel, [110.0, 111.0, 112.0]);
    }

    #[test]
    fn test_unsure_record_with_inner_guesses_is_discarded() {
        let doc = format!(
            "Scan_1=a.mhd\nScan_2=b.mhd\n{}\n{}\n",
            record_with_inner_guesses(0, true, true),
            record(1, false, false, false)
        );
        let mut sink = WarningSink::new(true);
        let parsed = parse_point_pairs(&doc, &mut sink).unwrap();
        assert_eq!(parsed.records.len(), 2);

        let (fixed, moving) = parsed.kept_voxels(false);
        assert_eq!(fixed, vec![10.0, 11.0, 12.0]);
        assert_eq!(moving, vec![110.0, 111.0, 112.0]);

        let (fixed, _) = parsed.kept_voxels(true);
        assert_eq!(fixed.len(), 6);
    }

    #[test]
    fn test_missing_distinctiveness_reported_on_its_line() {
        let doc = format!("Scan_1=a.mhd\nScan_2=b.mhd\n{}", record(0, false, false, false))
            .replace("Point_0->Distinctiveness=0.5", "Point_0->Salience=0.5");
        let mut sink = WarningSink::new(false);
        let parsed = parse_point_pairs(&doc, &mut sink).unwrap();
        assert_eq!(parsed.records.len(), 1);

        let warnings = sink.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 3);
        assert!(matches!(warnings[0].issue, FormatIssue::UnexpectedKey { .. }));
    }

    #[test]
    fn test_physical_conversion_keeps_order() {
        let geometry = GeometryRecord {
            offset: [1.0, 2.0, 3.0],
            spacing: [2.0, 2.0, 2.0],
            ..Default::default()
        };
        let set = to_physical_landmarks(
            &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            &[5.0, 5.0, 5.0, 6.0, 6.0, 6.0],
            &geometry,
            false,
        )
        .unwrap();
        assert_eq!(set.fixed(), &[1.0, 2.0, 3.0, 3.0, 4.0, 5.0]);
        assert_eq!(set.moving(), &[11.0, 12.0, 13.0, 13.0, 14.0, 15.0]);
        assert_eq!(set.image_dimensions(), "");
        assert_eq!(set.spacing(), [0.0; 3]);
    }
}
