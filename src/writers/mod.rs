pub mod fiducial;
pub mod plain_text;
pub mod transformix;

pub use fiducial::*;
pub use plain_text::*;
pub use transformix::*;

use crate::data::{CoordinateSet, LandmarkSet};
use crate::error::ConvertError;

/// Significant digits of C++ default stream output.
const SIGNIFICANT_DIGITS: usize = 6;

/// Output side of a conversion.
pub trait LandmarkWriter {
    /// Returns the CLI name of the format this writer produces
    fn name(&self) -> &str;

    /// File name suffix appended to the input stem
    fn suffix(&self, set: CoordinateSet) -> &'static str;

    /// Render the whole output document for one coordinate set
    fn render(&self, landmarks: &LandmarkSet, set: CoordinateSet) -> Result<String, ConvertError>;

    fn file_name(&self, stem: &str, set: CoordinateSet) -> String {
        format!("{stem}{}", self.suffix(set))
    }
}

/// Fail when `set` is the moving half of a set that has none.
pub(crate) fn require_set(landmarks: &LandmarkSet, set: CoordinateSet) -> Result<(), ConvertError> {
    if set == CoordinateSet::Moving && !landmarks.has_moving() && landmarks.point_count() > 0 {
        return Err(ConvertError::MissingMovingSet);
    }
    Ok(())
}

/// Format like `printf("%g")`: six significant digits, trailing zeros trimmed,
/// exponent form outside `1e-4 ..= 1e6`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_matches_stream_output() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "-0");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-98.25), "-98.25");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(123456.7), "123457");
        assert_eq!(format_number(1234567.0), "1.23457e+06");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.00001234), "1.234e-05");
        assert_eq!(format_number(-2.5e-7), "-2.5e-07");
        assert_eq!(format_number(f64::NAN), "nan");
    }
}
