//! Parse errors for dataset fields.

use std::fmt;

/// Errors produced while interpreting a dataset field.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A country name that does not map to Israel or Palestine.
    UnknownCountry(String),
    /// A month or date string in the wrong shape.
    InvalidPeriod(String),
    /// An age-band header that is not `<lo>-<hi>`.
    InvalidAgeBand(String),
    /// An incident category other than Food System / Health Care.
    UnknownCategory(String),
    /// GeoJSON that could not be decoded.
    InvalidGeometry(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::UnknownCountry(s) => write!(f, "unknown country: {:?}", s),
            CoreError::InvalidPeriod(s) => write!(f, "invalid period: {:?}", s),
            CoreError::InvalidAgeBand(s) => write!(f, "invalid age band: {:?}", s),
            CoreError::UnknownCategory(s) => write!(f, "unknown incident category: {:?}", s),
            CoreError::InvalidGeometry(s) => write!(f, "invalid geometry: {}", s),
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_value() {
        let err = CoreError::UnknownCountry("Atlantis".to_string());
        assert_eq!(err.to_string(), "unknown country: \"Atlantis\"");
    }
}
