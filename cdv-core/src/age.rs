//! Age-band columns of the grouped mortality table.
//!
//! Headers look like `0-4`, `5-9`, ..., `95-99`. Each band is represented
//! by its midpoint when estimating densities.

use crate::error::CoreError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBand {
    pub lo: f64,
    pub hi: f64,
}

impl AgeBand {
    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    /// Whether a CSV header names an age band.
    pub fn is_age_column(header: &str) -> bool {
        header.parse::<AgeBand>().is_ok()
    }
}

impl FromStr for AgeBand {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CoreError::InvalidAgeBand(s.to_string());
        let (lo, hi) = s.trim().split_once('-').ok_or_else(bad)?;
        let lo: f64 = lo.trim().parse().map_err(|_| bad())?;
        let hi: f64 = hi.trim().parse().map_err(|_| bad())?;
        if !lo.is_finite() || !hi.is_finite() || hi < lo {
            return Err(bad());
        }
        Ok(AgeBand { lo, hi })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_of_band() {
        let band: AgeBand = "20-24".parse().unwrap();
        assert_eq!(band.midpoint(), 22.0);
    }

    #[test]
    fn non_band_headers_are_not_age_columns() {
        assert!(!AgeBand::is_age_column("Country"));
        assert!(!AgeBand::is_age_column("Year"));
        assert!(AgeBand::is_age_column("95-99"));
    }

    #[test]
    fn reversed_band_is_invalid() {
        assert!("10-5".parse::<AgeBand>().is_err());
    }
}
