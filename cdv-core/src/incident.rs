//! Incident categories of the attacks-on-civilian-infrastructure dataset.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentCategory {
    FoodSystem,
    HealthCare,
}

impl IncidentCategory {
    pub const ALL: [IncidentCategory; 2] = [IncidentCategory::FoodSystem, IncidentCategory::HealthCare];

    pub fn label(&self) -> &'static str {
        match self {
            IncidentCategory::FoodSystem => "Food System",
            IncidentCategory::HealthCare => "Health Care",
        }
    }
}

impl FromStr for IncidentCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Food System" => Ok(IncidentCategory::FoodSystem),
            "Health Care" => Ok(IncidentCategory::HealthCare),
            other => Err(CoreError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_categories() {
        assert_eq!("Food System".parse(), Ok(IncidentCategory::FoodSystem));
        assert_eq!("Health Care".parse(), Ok(IncidentCategory::HealthCare));
        assert!("Education".parse::<IncidentCategory>().is_err());
    }
}
