//! The two compared countries.
//!
//! Source datasets spell Palestine several ways (World Bank uses
//! "West Bank and Gaza", UN tables "State of Palestine", ACLED event
//! locations sometimes "Gaza"). Everything is folded into [`Country::Palestine`].

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Country {
    Israel,
    Palestine,
}

impl Country {
    /// Both countries, Israel first.
    pub const ALL: [Country; 2] = [Country::Israel, Country::Palestine];

    /// Display order used by tooltips, which list Palestine first.
    pub const TOOLTIP_ORDER: [Country; 2] = [Country::Palestine, Country::Israel];

    pub fn label(&self) -> &'static str {
        match self {
            Country::Israel => "Israel",
            Country::Palestine => "Palestine",
        }
    }

    /// CSS custom property holding the theme colour of this country.
    pub fn css_var(&self) -> &'static str {
        match self {
            Country::Israel => "var(--color-Israel)",
            Country::Palestine => "var(--color-Palestine)",
        }
    }

    /// Lowercase identifier safe for DOM ids and class names.
    pub fn slug(&self) -> &'static str {
        match self {
            Country::Israel => "israel",
            Country::Palestine => "palestine",
        }
    }

    pub fn other(&self) -> Country {
        match self {
            Country::Israel => Country::Palestine,
            Country::Palestine => Country::Israel,
        }
    }
}

impl FromStr for Country {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Israel" => Ok(Country::Israel),
            "Palestine" | "State of Palestine" | "West Bank and Gaza" | "Gaza"
            | "Gaza Strip" | "West Bank" => Ok(Country::Palestine),
            other => Err(CoreError::UnknownCountry(other.to_string())),
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palestine_aliases_normalize() {
        for name in ["Palestine", "State of Palestine", "West Bank and Gaza", " Gaza "] {
            assert_eq!(name.parse::<Country>(), Ok(Country::Palestine), "{name} should map to Palestine");
        }
    }

    #[test]
    fn israel_parses() {
        assert_eq!("Israel".parse::<Country>(), Ok(Country::Israel));
    }

    #[test]
    fn unknown_country_is_rejected() {
        assert!("Lebanon".parse::<Country>().is_err());
    }

    #[test]
    fn tooltip_order_lists_palestine_first() {
        assert_eq!(Country::TOOLTIP_ORDER[0], Country::Palestine);
    }

    #[test]
    fn css_var_names_theme_colour() {
        assert_eq!(Country::Israel.css_var(), "var(--color-Israel)");
        assert_eq!(Country::Palestine.other(), Country::Israel);
    }
}
