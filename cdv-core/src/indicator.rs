//! Development indicators compared in the small-multiples chart.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    GdpPerCapita,
    DrinkingWater,
    Sanitation,
    FoodInsecurity,
}

impl Indicator {
    /// Panel order of the 2x2 grid.
    pub const ALL: [Indicator; 4] = [
        Indicator::GdpPerCapita,
        Indicator::DrinkingWater,
        Indicator::Sanitation,
        Indicator::FoodInsecurity,
    ];

    /// Column name in `Combined_SmallMultiple.csv`.
    pub fn column(&self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "GDP_per_capita",
            Indicator::DrinkingWater => "Drinking_Water_Access_Percent",
            Indicator::Sanitation => "Sanitation_Access_Percent",
            Indicator::FoodInsecurity => "Food_Insecurity_Percent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "GDP per Capita ($)",
            Indicator::DrinkingWater => "Safe Drinking Water Access (%)",
            Indicator::Sanitation => "Safe Sanitation Access (%)",
            Indicator::FoodInsecurity => "Food Insecurity (%)",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "$",
            _ => "%",
        }
    }

    /// Percentages share a fixed 0..100 axis in the grid view.
    pub fn is_percentage(&self) -> bool {
        !matches!(self, Indicator::GdpPerCapita)
    }

    /// Value without unit: thousands-grouped integer for GDP, one decimal otherwise.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Indicator::GdpPerCapita => group_thousands(value.round()),
            _ => format!("{:.1}", value),
        }
    }

    /// Value followed by its unit, as shown in tooltips and axis ticks.
    pub fn format_with_unit(&self, value: f64) -> String {
        format!("{}{}", self.format_value(value), self.unit())
    }
}

/// Round to an integer and group thousands with commas: `1234567.4` -> `"1,234,567"`.
pub fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        format!("-{out}")
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gdp_is_grouped_in_thousands() {
        assert_eq!(Indicator::GdpPerCapita.format_with_unit(54930.4), "54,930$");
        assert_eq!(Indicator::GdpPerCapita.format_value(999.0), "999");
        assert_eq!(Indicator::GdpPerCapita.format_value(-1234.0), "-1,234");
        assert_eq!(group_thousands(1234567.4), "1,234,567");
    }

    #[test]
    fn percentages_keep_one_decimal() {
        assert_eq!(Indicator::Sanitation.format_with_unit(61.25), "61.2%");
        assert!(Indicator::FoodInsecurity.is_percentage());
        assert!(!Indicator::GdpPerCapita.is_percentage());
    }

    #[test]
    fn columns_match_combined_dataset() {
        let cols: Vec<_> = Indicator::ALL.iter().map(|i| i.column()).collect();
        assert_eq!(
            cols,
            [
                "GDP_per_capita",
                "Drinking_Water_Access_Percent",
                "Sanitation_Access_Percent",
                "Food_Insecurity_Percent"
            ]
        );
    }
}
