//! Query result models.
//!
//! All structs derive `Serialize` so a widget can dump them for debugging
//! or hand them to a JS helper unchanged.

use cdv_core::geo::Bounds;
use cdv_core::{Country, IncidentCategory, Indicator, YearMonth};
use cdv_stats::Observation;
use chrono::NaiveDate;
use serde::Serialize;

/// One point of the monthly fatalities line chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyFatalities {
    pub month: YearMonth,
    pub country: Country,
    pub fatalities: f64,
}

/// Fatalities summed over the whole period (donut slices).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountryTotal {
    pub country: Country,
    pub fatalities: f64,
}

/// Events of the selected types in one week for one country.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklyCount {
    pub week: NaiveDate,
    pub country: Country,
    pub events: f64,
}

/// Per-type count of a single week, used by the ridge tooltip.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklyBreakdown {
    pub country: Country,
    pub event_type: String,
    pub events: f64,
}

/// Age-at-death observations of one country in one year.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MortalityProfile {
    pub country: Country,
    pub year: i32,
    /// Ordered by age.
    pub observations: Vec<Observation>,
}

/// Aggregated events along one country -> type -> sub-type path.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventFlow {
    pub country: Country,
    pub event_type: String,
    pub sub_event_type: String,
    pub events: f64,
}

/// Development indicators of one country in one year. Missing cells are `None`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndicatorRow {
    pub country: Country,
    pub year: i32,
    pub gdp_per_capita: Option<f64>,
    pub drinking_water: Option<f64>,
    pub sanitation: Option<f64>,
    pub food_insecurity: Option<f64>,
}

impl IndicatorRow {
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::GdpPerCapita => self.gdp_per_capita,
            Indicator::DrinkingWater => self.drinking_water,
            Indicator::Sanitation => self.sanitation,
            Indicator::FoodInsecurity => self.food_insecurity,
        }
    }
}

/// An attack on civilian food-system or health-care infrastructure.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Incident {
    pub id: i64,
    pub category: IncidentCategory,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub perpetrator: Option<String>,
    pub weapon: Option<String>,
    pub description: Option<String>,
}

/// Time window of the incident map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeWindow {
    /// Every incident.
    Full,
    /// Incidents inside one calendar month.
    Month(YearMonth),
    /// Incidents from the first month up to the end of the given month.
    CumulativeTo(YearMonth),
}

/// Filter for [`Database::query_incidents`](crate::Database::query_incidents).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncidentFilter {
    /// `None` keeps both categories.
    pub category: Option<IncidentCategory>,
    pub window: TimeWindow,
    /// Incidents outside these bounds are dropped.
    pub bounds: Option<Bounds>,
}

impl Default for IncidentFilter {
    fn default() -> Self {
        Self {
            category: None,
            window: TimeWindow::Full,
            bounds: None,
        }
    }
}
