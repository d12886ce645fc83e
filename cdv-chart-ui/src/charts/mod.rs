//! Chart widgets, one per chapter figure.
//!
//! Each module pairs a pure view function (scales, paths, hit-testing),
//! covered by unit tests, with the `#[component]` that renders it.

pub mod event_sankey;
pub mod events_ridge;
pub mod fatalities_donut;
pub mod fatalities_line;
pub mod incident_map;
pub mod indicator_multiples;
pub mod mortality_violin;
pub mod territory_map;

pub use event_sankey::EventSankey;
pub use events_ridge::EventsRidge;
pub use fatalities_donut::FatalitiesDonut;
pub use fatalities_line::FatalitiesLineChart;
pub use incident_map::IncidentMap;
pub use indicator_multiples::IndicatorMultiples;
pub use mortality_violin::MortalityViolin;
pub use territory_map::TerritoryMap;
