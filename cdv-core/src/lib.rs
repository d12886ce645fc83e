//! Domain types shared by the conflict data narrative crates.
//!
//! This crate provides:
//! - `country`: the two compared countries and name normalization
//! - `period`: month and date helpers for the monthly and weekly series
//! - `age`: age-band column parsing for the mortality table
//! - `indicator`: the four development indicators of the small multiples
//! - `incident`: incident categories of the map dataset
//! - `geo`: a minimal GeoJSON model for the map widgets
//! - `error`: the error type returned by every parser in this crate

pub mod age;
pub mod country;
pub mod error;
pub mod geo;
pub mod incident;
pub mod indicator;
pub mod period;

pub use country::Country;
pub use error::CoreError;
pub use incident::IncidentCategory;
pub use indicator::Indicator;
pub use period::YearMonth;
