//! Reusable RSX components shared by the chart widgets.

mod chart_container;
mod chart_header;
mod error_display;
mod event_type_filter;
mod guide_banner;
mod legend;
mod loading_spinner;
mod playback;
mod source_note;
mod tooltip;

pub use chart_container::ChartContainer;
pub use chart_header::ChartHeader;
pub use error_display::ErrorDisplay;
pub use event_type_filter::EventTypeFilter;
pub use guide_banner::GuideBanner;
pub use legend::CountryLegend;
pub use loading_spinner::LoadingSpinner;
pub use playback::{PlayButton, RangeSlider};
pub use source_note::SourceNote;
pub use tooltip::Tooltip;
