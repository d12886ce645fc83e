//! War or Genocide? A scroll-driven data narrative on Israel and Palestine.
//!
//! Data flow:
//! 1. `build.rs` copies the CSV and GeoJSON fixtures into `OUT_DIR`.
//! 2. `include_str!` embeds them into the WASM binary.
//! 3. On mount: load every CSV into the in-memory SQLite database and parse
//!    the GeoJSON layers (`Datasets::load`).
//! 4. Each chapter widget queries the database and draws its SVG; theme and
//!    guide state are shared through context.

mod chapters;
mod footer;
mod guide;
mod navbar;

use cdv_chart_ui::components::{ErrorDisplay, LoadingSpinner};
use cdv_chart_ui::hooks::use_page_scroll;
use cdv_chart_ui::state::{AppState, Datasets, Sources};
use cdv_chart_ui::theme::use_theme_provider;
use dioxus::prelude::*;

const STYLE: Asset = asset!("/assets/style.css");

const SOURCES: Sources = Sources {
    fatalities_per_month: include_str!(concat!(env!("OUT_DIR"), "/fatalities_per_month.csv")),
    events_per_week: include_str!(concat!(env!("OUT_DIR"), "/events_per_week.csv")),
    events_sankey: include_str!(concat!(env!("OUT_DIR"), "/events_sankey.csv")),
    mortality: include_str!(concat!(env!("OUT_DIR"), "/mortality.csv")),
    indicators: include_str!(concat!(env!("OUT_DIR"), "/Combined_SmallMultiple.csv")),
    incidents: include_str!(concat!(env!("OUT_DIR"), "/Combined_Incidents_GeoChart.csv")),
    gaza_boundaries: include_str!(concat!(env!("OUT_DIR"), "/gaza_boundaries.geojson")),
    damage_clusters: include_str!(concat!(env!("OUT_DIR"), "/damage_clusters.geojson")),
    territories: include_str!(concat!(env!("OUT_DIR"), "/unified_territories.geojson")),
};

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("cdv-root"))
        .launch(App);
}

#[component]
fn App() -> Element {
    let mut state = use_context_provider(AppState::new);
    use_theme_provider();
    let scroll = use_page_scroll(&navbar::SECTION_IDS);

    // Parse every dataset once on mount.
    use_effect(move || {
        match Datasets::load(&SOURCES) {
            Ok(data) => {
                log::info!("[CDV] site: datasets ready");
                state.datasets.set(Some(data));
            }
            Err(e) => {
                log::error!("[CDV] site: dataset load failed: {:#}", e);
                state.error_msg.set(Some(format!("Failed to load datasets: {}", e)));
            }
        }
        state.loading.set(false);
    });

    let page = scroll();

    rsx! {
        document::Stylesheet { href: STYLE }

        if page.narrow {
            guide::MobileGate {}
        }

        navbar::Navbar { active: page.active.clone() }
        guide::GuideOverlay {}

        main {
            class: "story",
            if let Some(err) = state.error_msg.read().as_ref() {
                ErrorDisplay { message: err.clone() }
            }
            if *state.loading.read() {
                LoadingSpinner {}
            } else {
                chapters::Chapters {}
            }
        }

        footer::Footer { show_scroll_top: page.scrolled }
    }
}
