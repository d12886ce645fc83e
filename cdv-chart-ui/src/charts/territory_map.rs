//! Outline map of Israel, the Gaza Strip and the West Bank (introduction).

use crate::state::AppState;
use cdv_core::geo::FeatureCollection;
use cdv_core::Country;
use cdv_layout::projection::{geo_path, Mercator};
use dioxus::prelude::*;

const WIDTH: f64 = 1100.0;
const HEIGHT: f64 = 700.0;
const CENTER: (f64, f64) = (35.056898, 31.3945);
const SCALE: f64 = 8500.0;

/// Hand-placed territory labels, `(text, lon, lat, country)`.
const LABELS: [(&str, f64, f64, Country); 3] = [
    ("GazaStrip", 33.8, 31.52, Country::Palestine),
    ("West Bank", 36.10, 31.90, Country::Palestine),
    ("Israel", 34.85, 33.30, Country::Israel),
];

pub fn projection() -> Mercator {
    Mercator::centered(CENTER, SCALE, (WIDTH / 2.0, HEIGHT / 2.0))
}

/// Projected outline of every feature, coloured by its `country` property.
/// Features without a recognised country are left uncoloured.
pub fn territory_outlines(collection: &FeatureCollection, projection: &Mercator) -> Vec<(Option<Country>, String)> {
    collection
        .features
        .iter()
        .filter_map(|f| {
            let d = geo_path(f.geometry.as_ref()?, projection);
            if d.is_empty() {
                return None;
            }
            let country = f.property_str("country").and_then(|c| c.parse().ok());
            Some((country, d))
        })
        .collect()
}

#[component]
pub fn TerritoryMap() -> Element {
    let state = use_context::<AppState>();
    let outlines = use_memo(move || match (state.datasets)() {
        Some(data) => territory_outlines(&data.territories, &projection()),
        None => Vec::new(),
    });
    let p = projection();
    let view_box = format!("0 0 {} {}", WIDTH, HEIGHT);

    rsx! {
        svg {
            class: "territory-map-svg",
            style: "width: 100%; height: auto; display: block;",
            view_box: "{view_box}",
            "preserveAspectRatio": "xMidYMid meet",
            g {
                for (i, (country, d)) in outlines.read().iter().enumerate() {
                    {
                        let stroke = country.map(|c| c.css_var()).unwrap_or("var(--text-secondary)");
                        rsx! {
                            path {
                                key: "{i}",
                                class: "territory",
                                d: "{d}",
                                fill: "transparent",
                                stroke: "{stroke}",
                                "stroke-width": "2",
                                style: "transition: stroke 200ms ease;",
                            }
                        }
                    }
                }
                g {
                    class: "territory-labels",
                    for (name, lon, lat, country) in LABELS {
                        {
                            let (x, y) = p.project(lon, lat);
                            rsx! {
                                text {
                                    key: "{name}",
                                    x: "{x}",
                                    y: "{y}",
                                    dy: "0.35em",
                                    "text-anchor": "middle",
                                    style: "font-size: 30px; font-weight: 700; fill: {country.css_var()}; \
                                            paint-order: stroke; stroke: var(--bg-secondary); stroke-width: 0; transition: fill 200ms ease;",
                                    "{name}"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
