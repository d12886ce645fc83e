//! Footer with dataset attribution and the scroll-to-top button.

use cdv_chart_ui::js_bridge;
use dioxus::prelude::*;

/// `(name, description, link)` of every upstream dataset.
const ATTRIBUTIONS: [(&str, &str, &str); 4] = [
    (
        "ACLED",
        "Weekly political violence and protest events, aggregated into fatalities, event types and the infrastructure incidents.",
        "https://acleddata.com/",
    ),
    (
        "World Bank",
        "GDP per capita, drinking water, sanitation and food insecurity indicators.",
        "https://data.worldbank.org/",
    ),
    (
        "HDX / UNOSAT",
        "Gaza municipal boundaries and satellite-detected damage sites.",
        "https://data.humdata.org/",
    ),
    (
        "UN World Population Prospects",
        "Deaths by age used for the mortality distributions.",
        "https://population.un.org/wpp/",
    ),
];

#[component]
pub fn Footer(show_scroll_top: bool) -> Element {
    rsx! {
        footer {
            class: "site-footer",
            h3 { "Datasets" }
            div {
                class: "attributions",
                for (name, description, link) in ATTRIBUTIONS {
                    div {
                        key: "{name}",
                        class: "attribution",
                        strong { "{name}" }
                        p { "{description}" }
                        a { href: "{link}", target: "_blank", rel: "noopener noreferrer", "{link}" }
                    }
                }
            }
            p {
                class: "footer-note",
                "Figures are compiled from the sources above after offline preprocessing; counts are reported as published."
            }
        }
        if show_scroll_top {
            button {
                class: "scroll-top",
                title: "Back to top",
                onclick: move |_| js_bridge::scroll_to_top(),
                "↑"
            }
        }
    }
}
