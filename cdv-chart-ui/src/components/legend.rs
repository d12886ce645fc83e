//! Two-entry colour legend for the compared countries.

use cdv_core::Country;
use dioxus::prelude::*;

#[component]
pub fn CountryLegend() -> Element {
    rsx! {
        div {
            class: "legend",
            style: "display: flex; gap: 16px; justify-content: center; font-size: 13px; margin: 4px 0;",
            for country in Country::TOOLTIP_ORDER {
                span {
                    style: "display: inline-flex; align-items: center; gap: 6px;",
                    span { style: "width: 12px; height: 12px; border-radius: 2px; background: {country.css_var()};" }
                    "{country.label()}"
                }
            }
        }
    }
}
