//! Hint banner shown over a widget while the guide overlay is active.

use crate::state::AppState;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct GuideBannerProps {
    pub text: String,
    /// CSS position inside the chart container, e.g. `"top: 8px; left: 12px;"`
    pub position: String,
}

#[component]
pub fn GuideBanner(props: GuideBannerProps) -> Element {
    let state = use_context::<AppState>();
    if !(state.guide)() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "guide-banner",
            style: "position: absolute; {props.position} z-index: 1001; pointer-events: none; \
                    background: var(--color-details); color: #fff; padding: 4px 10px; border-radius: 12px; \
                    font-size: 12px; font-weight: 600; white-space: nowrap;",
            "{props.text}"
        }
    }
}
