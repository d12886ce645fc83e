//! Guide overlay and the small-screen gate.

use cdv_chart_ui::state::AppState;
use dioxus::prelude::*;

/// Dims the page while the guide is on; the widgets draw their own hint
/// banners above it.
#[component]
pub fn GuideOverlay() -> Element {
    let mut state = use_context::<AppState>();
    if !(state.guide)() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "guide-overlay",
            style: "position: fixed; inset: 0; background: rgba(0, 0, 0, 0.45); z-index: 1000; pointer-events: none;",
        }
        div {
            class: "guide-panel",
            style: "position: fixed; bottom: 24px; left: 50%; transform: translateX(-50%); z-index: 1002; \
                    background: var(--bg-secondary); color: var(--text-primary); border-radius: 12px; \
                    padding: 10px 18px; display: flex; gap: 12px; align-items: center; box-shadow: 0 2px 8px rgba(0,0,0,0.25);",
            span { "Guide mode: the highlighted hints explain each chart's controls." }
            button {
                class: "btn",
                onclick: move |_| state.guide.set(false),
                "Close guide"
            }
        }
    }
}

/// Shown instead of the interactive charts on viewports narrower than 768 px.
#[component]
pub fn MobileGate() -> Element {
    rsx! {
        div {
            class: "mobile-gate",
            style: "position: fixed; inset: 0; z-index: 3000; display: flex; flex-direction: column; \
                    align-items: center; justify-content: center; padding: 32px; text-align: center; \
                    background: var(--bg-primary); color: var(--text-primary);",
            h2 { "Best viewed on a larger screen" }
            p { "The charts in this story need at least 768 pixels of width. Please open it on a tablet or desktop." }
        }
    }
}
