//! Loading spinner component.

use dioxus::prelude::*;

#[component]
pub fn LoadingSpinner() -> Element {
    rsx! {
        div {
            style: "display: flex; justify-content: center; align-items: center; padding: 40px; color: var(--color-muted);",
            "Loading data..."
        }
    }
}
