//! "Data source" footnote under a chart.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct SourceNoteProps {
    pub source: String,
}

#[component]
pub fn SourceNote(props: SourceNoteProps) -> Element {
    rsx! {
        p {
            class: "source-note",
            style: "margin: 4px 0 0 0; font-size: 11px; font-style: italic; color: var(--color-muted); text-align: right;",
            "Data source: {props.source}"
        }
    }
}
