//! Positioned wrapper every widget renders into.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ChartContainerProps {
    /// DOM id, also watched by the reveal observer
    pub id: String,
    #[props(default = 300)]
    pub min_height: u32,
    pub children: Element,
}

/// Relative-positioned box so tooltips and guide banners can be placed
/// over the chart.
#[component]
pub fn ChartContainer(props: ChartContainerProps) -> Element {
    let style = format!(
        "min-height: {}px; position: relative; width: 100%; margin: 16px 0;",
        props.min_height
    );

    rsx! {
        div {
            id: "{props.id}",
            class: "chart-container",
            style: "{style}",
            {props.children}
        }
    }
}
