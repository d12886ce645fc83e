//! Play/pause button and labelled range slider used by the animated widgets.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct PlayButtonProps {
    pub playing: bool,
    pub onclick: EventHandler<MouseEvent>,
    #[props(default = "Play".to_string())]
    pub play_label: String,
    #[props(default = "Pause".to_string())]
    pub pause_label: String,
}

#[component]
pub fn PlayButton(props: PlayButtonProps) -> Element {
    let label = if props.playing { &props.pause_label } else { &props.play_label };
    let icon = if props.playing { "⏸" } else { "▶" };
    rsx! {
        button {
            class: "btn",
            onclick: move |evt| props.onclick.call(evt),
            "{icon} {label}"
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct RangeSliderProps {
    pub min: usize,
    pub max: usize,
    pub value: usize,
    /// Text shown next to the slider, usually the current year or month
    pub label: String,
    pub oninput: EventHandler<usize>,
    #[props(default = false)]
    pub disabled: bool,
}

/// Integer slider over `min..=max`; unparsable input is ignored.
#[component]
pub fn RangeSlider(props: RangeSliderProps) -> Element {
    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 10px; font-size: 13px;",
            input {
                r#type: "range",
                min: "{props.min}",
                max: "{props.max}",
                value: "{props.value}",
                disabled: props.disabled,
                style: "flex: 1;",
                oninput: move |evt: Event<FormData>| {
                    if let Ok(v) = evt.value().parse::<usize>() {
                        props.oninput.call(v.clamp(props.min, props.max));
                    }
                },
            }
            strong { "{props.label}" }
        }
    }
}
