//! Floating chapter navigation with scroll-spy highlighting.

use cdv_chart_ui::js_bridge;
use cdv_chart_ui::state::AppState;
use cdv_chart_ui::theme::ThemeState;
use dioxus::prelude::*;

/// `(section id, navbar label)` in page order.
pub const CHAPTERS: [(&str, &str); 7] = [
    ("introduction", "War or Genocide?"),
    ("chapter1", "Life"),
    ("chapter2", "Mortality"),
    ("chapter3", "Events"),
    ("chapter4", "Timeline"),
    ("chapter5", "Fatalities"),
    ("chapter6", "Map"),
];

pub static SECTION_IDS: [&str; 7] = [
    "introduction",
    "chapter1",
    "chapter2",
    "chapter3",
    "chapter4",
    "chapter5",
    "chapter6",
];

/// Label shown next to the collapsed mobile menu.
pub fn active_label(active: &str) -> &'static str {
    CHAPTERS
        .iter()
        .find(|(id, _)| *id == active)
        .map(|(_, label)| *label)
        .unwrap_or("Section")
}

fn link_class(id: &str, active: &str) -> &'static str {
    if id == active {
        "nav-link active"
    } else {
        "nav-link"
    }
}

#[component]
pub fn Navbar(active: String) -> Element {
    let mut theme = use_context::<ThemeState>();
    let mut state = use_context::<AppState>();
    let mut menu_open = use_signal(|| false);

    let mut go = move |id: &'static str| {
        js_bridge::scroll_to_section(id);
        menu_open.set(false);
    };
    let theme_icon = if theme.is_dark() { "☀" } else { "☾" };
    let mono_class = if (theme.monochromacy)() { "nav-toggle active" } else { "nav-toggle" };
    let guide_class = if (state.guide)() { "nav-toggle active" } else { "nav-toggle" };

    rsx! {
        nav {
            class: "navbar",
            div {
                class: "navbar-links",
                for (id, label) in CHAPTERS {
                    a {
                        key: "{id}",
                        href: "#{id}",
                        class: link_class(id, &active),
                        onclick: move |e| {
                            e.prevent_default();
                            go(id);
                        },
                        "{label}"
                    }
                }
            }
            div {
                class: "navbar-mobile",
                button {
                    class: "nav-toggle",
                    "aria-label": "Open navigation menu",
                    onclick: move |_| menu_open.toggle(),
                    if menu_open() { "✕" } else { "☰" }
                }
                span { class: "navbar-current", "{active_label(&active)}" }
            }
            div {
                class: "navbar-actions",
                button {
                    class: "nav-toggle",
                    title: "Toggle dark mode",
                    onclick: move |_| theme.toggle_dark(),
                    "{theme_icon}"
                }
                button {
                    class: mono_class,
                    title: "Monochromacy mode",
                    onclick: move |_| theme.toggle_monochromacy(),
                    "◐"
                }
                button {
                    class: guide_class,
                    title: "Guide",
                    onclick: move |_| state.guide.toggle(),
                    "?"
                }
            }
            if menu_open() {
                div {
                    class: "navbar-menu",
                    for (id, label) in CHAPTERS {
                        a {
                            key: "{id}",
                            href: "#{id}",
                            class: link_class(id, &active),
                            onclick: move |e| {
                                e.prevent_default();
                                go(id);
                            },
                            "{label}"
                        }
                    }
                }
            }
        }
    }
}
