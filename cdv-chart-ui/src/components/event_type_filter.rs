//! Checkbox panel choosing which event types feed the ridge plot.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct EventTypeFilterProps {
    /// All event types, sorted
    pub available: Vec<String>,
    pub selected: Signal<Vec<String>>,
}

/// Toggle one type, preserving the order of `available`.
pub(crate) fn toggle(available: &[String], selected: &[String], event_type: &str) -> Vec<String> {
    let on = selected.iter().any(|s| s == event_type);
    available
        .iter()
        .filter(|t| {
            if t.as_str() == event_type {
                !on
            } else {
                selected.contains(t)
            }
        })
        .cloned()
        .collect()
}

#[component]
pub fn EventTypeFilter(props: EventTypeFilterProps) -> Element {
    let mut selected = props.selected;
    let current = selected.read().clone();
    let all = props.available.clone();
    let available = props.available.clone();

    rsx! {
        div {
            class: "event-type-filter",
            style: "display: flex; flex-wrap: wrap; gap: 8px 14px; align-items: center; font-size: 13px; margin: 8px 0;",
            for event_type in props.available.iter().cloned() {
                {
                    let checked = current.contains(&event_type);
                    let available = available.clone();
                    let label = event_type.clone();
                    rsx! {
                        label {
                            key: "{label}",
                            style: "display: inline-flex; gap: 4px; align-items: center; cursor: pointer;",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                onchange: move |_| {
                                    let next = toggle(&available, &selected.peek(), &event_type);
                                    selected.set(next);
                                },
                            }
                            "{label}"
                        }
                    }
                }
            }
            button {
                class: "btn",
                onclick: move |_| selected.set(all.clone()),
                "Select All"
            }
            button {
                class: "btn",
                onclick: move |_| selected.set(Vec::new()),
                "Clear All"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn toggle_adds_and_removes_in_available_order() {
        let all = v(&["Battles", "Protests", "Riots"]);
        assert_eq!(toggle(&all, &v(&["Riots"]), "Battles"), v(&["Battles", "Riots"]));
        assert_eq!(toggle(&all, &v(&["Battles", "Riots"]), "Riots"), v(&["Battles"]));
    }
}
