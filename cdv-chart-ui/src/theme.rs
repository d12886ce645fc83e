//! Dark mode and monochromacy flags shared by every widget.
//!
//! The pair is persisted in `localStorage` (`isDark`, `isMonochromacy`) and
//! mirrored onto `<html>` as exactly one theme class, which the stylesheet
//! uses to swap the `--color-*` variables.

use crate::js_bridge;
use dioxus::prelude::*;

const DARK_KEY: &str = "isDark";
const MONO_KEY: &str = "isMonochromacy";

pub const ROOT_CLASSES: [&str; 4] = [
    "dark-theme",
    "light-theme",
    "monochromacy-light-mode",
    "monochromacy-dark-mode",
];

/// Root class for a flag combination.
///
/// Monochromacy swaps the naming: the dark palette is published as
/// `monochromacy-light-mode`, which the stylesheet relies on.
pub fn root_class(dark: bool, monochromacy: bool) -> &'static str {
    match (monochromacy, dark) {
        (true, true) => "monochromacy-light-mode",
        (true, false) => "monochromacy-dark-mode",
        (false, true) => "dark-theme",
        (false, false) => "light-theme",
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct ThemeState {
    pub dark: Signal<bool>,
    pub monochromacy: Signal<bool>,
}

impl ThemeState {
    pub fn is_dark(&self) -> bool {
        (self.dark)()
    }

    pub fn toggle_dark(&mut self) {
        let next = !*self.dark.peek();
        self.dark.set(next);
    }

    pub fn toggle_monochromacy(&mut self) {
        let next = !*self.monochromacy.peek();
        self.monochromacy.set(next);
    }
}

/// Provide [`ThemeState`] to the tree, seeded from `localStorage`, and keep
/// storage and the root class in sync with every change.
pub fn use_theme_provider() -> ThemeState {
    let theme = use_context_provider(|| ThemeState {
        dark: Signal::new(js_bridge::load_flag(DARK_KEY, true)),
        monochromacy: Signal::new(js_bridge::load_flag(MONO_KEY, false)),
    });

    use_effect(move || {
        let dark = (theme.dark)();
        let mono = (theme.monochromacy)();
        js_bridge::store_flag(DARK_KEY, dark);
        js_bridge::store_flag(MONO_KEY, mono);
        js_bridge::set_root_class(root_class(dark, mono), &ROOT_CLASSES);
        log::info!("[CDV] theme: dark={} monochromacy={}", dark, mono);
    });

    theme
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_combination_maps_to_one_known_class() {
        let mut seen = Vec::new();
        for dark in [true, false] {
            for mono in [true, false] {
                let class = root_class(dark, mono);
                assert!(ROOT_CLASSES.contains(&class));
                seen.push(class);
            }
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn monochromacy_dark_uses_light_mode_class() {
        assert_eq!(root_class(true, true), "monochromacy-light-mode");
        assert_eq!(root_class(false, false), "light-theme");
    }
}
