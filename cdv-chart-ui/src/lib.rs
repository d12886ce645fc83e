//! Dioxus widgets and shared state for the conflict data narrative site.
//!
//! This crate provides:
//! - `state`: embedded fixture sources, parsed datasets and the reactive `AppState`
//! - `theme`: dark mode and monochromacy flags persisted in `localStorage`
//! - `js_bridge`: root classes, scrolling and storage via `web-sys` and `js_sys::eval()`
//! - `hooks`: reveal-on-scroll, animation timelines, intervals and scroll tracking
//! - `components`: reusable RSX components (containers, tooltips, sliders, etc.)
//! - `charts`: the eight chart widgets of the story

pub mod charts;
pub mod components;
pub mod hooks;
pub mod js_bridge;
pub mod state;
pub mod theme;
