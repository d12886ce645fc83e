//! Thin wrappers around the browser: root classes, scrolling and
//! `localStorage`.
//!
//! Anything that cannot be expressed through `web-sys` features enabled in
//! the workspace goes through [`call_js`], which never panics.

use web_sys::{ScrollBehavior, ScrollToOptions};

/// Fixed navbar height subtracted when scrolling to a chapter.
const NAVBAR_OFFSET: f64 = 60.0;

/// Execute arbitrary JS, wrapping in try/catch to avoid panics.
pub fn call_js(code: &str) {
    let wrapped = format!(
        "try {{ {} }} catch(e) {{ console.warn('CDV JS call failed:', e); }}",
        code
    );
    let _ = js_sys::eval(&wrapped);
}

/// Replace any of `all` on `<html>` with `class`.
pub fn set_root_class(class: &str, all: &[&str]) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        log::warn!("[CDV] js_bridge: no document element, theme class not applied");
        return;
    };
    let list = root.class_list();
    for c in all {
        let _ = list.remove_1(c);
    }
    if let Err(e) = list.add_1(class) {
        log::warn!("[CDV] js_bridge: failed to add class {}: {:?}", class, e);
    }
}

/// Smooth-scroll so the element `id` sits just below the navbar.
pub fn scroll_to_section(id: &str) {
    call_js(&format!(
        "var el = document.getElementById({id:?}); \
         if (el) window.scrollTo({{ top: el.getBoundingClientRect().top + window.scrollY - {NAVBAR_OFFSET}, behavior: 'smooth' }});"
    ));
}

pub fn scroll_to_top() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let opts = ScrollToOptions::new();
    opts.set_top(0.0);
    opts.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&opts);
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Read a boolean preference stored as `"true"` / `"false"`.
pub fn load_flag(key: &str, default: bool) -> bool {
    storage()
        .and_then(|s| s.get_item(key).ok().flatten())
        .map(|v| parse_flag(&v, default))
        .unwrap_or(default)
}

pub fn store_flag(key: &str, value: bool) {
    let Some(s) = storage() else {
        return;
    };
    if let Err(e) = s.set_item(key, if value { "true" } else { "false" }) {
        log::warn!("[CDV] js_bridge: could not persist {}: {:?}", key, e);
    }
}

/// Stored values are JSON booleans; anything else falls back to `default`.
fn parse_flag(value: &str, default: bool) -> bool {
    serde_json::from_str::<bool>(value).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_json_booleans() {
        assert!(parse_flag("true", false));
        assert!(!parse_flag("false", true));
        assert!(parse_flag("garbage", true));
        assert!(!parse_flag("", false));
    }
}
