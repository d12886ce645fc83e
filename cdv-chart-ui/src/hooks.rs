//! Hooks for visibility, animation timing and page scroll tracking.

use dioxus::core::Task;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use serde::Deserialize;

/// Frame interval of the animation timeline, in milliseconds.
const FRAME_MS: u32 = 16;

/// `true` once the element `id` has been at least `threshold` visible.
///
/// Never resets, so entrance animations play once.
pub fn use_reveal(id: &'static str, threshold: f64) -> Signal<bool> {
    let mut visible = use_signal(|| false);
    use_effect(move || {
        spawn(async move {
            let mut observer = document::eval(&format!(
                r#"
                const el = document.getElementById({id:?});
                if (!el || typeof IntersectionObserver === 'undefined') {{
                    dioxus.send(true);
                }} else {{
                    const obs = new IntersectionObserver((entries) => {{
                        if (entries.some((e) => e.isIntersecting)) {{
                            obs.disconnect();
                            dioxus.send(true);
                        }}
                    }}, {{ threshold: {threshold} }});
                    obs.observe(el);
                }}
                "#
            ));
            match observer.recv::<bool>().await {
                Ok(true) => {
                    log::debug!("[CDV] reveal: {} visible", id);
                    visible.set(true);
                }
                Ok(false) => {}
                Err(e) => {
                    log::warn!("[CDV] reveal: observer for {} failed: {:?}", id, e);
                    visible.set(true);
                }
            }
        });
    });
    visible
}

/// Milliseconds elapsed since `start` became true, capped at `total_ms`.
///
/// Stays at 0 until started and holds `total_ms` once finished.
pub fn use_timeline(start: Signal<bool>, total_ms: f64) -> Signal<f64> {
    let mut elapsed = use_signal(|| 0.0);
    let mut running = use_signal(|| false);
    use_effect(move || {
        if !start() || *running.peek() {
            return;
        }
        running.set(true);
        spawn(async move {
            let t0 = js_sys::Date::now();
            loop {
                TimeoutFuture::new(FRAME_MS).await;
                let t = (js_sys::Date::now() - t0).min(total_ms);
                elapsed.set(t);
                if t >= total_ms {
                    break;
                }
            }
        });
    });
    elapsed
}

/// Progress (0..=1) of a stage running `duration` ms after `delay` ms on a timeline.
pub fn stage(elapsed: f64, delay: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return if elapsed >= delay { 1.0 } else { 0.0 };
    }
    ((elapsed - delay) / duration).clamp(0.0, 1.0)
}

/// Call `tick` every `period_ms` while `running` is true.
///
/// Switching `running` off cancels the pending tick.
pub fn use_interval(period_ms: u32, running: Signal<bool>, tick: impl FnMut() + 'static) {
    let mut tick = tick;
    let tick = use_callback(move |_: ()| tick());
    let mut task: Signal<Option<Task>> = use_signal(|| None);
    use_effect(move || {
        let active = running();
        if let Some(previous) = task.write().take() {
            previous.cancel();
        }
        if active {
            task.set(Some(spawn(async move {
                loop {
                    TimeoutFuture::new(period_ms).await;
                    if !*running.peek() {
                        break;
                    }
                    tick.call(());
                }
            })));
        }
    });
}

/// Measured width of an element, 0 until mounted.
///
/// Attach the returned handler to `onmounted`.
pub fn use_element_width() -> (Signal<f64>, impl FnMut(MountedEvent) + Copy) {
    let mut width = use_signal(|| 0.0f64);
    let on_mounted = move |evt: MountedEvent| {
        let mounted = evt.data();
        spawn(async move {
            if let Ok(rect) = mounted.get_client_rect().await {
                width.set(rect.width());
            }
        });
    };
    (width, on_mounted)
}

/// Convert an element-relative pointer position to viewBox units.
///
/// Charts render with `width: 100%; height: auto`, so both axes share the
/// width ratio.
pub fn to_view(element_x: f64, element_y: f64, element_width: f64, view_width: f64) -> (f64, f64) {
    if element_width > 0.0 {
        let k = view_width / element_width;
        (element_x * k, element_y * k)
    } else {
        (element_x, element_y)
    }
}

/// Scroll state pushed from the page on scroll and resize.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PageScroll {
    /// Id of the section closest to the top of the viewport.
    pub active: String,
    /// Scrolled further than 200 px.
    pub scrolled: bool,
    /// Viewport narrower than 768 px.
    pub narrow: bool,
}

/// Track which of `sections` is active while the user scrolls.
pub fn use_page_scroll(sections: &'static [&'static str]) -> Signal<PageScroll> {
    let mut state = use_signal(PageScroll::default);
    use_effect(move || {
        spawn(async move {
            let ids = serde_json::to_string(sections).unwrap_or_else(|_| "[]".to_string());
            let mut listener = document::eval(&format!(
                r#"
                const ids = {ids};
                const report = () => {{
                    let active = ids[0] || '';
                    let best = Infinity;
                    for (const id of ids) {{
                        const el = document.getElementById(id);
                        if (!el) continue;
                        const d = Math.abs(el.getBoundingClientRect().top - 80);
                        if (d < best) {{ best = d; active = id; }}
                    }}
                    dioxus.send({{ active, scrolled: window.scrollY > 200, narrow: window.innerWidth < 768 }});
                }};
                window.addEventListener('scroll', report, {{ passive: true }});
                window.addEventListener('resize', report);
                report();
                await new Promise(() => {{}});
                "#
            ));
            while let Ok(next) = listener.recv::<PageScroll>().await {
                if *state.peek() != next {
                    state.set(next);
                }
            }
        });
    });
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_is_clamped() {
        assert_eq!(stage(0.0, 400.0, 800.0), 0.0);
        assert_eq!(stage(800.0, 400.0, 800.0), 0.5);
        assert_eq!(stage(5000.0, 400.0, 800.0), 1.0);
        assert_eq!(stage(400.0, 400.0, 0.0), 1.0);
    }

    #[test]
    fn view_coordinates_scale_with_element() {
        assert_eq!(to_view(50.0, 20.0, 500.0, 1000.0), (100.0, 40.0));
        assert_eq!(to_view(50.0, 20.0, 0.0, 1000.0), (50.0, 20.0));
    }

    #[test]
    fn page_scroll_decodes_from_json() {
        let s: PageScroll = serde_json::from_str(r#"{"active":"chapter2","scrolled":true,"narrow":false}"#).unwrap();
        assert_eq!(s.active, "chapter2");
        assert!(s.scrolled);
    }
}
