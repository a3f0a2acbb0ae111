//! DOM helpers: scoped listeners, media queries, measuring

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Element, Event, EventTarget, HtmlCanvasElement, MediaQueryList, PointerEvent, TouchEvent,
};

use crate::platform::PlatformError;
use crate::renderer::Viewport;

pub fn window() -> Result<web_sys::Window, PlatformError> {
    web_sys::window().ok_or(PlatformError::Unsupported("window"))
}

pub fn document() -> Result<web_sys::Document, PlatformError> {
    window()?.document().ok_or(PlatformError::Unsupported("document"))
}

/// Event listener removed again when dropped
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        capture: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, PlatformError> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_capture(capture);
        options.set_passive(true);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            capture,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

pub fn media_query(query: &str) -> Option<MediaQueryList> {
    window().ok()?.match_media(query).ok().flatten()
}

/// Whether a media query currently matches; false when unsupported
pub fn media_matches(query: &str) -> bool {
    media_query(query).is_some_and(|list| list.matches())
}

pub fn prefers_reduced_motion() -> bool {
    media_matches("(prefers-reduced-motion: reduce)")
}

pub const COARSE_POINTER_QUERY: &str = "(pointer: coarse)";

pub fn coarse_pointer() -> bool {
    media_matches(COARSE_POINTER_QUERY)
}

pub fn prefers_dark() -> bool {
    media_matches("(prefers-color-scheme: dark)")
}

pub fn page_hidden() -> bool {
    document().is_ok_and(|d| d.hidden())
}

/// Viewport for the container's current box
pub fn measure(container: &Element, coarse: bool) -> Viewport {
    let rect = container.get_bounding_client_rect();
    let dpr = window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    Viewport::from_css(rect.width(), rect.height(), dpr, coarse)
}

/// Give the canvas the container's CSS size
pub fn size_canvas(canvas: &HtmlCanvasElement, viewport: &Viewport) {
    let style = canvas.style();
    let _ = style.set_property("width", &format!("{}px", viewport.width));
    let _ = style.set_property("height", &format!("{}px", viewport.height));
}

/// Client coordinates of a pointer or touch event. Touches use the first
/// active touch, falling back to the first changed one.
pub fn client_point(event: &Event) -> Option<(f64, f64)> {
    if let Some(touch) = event.dyn_ref::<TouchEvent>() {
        let t = touch.touches().get(0).or_else(|| touch.changed_touches().get(0))?;
        return Some((t.client_x() as f64, t.client_y() as f64));
    }
    let pointer = event.dyn_ref::<PointerEvent>()?;
    Some((pointer.client_x() as f64, pointer.client_y() as f64))
}

/// Event position relative to the container's top-left corner
pub fn local_point(container: &Element, event: &Event) -> Option<(f32, f32)> {
    let (x, y) = client_point(event)?;
    let rect = container.get_bounding_client_rect();
    Some(((x - rect.left()) as f32, (y - rect.top()) as f32))
}

pub fn is_transferred(canvas: &HtmlCanvasElement) -> bool {
    canvas.dataset().get("offscreen").as_deref() == Some("true")
}

pub fn mark_transferred(canvas: &HtmlCanvasElement) {
    let _ = canvas.dataset().set("offscreen", "true");
}
