//! Browser bindings
//!
//! [`FireworksBackground`] is what the host page mounts. It measures the
//! container, picks an execution strategy, and turns page events (resize,
//! pointer, visibility, config changes) into protocol messages.

pub mod dom;
pub mod inline;
pub mod offloaded;
pub mod worker;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlCanvasElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use self::dom::Listener;
use self::inline::InlineTransport;
use self::offloaded::WorkerTransport;
use super::protocol::Message;
use super::{Capabilities, Gate, PlatformError, Strategy, Transport};
use crate::config::{Config, ConfigPatch, Theme};

/// Module start hook: logging and panic reporting, in the page and in workers
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Milliseconds on the performance timeline, in a window or a worker
pub fn now_ms() -> f64 {
    js_sys::Reflect::get(&js_sys::global(), &"performance".into())
        .ok()
        .and_then(|p| p.dyn_into::<web_sys::Performance>().ok())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Simulation seed from the platform RNG, or the clock if that fails
pub fn seed() -> u64 {
    getrandom::u64().unwrap_or_else(|_| js_sys::Date::now() as u64)
}

fn has_property(target: &JsValue, name: &str) -> bool {
    js_sys::Reflect::has(target, &name.into()).unwrap_or(false)
}

fn capabilities(canvas: &HtmlCanvasElement, worker_url: Option<&str>) -> Capabilities {
    let global = js_sys::global();
    Capabilities {
        offscreen_canvas: has_property(&global, "OffscreenCanvas"),
        transfer_control: has_property(canvas, "transferControlToOffscreen"),
        worker: has_property(&global, "Worker"),
        worker_script: worker_url.is_some_and(|url| !url.is_empty()),
        already_transferred: dom::is_transferred(canvas),
        reduced_motion: dom::prefers_reduced_motion(),
    }
}

type SharedTransport = Rc<RefCell<Box<dyn Transport>>>;

fn post(transport: &SharedTransport, message: Message) {
    let kind = message.kind();
    if let Err(e) = transport.borrow_mut().post(message) {
        log::warn!("dropped {kind} message: {e}");
    }
}

struct Mounted {
    transport: SharedTransport,
    listeners: Vec<Listener>,
    observer: Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.listeners.clear();
        if let Some((observer, _)) = self.observer.take() {
            observer.disconnect();
        }
        self.transport.borrow_mut().close();
        log::info!("fireworks background unmounted");
    }
}

/// Animated fireworks behind page content
#[wasm_bindgen]
pub struct FireworksBackground {
    mounted: Option<Mounted>,
    strategy: Option<Strategy>,
}

#[wasm_bindgen]
impl FireworksBackground {
    /// Start the animation inside `container`, drawing on `canvas`.
    ///
    /// `config` is a JSON configuration; without one the background-layer
    /// preset for the current color scheme is used. `worker_url` points at the
    /// worker bootstrap script and enables the offloaded strategy.
    pub fn mount(
        container: Element,
        canvas: HtmlCanvasElement,
        config: Option<String>,
        worker_url: Option<String>,
    ) -> FireworksBackground {
        let caps = capabilities(&canvas, worker_url.as_deref());
        let Some(strategy) = Strategy::select(&caps) else {
            log::info!("fireworks background idle ({caps:?})");
            return FireworksBackground {
                mounted: None,
                strategy: None,
            };
        };

        let coarse = dom::coarse_pointer();
        let (config, preset) = initial_config(config.as_deref(), coarse);
        match mount(&container, &canvas, config, strategy, worker_url.as_deref(), coarse, preset) {
            Ok((mounted, strategy)) => {
                log::info!("fireworks background mounted ({strategy:?})");
                FireworksBackground {
                    mounted: Some(mounted),
                    strategy: Some(strategy),
                }
            }
            Err(e) => {
                log::warn!("fireworks background disabled: {e}");
                FireworksBackground {
                    mounted: None,
                    strategy: None,
                }
            }
        }
    }

    /// Merge a partial JSON configuration
    pub fn update_config(&self, patch: &str) {
        let Some(mounted) = self.mounted.as_ref() else {
            return;
        };
        match ConfigPatch::from_json(patch) {
            Ok(config) => post(&mounted.transport, Message::Config { config }),
            Err(e) => log::warn!("ignored configuration update: {e}"),
        }
    }

    /// Switch the firework color to match a light or dark page
    pub fn set_theme(&self, dark: bool) {
        if let Some(mounted) = self.mounted.as_ref() {
            let theme = if dark { Theme::Dark } else { Theme::Light };
            post(&mounted.transport, Message::Config { config: ConfigPatch::for_theme(theme) });
        }
    }

    /// `"inline"`, `"offloaded"` or `"idle"`
    pub fn strategy(&self) -> String {
        match self.strategy {
            Some(Strategy::Inline) => "inline",
            Some(Strategy::Offloaded) => "offloaded",
            None => "idle",
        }
        .to_string()
    }

    /// Stop, remove listeners and release everything
    pub fn unmount(&mut self) {
        self.mounted = None;
        self.strategy = None;
    }
}

/// Host configuration, or the preset when none is usable. The flag is set
/// when the preset was chosen.
fn initial_config(json: Option<&str>, coarse: bool) -> (Config, bool) {
    let preset = || {
        let theme = if dom::prefers_dark() { Theme::Dark } else { Theme::Light };
        (Config::background_layer(theme, coarse), true)
    };
    match json {
        None => preset(),
        Some(json) => match Config::from_json(json) {
            Ok(config) => (config, false),
            Err(e) => {
                log::warn!("{e}, using the preset");
                preset()
            }
        },
    }
}

fn open_transport(
    canvas: &HtmlCanvasElement,
    strategy: Strategy,
    worker_url: Option<&str>,
    init: &Message,
) -> Result<(Box<dyn Transport>, Strategy), PlatformError> {
    if let (Strategy::Offloaded, Some(url)) = (strategy, worker_url) {
        match WorkerTransport::spawn(url, canvas, init) {
            Ok(transport) => return Ok((Box::new(transport), Strategy::Offloaded)),
            Err(e) => log::warn!("worker unavailable, drawing inline: {e}"),
        }
    }
    let mut transport = InlineTransport::new(canvas.clone())?;
    transport.post(init.clone())?;
    Ok((Box::new(transport), Strategy::Inline))
}

fn mount(
    container: &Element,
    canvas: &HtmlCanvasElement,
    config: Config,
    strategy: Strategy,
    worker_url: Option<&str>,
    coarse: bool,
    preset: bool,
) -> Result<(Mounted, Strategy), PlatformError> {
    let window = dom::window()?;
    let document = dom::document()?;

    let viewport = dom::measure(container, coarse);
    let coarse = Rc::new(Cell::new(coarse));
    dom::size_canvas(canvas, &viewport);

    let (transport, strategy) = open_transport(canvas, strategy, worker_url, &Message::init(viewport, config))?;
    let transport: SharedTransport = Rc::new(RefCell::new(transport));
    let gate = Rc::new(Cell::new(Gate::new(false, dom::page_hidden())));
    if !gate.get().is_open() {
        post(&transport, Message::Visibility { hidden: true });
    }

    let mut listeners = Vec::new();

    {
        let transport = transport.clone();
        let container = container.clone();
        let canvas = canvas.clone();
        let coarse = coarse.clone();
        listeners.push(Listener::new(&window, "resize", false, move |_| {
            let viewport = dom::measure(&container, coarse.get());
            dom::size_canvas(&canvas, &viewport);
            post(&transport, Message::resize(viewport));
        })?);
    }

    // The primary pointer can change at runtime
    if let Some(media) = dom::media_query(dom::COARSE_POINTER_QUERY) {
        let transport = transport.clone();
        let container = container.clone();
        let canvas = canvas.clone();
        let coarse = coarse.clone();
        let query = media.clone();
        listeners.push(Listener::new(&media, "change", false, move |_| {
            let now_coarse = query.matches();
            if now_coarse == coarse.replace(now_coarse) {
                return;
            }
            let mut patch = ConfigPatch::for_pointer(now_coarse);
            if !preset {
                patch.frame_rate = None;
            }
            post(&transport, Message::Config { config: patch });
            let viewport = dom::measure(&container, now_coarse);
            dom::size_canvas(&canvas, &viewport);
            post(&transport, Message::resize(viewport));
        })?);
    }

    for kind in ["pointerdown", "touchstart"] {
        let transport = transport.clone();
        let container = container.clone();
        listeners.push(Listener::new(&window, kind, true, move |event| {
            if let Some((x, y)) = dom::local_point(&container, &event) {
                post(&transport, Message::Pointer { x, y });
            }
        })?);
    }

    {
        let transport = transport.clone();
        let gate = gate.clone();
        listeners.push(Listener::new(&document, "visibilitychange", false, move |_| {
            let hidden = dom::page_hidden();
            gate_changed(&gate, &transport, |g| g.set_page_hidden(hidden));
        })?);
    }

    let observer = {
        let transport = transport.clone();
        observe(container, move |in_view| {
            gate_changed(&gate, &transport, |g| g.set_in_view(in_view));
        })
    };

    Ok((
        Mounted {
            transport,
            listeners,
            observer,
        },
        strategy,
    ))
}

/// Apply a gate change and tell the simulation if it flipped
fn gate_changed(gate: &Cell<Gate>, transport: &SharedTransport, change: impl FnOnce(&mut Gate) -> Option<bool>) {
    let mut g = gate.get();
    let flipped = change(&mut g);
    gate.set(g);
    if let Some(open) = flipped {
        post(transport, Message::Visibility { hidden: !open });
    }
}

/// Report whether the container intersects the viewport. `None` when
/// IntersectionObserver is unavailable; the container then counts as visible.
fn observe(
    container: &Element,
    on_change: impl Fn(bool) + 'static,
) -> Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)> {
    let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
        let latest = entries
            .iter()
            .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
            .last();
        if let Some(entry) = latest {
            on_change(entry.is_intersecting());
        }
    });
    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(0.01));
    let observer = match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
        Ok(observer) => observer,
        Err(e) => {
            log::warn!("no intersection observer: {}", PlatformError::from(e));
            return None;
        }
    };
    observer.observe(container);
    Some((observer, callback))
}
