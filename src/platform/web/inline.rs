//! Inline strategy: the simulation runs on the main thread, one tick per
//! animation frame, drawing straight onto the page's canvas

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use super::{dom, now_ms, seed};
use crate::platform::protocol::{Effect, Message, dispatch};
use crate::platform::{PlatformError, Transport};
use crate::renderer::Surface;
use crate::renderer::canvas::CanvasSurface;
use crate::sim::Simulation;

struct Driver {
    sim: Simulation,
    surface: CanvasSurface,
    /// Pending animation frame request
    raf: Option<i32>,
    frame: Option<Closure<dyn FnMut(f64)>>,
}

impl Driver {
    fn request_frame(&mut self) {
        if self.raf.is_some() {
            return;
        }
        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        let requested = dom::window().and_then(|w| {
            w.request_animation_frame(frame.as_ref().unchecked_ref())
                .map_err(PlatformError::from)
        });
        match requested {
            Ok(id) => self.raf = Some(id),
            Err(e) => log::warn!("animation frame request failed: {e}"),
        }
    }

    fn cancel_frame(&mut self) {
        let Some(id) = self.raf.take() else {
            return;
        };
        if let Ok(window) = dom::window() {
            let _ = window.cancel_animation_frame(id);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Nothing => {}
            Effect::Bind(viewport) => {
                self.surface.resize(&viewport);
                self.request_frame();
            }
            Effect::Resize(viewport) => self.surface.resize(&viewport),
            Effect::Resume => self.request_frame(),
            Effect::Suspend => {
                self.cancel_frame();
                self.surface.blank();
            }
        }
    }
}

/// Delivers messages straight into the main-thread simulation
pub struct InlineTransport {
    driver: Rc<RefCell<Driver>>,
    closed: bool,
}

impl InlineTransport {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, PlatformError> {
        let surface = CanvasSurface::new(canvas)?;
        let driver = Rc::new(RefCell::new(Driver {
            sim: Simulation::new(seed()),
            surface,
            raf: None,
            frame: None,
        }));

        let weak: Weak<RefCell<Driver>> = Rc::downgrade(&driver);
        let frame = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            let Some(driver) = weak.upgrade() else {
                return;
            };
            let mut d = driver.borrow_mut();
            d.raf = None;
            let Driver { sim, surface, .. } = &mut *d;
            sim.tick(timestamp, surface);
            if sim.is_running() {
                d.request_frame();
            }
        });
        driver.borrow_mut().frame = Some(frame);

        Ok(Self { driver, closed: false })
    }
}

impl Transport for InlineTransport {
    fn post(&mut self, message: Message) -> Result<(), PlatformError> {
        if self.closed {
            return Err(PlatformError::Closed);
        }
        let mut driver = self.driver.borrow_mut();
        let effect = dispatch(&mut driver.sim, message, now_ms());
        driver.apply(effect);
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let mut driver = self.driver.borrow_mut();
        driver.cancel_frame();
        driver.sim.shutdown();
        driver.surface.blank();
        driver.frame = None;
    }
}
