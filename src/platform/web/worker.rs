//! Worker side of the offloaded strategy
//!
//! Decodes envelopes from the page, owns the simulation and the offscreen
//! surface, and drives ticks from a `setTimeout` loop paced by the frame rate.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{DedicatedWorkerGlobalScope, MessageEvent, OffscreenCanvas};

use super::offloaded::{ENVELOPE_CANVAS, ENVELOPE_JSON};
use super::{now_ms, seed};
use crate::platform::protocol::{Effect, Message, ProtocolError, dispatch};
use crate::platform::PlatformError;
use crate::renderer::Surface;
use crate::renderer::canvas::OffscreenSurface;
use crate::sim::Simulation;

struct WorkerLoop {
    scope: DedicatedWorkerGlobalScope,
    sim: Simulation,
    surface: Option<OffscreenSurface>,
    timer: Option<i32>,
    step: Option<Closure<dyn FnMut()>>,
}

impl WorkerLoop {
    fn schedule(&mut self) {
        if self.timer.is_some() || !self.sim.is_running() || self.surface.is_none() {
            return;
        }
        let Some(step) = self.step.as_ref() else {
            return;
        };
        let delay = self.sim.timer_interval_ms().round() as i32;
        match self
            .scope
            .set_timeout_with_callback_and_timeout_and_arguments_0(step.as_ref().unchecked_ref(), delay)
        {
            Ok(id) => self.timer = Some(id),
            Err(e) => log::warn!("worker timer failed: {}", PlatformError::from(e)),
        }
    }

    fn cancel(&mut self) {
        if let Some(id) = self.timer.take() {
            self.scope.clear_timeout_with_handle(id);
        }
    }

    fn step(&mut self) {
        self.timer = None;
        if let Some(surface) = self.surface.as_mut() {
            self.sim.tick(now_ms(), surface);
        }
        self.schedule();
    }

    fn receive(&mut self, data: &JsValue) -> Result<(), PlatformError> {
        let json = js_sys::Reflect::get(data, &ENVELOPE_JSON.into())?
            .as_string()
            .ok_or(ProtocolError::MissingPayload)?;
        let message = Message::from_json(&json)?;

        if matches!(message, Message::Init { .. }) {
            let canvas = js_sys::Reflect::get(data, &ENVELOPE_CANVAS.into())?
                .dyn_into::<OffscreenCanvas>()
                .map_err(|_| ProtocolError::MissingCanvas)?;
            self.surface = Some(OffscreenSurface::new(canvas)?);
        }

        log::debug!("worker received {}", message.kind());
        match dispatch(&mut self.sim, message, now_ms()) {
            Effect::Nothing => {}
            Effect::Bind(viewport) | Effect::Resize(viewport) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(&viewport);
                }
                self.schedule();
            }
            Effect::Resume => self.schedule(),
            Effect::Suspend => {
                self.cancel();
                if let Some(surface) = self.surface.as_ref() {
                    surface.blank();
                }
            }
        }
        Ok(())
    }
}

/// Worker entry point, called by the worker bootstrap script once the module
/// is instantiated. `backlog` holds message events that arrived before then.
#[wasm_bindgen]
pub fn worker_main(backlog: Option<js_sys::Array>) -> Result<(), JsValue> {
    let scope: DedicatedWorkerGlobalScope = js_sys::global().dyn_into()?;
    let state = Rc::new(RefCell::new(WorkerLoop {
        scope: scope.clone(),
        sim: Simulation::new(seed()),
        surface: None,
        timer: None,
        step: None,
    }));

    let weak: Weak<RefCell<WorkerLoop>> = Rc::downgrade(&state);
    let step = Closure::<dyn FnMut()>::new(move || {
        if let Some(state) = weak.upgrade() {
            state.borrow_mut().step();
        }
    });
    state.borrow_mut().step = Some(step);

    let receive = {
        let state = state.clone();
        move |data: JsValue| {
            if let Err(e) = state.borrow_mut().receive(&data) {
                log::warn!("worker ignored message: {e}");
            }
        }
    };

    if let Some(backlog) = backlog {
        for event in backlog.iter() {
            let data = event
                .dyn_ref::<MessageEvent>()
                .map(|e| e.data())
                .unwrap_or(event);
            receive(data);
        }
    }

    // The worker lives as long as the page keeps it, so the handler is leaked
    let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| receive(event.data()));
    scope.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    log::info!("fireworks worker ready");
    Ok(())
}
