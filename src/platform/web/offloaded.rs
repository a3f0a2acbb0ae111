//! Offloaded strategy: the canvas is transferred to a dedicated worker which
//! owns the simulation; the page only forwards messages

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, OffscreenCanvas, Worker, WorkerOptions, WorkerType};

use super::dom;
use crate::platform::protocol::Message;
use crate::platform::{PlatformError, Transport};

/// Envelope keys shared with the worker side
pub(crate) const ENVELOPE_JSON: &str = "json";
pub(crate) const ENVELOPE_CANVAS: &str = "canvas";

pub(crate) fn envelope(message: &Message, canvas: Option<&OffscreenCanvas>) -> Result<js_sys::Object, PlatformError> {
    let json = message.to_json()?;
    let envelope = js_sys::Object::new();
    js_sys::Reflect::set(&envelope, &ENVELOPE_JSON.into(), &json.into())?;
    if let Some(canvas) = canvas {
        js_sys::Reflect::set(&envelope, &ENVELOPE_CANVAS.into(), canvas)?;
    }
    Ok(envelope)
}

pub struct WorkerTransport {
    worker: Option<Worker>,
}

impl WorkerTransport {
    /// Start the worker script, hand it the canvas and send `init`.
    ///
    /// The worker is created before the canvas is transferred, so a failure
    /// to start it leaves the canvas usable on the main thread.
    pub fn spawn(script_url: &str, canvas: &HtmlCanvasElement, init: &Message) -> Result<Self, PlatformError> {
        let options = WorkerOptions::new();
        options.set_type(WorkerType::Module);
        let worker = Worker::new_with_options(script_url, &options)?;

        let offscreen = match canvas.transfer_control_to_offscreen() {
            Ok(offscreen) => offscreen,
            Err(e) => {
                worker.terminate();
                return Err(e.into());
            }
        };
        dom::mark_transferred(canvas);

        let transfer = js_sys::Array::of1(&offscreen);
        worker.post_message_with_transfer(&envelope(init, Some(&offscreen))?, &transfer)?;
        log::info!("canvas transferred to worker {script_url}");
        Ok(Self { worker: Some(worker) })
    }
}

impl Transport for WorkerTransport {
    fn post(&mut self, message: Message) -> Result<(), PlatformError> {
        let worker = self.worker.as_ref().ok_or(PlatformError::Closed)?;
        worker.post_message(&envelope(&message, None)?)?;
        Ok(())
    }

    /// Terminates on a zero-delay timer so messages posted during teardown
    /// are not cut off mid-flight
    fn close(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let handle = worker.clone();
        let terminate = Closure::once_into_js(move || worker.terminate());
        let scheduled = dom::window().and_then(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(terminate.unchecked_ref(), 0)
                .map_err(PlatformError::from)
        });
        if let Err(e) = scheduled {
            log::warn!("deferred worker shutdown failed ({e}), terminating now");
            handle.terminate();
        }
    }
}

impl Drop for WorkerTransport {
    fn drop(&mut self) {
        self.close();
    }
}
