//! Platform layer
//!
//! Everything between the host page and the simulation core:
//! - `gate`: whether the animation may run (reduced motion, page and viewport visibility)
//! - `strategy`: inline vs. worker execution, picked once at mount
//! - `protocol`: messages carrying host events to the simulation
//! - `transport`: delivers those messages, in-process or to a worker
//! - `web`: browser bindings (wasm32 only)

pub mod gate;
pub mod protocol;
pub mod strategy;
pub mod transport;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use gate::Gate;
pub use protocol::{Effect, Message, ProtocolError, dispatch};
pub use strategy::{Capabilities, Strategy};
pub use transport::{Outbox, Transport};

use std::fmt;

/// Failures talking to the host environment
#[derive(Debug)]
pub enum PlatformError {
    /// A browser API the caller relied on is missing
    Unsupported(&'static str),
    /// A browser call threw
    Js(String),
    /// The canvas has no 2D context
    ContextUnavailable,
    Protocol(ProtocolError),
    /// The transport was closed before the message was sent
    Closed,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
            Self::Js(msg) => write!(f, "browser error: {msg}"),
            Self::ContextUnavailable => write!(f, "2d context unavailable"),
            Self::Protocol(e) => write!(f, "{e}"),
            Self::Closed => write!(f, "transport closed"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProtocolError> for PlatformError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for PlatformError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
