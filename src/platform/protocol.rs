//! Messages from the host page to the simulation
//!
//! JSON objects tagged by a lowercase `type`. In the worker strategy they
//! travel inside an envelope `{ json, canvas? }` so the transferred canvas
//! rides alongside the `init` message.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigPatch};
use crate::renderer::Viewport;
use crate::sim::Simulation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Bind the surface and start
    Init {
        width: f32,
        height: f32,
        dpr: f32,
        #[serde(default)]
        config: Config,
    },
    /// New container size; entities are kept
    Resize { width: f32, height: f32, dpr: f32 },
    /// Pointer or touch at surface-local coordinates
    Pointer { x: f32, y: f32 },
    Visibility { hidden: bool },
    /// Partial configuration update
    Config { config: ConfigPatch },
}

impl Message {
    pub fn init(viewport: Viewport, config: Config) -> Self {
        Message::Init {
            width: viewport.width,
            height: viewport.height,
            dpr: viewport.dpr,
            config,
        }
    }

    pub fn resize(viewport: Viewport) -> Self {
        Message::Resize {
            width: viewport.width,
            height: viewport.height,
            dpr: viewport.dpr,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(ProtocolError::Decode)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::Init { .. } => "init",
            Message::Resize { .. } => "resize",
            Message::Pointer { .. } => "pointer",
            Message::Visibility { .. } => "visibility",
            Message::Config { .. } => "config",
        }
    }
}

/// What the driver has to do after a message was applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Nothing,
    /// Size the surface and start driving ticks
    Bind(Viewport),
    /// Size the surface
    Resize(Viewport),
    /// Start driving ticks again
    Resume,
    /// Stop driving ticks and blank the surface
    Suspend,
}

/// Apply a message to the simulation
pub fn dispatch(sim: &mut Simulation, message: Message, now: f64) -> Effect {
    match message {
        Message::Init {
            width,
            height,
            dpr,
            config,
        } => {
            let viewport = Viewport::new(width, height, dpr);
            sim.init(viewport, config, now);
            Effect::Bind(viewport)
        }
        Message::Resize { width, height, dpr } => {
            let viewport = Viewport::new(width, height, dpr);
            sim.resize(viewport);
            Effect::Resize(viewport)
        }
        Message::Pointer { x, y } => {
            sim.pointer_event(x, y, now);
            Effect::Nothing
        }
        Message::Visibility { hidden } => {
            let was_running = sim.is_running();
            sim.set_visible(!hidden, now);
            match (was_running, sim.is_running()) {
                (true, false) => Effect::Suspend,
                (false, true) => Effect::Resume,
                _ => Effect::Nothing,
            }
        }
        Message::Config { config } => {
            sim.update_config(config, now);
            Effect::Nothing
        }
    }
}

#[derive(Debug)]
pub enum ProtocolError {
    Decode(serde_json::Error),
    Encode(serde_json::Error),
    /// Envelope without a JSON payload
    MissingPayload,
    /// `init` arrived without a canvas to draw on
    MissingCanvas,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "malformed message: {e}"),
            Self::Encode(e) => write!(f, "cannot encode message: {e}"),
            Self::MissingPayload => write!(f, "message envelope has no payload"),
            Self::MissingCanvas => write!(f, "init message without canvas"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) | Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Range;

    #[test]
    fn test_decode_host_messages() {
        let msg = Message::from_json(r#"{"type":"pointer","x":12.5,"y":40}"#).unwrap();
        assert_eq!(msg, Message::Pointer { x: 12.5, y: 40.0 });

        let msg = Message::from_json(r#"{"type":"visibility","hidden":true}"#).unwrap();
        assert_eq!(msg, Message::Visibility { hidden: true });

        let msg = Message::from_json(r#"{"type":"config","config":{"maxShips":4,"fireworkSpeed":12}}"#).unwrap();
        let Message::Config { config } = msg else {
            panic!("expected config");
        };
        assert_eq!(config.max_ships, Some(4));
        assert_eq!(config.firework_speed, Some(Range::Fixed(12.0)));
        assert_eq!(config.population, None);
    }

    #[test]
    fn test_init_without_config_uses_defaults() {
        let msg = Message::from_json(r#"{"type":"init","width":800,"height":600,"dpr":2}"#).unwrap();
        assert_eq!(msg, Message::init(Viewport::new(800.0, 600.0, 2.0), Config::default()));
    }

    #[test]
    fn test_encoded_tag_is_lowercase() {
        let json = Message::resize(Viewport::new(10.0, 20.0, 1.0)).to_json().unwrap();
        assert!(json.contains(r#""type":"resize""#), "{json}");
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(matches!(
            Message::from_json(r#"{"type":"explode"}"#),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn test_dispatch_effects() {
        let mut sim = Simulation::new(3);
        let vp = Viewport::new(640.0, 480.0, 1.0);
        assert_eq!(dispatch(&mut sim, Message::init(vp, Config::default()), 0.0), Effect::Bind(vp));
        assert!(sim.is_running());

        assert_eq!(
            dispatch(&mut sim, Message::Visibility { hidden: true }, 10.0),
            Effect::Suspend
        );
        assert_eq!(
            dispatch(&mut sim, Message::Visibility { hidden: true }, 20.0),
            Effect::Nothing
        );
        assert_eq!(
            dispatch(&mut sim, Message::Visibility { hidden: false }, 30.0),
            Effect::Resume
        );

        let vp2 = Viewport::new(320.0, 240.0, 2.0);
        assert_eq!(dispatch(&mut sim, Message::resize(vp2), 40.0), Effect::Resize(vp2));
        assert_eq!(sim.viewport(), vp2);
    }

    #[test]
    fn test_pointer_before_init_is_ignored() {
        let mut sim = Simulation::new(3);
        assert_eq!(dispatch(&mut sim, Message::Pointer { x: 1.0, y: 1.0 }, 0.0), Effect::Nothing);
        assert_eq!(sim.counts().fireworks, 0);
    }
}
