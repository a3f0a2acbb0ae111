//! Message delivery
//!
//! Host event handlers only ever build a [`Message`] and post it. Whether it
//! is applied on this thread or forwarded to a worker is up to the transport.

use std::collections::VecDeque;

use super::PlatformError;
use super::protocol::{Effect, Message, dispatch};
use crate::sim::Simulation;

pub trait Transport {
    /// Deliver one message, in order with every earlier one
    fn post(&mut self, message: Message) -> Result<(), PlatformError>;

    /// Tear down the receiving side; later posts fail with `Closed`
    fn close(&mut self);
}

/// In-memory queue, drained into a simulation on demand.
/// Drives the core without a browser (headless runs and tests).
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<Message>,
    closed: bool,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Apply every queued message in order, returning their effects
    pub fn deliver(&mut self, sim: &mut Simulation, now: f64) -> Vec<Effect> {
        self.queue
            .drain(..)
            .map(|message| dispatch(sim, message, now))
            .collect()
    }
}

impl Transport for Outbox {
    fn post(&mut self, message: Message) -> Result<(), PlatformError> {
        if self.closed {
            return Err(PlatformError::Closed);
        }
        self.queue.push_back(message);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigPatch};
    use crate::renderer::Viewport;

    #[test]
    fn test_messages_apply_in_order() {
        let mut outbox = Outbox::new();
        let mut sim = Simulation::new(8);
        let vp = Viewport::new(800.0, 600.0, 1.0);
        outbox.post(Message::init(vp, Config::default())).unwrap();
        outbox
            .post(Message::Config {
                config: ConfigPatch {
                    max_ships: Some(2),
                    ..ConfigPatch::default()
                },
            })
            .unwrap();
        outbox.post(Message::Pointer { x: 100.0, y: 100.0 }).unwrap();
        assert_eq!(outbox.len(), 3);

        let effects = outbox.deliver(&mut sim, 0.0);
        assert_eq!(effects, vec![Effect::Bind(vp), Effect::Nothing, Effect::Nothing]);
        assert!(outbox.is_empty());
        assert_eq!(sim.config().max_ships, 2);
        assert_eq!(sim.counts().fireworks, 1);
    }

    #[test]
    fn test_post_after_close_fails() {
        let mut outbox = Outbox::new();
        outbox.post(Message::Visibility { hidden: true }).unwrap();
        outbox.close();
        assert!(outbox.is_empty());
        assert!(matches!(
            outbox.post(Message::Visibility { hidden: false }),
            Err(PlatformError::Closed)
        ));
    }
}
