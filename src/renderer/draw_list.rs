//! Recording surface for tests and headless runs

use glam::Vec2;

use super::shapes::firework_polyline;
use super::{ParticleShape, Surface, Viewport};
use crate::sim::{Firework, Particle, Ship};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Ship { pos: Vec2, rotation: f32 },
    Firework { head: Vec2, points: usize },
    Particle { pos: Vec2, alpha: f32, shape: ParticleShape },
}

/// Keeps the commands of the most recent frame plus running totals
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub viewport: Viewport,
    pub frames: u64,
    pub commands: Vec<DrawCommand>,
    pub total_commands: u64,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ships(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Ship { .. }))
    }

    pub fn fireworks(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Firework { .. }))
    }

    pub fn particles(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Particle { .. }))
    }

    fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    fn record(&mut self, command: DrawCommand) {
        self.commands.push(command);
        self.total_commands += 1;
    }
}

impl Surface for DrawList {
    fn resize(&mut self, viewport: &Viewport) {
        self.viewport = *viewport;
    }

    fn clear(&mut self, _width: f32, _height: f32) {
        self.commands.clear();
        self.frames += 1;
    }

    fn draw_ship(&mut self, ship: &Ship) {
        self.record(DrawCommand::Ship {
            pos: ship.pos,
            rotation: ship.rotation,
        });
    }

    fn draw_firework(&mut self, firework: &Firework) {
        self.record(DrawCommand::Firework {
            head: firework.pos,
            points: firework_polyline(firework).count(),
        });
    }

    fn draw_particle(&mut self, particle: &Particle, shape: ParticleShape) {
        self.record(DrawCommand::Particle {
            pos: particle.pos,
            alpha: particle.alpha,
            shape,
        });
    }
}
