//! Explosion particles

use glam::Vec2;
use rand::Rng;

use super::color::Color;
use crate::config::Range;
use crate::consts::{PARTICLE_DECAY, PARTICLE_FRICTION, PARTICLE_GRAVITY};
use crate::rand_f32;

/// A single spark. Plain data so it can be recycled through the pool.
#[derive(Debug, Clone, Default)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub gravity: f32,
    pub friction: f32,
    pub size: f32,
    /// 1 when spawned, dead at or below 0
    pub alpha: f32,
    pub decay: f32,
}

impl Particle {
    /// Reinitialize a (possibly recycled) record as a fresh spark
    pub fn reset(
        &mut self,
        origin: Vec2,
        color: Color,
        speed: f32,
        direction: f32,
        size: f32,
        decay: f32,
    ) {
        self.pos = origin;
        self.vel = Vec2::new(direction.cos(), direction.sin()) * speed;
        self.color = color;
        self.gravity = PARTICLE_GRAVITY;
        self.friction = PARTICLE_FRICTION;
        self.size = size;
        self.alpha = 1.0;
        self.decay = decay;
    }

    /// Advance by `dt` reference frames
    pub fn update(&mut self, dt: f32) {
        self.vel.x *= self.friction;
        self.vel.y = self.vel.y * self.friction + self.gravity * dt;
        self.pos += self.vel * dt;
        self.alpha -= self.decay * dt;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

/// A request for a burst of particles
#[derive(Debug, Clone)]
pub struct Burst {
    pub origin: Vec2,
    pub color: Color,
    pub count: usize,
    pub speed: Range,
    pub size: Range,
}

impl Burst {
    /// Initialize `particle` as one spark of this burst
    pub fn emit(&self, particle: &mut Particle, rng: &mut impl Rng) {
        let direction = rand_f32(rng, 0.0, std::f32::consts::TAU);
        let speed = self.speed.sample(rng);
        let size = self.size.sample(rng);
        let decay = rand_f32(rng, PARTICLE_DECAY.0, PARTICLE_DECAY.1);
        particle.reset(
            self.origin,
            self.color.clone(),
            speed,
            direction,
            size,
            decay,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spark() -> Particle {
        let mut p = Particle::default();
        p.reset(Vec2::new(10.0, 10.0), Color::new("red"), 5.0, 0.0, 2.0, 0.25);
        p
    }

    #[test]
    fn test_reset_points_along_direction() {
        let p = spark();
        assert!((p.vel.x - 5.0).abs() < 1e-5);
        assert!(p.vel.y.abs() < 1e-5);
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.friction, PARTICLE_FRICTION);
    }

    #[test]
    fn test_update_applies_drag_and_gravity() {
        let mut p = spark();
        p.update(1.0);
        assert!((p.vel.x - 5.0 * PARTICLE_FRICTION).abs() < 1e-5);
        assert!((p.vel.y - PARTICLE_GRAVITY).abs() < 1e-6);
        assert!(p.pos.x > 10.0);
        assert!((p.alpha - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_fades_out() {
        let mut p = spark();
        for _ in 0..4 {
            p.update(1.0);
        }
        assert!(!p.is_alive());
    }
}
