//! Wandering ships and their evasive AI

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;

use super::color::Color;
use crate::consts::*;
use crate::{rand_f32, rand_usize};

#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Facing angle, follows the velocity
    pub rotation: f32,
    pub color: Color,
    pub can_evade: bool,
    /// No evasion is considered before this timestamp (ms)
    pub evade_until: f64,
    /// Spawn distance outside the viewport; removal happens at twice this
    pub margin: f32,
}

impl Ship {
    /// Spawn just outside a random edge, heading for a random interior point
    pub fn spawn(bounds: Vec2, rng: &mut impl Rng) -> Self {
        let size = rand_f32(rng, SHIP_SIZE.0, SHIP_SIZE.1);
        let margin = size * 2.0;

        let target_x = rand_f32(rng, bounds.x * 0.1, bounds.x * 0.9);
        let mut target_y = rand_f32(rng, bounds.y * 0.1, bounds.y * 0.9);

        let pos = match rand_usize(rng, 0, 4) {
            0 => Vec2::new(-margin, rand_f32(rng, 0.0, bounds.y)),
            1 => Vec2::new(bounds.x + margin, rand_f32(rng, 0.0, bounds.y)),
            2 => Vec2::new(rand_f32(rng, 0.0, bounds.x), -margin),
            _ => Vec2::new(rand_f32(rng, 0.0, bounds.x), bounds.y + margin),
        };

        // Avoid flat crossings hugging the entry edge's height
        if (target_y - pos.y).abs() < bounds.y * 0.2 {
            let sign = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
            target_y = (target_y + sign * bounds.y * 0.3).clamp(0.0, bounds.y);
        }

        let heading = (target_y - pos.y).atan2(target_x - pos.x);
        let speed = rand_f32(rng, SHIP_SPEED.0, SHIP_SPEED.1);
        let hue = rand_usize(rng, 180, 260) as u16;

        Self {
            pos,
            vel: Vec2::from_angle(heading) * speed,
            size,
            rotation: heading,
            color: Color::hsl(hue, 90, 70),
            can_evade: rng.random_bool(SHIP_EVADE_CHANCE),
            evade_until: 0.0,
            margin,
        }
    }

    /// Move by `dt` reference frames; `false` once it has drifted out of play
    pub fn update(&mut self, bounds: Vec2, dt: f32) -> bool {
        self.pos += self.vel * dt;
        self.rotation = self.vel.y.atan2(self.vel.x);

        let limit = self.margin * 2.0;
        self.pos.x >= -limit
            && self.pos.x <= bounds.x + limit
            && self.pos.y >= -limit
            && self.pos.y <= bounds.y + limit
    }

    /// Fireworks closer than this destroy the ship
    #[inline]
    pub fn hit_radius(&self) -> f32 {
        self.size * SHIP_HIT_RADIUS_PER_SIZE
    }

    /// Dodge the nearest threat if it is close and the cooldown has elapsed.
    /// Returns whether the heading changed.
    pub fn evade(&mut self, threats: &[Vec2], now: f64, rng: &mut impl Rng) -> bool {
        if !self.can_evade || threats.is_empty() || now < self.evade_until {
            return false;
        }

        let Some(nearest) = threats.iter().copied().min_by(|a, b| {
            a.distance_squared(self.pos)
                .total_cmp(&b.distance_squared(self.pos))
        }) else {
            return false;
        };
        if nearest.distance_squared(self.pos) > SHIP_EVADE_DISTANCE * SHIP_EVADE_DISTANCE {
            return false;
        }

        let away = self.pos - nearest;
        let away_angle = away.y.atan2(away.x);
        let dodge = away_angle + if rng.random_bool(0.5) { FRAC_PI_2 } else { -FRAC_PI_2 };

        let boosted = (self.vel.length() * SHIP_EVADE_BOOST).min(SHIP_MAX_SPEED);
        self.vel = Vec2::from_angle(dodge) * boosted;
        self.evade_until = now + SHIP_EVADE_COOLDOWN_MS;
        true
    }
}
