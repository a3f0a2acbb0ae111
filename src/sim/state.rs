//! World state owned by one simulation instance
//!
//! Every live entity, the particle pool and the RNG live here so the whole
//! scene can be cleared or reseeded in one place.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::color::{Color, Palette};
use super::firework::Firework;
use super::particle::{Burst, Particle};
use super::pool::Pool;
use super::ship::Ship;
use crate::config::{Config, Range};
use crate::consts::*;
use crate::rand_usize;

/// Live entity counts, for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub particles: usize,
    pub fireworks: usize,
    pub ships: usize,
    pub pooled: usize,
}

#[derive(Debug, Clone)]
pub struct World {
    /// Logical viewport size
    pub bounds: Vec2,
    pub config: Config,
    pub palette: Palette,
    pub particles: Vec<Particle>,
    pub fireworks: Vec<Firework>,
    pub ships: Vec<Ship>,
    pub pool: Pool<Particle>,
    /// Firework positions for this frame; reused to avoid allocating
    pub threats: Vec<Vec2>,
    pub rng: Pcg32,
    /// Time of the last accepted pointer spawn (ms)
    pub last_pointer_spawn: Option<f64>,
    next_born: u64,
}

impl World {
    pub fn new(seed: u64, config: Config, bounds: Vec2) -> Self {
        Self {
            bounds,
            palette: Palette::from_choice(config.color.as_ref()),
            config,
            particles: Vec::new(),
            fireworks: Vec::new(),
            ships: Vec::new(),
            pool: Pool::with_retain(POOL_RETAIN),
            threats: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            last_pointer_spawn: None,
            next_born: 0,
        }
    }

    /// Swap in a new configuration, rebuilding the palette. Ships above a
    /// lowered maximum are dropped.
    pub fn set_config(&mut self, config: Config) {
        self.palette = Palette::from_choice(config.color.as_ref());
        if self.ships.len() > config.max_ships {
            log::debug!("dropping {} ships above the new maximum", self.ships.len() - config.max_ships);
            self.ships.truncate(config.max_ships);
        }
        self.config = config;
    }

    /// Next birth sequence number
    pub fn next_born(&mut self) -> u64 {
        let born = self.next_born;
        self.next_born += 1;
        born
    }

    pub fn counts(&self) -> Counts {
        Counts {
            particles: self.particles.len(),
            fireworks: self.fireworks.len(),
            ships: self.ships.len(),
            pooled: self.pool.idle(),
        }
    }

    /// Spawn a burst, truncated to the particle cap. Returns how many were created.
    pub fn add_explosion_particles(&mut self, burst: &Burst) -> usize {
        emit_burst(&mut self.particles, &mut self.pool, &mut self.rng, burst)
    }

    /// Small debris burst where a ship was destroyed
    pub fn spawn_hit_effect(&mut self, at: Vec2) -> usize {
        let burst = hit_burst(at, &mut self.rng);
        self.add_explosion_particles(&burst)
    }

    /// Drop every live entity; particles go back to the pool
    pub fn clear(&mut self) {
        for particle in self.particles.drain(..) {
            self.pool.release(particle);
        }
        self.fireworks.clear();
        self.ships.clear();
        self.threats.clear();
        self.last_pointer_spawn = None;
    }

    /// Clear and also drop the pooled records
    pub fn release_all(&mut self) {
        self.clear();
        self.pool.clear();
    }
}

pub(crate) fn hit_burst(at: Vec2, rng: &mut Pcg32) -> Burst {
    Burst {
        origin: at,
        color: Color::new(HIT_COLOR),
        count: rand_usize(rng, HIT_PARTICLES.0, HIT_PARTICLES.1),
        speed: Range::span(HIT_SPEED.0, HIT_SPEED.1),
        size: Range::span(HIT_SIZE.0, HIT_SIZE.1),
    }
}

/// Field-level version of [`World::add_explosion_particles`] for callers that
/// already hold a borrow of the firework list.
pub(crate) fn emit_burst(
    particles: &mut Vec<Particle>,
    pool: &mut Pool<Particle>,
    rng: &mut Pcg32,
    burst: &Burst,
) -> usize {
    let room = MAX_PARTICLES.saturating_sub(particles.len());
    let count = burst.count.min(room);
    particles.reserve(count);
    for _ in 0..count {
        let mut particle = pool.acquire();
        burst.emit(&mut particle, rng);
        particles.push(particle);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world() -> World {
        World::new(7, Config::default(), Vec2::new(800.0, 600.0))
    }

    fn burst(count: usize) -> Burst {
        Burst {
            origin: Vec2::new(100.0, 100.0),
            color: Color::new("gold"),
            count,
            speed: Range::span(5.0, 10.0),
            size: Range::span(1.0, 5.0),
        }
    }

    #[test]
    fn test_explosion_truncated_at_cap() {
        let mut world = world();
        assert_eq!(world.add_explosion_particles(&burst(MAX_PARTICLES - 10)), MAX_PARTICLES - 10);
        assert_eq!(world.add_explosion_particles(&burst(100)), 10);
        assert_eq!(world.add_explosion_particles(&burst(100)), 0);
        assert_eq!(world.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_clear_returns_particles_to_pool() {
        let mut world = world();
        world.add_explosion_particles(&burst(120));
        world.clear();
        assert_eq!(world.counts().particles, 0);
        assert_eq!(world.pool.idle(), 120);

        // Recycled records are handed out again
        world.add_explosion_particles(&burst(20));
        assert_eq!(world.pool.idle(), 100);
    }

    #[test]
    fn test_hit_effect_uses_hit_color() {
        let mut world = world();
        let n = world.spawn_hit_effect(Vec2::new(50.0, 50.0));
        assert!((HIT_PARTICLES.0..HIT_PARTICLES.1).contains(&n));
        assert!(world.particles.iter().all(|p| p.color.as_str() == HIT_COLOR));
        assert!(world.particles.iter().all(|p| p.size >= HIT_SIZE.0 && p.size < HIT_SIZE.1));
    }

    #[test]
    fn test_lowering_max_ships_drops_extra_ships() {
        let mut world = world();
        while crate::sim::spawn::spawn_ship(&mut world) {}
        assert_eq!(world.ships.len(), world.config.max_ships);

        let mut config = world.config.clone();
        config.max_ships = 2;
        world.set_config(config);
        assert_eq!(world.ships.len(), 2);
    }

    #[test]
    fn test_born_is_monotonic() {
        let mut world = world();
        let a = world.next_born();
        let b = world.next_born();
        assert!(b > a);
    }

    proptest! {
        #[test]
        fn prop_created_is_min_of_requested_and_room(live in 0usize..=MAX_PARTICLES, requested in 0usize..400) {
            let mut world = world();
            world.add_explosion_particles(&burst(live));
            let created = world.add_explosion_particles(&burst(requested));
            prop_assert_eq!(created, requested.min(MAX_PARTICLES - live));
            prop_assert!(world.particles.len() <= MAX_PARTICLES);
        }
    }
}
