//! Fireworks Background - animated fireworks, ships and explosions
//!
//! Core modules:
//! - `sim`: Simulation core (entities, ballistic solver, scheduler, frame pacing)
//! - `renderer`: Drawing surface abstraction and canvas backends
//! - `platform`: Visibility gate, execution strategies, worker message protocol
//! - `config`: Host-supplied configuration and presets

pub mod config;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use config::{ColorChoice, Config, ConfigPatch, Range, Theme};
pub use renderer::{ParticleShape, Surface, Viewport};
pub use sim::Simulation;

use rand::Rng;

/// Simulation constants
pub mod consts {
    /// Reference frame length the physics constants were tuned for (60 Hz)
    pub const REFERENCE_FRAME_MS: f64 = 16.67;
    /// Upper bound on the normalized delta factor
    pub const MAX_DT: f32 = 1.2;
    /// Worker timer interval when frame pacing is disabled
    pub const UNTHROTTLED_TIMER_MS: f64 = 16.0;

    /// Gravity applied to fireworks (px/tick²)
    pub const FIREWORK_GRAVITY: f32 = 0.02;
    /// Gravity applied to explosion particles
    pub const PARTICLE_GRAVITY: f32 = 0.01;
    /// Per-tick velocity retention for explosion particles
    pub const PARTICLE_FRICTION: f32 = 0.98;
    /// Alpha decay per tick, sampled per particle
    pub const PARTICLE_DECAY: (f32, f32) = (0.006, 0.02);

    /// Hard cap on live particles
    pub const MAX_PARTICLES: usize = 1400;
    /// Released particle records the pool keeps around
    pub const POOL_RETAIN: usize = MAX_PARTICLES * 2;
    /// Hard cap on live fireworks
    pub const MAX_FIREWORKS: usize = 16;
    /// Scheduled launches are skipped at or above this many live fireworks
    pub const MAX_LAUNCHED_FIREWORKS: usize = 10;
    /// Live pointer-spawned fireworks before the oldest is evicted
    pub const MAX_POINTER_FIREWORKS: usize = 8;
    /// Minimum time between two pointer spawns
    pub const POINTER_SPAWN_COOLDOWN_MS: f64 = 40.0;
    /// Pointer fireworks fly faster than the solver's preferred speed
    pub const POINTER_SPEED_MULTIPLIER: f32 = 3.0;

    /// Particles per explosion, [min, max)
    pub const BURST_PARTICLES: (usize, usize) = (50, 140);
    /// Particles per ship hit effect, [min, max)
    pub const HIT_PARTICLES: (usize, usize) = (8, 14);
    /// Hit effect color
    pub const HIT_COLOR: &str = "hsl(10, 90%, 60%)";
    /// Hit effect particle speed and size
    pub const HIT_SPEED: (f32, f32) = (0.8, 2.5);
    pub const HIT_SIZE: (f32, f32) = (0.8, 1.6);
    /// Trail capacity per firework, [min, max)
    pub const TRAIL_LENGTH: (usize, usize) = (10, 22);
    /// Aimed fireworks are discarded this far outside the viewport
    pub const FIREWORK_OFFSCREEN_MARGIN: f32 = 60.0;
    /// Minimum radius around an aimed firework's target that counts as arrival
    pub const AIMED_MIN_RADIUS: f32 = 6.0;
    /// Arrival radius per unit of firework size
    pub const AIMED_RADIUS_PER_SIZE: f32 = 2.4;
    /// Unaimed launches deviate from straight up by at most this (radians)
    pub const LAUNCH_SPREAD: f32 = 0.3;

    /// Solver flight durations, in ticks
    pub const SOLVER_MIN_TICKS: u32 = 10;
    pub const SOLVER_MAX_TICKS: u32 = 120;
    /// Score bonus for candidates inside the permissible speed range
    pub const SOLVER_IN_RANGE_BONUS: f32 = 1000.0;
    /// Slowest launch speed a configuration may ask for (px/tick)
    pub const MIN_LAUNCH_SPEED: f32 = 0.5;

    /// Firework launch interval before population scaling, [min, max) ms
    pub const FIREWORK_INTERVAL_MS: (f32, f32) = (220.0, 550.0);
    /// Random picks when looking for a visible ship to target
    pub const SHIP_TARGET_TRIES: usize = 6;

    /// Ship size range, [min, max)
    pub const SHIP_SIZE: (f32, f32) = (10.0, 18.0);
    /// Ship cruise speed range, [min, max)
    pub const SHIP_SPEED: (f32, f32) = (0.8, 2.1);
    /// Probability that a ship can dodge
    pub const SHIP_EVADE_CHANCE: f64 = 0.8;
    /// Threats closer than this trigger a dodge
    pub const SHIP_EVADE_DISTANCE: f32 = 120.0;
    /// Time after a dodge before the next one is considered
    pub const SHIP_EVADE_COOLDOWN_MS: f64 = 120.0;
    /// Speed multiplier while dodging
    pub const SHIP_EVADE_BOOST: f32 = 1.6;
    /// Absolute speed ceiling while dodging
    pub const SHIP_MAX_SPEED: f32 = SHIP_SPEED.1 * SHIP_EVADE_BOOST;
    /// Firework-to-ship hit radius per unit of ship size
    pub const SHIP_HIT_RADIUS_PER_SIZE: f32 = 2.3;
}

/// Uniform sample in `[min, max)`; collapses to `min` for empty ranges
#[inline]
pub fn rand_f32(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Uniform integer in `[min, max)`; collapses to `min` for empty ranges
#[inline]
pub fn rand_usize(rng: &mut impl Rng, min: usize, max: usize) -> usize {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Swap-remove that tolerates out-of-range indices
#[inline]
pub fn remove_at_swap<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.swap_remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_rand_f32_empty_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(rand_f32(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(rand_f32(&mut rng, 5.0, 2.0), 5.0);
        let v = rand_f32(&mut rng, 1.0, 2.0);
        assert!((1.0..2.0).contains(&v));
    }

    #[test]
    fn test_remove_at_swap() {
        let mut items = vec![1, 2, 3, 4];
        assert_eq!(remove_at_swap(&mut items, 0), Some(1));
        assert_eq!(items, vec![4, 2, 3]);
        assert_eq!(remove_at_swap(&mut items, 9), None);
        assert_eq!(items.len(), 3);
    }
}
