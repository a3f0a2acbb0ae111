//! Spawning: scheduled launches, ships and pointer fireworks
//!
//! The repeating timers are deadlines polled by the driver rather than host
//! callbacks, so both execution strategies schedule the same way.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use super::ballistic::solve_launch_velocity;
use super::firework::{Firework, Launch};
use super::ship::Ship;
use super::state::World;
use crate::consts::*;
use crate::{rand_f32, rand_usize};

/// One-shot deadline, re-armed by its owner each time it fires
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RepeatingTimer {
    due: Option<f64>,
}

impl RepeatingTimer {
    pub fn arm(&mut self, now: f64, delay_ms: f64) {
        self.due = Some(now + delay_ms.max(0.0));
    }

    pub fn stop(&mut self) {
        self.due = None;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<f64> {
        self.due
    }

    /// Disarm and report `true` if the deadline has passed
    pub fn take_due(&mut self, now: f64) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Firework and ship timers
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pub fireworks: RepeatingTimer,
    pub ships: RepeatingTimer,
}

/// Delay until the next scheduled launch; `None` when launches are disabled
pub fn firework_delay(world: &mut World) -> Option<f64> {
    let population = world.config.population;
    if population <= 0.0 {
        return None;
    }
    let base = rand_f32(&mut world.rng, FIREWORK_INTERVAL_MS.0, FIREWORK_INTERVAL_MS.1);
    Some((base / population) as f64)
}

pub fn ship_delay(world: &mut World) -> f64 {
    world.config.ship_spawn_interval.sample(&mut world.rng) as f64
}

impl Scheduler {
    /// Arm whichever timers are not already running
    pub fn start(&mut self, world: &mut World, now: f64) {
        if !self.fireworks.is_armed() {
            match firework_delay(world) {
                Some(delay) => self.fireworks.arm(now, delay),
                None => log::debug!("population {} disables launches", world.config.population),
            }
        } else if world.config.population <= 0.0 {
            self.fireworks.stop();
        }
        if !self.ships.is_armed() {
            self.ships.arm(now, ship_delay(world));
        }
    }

    pub fn stop(&mut self) {
        self.fireworks.stop();
        self.ships.stop();
    }

    pub fn is_running(&self) -> bool {
        self.fireworks.is_armed() || self.ships.is_armed()
    }

    /// Fire every timer whose deadline has passed, at most once each
    pub fn run_due(&mut self, world: &mut World, now: f64) {
        if self.fireworks.take_due(now) {
            launch_firework(world);
            if let Some(delay) = firework_delay(world) {
                self.fireworks.arm(now, delay);
            }
        }
        if self.ships.take_due(now) {
            spawn_ship(world);
            self.ships.arm(now, ship_delay(world));
        }
    }
}

/// A random live ship inside the viewport, if one turns up within a few picks
fn visible_ship_target(world: &mut World) -> Option<Vec2> {
    if world.ships.is_empty() {
        return None;
    }
    let bounds = world.bounds;
    for _ in 0..SHIP_TARGET_TRIES {
        let ship = &world.ships[rand_usize(&mut world.rng, 0, world.ships.len())];
        let p = ship.pos;
        if p.x >= 0.0 && p.x <= bounds.x && p.y >= 0.0 && p.y <= bounds.y {
            return Some(p);
        }
    }
    None
}

fn launch_params(world: &mut World, start: Vec2, velocity: Vec2) -> Launch {
    let size = world.config.firework_size.sample(&mut world.rng);
    let color = world.palette.pick(&mut world.rng);
    Launch {
        start,
        velocity,
        size,
        color,
        particle_speed: world.config.particle_speed,
        particle_size: world.config.particle_size,
        born: world.next_born(),
    }
}

fn bottom_launch_point(world: &mut World) -> Vec2 {
    let b = world.bounds;
    Vec2::new(rand_f32(&mut world.rng, b.x * 0.1, b.x * 0.9), b.y)
}

/// Scheduled launch from the bottom edge. Aims at a visible ship when one is
/// found, otherwise flies a ballistic arc. Returns whether anything launched.
pub fn launch_firework(world: &mut World) -> bool {
    if world.fireworks.len() >= MAX_LAUNCHED_FIREWORKS {
        log::debug!("launch skipped, {} fireworks live", world.fireworks.len());
        return false;
    }

    let start = bottom_launch_point(world);
    let firework = match visible_ship_target(world) {
        Some(target) => {
            let velocity = solve_launch_velocity(start, target, world.config.firework_speed, FIREWORK_GRAVITY);
            let launch = launch_params(world, start, velocity);
            Firework::aimed(launch, target, false, &mut world.rng)
        }
        None => {
            let heading = -FRAC_PI_2 + rand_f32(&mut world.rng, -LAUNCH_SPREAD, LAUNCH_SPREAD);
            let speed = world.config.firework_speed.sample(&mut world.rng);
            let h = world.bounds.y;
            let target_y = rand_f32(&mut world.rng, h * 0.1, h * 0.4);
            let launch = launch_params(world, start, Vec2::from_angle(heading) * speed);
            Firework::ballistic(launch, target_y, &mut world.rng)
        }
    };
    world.fireworks.push(firework);
    true
}

/// Add a ship unless the configured maximum is reached
pub fn spawn_ship(world: &mut World) -> bool {
    if world.ships.len() >= world.config.max_ships {
        return false;
    }
    let ship = Ship::spawn(world.bounds, &mut world.rng);
    world.ships.push(ship);
    true
}

/// Index of the firework to drop before a pointer launch, if any
fn pointer_eviction(fireworks: &[Firework]) -> Option<usize> {
    let oldest = |pointer_only: bool| {
        fireworks
            .iter()
            .enumerate()
            .filter(|(_, f)| !pointer_only || f.pointer)
            .min_by_key(|(_, f)| f.born)
            .map(|(i, _)| i)
    };
    if fireworks.iter().filter(|f| f.pointer).count() >= MAX_POINTER_FIREWORKS {
        oldest(true)
    } else if fireworks.len() >= MAX_FIREWORKS {
        oldest(false)
    } else {
        None
    }
}

/// Aimed firework toward a surface-local point. Rate limited; evicts the
/// oldest firework to stay within the caps. Evicted fireworks do not explode.
pub fn spawn_pointer_firework(world: &mut World, point: Vec2, now: f64) -> bool {
    if world
        .last_pointer_spawn
        .is_some_and(|last| now - last < POINTER_SPAWN_COOLDOWN_MS)
    {
        return false;
    }
    world.last_pointer_spawn = Some(now);

    let target = point.clamp(Vec2::ZERO, world.bounds);
    if let Some(victim) = pointer_eviction(&world.fireworks) {
        world.fireworks.swap_remove(victim);
    }

    let start = bottom_launch_point(world);
    let velocity = solve_launch_velocity(start, target, world.config.firework_speed, FIREWORK_GRAVITY)
        * POINTER_SPEED_MULTIPLIER;
    let launch = launch_params(world, start, velocity);
    let firework = Firework::aimed(launch, target, true, &mut world.rng);
    world.fireworks.push(firework);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use proptest::prelude::*;

    fn world() -> World {
        World::new(21, Config::default(), Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_timer_fires_once_then_disarms() {
        let mut timer = RepeatingTimer::default();
        assert!(!timer.take_due(0.0));
        timer.arm(100.0, 50.0);
        assert!(!timer.take_due(149.0));
        assert!(timer.take_due(150.0));
        assert!(!timer.is_armed());
        assert!(!timer.take_due(1000.0));
    }

    #[test]
    fn test_zero_population_disables_launches() {
        let mut world = world();
        world.config.population = 0.0;
        let mut scheduler = Scheduler::default();
        scheduler.start(&mut world, 0.0);
        assert!(!scheduler.fireworks.is_armed());
        assert!(scheduler.ships.is_armed());
    }

    #[test]
    fn test_population_scales_interval() {
        let mut world = world();
        world.config.population = 4.0;
        for _ in 0..100 {
            let delay = firework_delay(&mut world).unwrap();
            assert!(delay >= 55.0 && delay < 137.5, "delay {delay}");
        }
    }

    #[test]
    fn test_scheduled_launch_ceiling() {
        let mut world = world();
        for _ in 0..MAX_LAUNCHED_FIREWORKS {
            assert!(launch_firework(&mut world));
        }
        assert!(!launch_firework(&mut world));
        assert_eq!(world.fireworks.len(), MAX_LAUNCHED_FIREWORKS);
    }

    #[test]
    fn test_unaimed_launch_heads_up() {
        let mut world = world();
        launch_firework(&mut world);
        let fw = &world.fireworks[0];
        assert!(!fw.aimed);
        assert_eq!(fw.pos.y, 600.0);
        assert!(fw.pos.x >= 80.0 && fw.pos.x < 720.0);
        assert!(fw.vel.y < 0.0);
        let tilt = (fw.vel.x.atan2(-fw.vel.y)).abs();
        assert!(tilt <= LAUNCH_SPREAD + 1e-4);
        assert!(fw.target_y >= 60.0 && fw.target_y < 240.0);
    }

    #[test]
    fn test_launch_targets_visible_ship() {
        let mut world = world();
        spawn_ship(&mut world);
        world.ships[0].pos = Vec2::new(300.0, 200.0);
        launch_firework(&mut world);
        let fw = &world.fireworks[0];
        assert!(fw.aimed);
        assert_eq!(fw.target, Some(Vec2::new(300.0, 200.0)));
        assert!(!fw.pointer);
    }

    #[test]
    fn test_ship_spawn_respects_max() {
        let mut world = world();
        world.config.max_ships = 2;
        assert!(spawn_ship(&mut world));
        assert!(spawn_ship(&mut world));
        assert!(!spawn_ship(&mut world));
    }

    #[test]
    fn test_pointer_cooldown() {
        let mut world = world();
        assert!(spawn_pointer_firework(&mut world, Vec2::new(400.0, 300.0), 0.0));
        assert!(!spawn_pointer_firework(&mut world, Vec2::new(400.0, 300.0), 39.0));
        assert!(spawn_pointer_firework(&mut world, Vec2::new(400.0, 300.0), 40.0));
        assert_eq!(world.fireworks.len(), 2);
    }

    #[test]
    fn test_pointer_target_is_clamped() {
        let mut world = world();
        spawn_pointer_firework(&mut world, Vec2::new(-50.0, 900.0), 0.0);
        let fw = &world.fireworks[0];
        assert_eq!(fw.target, Some(Vec2::new(0.0, 600.0)));
        assert!(fw.pointer && fw.aimed);
    }

    #[test]
    fn test_pointer_evicts_oldest_pointer_firework() {
        let mut world = world();
        for k in 0..MAX_POINTER_FIREWORKS {
            spawn_pointer_firework(&mut world, Vec2::new(400.0, 300.0), k as f64 * 100.0);
        }
        let oldest = world.fireworks.iter().map(|f| f.born).min().unwrap();
        spawn_pointer_firework(&mut world, Vec2::new(400.0, 300.0), 10_000.0);
        assert_eq!(world.fireworks.len(), MAX_POINTER_FIREWORKS);
        assert!(world.fireworks.iter().all(|f| f.born != oldest));
    }

    #[test]
    fn test_pointer_evicts_oldest_overall_at_absolute_cap() {
        let mut world = world();
        for _ in 0..MAX_LAUNCHED_FIREWORKS {
            launch_firework(&mut world);
        }
        for k in 0..(MAX_FIREWORKS - MAX_LAUNCHED_FIREWORKS) {
            spawn_pointer_firework(&mut world, Vec2::new(400.0, 300.0), k as f64 * 100.0);
        }
        assert_eq!(world.fireworks.len(), MAX_FIREWORKS);

        spawn_pointer_firework(&mut world, Vec2::new(400.0, 300.0), 10_000.0);
        assert_eq!(world.fireworks.len(), MAX_FIREWORKS);
        // The first scheduled launch was born first and is gone
        assert!(world.fireworks.iter().all(|f| f.born != 0));
    }

    proptest! {
        #[test]
        fn prop_pointer_storm_respects_caps(
            points in proptest::collection::vec((-100f32..900.0, -100f32..700.0), 1..200),
            step in 0f64..80.0,
        ) {
            let mut world = world();
            for _ in 0..MAX_LAUNCHED_FIREWORKS {
                launch_firework(&mut world);
            }
            for (k, (x, y)) in points.into_iter().enumerate() {
                spawn_pointer_firework(&mut world, Vec2::new(x, y), k as f64 * step);
                prop_assert!(world.fireworks.len() <= MAX_FIREWORKS);
                prop_assert!(world.fireworks.iter().filter(|f| f.pointer).count() <= MAX_POINTER_FIREWORKS);
            }
        }
    }
}
