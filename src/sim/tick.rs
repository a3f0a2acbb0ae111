//! One frame of the scene
//!
//! Clear, steer and move ships, fly fireworks (explosions and ship hits),
//! then fade particles. Every entity is drawn right after its update.

use super::firework::Flight;
use super::state::{World, emit_burst, hit_burst};
use crate::renderer::Surface;

/// What happened during a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub explosions: u32,
    pub discarded: u32,
    pub ships_destroyed: u32,
    pub ships_departed: u32,
    pub particles_expired: u32,
}

/// Advance the world by `dt` reference frames and draw it
pub fn tick<S: Surface + ?Sized>(world: &mut World, dt: f32, now: f64, surface: &mut S) -> FrameReport {
    let mut report = FrameReport::default();
    let World {
        bounds,
        config,
        particles,
        fireworks,
        ships,
        pool,
        threats,
        rng,
        ..
    } = world;
    let bounds = *bounds;

    surface.clear(bounds.x, bounds.y);

    threats.clear();
    if !ships.is_empty() && !fireworks.is_empty() {
        threats.extend(fireworks.iter().map(|f| f.pos));
    }

    // Ships
    let mut i = 0;
    while i < ships.len() {
        let ship = &mut ships[i];
        if !threats.is_empty() {
            ship.evade(threats, now, rng);
        }
        if ship.update(bounds, dt) {
            surface.draw_ship(ship);
            i += 1;
        } else {
            ships.swap_remove(i);
            report.ships_departed += 1;
        }
    }

    // Fireworks
    let mut i = 0;
    while i < fireworks.len() {
        match fireworks[i].update(bounds, dt, rng) {
            Flight::Flying => {}
            Flight::Exploded(burst) => {
                emit_burst(particles, pool, rng, &burst);
                fireworks.swap_remove(i);
                report.explosions += 1;
                continue;
            }
            Flight::Discarded | Flight::Spent => {
                fireworks.swap_remove(i);
                report.discarded += 1;
                continue;
            }
        }

        let pos = fireworks[i].pos;
        let hit = ships.iter().position(|ship| {
            let r = ship.hit_radius();
            ship.pos.distance_squared(pos) <= r * r
        });
        if let Some(s) = hit {
            let ship = ships.swap_remove(s);
            let debris = hit_burst(ship.pos, rng);
            emit_burst(particles, pool, rng, &debris);
            if let Some(burst) = fireworks[i].explode(rng) {
                emit_burst(particles, pool, rng, &burst);
            }
            fireworks.swap_remove(i);
            report.ships_destroyed += 1;
            report.explosions += 1;
            continue;
        }

        surface.draw_firework(&fireworks[i]);
        i += 1;
    }

    // Particles
    let shape = config.particle_shape();
    let mut i = 0;
    while i < particles.len() {
        particles[i].update(dt);
        if particles[i].is_alive() {
            surface.draw_particle(&particles[i], shape);
            i += 1;
        } else {
            pool.release(particles.swap_remove(i));
            report.particles_expired += 1;
        }
    }

    surface.end_frame();
    report
}
