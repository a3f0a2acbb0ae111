//! Launch velocity solver
//!
//! Screen space: +y points down, so "upward" means negative vy. Flight
//! durations are searched over a fixed window of ticks; for each duration the
//! constant-acceleration equations give the unique velocity that lands on the
//! target at that tick. The candidate whose speed best matches the preferred
//! speed wins, with a large bonus for staying inside the permissible range.

use glam::Vec2;

use crate::config::Range;
use crate::consts::{MIN_LAUNCH_SPEED, SOLVER_IN_RANGE_BONUS, SOLVER_MAX_TICKS, SOLVER_MIN_TICKS};

/// Velocity that reaches `target` from `start` under `gravity` with no drag
pub fn solve_launch_velocity(start: Vec2, target: Vec2, speed: Range, gravity: f32) -> Vec2 {
    let delta = target - start;
    let (min, max) = speed.bounds();
    let preferred = speed.preferred();

    let mut best: Option<(Vec2, f32)> = None;
    for ticks in SOLVER_MIN_TICKS..=SOLVER_MAX_TICKS {
        let t = ticks as f32;
        let vx = delta.x / t;
        let vy = (delta.y - 0.5 * gravity * t * t) / t;
        if vy >= 0.0 {
            continue;
        }

        let candidate = Vec2::new(vx, vy);
        let speed = candidate.length();
        let in_range = speed >= min && speed <= max;
        let score = (speed - preferred).abs() - if in_range { SOLVER_IN_RANGE_BONUS } else { 0.0 };

        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((velocity, _)) if velocity.is_finite() => velocity,
        _ => Vec2::new(0.0, -preferred.max(MIN_LAUNCH_SPEED)),
    }
}

/// Position after `ticks` of flight with the given launch velocity
pub fn position_at(start: Vec2, velocity: Vec2, gravity: f32, ticks: f32) -> Vec2 {
    Vec2::new(
        start.x + velocity.x * ticks,
        start.y + velocity.y * ticks + 0.5 * gravity * ticks * ticks,
    )
}
