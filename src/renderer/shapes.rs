//! Shape geometry shared by every backend

use glam::Vec2;

use crate::sim::{Firework, Ship};

/// Arrowhead hull in ship-local space (nose along +x)
pub fn ship_hull(size: f32) -> [Vec2; 4] {
    [
        Vec2::new(size * 1.2, 0.0),
        Vec2::new(-size * 0.8, size * 0.6),
        Vec2::new(-size * 0.4, 0.0),
        Vec2::new(-size * 0.8, -size * 0.6),
    ]
}

/// Center stripe in ship-local space
pub fn ship_stripe(size: f32) -> [Vec2; 2] {
    [Vec2::new(size * 0.2, 0.0), Vec2::new(-size * 0.4, 0.0)]
}

/// Hull transformed into world space
pub fn ship_hull_world(ship: &Ship) -> [Vec2; 4] {
    let rot = Vec2::from_angle(ship.rotation);
    ship_hull(ship.size).map(|p| ship.pos + rot.rotate(p))
}

pub const SHIP_ALPHA: f32 = 0.95;
pub const SHIP_STRIPE_COLOR: &str = "rgba(255, 255, 255, 0.6)";

/// Polyline for a firework's tail, oldest point first.
/// An empty trail degenerates to a dot at the current position.
pub fn firework_polyline(firework: &Firework) -> impl Iterator<Item = Vec2> + '_ {
    let dot = firework.trail.is_empty().then_some(firework.pos);
    firework.trail.iter().chain(dot).chain(dot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::color::Color;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_hull_nose_follows_rotation() {
        let ship = Ship {
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::new(0.0, 1.0),
            size: 10.0,
            rotation: FRAC_PI_2,
            color: Color::new("cyan"),
            can_evade: false,
            evade_until: 0.0,
            margin: 20.0,
        };
        let hull = ship_hull_world(&ship);
        assert!((hull[0] - Vec2::new(100.0, 112.0)).length() < 1e-4);
    }
}
