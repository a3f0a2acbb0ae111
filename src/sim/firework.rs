//! Fireworks: ballistic and aimed launches
//!
//! Lifecycle: launched -> exploded | discarded. Both outcomes are terminal;
//! an exploded firework ignores further updates.

use glam::Vec2;
use rand::Rng;

use super::color::Color;
use super::particle::Burst;
use super::trail::Trail;
use crate::config::Range;
use crate::consts::*;
use crate::rand_usize;

/// Result of advancing a firework one step
#[derive(Debug, Clone)]
pub enum Flight {
    /// Still in the air
    Flying,
    /// Reached its exit condition; spawn this burst
    Exploded(Burst),
    /// Left the viewport without arriving
    Discarded,
    /// Already exploded earlier; nothing happened
    Spent,
}

#[derive(Debug, Clone)]
pub struct Firework {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Color,
    pub gravity: f32,
    pub friction: f32,
    pub trail: Trail,
    pub exploded: bool,
    /// Explicit target for aimed fireworks
    pub target: Option<Vec2>,
    /// Explosion altitude for ballistic fireworks
    pub target_y: f32,
    pub aimed: bool,
    /// Spawned by a pointer event
    pub pointer: bool,
    /// Spawn order, for oldest-first eviction
    pub born: u64,
    /// Particle ranges captured at launch
    pub particle_speed: Range,
    pub particle_size: Range,
}

/// Parameters shared by every launch
#[derive(Debug, Clone)]
pub struct Launch {
    pub start: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub color: Color,
    pub particle_speed: Range,
    pub particle_size: Range,
    pub born: u64,
}

impl Firework {
    /// Ballistic firework that explodes at apex or at `target_y`
    pub fn ballistic(launch: Launch, target_y: f32, rng: &mut impl Rng) -> Self {
        Self::from_launch(launch, None, target_y, false, rng)
    }

    /// Firework that explodes on arrival at `target`
    pub fn aimed(launch: Launch, target: Vec2, pointer: bool, rng: &mut impl Rng) -> Self {
        Self::from_launch(launch, Some(target), target.y, pointer, rng)
    }

    fn from_launch(
        launch: Launch,
        target: Option<Vec2>,
        target_y: f32,
        pointer: bool,
        rng: &mut impl Rng,
    ) -> Self {
        let trail_len = rand_usize(rng, TRAIL_LENGTH.0, TRAIL_LENGTH.1);
        Self {
            pos: launch.start,
            vel: launch.velocity,
            size: launch.size,
            color: launch.color,
            gravity: FIREWORK_GRAVITY,
            friction: 1.0,
            trail: Trail::new(trail_len),
            exploded: false,
            aimed: target.is_some(),
            target,
            target_y,
            pointer,
            born: launch.born,
            particle_speed: launch.particle_speed,
            particle_size: launch.particle_size,
        }
    }

    /// Radius around the target that counts as arrival
    #[inline]
    pub fn arrival_radius(&self) -> f32 {
        AIMED_MIN_RADIUS.max(self.size * AIMED_RADIUS_PER_SIZE)
    }

    /// Advance by `dt` reference frames inside a `bounds` sized viewport
    pub fn update(&mut self, bounds: Vec2, dt: f32, rng: &mut impl Rng) -> Flight {
        if self.exploded {
            return Flight::Spent;
        }

        self.trail.push(self.pos);
        self.vel *= self.friction;
        self.pos += self.vel * dt;
        self.vel.y += self.gravity * dt;

        if let Some(target) = self.target.filter(|_| self.aimed) {
            let radius = self.arrival_radius();
            if self.pos.distance_squared(target) <= radius * radius {
                return self.explode(rng).map_or(Flight::Spent, Flight::Exploded);
            }
            let margin = FIREWORK_OFFSCREEN_MARGIN;
            let outside = self.pos.x < -margin
                || self.pos.x > bounds.x + margin
                || self.pos.y < -margin
                || self.pos.y > bounds.y + margin;
            return if outside { Flight::Discarded } else { Flight::Flying };
        }

        if self.vel.y >= 0.0 || self.pos.y <= self.target_y {
            return self.explode(rng).map_or(Flight::Spent, Flight::Exploded);
        }
        Flight::Flying
    }

    /// Mark exploded and describe the burst; `None` if it already went off
    pub fn explode(&mut self, rng: &mut impl Rng) -> Option<Burst> {
        if self.exploded {
            return None;
        }
        self.exploded = true;
        Some(Burst {
            origin: self.pos,
            color: self.color.clone(),
            count: rand_usize(rng, BURST_PARTICLES.0, BURST_PARTICLES.1),
            speed: self.particle_speed,
            size: self.particle_size,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    pub(crate) fn launch(start: Vec2, velocity: Vec2) -> Launch {
        Launch {
            start,
            velocity,
            size: 3.0,
            color: Color::new("gold"),
            particle_speed: Range::span(5.0, 10.0),
            particle_size: Range::span(1.0, 5.0),
            born: 0,
        }
    }

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_aimed_explodes_on_arrival() {
        let mut rng = Pcg32::seed_from_u64(3);
        let target = Vec2::new(400.0, 300.0);
        let mut fw = Firework::aimed(launch(Vec2::new(400.0, 302.0), Vec2::ZERO), target, false, &mut rng);

        let Flight::Exploded(burst) = fw.update(BOUNDS, 1.0, &mut rng) else {
            panic!("expected explosion");
        };
        assert!(fw.exploded);
        assert_eq!(burst.origin, fw.pos);
        assert!((BURST_PARTICLES.0..BURST_PARTICLES.1).contains(&burst.count));
        assert_eq!(burst.color.as_str(), "gold");
    }

    #[test]
    fn test_exploded_firework_is_never_updated() {
        let mut rng = Pcg32::seed_from_u64(3);
        let target = Vec2::new(400.0, 300.0);
        let mut fw = Firework::aimed(launch(target, Vec2::new(1.0, -1.0)), target, false, &mut rng);
        assert!(matches!(fw.update(BOUNDS, 1.0, &mut rng), Flight::Exploded(_)));

        let pos = fw.pos;
        let trail_len = fw.trail.len();
        assert!(matches!(fw.update(BOUNDS, 1.0, &mut rng), Flight::Spent));
        assert_eq!(fw.pos, pos);
        assert_eq!(fw.trail.len(), trail_len);
        assert!(fw.explode(&mut rng).is_none());
    }

    #[test]
    fn test_aimed_discarded_off_screen() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fw = Firework::aimed(
            launch(Vec2::new(10.0, 300.0), Vec2::new(-100.0, 0.0)),
            Vec2::new(700.0, 100.0),
            false,
            &mut rng,
        );
        assert!(matches!(fw.update(BOUNDS, 1.0, &mut rng), Flight::Discarded));
        assert!(!fw.exploded);
    }

    #[test]
    fn test_ballistic_explodes_at_apex() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fw = Firework::ballistic(launch(Vec2::new(400.0, 600.0), Vec2::new(0.0, -1.0)), -1000.0, &mut rng);

        let mut steps = 0;
        let burst = loop {
            steps += 1;
            match fw.update(BOUNDS, 1.0, &mut rng) {
                Flight::Flying => continue,
                Flight::Exploded(burst) => break burst,
                other => panic!("unexpected {other:?}"),
            }
        };
        // vy goes from -1 to >= 0 after about 1 / gravity ticks
        let apex = (1.0 / FIREWORK_GRAVITY).round() as i32;
        assert!((apex..=apex + 1).contains(&steps), "steps {steps}");
        assert!(burst.origin.y < 600.0);
    }

    #[test]
    fn test_ballistic_explodes_at_target_altitude() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fw = Firework::ballistic(launch(Vec2::new(400.0, 600.0), Vec2::new(0.0, -20.0)), 590.0, &mut rng);
        assert!(matches!(fw.update(BOUNDS, 1.0, &mut rng), Flight::Exploded(_)));
    }

    #[test]
    fn test_trail_records_positions() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fw = Firework::ballistic(launch(Vec2::new(400.0, 600.0), Vec2::new(0.0, -10.0)), 0.0, &mut rng);
        for _ in 0..5 {
            fw.update(BOUNDS, 1.0, &mut rng);
        }
        assert_eq!(fw.trail.len(), 5.min(fw.trail.capacity()));
        assert_eq!(fw.trail.iter().next(), Some(Vec2::new(400.0, 600.0)));
    }
}
