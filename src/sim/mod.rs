//! Simulation core
//!
//! Entities, physics and scheduling. Nothing in here touches the browser:
//! time comes in as milliseconds from the driver, randomness from a seeded
//! RNG, and drawing goes through the [`Surface`](crate::renderer::Surface)
//! trait.

pub mod ballistic;
pub mod color;
pub mod firework;
pub mod particle;
pub mod pool;
pub mod ship;
pub mod simulation;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod trail;

pub use ballistic::solve_launch_velocity;
pub use color::{Color, Palette};
pub use firework::{Firework, Flight, Launch};
pub use particle::{Burst, Particle};
pub use pool::Pool;
pub use ship::Ship;
pub use simulation::{FramePacer, Simulation};
pub use spawn::{RepeatingTimer, Scheduler};
pub use state::{Counts, World};
pub use tick::{FrameReport, tick};
pub use trail::Trail;
