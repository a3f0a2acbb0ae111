//! Simulation core shared by both execution strategies
//!
//! Drivers own the clock and the drawing surface. They call [`Simulation::tick`]
//! on every refresh signal (animation frame or worker timer) and forward host
//! events; the core decides whether a frame is due and which timers fire.

use glam::Vec2;

use super::spawn::{Scheduler, spawn_pointer_firework};
use super::state::{Counts, World};
use super::tick::{FrameReport, tick};
use crate::config::{Config, ConfigPatch};
use crate::consts::{MAX_DT, REFERENCE_FRAME_MS, UNTHROTTLED_TIMER_MS};
use crate::renderer::{Surface, Viewport};

/// Throttles redraws to a target interval and turns elapsed time into a
/// delta factor relative to a 60 Hz frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FramePacer {
    last_frame: Option<f64>,
}

impl FramePacer {
    pub fn reset(&mut self, now: f64) {
        self.last_frame = Some(now);
    }

    pub fn stop(&mut self) {
        self.last_frame = None;
    }

    /// Delta factor if a frame is due at `now`, else `None`
    pub fn advance(&mut self, now: f64, interval_ms: f64) -> Option<f32> {
        let elapsed = match self.last_frame {
            Some(last) => (now - last).max(0.0),
            None => REFERENCE_FRAME_MS,
        };
        if self.last_frame.is_some() && interval_ms > 0.0 && elapsed < interval_ms {
            return None;
        }
        self.last_frame = Some(now);
        Some(((elapsed / REFERENCE_FRAME_MS) as f32).min(MAX_DT))
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    world: World,
    scheduler: Scheduler,
    pacer: FramePacer,
    viewport: Viewport,
    initialized: bool,
    running: bool,
}

impl Simulation {
    pub fn new(seed: u64) -> Self {
        let viewport = Viewport::default();
        Self {
            world: World::new(seed, Config::default(), viewport.size()),
            scheduler: Scheduler::default(),
            pacer: FramePacer::default(),
            viewport,
            initialized: false,
            running: false,
        }
    }

    /// Bind a viewport and configuration and start the schedulers
    pub fn init(&mut self, viewport: Viewport, config: Config, now: f64) {
        self.world.clear();
        self.world.set_config(config.sanitized());
        self.resize(viewport);
        self.initialized = true;
        self.start(now);
        log::info!(
            "simulation started at {}x{} (dpr {}), {} fps target",
            viewport.width,
            viewport.height,
            viewport.dpr,
            self.world.config.frame_rate
        );
    }

    fn start(&mut self, now: f64) {
        self.running = true;
        self.scheduler.stop();
        self.scheduler.start(&mut self.world, now);
        self.pacer.reset(now);
    }

    fn stop(&mut self) {
        self.running = false;
        self.scheduler.stop();
        self.pacer.stop();
        self.world.clear();
    }

    /// Fire due timers, then draw a frame if one is due.
    /// Returns the frame's report, or `None` when nothing was drawn.
    pub fn tick<S: Surface + ?Sized>(&mut self, now: f64, surface: &mut S) -> Option<FrameReport> {
        if !self.running {
            return None;
        }
        self.scheduler.run_due(&mut self.world, now);
        let dt = self.pacer.advance(now, self.frame_interval_ms())?;
        Some(tick(&mut self.world, dt, now, surface))
    }

    /// New logical size; live entities are kept
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.world.bounds = viewport.size();
    }

    /// Pointer at surface-local `(x, y)`. Returns whether a firework launched.
    pub fn pointer_event(&mut self, x: f32, y: f32, now: f64) -> bool {
        if !self.running {
            return false;
        }
        spawn_pointer_firework(&mut self.world, Vec2::new(x, y), now)
    }

    /// Losing visibility stops everything and clears the scene; regaining it
    /// starts again from an empty scene
    pub fn set_visible(&mut self, visible: bool, now: f64) {
        match (visible, self.running) {
            (false, true) => {
                self.stop();
                log::debug!("hidden, scene cleared");
            }
            (true, false) if self.initialized => {
                self.world.clear();
                self.start(now);
                log::debug!("visible, restarting");
            }
            _ => {}
        }
    }

    /// Merge a partial configuration; takes effect on the next tick
    pub fn update_config(&mut self, patch: ConfigPatch, now: f64) {
        let mut config = self.world.config.clone();
        config.merge(patch);
        self.world.set_config(config);
        if self.running {
            self.scheduler.start(&mut self.world, now);
        }
    }

    /// Stop for good and release pooled records
    pub fn shutdown(&mut self) {
        self.stop();
        self.world.release_all();
        self.initialized = false;
        log::info!("simulation shut down");
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_interval_ms(&self) -> f64 {
        self.world.config.frame_interval_ms()
    }

    /// Period for timer-driven loops; unthrottled configs still need a period
    pub fn timer_interval_ms(&self) -> f64 {
        match self.frame_interval_ms() {
            interval if interval > 0.0 => interval,
            _ => UNTHROTTLED_TIMER_MS,
        }
    }

    pub fn counts(&self) -> Counts {
        self.world.counts()
    }

    pub fn config(&self) -> &Config {
        &self.world.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
