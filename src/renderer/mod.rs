//! Drawing surfaces
//!
//! The simulation draws through the [`Surface`] trait. Browser builds use the
//! 2D canvas backends in `canvas`; tests and the headless runner record
//! commands into a [`DrawList`].

pub mod draw_list;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use draw_list::{DrawCommand, DrawList};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Firework, Particle, Ship};

/// How explosion particles are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleShape {
    #[default]
    Circle,
    /// Axis-aligned square of side `2 * size`; cheaper to fill
    Square,
}

impl ParticleShape {
    pub fn for_quality(use_rect_particles: bool) -> Self {
        if use_rect_particles {
            ParticleShape::Square
        } else {
            ParticleShape::Circle
        }
    }
}

/// Something the scene can be drawn onto
pub trait Surface {
    /// Match the backing store to the viewport (logical size × dpr)
    fn resize(&mut self, viewport: &Viewport);
    /// Start a new frame
    fn clear(&mut self, width: f32, height: f32);
    fn draw_ship(&mut self, ship: &Ship);
    fn draw_firework(&mut self, firework: &Firework);
    fn draw_particle(&mut self, particle: &Particle, shape: ParticleShape);
    /// Called once after the last particle of a frame
    fn end_frame(&mut self) {}
}

/// Largest device pixel ratio worth rendering at
pub fn max_dpr(coarse_pointer: bool) -> f32 {
    if coarse_pointer { 1.25 } else { 2.0 }
}

/// Logical drawing area plus device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            dpr: 1.0,
        }
    }
}

impl Viewport {
    /// Floors sizes to whole pixels (at least 1) and keeps dpr at least 1
    pub fn new(width: f32, height: f32, dpr: f32) -> Self {
        let whole = |v: f32| if v.is_finite() { v.floor().max(1.0) } else { 1.0 };
        Self {
            width: whole(width),
            height: whole(height),
            dpr: if dpr.is_finite() { dpr.max(1.0) } else { 1.0 },
        }
    }

    /// Viewport for a CSS box, clamping the device pixel ratio for the input device
    pub fn from_css(width: f64, height: f64, device_pixel_ratio: f64, coarse_pointer: bool) -> Self {
        let raw = if device_pixel_ratio.is_finite() {
            device_pixel_ratio as f32
        } else {
            1.0
        };
        let dpr = raw.min(max_dpr(coarse_pointer));
        Self::new(width as f32, height as f32, dpr)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Backing store size in device pixels
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.dpr).floor() as u32,
            (self.height * self.dpr).floor() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_clamps() {
        let vp = Viewport::new(0.4, 99.9, 0.5);
        assert_eq!(vp.width, 1.0);
        assert_eq!(vp.height, 99.0);
        assert_eq!(vp.dpr, 1.0);
    }

    #[test]
    fn test_dpr_limit_depends_on_pointer() {
        assert_eq!(Viewport::from_css(800.0, 600.0, 3.0, false).dpr, 2.0);
        assert_eq!(Viewport::from_css(800.0, 600.0, 3.0, true).dpr, 1.25);
        assert_eq!(Viewport::from_css(800.0, 600.0, 1.5, false).dpr, 1.5);
        assert_eq!(Viewport::from_css(800.0, 600.0, f64::NAN, false).dpr, 1.0);
    }

    #[test]
    fn test_backing_size() {
        let vp = Viewport::new(801.0, 600.0, 1.25);
        assert_eq!(vp.backing_size(), (1001, 750));
    }
}
