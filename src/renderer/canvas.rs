//! 2D canvas backends
//!
//! The on-page canvas and a worker's OffscreenCanvas expose the same drawing
//! calls, so one macro implements [`Surface`] for both.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, OffscreenCanvas, OffscreenCanvasRenderingContext2d,
};

use super::shapes::{SHIP_ALPHA, SHIP_STRIPE_COLOR, firework_polyline, ship_hull, ship_stripe};
use super::{ParticleShape, Surface, Viewport};
use crate::platform::PlatformError;
use crate::sim::{Firework, Particle, Ship};

/// Draws on a canvas element owned by the page
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, PlatformError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(PlatformError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PlatformError::ContextUnavailable)?;
        Ok(Self {
            canvas,
            ctx,
            viewport: Viewport::default(),
        })
    }
}

/// Draws on a canvas transferred to a worker
pub struct OffscreenSurface {
    canvas: OffscreenCanvas,
    ctx: OffscreenCanvasRenderingContext2d,
    viewport: Viewport,
}

impl OffscreenSurface {
    pub fn new(canvas: OffscreenCanvas) -> Result<Self, PlatformError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(PlatformError::ContextUnavailable)?
            .dyn_into::<OffscreenCanvasRenderingContext2d>()
            .map_err(|_| PlatformError::ContextUnavailable)?;
        Ok(Self {
            canvas,
            ctx,
            viewport: Viewport::default(),
        })
    }
}

macro_rules! impl_canvas_surface {
    ($ty:ty) => {
        impl $ty {
            /// Blank the whole backing store
            pub fn blank(&self) {
                self.ctx.clear_rect(0.0, 0.0, self.viewport.width as f64, self.viewport.height as f64);
            }
        }

        impl Surface for $ty {
            fn resize(&mut self, viewport: &Viewport) {
                self.viewport = *viewport;
                let (w, h) = viewport.backing_size();
                self.canvas.set_width(w.max(1));
                self.canvas.set_height(h.max(1));
                // Resizing resets the context; draw in logical pixels from here on
                let dpr = viewport.dpr as f64;
                let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
            }

            fn clear(&mut self, width: f32, height: f32) {
                self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
            }

            fn draw_ship(&mut self, ship: &Ship) {
                let ctx = &self.ctx;
                ctx.save();
                let _ = ctx.translate(ship.pos.x as f64, ship.pos.y as f64);
                let _ = ctx.rotate(ship.rotation as f64);
                ctx.set_global_alpha(SHIP_ALPHA as f64);
                ctx.set_fill_style_str(ship.color.as_str());

                let hull = ship_hull(ship.size);
                ctx.begin_path();
                ctx.move_to(hull[0].x as f64, hull[0].y as f64);
                for p in &hull[1..] {
                    ctx.line_to(p.x as f64, p.y as f64);
                }
                ctx.close_path();
                ctx.fill();

                let [from, to] = ship_stripe(ship.size);
                ctx.set_stroke_style_str(SHIP_STRIPE_COLOR);
                ctx.set_line_width(1.0);
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.stroke();
                ctx.restore();
            }

            fn draw_firework(&mut self, firework: &Firework) {
                let ctx = &self.ctx;
                ctx.begin_path();
                for (i, p) in firework_polyline(firework).enumerate() {
                    if i == 0 {
                        ctx.move_to(p.x as f64, p.y as f64);
                    } else {
                        ctx.line_to(p.x as f64, p.y as f64);
                    }
                }
                ctx.set_stroke_style_str(firework.color.as_str());
                ctx.set_line_width(firework.size as f64);
                ctx.set_line_cap("round");
                ctx.stroke();
            }

            fn draw_particle(&mut self, particle: &Particle, shape: ParticleShape) {
                let ctx = &self.ctx;
                ctx.set_global_alpha(particle.alpha.max(0.0) as f64);
                ctx.set_fill_style_str(particle.color.as_str());
                let (x, y, s) = (particle.pos.x as f64, particle.pos.y as f64, particle.size as f64);
                match shape {
                    ParticleShape::Square => ctx.fill_rect(x - s, y - s, s * 2.0, s * 2.0),
                    ParticleShape::Circle => {
                        ctx.begin_path();
                        let _ = ctx.arc(x, y, s, 0.0, TAU);
                        ctx.fill();
                    }
                }
            }

            fn end_frame(&mut self) {
                self.ctx.set_global_alpha(1.0);
            }
        }
    };
}

impl_canvas_surface!(CanvasSurface);
impl_canvas_surface!(OffscreenSurface);
