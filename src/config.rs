//! Background configuration
//!
//! Supplied by the host page as JSON (camelCase keys). Partial updates arrive
//! as a [`ConfigPatch`] and are merged into the active [`Config`].

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_LAUNCH_SPEED;
use crate::rand_f32;
use crate::renderer::ParticleShape;

/// Numeric range: a fixed number or a `{min, max}` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Range {
    Fixed(f32),
    Span { min: f32, max: f32 },
}

impl Range {
    pub const fn span(min: f32, max: f32) -> Self {
        Range::Span { min, max }
    }

    /// Ordered `(min, max)` bounds; a fixed value is a zero-width range
    pub fn bounds(&self) -> (f32, f32) {
        match *self {
            Range::Fixed(v) => (v, v),
            Range::Span { min, max } if min <= max => (min, max),
            Range::Span { min, max } => (max, min),
        }
    }

    /// Midpoint of the range
    pub fn preferred(&self) -> f32 {
        let (min, max) = self.bounds();
        (min + max) / 2.0
    }

    pub fn contains(&self, value: f32) -> bool {
        let (min, max) = self.bounds();
        value >= min && value <= max
    }

    /// Draw a value uniformly from the range
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        let (min, max) = self.bounds();
        rand_f32(rng, min, max)
    }

    /// Replace non-finite bounds with `fallback` and raise both to `floor`
    fn sanitized(self, fallback: Range, floor: f32) -> Range {
        let (min, max) = self.bounds();
        if !min.is_finite() || !max.is_finite() {
            return fallback;
        }
        match self {
            Range::Fixed(v) => Range::Fixed(v.max(floor)),
            Range::Span { .. } => Range::span(min.max(floor), max.max(floor)),
        }
    }
}

impl From<f32> for Range {
    fn from(value: f32) -> Self {
        Range::Fixed(value)
    }
}

/// Firework color: one CSS color or a palette to sample from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorChoice {
    Single(String),
    Palette(Vec<String>),
}

/// Page color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Monochrome firework color that contrasts with the page
    pub fn firework_color(&self) -> &'static str {
        match self {
            Theme::Light => "black",
            Theme::Dark => "white",
        }
    }
}

/// Active background configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Launch density multiplier (0 disables scheduled launches)
    pub population: f32,
    /// Firework color; `None` picks a random hue per firework
    pub color: Option<ColorChoice>,
    /// Launch speed (px/tick)
    pub firework_speed: Range,
    /// Firework line width
    pub firework_size: Range,
    /// Explosion particle speed (px/tick)
    pub particle_speed: Range,
    /// Explosion particle radius
    pub particle_size: Range,
    /// Target redraw rate; 0 draws on every refresh signal
    pub frame_rate: f32,
    /// Maximum concurrent ships
    pub max_ships: usize,
    /// Delay between ship spawns (ms)
    pub ship_spawn_interval: Range,
    /// Draw particles as filled squares (cheaper on coarse-pointer devices)
    pub use_rect_particles: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population: 1.0,
            color: None,
            firework_speed: Range::span(10.0, 20.0),
            firework_size: Range::span(2.0, 5.0),
            particle_speed: Range::span(5.0, 10.0),
            particle_size: Range::span(1.0, 5.0),
            frame_rate: 20.0,
            max_ships: 36,
            ship_spawn_interval: Range::span(200.0, 800.0),
            use_rect_particles: false,
        }
    }
}

impl Config {
    /// Preset used by the page background layer
    pub fn background_layer(theme: Theme, coarse_pointer: bool) -> Self {
        Self {
            color: Some(ColorChoice::Single(theme.firework_color().to_string())),
            frame_rate: preset_frame_rate(coarse_pointer),
            max_ships: 15,
            ship_spawn_interval: Range::span(400.0, 800.0),
            use_rect_particles: coarse_pointer,
            ..Self::default()
        }
    }

    /// Parse a full configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        Ok(config.sanitized())
    }

    /// Clamp values the simulation cannot use (negative, non-finite)
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.population.is_finite() || self.population < 0.0 {
            self.population = 0.0;
        }
        if !self.frame_rate.is_finite() || self.frame_rate < 0.0 {
            self.frame_rate = 0.0;
        }
        self.firework_speed = self
            .firework_speed
            .sanitized(defaults.firework_speed, MIN_LAUNCH_SPEED);
        self.firework_size = self.firework_size.sanitized(defaults.firework_size, 0.0);
        self.particle_speed = self.particle_speed.sanitized(defaults.particle_speed, 0.0);
        self.particle_size = self.particle_size.sanitized(defaults.particle_size, 0.0);
        self.ship_spawn_interval = self
            .ship_spawn_interval
            .sanitized(defaults.ship_spawn_interval, 1.0);
        self
    }

    /// Merge a partial update
    pub fn merge(&mut self, patch: ConfigPatch) {
        let ConfigPatch {
            population,
            color,
            firework_speed,
            firework_size,
            particle_speed,
            particle_size,
            frame_rate,
            max_ships,
            ship_spawn_interval,
            use_rect_particles,
        } = patch;

        if let Some(v) = population {
            self.population = v;
        }
        if color.is_some() {
            self.color = color;
        }
        if let Some(v) = firework_speed {
            self.firework_speed = v;
        }
        if let Some(v) = firework_size {
            self.firework_size = v;
        }
        if let Some(v) = particle_speed {
            self.particle_speed = v;
        }
        if let Some(v) = particle_size {
            self.particle_size = v;
        }
        if let Some(v) = frame_rate {
            self.frame_rate = v;
        }
        if let Some(v) = max_ships {
            self.max_ships = v;
        }
        if let Some(v) = ship_spawn_interval {
            self.ship_spawn_interval = v;
        }
        if let Some(v) = use_rect_particles {
            self.use_rect_particles = v;
        }
        *self = std::mem::take(self).sanitized();
    }

    /// Frame interval in ms (0 = unthrottled)
    pub fn frame_interval_ms(&self) -> f64 {
        if self.frame_rate > 0.0 {
            1000.0 / self.frame_rate as f64
        } else {
            0.0
        }
    }

    pub fn particle_shape(&self) -> ParticleShape {
        ParticleShape::for_quality(self.use_rect_particles)
    }
}

/// Partial configuration update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firework_speed: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firework_size: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_speed: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_size: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ships: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_spawn_interval: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_rect_particles: Option<bool>,
}

impl ConfigPatch {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    /// Pointer-dependent preset fields, for when the primary pointer changes
    /// between fine and coarse
    pub fn for_pointer(coarse_pointer: bool) -> Self {
        Self {
            frame_rate: Some(preset_frame_rate(coarse_pointer)),
            use_rect_particles: Some(coarse_pointer),
            ..Self::default()
        }
    }

    /// Patch that only switches the firework color to match a theme
    pub fn for_theme(theme: Theme) -> Self {
        Self {
            color: Some(ColorChoice::Single(theme.firework_color().to_string())),
            ..Self::default()
        }
    }
}

/// Touch devices redraw less often
fn preset_frame_rate(coarse_pointer: bool) -> f32 {
    if coarse_pointer { 80.0 } else { 160.0 }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_accepts_number_or_pair() {
        let fixed: Range = serde_json::from_str("12").unwrap();
        assert_eq!(fixed.bounds(), (12.0, 12.0));
        assert_eq!(fixed.preferred(), 12.0);

        let span: Range = serde_json::from_str(r#"{"min": 4, "max": 8}"#).unwrap();
        assert_eq!(span.bounds(), (4.0, 8.0));
        assert_eq!(span.preferred(), 6.0);
    }

    #[test]
    fn test_reversed_span_is_ordered() {
        let range = Range::span(9.0, 3.0);
        assert_eq!(range.bounds(), (3.0, 9.0));
        assert!(range.contains(5.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{"population": 2, "color": ["red", "blue"]}"#).unwrap();
        assert_eq!(config.population, 2.0);
        assert_eq!(
            config.color,
            Some(ColorChoice::Palette(vec!["red".into(), "blue".into()]))
        );
        assert_eq!(config.max_ships, 36);
        assert_eq!(config.frame_rate, 20.0);
    }

    #[test]
    fn test_sanitize_clamps_negative_values() {
        let config = Config {
            population: -3.0,
            frame_rate: f32::NAN,
            particle_speed: Range::span(f32::INFINITY, 2.0),
            firework_size: Range::Fixed(-1.0),
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.population, 0.0);
        assert_eq!(config.frame_rate, 0.0);
        assert_eq!(config.particle_speed, Config::default().particle_speed);
        assert_eq!(config.firework_size, Range::Fixed(0.0));
    }

    #[test]
    fn test_zero_firework_speed_is_raised() {
        let config = Config::from_json(r#"{"fireworkSpeed": 0}"#).unwrap();
        assert_eq!(config.firework_speed, Range::Fixed(MIN_LAUNCH_SPEED));
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut config = Config::default();
        let patch = ConfigPatch::from_json(r#"{"maxShips": 3, "frameRate": 60}"#).unwrap();
        config.merge(patch);
        assert_eq!(config.max_ships, 3);
        assert_eq!(config.frame_rate, 60.0);
        assert_eq!(config.population, 1.0);
        assert_eq!(config.firework_speed, Range::span(10.0, 20.0));
    }

    #[test]
    fn test_frame_interval() {
        let mut config = Config::default();
        assert!((config.frame_interval_ms() - 50.0).abs() < 1e-9);
        config.frame_rate = 0.0;
        assert_eq!(config.frame_interval_ms(), 0.0);
    }

    #[test]
    fn test_background_layer_preset() {
        let touch = Config::background_layer(Theme::Dark, true);
        assert_eq!(touch.frame_rate, 80.0);
        assert_eq!(touch.max_ships, 15);
        assert_eq!(touch.particle_shape(), ParticleShape::Square);
        assert_eq!(touch.color, Some(ColorChoice::Single("white".into())));

        let desktop = Config::background_layer(Theme::Light, false);
        assert_eq!(desktop.frame_rate, 160.0);
        assert_eq!(desktop.particle_shape(), ParticleShape::Circle);
        assert_eq!(desktop.color, Some(ColorChoice::Single("black".into())));
    }

    #[test]
    fn test_pointer_patch_matches_preset() {
        let mut config = Config::background_layer(Theme::Light, false);
        config.merge(ConfigPatch::for_pointer(true));
        assert_eq!(config, Config::background_layer(Theme::Light, true));

        config.merge(ConfigPatch::for_pointer(false));
        assert_eq!(config, Config::background_layer(Theme::Light, false));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Config::from_json("{population: }").is_err());
        assert!(ConfigPatch::from_json(r#"{"maxShips": "many"}"#).is_err());
    }
}
