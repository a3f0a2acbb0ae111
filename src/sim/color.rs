//! Shared CSS colors
//!
//! Colors are reference-counted strings so a burst of particles can share the
//! firework's color without a per-particle allocation.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::config::ColorChoice;
use crate::rand_usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color(Arc<str>);

impl Color {
    pub fn new(css: &str) -> Self {
        Self(Arc::from(css))
    }

    /// `hsl(h, s%, l%)`
    pub fn hsl(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self(Arc::from(format!("hsl({hue}, {saturation}%, {lightness}%)")))
    }

    /// Fully saturated color with a random hue
    pub fn random_hue(rng: &mut impl Rng) -> Self {
        Self::hsl(rand_usize(rng, 0, 360) as u16, 100, 50)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("white")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Colors fireworks are drawn from; empty means a random hue each time
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn from_choice(choice: Option<&ColorChoice>) -> Self {
        let colors = match choice {
            Some(ColorChoice::Single(css)) => vec![Color::new(css)],
            Some(ColorChoice::Palette(list)) => list.iter().map(|css| Color::new(css)).collect(),
            None => Vec::new(),
        };
        Self { colors }
    }

    pub fn pick(&self, rng: &mut impl Rng) -> Color {
        if self.colors.is_empty() {
            return Color::random_hue(rng);
        }
        self.colors[rand_usize(rng, 0, self.colors.len())].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_single_color_always_picked() {
        let mut rng = Pcg32::seed_from_u64(7);
        let palette = Palette::from_choice(Some(&ColorChoice::Single("white".into())));
        for _ in 0..10 {
            assert_eq!(palette.pick(&mut rng).as_str(), "white");
        }
    }

    #[test]
    fn test_palette_samples_members() {
        let mut rng = Pcg32::seed_from_u64(7);
        let palette =
            Palette::from_choice(Some(&ColorChoice::Palette(vec!["red".into(), "blue".into()])));
        for _ in 0..20 {
            let c = palette.pick(&mut rng);
            assert!(c.as_str() == "red" || c.as_str() == "blue");
        }
    }

    #[test]
    fn test_missing_color_is_random_hsl() {
        let mut rng = Pcg32::seed_from_u64(7);
        let palette = Palette::from_choice(None);
        let c = palette.pick(&mut rng);
        assert!(c.as_str().starts_with("hsl("));
        assert!(c.as_str().ends_with("100%, 50%)"));
    }
}
