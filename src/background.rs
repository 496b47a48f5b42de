//! Parallax background
//!
//! A few layers of decorations that scroll slower than the camera. Layouts
//! come from a seeded RNG so the same article always gets the same sky.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::level::Level;
use crate::settings::Settings;

/// Horizontal span a layer repeats over
pub const LAYER_SPAN: f32 = 80.0;

/// One decoration (cloud, hill, star) on a layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    /// Position within the layer tile
    pub position: Vec2,
    pub scale: f32,
    pub variant: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundLayer {
    /// 0 = farthest
    pub depth: usize,
    /// Fraction of camera motion this layer follows
    pub scroll_factor: f32,
    pub decorations: Vec<Decoration>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParallaxBackground {
    pub seed: u64,
    pub layers: Vec<BackgroundLayer>,
    /// Reduced motion: layers stay put on screen
    pub frozen: bool,
}

impl ParallaxBackground {
    /// Generate `layer_count` layers of `density` decorations within `vertical_range`
    pub fn generate(seed: u64, layer_count: usize, density: usize, vertical_range: (f32, f32)) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let (low, high) = if vertical_range.0 < vertical_range.1 {
            vertical_range
        } else {
            (vertical_range.1, vertical_range.1 + 1.0)
        };

        let layers = (0..layer_count)
            .map(|depth| {
                let scroll_factor = 0.8 * (depth + 1) as f32 / (layer_count + 1) as f32;
                let decorations = (0..density)
                    .map(|_| Decoration {
                        position: Vec2::new(
                            rng.random_range(0.0..LAYER_SPAN),
                            rng.random_range(low..high),
                        ),
                        scale: rng.random_range(0.5..1.5) * (1.0 + depth as f32 * 0.5),
                        variant: rng.random_range(0..4),
                    })
                    .collect();
                BackgroundLayer {
                    depth,
                    scroll_factor,
                    decorations,
                }
            })
            .collect();

        Self {
            seed,
            layers,
            frozen: false,
        }
    }

    /// Background sized to a level, detail from the quality preset
    pub fn for_level(level: &Level, settings: &Settings, seed: u64) -> Self {
        let top = 10.0;
        let bottom = level.lowest_surface().min(0.0) - 10.0;
        let mut background = Self::generate(
            seed,
            settings.quality.background_layers(),
            settings.quality.background_density(),
            (bottom, top),
        );
        background.frozen = settings.reduced_motion;
        background
    }

    /// Screen-space offset of layer `index` for a camera at `camera`.
    ///
    /// Horizontal offset wraps to the layer span so tiles repeat seamlessly.
    pub fn layer_offset(&self, index: usize, camera: Vec2) -> Vec2 {
        let Some(layer) = self.layers.get(index) else {
            return Vec2::ZERO;
        };
        if self.frozen {
            return Vec2::ZERO;
        }
        let shift = -camera * layer.scroll_factor;
        Vec2::new(shift.x.rem_euclid(LAYER_SPAN), shift.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_layout() {
        let a = ParallaxBackground::generate(42, 3, 10, (-20.0, 10.0));
        let b = ParallaxBackground::generate(42, 3, 10, (-20.0, 10.0));
        let c = ParallaxBackground::generate(43, 3, 10, (-20.0, 10.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_far_layers_scroll_slower() {
        let bg = ParallaxBackground::generate(1, 4, 4, (-5.0, 5.0));
        for pair in bg.layers.windows(2) {
            assert!(pair[0].scroll_factor < pair[1].scroll_factor);
            assert!(pair[1].scroll_factor < 1.0);
        }
    }

    #[test]
    fn test_decorations_within_bounds() {
        let bg = ParallaxBackground::generate(9, 2, 50, (-30.0, 10.0));
        for d in bg.layers.iter().flat_map(|l| &l.decorations) {
            assert!((0.0..LAYER_SPAN).contains(&d.position.x));
            assert!((-30.0..10.0).contains(&d.position.y));
            assert!(d.variant < 4);
        }
    }

    #[test]
    fn test_offset_wraps_and_freezes() {
        let mut bg = ParallaxBackground::generate(5, 1, 1, (0.0, 1.0));
        let factor = bg.layers[0].scroll_factor;
        let offset = bg.layer_offset(0, Vec2::new(1000.0, -8.0));
        assert!((0.0..LAYER_SPAN).contains(&offset.x));
        assert!((offset.y - 8.0 * factor).abs() < 1e-5);

        bg.frozen = true;
        assert_eq!(bg.layer_offset(0, Vec2::new(1000.0, -8.0)), Vec2::ZERO);
        assert_eq!(bg.layer_offset(7, Vec2::ZERO), Vec2::ZERO);
    }
}
