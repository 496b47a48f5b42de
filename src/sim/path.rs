//! Path sampling for curved platforms
//!
//! Discretizes the curve function into points with tangent and normal
//! vectors. Tangents come from finite differences through [`curve_height`]
//! itself rather than a closed-form derivative, so they always agree with the
//! sampled positions.

use glam::Vec2;

use super::curve::curve_height;
use crate::consts::{
    MIN_PLATFORM_LENGTH, RIBBON_MIN_SEGMENTS, RIBBON_SEGMENT_DENSITY, SURFACE_MIN_SEGMENTS,
    SURFACE_SEGMENT_DENSITY, TANGENT_DELTA,
};
use crate::perpendicular;

/// How finely a path is sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathResolution {
    /// Floor so very short platforms stay smooth
    pub min_segments: usize,
    /// Segments per world unit of platform length
    pub density: f32,
}

impl PathResolution {
    /// Coarse sampling for the solid walkable surface
    pub const SURFACE: Self = Self {
        min_segments: SURFACE_MIN_SEGMENTS,
        density: SURFACE_SEGMENT_DENSITY,
    };

    /// Fine sampling for the text ribbon
    pub const RIBBON: Self = Self {
        min_segments: RIBBON_MIN_SEGMENTS,
        density: RIBBON_SEGMENT_DENSITY,
    };

    /// Scale the density (quality presets), keeping the minimum
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            min_segments: self.min_segments,
            density: self.density * factor.max(0.0),
        }
    }

    /// Segment count for a platform of `length`
    pub fn segment_count(&self, length: f32) -> usize {
        let by_density = (length * self.density).floor();
        let by_density = if by_density.is_finite() && by_density > 0.0 {
            by_density as usize
        } else {
            0
        };
        by_density.max(self.min_segments).max(1)
    }
}

/// One point on a sampled path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub x: f32,
    pub y: f32,
    /// Unit tangent, pointing toward increasing x
    pub tangent: Vec2,
    /// Unit normal: tangent rotated +90°
    pub normal: Vec2,
}

impl PathSample {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Ordered samples along a platform path (segment count + 1 of them)
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPath {
    pub length: f32,
    pub curviness: f32,
    pub samples: Vec<PathSample>,
}

impl SampledPath {
    pub fn segment_count(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathSample> {
        self.samples.iter()
    }
}

/// Unit tangent and normal of the curve at `x`.
///
/// Neighbours are clamped to `[0, length]` so end samples use one-sided
/// differences. A degenerate tangent falls back to +X with the vertical normal.
pub fn tangent_frame(x: f32, length: f32, curviness: f32) -> (Vec2, Vec2) {
    let x0 = (x - TANGENT_DELTA).clamp(0.0, length);
    let x1 = (x + TANGENT_DELTA).clamp(0.0, length);
    let delta = Vec2::new(
        x1 - x0,
        curve_height(x1, length, curviness) - curve_height(x0, length, curviness),
    );

    let tangent = delta.normalize_or_zero();
    if tangent.length_squared() <= f32::EPSILON || !tangent.is_finite() {
        return (Vec2::X, Vec2::Y);
    }
    (tangent, perpendicular(tangent))
}

/// Sample the curve for a platform of `length` and `curviness`.
///
/// Lengths below [`MIN_PLATFORM_LENGTH`] (including zero) are floored.
pub fn sample_path(length: f32, curviness: f32, resolution: PathResolution) -> SampledPath {
    let length = floor_length(length);
    let segments = resolution.segment_count(length);

    let samples = (0..=segments)
        .map(|i| {
            let x = length * i as f32 / segments as f32;
            let (tangent, normal) = tangent_frame(x, length, curviness);
            PathSample {
                x,
                y: curve_height(x, length, curviness),
                tangent,
                normal,
            }
        })
        .collect();

    SampledPath {
        length,
        curviness,
        samples,
    }
}

/// Minimum-length floor shared by every geometry builder
#[inline]
pub fn floor_length(length: f32) -> f32 {
    if length.is_finite() {
        length.max(MIN_PLATFORM_LENGTH)
    } else {
        MIN_PLATFORM_LENGTH
    }
}
