//! Platform curve function
//!
//! One pure function maps a position along a platform to its surface height.
//! Mesh construction, text alignment and collision all call [`curve_height`],
//! so the walkable surface and what the player stands on can never disagree.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::consts::{
    CURVE_DOWNWARD_BIAS, CURVE_ROTATION_DEG, FREQUENCY_RANGE, MAX_AMPLITUDE, MAX_CURVINESS,
};

/// Parameters that fully determine a platform's path shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    /// Horizontal extent of the platform (> 0)
    pub length: f32,
    /// Tone-derived waviness in [0, MAX_CURVINESS]
    pub curviness: f32,
}

impl CurveParams {
    pub fn new(length: f32, curviness: f32) -> Self {
        Self { length, curviness }
    }

    /// Height at `x` measured from the platform's left edge
    #[inline]
    pub fn height_at(&self, x: f32) -> f32 {
        curve_height(x, self.length, self.curviness)
    }
}

/// Waveform amplitude for a curviness score
#[inline]
pub fn amplitude(curviness: f32) -> f32 {
    (curviness / MAX_CURVINESS) * MAX_AMPLITUDE
}

/// Oscillations across the full platform length for a curviness score
#[inline]
pub fn frequency(curviness: f32) -> f32 {
    1.0 + (curviness / MAX_CURVINESS) * FREQUENCY_RANGE
}

/// Surface height at `x` along a platform of `length` with the given curviness.
///
/// A sine wave whose amplitude and frequency grow with curviness, rotated by a
/// fixed -35° and then given a small linear downward bias. Both the rotation's
/// `x` term and the bias are kept; the composite is what the levels are tuned
/// around.
///
/// `length` must be positive. Queries slightly outside `[0, length]` are fine.
/// Curviness is not clamped here.
#[inline]
pub fn curve_height(x: f32, length: f32, curviness: f32) -> f32 {
    let theta = CURVE_ROTATION_DEG.to_radians();
    let waveform = amplitude(curviness) * (TAU * frequency(curviness) * x / length).sin();
    let rotated = waveform * theta.cos() - x * theta.sin();
    let bias = CURVE_DOWNWARD_BIAS * (x / length);
    rotated + bias
}
