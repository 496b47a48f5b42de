//! Data-driven game balance
//!
//! Loaded from JSON; any field left out keeps its default.

use serde::{Deserialize, Serialize};

use crate::settings::SettingsError;

/// Physics and scoring knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Horizontal speed while a direction is held (units/s)
    pub run_speed: f32,
    /// Upward speed given by a jump (units/s)
    pub jump_velocity: f32,
    /// Collision radius of the player
    pub player_radius: f32,
    /// How far above a surface a falling player still snaps onto it
    pub landing_tolerance: f32,
    /// Points per word crossed
    pub word_score: u64,
    /// Perfect-surf bonus = word_score × this
    pub perfect_surf_multiplier: u64,
    /// Relative position that counts as reaching the platform's end
    pub perfect_surf_threshold: f32,
    /// Distance below the lowest surface that counts as falling out
    pub fall_out_distance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            run_speed: 8.0,
            jump_velocity: 12.0,
            player_radius: 0.5,
            landing_tolerance: 0.25,
            word_score: 10,
            perfect_surf_multiplier: 5,
            perfect_surf_threshold: 0.95,
            fall_out_distance: 20.0,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    pub fn perfect_surf_bonus(&self) -> u64 {
        self.word_score * self.perfect_surf_multiplier
    }
}
