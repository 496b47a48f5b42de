//! Game settings and preferences
//!
//! Persisted separately from anything else in LocalStorage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_CURVINESS;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Multiplier on text ribbon sampling density
    pub fn ribbon_density(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 2.0,
        }
    }

    /// Number of parallax background layers
    pub fn background_layers(&self) -> usize {
        match self {
            QualityPreset::Low => 1,
            QualityPreset::Medium => 3,
            QualityPreset::High => 4,
        }
    }

    /// Decorations per background layer
    pub fn background_density(&self) -> usize {
        match self {
            QualityPreset::Low => 8,
            QualityPreset::Medium => 16,
            QualityPreset::High => 32,
        }
    }
}

/// Settings failed to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Parse(msg) => write!(f, "settings parse error: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Narration ===
    /// Speak sentences and words as they are surfed
    pub narration: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Narration volume (0.0 - 1.0)
    pub narration_volume: f32,

    // === Content ===
    /// Curviness for sentences the tone source did not score
    pub default_curviness: f32,

    // === Accessibility ===
    /// Reduced motion (no camera easing, static background)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            narration: true,
            master_volume: 0.8,
            narration_volume: 1.0,

            default_curviness: DEFAULT_CURVINESS,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective narration volume (0 when narration is off)
    pub fn effective_narration_volume(&self) -> f32 {
        if self.narration {
            (self.master_volume * self.narration_volume).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sentence_surf_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.to_json());
            log::info!("Settings saved");
        }
    }

    /// Native: read `SENTENCE_SURF_SETTINGS` if it points at a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("SENTENCE_SURF_SETTINGS") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring {}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
