//! Sentence Surf - a side-scrolling platformer built from an article's sentences
//!
//! Core modules:
//! - `sim`: Deterministic simulation (curve math, path sampling, traversal, physics tick)
//! - `geometry`: Platform surface and text ribbon meshes, plus the geometry cache
//! - `level`: Sentences laid out as a level of curved platforms
//! - `content`: External data contracts and the fallback-driven loading pipeline
//! - `session`: Owns everything a running game needs and drives the frame loop
//! - `renderer`: wgpu scene graph, mesh upload and canvas rendering
//! - `scene`: Render engine boundary
//! - `tuning`: Data-driven game balance

pub mod background;
pub mod camera;
pub mod content;
pub mod geometry;
pub mod level;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use level::{Level, Platform, Sentence, build_level};
pub use session::Session;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 12;
    /// Frame delta cap applied before physics (tab backgrounding, long pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Curviness scale: tone scores live in [0, MAX_CURVINESS]
    pub const MAX_CURVINESS: f32 = 10.0;
    /// Curviness for sentences the tone source did not score
    pub const DEFAULT_CURVINESS: f32 = 5.0;
    /// Waveform amplitude at full curviness (world units)
    pub const MAX_AMPLITUDE: f32 = 5.0;
    /// Extra oscillations over the platform length at full curviness
    pub const FREQUENCY_RANGE: f32 = 2.0;
    /// Fixed waveform rotation, in degrees
    pub const CURVE_ROTATION_DEG: f32 = -35.0;
    /// Per-platform downward bias across the full length
    pub const CURVE_DOWNWARD_BIAS: f32 = -0.5;

    /// Platform length per word
    pub const WORD_UNIT: f32 = 2.0;
    /// Horizontal gap between consecutive platform edges
    pub const PLATFORM_GAP: f32 = 2.0;
    /// Vertical drop between consecutive platforms
    pub const PLATFORM_STEP: f32 = 5.0;
    /// Sentences with fewer words produce no platform
    pub const MIN_WORDS_PER_PLATFORM: usize = 3;
    /// Shortest length geometry will ever be built for
    pub const MIN_PLATFORM_LENGTH: f32 = WORD_UNIT;

    /// Vertical thickness of the solid platform cross-section
    pub const PLATFORM_THICKNESS: f32 = 1.0;
    /// Depth of the platform along Z
    pub const PLATFORM_DEPTH: f32 = 3.0;
    /// Height of the text band carried by each platform
    pub const TEXT_HEIGHT: f32 = 1.0;
    /// Texture pixels per world unit along the ribbon
    pub const TEXT_PIXELS_PER_UNIT: f32 = 64.0;

    /// Solid surface sampling: at least this many segments...
    pub const SURFACE_MIN_SEGMENTS: usize = 10;
    /// ...or this many per world unit
    pub const SURFACE_SEGMENT_DENSITY: f32 = 2.0;
    /// Text ribbons facet visibly sooner, so they sample finer
    pub const RIBBON_MIN_SEGMENTS: usize = 20;
    pub const RIBBON_SEGMENT_DENSITY: f32 = 4.0;
    /// X step used for finite-difference tangents
    pub const TANGENT_DELTA: f32 = 0.01;
}

/// Rotate a vector by +90° (counter-clockwise)
#[inline]
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Split text into whitespace-delimited words
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}
