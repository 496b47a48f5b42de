//! Sentences laid out as a level of curved platforms
//!
//! Platforms run left to right with a fixed gap between edges, each one a
//! fixed step lower than the last. Layout is a single pass, so platforms
//! never overlap horizontally.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CURVINESS, MAX_CURVINESS, MIN_WORDS_PER_PLATFORM, PLATFORM_DEPTH, PLATFORM_GAP,
    PLATFORM_STEP, WORD_UNIT,
};
use crate::geometry::{GeometryCache, RibbonMesh, SurfaceMesh, TextTextureRequest};
use crate::split_words;

/// One sentence of the article with its tone score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: String,
    pub text: String,
    pub word_count: usize,
    /// Clamped to [0, MAX_CURVINESS]
    pub curviness: f32,
}

impl Sentence {
    /// Word count taken from the text
    pub fn new(id: impl Into<String>, text: impl Into<String>, curviness: f32) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self::with_word_count(id, text, word_count, curviness)
    }

    /// Word count supplied by the content source
    pub fn with_word_count(
        id: impl Into<String>,
        text: impl Into<String>,
        word_count: usize,
        curviness: f32,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            word_count,
            curviness: clamp_curviness(curviness),
        }
    }

    /// Long enough to become a platform
    pub fn is_playable(&self) -> bool {
        self.word_count >= MIN_WORDS_PER_PLATFORM && !self.text.trim().is_empty()
    }
}

/// Bring a tone score into range; non-finite scores get the default
pub fn clamp_curviness(curviness: f32) -> f32 {
    if curviness.is_finite() {
        curviness.clamp(0.0, MAX_CURVINESS)
    } else {
        DEFAULT_CURVINESS
    }
}

/// Platform length for a sentence
pub fn platform_length(word_count: usize) -> f32 {
    word_count as f32 * WORD_UNIT
}

/// A walkable sentence placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub sentence: Sentence,
    pub length: f32,
    pub curviness: f32,
    /// Whitespace split of the text; one entry per scored word
    pub words: Vec<String>,
    /// Horizontal middle of the platform and its vertical placement
    pub world_position: Vec2,
    pub surface: SurfaceMesh,
    pub ribbon: RibbonMesh,
}

impl Platform {
    pub fn left_edge(&self) -> f32 {
        self.world_position.x - self.length / 2.0
    }

    pub fn right_edge(&self) -> f32 {
        self.world_position.x + self.length / 2.0
    }

    /// Whether `world_x` lies over this platform
    pub fn spans(&self, world_x: f32) -> bool {
        world_x >= self.left_edge() && world_x <= self.right_edge()
    }

    /// World-space surface height at `world_x`
    pub fn surface_height(&self, world_x: f32) -> f32 {
        self.world_position.y + self.surface.height_at(world_x - self.world_position.x)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Fraction of the platform behind `world_x`, in [0, 1]
    pub fn relative_position(&self, world_x: f32) -> f32 {
        ((world_x - self.left_edge()) / self.length).clamp(0.0, 1.0)
    }

    /// Transform origin for both meshes
    pub fn origin(&self) -> Vec3 {
        self.world_position.extend(0.0)
    }

    /// Lowest point of the surface in world space
    pub fn lowest_surface(&self) -> f32 {
        self.surface
            .top_outline
            .iter()
            .map(|p| p.y)
            .fold(f32::INFINITY, f32::min)
            + self.world_position.y
    }
}

/// A playable sequence of platforms
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Level {
    pub platforms: Vec<Platform>,
    /// Horizontal span from the level start to past the last gap
    pub total_length: f32,
    /// Sentences offered to the assembler, including dropped ones
    pub sentence_count: usize,
}

impl Level {
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn platform_count(&self) -> usize {
        self.platforms.len()
    }

    /// Sentences that were too short to build
    pub fn dropped_count(&self) -> usize {
        self.sentence_count - self.platforms.len()
    }

    pub fn platform(&self, index: usize) -> Option<&Platform> {
        self.platforms.get(index)
    }

    /// Lowest surface point across the level
    pub fn lowest_surface(&self) -> f32 {
        self.platforms
            .iter()
            .map(Platform::lowest_surface)
            .fold(f32::INFINITY, f32::min)
    }

    /// Where to drop the player onto platform `index`
    pub fn spawn_point(&self, index: usize, radius: f32) -> Option<Vec3> {
        let platform = self.platforms.get(index)?;
        let x = platform.left_edge() + radius.min(platform.length / 2.0);
        Some(Vec3::new(x, platform.surface_height(x) + radius * 4.0, 0.0))
    }
}

/// Lay out `sentences` as a level.
///
/// Sentences below the minimum word count are skipped and take no slot.
pub fn build_level(sentences: &[Sentence], cache: &mut GeometryCache) -> Level {
    let mut platforms = Vec::with_capacity(sentences.len());
    let mut running_x = 0.0_f32;
    let mut running_y = 0.0_f32;

    for sentence in sentences {
        if !sentence.is_playable() {
            log::debug!("Dropping short sentence {:?}", sentence.id);
            continue;
        }

        let length = platform_length(sentence.word_count);
        let center_x = running_x + length / 2.0;
        let geometry = cache.platform_geometry(length, PLATFORM_DEPTH, sentence.curviness);

        platforms.push(Platform {
            words: split_words(&sentence.text),
            length,
            curviness: sentence.curviness,
            world_position: Vec2::new(center_x, running_y),
            surface: geometry.surface,
            ribbon: RibbonMesh {
                mesh: geometry.ribbon,
                texture: TextTextureRequest::for_ribbon(&sentence.text, length),
            },
            sentence: sentence.clone(),
        });

        running_x += length + PLATFORM_GAP;
        running_y -= PLATFORM_STEP;
    }

    log::info!(
        "Built level: {} platforms from {} sentences ({} dropped), span {:.1}",
        platforms.len(),
        sentences.len(),
        sentences.len() - platforms.len(),
        running_x
    );

    Level {
        platforms,
        total_length: running_x,
        sentence_count: sentences.len(),
    }
}
