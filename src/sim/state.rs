//! Player state and simulation events

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Where the run as a whole stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for the content pipeline
    Loading,
    /// Level built, player placed, waiting for the first input
    Ready,
    /// Active gameplay
    Playing,
    /// Tick execution frozen
    Paused,
    /// Player reached the end of the level
    Complete,
    /// Every fallback failed; back to the pre-game screen
    LoadFailed,
}

impl SessionPhase {
    /// Whether a built level is on screen
    pub fn shows_level(&self) -> bool {
        !matches!(self, SessionPhase::Loading | SessionPhase::LoadFailed)
    }
}

/// Progress through the words of the platform being surfed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordProgress {
    /// Highest word index reached on the current platform
    At(usize),
    /// Perfect-surf bonus paid; nothing more to award on this platform
    Completed,
}

impl WordProgress {
    /// Word index for display; `Completed` maps to the last word
    pub fn index(&self, word_count: usize) -> usize {
        match self {
            WordProgress::At(i) => *i,
            WordProgress::Completed => word_count.saturating_sub(1),
        }
    }
}

impl Default for WordProgress {
    fn default() -> Self {
        WordProgress::At(0)
    }
}

/// Notifications for narration, UI and audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Grounded on a platform different from the previous one
    PlatformEntered { platform: usize },
    /// Word index advanced to `word_index`
    WordCrossed {
        platform: usize,
        word_index: usize,
        word: String,
    },
    /// Reached the last word at the far end of a platform
    PerfectSurf { platform: usize, bonus: u64 },
    /// Left the ground by jumping
    Jumped,
    /// Dropped below the level and was put back
    FellOut { respawn_platform: usize },
    /// Finished the last platform
    LevelComplete,
}

/// Player avatar state, mutated once per physics tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub is_grounded: bool,
    pub is_jumping: bool,
    /// Platform index the player is currently over, if any
    pub current_platform: Option<usize>,
    /// Platform index the player last stood on (respawn point)
    pub last_grounded_platform: Option<usize>,
    pub progress: WordProgress,
    pub score: u64,
    pub perfect_surf_count: u32,
    /// Distinct platforms landed on
    pub platforms_visited: u32,
    pub falls: u32,
    /// Level finished; completion is reported once
    pub finished: bool,
}

impl PlayerState {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            is_grounded: false,
            is_jumping: false,
            current_platform: None,
            last_grounded_platform: None,
            progress: WordProgress::default(),
            score: 0,
            perfect_surf_count: 0,
            platforms_visited: 0,
            falls: 0,
            finished: false,
        }
    }

    /// Current word index, or 0 when not on a platform
    pub fn current_word_index(&self, word_count: usize) -> usize {
        self.progress.index(word_count)
    }

    /// Put the player back in the air at `spawn`, keeping the run's tallies
    pub fn respawn(&mut self, spawn: Vec3) {
        self.position = spawn;
        self.velocity = Vec3::ZERO;
        self.is_grounded = false;
        self.is_jumping = false;
        self.current_platform = None;
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}
