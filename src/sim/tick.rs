//! Fixed timestep simulation tick
//!
//! Advances the player through the level deterministically: input, gravity,
//! integration, then platform contact.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, PlayerState, WordProgress};
use super::traversal::resolve_contact;
use crate::level::Level;
use crate::tuning::Tuning;

/// Input intent for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Only honoured while grounded
    pub jump: bool,
}

impl TickInput {
    /// -1, 0 or 1
    pub fn direction(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Advance the player by one fixed timestep, appending any events
pub fn tick(
    player: &mut PlayerState,
    level: &Level,
    input: &TickInput,
    tuning: &Tuning,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    if level.is_empty() {
        return;
    }

    player.velocity.x = input.direction() * tuning.run_speed;

    if input.jump && player.is_grounded {
        player.velocity.y = tuning.jump_velocity;
        player.is_grounded = false;
        player.is_jumping = true;
        events.push(GameEvent::Jumped);
    }

    player.velocity.y -= tuning.gravity * dt;
    player.position += player.velocity * dt;
    // Nothing to the left of the first platform
    player.position.x = player.position.x.max(0.0);

    resolve_contact(player, level, tuning, events);

    if player.position.y < level.lowest_surface() - tuning.fall_out_distance {
        respawn(player, level, tuning, events);
        return;
    }

    check_level_complete(player, level, events);
}

/// Put a fallen player back over the last platform they stood on
fn respawn(player: &mut PlayerState, level: &Level, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    let index = player.last_grounded_platform.unwrap_or(0);
    let Some(spawn) = level.spawn_point(index, tuning.player_radius) else {
        return;
    };
    player.falls += 1;
    player.respawn(spawn);
    log::info!("Fell out of the level, respawning on platform {}", index);
    events.push(GameEvent::FellOut {
        respawn_platform: index,
    });
}

fn check_level_complete(player: &mut PlayerState, level: &Level, events: &mut Vec<GameEvent>) {
    if player.finished {
        return;
    }
    let last_index = level.platform_count() - 1;
    let Some(last) = level.platform(last_index) else {
        return;
    };

    let surfed_to_end = player.is_grounded
        && player.last_grounded_platform == Some(last_index)
        && player.progress == WordProgress::Completed;
    let passed_end = player.position.x > last.right_edge();

    if surfed_to_end || passed_end {
        player.finished = true;
        log::info!("Level complete with score {}", player.score);
        events.push(GameEvent::LevelComplete);
    }
}
