//! Player–platform contact and word progress
//!
//! Runs once per physics tick after integration. Platform heights come from
//! each surface's bound height function, which is the same curve the meshes
//! were built from.

use super::state::{GameEvent, PlayerState, WordProgress};
use crate::level::{Level, Platform};
use crate::tuning::Tuning;

/// Platform the player would stand on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Support {
    pub platform: usize,
    /// World-space surface height under the player
    pub height: f32,
}

/// Highest surface under `x` that is at or below `y + tolerance`.
///
/// Picking the highest valid surface (not the first match) keeps overlapping
/// spans correct when curve amplitude exceeds the vertical step.
pub fn find_support(level: &Level, x: f32, y: f32, tolerance: f32) -> Option<Support> {
    level
        .platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| p.spans(x))
        .map(|(i, p)| Support {
            platform: i,
            height: p.surface_height(x),
        })
        .filter(|s| s.height <= y + tolerance)
        .max_by(|a, b| a.height.total_cmp(&b.height))
}

/// Word index under `x`, clamped to the last word
pub fn word_index_at(platform: &Platform, x: f32) -> usize {
    let count = platform.word_count();
    if count == 0 {
        return 0;
    }
    let index = (platform.relative_position(x) * count as f32).floor() as usize;
    index.min(count - 1)
}

/// Resolve landing, platform changes, word progress and the perfect-surf bonus
pub fn resolve_contact(
    player: &mut PlayerState,
    level: &Level,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let radius = tuning.player_radius;
    let x = player.position.x;
    let feet = player.position.y - radius;

    let Some(support) = find_support(level, x, player.position.y, radius) else {
        if player.is_grounded || player.current_platform.is_some() {
            player.is_grounded = false;
            player.current_platform = None;
        }
        return;
    };
    player.current_platform = Some(support.platform);

    if player.velocity.y < 0.0 {
        if feet - support.height <= tuning.landing_tolerance {
            player.position.y = support.height + radius;
            player.velocity.y = 0.0;
            player.is_grounded = true;
            player.is_jumping = false;
        } else {
            player.is_grounded = false;
        }
    }

    if !player.is_grounded {
        return;
    }

    if player.last_grounded_platform != Some(support.platform) {
        player.last_grounded_platform = Some(support.platform);
        player.progress = WordProgress::At(0);
        player.platforms_visited += 1;
        log::debug!("Entered platform {}", support.platform);
        events.push(GameEvent::PlatformEntered {
            platform: support.platform,
        });
    }

    let platform = &level.platforms[support.platform];
    advance_words(player, platform, support.platform, tuning, events);
}

fn advance_words(
    player: &mut PlayerState,
    platform: &Platform,
    platform_index: usize,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let WordProgress::At(reached) = player.progress else {
        return;
    };
    let count = platform.word_count();
    if count == 0 {
        return;
    }

    let x = player.position.x;
    let index = word_index_at(platform, x);
    // Never step backwards; a word is paid for once
    for crossed in (reached + 1)..=index {
        player.score += tuning.word_score;
        events.push(GameEvent::WordCrossed {
            platform: platform_index,
            word_index: crossed,
            word: platform.words[crossed].clone(),
        });
    }
    let reached = reached.max(index);
    player.progress = WordProgress::At(reached);

    if reached == count - 1 && platform.relative_position(x) >= tuning.perfect_surf_threshold {
        let bonus = tuning.perfect_surf_bonus();
        player.score += bonus;
        player.perfect_surf_count += 1;
        player.progress = WordProgress::Completed;
        events.push(GameEvent::PerfectSurf {
            platform: platform_index,
            bonus,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryCache;
    use crate::level::{Sentence, build_level};
    use glam::Vec3;
    use proptest::prelude::*;

    fn nine_word_level() -> Level {
        let sentence = Sentence::new(
            "s0",
            "Each sentence will become a platform in the game.",
            5.0,
        );
        build_level(&[sentence], &mut GeometryCache::default())
    }

    /// Put the player on the surface at `x`, falling slightly, and resolve
    fn step_at(
        player: &mut PlayerState,
        level: &Level,
        tuning: &Tuning,
        x: f32,
        events: &mut Vec<GameEvent>,
    ) {
        let platform = &level.platforms[0];
        player.position = Vec3::new(x, platform.surface_height(x) + tuning.player_radius, 0.0);
        player.velocity.y = -1.0;
        resolve_contact(player, level, tuning, events);
    }

    #[test]
    fn test_full_traversal_pays_every_word() {
        let level = nine_word_level();
        let tuning = Tuning::default();
        let mut player = PlayerState::default();
        let mut events = Vec::new();

        let steps = 360;
        for i in 0..=steps {
            let x = 18.0 * i as f32 / steps as f32;
            step_at(&mut player, &level, &tuning, x, &mut events);
        }

        let crossed: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::WordCrossed { word_index, .. } => Some(*word_index),
                _ => None,
            })
            .collect();
        assert_eq!(crossed, (1..=8).collect::<Vec<_>>());

        let bonuses = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PerfectSurf { .. }))
            .count();
        assert_eq!(bonuses, 1);
        assert_eq!(events[0], GameEvent::PlatformEntered { platform: 0 });
        assert_eq!(player.perfect_surf_count, 1);
        assert_eq!(player.score, 8 * 10 + 50);
        assert_eq!(player.progress, WordProgress::Completed);
    }

    #[test]
    fn test_word_crossed_carries_word() {
        let level = nine_word_level();
        let tuning = Tuning::default();
        let mut player = PlayerState::default();
        let mut events = Vec::new();
        step_at(&mut player, &level, &tuning, 0.0, &mut events);
        step_at(&mut player, &level, &tuning, 2.5, &mut events);
        assert_eq!(
            events.last(),
            Some(&GameEvent::WordCrossed {
                platform: 0,
                word_index: 1,
                word: "sentence".to_string(),
            })
        );
    }

    #[test]
    fn test_knockback_does_not_rescore() {
        let level = nine_word_level();
        let tuning = Tuning::default();
        let mut player = PlayerState::default();
        let mut events = Vec::new();

        for x in [0.0, 5.0, 9.0, 3.0, 1.0, 9.5] {
            step_at(&mut player, &level, &tuning, x, &mut events);
        }
        // Indices 1..=4 once each; going back to x=3 and forward again pays nothing new
        assert_eq!(player.score, 4 * 10);
        assert_eq!(player.progress, WordProgress::At(4));
    }

    #[test]
    fn test_no_bonus_before_threshold() {
        let level = nine_word_level();
        let tuning = Tuning::default();
        let mut player = PlayerState::default();
        let mut events = Vec::new();
        // Last word starts at 16.0; 0.95 of the length is 17.1
        step_at(&mut player, &level, &tuning, 0.0, &mut events);
        step_at(&mut player, &level, &tuning, 16.5, &mut events);
        assert_eq!(player.progress, WordProgress::At(8));
        assert_eq!(player.perfect_surf_count, 0);
        step_at(&mut player, &level, &tuning, 17.2, &mut events);
        assert_eq!(player.perfect_surf_count, 1);
        step_at(&mut player, &level, &tuning, 18.0, &mut events);
        assert_eq!(player.perfect_surf_count, 1);
    }

    #[test]
    fn test_landing_requires_downward_motion() {
        let level = nine_word_level();
        let tuning = Tuning::default();
        let platform = &level.platforms[0];
        let mut player = PlayerState::default();
        let mut events = Vec::new();

        let x = 4.0;
        player.position = Vec3::new(x, platform.surface_height(x) + 0.6, 0.0);
        player.velocity.y = 3.0;
        resolve_contact(&mut player, &level, &tuning, &mut events);
        assert!(!player.is_grounded);
        assert_eq!(player.current_platform, Some(0));

        player.velocity.y = -3.0;
        resolve_contact(&mut player, &level, &tuning, &mut events);
        assert!(player.is_grounded);
        assert_eq!(player.velocity.y, 0.0);
        assert!((player.position.y - (platform.surface_height(x) + 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_falling_from_high_up_stays_airborne() {
        let level = nine_word_level();
        let tuning = Tuning::default();
        let mut player = PlayerState::default();
        let mut events = Vec::new();
        let x = 6.0;
        player.position = Vec3::new(x, level.platforms[0].surface_height(x) + 5.0, 0.0);
        player.velocity.y = -2.0;
        resolve_contact(&mut player, &level, &tuning, &mut events);
        assert!(!player.is_grounded);
        assert!(events.is_empty());
    }

    #[test]
    fn test_leaving_platform_clears_ground() {
        let level = nine_word_level();
        let tuning = Tuning::default();
        let mut player = PlayerState::default();
        let mut events = Vec::new();
        step_at(&mut player, &level, &tuning, 3.0, &mut events);
        assert!(player.is_grounded);

        player.position.x = 19.0;
        resolve_contact(&mut player, &level, &tuning, &mut events);
        assert!(!player.is_grounded);
        assert_eq!(player.current_platform, None);
        // Still remembered as the respawn point
        assert_eq!(player.last_grounded_platform, Some(0));
    }

    #[test]
    fn test_highest_surface_wins() {
        let mut level = nine_word_level();
        let mut upper = level.platforms[0].clone();
        upper.world_position.y += 2.0;
        level.platforms.push(upper);

        let x = 5.0;
        let lower_h = level.platforms[0].surface_height(x);
        let upper_h = level.platforms[1].surface_height(x);

        let support = find_support(&level, x, upper_h + 1.0, 0.5).unwrap();
        assert_eq!(support.platform, 1);
        // Below the upper surface, only the lower one qualifies
        let support = find_support(&level, x, lower_h + 1.0, 0.5).unwrap();
        assert_eq!(support.platform, 0);
        assert!(find_support(&level, x, lower_h - 1.0, 0.5).is_none());
    }

    #[test]
    fn test_entering_new_platform_resets_progress() {
        let sentences = [
            Sentence::new("a", "one two three four", 2.0),
            Sentence::new("b", "five six seven eight", 2.0),
        ];
        let level = build_level(&sentences, &mut GeometryCache::default());
        let tuning = Tuning::default();
        let mut player = PlayerState::default();
        let mut events = Vec::new();

        for x in [0.0, 7.9] {
            let p = &level.platforms[0];
            player.position = Vec3::new(x, p.surface_height(x) + 0.5, 0.0);
            player.velocity.y = -1.0;
            resolve_contact(&mut player, &level, &tuning, &mut events);
        }
        assert_eq!(player.progress, WordProgress::Completed);

        let p = &level.platforms[1];
        let x = p.left_edge() + 0.1;
        player.position = Vec3::new(x, p.surface_height(x) + 0.5, 0.0);
        player.velocity.y = -1.0;
        resolve_contact(&mut player, &level, &tuning, &mut events);
        assert_eq!(player.progress, WordProgress::At(0));
        assert_eq!(events.last(), Some(&GameEvent::PlatformEntered { platform: 1 }));
        assert_eq!(player.platforms_visited, 2);
    }

    proptest! {
        #[test]
        fn prop_word_index_monotonic(
            mut xs in proptest::collection::vec(0.0f32..=18.0, 1..60),
        ) {
            xs.sort_by(|a, b| a.total_cmp(b));
            let level = nine_word_level();
            let tuning = Tuning::default();
            let mut player = PlayerState::default();
            let mut events = Vec::new();
            let mut last = 0;
            for x in xs {
                step_at(&mut player, &level, &tuning, x, &mut events);
                let index = player.current_word_index(9);
                prop_assert!(index >= last);
                last = index;
            }
            let bonuses = events
                .iter()
                .filter(|e| matches!(e, GameEvent::PerfectSurf { .. }))
                .count();
            prop_assert!(bonuses <= 1);
        }
    }
}
