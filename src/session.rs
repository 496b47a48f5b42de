//! Game session
//!
//! Owns the level, the player and every per-run collaborator, and drives the
//! fixed timestep loop from variable frame times.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use serde::Serialize;

use crate::background::ParallaxBackground;
use crate::camera::Camera;
use crate::consts::*;
use crate::content::{
    ContentSource, LoadError, LoadedContent, NarrationQueue, Stage, StructureSource, ToneSource,
    load_content,
};
use crate::geometry::{CacheStats, GeometryCache, MeshData, front_face_offset};
use crate::level::{Level, build_level};
use crate::scene::{NodeKind, SceneGraph, Transform};
use crate::settings::Settings;
use crate::sim::{GameEvent, PlayerState, SessionPhase, TickInput, tick};
use crate::tuning::Tuning;

/// Most events held for the host between drains; older ones are dropped
pub const MAX_BUFFERED_EVENTS: usize = 256;

/// End-of-run tallies shown on the results screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub title: String,
    pub score: u64,
    pub perfect_surfs: u32,
    pub platforms_visited: u32,
    pub platform_count: usize,
    pub falls: u32,
    pub sentences_dropped: usize,
    pub completed: bool,
}

/// Scene nodes created for one level
#[derive(Debug, Clone)]
pub struct SceneHandles<H> {
    /// (surface, ribbon) per platform
    pub platforms: Vec<(H, H)>,
    pub player: H,
}

pub struct Session {
    settings: Settings,
    tuning: Tuning,
    phase: SessionPhase,
    title: String,
    level: Level,
    player: PlayerState,
    cache: GeometryCache,
    camera: Camera,
    background: ParallaxBackground,
    narration: Rc<RefCell<NarrationQueue>>,
    input: TickInput,
    accumulator: f32,
    events: Vec<GameEvent>,
    degraded: Vec<(Stage, String)>,
    load_error: Option<LoadError>,
    load_generation: u64,
}

impl Session {
    pub fn new(settings: Settings, tuning: Tuning) -> Self {
        Self {
            cache: GeometryCache::with_ribbon_quality(settings.quality.ribbon_density()),
            camera: Camera::new(glam::Vec2::ZERO, settings.reduced_motion),
            narration: Rc::new(RefCell::new(NarrationQueue::new(settings.narration))),
            phase: SessionPhase::Loading,
            title: String::new(),
            level: Level::default(),
            player: PlayerState::new(Vec3::ZERO),
            background: ParallaxBackground::default(),
            input: TickInput::default(),
            accumulator: 0.0,
            events: Vec::new(),
            degraded: Vec::new(),
            load_error: None,
            load_generation: 0,
            settings,
            tuning,
        }
    }

    /// Run the content pipeline and start the level it yields
    pub async fn load<C, S, T>(
        &mut self,
        url: &str,
        content: &C,
        structurer: &S,
        tone: &T,
    ) -> Result<(), LoadError>
    where
        C: ContentSource,
        S: StructureSource,
        T: ToneSource,
    {
        let ticket = self.begin_loading();
        let default_curviness = self.settings.default_curviness;
        match load_content(url, content, structurer, tone, default_curviness).await {
            Ok(loaded) => {
                self.finish_loading(ticket, Ok(loaded));
                Ok(())
            }
            Err(err) => {
                self.finish_loading(ticket, Err(err.clone()));
                Err(err)
            }
        }
    }

    /// Drop the current run while new content is fetched.
    ///
    /// Returns the ticket to hand to [`Session::finish_loading`]; a later call
    /// supersedes it.
    pub fn begin_loading(&mut self) -> u64 {
        self.load_generation += 1;
        self.narration.borrow_mut().stop();
        self.phase = SessionPhase::Loading;
        self.load_error = None;
        self.events.clear();
        self.input = TickInput::default();
        self.accumulator = 0.0;
        self.load_generation
    }

    /// Apply a load result unless a newer load has begun since `ticket`
    pub fn finish_loading(
        &mut self,
        ticket: u64,
        result: Result<LoadedContent, LoadError>,
    ) -> bool {
        if ticket != self.load_generation {
            log::info!(
                "Dropping stale load {} (current {})",
                ticket,
                self.load_generation
            );
            return false;
        }
        match result {
            Ok(loaded) => self.start(loaded),
            Err(err) => self.fail(err),
        }
        true
    }

    /// Build the level from loaded content and place the player
    pub fn start(&mut self, loaded: LoadedContent) {
        let level = build_level(&loaded.sentences, &mut self.cache);
        if level.is_empty() {
            self.fail(LoadError::NoPlayableSentences {
                dropped: level.sentence_count,
            });
            return;
        }

        self.background =
            ParallaxBackground::for_level(&level, &self.settings, title_seed(&loaded.title));
        self.title = loaded.title;
        self.degraded = loaded.degraded;
        self.level = level;
        self.load_error = None;
        self.reset();

        log::info!(
            "Session ready: {:?}, {} platforms, cache {:?}",
            self.title,
            self.level.platform_count(),
            self.cache.stats()
        );
    }

    /// Every fallback failed
    pub fn fail(&mut self, err: LoadError) {
        log::error!("{}", err);
        self.phase = SessionPhase::LoadFailed;
        self.load_error = Some(err);
    }

    /// Put the player back at the first platform with a fresh score
    pub fn reset(&mut self) {
        self.narration.borrow_mut().stop();
        let spawn = self
            .level
            .spawn_point(0, self.tuning.player_radius)
            .unwrap_or(Vec3::ZERO);
        self.player = PlayerState::new(spawn);
        self.camera = Camera::new(spawn.truncate(), self.settings.reduced_motion);
        self.input = TickInput::default();
        self.accumulator = 0.0;
        self.events.clear();
        if !self.level.is_empty() {
            self.phase = SessionPhase::Ready;
        }
    }

    /// Latest input intent; any input starts a ready level
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
        if self.phase == SessionPhase::Ready && (input.left || input.right || input.jump) {
            log::info!("Run started");
            self.phase = SessionPhase::Playing;
        }
    }

    /// Advance by a frame's wall time. Returns the number of ticks run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        if self.phase != SessionPhase::Playing {
            return 0;
        }

        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;
        let first_new = self.events.len();

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(
                &mut self.player,
                &self.level,
                &self.input,
                &self.tuning,
                SIM_DT,
                &mut self.events,
            );
            self.accumulator -= SIM_DT;
            substeps += 1;
            if self.player.finished {
                self.accumulator = 0.0;
                break;
            }
        }

        let new_events = &self.events[first_new..];
        self.narration
            .borrow_mut()
            .enqueue_events(new_events, &self.level);
        if new_events
            .iter()
            .any(|e| matches!(e, GameEvent::LevelComplete))
        {
            log::info!("Level complete, score {}", self.player.score);
            self.phase = SessionPhase::Complete;
        }

        if self.events.len() > MAX_BUFFERED_EVENTS {
            let excess = self.events.len() - MAX_BUFFERED_EVENTS;
            log::debug!("Event buffer full, dropping {} oldest", excess);
            self.events.drain(..excess);
        }

        self.camera
            .follow(self.player.position, self.player.velocity.x, dt);
        substeps
    }

    /// Playing and Paused swap; other phases are left alone
    pub fn toggle_pause(&mut self) -> SessionPhase {
        self.phase = match self.phase {
            SessionPhase::Playing => SessionPhase::Paused,
            SessionPhase::Paused => SessionPhase::Playing,
            other => other,
        };
        self.phase
    }

    /// Pause if playing (focus loss)
    pub fn pause(&mut self) {
        if self.phase == SessionPhase::Playing {
            log::info!("Auto-paused");
            self.phase = SessionPhase::Paused;
        }
    }

    /// Events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply changed preferences. Ribbon quality takes effect on the next load.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.narration.borrow_mut().set_enabled(settings.narration);
        self.camera.snap = settings.reduced_motion;
        self.background.frozen = settings.reduced_motion;
        if settings.quality != self.settings.quality {
            log::info!("Quality set to {}", settings.quality.as_str());
            self.cache = GeometryCache::with_ribbon_quality(settings.quality.ribbon_density());
        }
        self.settings = settings;
    }

    /// Hand every platform and the player to the scene graph
    pub fn attach_scene<G: SceneGraph>(&self, scene: &mut G) -> SceneHandles<G::Handle> {
        let ribbon_offset = front_face_offset(PLATFORM_DEPTH);
        let platforms = self
            .level
            .platforms
            .iter()
            .map(|platform| {
                let origin = platform.origin();
                let surface = scene.add_node(
                    NodeKind::PlatformSurface,
                    &platform.surface.mesh,
                    Transform::from_translation(origin),
                );
                let ribbon = scene.add_node(
                    NodeKind::TextRibbon,
                    &platform.ribbon.mesh,
                    Transform::from_translation(origin + ribbon_offset),
                );
                (surface, ribbon)
            })
            .collect();

        let player = scene.add_node(
            NodeKind::Player,
            &MeshData::quad(self.tuning.player_radius),
            Transform::from_translation(self.player.position),
        );

        SceneHandles { platforms, player }
    }

    pub fn detach_scene<G: SceneGraph>(&self, scene: &mut G, handles: SceneHandles<G::Handle>) {
        for (surface, ribbon) in handles.platforms {
            scene.remove_node(surface);
            scene.remove_node(ribbon);
        }
        scene.remove_node(handles.player);
    }

    /// Push this frame's player transform and camera
    pub fn render<G: SceneGraph>(&self, scene: &mut G, handles: &SceneHandles<G::Handle>) {
        scene.set_transform(
            handles.player,
            Transform::from_translation(self.player.position),
        );
        scene.update_camera(&self.camera);
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            title: self.title.clone(),
            score: self.player.score,
            perfect_surfs: self.player.perfect_surf_count,
            platforms_visited: self.player.platforms_visited,
            platform_count: self.level.platform_count(),
            falls: self.player.falls,
            sentences_dropped: self.level.dropped_count(),
            completed: self.phase == SessionPhase::Complete,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn background(&self) -> &ParallaxBackground {
        &self.background
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn narration(&self) -> &RefCell<NarrationQueue> {
        &self.narration
    }

    /// Shared queue for a narration driver that awaits outside the session borrow
    pub fn narration_handle(&self) -> Rc<RefCell<NarrationQueue>> {
        Rc::clone(&self.narration)
    }

    pub fn degraded_stages(&self) -> &[(Stage, String)] {
        &self.degraded
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// FNV-1a of the title, so an article always gets the same backdrop
fn title_seed(title: &str) -> u64 {
    title.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{
        Offline, RawArticle, SpeakText, StaticArticle, drain_narration, narrate_next,
    };
    use crate::scene::recording::RecordingScene;

    const FRAME: f32 = 1.0 / 60.0;

    fn loaded_session() -> Session {
        let mut session = Session::new(Settings::default(), Tuning::default());
        pollster::block_on(session.load("offline://", &Offline, &Offline, &Offline))
            .expect("placeholder article is playable");
        session
    }

    fn run_right(session: &mut Session) {
        session.set_input(TickInput {
            right: true,
            ..TickInput::default()
        });
    }

    #[test]
    fn test_offline_load_uses_every_fallback() {
        let session = loaded_session();
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.degraded_stages().len(), 3);
        assert!(session.level().platform_count() >= 4);
        assert!(session.load_error().is_none());
        assert!(!session.background().layers.is_empty());
    }

    #[test]
    fn test_unplayable_article_fails_load() {
        let article = StaticArticle(RawArticle {
            title: "Short".into(),
            text: "Hi. Go now.".into(),
        });
        let mut session = Session::new(Settings::default(), Tuning::default());
        let result = pollster::block_on(session.load("pasted", &article, &Offline, &Offline));

        assert!(result.is_err());
        assert_eq!(session.phase(), SessionPhase::LoadFailed);
        assert!(session.load_error().is_some());
        assert!(session.level().is_empty());
    }

    #[test]
    fn test_ready_waits_for_input() {
        let mut session = loaded_session();
        assert_eq!(session.frame(FRAME), 0);
        run_right(&mut session);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert!(session.frame(FRAME) > 0);
    }

    #[test]
    fn test_frame_time_is_capped() {
        let mut session = loaded_session();
        run_right(&mut session);
        let ticks = session.frame(5.0);
        assert!(ticks <= MAX_SUBSTEPS);
        assert!(ticks >= MAX_SUBSTEPS - 1);
    }

    #[test]
    fn test_pause_freezes_ticks() {
        let mut session = loaded_session();
        run_right(&mut session);
        session.frame(FRAME);
        assert_eq!(session.toggle_pause(), SessionPhase::Paused);

        let before = session.player().position;
        assert_eq!(session.frame(0.1), 0);
        assert_eq!(session.player().position, before);

        assert_eq!(session.toggle_pause(), SessionPhase::Playing);
        assert!(session.frame(FRAME) > 0);
    }

    #[test]
    fn test_run_to_completion() {
        let mut session = loaded_session();
        run_right(&mut session);

        let mut frames = 0;
        while session.phase() == SessionPhase::Playing && frames < 60 * 120 {
            session.frame(FRAME);
            frames += 1;
        }

        assert_eq!(session.phase(), SessionPhase::Complete);
        let summary = session.summary();
        assert!(summary.completed);
        assert!(summary.score > 0);
        assert!(summary.platforms_visited >= 1);
        assert!(session.narration().borrow().pending_len() > 0);

        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelComplete)));
        assert!(session.drain_events().is_empty());

        // Complete is terminal until reset
        assert_eq!(session.frame(FRAME), 0);
    }

    #[test]
    fn test_reset_clears_run() {
        let mut session = loaded_session();
        run_right(&mut session);
        for _ in 0..240 {
            session.frame(FRAME);
        }
        let generation = session.narration().borrow().generation();

        session.reset();
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.player().score, 0);
        assert!(session.drain_events().is_empty());
        let narration = session.narration().borrow();
        assert_eq!(narration.pending_len(), 0);
        assert!(narration.generation() > generation);
    }

    #[test]
    fn test_scene_attach_render_detach() {
        let session = loaded_session();
        let mut scene = RecordingScene::default();

        let handles = session.attach_scene(&mut scene);
        assert_eq!(handles.platforms.len(), session.level().platform_count());
        assert_eq!(scene.live_nodes(), handles.platforms.len() * 2 + 1);

        let first = &session.level().platforms[0];
        let (surface, ribbon) = handles.platforms[0];
        let surface_node = scene.nodes[surface].expect("surface node");
        let ribbon_node = scene.nodes[ribbon].expect("ribbon node");
        assert_eq!(surface_node.0, NodeKind::PlatformSurface);
        assert_eq!(surface_node.2.translation, first.origin());
        assert!(ribbon_node.2.translation.z > surface_node.2.translation.z);

        session.render(&mut scene, &handles);
        assert_eq!(scene.camera_updates, 1);
        let player_node = scene.nodes[handles.player].expect("player node");
        assert_eq!(player_node.2.translation, session.player().position);

        session.detach_scene(&mut scene, handles);
        assert_eq!(scene.live_nodes(), 0);
    }

    #[test]
    fn test_narration_follows_settings() {
        let mut session = loaded_session();
        session.apply_settings(Settings {
            narration: false,
            reduced_motion: true,
            ..Settings::default()
        });
        run_right(&mut session);
        for _ in 0..120 {
            session.frame(FRAME);
        }
        assert_eq!(session.narration().borrow().pending_len(), 0);
        assert!(session.camera().snap);
        assert!(session.background().frozen);
    }

    #[test]
    fn test_queued_narration_is_consumed() {
        let mut session = loaded_session();
        run_right(&mut session);
        let queue = session.narration_handle();
        let mut spoken = Vec::new();
        for _ in 0..240 {
            session.frame(FRAME);
            spoken.extend(pollster::block_on(drain_narration(&queue, &SpeakText)));
            assert_eq!(queue.borrow().pending_len(), 0);
        }

        let first_sentence = &session.level().platforms[0].sentence.text;
        assert_eq!(spoken.first().map(|r| &r.request.text), Some(first_sentence));
        assert!(spoken.len() > 1);
        assert!(queue.borrow().is_idle());
    }

    #[test]
    fn test_narration_driver_survives_reset() {
        let mut session = loaded_session();
        run_right(&mut session);
        for _ in 0..120 {
            session.frame(FRAME);
        }
        let queue = session.narration_handle();
        let job = queue.borrow_mut().next_job().expect("platform entry queued");

        session.reset();
        assert!(queue.borrow_mut().complete(job, Ok(Default::default())).is_none());
        assert!(pollster::block_on(narrate_next(&queue, &SpeakText)).is_none());
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let mut session = Session::new(Settings::default(), Tuning::default());
        let stale = session.begin_loading();
        let current = session.begin_loading();
        assert_ne!(stale, current);

        let superseded = Err(LoadError::NoPlayableSentences { dropped: 0 });
        assert!(!session.finish_loading(stale, superseded));
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.load_error().is_none());

        let loaded = pollster::block_on(load_content(
            "offline://",
            &Offline,
            &Offline,
            &Offline,
            DEFAULT_CURVINESS,
        ))
        .expect("placeholder article is playable");
        assert!(session.finish_loading(current, Ok(loaded)));
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_undrained_events_are_bounded() {
        let mut session = loaded_session();
        run_right(&mut session);
        session.events = vec![GameEvent::Jumped; MAX_BUFFERED_EVENTS + 40];
        session.frame(FRAME);
        assert_eq!(session.events.len(), MAX_BUFFERED_EVENTS);

        // A full level without draining stays under the cap
        let mut frames = 0;
        while session.phase() == SessionPhase::Playing && frames < 60 * 120 {
            session.frame(FRAME);
            frames += 1;
        }
        assert!(session.drain_events().len() <= MAX_BUFFERED_EVENTS);
    }

    #[test]
    fn test_title_seed_is_stable() {
        assert_eq!(title_seed("Sentence Surf"), title_seed("Sentence Surf"));
        assert_ne!(title_seed("a"), title_seed("b"));
    }
}
