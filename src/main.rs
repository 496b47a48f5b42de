//! Sentence Surf entry point
//!
//! The web build exposes the session to the page's JavaScript. The native
//! build runs a headless autopilot over an article and prints the results.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use sentence_surf::content::narration::MAX_PENDING;
    use sentence_surf::content::{
        Offline, RawArticle, SpeakText, StaticArticle, drain_narration, load_content,
    };
    use sentence_surf::renderer::{RenderError, RenderState};
    use sentence_surf::session::SceneHandles;
    use sentence_surf::sim::TickInput;
    use sentence_surf::{QualityPreset, Session, Settings, Tuning};

    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::warn!("Logger already initialized");
        }
        log::info!("Sentence Surf starting...");
    }

    /// Canvas renderer and the scene nodes of the level it shows
    struct View {
        state: RenderState,
        handles: Option<SceneHandles<usize>>,
    }

    async fn create_render_state(canvas: HtmlCanvasElement) -> Result<RenderState, String> {
        let (width, height) = (canvas.width(), canvas.height());
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| format!("could not create surface: {}", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| format!("no adapter: {}", e))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e: RenderError| e.to_string())
    }

    /// Session handle for the page
    #[wasm_bindgen]
    pub struct WebGame {
        session: Rc<RefCell<Session>>,
        view: Rc<RefCell<Option<View>>>,
        /// Narration text waiting for the page's speech engine
        spoken: Rc<RefCell<VecDeque<String>>>,
    }

    #[wasm_bindgen]
    impl WebGame {
        #[wasm_bindgen(constructor)]
        pub fn new() -> WebGame {
            WebGame {
                session: Rc::new(RefCell::new(Session::new(
                    Settings::load(),
                    Tuning::default(),
                ))),
                view: Rc::new(RefCell::new(None)),
                spoken: Rc::new(RefCell::new(VecDeque::new())),
            }
        }

        /// Start drawing into `canvas` once a WebGPU device is ready
        pub fn attach_canvas(&self, canvas: HtmlCanvasElement) {
            let view = self.view.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match create_render_state(canvas).await {
                    Ok(state) => {
                        *view.borrow_mut() = Some(View {
                            state,
                            handles: None,
                        })
                    }
                    Err(e) => log::error!("Rendering unavailable: {}", e),
                }
            });
        }

        pub fn resize(&self, width: u32, height: u32) {
            if let Some(view) = self.view.borrow_mut().as_mut() {
                view.state.resize(width, height);
            }
        }

        /// Build a level from pasted article text. Completes asynchronously;
        /// poll `phase()` for Ready or LoadFailed. A newer call supersedes
        /// one still in progress.
        pub fn load_article(&self, title: String, text: String) {
            self.detach_view();
            let (ticket, default_curviness) = {
                let mut session = self.session.borrow_mut();
                let ticket = session.begin_loading();
                (ticket, session.settings().default_curviness)
            };
            self.spoken.borrow_mut().clear();
            let session = self.session.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let article = StaticArticle(RawArticle { title, text });
                let result =
                    load_content("pasted", &article, &Offline, &Offline, default_curviness).await;
                session.borrow_mut().finish_loading(ticket, result);
            });
        }

        pub fn set_input(&self, left: bool, right: bool, jump: bool) {
            self.session
                .borrow_mut()
                .set_input(TickInput { left, right, jump });
        }

        /// Advance by `dt` seconds of wall time, then narrate and draw
        pub fn frame(&self, dt: f32) -> u32 {
            let ticks = self.session.borrow_mut().frame(dt);
            self.pump_narration();
            self.draw();
            ticks
        }

        /// Next line for the page to speak, if any
        pub fn take_spoken_text(&self) -> Option<String> {
            self.spoken.borrow_mut().pop_front()
        }

        pub fn toggle_pause(&self) -> String {
            format!("{:?}", self.session.borrow_mut().toggle_pause())
        }

        /// Tab hidden or window blurred
        pub fn pause(&self) {
            self.session.borrow_mut().pause();
        }

        pub fn reset(&self) {
            self.session.borrow_mut().reset();
            self.spoken.borrow_mut().clear();
        }

        pub fn phase(&self) -> String {
            format!("{:?}", self.session.borrow().phase())
        }

        pub fn score(&self) -> f64 {
            self.session.borrow().player().score as f64
        }

        pub fn player_x(&self) -> f32 {
            self.session.borrow().player().position.x
        }

        pub fn player_y(&self) -> f32 {
            self.session.borrow().player().position.y
        }

        pub fn camera_x(&self) -> f32 {
            self.session.borrow().camera().target.x
        }

        pub fn camera_y(&self) -> f32 {
            self.session.borrow().camera().target.y
        }

        /// Events since the last call, as a JSON array
        pub fn drain_events_json(&self) -> String {
            let events = self.session.borrow_mut().drain_events();
            serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_owned())
        }

        pub fn summary_json(&self) -> String {
            serde_json::to_string(&self.session.borrow().summary())
                .unwrap_or_else(|_| "{}".to_owned())
        }

        /// Switch quality preset by name; false if the name is unknown
        pub fn set_quality(&self, name: &str) -> bool {
            let Some(quality) = QualityPreset::from_str(name) else {
                return false;
            };
            let settings = Settings {
                quality,
                ..self.session.borrow().settings().clone()
            };
            settings.save();
            self.session.borrow_mut().apply_settings(settings);
            true
        }

        pub fn settings_json(&self) -> String {
            self.session.borrow().settings().to_json()
        }

        /// Replace settings from the options menu and persist them
        pub fn apply_settings_json(&self, json: &str) -> Result<(), JsValue> {
            let settings =
                Settings::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
            settings.save();
            self.session.borrow_mut().apply_settings(settings);
            Ok(())
        }
    }

    impl WebGame {
        /// Hand queued narration to the speech driver
        fn pump_narration(&self) {
            let queue = self.session.borrow().narration_handle();
            if queue.borrow().pending_len() == 0 {
                return;
            }
            let spoken = self.spoken.clone();
            wasm_bindgen_futures::spawn_local(async move {
                for ready in drain_narration(&queue, &SpeakText).await {
                    let mut spoken = spoken.borrow_mut();
                    if spoken.len() >= MAX_PENDING {
                        spoken.pop_front();
                    }
                    spoken.push_back(String::from_utf8_lossy(&ready.clip.data).into_owned());
                }
            });
        }

        fn draw(&self) {
            let session = self.session.borrow();
            let mut view = self.view.borrow_mut();
            let Some(View { state, handles }) = view.as_mut() else {
                return;
            };

            if handles.is_none() && session.phase().shows_level() {
                *handles = Some(session.attach_scene(&mut state.scene));
                log::info!("Scene holds {} nodes", state.scene.live_nodes());
            }
            if let Some(handles) = handles.as_ref() {
                session.render(&mut state.scene, handles);
            }

            match state.render() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    state.resize(state.size.0, state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Drop the current level's nodes before a new level is built
        fn detach_view(&self) {
            let session = self.session.borrow();
            if let Some(View { state, handles }) = self.view.borrow_mut().as_mut() {
                if let Some(handles) = handles.take() {
                    session.detach_scene(&mut state.scene, handles);
                }
            }
        }
    }

    impl Default for WebGame {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use sentence_surf::content::{Offline, RawArticle, SpeakText, StaticArticle, drain_narration};
    use sentence_surf::sim::{SessionPhase, TickInput};
    use sentence_surf::{Session, Settings, Tuning};

    /// Ten minutes of play at 60 fps
    const MAX_FRAMES: u32 = 60 * 600;

    env_logger::init();
    log::info!("Sentence Surf (native) starting...");
    log::info!("Native mode runs headless; the interactive game is the wasm build");

    let tuning = match std::env::var("SENTENCE_SURF_TUNING") {
        Ok(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring {}: {}", path, e);
                Tuning::default()
            }
        },
        Err(_) => Tuning::default(),
    };

    let mut session = Session::new(Settings::load(), tuning);

    let result = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(text) => {
                let article = StaticArticle(RawArticle {
                    title: path.clone(),
                    text,
                });
                pollster::block_on(session.load(&path, &article, &Offline, &Offline))
            }
            Err(e) => {
                eprintln!("Could not read {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => pollster::block_on(session.load("placeholder", &Offline, &Offline, &Offline)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    println!(
        "\nSurfing {} platforms...",
        session.level().platform_count()
    );
    session.set_input(TickInput {
        right: true,
        ..TickInput::default()
    });

    let mut frames = 0;
    let mut narrated = 0;
    while session.phase() == SessionPhase::Playing && frames < MAX_FRAMES {
        session.frame(1.0 / 60.0);
        for ready in pollster::block_on(drain_narration(session.narration(), &SpeakText)) {
            log::debug!("Narrate: {}", String::from_utf8_lossy(&ready.clip.data));
            narrated += 1;
        }
        frames += 1;
    }
    log::info!("{} frames, {} lines narrated", frames, narrated);

    for event in session.drain_events() {
        log::debug!("{:?}", event);
    }

    let summary = session.summary();
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Could not format summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
