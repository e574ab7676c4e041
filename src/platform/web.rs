//! Browser binding (wasm32)
//!
//! `WebGame` mounts one session in the page. Frames come from
//! `requestAnimationFrame`, device events are forwarded by the host page, and
//! final scores go to a JS callback and the LocalStorage leaderboard.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{DisplaySurface, FrameScheduler};
use crate::games::GameKind;
use crate::highscores::HighScores;
use crate::input::{InputEvent, Key};
use crate::lifecycle::{ScoreSink, Session};
use crate::settings::Settings;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
}

/// `requestAnimationFrame` scheduler
#[derive(Default)]
pub struct RafScheduler {
    callback: Option<js_sys::Function>,
    handle: Option<i32>,
}

impl RafScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&mut self, callback: js_sys::Function) {
        self.callback = Some(callback);
    }

    /// The browser ran our callback; the handle is spent
    pub fn frame_fired(&mut self) {
        self.handle = None;
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let (Some(window), Some(callback)) = (web_sys::window(), self.callback.as_ref()) else {
            log::warn!("No window or frame callback; frame not scheduled");
            return;
        };
        match window.request_animation_frame(callback) {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.cancel_animation_frame(handle) {
                    log::warn!("cancelAnimationFrame failed: {:?}", e);
                }
            }
        }
    }
}

/// Forwards final scores to the page and keeps the local leaderboard
pub struct JsScoreSink {
    callback: Option<js_sys::Function>,
    scores: HighScores,
}

impl JsScoreSink {
    pub fn new(callback: Option<js_sys::Function>) -> Self {
        Self {
            callback,
            scores: HighScores::load(),
        }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }
}

impl ScoreSink for JsScoreSink {
    fn submit_score(&mut self, game_type: &str, score: u64, elapsed_secs: Option<f32>) {
        self.scores.submit_score(game_type, score, elapsed_secs);

        if let Some(callback) = &self.callback {
            let elapsed = elapsed_secs
                .map(|secs| JsValue::from_f64(secs as f64))
                .unwrap_or(JsValue::UNDEFINED);
            if let Err(e) = callback.call3(
                &JsValue::NULL,
                &JsValue::from_str(game_type),
                &JsValue::from_f64(score as f64),
                &elapsed,
            ) {
                log::warn!("Score callback failed: {:?}", e);
            }
        }
    }
}

type WebSession = Session<JsScoreSink, RafScheduler>;

/// One mounted game, driven from JavaScript
#[wasm_bindgen]
pub struct WebGame {
    session: Rc<RefCell<WebSession>>,
    surface: DisplaySurface,
    settings: Settings,
    _frame: Closure<dyn FnMut(f64)>,
}

#[wasm_bindgen]
impl WebGame {
    /// Mount `game_type` ("brick-breaker", "space-invaders" or "cricket")
    #[wasm_bindgen(constructor)]
    pub fn new(
        game_type: &str,
        tuning_json: Option<String>,
        on_score: Option<js_sys::Function>,
    ) -> Result<WebGame, JsValue> {
        let kind = GameKind::from_game_type(game_type)
            .ok_or_else(|| JsValue::from_str(&format!("unknown game type: {game_type}")))?;
        let tuning = tuning_json
            .as_deref()
            .map(Tuning::load_or_default)
            .unwrap_or_default();
        let settings = Settings::load();
        let session = Rc::new(RefCell::new(Session::new(
            kind,
            tuning,
            &settings,
            JsScoreSink::new(on_score),
            RafScheduler::new(),
        )));

        let weak: Weak<RefCell<WebSession>> = Rc::downgrade(&session);
        let frame = Closure::<dyn FnMut(f64)>::new(move |_time: f64| {
            let Some(session) = weak.upgrade() else {
                return;
            };
            let Ok(mut session) = session.try_borrow_mut() else {
                log::trace!("Frame skipped: session busy");
                return;
            };
            session.scheduler_mut().frame_fired();
            session.frame();
        });
        session
            .borrow_mut()
            .scheduler_mut()
            .set_callback(frame.as_ref().unchecked_ref::<js_sys::Function>().clone());

        log::info!("Mounted {}", kind.game_type());
        Ok(WebGame {
            session,
            surface: DisplaySurface::new(),
            settings,
            _frame: frame,
        })
    }

    /// Display size of the canvas, for pointer and touch mapping
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        self.surface.resize(width, height)
    }

    /// Current preferences as JSON
    pub fn settings(&self) -> Result<String, JsValue> {
        self.settings
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace preferences from JSON, persist them and apply them to the session
    pub fn set_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        settings.save();
        self.with_session(|s| s.apply_settings(&settings))
            .ok_or_else(|| JsValue::from_str("session busy"))?;
        log::info!("Settings updated ({} quality)", settings.quality.as_str());
        self.settings = settings;
        Ok(())
    }

    /// Start or replay; `seed` defaults to the current time
    pub fn start(&self, seed: Option<f64>) -> bool {
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        self.with_session(|s| s.start(seed)).unwrap_or(false)
    }

    pub fn stop(&self) {
        self.with_session(|s| s.stop());
    }

    pub fn unmount(&self) {
        self.with_session(|s| s.unmount());
    }

    pub fn pause(&self) -> bool {
        self.with_session(|s| s.pause()).unwrap_or(false)
    }

    pub fn resume(&self) -> bool {
        self.with_session(|s| s.resume()).unwrap_or(false)
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        if let Some(surface) = self.sized() {
            self.input(InputEvent::PointerMove { x, y, surface });
        }
    }

    pub fn pointer_down(&self, x: f32, y: f32) {
        if let Some(surface) = self.sized() {
            self.input(InputEvent::PointerDown { x, y, surface });
        }
    }

    pub fn pointer_up(&self) {
        self.input(InputEvent::PointerUp);
    }

    pub fn touch_start(&self, x: f32, y: f32) {
        if let Some(surface) = self.sized() {
            self.input(InputEvent::TouchStart { x, y, surface });
        }
    }

    pub fn touch_move(&self, x: f32, y: f32) {
        if let Some(surface) = self.sized() {
            self.input(InputEvent::TouchMove { x, y, surface });
        }
    }

    pub fn touch_end(&self) {
        self.input(InputEvent::TouchEnd);
    }

    /// `code` is a `KeyboardEvent.code`
    pub fn key_down(&self, code: &str, repeat: bool) {
        self.input(InputEvent::KeyDown {
            key: Key::from_code(code),
            repeat,
        });
    }

    pub fn key_up(&self, code: &str) {
        self.input(InputEvent::KeyUp {
            key: Key::from_code(code),
        });
    }

    /// Interleaved `[x, y, r, g, b, a]` vertices in board units
    pub fn vertices(&self) -> Vec<f32> {
        self.session
            .try_borrow()
            .map(|s| bytemuck::cast_slice::<_, f32>(&s.render().vertices).to_vec())
            .unwrap_or_default()
    }

    /// Current screen slot as JSON
    pub fn screen(&self) -> Result<String, JsValue> {
        let session = self
            .session
            .try_borrow()
            .map_err(|_| JsValue::from_str("session busy"))?;
        serde_json::to_string(&session.screen()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// This game's local leaderboard as JSON
    pub fn leaderboard(&self) -> Result<String, JsValue> {
        let session = self
            .session
            .try_borrow()
            .map_err(|_| JsValue::from_str("session busy"))?;
        let game_type = session.kind().game_type();
        let board = session.sink().scores().board(game_type).cloned().unwrap_or_default();
        serde_json::to_string(&board).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebGame {
    fn with_session<R>(&self, f: impl FnOnce(&mut WebSession) -> R) -> Option<R> {
        match self.session.try_borrow_mut() {
            Ok(mut session) => Some(f(&mut session)),
            Err(_) => {
                log::debug!("Call ignored: session busy");
                None
            }
        }
    }

    /// Surface size for pointer mapping; None until `resize` has run
    fn sized(&self) -> Option<Vec2> {
        let size = self.surface.size();
        if size.is_none() {
            log::trace!("Pointer event before resize ignored");
        }
        size
    }

    fn input(&self, event: InputEvent) {
        self.with_session(|s| s.handle_input(event));
    }
}

impl Drop for WebGame {
    fn drop(&mut self) {
        self.with_session(|s| s.unmount());
    }
}
