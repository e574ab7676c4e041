//! Game lifecycle controller
//!
//! A `Session` owns one simulation, the input adapter, the frame scheduler and
//! the score sink. It runs exactly one tick per frame callback while Playing and
//! submits the final score exactly once when a session ends.
//!
//! ```text
//! Idle --start--> Playing --terminal / stop--> GameOver --start--> Playing
//!                    |  ^
//!              pause |  | resume
//!                    v  |
//!                  (paused)
//! ```

use crate::consts::SIM_DT;
use crate::games::GameKind;
use crate::input::{InputAdapter, InputEvent};
use crate::platform::{FrameScheduler, ManualScheduler};
use crate::renderer::{Frame, Screen, build_frame};
use crate::settings::Settings;
use crate::sim::{GamePhase, SimState, Simulation};
use crate::tuning::Tuning;

/// Receives the final score of every finished session
pub trait ScoreSink {
    fn submit_score(&mut self, game_type: &str, score: u64, elapsed_secs: Option<f32>);
}

impl<F> ScoreSink for F
where
    F: FnMut(&str, u64, Option<f32>),
{
    fn submit_score(&mut self, game_type: &str, score: u64, elapsed_secs: Option<f32>) {
        self(game_type, score, elapsed_secs)
    }
}

/// One mounted game
pub struct Session<S: ScoreSink, F: FrameScheduler> {
    sim: Simulation,
    input: InputAdapter,
    sink: S,
    scheduler: F,
    frame_pending: bool,
    paused: bool,
}

impl<S: ScoreSink, F: FrameScheduler> Session<S, F> {
    pub fn new(
        kind: GameKind,
        tuning: Tuning,
        settings: &Settings,
        sink: S,
        scheduler: F,
    ) -> Self {
        let sim = Simulation::new(kind, tuning, settings.emitter_config(), 0);
        let input = InputAdapter::new(sim.state.board);
        Self {
            sim,
            input,
            sink,
            scheduler,
            frame_pending: false,
            paused: false,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.sim.kind()
    }

    pub fn phase(&self) -> GamePhase {
        self.sim.phase()
    }

    pub fn state(&self) -> &SimState {
        &self.sim.state
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    /// Presentational slot for the current phase
    pub fn screen(&self) -> Screen {
        Screen::for_simulation(&self.sim)
    }

    /// Draw list for the current state
    pub fn render(&self) -> Frame {
        build_frame(&self.sim.state)
    }

    /// Begin a fresh session; ignored while Playing
    pub fn start(&mut self, seed: u64) -> bool {
        if self.sim.phase() == GamePhase::Playing {
            log::debug!("Start ignored: {} already playing", self.kind().game_type());
            return false;
        }
        self.cancel();
        self.sim.start(seed);
        self.input.reset();
        self.paused = false;
        self.schedule();
        true
    }

    /// Frame callback: one tick if a frame is pending and the game is Playing
    pub fn frame(&mut self) -> bool {
        if !self.frame_pending {
            log::trace!("Stray frame ignored");
            return false;
        }
        self.frame_pending = false;
        if self.sim.phase() != GamePhase::Playing || self.paused {
            return false;
        }

        let intent = self.input.sample();
        self.sim.tick(&intent, SIM_DT);

        if self.sim.phase() == GamePhase::GameOver {
            self.scheduler.cancel_frame();
            self.submit();
        } else {
            self.schedule();
        }
        true
    }

    /// End a Playing session now and submit its score; idempotent
    pub fn stop(&mut self) {
        self.cancel();
        self.paused = false;
        if self.sim.end() {
            self.submit();
        }
    }

    /// Leave without submitting (the host is going away); idempotent
    pub fn unmount(&mut self) {
        self.cancel();
        self.paused = false;
        self.sim.abandon();
        self.input.reset();
    }

    /// Apply new player preferences; gameplay is unaffected
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sim.set_emitter_config(settings.emitter_config());
    }

    /// Suspend the loop, staying Playing
    pub fn pause(&mut self) -> bool {
        if self.paused || self.sim.phase() != GamePhase::Playing {
            return false;
        }
        self.paused = true;
        self.cancel();
        log::info!("Paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused || self.sim.phase() != GamePhase::Playing {
            return false;
        }
        self.paused = false;
        self.input.reset();
        self.schedule();
        log::info!("Resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Forward a device event to the adapter while Playing
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.sim.phase() != GamePhase::Playing || self.paused {
            log::trace!("Input ignored outside play");
            return;
        }
        self.input.handle(event);
    }

    fn schedule(&mut self) {
        self.frame_pending = true;
        self.scheduler.request_frame();
    }

    fn cancel(&mut self) {
        self.frame_pending = false;
        self.scheduler.cancel_frame();
    }

    fn submit(&mut self) {
        let game_type = self.kind().game_type();
        let score = self.sim.state.score();
        let elapsed = self.sim.reported_elapsed();
        log::info!("Submitting {} score {} (elapsed {:?})", game_type, score, elapsed);
        self.sink.submit_score(game_type, score, elapsed);
    }
}

impl<S: ScoreSink> Session<S, ManualScheduler> {
    /// Run the pending frame, if any (virtual time)
    pub fn pump(&mut self) -> bool {
        if self.scheduler.take_frame() {
            self.frame()
        } else {
            false
        }
    }

    /// Pump up to `frames` frames; returns how many ticked
    pub fn run_frames(&mut self, frames: u64) -> u64 {
        let mut ticked = 0;
        for _ in 0..frames {
            if !self.pump() {
                break;
            }
            ticked += 1;
        }
        ticked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Intent, Key};
    use crate::sim::MoverKind;
    use glam::Vec2;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<(String, u64, Option<f32>)>,
    }

    impl ScoreSink for Recorder {
        fn submit_score(&mut self, game_type: &str, score: u64, elapsed_secs: Option<f32>) {
            self.calls.push((game_type.to_string(), score, elapsed_secs));
        }
    }

    fn session(kind: GameKind) -> Session<Recorder, ManualScheduler> {
        Session::new(
            kind,
            Tuning::default(),
            &Settings::default(),
            Recorder::default(),
            ManualScheduler::new(),
        )
    }

    fn press(session: &mut Session<Recorder, ManualScheduler>) {
        session.handle_input(InputEvent::KeyDown {
            key: Key::Action,
            repeat: false,
        });
        session.handle_input(InputEvent::KeyUp { key: Key::Action });
    }

    /// Launch the ball and aim it out through the loss edge
    fn lose_ball(session: &mut Session<Recorder, ManualScheduler>) {
        press(session);
        session.pump();
        for entity in session.sim.state.entities.iter_mut() {
            if entity.is_live_mover(MoverKind::Ball) {
                entity.pos = Vec2::new(10.0, 638.0);
                entity.vel = Vec2::new(0.0, 400.0);
            }
        }
    }

    #[test]
    fn test_start_schedules_first_frame() {
        let mut s = session(GameKind::BrickBreaker);
        assert_eq!(s.phase(), GamePhase::Idle);
        assert!(!s.pump());
        assert!(s.start(1));
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(s.scheduler().is_pending());
        assert_eq!(s.run_frames(10), 10);
        assert_eq!(s.state().time_ticks, 10);
    }

    #[test]
    fn test_start_while_playing_is_ignored() {
        let mut s = session(GameKind::Cricket);
        s.start(1);
        s.run_frames(5);
        assert!(!s.start(2));
        assert_eq!(s.state().seed, 1);
        assert_eq!(s.state().time_ticks, 5);
    }

    #[test]
    fn test_last_life_lost_submits_once() {
        let mut s = session(GameKind::BrickBreaker);
        s.start(4);
        s.sim.state.lives = 1;
        lose_ball(&mut s);
        assert!(s.pump());

        assert_eq!(s.state().lives, 0);
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert!(!s.scheduler().is_pending());
        let score = s.state().score();
        let elapsed = s.state().elapsed_secs();
        assert_eq!(
            s.sink().calls,
            vec![("brick-breaker".to_string(), score, Some(elapsed))]
        );

        // No further ticks or submissions
        assert!(!s.pump());
        assert!(!s.frame());
        s.stop();
        assert_eq!(s.sink().calls.len(), 1);
    }

    #[test]
    fn test_stop_twice_submits_once() {
        let mut s = session(GameKind::SpaceInvaders);
        s.start(2);
        s.run_frames(30);
        s.stop();
        s.stop();
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert_eq!(s.sink().calls.len(), 1);
        assert_eq!(s.sink().calls[0].0, "space-invaders");
        assert_eq!(s.sink().calls[0].2, None);
    }

    #[test]
    fn test_stray_frame_after_cancel_does_not_tick() {
        let mut s = session(GameKind::BrickBreaker);
        s.start(3);
        s.run_frames(3);
        s.unmount();
        let ticks = s.state().time_ticks;
        assert!(!s.frame());
        assert!(!s.pump());
        assert_eq!(s.state().time_ticks, ticks);
        assert!(s.sink().calls.is_empty());
        assert_eq!(s.phase(), GamePhase::Idle);
        s.unmount();
    }

    #[test]
    fn test_unmount_resets_state_to_defaults() {
        let mut s = session(GameKind::SpaceInvaders);
        s.start(8);
        assert_eq!(s.run_frames(50), 50);
        s.unmount();
        let state = s.state();
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.combo(), 0);
        assert_eq!(state.lives, 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.entities.len(), 0);
        assert_eq!(s.phase(), GamePhase::Idle);
        // Only the avatar is left to draw
        assert_eq!(s.render().vertices.len(), 6);
        assert!(matches!(s.screen(), Screen::PreGame { .. }));
        assert!(s.sink().calls.is_empty());
    }

    #[test]
    fn test_apply_settings_updates_particles() {
        let mut s = session(GameKind::BrickBreaker);
        assert!(s.simulation().emitter_config().enabled);
        let off = Settings {
            particles: false,
            ..Default::default()
        };
        s.apply_settings(&off);
        assert!(!s.simulation().emitter_config().enabled);
        assert_eq!(s.simulation().emitter_config().max_particles, 0);

        // Survives a restart
        s.start(2);
        assert!(!s.simulation().emitter_config().enabled);

        s.apply_settings(&Settings::from_preset(crate::settings::QualityPreset::High));
        assert_eq!(s.simulation().emitter_config().max_particles, 2000);
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_input_after_game_over_is_ignored() {
        let mut s = session(GameKind::SpaceInvaders);
        s.start(5);
        s.stop();
        press(&mut s);
        assert_eq!(s.input.sample(), Intent::default());
    }

    #[test]
    fn test_restart_after_game_over_is_clean() {
        let mut s = session(GameKind::BrickBreaker);
        s.start(6);
        press(&mut s);
        s.run_frames(600);
        s.stop();
        assert!(s.start(7));
        let state = s.state();
        assert_eq!(state.score(), 0);
        assert_eq!(state.combo(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.lives, 3);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.entities.particle_count(), 0);
        assert_eq!(state.entities.count_movers(MoverKind::Ball), 1);
    }

    #[test]
    fn test_pause_suspends_ticks() {
        let mut s = session(GameKind::Cricket);
        s.start(8);
        s.run_frames(2);
        assert!(s.pause());
        assert!(!s.pump());
        assert_eq!(s.state().time_ticks, 2);
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(s.resume());
        assert!(s.pump());
        assert_eq!(s.state().time_ticks, 3);
    }

    #[test]
    fn test_closure_sink() {
        let mut got = Vec::new();
        {
            let mut s = Session::new(
                GameKind::Cricket,
                Tuning::default(),
                &Settings::default(),
                |game: &str, score: u64, _elapsed: Option<f32>| got.push((game.to_string(), score)),
                ManualScheduler::new(),
            );
            s.start(1);
            s.stop();
        }
        assert_eq!(got, vec![("cricket".to_string(), 0)]);
    }
}
