//! Fixed timestep simulation tick
//!
//! `Simulation` owns the state, the active rules and the particle emitter, and
//! advances them one fixed step at a time in a fixed order:
//!
//! 1. intent (avatar movement, launch/fire/swing)
//! 2. scripted motion (march, bowling, attached balls)
//! 3. integrate, boundaries, obstacles, avatar, speed caps, bounds
//! 4. rule outcomes (lives, respawns, pickups)
//! 5. clear condition and progression
//! 6. scoring
//! 7. particles
//! 8. compaction and the terminal check

use super::particles::{EmitterConfig, ParticleEmitter};
use super::physics;
use super::scoring::Verdict;
use super::state::{Board, GameEvent, GamePhase, SimState};
use crate::games::{GameKind, GameRules};
use crate::input::Intent;
use crate::tuning::Tuning;

/// One game session's simulation
pub struct Simulation {
    pub state: SimState,
    kind: GameKind,
    rules: Box<dyn GameRules>,
    emitter: ParticleEmitter,
    emitter_config: EmitterConfig,
    tuning: Tuning,
}

impl Simulation {
    /// Idle simulation for `kind`; nothing runs until `start`
    pub fn new(kind: GameKind, tuning: Tuning, emitter_config: EmitterConfig, seed: u64) -> Self {
        let board = Board::default();
        Self {
            state: SimState::new(seed, board, tuning.difficulty),
            kind,
            rules: kind.rules(&tuning),
            emitter: ParticleEmitter::new(emitter_config, seed),
            emitter_config,
            tuning,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn rules(&self) -> &dyn GameRules {
        self.rules.as_ref()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Throw away everything and begin a fresh session with `seed`
    pub fn start(&mut self, seed: u64) {
        self.rebuild(seed);
        self.state.lives = self.rules.initial_lives();
        self.rules.setup(&mut self.state);
        self.state.phase = GamePhase::Playing;
        log::info!(
            "Started {} (seed {}, lives {})",
            self.kind.game_type(),
            seed,
            self.state.lives
        );
    }

    /// Force the session into GameOver; returns false if it was not Playing
    pub fn end(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.phase = GamePhase::GameOver;
        log::info!(
            "Ended {} with score {} at level {}",
            self.kind.game_type(),
            self.state.score(),
            self.state.level()
        );
        true
    }

    /// Drop the session without finishing it (back to Idle)
    pub fn abandon(&mut self) {
        if self.state.phase == GamePhase::Playing {
            log::info!("Abandoned {} at score {}", self.kind.game_type(), self.state.score());
        }
        self.rebuild(self.state.seed);
    }

    /// Replace the emitter particle settings; takes effect on the next burst
    pub fn set_emitter_config(&mut self, config: EmitterConfig) {
        self.emitter_config = config;
        self.emitter.set_config(config);
    }

    pub fn emitter_config(&self) -> &EmitterConfig {
        &self.emitter_config
    }

    /// Fresh rules, emitter and Idle state on the same board
    fn rebuild(&mut self, seed: u64) {
        let board = self.state.board;
        self.rules = self.kind.rules(&self.tuning);
        self.emitter = ParticleEmitter::new(self.emitter_config, seed);
        self.state = SimState::new(seed, board, self.tuning.difficulty);
    }

    /// Whether the finished session counts as a win
    pub fn is_victory(&self) -> bool {
        self.state.phase == GamePhase::GameOver && self.rules.is_victory(&self.state)
    }

    /// Elapsed time for score submission, if this game reports it
    pub fn reported_elapsed(&self) -> Option<f32> {
        self.rules
            .reports_elapsed_time()
            .then(|| self.state.elapsed_secs())
    }

    /// Advance by one fixed timestep
    pub fn tick(&mut self, intent: &Intent, dt: f32) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        let state = &mut self.state;
        let rules = self.rules.as_mut();

        state.events.clear();
        state.time_ticks += 1;

        rules.apply_intent(state, intent, dt);
        rules.advance(state, dt);

        physics::integrate(state, dt);
        physics::resolve_boundaries(state, rules);
        physics::resolve_obstacles(state, rules);
        rules.collide_avatar(state);
        physics::cap_speeds(state, rules);
        physics::enforce_bounds(state);

        let collisions = state.events.clone();
        rules.resolve_outcomes(state, &collisions);

        if rules.is_cleared(state) {
            let level = state.progression.advance();
            rules.regenerate(state);
            physics::enforce_bounds(state);
            state.push_event(GameEvent::Cleared { level });
        }

        let verdicts: Vec<Verdict> = {
            let view: &SimState = state;
            view.events
                .iter()
                .map(|event| rules.classify(event, view))
                .collect()
        };
        for verdict in verdicts {
            state.scoring.apply(verdict, &self.tuning.scoring);
        }

        self.emitter
            .react(&state.events, &mut state.entities, &state.board);
        self.emitter.update(&mut state.entities, &state.board, dt);

        state.entities.compact();

        if rules.is_terminal(state) {
            state.phase = GamePhase::GameOver;
            log::info!(
                "Game over: {} scored {} (best combo {}, level {})",
                self.kind.game_type(),
                state.score(),
                state.scoring.best_combo(),
                state.level()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn sim(kind: GameKind) -> Simulation {
        let mut sim = Simulation::new(kind, Tuning::default(), EmitterConfig::default(), 11);
        sim.start(11);
        sim
    }

    #[test]
    fn test_idle_does_not_tick() {
        let mut sim = Simulation::new(
            GameKind::BrickBreaker,
            Tuning::default(),
            EmitterConfig::default(),
            1,
        );
        sim.tick(&Intent::default(), SIM_DT);
        assert_eq!(sim.state.time_ticks, 0);
        assert_eq!(sim.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_start_sets_playing_with_lives() {
        for kind in GameKind::ALL {
            let sim = sim(kind);
            assert_eq!(sim.phase(), GamePhase::Playing);
            assert_eq!(sim.state.lives, sim.rules().initial_lives());
            assert_eq!(sim.state.level(), 1);
        }
    }

    #[test]
    fn test_entities_stay_on_board() {
        for kind in GameKind::ALL {
            let mut sim = sim(kind);
            for i in 0..600 {
                let intent = Intent {
                    target_x: Some((i * 37 % 480) as f32),
                    primary: i % 20 == 0,
                    ..Default::default()
                };
                sim.tick(&intent, SIM_DT);
                if sim.phase() != GamePhase::Playing {
                    break;
                }
                let board = sim.state.board;
                assert!(sim.state.entities.alive().all(|e| board.contains(e.pos)));
            }
        }
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut sim = sim(GameKind::Cricket);
        assert!(sim.end());
        assert!(!sim.end());
        assert_eq!(sim.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut sim = sim(GameKind::SpaceInvaders);
        for _ in 0..120 {
            sim.tick(
                &Intent {
                    primary: true,
                    ..Default::default()
                },
                SIM_DT,
            );
        }
        sim.end();
        sim.start(12);
        assert_eq!(sim.state.score(), 0);
        assert_eq!(sim.state.combo(), 0);
        assert_eq!(sim.state.level(), 1);
        assert_eq!(sim.state.time_ticks, 0);
        assert_eq!(sim.state.lives, sim.rules().initial_lives());
        assert_eq!(sim.state.entities.particle_count(), 0);
    }

    #[test]
    fn test_abandon_returns_to_fresh_idle_state() {
        let mut sim = sim(GameKind::SpaceInvaders);
        for _ in 0..50 {
            sim.tick(
                &Intent {
                    primary: true,
                    ..Default::default()
                },
                SIM_DT,
            );
        }
        assert!(sim.state.time_ticks > 0);
        sim.abandon();
        assert_eq!(sim.phase(), GamePhase::Idle);
        assert_eq!(sim.state.time_ticks, 0);
        assert_eq!(sim.state.score(), 0);
        assert_eq!(sim.state.lives, 0);
        assert_eq!(sim.state.level(), 1);
        assert_eq!(sim.state.entities.len(), 0);
        assert_eq!(sim.state.seed, 11);
    }

    #[test]
    fn test_disabled_emitter_config_stops_new_particles() {
        let mut sim = sim(GameKind::BrickBreaker);
        sim.set_emitter_config(EmitterConfig {
            enabled: false,
            ..EmitterConfig::default()
        });
        assert!(!sim.emitter_config().enabled);
        sim.start(11);
        for _ in 0..600 {
            sim.tick(
                &Intent {
                    primary: true,
                    ..Default::default()
                },
                SIM_DT,
            );
            assert_eq!(sim.state.entities.particle_count(), 0);
        }
    }
}
