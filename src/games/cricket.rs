//! Cricket rules
//!
//! Deliveries are bowled down the pitch toward the batsman. A swing only
//! connects while the ball is inside the timing window in front of the bat;
//! timing quality and the selected shot decide a discrete outcome. An unplayed
//! delivery that runs through is bowled if it is in line with the stumps and a
//! plain miss otherwise.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GameKind, GameRules, ObstacleResponse};
use crate::direction_from_vertical;
use crate::input::{Intent, ShotKind};
use crate::sim::collision::{BoundaryPolicy, Edge, EdgeRule};
use crate::sim::entity::{Entity, Mover, MoverKind, MoverState, Obstacle, ObstacleKind, Role};
use crate::sim::scoring::Verdict;
use crate::sim::state::{Avatar, GameEvent, ShotOutcome, SimState};

/// Risk and outcome thresholds of one shot
///
/// `tiers` are `(min_quality, outcome)` pairs checked in order, so list them
/// best first. A quality equal to a threshold earns that tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotProfile {
    /// Out chance at zero quality and difficulty 1.0
    pub risk: f32,
    pub tiers: Vec<(f32, ShotOutcome)>,
    pub fallback: ShotOutcome,
}

impl ShotProfile {
    fn outcome(&self, quality: f32) -> ShotOutcome {
        self.tiers
            .iter()
            .find(|(min, _)| quality >= *min)
            .map(|(_, outcome)| *outcome)
            .unwrap_or(self.fallback)
    }
}

/// Cricket balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CricketTuning {
    pub wickets: u32,
    pub balls_per_over: u32,
    /// Overs in an innings; completing them ends the game
    pub max_overs: u32,
    pub batsman_half: Vec2,
    pub batsman_inset: f32,
    pub batsman_speed: f32,
    /// Timing window distance in front of the batsman centre
    pub window_offset: f32,
    pub window_half_width: f32,
    /// Window half height at difficulty 1.0; shrinks as difficulty rises
    pub window_half_height: f32,
    pub min_window_half_height: f32,
    pub stumps_half_width: f32,
    pub delivery_radius: f32,
    /// Delivery speed at difficulty 1.0 (units/s)
    pub delivery_speed: f32,
    pub delivery_start_y: f32,
    /// Horizontal scatter of the release point around the stumps
    pub delivery_spread: f32,
    /// Ticks between one delivery resolving and the next release
    pub delivery_interval: u32,
    pub struck_speed: f32,
    pub runs_points: u64,
    pub quality_points: f32,
    pub defend: ShotProfile,
    pub drive: ShotProfile,
    pub loft: ShotProfile,
}

impl Default for CricketTuning {
    fn default() -> Self {
        Self {
            wickets: 3,
            balls_per_over: 6,
            max_overs: 5,
            batsman_half: Vec2::new(10.0, 20.0),
            batsman_inset: 60.0,
            batsman_speed: 200.0,
            window_offset: 40.0,
            window_half_width: 40.0,
            window_half_height: 18.0,
            min_window_half_height: 8.0,
            stumps_half_width: 12.0,
            delivery_radius: 5.0,
            delivery_speed: 260.0,
            delivery_start_y: 20.0,
            delivery_spread: 30.0,
            delivery_interval: 70,
            struck_speed: 420.0,
            runs_points: 10,
            quality_points: 10.0,
            defend: ShotProfile {
                risk: 0.05,
                tiers: vec![(0.7, ShotOutcome::Single)],
                fallback: ShotOutcome::Dot,
            },
            drive: ShotProfile {
                risk: 0.25,
                tiers: vec![
                    (0.8, ShotOutcome::Four),
                    (0.55, ShotOutcome::Double),
                    (0.3, ShotOutcome::Single),
                ],
                fallback: ShotOutcome::Dot,
            },
            loft: ShotProfile {
                risk: 0.45,
                tiers: vec![
                    (0.85, ShotOutcome::Six),
                    (0.6, ShotOutcome::Four),
                    (0.35, ShotOutcome::Double),
                ],
                fallback: ShotOutcome::Single,
            },
        }
    }
}

impl CricketTuning {
    pub fn profile(&self, shot: ShotKind) -> &ShotProfile {
        match shot {
            ShotKind::Defend => &self.defend,
            ShotKind::Drive => &self.drive,
            ShotKind::Loft => &self.loft,
        }
    }
}

/// Cricket rules and over bookkeeping
#[derive(Debug, Clone)]
pub struct Cricket {
    tuning: CricketTuning,
    balls_bowled: u32,
    /// Ticks until the next release
    release_in: u32,
    runs: u32,
}

impl Cricket {
    pub fn new(tuning: CricketTuning) -> Self {
        Self {
            tuning,
            balls_bowled: 0,
            release_in: 0,
            runs: 0,
        }
    }

    pub fn tuning(&self) -> &CricketTuning {
        &self.tuning
    }

    /// Deliveries completed in the current over
    pub fn balls_bowled(&self) -> u32 {
        self.balls_bowled
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Discrete outcome for a connected swing
    ///
    /// `out_roll` is a uniform sample in [0, 1); the swing is caught when it
    /// falls below `risk * (1 - quality) * difficulty`.
    pub fn judge(&self, shot: ShotKind, quality: f32, difficulty: f32, out_roll: f32) -> ShotOutcome {
        let profile = self.tuning.profile(shot);
        let quality = quality.clamp(0.0, 1.0);
        let out_chance = profile.risk.max(0.0) * (1.0 - quality) * difficulty.max(0.0);
        if out_roll < out_chance {
            return ShotOutcome::Caught;
        }
        profile.outcome(quality)
    }

    fn window_half(&self, difficulty: f32) -> Vec2 {
        let t = &self.tuning;
        let h = (t.window_half_height / difficulty.max(1.0)).max(t.min_window_half_height);
        Vec2::new(t.window_half_width, h)
    }

    fn stumps_x(state: &SimState) -> f32 {
        state.board.width * 0.5
    }

    fn window(state: &SimState) -> Option<Entity> {
        state
            .entities
            .alive()
            .find(|e| e.obstacle().is_some_and(|o| o.kind == ObstacleKind::TimingWindow))
            .copied()
    }

    fn place_window(&self, state: &mut SimState) {
        let pos = Vec2::new(
            state.avatar.pos.x,
            state.avatar.pos.y - self.tuning.window_offset,
        );
        let half = self.window_half(state.difficulty());
        for entity in state.entities.iter_mut() {
            if entity.alive && entity.obstacle().is_some_and(|o| o.kind == ObstacleKind::TimingWindow) {
                entity.pos = pos;
                entity.half = half;
            }
        }
    }

    fn free_deliveries(state: &SimState) -> usize {
        state
            .entities
            .alive()
            .filter(|e| {
                e.mover()
                    .is_some_and(|m| m.kind == MoverKind::Delivery && m.state == MoverState::Free)
            })
            .count()
    }

    fn bowl(&self, state: &mut SimState) {
        let spread = self.tuning.delivery_spread.abs();
        let offset = if spread > 0.0 {
            state.rng.random_range(-spread..=spread)
        } else {
            0.0
        };
        let x = Self::stumps_x(state) + offset;
        let speed = self.tuning.delivery_speed * state.difficulty();
        state.entities.spawn(
            Vec2::new(x, self.tuning.delivery_start_y),
            Vec2::new(0.0, speed),
            Vec2::splat(self.tuning.delivery_radius),
            Role::Mover(Mover::free(MoverKind::Delivery)),
        );
    }

    /// Play `shot` at the delivery inside the window, if any
    fn swing(&self, state: &mut SimState, shot: ShotKind) -> Option<GameEvent> {
        let window = Self::window(state)?;
        let window_box = window.aabb();
        let index = state.entities.iter().position(|e| {
            e.alive
                && e.mover()
                    .is_some_and(|m| m.kind == MoverKind::Delivery && m.state == MoverState::Free)
                && e.aabb().overlaps(&window_box)
        })?;

        let pos = state.entities.get(index)?.pos;
        let dy = (pos.y - window.pos.y).abs();
        let quality = (1.0 - dy / window.half.y.max(f32::EPSILON)).clamp(0.0, 1.0);
        let out_roll: f32 = state.rng.random();
        let outcome = self.judge(shot, quality, state.difficulty(), out_roll);
        let angle = state.rng.random_range(-0.6f32..=0.6);
        let speed = self.tuning.struck_speed;

        let entity = state.entities.get_mut(index)?;
        entity.vel = direction_from_vertical(angle) * speed;
        if let Some(mover) = entity.mover_mut() {
            mover.state = MoverState::Struck;
        }
        Some(GameEvent::Delivery {
            outcome,
            shot: Some(shot),
            quality,
            pos,
        })
    }

    fn complete_delivery(&mut self, state: &mut SimState, outcome: ShotOutcome) {
        self.balls_bowled = self.balls_bowled.saturating_add(1);
        self.runs = self.runs.saturating_add(outcome.runs());
        self.release_in = self.tuning.delivery_interval;
        if outcome.is_wicket() {
            state.lose_life();
            log::debug!("{:?}: {} wickets left", outcome, state.lives);
        }
    }
}

impl GameRules for Cricket {
    fn kind(&self) -> GameKind {
        GameKind::Cricket
    }

    fn initial_lives(&self) -> u32 {
        self.tuning.wickets
    }

    fn setup(&mut self, state: &mut SimState) {
        let board = state.board;
        state.avatar = Avatar::new(
            Vec2::new(board.width * 0.5, board.height - self.tuning.batsman_inset),
            self.tuning.batsman_half,
            self.tuning.batsman_speed,
        );
        state.entities.spawn(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::ONE,
            Role::Obstacle(Obstacle::indestructible(ObstacleKind::TimingWindow)),
        );
        self.place_window(state);
        self.balls_bowled = 0;
        self.runs = 0;
        self.release_in = self.tuning.delivery_interval / 2;
    }

    fn apply_intent(&mut self, state: &mut SimState, intent: &Intent, dt: f32) {
        let board = state.board;
        if let Some(x) = intent.target_x {
            state.avatar.move_to_x(x, &board);
        } else if intent.steer != 0.0 {
            state.avatar.nudge(intent.steer, dt, &board);
        }
        self.place_window(state);

        let shot = match (intent.shot, intent.primary) {
            (Some(shot), _) => shot,
            (None, true) => ShotKind::Drive,
            (None, false) => return,
        };
        match self.swing(state, shot) {
            Some(event) => state.push_event(event),
            None => log::trace!("Swing ignored: no delivery in the window"),
        }
    }

    fn advance(&mut self, state: &mut SimState, _dt: f32) {
        if self.balls_bowled >= self.tuning.balls_per_over || Self::free_deliveries(state) > 0 {
            return;
        }
        if self.release_in > 0 {
            self.release_in -= 1;
            return;
        }
        self.bowl(state);
        self.release_in = self.tuning.delivery_interval;
    }

    fn boundary_policy(&self, entity: &Entity) -> Option<BoundaryPolicy> {
        let mover = entity.mover()?;
        if mover.kind != MoverKind::Delivery {
            return None;
        }
        Some(match mover.state {
            MoverState::Struck => BoundaryPolicy {
                left: EdgeRule::Reflect,
                right: EdgeRule::Reflect,
                top: EdgeRule::Expire,
                bottom: EdgeRule::Expire,
            },
            _ => BoundaryPolicy::CLAMP.with(Edge::Bottom, EdgeRule::Lose),
        })
    }

    fn obstacle_response(&self, _mover: &Mover, _obstacle: &Obstacle) -> Option<ObstacleResponse> {
        None
    }

    fn collide_avatar(&mut self, _state: &mut SimState) {}

    fn resolve_outcomes(&mut self, state: &mut SimState, events: &[GameEvent]) {
        let stumps_x = Self::stumps_x(state);
        for event in events {
            match *event {
                GameEvent::Delivery { outcome, .. } => self.complete_delivery(state, outcome),
                GameEvent::Lost {
                    kind: MoverKind::Delivery,
                    pos,
                    ..
                } => {
                    let outcome = if (pos.x - stumps_x).abs() <= self.tuning.stumps_half_width {
                        ShotOutcome::Bowled
                    } else {
                        ShotOutcome::Missed
                    };
                    self.complete_delivery(state, outcome);
                    state.push_event(GameEvent::Delivery {
                        outcome,
                        shot: None,
                        quality: 0.0,
                        pos,
                    });
                }
                _ => {}
            }
        }
    }

    fn is_cleared(&self, state: &SimState) -> bool {
        self.balls_bowled >= self.tuning.balls_per_over && Self::free_deliveries(state) == 0
    }

    fn regenerate(&mut self, state: &mut SimState) {
        state.entities.kill_where(|e| e.mover().is_some());
        self.balls_bowled = 0;
        self.release_in = self.tuning.delivery_interval;
        self.place_window(state);
        log::debug!(
            "Over {} starts, {} runs so far",
            state.level(),
            self.runs
        );
    }

    fn classify(&self, event: &GameEvent, _state: &SimState) -> Verdict {
        match *event {
            GameEvent::Delivery {
                outcome, quality, ..
            } => {
                let runs = outcome.runs() as u64;
                if runs == 0 {
                    return Verdict::Disqualifying;
                }
                let bonus = (quality.clamp(0.0, 1.0) * self.tuning.quality_points).round() as u64;
                Verdict::Qualifying {
                    points: runs
                        .saturating_mul(self.tuning.runs_points)
                        .saturating_add(bonus),
                }
            }
            _ => Verdict::Ignore,
        }
    }

    fn is_terminal(&self, state: &SimState) -> bool {
        state.lives == 0 || state.level() > self.tuning.max_overs
    }

    fn is_victory(&self, state: &SimState) -> bool {
        state.lives > 0 && state.level() > self.tuning.max_overs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::difficulty::DifficultyCurve;
    use crate::sim::state::{Board, GamePhase};
    use crate::sim::{EmitterConfig, Simulation};
    use crate::tuning::Tuning;

    fn rules() -> Cricket {
        Cricket::new(CricketTuning::default())
    }

    fn fresh() -> (Cricket, SimState) {
        let mut rules = rules();
        let mut state = SimState::new(1, Board::default(), DifficultyCurve::default());
        state.lives = 3;
        rules.setup(&mut state);
        (rules, state)
    }

    fn place_delivery(state: &mut SimState, pos: Vec2) -> u32 {
        state.entities.spawn(
            pos,
            Vec2::new(0.0, 260.0),
            Vec2::splat(5.0),
            Role::Mover(Mover::free(MoverKind::Delivery)),
        )
    }

    fn started(tuning: Tuning) -> Simulation {
        let mut sim = Simulation::new(GameKind::Cricket, tuning, EmitterConfig::default(), 9);
        sim.start(9);
        sim
    }

    #[test]
    fn test_outcome_table_highest_first() {
        let r = rules();
        // Roll of 1.0 never gets out
        assert_eq!(r.judge(ShotKind::Loft, 0.9, 1.0, 1.0), ShotOutcome::Six);
        assert_eq!(r.judge(ShotKind::Loft, 0.85, 1.0, 1.0), ShotOutcome::Six);
        assert_eq!(r.judge(ShotKind::Loft, 0.6, 1.0, 1.0), ShotOutcome::Four);
        assert_eq!(r.judge(ShotKind::Loft, 0.1, 1.0, 1.0), ShotOutcome::Single);
        assert_eq!(r.judge(ShotKind::Drive, 0.8, 1.0, 1.0), ShotOutcome::Four);
        assert_eq!(r.judge(ShotKind::Drive, 0.5, 1.0, 1.0), ShotOutcome::Single);
        assert_eq!(r.judge(ShotKind::Drive, 0.1, 1.0, 1.0), ShotOutcome::Dot);
        assert_eq!(r.judge(ShotKind::Defend, 0.7, 1.0, 1.0), ShotOutcome::Single);
        assert_eq!(r.judge(ShotKind::Defend, 0.6, 1.0, 1.0), ShotOutcome::Dot);
    }

    #[test]
    fn test_out_chance_scales_with_risk_and_timing() {
        let r = rules();
        assert_eq!(r.judge(ShotKind::Loft, 0.0, 1.0, 0.4), ShotOutcome::Caught);
        assert_ne!(r.judge(ShotKind::Defend, 0.0, 1.0, 0.4), ShotOutcome::Caught);
        // Perfect timing is never out
        assert_eq!(r.judge(ShotKind::Loft, 1.0, 2.2, 0.0), ShotOutcome::Six);
        // Harder overs raise the out chance
        assert_eq!(r.judge(ShotKind::Drive, 0.0, 1.0, 0.3), ShotOutcome::Dot);
        assert_eq!(r.judge(ShotKind::Drive, 0.0, 2.0, 0.3), ShotOutcome::Caught);
    }

    #[test]
    fn test_swing_outside_window_is_ignored() {
        let (mut rules, mut state) = fresh();
        place_delivery(&mut state, Vec2::new(240.0, 100.0));
        rules.apply_intent(
            &mut state,
            &Intent {
                primary: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(state.events.is_empty());
        assert_eq!(Cricket::free_deliveries(&state), 1);
    }

    #[test]
    fn test_perfect_swing_scores_boundary() {
        let (mut rules, mut state) = fresh();
        let window = Cricket::window(&state).expect("window");
        let id = place_delivery(&mut state, window.pos);
        rules.apply_intent(
            &mut state,
            &Intent {
                primary: true,
                ..Default::default()
            },
            SIM_DT,
        );
        let event = state.events[0];
        assert_eq!(
            event,
            GameEvent::Delivery {
                outcome: ShotOutcome::Four,
                shot: Some(ShotKind::Drive),
                quality: 1.0,
                pos: window.pos,
            }
        );
        assert_eq!(
            rules.classify(&event, &state),
            Verdict::Qualifying { points: 50 }
        );
        let ball = state.entities.find(id).expect("ball");
        assert_eq!(ball.mover().map(|m| m.state), Some(MoverState::Struck));
        assert!(ball.vel.y < 0.0);
    }

    #[test]
    fn test_unplayed_delivery_in_line_is_bowled() {
        let mut sim = started(Tuning::default());
        sim.state.entities.kill_where(|e| e.mover().is_some());
        place_delivery(&mut sim.state, Vec2::new(240.0, 638.0));
        sim.tick(&Intent::default(), SIM_DT);
        assert!(sim.state.events.iter().any(|e| matches!(
            e,
            GameEvent::Delivery {
                outcome: ShotOutcome::Bowled,
                shot: None,
                ..
            }
        )));
        assert_eq!(sim.state.lives, 2);
    }

    #[test]
    fn test_wide_delivery_is_missed_without_wicket() {
        let mut sim = started(Tuning::default());
        sim.state.entities.kill_where(|e| e.mover().is_some());
        place_delivery(&mut sim.state, Vec2::new(300.0, 638.0));
        sim.tick(&Intent::default(), SIM_DT);
        assert!(sim.state.events.iter().any(|e| matches!(
            e,
            GameEvent::Delivery {
                outcome: ShotOutcome::Missed,
                ..
            }
        )));
        assert_eq!(sim.state.lives, 3);
    }

    #[test]
    fn test_over_completes_after_six_balls() {
        let mut tuning = Tuning::default();
        tuning.cricket.wickets = 100;
        let mut sim = started(tuning);
        for _ in 0..5000 {
            sim.tick(&Intent::default(), SIM_DT);
            if sim.state.level() == 2 {
                break;
            }
        }
        assert_eq!(sim.state.level(), 2);
        let deliveries = 100 - sim.state.lives;
        assert!(deliveries <= 6);
        assert!(sim.state.events.contains(&GameEvent::Cleared { level: 2 }));
    }

    #[test]
    fn test_innings_ends_after_max_overs() {
        let mut tuning = Tuning::default();
        tuning.cricket.wickets = 100;
        tuning.cricket.max_overs = 1;
        let mut sim = started(tuning);
        for _ in 0..5000 {
            sim.tick(&Intent::default(), SIM_DT);
            if sim.phase() == GamePhase::GameOver {
                break;
            }
        }
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(sim.is_victory());
    }

    #[test]
    fn test_window_shrinks_with_difficulty() {
        let r = rules();
        assert_eq!(r.window_half(1.0).y, 18.0);
        assert!(r.window_half(2.0).y < 18.0);
        assert_eq!(r.window_half(100.0).y, 8.0);
    }
}
