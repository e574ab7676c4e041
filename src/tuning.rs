//! Data-driven game balance
//!
//! Every constant the rules use lives here so it can be adjusted from a JSON
//! file without a rebuild. Missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::games::brick_breaker::BrickBreakerTuning;
use crate::games::cricket::CricketTuning;
use crate::games::space_invaders::SpaceInvadersTuning;
use crate::sim::difficulty::DifficultyCurve;
use crate::sim::scoring::ScoringTuning;

/// Complete balance set for all games
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: DifficultyCurve,
    pub scoring: ScoringTuning,
    pub brick_breaker: BrickBreakerTuning,
    pub space_invaders: SpaceInvadersTuning,
    pub cricket: CricketTuning,
}

impl Tuning {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse `json`, falling back to defaults on error
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("Invalid tuning, using defaults: {}", err);
                Self::default()
            }
        }
    }
}
