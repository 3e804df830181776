//! Tunable parameters of the decision cascade.

use serde::Deserialize;
use thiserror::Error;
use trailrunner_system_predictor::{DEFAULT_DEPTH, DEFAULT_INTERACTION_RADIUS};

/// Parameters controlling how far the bot looks ahead and how it reacts.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Plies explored by the forward simulator; zero disables it.
    pub predictor_depth: u32,
    /// Manhattan radius pulling opponents into the simulation.
    pub interaction_radius: u32,
    /// Extra distance added to the way home before an opponent counts as a threat.
    pub reassurance_distance: u32,
    /// Largest distance to an opponent trail cell worth attacking.
    pub attack_range: u32,
    /// Largest distance to a bonus worth collecting.
    pub bonus_range: u32,
    /// Trail length at which the bot stops expanding and heads home.
    pub capture_trail_limit: usize,
    /// Opponent distance that keeps the bot from leaving its territory.
    pub evasion_distance: u32,
    /// Seed mixed with the tick number for exploratory targets.
    pub seed: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            predictor_depth: DEFAULT_DEPTH,
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            reassurance_distance: 4,
            attack_range: 3,
            bonus_range: 3,
            capture_trail_limit: 10,
            evasion_distance: 3,
            seed: 0x5eed_7a11_c0de_2018,
        }
    }
}

impl BotConfig {
    /// Parses a configuration from TOML; missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Errors raised while loading a [`BotConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document was not valid TOML or named an unknown key.
    #[error("invalid bot configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
