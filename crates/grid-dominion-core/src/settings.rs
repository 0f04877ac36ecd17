//! Game settings and configuration.

use crate::victory::LossPolicy;
use serde::{Deserialize, Serialize};

/// Default board edge length.
pub const DEFAULT_MAP_SIZE: u32 = 15;

/// Resources every player starts with.
pub const STARTING_RESOURCES: f64 = 1500.0;

/// Configuration for a game session.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// settings file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Number of rows on the map.
    pub map_width: u32,
    /// Number of columns on the map.
    pub map_height: u32,
    /// Resources each player starts with.
    pub starting_resources: f64,
    /// Both players are paid every this many turns.
    pub income_interval: u32,
    /// Amount paid to each player on an income turn.
    pub income_amount: f64,
    /// Fraction of the purchase price returned when a unit is sold.
    pub sell_refund_ratio: f64,
    /// Turns that must pass before anyone can lose.
    pub opening_turns: u32,
    /// How to decide that the current player has lost.
    pub loss_policy: LossPolicy,
}

impl GameSettings {
    /// Create default settings for a new game.
    pub fn new() -> Self {
        Self {
            map_width: DEFAULT_MAP_SIZE,
            map_height: DEFAULT_MAP_SIZE,
            starting_resources: STARTING_RESOURCES,
            income_interval: 5,
            income_amount: 200.0,
            sell_refund_ratio: 0.5,
            opening_turns: 2,
            loss_policy: LossPolicy::default(),
        }
    }

    /// The larger 20x20 board used by early versions of the game.
    pub fn classic() -> Self {
        Self {
            map_width: 20,
            map_height: 20,
            ..Self::new()
        }
    }

    /// Builder-style override of the loss policy.
    pub fn with_loss_policy(mut self, loss_policy: LossPolicy) -> Self {
        self.loss_policy = loss_policy;
        self
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.map_width < 2 || self.map_height < 2 {
            return Err(SettingsError::MapTooSmall);
        }
        if self.map_width > 100 || self.map_height > 100 {
            return Err(SettingsError::MapTooLarge);
        }
        if !self.starting_resources.is_finite() || self.starting_resources < 0.0 {
            return Err(SettingsError::InvalidStartingResources);
        }
        if self.income_interval == 0 {
            return Err(SettingsError::ZeroIncomeInterval);
        }
        if !self.income_amount.is_finite() {
            return Err(SettingsError::InvalidIncome);
        }
        if !(0.0..=1.0).contains(&self.sell_refund_ratio) {
            return Err(SettingsError::InvalidRefundRatio);
        }
        Ok(())
    }

    /// Get the map dimensions based on settings.
    pub fn map_dimensions(&self) -> (u32, u32) {
        (self.map_width, self.map_height)
    }

    /// Parse settings from JSON, validating the result.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors in game settings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("map must be at least 2x2")]
    MapTooSmall,
    #[error("map must be at most 100x100")]
    MapTooLarge,
    #[error("starting resources must be a non-negative number")]
    InvalidStartingResources,
    #[error("income interval must be at least one turn")]
    ZeroIncomeInterval,
    #[error("income amount must be a finite number")]
    InvalidIncome,
    #[error("sell refund ratio must be between 0 and 1")]
    InvalidRefundRatio,
    #[error("could not parse settings: {0}")]
    Parse(String),
}
