use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// 车辆尺寸 (已按贴图缩放后的像素大小)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CarSize {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 80.0,
        }
    }
}

/// Reward shaping constants. The defaults are the values the shipped policy was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub successful_dodge: f32,
    pub alive_per_step: f32,
    pub lane_change: f32,
    pub crash: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            successful_dodge: 5.0,
            alive_per_step: 0.5,
            lane_change: -0.05,
            crash: -5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    pub player_car: CarSize,
    pub enemy_car: CarSize,
    pub initial_speed: f32,
    pub speed_increment: f32,
    /// 每隔多少分升一级
    pub level_interval: u32,
    /// Vertical centre of the player car as a fraction of screen height.
    pub player_y_fraction: f32,
    pub rewards: RewardConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 660.0,
            player_car: CarSize::default(),
            enemy_car: CarSize::default(),
            initial_speed: 3.0,
            speed_increment: 0.5,
            level_interval: 5,
            player_y_fraction: 0.85,
            rewards: RewardConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let dims = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("player_car.width", self.player_car.width),
            ("player_car.height", self.player_car.height),
            ("enemy_car.width", self.enemy_car.width),
            ("enemy_car.height", self.enemy_car.height),
            ("initial_speed", self.initial_speed),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(GameError::Configuration(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.speed_increment.is_finite() && self.speed_increment >= 0.0) {
            return Err(GameError::Configuration(format!(
                "speed_increment must be a non-negative number, got {}",
                self.speed_increment
            )));
        }
        if !self.player_y_fraction.is_finite() {
            return Err(GameError::Configuration(format!(
                "player_y_fraction must be finite, got {}",
                self.player_y_fraction
            )));
        }
        if self.level_interval == 0 {
            return Err(GameError::Configuration(
                "level_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
