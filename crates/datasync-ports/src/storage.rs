use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_feedback_display_ms() -> u32 {
    250
}

fn default_countdown_seconds() -> u32 {
    3
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    pub difficulty: Difficulty,
    /// Added to the media clock when stamping key presses.
    pub input_offset_ms: i32,
    #[serde(default = "default_feedback_display_ms")]
    pub feedback_display_ms: u32,
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,
    pub lane_strategy: LaneStrategy,
    pub lane_seed: Option<u64>,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            input_offset_ms: 0,
            feedback_display_ms: default_feedback_display_ms(),
            countdown_seconds: default_countdown_seconds(),
            lane_strategy: LaneStrategy::Random,
            lane_seed: None,
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
