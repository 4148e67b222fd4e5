use datasync_ports::types::{Difficulty, Seconds};
use serde::{Deserialize, Serialize};

/// Tuning selected once per session. Read-only for the session lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub difficulty: Difficulty,
    /// Scales the onset energy threshold; lower means more notes.
    pub energy_multiplier: f32,
    /// Debounce between committed notes.
    pub min_gap: Seconds,
    /// How long a note travels on screen before its hit time (lookahead window).
    pub travel_time: Seconds,
    pub hit_window: Seconds,
    pub miss_window: Seconds,
}

impl DifficultyProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                difficulty,
                energy_multiplier: 1.5,
                min_gap: 0.60,
                travel_time: 2.2,
                hit_window: 0.5,
                miss_window: 0.25,
            },
            Difficulty::Normal => Self {
                difficulty,
                energy_multiplier: 1.3,
                min_gap: 0.40,
                travel_time: 1.8,
                hit_window: 0.35,
                miss_window: 0.25,
            },
            Difficulty::Hard => Self {
                difficulty,
                energy_multiplier: 1.15,
                min_gap: 0.25,
                travel_time: 1.2,
                hit_window: 0.35,
                miss_window: 0.15,
            },
        }
    }
}

impl From<Difficulty> for DifficultyProfile {
    fn from(difficulty: Difficulty) -> Self {
        Self::for_difficulty(difficulty)
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}
