use serde::{Deserialize, Serialize};
use std::fmt;

pub type Seconds = f64; // playback-clock time, relative to media start
pub type SampleTime = u64; // audio sample index, monotonic while media plays

/// Input channel a note is scheduled on and a key press is mapped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    Left,
    Down,
    Up,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::Left, Lane::Down, Lane::Up, Lane::Right];

    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Down => 1,
            Lane::Up => 2,
            Lane::Right => 3,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lane::Left => "left",
            Lane::Down => "down",
            Lane::Up => "up",
            Lane::Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// How the onset detector picks a lane for each committed note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LaneStrategy {
    #[default]
    Random,
    Cyclic,
}

/// Location of the media whose audio track is analyzed into a chart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaSource(pub String);

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
