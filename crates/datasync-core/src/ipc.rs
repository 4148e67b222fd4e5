use datasync_domain_chart::NoteId;
use datasync_domain_eval::{Grade, SessionResult};
use datasync_ports::storage::SettingsDto;
use datasync_ports::types::{Difficulty, Lane, MediaSource};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    SelectDifficulty { difficulty: Difficulty },
    Analyze { source: MediaSource },
    StartCountdown,
    Press { lane: Lane },
    Stop,
    Retry,
    SetInputOffsetMs { ms: i32 },
    ExportDiagnostics { path: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    Analyzing,
    Ready,
    Countdown,
    Playing,
    Results,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    PhaseChanged { phase: SessionPhase },
    SettingsUpdated { settings: SettingsDto },
    AnalysisProgress { percent: u8 },
    ChartReady { note_count: usize, max_score: u64 },
    CountdownTick { remaining: u32 },
    Judged {
        note_id: NoteId,
        lane: Lane,
        grade: Grade,
        score_delta: u64,
        combo_after: u32,
        score: u64,
    },
    FeedbackCleared,
    SessionFinished { result: SessionResult },
}
