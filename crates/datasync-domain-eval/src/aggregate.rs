use crate::judge::{Grade, HitGrade, JudgeEvent};
use datasync_domain_chart::NoteId;
use datasync_ports::types::Lane;
use serde::{Deserialize, Serialize};

pub const PERFECT_POINTS: u64 = 1000;
pub const GREAT_POINTS: u64 = 500;
pub const PASS_ACCURACY_PERCENT: u32 = 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    pub perfect: u32,
    pub great: u32,
    pub miss: u32,
}

impl GradeCounts {
    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.miss
    }
}

/// One judgement after it has been applied to the running score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub note_id: NoteId,
    pub lane: Lane,
    pub grade: Grade,
    pub score_delta: u64,
    pub combo_after: u32,
    pub score_after: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub score: u64,
    pub max_score: u64,
    pub accuracy_percent: u32,
    pub pass: bool,
    pub max_combo: u32,
    pub counts: GradeCounts,
}

#[derive(Debug)]
pub struct SessionAggregator {
    note_count: usize,
    max_score: u64,
    score: u64,
    combo: u32,
    max_combo: u32,
    counts: GradeCounts,
    result: Option<SessionResult>,
}

impl SessionAggregator {
    pub fn new(note_count: usize) -> Self {
        Self {
            note_count,
            max_score: note_count as u64 * PERFECT_POINTS,
            score: 0,
            combo: 0,
            max_combo: 0,
            counts: GradeCounts::default(),
            result: None,
        }
    }

    pub fn apply(&mut self, event: &JudgeEvent) -> ScoreUpdate {
        let score_delta = match event {
            JudgeEvent::Hit { grade, .. } => {
                self.combo += 1;
                self.max_combo = self.max_combo.max(self.combo);
                match grade {
                    HitGrade::Perfect => {
                        self.counts.perfect += 1;
                        PERFECT_POINTS
                    }
                    HitGrade::Great => {
                        self.counts.great += 1;
                        GREAT_POINTS
                    }
                }
            }
            JudgeEvent::Miss { .. } => {
                self.combo = 0;
                self.counts.miss += 1;
                0
            }
        };
        self.score += score_delta;

        ScoreUpdate {
            note_id: event.note_id(),
            lane: event.lane(),
            grade: event.grade(),
            score_delta,
            combo_after: self.combo,
            score_after: self.score,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn max_score(&self) -> u64 {
        self.max_score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn counts(&self) -> GradeCounts {
        self.counts
    }

    pub fn judged(&self) -> usize {
        self.counts.total() as usize
    }

    pub fn is_complete(&self) -> bool {
        self.judged() >= self.note_count
    }

    /// Computes the terminal verdict on first call; later calls return the same value.
    pub fn finish(&mut self) -> SessionResult {
        if let Some(result) = self.result {
            return result;
        }
        let accuracy_percent = accuracy_percent(self.score, self.max_score);
        let result = SessionResult {
            score: self.score,
            max_score: self.max_score,
            accuracy_percent,
            pass: accuracy_percent >= PASS_ACCURACY_PERCENT,
            max_combo: self.max_combo,
            counts: self.counts,
        };
        self.result = Some(result);
        result
    }

    pub fn result(&self) -> Option<SessionResult> {
        self.result
    }
}

/// `round(score / max_score * 100)`, clamped to 100; 0 for an empty chart.
pub fn accuracy_percent(score: u64, max_score: u64) -> u32 {
    if max_score == 0 {
        return 0;
    }
    let pct = (score as f64 / max_score as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}
