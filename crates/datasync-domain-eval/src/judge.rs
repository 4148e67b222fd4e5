use crate::board::{NoteBoard, NoteState};
use datasync_domain_chart::{DifficultyProfile, NoteId};
use datasync_ports::types::{Lane, Seconds};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug)]
pub struct JudgeConfig {
    /// Below this distance a hit is `Perfect`. Fixed across difficulties.
    pub perfect_window: Seconds,
    /// At or beyond this distance a press is dropped.
    pub hit_window: Seconds,
    /// A note this long past its hit time is already missed and cannot be hit.
    pub miss_window: Seconds,
    pub travel_time: Seconds,
    pub visible_tail: Seconds,
}

impl JudgeConfig {
    pub fn from_profile(profile: &DifficultyProfile) -> Self {
        Self {
            perfect_window: 0.1,
            hit_window: profile.hit_window,
            miss_window: profile.miss_window,
            travel_time: profile.travel_time,
            visible_tail: crate::scheduler::VISIBLE_TAIL,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitGrade {
    Perfect,
    Great,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Perfect,
    Great,
    Miss,
}

impl From<HitGrade> for Grade {
    fn from(grade: HitGrade) -> Self {
        match grade {
            HitGrade::Perfect => Grade::Perfect,
            HitGrade::Great => Grade::Great,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JudgeEvent {
    Hit {
        note_id: NoteId,
        lane: Lane,
        grade: HitGrade,
        /// Input time minus hit time; negative when early.
        delta: Seconds,
    },
    Miss {
        note_id: NoteId,
        lane: Lane,
    },
}

impl JudgeEvent {
    pub fn note_id(&self) -> NoteId {
        match self {
            JudgeEvent::Hit { note_id, .. } | JudgeEvent::Miss { note_id, .. } => *note_id,
        }
    }

    pub fn lane(&self) -> Lane {
        match self {
            JudgeEvent::Hit { lane, .. } | JudgeEvent::Miss { lane, .. } => *lane,
        }
    }

    pub fn grade(&self) -> Grade {
        match self {
            JudgeEvent::Hit { grade, .. } => (*grade).into(),
            JudgeEvent::Miss { .. } => Grade::Miss,
        }
    }
}

pub struct Judge {
    cfg: JudgeConfig,
}

impl Judge {
    pub fn new(cfg: JudgeConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.cfg
    }

    /// Judge a press on `lane` at `input_time` against the nearest visible,
    /// unresolved note in that lane whose miss window is still open. Presses
    /// with no eligible note are dropped, not counted as misses.
    pub fn on_input(
        &self,
        board: &mut NoteBoard,
        lane: Lane,
        input_time: Seconds,
    ) -> Option<JudgeEvent> {
        let range = board.window_range(input_time, self.cfg.travel_time, self.cfg.visible_tail);
        let (index, distance) = range
            .filter_map(|idx| {
                let note = board.note(idx)?;
                let expired = input_time > note.hit_time + self.cfg.miss_window;
                (board.is_pending(idx) && note.lane == lane && !expired)
                    .then(|| (idx, (note.hit_time - input_time).abs()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        if distance >= self.cfg.hit_window {
            return None;
        }

        let note = *board.note(index)?;
        let grade = if distance < self.cfg.perfect_window {
            HitGrade::Perfect
        } else {
            HitGrade::Great
        };
        let delta = input_time - note.hit_time;

        if !board.try_resolve(index, NoteState::Hit { grade, delta }) {
            return None;
        }

        Some(JudgeEvent::Hit {
            note_id: note.id,
            lane: note.lane,
            grade,
            delta,
        })
    }
}
