use crate::board::{NoteBoard, NoteState};
use crate::judge::JudgeEvent;
use datasync_domain_chart::{DifficultyProfile, NoteId};
use datasync_ports::types::{Lane, Seconds};
use serde::{Deserialize, Serialize};

/// Notes stay visible this long past their hit time.
pub const VISIBLE_TAIL: Seconds = 0.5;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    pub travel_time: Seconds,
    pub miss_window: Seconds,
    pub visible_tail: Seconds,
}

impl SchedulerConfig {
    pub fn from_profile(profile: &DifficultyProfile) -> Self {
        Self {
            travel_time: profile.travel_time,
            miss_window: profile.miss_window,
            visible_tail: VISIBLE_TAIL,
        }
    }
}

/// A note as a renderer sees it on one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteView {
    pub note_id: NoteId,
    pub lane: Lane,
    pub hit_time: Seconds,
    /// 0 when the note spawns, 1 on its hit time, above 1 in the tail.
    pub progress: f64,
}

pub struct ChartScheduler {
    config: SchedulerConfig,
    sweep_cursor: usize,
}

impl ChartScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            sweep_cursor: 0,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.sweep_cursor = 0;
    }

    /// Unresolved notes inside the lookahead window at `now`. Does not mutate.
    pub fn visible(&self, board: &NoteBoard, now: Seconds) -> Vec<NoteView> {
        let travel = self.config.travel_time;
        board
            .window_range(now, travel, self.config.visible_tail)
            .filter(|&idx| board.is_pending(idx))
            .filter_map(|idx| board.note(idx))
            .map(|note| NoteView {
                note_id: note.id,
                lane: note.lane,
                hit_time: note.hit_time,
                progress: if travel > 0.0 {
                    1.0 - (note.hit_time - now) / travel
                } else {
                    1.0
                },
            })
            .collect()
    }

    /// Resolve every unresolved note whose miss window closed before `now`.
    ///
    /// Walks a cursor over the sorted chart rather than the visible set, so a
    /// note whose whole visible span fell between two frames is still missed.
    pub fn sweep(&mut self, board: &mut NoteBoard, now: Seconds) -> Vec<JudgeEvent> {
        let mut events = Vec::new();
        while let Some(note) = board.note(self.sweep_cursor).copied() {
            if now <= note.hit_time + self.config.miss_window {
                break;
            }
            if board.try_resolve(self.sweep_cursor, NoteState::Missed) {
                events.push(JudgeEvent::Miss {
                    note_id: note.id,
                    lane: note.lane,
                });
            }
            self.sweep_cursor += 1;
        }
        events
    }

    /// Miss everything still unresolved, e.g. when the media ends early.
    pub fn sweep_remaining(&mut self, board: &mut NoteBoard) -> Vec<JudgeEvent> {
        let mut events = Vec::new();
        for idx in self.sweep_cursor..board.len() {
            let Some(note) = board.note(idx).copied() else {
                break;
            };
            if board.try_resolve(idx, NoteState::Missed) {
                events.push(JudgeEvent::Miss {
                    note_id: note.id,
                    lane: note.lane,
                });
            }
        }
        self.sweep_cursor = board.len();
        events
    }
}
