use crate::judge::HitGrade;
use datasync_domain_chart::{Chart, Note};
use datasync_ports::types::Seconds;
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoteState {
    Pending,
    Hit { grade: HitGrade, delta: Seconds },
    Missed,
}

impl NoteState {
    pub fn is_pending(&self) -> bool {
        matches!(self, NoteState::Pending)
    }
}

/// A chart plus the resolution state of each of its notes.
///
/// Notes move `Pending -> Hit | Missed` exactly once; `try_resolve` is the only
/// way to change a state and refuses anything else.
#[derive(Clone, Debug)]
pub struct NoteBoard {
    chart: Chart,
    states: Vec<NoteState>,
    resolved: usize,
}

impl NoteBoard {
    pub fn new(chart: Chart) -> Self {
        let states = vec![NoteState::Pending; chart.len()];
        Self {
            chart,
            states,
            resolved: 0,
        }
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn note(&self, index: usize) -> Option<&Note> {
        self.chart.notes().get(index)
    }

    pub fn state(&self, index: usize) -> Option<NoteState> {
        self.states.get(index).copied()
    }

    pub fn is_pending(&self, index: usize) -> bool {
        self.states.get(index).is_some_and(NoteState::is_pending)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    pub fn pending_count(&self) -> usize {
        self.states.len() - self.resolved
    }

    pub fn is_complete(&self) -> bool {
        self.resolved == self.states.len()
    }

    /// Compare-and-set from `Pending` to `outcome`. Returns `false`, leaving the
    /// board untouched, when the note is already resolved, the index is out of
    /// range or `outcome` is itself `Pending`.
    pub fn try_resolve(&mut self, index: usize, outcome: NoteState) -> bool {
        if outcome.is_pending() {
            return false;
        }
        let Some(state) = self.states.get_mut(index) else {
            return false;
        };
        if !state.is_pending() {
            return false;
        }
        *state = outcome;
        self.resolved += 1;
        true
    }

    /// Indices of notes with `hit_time - lookahead <= now <= hit_time + tail`,
    /// resolved or not.
    pub fn window_range(&self, now: Seconds, lookahead: Seconds, tail: Seconds) -> Range<usize> {
        let notes = self.chart.notes();
        let start = notes.partition_point(|n| n.hit_time + tail < now);
        let end = notes.partition_point(|n| n.hit_time - lookahead <= now);
        if start >= end {
            return start..start;
        }
        start..end
    }
}
