use datasync_ports::types::{Difficulty, Lane, Seconds};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub hit_time: Seconds,
    pub lane: Lane,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartMeta {
    pub difficulty: Difficulty,
    pub source_duration: Seconds,
}

/// Notes for one session, ordered by non-decreasing hit time. Immutable once built.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "ChartRecord")]
pub struct Chart {
    meta: ChartMeta,
    notes: Vec<Note>,
}

/// Wire form of a chart; deserialized notes are re-sorted through `Chart::new`.
#[derive(Deserialize)]
struct ChartRecord {
    meta: ChartMeta,
    notes: Vec<Note>,
}

impl From<ChartRecord> for Chart {
    fn from(record: ChartRecord) -> Self {
        Chart::new(record.meta, record.notes)
    }
}

impl Chart {
    pub fn new(meta: ChartMeta, mut notes: Vec<Note>) -> Self {
        notes.sort_by(|a, b| a.hit_time.total_cmp(&b.hit_time));
        Self { meta, notes }
    }

    pub fn empty(meta: ChartMeta) -> Self {
        Self {
            meta,
            notes: Vec::new(),
        }
    }

    pub fn meta(&self) -> &ChartMeta {
        &self.meta
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn first_hit_time(&self) -> Option<Seconds> {
        self.notes.first().map(|n| n.hit_time)
    }

    pub fn last_hit_time(&self) -> Option<Seconds> {
        self.notes.last().map(|n| n.hit_time)
    }

    pub fn lane_counts(&self) -> [usize; 4] {
        let mut counts = [0usize; 4];
        for note in &self.notes {
            counts[note.lane.index()] += 1;
        }
        counts
    }
}
