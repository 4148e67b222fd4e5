use datasync_domain_eval::Grade;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub grade: Grade,
    pub shown_at: Instant,
}

/// Last judgement grade, shown for a short time and then cleared.
#[derive(Debug)]
pub struct FeedbackSlot {
    display: Duration,
    current: Option<Feedback>,
}

impl FeedbackSlot {
    pub fn new(display: Duration) -> Self {
        Self {
            display,
            current: None,
        }
    }

    pub fn show(&mut self, grade: Grade, now: Instant) {
        self.current = Some(Feedback {
            grade,
            shown_at: now,
        });
    }

    pub fn current(&self, now: Instant) -> Option<Grade> {
        self.current
            .filter(|f| now.saturating_duration_since(f.shown_at) < self.display)
            .map(|f| f.grade)
    }

    /// Drops expired feedback; returns true if something was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.current {
            Some(f) if now.saturating_duration_since(f.shown_at) >= self.display => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
