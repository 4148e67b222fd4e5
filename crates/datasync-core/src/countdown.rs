use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownStep {
    Tick { remaining: u32 },
    Done,
}

/// "3, 2, 1" before play starts; one step per second.
#[derive(Clone, Debug)]
pub struct Countdown {
    remaining: u32,
    next_at: Instant,
    step: Duration,
}

impl Countdown {
    pub fn new(seconds: u32, now: Instant) -> Self {
        Self {
            remaining: seconds,
            next_at: now + Duration::from_secs(1),
            step: Duration::from_secs(1),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn poll(&mut self, now: Instant) -> Option<CountdownStep> {
        if self.remaining == 0 {
            return Some(CountdownStep::Done);
        }
        if now < self.next_at {
            return None;
        }
        self.next_at += self.step;
        if self.remaining <= 1 {
            self.remaining = 0;
            return Some(CountdownStep::Done);
        }
        self.remaining -= 1;
        Some(CountdownStep::Tick {
            remaining: self.remaining,
        })
    }
}
