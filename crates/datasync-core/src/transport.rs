use datasync_ports::types::{SampleTime, Seconds};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
}

/// Sample-accurate playback position of one media file.
#[derive(Clone, Debug)]
pub struct Transport {
    state: TransportState,
    sample_rate_hz: u32,
    position_sample: SampleTime,
    length_samples: Option<SampleTime>,
}

impl Transport {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            state: TransportState::Stopped,
            sample_rate_hz: sample_rate_hz.max(1),
            position_sample: 0,
            length_samples: None,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn play(&mut self) {
        self.state = TransportState::Playing;
    }

    pub fn pause(&mut self) {
        self.state = TransportState::Paused;
    }

    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.position_sample = 0;
    }

    pub fn set_length(&mut self, duration: Option<Seconds>) {
        self.length_samples = duration.map(|d| seconds_to_samples(d, self.sample_rate_hz));
    }

    pub fn seek_seconds(&mut self, seconds: Seconds) {
        self.position_sample = self.clamp_to_length(seconds_to_samples(seconds, self.sample_rate_hz));
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn advance_by_samples(&mut self, frames: u32) {
        if self.state != TransportState::Playing {
            return;
        }
        let next = self.position_sample.saturating_add(frames as u64);
        self.position_sample = self.clamp_to_length(next);
    }

    pub fn now_sample(&self) -> SampleTime {
        self.position_sample
    }

    pub fn now_seconds(&self) -> Seconds {
        samples_to_seconds(self.position_sample, self.sample_rate_hz)
    }

    /// True once a media with known length has played to its end.
    pub fn has_ended(&self) -> bool {
        match self.length_samples {
            Some(len) => self.state != TransportState::Stopped && self.position_sample >= len,
            None => false,
        }
    }

    fn clamp_to_length(&self, sample: SampleTime) -> SampleTime {
        match self.length_samples {
            Some(len) => sample.min(len),
            None => sample,
        }
    }
}

pub fn seconds_to_samples(seconds: Seconds, sample_rate_hz: u32) -> SampleTime {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate_hz as f64).round() as u64
}

pub fn samples_to_seconds(sample: SampleTime, sample_rate_hz: u32) -> Seconds {
    sample as f64 / sample_rate_hz.max(1) as f64
}
