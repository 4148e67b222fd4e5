use crate::transport::{Transport, TransportState};
use datasync_ports::playback::{MediaClockPort, PlaybackError};
use datasync_ports::types::Seconds;
use parking_lot::Mutex;

struct ClockState {
    transport: Transport,
    cued: bool,
}

/// `MediaClockPort` driven by rendered audio frames.
///
/// The host's audio callback calls `advance_by_samples` as it plays; the
/// session reads `position` from the frame loop and from input stamping.
pub struct MediaClock {
    state: Mutex<ClockState>,
}

impl MediaClock {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            state: Mutex::new(ClockState {
                transport: Transport::new(sample_rate_hz),
                cued: false,
            }),
        }
    }

    pub fn advance_by_samples(&self, frames: u32) {
        let mut state = self.state.lock();
        state.transport.advance_by_samples(frames);
    }

    pub fn advance_by_seconds(&self, seconds: Seconds) {
        let mut state = self.state.lock();
        let frames = crate::transport::seconds_to_samples(seconds, state.transport.sample_rate_hz());
        state
            .transport
            .advance_by_samples(frames.min(u32::MAX as u64) as u32);
    }

    pub fn pause(&self) {
        let mut state = self.state.lock();
        state.transport.pause();
    }

    pub fn resume(&self) {
        let mut state = self.state.lock();
        if state.transport.state() == TransportState::Paused {
            state.transport.play();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().transport.state() == TransportState::Playing
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.state.lock().transport.sample_rate_hz()
    }
}

impl MediaClockPort for MediaClock {
    fn cue(&self, duration: Seconds) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        state.transport.stop();
        state.transport.set_length(Some(duration));
        state.cued = true;
        Ok(())
    }

    fn play_from_start(&self) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        if !state.cued {
            return Err(PlaybackError::NotCued);
        }
        state.transport.seek_seconds(0.0);
        state.transport.play();
        Ok(())
    }

    fn stop(&self) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        state.transport.stop();
        Ok(())
    }

    fn position(&self) -> Seconds {
        self.state.lock().transport.now_seconds()
    }

    fn has_ended(&self) -> bool {
        self.state.lock().transport.has_ended()
    }
}
