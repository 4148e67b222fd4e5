use crate::types::*;

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("media not found: {0}")]
    NotFound(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Decoded mono PCM, amplitudes in [-1, 1].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate_hz: u32,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>, sample_rate_hz: u32) -> Self {
        Self {
            samples,
            sample_rate_hz,
        }
    }

    pub fn silence(duration: Seconds, sample_rate_hz: u32) -> Self {
        let len = (duration.max(0.0) * sample_rate_hz as f64).round() as usize;
        Self::new(vec![0.0; len], sample_rate_hz)
    }

    pub fn duration(&self) -> Seconds {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate_hz as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Thread model: called once per session from the core thread, before play starts.
/// The call may block for the whole decode.
pub trait AudioDecodePort: Send + Sync {
    fn decode(&self, source: &MediaSource) -> Result<PcmBuffer, AudioError>;
}
