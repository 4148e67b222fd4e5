use crate::types::*;

#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    #[error("media not cued")]
    NotCued,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Playback clock of the media the chart was generated from.
///
/// The session never reaches into ambient player state: it reads time and
/// controls playback only through this port. `position` is polled every frame
/// and from input callbacks, so implementations must be cheap and non-blocking.
pub trait MediaClockPort: Send + Sync {
    /// Prepare playback of media with the given length; position resets to 0.
    fn cue(&self, duration: Seconds) -> Result<(), PlaybackError>;

    fn play_from_start(&self) -> Result<(), PlaybackError>;
    fn stop(&self) -> Result<(), PlaybackError>;

    fn position(&self) -> Seconds;
    fn has_ended(&self) -> bool;
}
