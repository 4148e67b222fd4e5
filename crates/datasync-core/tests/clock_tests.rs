use datasync_core::{Countdown, CountdownStep, MediaClock, Transport, TransportState};
use datasync_ports::playback::{MediaClockPort, PlaybackError};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

#[test]
fn transport_only_advances_while_playing() {
    let mut transport = Transport::new(48_000);
    transport.advance_by_samples(480);
    assert_eq!(transport.now_sample(), 0);

    transport.play();
    transport.advance_by_samples(480);
    assert_eq!(transport.now_seconds(), 0.01);

    transport.pause();
    transport.advance_by_samples(480);
    assert_eq!(transport.now_sample(), 480);
    assert_eq!(transport.state(), TransportState::Paused);
}

#[test]
fn transport_clamps_to_length_and_reports_end() {
    let mut transport = Transport::new(1_000);
    transport.set_length(Some(2.0));
    transport.play();
    transport.advance_by_samples(1_500);
    assert!(!transport.has_ended());
    transport.advance_by_samples(1_500);
    assert_eq!(transport.now_seconds(), 2.0);
    assert!(transport.has_ended());

    transport.stop();
    assert_eq!(transport.now_sample(), 0);
    assert!(!transport.has_ended());
}

#[test]
fn media_clock_requires_cue_before_play() {
    let clock = MediaClock::new(1_000);
    assert!(matches!(clock.play_from_start(), Err(PlaybackError::NotCued)));

    clock.cue(3.0).expect("cue");
    clock.play_from_start().expect("play");
    clock.advance_by_seconds(1.25);
    assert_eq!(clock.position(), 1.25);

    clock.pause();
    clock.advance_by_seconds(1.0);
    assert_eq!(clock.position(), 1.25);
    clock.resume();
    clock.advance_by_seconds(5.0);
    assert!(clock.has_ended());

    clock.play_from_start().expect("replay");
    assert_eq!(clock.position(), 0.0);
    assert!(!clock.has_ended());
}

#[test]
fn countdown_steps_once_per_second() {
    let start = Instant::now();
    let mut countdown = Countdown::new(3, start);

    assert_eq!(countdown.poll(start + Duration::from_millis(999)), None);
    assert_eq!(
        countdown.poll(start + Duration::from_secs(1)),
        Some(CountdownStep::Tick { remaining: 2 })
    );
    assert_eq!(
        countdown.poll(start + Duration::from_secs(2)),
        Some(CountdownStep::Tick { remaining: 1 })
    );
    assert_eq!(countdown.poll(start + Duration::from_millis(2_500)), None);
    assert_eq!(
        countdown.poll(start + Duration::from_secs(3)),
        Some(CountdownStep::Done)
    );
    assert_eq!(countdown.remaining(), 0);
}
