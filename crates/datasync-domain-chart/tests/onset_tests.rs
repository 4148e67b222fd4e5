use datasync_domain_chart::{
    CyclicLaneAssigner, DifficultyProfile, NoteId, OnsetConfig, OnsetDetector, RandomLaneAssigner,
};
use datasync_ports::audio::PcmBuffer;
use datasync_ports::types::{Difficulty, Lane};
use pretty_assertions::assert_eq;

const RATE: u32 = 1_000;

/// `duration` seconds of silence with constant-amplitude square bursts laid over it.
fn pcm_with_bursts(duration: f64, bursts: &[(f64, f64, f32)]) -> PcmBuffer {
    let mut pcm = PcmBuffer::silence(duration, RATE);
    for &(start, len, amp) in bursts {
        let from = (start * RATE as f64).round() as usize;
        let to = ((start + len) * RATE as f64).round() as usize;
        let n = pcm.samples.len();
        for (i, sample) in pcm.samples[from..to.min(n)].iter_mut().enumerate() {
            *sample = if i % 2 == 0 { amp } else { -amp };
        }
    }
    pcm
}

fn detect(pcm: &PcmBuffer, difficulty: Difficulty) -> datasync_domain_chart::Chart {
    let detector = OnsetDetector::default();
    let profile = DifficultyProfile::for_difficulty(difficulty);
    detector.detect(pcm, &profile, &mut CyclicLaneAssigner::default())
}

#[test]
fn silence_produces_empty_chart() {
    let pcm = PcmBuffer::silence(12.0, RATE);
    let chart = detect(&pcm, Difficulty::Normal);
    assert!(chart.is_empty());
    assert_eq!(chart.meta().source_duration, 12.0);
}

#[test]
fn empty_buffer_produces_empty_chart() {
    let chart = detect(&PcmBuffer::new(Vec::new(), RATE), Difficulty::Hard);
    assert!(chart.is_empty());
}

#[test]
fn sub_window_sample_rate_produces_empty_chart() {
    let pcm = PcmBuffer::new(vec![0.9; 400], 10);
    let chart = detect(&pcm, Difficulty::Easy);
    assert!(chart.is_empty());
}

#[test]
fn loud_passage_is_ordered_debounced_and_after_lead_in() {
    let pcm = pcm_with_bursts(20.0, &[(0.0, 20.0, 0.5)]);
    for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
        let profile = DifficultyProfile::for_difficulty(difficulty);
        let chart = detect(&pcm, difficulty);
        assert!(!chart.is_empty(), "{difficulty}: expected notes");

        let notes = chart.notes();
        for note in notes {
            assert!(note.hit_time > 4.0, "{difficulty}: note at {}", note.hit_time);
        }
        for pair in notes.windows(2) {
            let gap = pair[1].hit_time - pair[0].hit_time;
            assert!(gap >= profile.min_gap - 1e-9, "{difficulty}: gap {gap}");
        }
    }
}

#[test]
fn harder_profiles_produce_denser_charts() {
    let pcm = pcm_with_bursts(20.0, &[(0.0, 20.0, 0.5)]);
    let easy = detect(&pcm, Difficulty::Easy).len();
    let normal = detect(&pcm, Difficulty::Normal).len();
    let hard = detect(&pcm, Difficulty::Hard).len();
    assert!(easy < normal, "easy {easy} normal {normal}");
    assert!(normal < hard, "normal {normal} hard {hard}");
}

#[test]
fn energy_threshold_scales_with_profile() {
    // rms 0.14: above the hard (0.115) and normal (0.13) thresholds, below easy (0.15)
    let pcm = pcm_with_bursts(10.0, &[(5.0, 0.5, 0.14)]);
    assert_eq!(detect(&pcm, Difficulty::Easy).len(), 0);
    assert!(detect(&pcm, Difficulty::Normal).len() >= 1);
    assert!(detect(&pcm, Difficulty::Hard).len() >= 1);
}

#[test]
fn noise_floor_rejects_quiet_windows() {
    let detector = OnsetDetector::new(OnsetConfig {
        energy_base: 0.0,
        ..OnsetConfig::default()
    });
    let pcm = pcm_with_bursts(10.0, &[(6.0, 1.0, 0.04)]);
    let chart = detector.detect(
        &pcm,
        &DifficultyProfile::for_difficulty(Difficulty::Hard),
        &mut CyclicLaneAssigner::default(),
    );
    assert!(chart.is_empty());
}

#[test]
fn lead_in_is_never_charted() {
    let pcm = pcm_with_bursts(8.0, &[(0.0, 4.0, 0.8)]);
    assert!(detect(&pcm, Difficulty::Hard).is_empty());
}

#[test]
fn single_burst_lands_on_window_start() {
    let pcm = pcm_with_bursts(10.0, &[(6.0, 0.05, 0.6)]);
    let chart = detect(&pcm, Difficulty::Normal);
    assert_eq!(chart.len(), 1);
    let note = chart.notes()[0];
    assert_eq!(note.id, NoteId(0));
    assert!((note.hit_time - 6.0).abs() < 1e-9);
    assert_eq!(note.lane, Lane::Left);
}

#[test]
fn trailing_partial_window_is_normalised_by_full_window() {
    // 25 loud samples in the last, half-filled window: rms 0.18 / sqrt(2) < 0.13
    let pcm = pcm_with_bursts(4.075, &[(4.05, 0.025, 0.18)]);
    assert!(detect(&pcm, Difficulty::Normal).is_empty());

    let full = pcm_with_bursts(4.1, &[(4.05, 0.05, 0.18)]);
    assert_eq!(detect(&full, Difficulty::Normal).len(), 1);
}

#[test]
fn cyclic_lanes_rotate_and_ids_are_sequential() {
    let bursts: Vec<(f64, f64, f32)> = (0..6).map(|i| (5.0 + i as f64, 0.05, 0.6)).collect();
    let pcm = pcm_with_bursts(12.0, &bursts);
    let chart = detect(&pcm, Difficulty::Normal);

    let lanes: Vec<Lane> = chart.notes().iter().map(|n| n.lane).collect();
    assert_eq!(
        lanes,
        vec![Lane::Left, Lane::Down, Lane::Up, Lane::Right, Lane::Left, Lane::Down]
    );
    let ids: Vec<u64> = chart.notes().iter().map(|n| n.id.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(chart.lane_counts(), [2, 2, 1, 1]);
}

#[test]
fn seeded_random_lanes_are_reproducible() {
    let pcm = pcm_with_bursts(20.0, &[(0.0, 20.0, 0.5)]);
    let detector = OnsetDetector::default();
    let profile = DifficultyProfile::for_difficulty(Difficulty::Hard);

    let a = detector.detect(&pcm, &profile, &mut RandomLaneAssigner::seeded(7));
    let b = detector.detect(&pcm, &profile, &mut RandomLaneAssigner::seeded(7));
    let lanes_a: Vec<Lane> = a.notes().iter().map(|n| n.lane).collect();
    let lanes_b: Vec<Lane> = b.notes().iter().map(|n| n.lane).collect();
    assert_eq!(lanes_a, lanes_b);
}

#[test]
fn progress_is_monotonic_and_finishes_at_100() {
    let pcm = pcm_with_bursts(30.0, &[(0.0, 30.0, 0.5)]);
    let detector = OnsetDetector::default();
    let profile = DifficultyProfile::for_difficulty(Difficulty::Normal);
    let mut reports = Vec::new();
    detector.detect_with_progress(&pcm, &profile, &mut CyclicLaneAssigner::default(), |p| {
        reports.push(p)
    });

    assert!(reports.len() > 2);
    assert_eq!(reports.first().copied(), Some(0));
    assert_eq!(reports.last().copied(), Some(100));
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
}
