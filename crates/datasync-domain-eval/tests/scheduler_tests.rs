use datasync_domain_chart::{Chart, ChartMeta, DifficultyProfile, Note, NoteId};
use datasync_domain_eval::{
    ChartScheduler, Judge, JudgeConfig, JudgeEvent, NoteBoard, SchedulerConfig,
};
use datasync_ports::types::{Difficulty, Lane};
use pretty_assertions::assert_eq;

fn board_with_hits(times: &[f64]) -> NoteBoard {
    let notes = times
        .iter()
        .enumerate()
        .map(|(i, &hit_time)| Note {
            id: NoteId(i as u64),
            hit_time,
            lane: Lane::ALL[i % 4],
        })
        .collect();
    let meta = ChartMeta {
        difficulty: Difficulty::Hard,
        source_duration: 30.0,
    };
    NoteBoard::new(Chart::new(meta, notes))
}

fn hard_scheduler() -> ChartScheduler {
    ChartScheduler::new(SchedulerConfig::from_profile(
        &DifficultyProfile::for_difficulty(Difficulty::Hard),
    ))
}

fn visible_ids(scheduler: &ChartScheduler, board: &NoteBoard, now: f64) -> Vec<u64> {
    scheduler
        .visible(board, now)
        .iter()
        .map(|v| v.note_id.0)
        .collect()
}

#[test]
fn visible_set_follows_lookahead_and_tail() {
    // hard: travel 1.2s, tail 0.5s
    let board = board_with_hits(&[5.0, 6.0, 9.0]);
    let scheduler = hard_scheduler();

    assert_eq!(visible_ids(&scheduler, &board, 3.0), Vec::<u64>::new());
    assert_eq!(visible_ids(&scheduler, &board, 3.9), vec![0]);
    assert_eq!(visible_ids(&scheduler, &board, 5.4), vec![0, 1]);
    assert_eq!(visible_ids(&scheduler, &board, 5.6), vec![1]);
    assert_eq!(visible_ids(&scheduler, &board, 8.0), vec![2]);
    assert_eq!(visible_ids(&scheduler, &board, 10.0), Vec::<u64>::new());
}

#[test]
fn visible_set_is_idempotent_within_a_frame() {
    let board = board_with_hits(&[5.0, 5.3, 5.6, 7.0]);
    let scheduler = hard_scheduler();

    let first = scheduler.visible(&board, 5.1);
    let second = scheduler.visible(&board, 5.1);
    let third = scheduler.visible(&board, 5.1);
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn resolved_notes_leave_the_visible_set() {
    let profile = DifficultyProfile::for_difficulty(Difficulty::Hard);
    let mut board = board_with_hits(&[5.0, 5.5]);
    let scheduler = hard_scheduler();
    let judge = Judge::new(JudgeConfig::from_profile(&profile));

    judge.on_input(&mut board, Lane::Left, 5.0);
    assert_eq!(visible_ids(&scheduler, &board, 5.0), vec![1]);
}

#[test]
fn progress_runs_from_spawn_to_hit() {
    let board = board_with_hits(&[5.0]);
    let scheduler = hard_scheduler();

    let spawn = 5.0 - scheduler.config().travel_time;
    let at_spawn = scheduler.visible(&board, spawn);
    assert!(at_spawn[0].progress.abs() < 1e-9);
    let at_hit = scheduler.visible(&board, 5.0);
    assert!((at_hit[0].progress - 1.0).abs() < 1e-9);
    let in_tail = scheduler.visible(&board, 5.3);
    assert!(in_tail[0].progress > 1.0);
}

#[test]
fn sweep_catches_notes_skipped_between_frames() {
    let mut board = board_with_hits(&[5.0, 5.5, 6.0, 12.0]);
    let mut scheduler = hard_scheduler();

    assert!(scheduler.sweep(&mut board, 1.0).is_empty());
    let events = scheduler.sweep(&mut board, 11.0);

    let ids: Vec<NoteId> = events.iter().map(JudgeEvent::note_id).collect();
    assert_eq!(ids, vec![NoteId(0), NoteId(1), NoteId(2)]);
    assert_eq!(board.pending_count(), 1);
}

#[test]
fn repeated_sweeps_never_double_miss() {
    let mut board = board_with_hits(&[5.0, 6.0]);
    let mut scheduler = hard_scheduler();

    let mut total = 0;
    for frame in 0..600 {
        total += scheduler.sweep(&mut board, frame as f64 / 60.0).len();
    }
    total += scheduler.sweep_remaining(&mut board).len();

    assert_eq!(total, 2);
    assert!(board.is_complete());
}

#[test]
fn sweep_remaining_resolves_every_pending_note() {
    let profile = DifficultyProfile::for_difficulty(Difficulty::Hard);
    let mut board = board_with_hits(&[5.0, 6.0, 7.0]);
    let mut scheduler = hard_scheduler();
    let judge = Judge::new(JudgeConfig::from_profile(&profile));

    judge.on_input(&mut board, Lane::Down, 6.0);
    let events = scheduler.sweep_remaining(&mut board);

    let ids: Vec<NoteId> = events.iter().map(JudgeEvent::note_id).collect();
    assert_eq!(ids, vec![NoteId(0), NoteId(2)]);
    assert!(board.is_complete());
    assert!(scheduler.sweep(&mut board, 100.0).is_empty());
}
