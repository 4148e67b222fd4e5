use crate::countdown::{Countdown, CountdownStep};
use crate::diagnostics::{export_diagnostics, ChartSummary, RecentInput};
use crate::feedback::FeedbackSlot;
use crate::ipc::{Command, Event, SessionPhase};
use datasync_domain_chart::{lane_assigner_for, Chart, DifficultyProfile, OnsetConfig, OnsetDetector};
use datasync_domain_eval::{
    ChartScheduler, Grade, Judge, JudgeConfig, JudgeEvent, NoteBoard, NoteView, SchedulerConfig,
    ScoreUpdate, SessionAggregator, SessionResult,
};
use datasync_ports::audio::{AudioDecodePort, PcmBuffer};
use datasync_ports::playback::{MediaClockPort, PlaybackError};
use datasync_ports::storage::{SettingsDto, StorageError, StoragePort};
use datasync_ports::types::{Difficulty, Lane, MediaSource, Seconds};
use log::{debug, info, warn};
use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

const INPUT_QUEUE_CAPACITY: usize = 256;
const RECENT_INPUT_LIMIT: usize = 20;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("{command} not allowed in phase {phase:?}")]
    InvalidPhase {
        command: &'static str,
        phase: SessionPhase,
    },
}

/// A key press stamped with the media clock at the moment it happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneInput {
    pub lane: Lane,
    pub at: Seconds,
}

/// Feeds key presses from another thread into the session's input queue.
#[derive(Clone)]
pub struct InputSender {
    producer: Arc<Mutex<Producer<LaneInput>>>,
    clock: Arc<dyn MediaClockPort>,
}

impl InputSender {
    /// Returns false when the queue is full and the press was dropped.
    pub fn press(&self, lane: Lane) -> bool {
        let input = LaneInput {
            lane,
            at: self.clock.position(),
        };
        self.producer.lock().push(input).is_ok()
    }
}

struct PlayState {
    board: NoteBoard,
    scheduler: ChartScheduler,
    judge: Judge,
    aggregator: SessionAggregator,
}

impl PlayState {
    fn new(chart: Chart, profile: &DifficultyProfile) -> Self {
        let note_count = chart.len();
        Self {
            board: NoteBoard::new(chart),
            scheduler: ChartScheduler::new(SchedulerConfig::from_profile(profile)),
            judge: Judge::new(JudgeConfig::from_profile(profile)),
            aggregator: SessionAggregator::new(note_count),
        }
    }
}

pub struct SessionCore {
    decoder: Box<dyn AudioDecodePort>,
    clock: Arc<dyn MediaClockPort>,
    storage: Option<Box<dyn StoragePort>>,
    settings: SettingsDto,
    phase: SessionPhase,
    detector: OnsetDetector,
    profile: DifficultyProfile,
    play: Option<PlayState>,
    chart_summary: Option<ChartSummary>,
    countdown: Option<Countdown>,
    feedback: FeedbackSlot,
    input_tx: Arc<Mutex<Producer<LaneInput>>>,
    input_rx: Consumer<LaneInput>,
    events: VecDeque<Event>,
    recent_inputs: VecDeque<RecentInput>,
}

impl SessionCore {
    pub fn new(
        decoder: Box<dyn AudioDecodePort>,
        clock: Arc<dyn MediaClockPort>,
        storage: Option<Box<dyn StoragePort>>,
    ) -> Result<Self, SessionError> {
        let settings = match storage.as_ref().map(|s| s.load_settings()) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                warn!("settings unreadable, using defaults: {err}");
                SettingsDto::default()
            }
            None => SettingsDto::default(),
        };

        let (producer, consumer) = RingBuffer::new(INPUT_QUEUE_CAPACITY);
        let profile = DifficultyProfile::for_difficulty(settings.difficulty);
        let feedback = FeedbackSlot::new(Duration::from_millis(settings.feedback_display_ms as u64));

        Ok(Self {
            decoder,
            clock,
            storage,
            settings,
            phase: SessionPhase::Idle,
            detector: OnsetDetector::default(),
            profile,
            play: None,
            chart_summary: None,
            countdown: None,
            feedback,
            input_tx: Arc::new(Mutex::new(producer)),
            input_rx: consumer,
            events: VecDeque::new(),
            recent_inputs: VecDeque::with_capacity(RECENT_INPUT_LIMIT),
        })
    }

    pub fn with_onset_config(mut self, config: OnsetConfig) -> Self {
        self.detector = OnsetDetector::new(config);
        self
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), SessionError> {
        self.handle_command_at(cmd, Instant::now())
    }

    pub fn handle_command_at(&mut self, cmd: Command, now: Instant) -> Result<(), SessionError> {
        match cmd {
            Command::SelectDifficulty { difficulty } => {
                self.expect_phase("SelectDifficulty", &[SessionPhase::Idle])?;
                self.select_difficulty(difficulty);
            }
            Command::Analyze { source } => {
                self.expect_phase("Analyze", &[SessionPhase::Idle])?;
                self.analyze(&source)?;
            }
            Command::StartCountdown => {
                self.expect_phase("StartCountdown", &[SessionPhase::Ready])?;
                self.start_countdown(now)?;
            }
            Command::Press { lane } => {
                let at = self.clock.position();
                self.judge_input(LaneInput { lane, at }, now);
            }
            Command::Stop => {
                self.stop()?;
            }
            Command::Retry => {
                self.expect_phase("Retry", &[SessionPhase::Results])?;
                self.reset_to_idle();
            }
            Command::SetInputOffsetMs { ms } => {
                self.settings.input_offset_ms = ms;
                self.emit_settings();
                self.save_settings();
            }
            Command::ExportDiagnostics { path } => {
                export_diagnostics(
                    Path::new(&path),
                    &self.settings,
                    self.chart_summary.clone(),
                    self.result(),
                    self.recent_inputs.iter().copied().collect(),
                )?;
            }
        }
        Ok(())
    }

    /// Per-frame poll, driven by the host's redraw signal.
    pub fn tick(&mut self) -> Result<(), SessionError> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Countdown => self.advance_countdown(now)?,
            SessionPhase::Playing => {
                self.process_queued_inputs(now);
                self.sweep_misses(now);
                if self.should_finish() {
                    self.finish(now)?;
                }
            }
            _ => self.discard_queued_inputs(),
        }

        if self.feedback.expire(now) {
            self.events.push_back(Event::FeedbackCleared);
        }
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn input_sender(&self) -> InputSender {
        InputSender {
            producer: self.input_tx.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.play.as_ref().map(|p| p.board.chart())
    }

    pub fn score(&self) -> u64 {
        self.play.as_ref().map_or(0, |p| p.aggregator.score())
    }

    pub fn combo(&self) -> u32 {
        self.play.as_ref().map_or(0, |p| p.aggregator.combo())
    }

    pub fn max_score(&self) -> u64 {
        self.play.as_ref().map_or(0, |p| p.aggregator.max_score())
    }

    pub fn result(&self) -> Option<SessionResult> {
        self.play.as_ref().and_then(|p| p.aggregator.result())
    }

    pub fn feedback(&self, now: Instant) -> Option<Grade> {
        self.feedback.current(now)
    }

    /// Notes a renderer should draw this frame.
    pub fn visible_notes(&self) -> Vec<NoteView> {
        if self.phase != SessionPhase::Playing {
            return Vec::new();
        }
        let Some(play) = self.play.as_ref() else {
            return Vec::new();
        };
        play.scheduler.visible(&play.board, self.clock.position())
    }

    fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
        self.profile = DifficultyProfile::for_difficulty(difficulty);
        self.emit_settings();
        self.save_settings();
    }

    fn analyze(&mut self, source: &MediaSource) -> Result<(), SessionError> {
        self.set_phase(SessionPhase::Analyzing);

        let pcm = match self.decoder.decode(source) {
            Ok(pcm) => pcm,
            Err(err) => {
                warn!("could not analyze {source}, continuing with an empty chart: {err}");
                PcmBuffer::default()
            }
        };

        let mut lanes = lane_assigner_for(self.settings.lane_strategy, self.settings.lane_seed);
        let events = &mut self.events;
        let chart = self.detector.detect_with_progress(&pcm, &self.profile, lanes.as_mut(), |percent| {
            events.push_back(Event::AnalysisProgress { percent });
        });

        if let Err(err) = self.clock.cue(pcm.duration()) {
            warn!("could not cue {source}: {err}");
            self.set_phase(SessionPhase::Idle);
            return Err(err.into());
        }

        let summary = ChartSummary::from_chart(&chart);
        info!(
            "chart ready: {} notes over {:.1}s ({})",
            summary.note_count, summary.source_duration, summary.difficulty
        );
        let play = PlayState::new(chart, &self.profile);
        self.events.push_back(Event::ChartReady {
            note_count: summary.note_count,
            max_score: play.aggregator.max_score(),
        });
        self.chart_summary = Some(summary);
        self.play = Some(play);
        self.set_phase(SessionPhase::Ready);
        Ok(())
    }

    fn start_countdown(&mut self, now: Instant) -> Result<(), SessionError> {
        let seconds = self.settings.countdown_seconds;
        if seconds == 0 {
            return self.start_playing();
        }
        let countdown = Countdown::new(seconds, now);
        let remaining = countdown.remaining();
        self.countdown = Some(countdown);
        self.set_phase(SessionPhase::Countdown);
        self.events.push_back(Event::CountdownTick { remaining });
        Ok(())
    }

    fn advance_countdown(&mut self, now: Instant) -> Result<(), SessionError> {
        let Some(countdown) = self.countdown.as_mut() else {
            return self.start_playing();
        };
        match countdown.poll(now) {
            Some(CountdownStep::Tick { remaining }) => {
                self.events.push_back(Event::CountdownTick { remaining });
                Ok(())
            }
            Some(CountdownStep::Done) => self.start_playing(),
            None => Ok(()),
        }
    }

    fn start_playing(&mut self) -> Result<(), SessionError> {
        self.countdown = None;
        self.discard_queued_inputs();
        self.clock.play_from_start()?;
        self.set_phase(SessionPhase::Playing);
        Ok(())
    }

    fn process_queued_inputs(&mut self, now: Instant) {
        let mut pending = Vec::new();
        while let Ok(input) = self.input_rx.pop() {
            pending.push(input);
        }
        for input in pending {
            self.judge_input(input, now);
        }
    }

    fn discard_queued_inputs(&mut self) {
        while self.input_rx.pop().is_ok() {}
    }

    fn judge_input(&mut self, input: LaneInput, now: Instant) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        let at = input.at + self.settings.input_offset_ms as f64 / 1000.0;
        self.record_recent_input(RecentInput {
            lane: input.lane,
            at,
        });

        let update = self.play.as_mut().and_then(|play| {
            let event = play.judge.on_input(&mut play.board, input.lane, at)?;
            Some(play.aggregator.apply(&event))
        });
        if let Some(update) = update {
            self.publish(update, now);
        }
    }

    fn sweep_misses(&mut self, now: Instant) {
        let t = self.clock.position();
        let updates = match self.play.as_mut() {
            Some(play) => {
                let misses = play.scheduler.sweep(&mut play.board, t);
                apply_all(&mut play.aggregator, &misses)
            }
            None => Vec::new(),
        };
        for update in updates {
            self.publish(update, now);
        }
    }

    fn should_finish(&self) -> bool {
        if self.clock.has_ended() {
            return true;
        }
        self.play
            .as_ref()
            .map_or(true, |play| play.aggregator.is_complete())
    }

    fn finish(&mut self, now: Instant) -> Result<(), SessionError> {
        let (updates, result) = match self.play.as_mut() {
            Some(play) => {
                let misses = play.scheduler.sweep_remaining(&mut play.board);
                let updates = apply_all(&mut play.aggregator, &misses);
                (updates, play.aggregator.finish())
            }
            None => (Vec::new(), SessionAggregator::new(0).finish()),
        };
        for update in updates {
            self.publish(update, now);
        }

        self.clock.stop()?;
        info!(
            "session finished: {}/{} ({}%), {}",
            result.score,
            result.max_score,
            result.accuracy_percent,
            if result.pass { "pass" } else { "fail" }
        );
        self.set_phase(SessionPhase::Results);
        self.events.push_back(Event::SessionFinished { result });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        self.clock.stop()?;
        self.reset_to_idle();
        Ok(())
    }

    fn reset_to_idle(&mut self) {
        self.play = None;
        self.chart_summary = None;
        self.countdown = None;
        self.feedback.clear();
        self.discard_queued_inputs();
        self.set_phase(SessionPhase::Idle);
    }

    fn publish(&mut self, update: ScoreUpdate, now: Instant) {
        self.feedback.show(update.grade, now);
        self.events.push_back(Event::Judged {
            note_id: update.note_id,
            lane: update.lane,
            grade: update.grade,
            score_delta: update.score_delta,
            combo_after: update.combo_after,
            score: update.score_after,
        });
    }

    fn expect_phase(
        &self,
        command: &'static str,
        allowed: &[SessionPhase],
    ) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                command,
                phase: self.phase,
            })
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase == phase {
            return;
        }
        debug!("session phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.events.push_back(Event::PhaseChanged { phase });
    }

    fn record_recent_input(&mut self, input: RecentInput) {
        if self.recent_inputs.len() >= RECENT_INPUT_LIMIT {
            self.recent_inputs.pop_front();
        }
        self.recent_inputs.push_back(input);
    }

    fn emit_settings(&mut self) {
        self.events.push_back(Event::SettingsUpdated {
            settings: self.settings.clone(),
        });
    }

    fn save_settings(&self) {
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                warn!("failed to save settings: {err}");
            }
        }
    }
}

fn apply_all(aggregator: &mut SessionAggregator, events: &[JudgeEvent]) -> Vec<ScoreUpdate> {
    events.iter().map(|event| aggregator.apply(event)).collect()
}
