// Energy-threshold onset detection.
//
// Single pass over non-overlapping windows:
// 1. RMS per window
// 2. skip the lead-in before `song_start`
// 3. candidate when RMS clears both the noise floor and the profile threshold
// 4. commit when the debounce gap since the last note has passed
// 5. lane chosen by the injected `LaneAssigner`

use crate::lanes::{LaneAssigner, OnsetFeatures};
use crate::model::{Chart, ChartMeta, Note, NoteId};
use crate::profile::DifficultyProfile;
use datasync_ports::audio::PcmBuffer;
use datasync_ports::types::Seconds;
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnsetConfig {
    pub window_seconds: Seconds,
    /// Windows starting at or before this time never produce notes.
    pub song_start: Seconds,
    pub noise_floor: f32,
    /// Multiplied by the profile's energy multiplier.
    pub energy_base: f32,
    /// Progress is reported once per this many windows.
    pub progress_stride: usize,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            window_seconds: 0.05,
            song_start: 4.0,
            noise_floor: 0.05,
            energy_base: 0.1,
            progress_stride: 50,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OnsetDetector {
    config: OnsetConfig,
}

impl OnsetDetector {
    pub fn new(config: OnsetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OnsetConfig {
        &self.config
    }

    pub fn window_size(&self, sample_rate_hz: u32) -> usize {
        (sample_rate_hz as f64 * self.config.window_seconds).floor() as usize
    }

    pub fn detect(
        &self,
        pcm: &PcmBuffer,
        profile: &DifficultyProfile,
        lanes: &mut dyn LaneAssigner,
    ) -> Chart {
        self.detect_with_progress(pcm, profile, lanes, |_| {})
    }

    /// Like [`detect`](Self::detect), reporting analysis progress as a percentage.
    pub fn detect_with_progress<F>(
        &self,
        pcm: &PcmBuffer,
        profile: &DifficultyProfile,
        lanes: &mut dyn LaneAssigner,
        mut on_progress: F,
    ) -> Chart
    where
        F: FnMut(u8),
    {
        let meta = ChartMeta {
            difficulty: profile.difficulty,
            source_duration: pcm.duration(),
        };

        let window = self.window_size(pcm.sample_rate_hz);
        if window == 0 || pcm.is_empty() {
            on_progress(100);
            return Chart::empty(meta);
        }

        let threshold = self.config.energy_base * profile.energy_multiplier;
        let sample_rate = pcm.sample_rate_hz as f64;
        let total = pcm.samples.len();
        let stride = self.config.progress_stride.max(1);

        let mut notes = Vec::new();
        let mut last_note_time: Seconds = 0.0;

        for (window_index, chunk) in pcm.samples.chunks(window).enumerate() {
            let start = window_index * window;
            if window_index % stride == 0 {
                on_progress(percent(start, total));
            }

            let time = start as f64 / sample_rate;
            if time <= self.config.song_start {
                continue;
            }

            let rms = window_rms(chunk, window);
            if rms <= self.config.noise_floor || rms <= threshold {
                continue;
            }
            if time - last_note_time <= profile.min_gap {
                continue;
            }

            let features = OnsetFeatures {
                time,
                rms,
                window_index,
            };
            let lane = lanes.assign_lane(&features);
            notes.push(Note {
                id: NoteId(notes.len() as u64),
                hit_time: time,
                lane,
            });
            last_note_time = time;
        }

        on_progress(100);
        debug!(
            "onset detection: {} notes from {:.2}s of audio ({})",
            notes.len(),
            meta.source_duration,
            profile.difficulty
        );
        Chart::new(meta, notes)
    }
}

/// RMS over `chunk`, normalised by the full window size so a short trailing
/// chunk reads quieter than a full one.
pub fn window_rms(chunk: &[f32], window: usize) -> f32 {
    if window == 0 {
        return 0.0;
    }
    let sum: f32 = chunk.iter().map(|s| s * s).sum();
    (sum / window as f32).sqrt()
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round().min(100.0) as u8
}
