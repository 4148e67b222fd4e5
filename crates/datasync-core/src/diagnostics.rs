use datasync_domain_chart::Chart;
use datasync_domain_eval::SessionResult;
use datasync_ports::storage::{SettingsDto, StorageError};
use datasync_ports::types::{Difficulty, Lane, Seconds};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct AppVersion {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSummary {
    pub difficulty: Difficulty,
    pub source_duration: Seconds,
    pub note_count: usize,
    pub first_hit_time: Option<Seconds>,
    pub last_hit_time: Option<Seconds>,
    pub lane_counts: [usize; 4],
}

impl ChartSummary {
    pub fn from_chart(chart: &Chart) -> Self {
        Self {
            difficulty: chart.meta().difficulty,
            source_duration: chart.meta().source_duration,
            note_count: chart.len(),
            first_hit_time: chart.first_hit_time(),
            last_hit_time: chart.last_hit_time(),
            lane_counts: chart.lane_counts(),
        }
    }
}

#[derive(Serialize)]
struct RecentInputs {
    inputs: Vec<RecentInput>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RecentInput {
    pub lane: Lane,
    pub at: Seconds,
}

pub fn export_diagnostics(
    dir: &Path,
    settings: &SettingsDto,
    chart: Option<ChartSummary>,
    result: Option<SessionResult>,
    recent_inputs: Vec<RecentInput>,
) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

    let app_version = AppVersion {
        name: "DataSync".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let platform = PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    };

    write_json(&dir.join("app_version.json"), &app_version)?;
    write_json(&dir.join("platform.json"), &platform)?;
    write_json(&dir.join("settings.json"), settings)?;
    write_json(&dir.join("chart_summary.json"), &chart)?;
    write_json(&dir.join("session_result.json"), &result)?;
    write_json(
        &dir.join("recent_inputs.json"),
        &RecentInputs {
            inputs: recent_inputs,
        },
    )?;

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}
