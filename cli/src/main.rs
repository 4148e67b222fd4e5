use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use datasync_core::{Command, Event, MediaClock, SessionCore, SessionPhase};
use datasync_domain_chart::{lane_assigner_for, DifficultyProfile, OnsetDetector};
use datasync_domain_eval::SessionResult;
use datasync_infra_decode_hound::HoundDecoder;
use datasync_infra_storage_fs::FsStorage;
use datasync_ports::audio::AudioDecodePort;
use datasync_ports::playback::MediaClockPort;
use datasync_ports::storage::StoragePort;
use datasync_ports::types::{Difficulty, Lane, LaneStrategy, MediaSource};
use log::{debug, info, warn};
use parking_lot::Mutex;

const CLOCK_RATE_HZ: u32 = 48_000;
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "datasync", about = "Audio-driven four-lane rhythm engine")]
struct Cli {
    /// Directory holding settings.json (defaults to the user config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect onsets in a WAV file and print the chart as JSON
    Analyze {
        wav: PathBuf,
        #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
        difficulty: DifficultyArg,
        #[arg(long, value_enum, default_value_t = LanesArg::Random)]
        lanes: LanesArg,
        /// Seed for the random lane picker
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play a full session against a WAV file with simulated key presses
    Autoplay {
        wav: PathBuf,
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,
        /// Press this many milliseconds after each note (negative for early)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        late_ms: i32,
        /// Skip every Nth note so it is swept as a miss
        #[arg(long)]
        miss_every: Option<usize>,
        /// Print every session event as a JSON line
        #[arg(long)]
        events: bool,
        /// Write a diagnostics bundle to this directory once the session ends
        #[arg(long)]
        diagnostics: Option<PathBuf>,
    },
    /// Run the session as a JSON-lines service: commands on stdin, events on stdout
    Serve,
    /// Print the persisted settings
    Settings,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LanesArg {
    Random,
    Cyclic,
}

impl From<LanesArg> for LaneStrategy {
    fn from(arg: LanesArg) -> Self {
        match arg {
            LanesArg::Random => LaneStrategy::Random,
            LanesArg::Cyclic => LaneStrategy::Cyclic,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = cli.log_level.parse().unwrap_or(log::LevelFilter::Info);
    let _ = env_logger::builder().filter_level(level).try_init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let storage = match cli.config_dir {
        Some(dir) => FsStorage::new(dir),
        None => FsStorage::default(),
    };

    match cli.command {
        Commands::Analyze {
            wav,
            difficulty,
            lanes,
            seed,
        } => run_analyze(&wav, difficulty.into(), lanes.into(), seed),
        Commands::Autoplay {
            wav,
            difficulty,
            late_ms,
            miss_every,
            events,
            diagnostics,
        } => run_autoplay(
            storage,
            &wav,
            AutoplayOptions {
                difficulty: difficulty.map(Difficulty::from),
                late_ms,
                miss_every,
                print_events: events,
                diagnostics,
            },
        ),
        Commands::Serve => run_serve(storage),
        Commands::Settings => run_settings(&storage),
    }
}

fn run_analyze(
    wav: &Path,
    difficulty: Difficulty,
    lanes: LaneStrategy,
    seed: Option<u64>,
) -> Result<ExitCode> {
    let pcm = HoundDecoder::new()
        .decode(&source_for(wav))
        .with_context(|| format!("decoding {}", wav.display()))?;
    let profile = DifficultyProfile::for_difficulty(difficulty);
    let mut assigner = lane_assigner_for(lanes, seed);

    let chart = OnsetDetector::default().detect_with_progress(
        &pcm,
        &profile,
        assigner.as_mut(),
        |percent| debug!("analysis {percent}%"),
    );
    info!(
        "{} notes over {:.1}s ({difficulty})",
        chart.len(),
        chart.meta().source_duration
    );

    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(ExitCode::from(0))
}

struct AutoplayOptions {
    difficulty: Option<Difficulty>,
    late_ms: i32,
    miss_every: Option<usize>,
    print_events: bool,
    diagnostics: Option<PathBuf>,
}

fn run_autoplay(storage: FsStorage, wav: &Path, opts: AutoplayOptions) -> Result<ExitCode> {
    let clock = Arc::new(MediaClock::new(CLOCK_RATE_HZ));
    let storage: Option<Box<dyn StoragePort>> = Some(Box::new(storage));
    let mut core = SessionCore::new(Box::new(HoundDecoder::new()), clock.clone(), storage)
        .context("starting session")?;

    let mut now = Instant::now();
    if let Some(difficulty) = opts.difficulty {
        core.handle_command_at(Command::SelectDifficulty { difficulty }, now)?;
    }
    core.handle_command_at(
        Command::Analyze {
            source: source_for(wav),
        },
        now,
    )?;

    let late = opts.late_ms as f64 / 1000.0;
    let mut presses: Vec<(f64, Lane)> = core
        .chart()
        .map(|chart| {
            chart
                .notes()
                .iter()
                .enumerate()
                .filter(|(i, _)| opts.miss_every.map_or(true, |n| n == 0 || (i + 1) % n != 0))
                .map(|(_, note)| (note.hit_time + late, note.lane))
                .collect()
        })
        .unwrap_or_default();
    presses.reverse();

    let frame = FRAME.as_secs_f64();
    let duration = core
        .chart()
        .map_or(0.0, |chart| chart.meta().source_duration);
    let frame_limit =
        ((duration + core.settings().countdown_seconds as f64 + 5.0) / frame).ceil() as u64;

    core.handle_command_at(Command::StartCountdown, now)?;
    let mut result: Option<SessionResult> = None;

    for _ in 0..frame_limit {
        now += FRAME;
        if core.phase() == SessionPhase::Playing {
            clock.advance_by_seconds(frame);
            while presses
                .last()
                .is_some_and(|(at, _)| *at <= clock.position())
            {
                if let Some((_, lane)) = presses.pop() {
                    core.handle_command_at(Command::Press { lane }, now)?;
                }
            }
        }
        core.tick_at(now)?;

        for event in core.drain_events() {
            if opts.print_events {
                println!("{}", serde_json::to_string(&event)?);
            }
            if let Event::SessionFinished { result: finished } = event {
                result = Some(finished);
            }
        }
        if result.is_some() {
            break;
        }
    }

    let result = result.ok_or_else(|| anyhow!("session did not finish"))?;
    if let Some(dir) = opts.diagnostics {
        core.handle_command_at(
            Command::ExportDiagnostics {
                path: dir.display().to_string(),
            },
            now,
        )
        .with_context(|| format!("writing diagnostics to {}", dir.display()))?;
        info!("diagnostics written to {}", dir.display());
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.pass {
        ExitCode::from(0)
    } else {
        ExitCode::from(2)
    })
}

/// Same shape as a desktop host: a command thread feeding the shared core and
/// a frame loop that ticks it and forwards events.
fn run_serve(storage: FsStorage) -> Result<ExitCode> {
    let clock = Arc::new(MediaClock::new(CLOCK_RATE_HZ));
    let storage: Option<Box<dyn StoragePort>> = Some(Box::new(storage));
    let core = SessionCore::new(Box::new(HoundDecoder::new()), clock.clone(), storage)
        .context("starting session")?;
    let core = Arc::new(Mutex::new(core));
    let input_closed = Arc::new(AtomicBool::new(false));

    let reader = {
        let core = core.clone();
        let input_closed = input_closed.clone();
        std::thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("stdin closed: {err}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Command>(&line) {
                    Ok(command) => {
                        if let Err(err) = core.lock().handle_command(command) {
                            warn!("command rejected: {err}");
                        }
                    }
                    Err(err) => warn!("unparseable command {line:?}: {err}"),
                }
            }
            input_closed.store(true, Ordering::Release);
        })
    };

    let mut last = Instant::now();
    let mut stdout = io::stdout().lock();
    loop {
        let now = Instant::now();
        clock.advance_by_seconds(now.duration_since(last).as_secs_f64());
        last = now;

        let (events, phase) = {
            let mut core = core.lock();
            core.tick_at(now)?;
            (core.drain_events(), core.phase())
        };
        for event in events {
            writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
        }
        stdout.flush()?;

        let idle = matches!(phase, SessionPhase::Idle | SessionPhase::Results);
        if idle && input_closed.load(Ordering::Acquire) {
            break;
        }
        std::thread::sleep(FRAME);
    }

    reader
        .join()
        .map_err(|_| anyhow!("command reader panicked"))?;
    Ok(ExitCode::from(0))
}

fn run_settings(storage: &FsStorage) -> Result<ExitCode> {
    let settings = storage
        .load_settings()
        .with_context(|| format!("reading {}", storage.settings_path().display()))?;
    eprintln!("{}", storage.settings_path().display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(ExitCode::from(0))
}

fn source_for(path: &Path) -> MediaSource {
    MediaSource(path.display().to_string())
}
