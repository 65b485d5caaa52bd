//! # Brass Practice Coach, terminal driver
//!
//! Thin driver around `coach-core`: it owns the microphone stream,
//! pushes fixed-size sample windows into the engine over a crossbeam
//! channel, and renders tuning and fingering feedback as terminal
//! lines. All pitch, cents, fingering, and scale decisions are made
//! by the core.

mod audio;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use coach_core::{
    Algorithm, EstimatorConfig, FingeringTable, PitchClass, ScaleCursor, TransposingInstrument,
    ValveCombination, WrittenNote, analyze_window, build_major_scale,
};
use crossbeam_channel::bounded;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

/// A reading within this many cents of the target counts as in tune.
const IN_TUNE_CENTS: i32 = 25;
/// Consecutive in-tune windows required before the target advances.
const STABLE_WINDOWS_TO_ADVANCE: usize = 12;
/// Number of recent readings in the cents moving average.
const SMOOTHING_WINDOW: usize = 5;

#[derive(Parser)]
#[command(name = "coach")]
#[command(version, about = "Ear-training coach for a 3-valve brass instrument")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen to the microphone and show live tuning against one written note
    Listen {
        /// Written target note, e.g. C4 or Bb4
        #[arg(default_value = "C4")]
        note: String,

        #[command(flatten)]
        opts: ListenOpts,
    },

    /// Practice a major scale; hold each degree in tune to advance
    Scale {
        /// Written tonic pitch class, e.g. C, F, Bb
        #[arg(default_value = "C")]
        tonic: String,

        /// Starting octave for the tonic
        #[arg(long, default_value_t = 4)]
        octave: i32,

        /// Highest written pitch index kept when clamping the scale
        #[arg(long, default_value_t = 71)]
        max_pitch_index: i32,

        #[command(flatten)]
        opts: ListenOpts,
    },

    /// Random flashcard targets from the fourth-octave practice pool
    Flashcards {
        #[command(flatten)]
        opts: ListenOpts,
    },

    /// Check a valve combination against the fingering chart
    Fingering {
        /// Written note, e.g. C#4
        note: String,

        /// Valve digits in any order (e.g. 21), or 0 for open
        valves: String,

        /// JSON fingering chart to use instead of the built-in table
        #[arg(long)]
        table: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ListenOpts {
    /// Detection strategy: yin or acf
    #[arg(long, default_value = "yin")]
    algorithm: String,

    /// RMS noise gate; raise it in noisy rooms
    #[arg(long, default_value_t = 0.003)]
    gate: f32,

    /// Reference tuning for A4 in Hz
    #[arg(long, default_value_t = 440.0)]
    a4: f32,

    /// Written-to-sounding transposition in semitones (2 = B-flat treble)
    #[arg(long, default_value_t = 2)]
    transpose: i32,

    /// Samples per analysis window
    #[arg(long, default_value_t = audio::DEFAULT_WINDOW_SIZE)]
    window: usize,
}

impl ListenOpts {
    fn estimator_config(&self) -> Result<EstimatorConfig> {
        let algorithm = match self.algorithm.as_str() {
            "yin" => Algorithm::Yin,
            "acf" | "autocorrelation" => Algorithm::Autocorrelation,
            other => bail!("unknown algorithm `{other}` (expected yin or acf)"),
        };
        Ok(EstimatorConfig {
            algorithm,
            noise_gate: self.gate,
            ..EstimatorConfig::default()
        })
    }

    fn instrument(&self) -> TransposingInstrument {
        TransposingInstrument::new(self.transpose)
    }
}

/// How the session picks the next target once the current one is held
/// in tune.
enum Practice {
    /// One fixed target; never advances.
    Single(WrittenNote),
    /// Ping-pong traversal of a scale sequence.
    Scale {
        sequence: Vec<WrittenNote>,
        cursor: ScaleCursor,
    },
    /// Uniform random draws from a pool.
    Flashcards {
        pool: Vec<WrittenNote>,
        current: WrittenNote,
    },
}

impl Practice {
    fn flashcards(pool: Vec<WrittenNote>) -> Practice {
        let mut rng = rand::thread_rng();
        let current = *pool.choose(&mut rng).expect("practice pool is never empty");
        Practice::Flashcards { pool, current }
    }

    fn current(&self) -> WrittenNote {
        match self {
            Practice::Single(note) => *note,
            Practice::Scale { sequence, cursor } => sequence[cursor.index()],
            Practice::Flashcards { current, .. } => *current,
        }
    }

    /// Moves to the next target, or stays put for a single note.
    fn advance(&mut self) -> WrittenNote {
        match self {
            Practice::Single(note) => *note,
            Practice::Scale { sequence, cursor } => {
                let index = cursor.advance(sequence.len());
                sequence[index]
            }
            Practice::Flashcards { pool, current } => {
                let mut rng = rand::thread_rng();
                *current = *pool.choose(&mut rng).unwrap_or(current);
                *current
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Listen { note, opts } => {
            let target = WrittenNote::parse(&note)?;
            run_session(Practice::Single(target), &opts)
        }
        Commands::Scale {
            tonic,
            octave,
            max_pitch_index,
            opts,
        } => {
            let tonic = PitchClass::from_name(&tonic)?;
            let sequence = build_major_scale(tonic, octave, max_pitch_index);
            run_session(
                Practice::Scale {
                    sequence,
                    cursor: ScaleCursor::new(),
                },
                &opts,
            )
        }
        Commands::Flashcards { opts } => {
            run_session(Practice::flashcards(coach_core::note::practice_pool()), &opts)
        }
        Commands::Fingering {
            note,
            valves,
            table,
        } => check_fingering(&note, &valves, table.as_deref()),
    }
}

/// Capture → analyze → render loop shared by all listening modes.
fn run_session(mut practice: Practice, opts: &ListenOpts) -> Result<()> {
    let config = opts.estimator_config()?;
    let instrument = opts.instrument();

    // Small bound: stale windows are worthless, let the callback drop them.
    let (sender, receiver) = bounded::<Vec<f32>>(8);
    let (_stream, sample_rate) = audio::start_capture(sender, opts.window)?;

    let mut target = practice.current();
    let mut target_frequency = instrument.target_frequency(target, opts.a4);
    println!(
        "target {target} (sounds {target_frequency:.1} Hz), aim within ±{IN_TUNE_CENTS}¢, Ctrl-C to quit"
    );

    let mut recent_cents: VecDeque<i32> = VecDeque::with_capacity(SMOOTHING_WINDOW);
    let mut stable_windows = 0_usize;

    for window in receiver.iter() {
        let result = analyze_window(&window, sample_rate, &config, target, instrument, opts.a4)?;

        match result.cents_deviation {
            Some(cents) => {
                if recent_cents.len() == SMOOTHING_WINDOW {
                    recent_cents.pop_front();
                }
                recent_cents.push_back(cents);
            }
            None => {
                recent_cents.clear();
                stable_windows = 0;
            }
        }

        let smoothed = average(&recent_cents);
        render_meter(target, target_frequency, result.detected_frequency, smoothed);

        if let Some(cents) = smoothed {
            if cents.abs() <= IN_TUNE_CENTS {
                stable_windows += 1;
            } else {
                stable_windows = 0;
            }
        }

        if stable_windows >= STABLE_WINDOWS_TO_ADVANCE {
            println!();
            println!("in tune, next note");
            target = practice.advance();
            target_frequency = instrument.target_frequency(target, opts.a4);
            println!("target {target} (sounds {target_frequency:.1} Hz)");
            recent_cents.clear();
            stable_windows = 0;
        }
    }

    Ok(())
}

fn average(values: &VecDeque<i32>) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<i32>() / values.len() as i32)
}

/// One status line: target, detection, cents, and a coarse meter.
fn render_meter(
    target: WrittenNote,
    target_frequency: f32,
    detected: Option<f32>,
    cents: Option<i32>,
) {
    const WIDTH: i32 = 21; // odd, so zero sits on the center tick

    let line = match (detected, cents) {
        (Some(freq), Some(cents)) => {
            let clamped = cents.clamp(-100, 100);
            let position = ((clamped + 100) * (WIDTH - 1) / 200).clamp(0, WIDTH - 1);
            let meter: String = (0..WIDTH)
                .map(|i| if i == position { '|' } else { '-' })
                .collect();
            format!(
                "{target} {target_frequency:6.1} Hz  [{meter}]  {freq:6.1} Hz  {cents:+4}¢"
            )
        }
        _ => format!("{target} {target_frequency:6.1} Hz  [    no pitch    ]"),
    };

    print!("\r{line:<70}");
    let _ = std::io::stdout().flush();
}

/// Fingering verdict for one note and valve combination.
fn check_fingering(note: &str, valves: &str, table_path: Option<&std::path::Path>) -> Result<()> {
    let note = WrittenNote::parse(note)?;
    let pressed = ValveCombination::parse(valves)?;

    let table = match table_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading fingering chart {}", path.display()))?;
            serde_json::from_str::<FingeringTable>(&text)
                .with_context(|| format!("parsing fingering chart {}", path.display()))?
        }
        None => FingeringTable::default(),
    };

    let expected: Vec<String> = table
        .expected_for(note)
        .iter()
        .map(|c| c.to_string())
        .collect();

    if table.is_acceptable(pressed, note) {
        println!("correct: {pressed} plays {note}");
    } else if table.is_partial_progress(pressed, note) {
        println!(
            "keep going: {pressed} is part of {} for {note}",
            table.primary_for(note)
        );
    } else {
        println!(
            "incorrect: {pressed}, {note} wants {}",
            expected.join(" or ")
        );
    }
    Ok(())
}
