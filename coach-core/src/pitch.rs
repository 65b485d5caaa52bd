//! # Pitch Detection
//!
//! Monophonic fundamental-frequency estimation from a single windowed
//! sample buffer. Two time-domain strategies sit behind one entry
//! point: a plain autocorrelation peak search and a YIN-style
//! cumulative-mean-normalized difference search with parabolic
//! interpolation.
//!
//! Silence, noise, and ambiguous signals are steady-state conditions,
//! not faults: they come back as `Ok(None)`. Only caller
//! misconfiguration (zero sample rate, empty or too-short window) is
//! an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest window either strategy can work with. The YIN search
/// needs lags up to half the window plus one neighbor on each side
/// for interpolation.
pub const MIN_WINDOW_LEN: usize = 8;

/// Peak clarity floor for the autocorrelation strategy: the chosen
/// peak must carry at least this fraction of the lag-0 energy, which
/// keeps loud broadband noise from registering as a pitch.
const MIN_ACF_CLARITY: f32 = 0.3;

/// Which detection strategy to run on each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Autocorrelation peak search past the initial descending run.
    Autocorrelation,
    /// YIN-style normalized difference with parabolic refinement.
    Yin,
}

/// Tunable detection settings.
///
/// Instrument loudness and microphone sensitivity vary, so the gate
/// and thresholds are data, not constants baked into the algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub algorithm: Algorithm,
    /// Window RMS below this is treated as silence.
    pub noise_gate: f32,
    /// Normalized-difference threshold for the YIN dip search.
    pub yin_threshold: f32,
    /// Estimates at or above this are discarded as implausible for
    /// the instrument.
    pub max_frequency_hz: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            algorithm: Algorithm::Yin,
            noise_gate: 0.003,
            yin_threshold: 0.15,
            max_frequency_hz: 1500.0,
        }
    }
}

/// Caller-side configuration problems. Signal conditions never land
/// here; they map to a `None` estimate instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroSampleRate,
    EmptyWindow,
    WindowTooShort { len: usize, min: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroSampleRate => write!(f, "sample rate must be positive"),
            ConfigError::EmptyWindow => write!(f, "sample window is empty"),
            ConfigError::WindowTooShort { len, min } => {
                write!(f, "sample window of {len} is shorter than the minimum of {min}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Estimates the fundamental frequency of one sample window.
///
/// Returns `Ok(Some(hz))` for a detected pitch, `Ok(None)` when the
/// window is silent, noisy, or otherwise carries no usable pitch, and
/// `Err` only for invalid configuration. Any reported frequency is
/// finite, positive, and below the configured ceiling.
pub fn estimate_pitch(
    samples: &[f32],
    sample_rate: u32,
    config: &EstimatorConfig,
) -> Result<Option<f32>, ConfigError> {
    if sample_rate == 0 {
        return Err(ConfigError::ZeroSampleRate);
    }
    if samples.is_empty() {
        return Err(ConfigError::EmptyWindow);
    }
    if samples.len() < MIN_WINDOW_LEN {
        return Err(ConfigError::WindowTooShort {
            len: samples.len(),
            min: MIN_WINDOW_LEN,
        });
    }

    let raw = match config.algorithm {
        Algorithm::Autocorrelation => {
            detect_autocorrelation(samples, sample_rate as f32, config.noise_gate)
        }
        Algorithm::Yin => detect_yin(
            samples,
            sample_rate as f32,
            config.noise_gate,
            config.yin_threshold,
        ),
    };

    Ok(raw.filter(|f| f.is_finite() && *f > 0.0 && *f < config.max_frequency_hz))
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|&s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Autocorrelation strategy.
///
/// Computes `c[lag] = sum(buf[i] * buf[i + lag])` over the whole
/// window, walks past the initial descending run so the search cannot
/// lock onto the zero-lag peak, and takes the lag of the maximum that
/// follows as the period.
fn detect_autocorrelation(signal: &[f32], sample_rate: f32, noise_gate: f32) -> Option<f32> {
    if rms(signal) < noise_gate {
        return None;
    }

    let n = signal.len();
    let mut c = vec![0.0_f32; n];
    for lag in 0..n {
        let mut sum = 0.0;
        for j in 0..n - lag {
            sum += signal[j] * signal[j + lag];
        }
        c[lag] = sum;
    }

    // Skip the descending run off the zero-lag peak.
    let mut start = 0;
    while start + 1 < n && c[start] > c[start + 1] {
        start += 1;
    }

    let mut best_lag = 0;
    let mut best_val = f32::MIN;
    for (lag, &value) in c.iter().enumerate().skip(start) {
        if value > best_val {
            best_val = value;
            best_lag = lag;
        }
    }
    if best_lag == 0 {
        return None;
    }

    // A periodic signal keeps most of its energy at the period lag;
    // broadband noise spreads it out and fails this check.
    if c[0] <= 0.0 || best_val < MIN_ACF_CLARITY * c[0] {
        return None;
    }

    Some(sample_rate / best_lag as f32)
}

/// YIN-style strategy over half the window length.
fn detect_yin(signal: &[f32], sample_rate: f32, noise_gate: f32, threshold: f32) -> Option<f32> {
    if rms(signal) < noise_gate {
        return None;
    }

    let half = signal.len() / 2;
    let mut diff = vec![0.0_f32; half];

    // Squared difference function.
    for tau in 1..half {
        let mut sum = 0.0;
        for i in 0..half {
            let delta = signal[i] - signal[i + tau];
            sum += delta * delta;
        }
        diff[tau] = sum;
    }

    // Cumulative mean normalized difference.
    diff[0] = 1.0;
    let mut running_sum = 0.0;
    for tau in 1..half {
        running_sum += diff[tau];
        if running_sum > 0.0 {
            diff[tau] *= tau as f32 / running_sum;
        } else {
            diff[tau] = 1.0;
        }
    }

    // First dip under the threshold, extended while it keeps
    // decreasing so the search does not settle an octave low.
    let mut period = 0;
    let mut tau = 2;
    while tau < half {
        if diff[tau] < threshold {
            while tau + 1 < half && diff[tau + 1] < diff[tau] {
                tau += 1;
            }
            period = tau;
            break;
        }
        tau += 1;
    }
    if period == 0 || period + 1 >= half {
        return None;
    }

    // Parabolic interpolation around the minimum for sub-sample
    // accuracy.
    let y1 = diff[period - 1];
    let y2 = diff[period];
    let y3 = diff[period + 1];
    let denominator = y1 - 2.0 * y2 + y3;
    let refined = if denominator != 0.0 {
        period as f32 + (y1 - y3) / (2.0 * denominator)
    } else {
        period as f32
    };
    if refined <= 0.0 {
        return None;
    }

    Some(sample_rate / refined)
}
