// coach-core/src/lib.rs

//! The core logic for the brass practice coach.
//! This crate is responsible for pitch detection, note and frequency
//! math, valve-fingering checks, and scale building. It is completely
//! headless and performs no I/O: audio capture and rendering belong
//! to the driver that calls in.

pub mod fingering;
pub mod instrument;
pub mod note;
pub mod pitch;
pub mod scale;
pub mod tuning;

pub use fingering::{FingeringTable, ValveCombination};
pub use instrument::TransposingInstrument;
pub use note::{ParseError, PitchClass, WrittenNote};
pub use pitch::{Algorithm, ConfigError, EstimatorConfig};
pub use scale::{Direction, ScaleCursor, build_major_scale};

/// Result of analyzing a single audio window against a written target.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// The detected fundamental in Hz, if any.
    pub detected_frequency: Option<f32>,
    /// Sounding frequency the written target should produce.
    pub target_frequency: f32,
    /// Deviation from the target in cents, when a pitch was detected.
    pub cents_deviation: Option<i32>,
    /// Nearest equal-tempered note to the detected frequency, in the
    /// sounding domain.
    pub nearest_note: Option<WrittenNote>,
}

/// Runs the full per-window pipeline: pitch estimation, transposition
/// of the written target into the sounding domain, and cents
/// comparison.
///
/// This is the single place the written/sounding boundary is crossed;
/// callers hand in written targets and read sounding-domain results.
pub fn analyze_window(
    samples: &[f32],
    sample_rate: u32,
    config: &EstimatorConfig,
    target: WrittenNote,
    instrument: TransposingInstrument,
    ref_a4: f32,
) -> Result<AnalysisResult, ConfigError> {
    let detected = pitch::estimate_pitch(samples, sample_rate, config)?;
    let target_frequency = instrument.target_frequency(target, ref_a4);
    Ok(AnalysisResult {
        detected_frequency: detected,
        target_frequency,
        cents_deviation: detected.map(|f| tuning::cents_offset(f, target_frequency)),
        nearest_note: detected
            .and_then(|f| tuning::nearest_note(f, ref_a4))
            .map(|(note, _)| note),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::DEFAULT_A4_HZ;

    fn sine(freq: f32, len: usize, sample_rate: u32) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn written_b4_matches_concert_a_on_a_b_flat_horn() {
        let samples = sine(440.0, 2048, 44100);
        let target = WrittenNote::parse("B4").unwrap();
        let result = analyze_window(
            &samples,
            44100,
            &EstimatorConfig::default(),
            target,
            TransposingInstrument::B_FLAT_TREBLE,
            DEFAULT_A4_HZ,
        )
        .unwrap();

        assert!((result.target_frequency - 440.0).abs() < 1e-3);
        let cents = result.cents_deviation.expect("tone should be detected");
        assert!(cents.abs() <= 8, "cents off by {cents}");
        assert_eq!(result.nearest_note.unwrap().to_string(), "A4");
    }

    #[test]
    fn silent_window_reports_no_pitch_but_a_target() {
        let samples = vec![0.0; 2048];
        let target = WrittenNote::parse("C4").unwrap();
        let result = analyze_window(
            &samples,
            44100,
            &EstimatorConfig::default(),
            target,
            TransposingInstrument::CONCERT,
            DEFAULT_A4_HZ,
        )
        .unwrap();

        assert_eq!(result.detected_frequency, None);
        assert_eq!(result.cents_deviation, None);
        assert_eq!(result.nearest_note, None);
        assert!((result.target_frequency - 261.63).abs() < 0.01);
    }
}
