//! # Frequency Conversion
//!
//! Equal-temperament math tying pitch indices to frequencies and
//! expressing fine deviation in cents. The reference tuning is a
//! parameter everywhere (A4 = 440 Hz by default) so the whole engine
//! can be re-pitched without touching the algorithms.
//!
//! Callers must only pass positive, finite frequencies; the pitch
//! estimator guarantees this for everything it reports.

use crate::note::WrittenNote;

/// Default reference tuning for A4.
pub const DEFAULT_A4_HZ: f32 = 440.0;

/// Equal-temperament frequency of a pitch index.
///
/// `f = refA4 * 2^((p - 69) / 12)`, where 69 is A4.
pub fn frequency_of_pitch_index(pitch_index: i32, ref_a4: f32) -> f32 {
    ref_a4 * 2.0_f32.powf((pitch_index as f32 - 69.0) / 12.0)
}

/// Nearest-semitone pitch index for a frequency.
pub fn pitch_index_from_frequency(freq: f32, ref_a4: f32) -> i32 {
    (12.0 * (freq / ref_a4).log2()).round() as i32 + 69
}

/// Signed deviation of `detected` from `target` in cents.
///
/// 100 cents is one semitone; positive means sharp, negative flat.
pub fn cents_offset(detected: f32, target: f32) -> i32 {
    (1200.0 * (detected / target).log2()).round() as i32
}

/// Cents deviation of a detected frequency from the equal-tempered
/// frequency of a target pitch index.
pub fn cents_from_target_index(detected: f32, target_pitch_index: i32, ref_a4: f32) -> i32 {
    cents_offset(detected, frequency_of_pitch_index(target_pitch_index, ref_a4))
}

/// Nearest equal-tempered note to a raw frequency, together with that
/// note's own frequency. `None` when the note falls outside the
/// representable octave range.
pub fn nearest_note(freq: f32, ref_a4: f32) -> Option<(WrittenNote, f32)> {
    let index = pitch_index_from_frequency(freq, ref_a4);
    let note = WrittenNote::from_pitch_index(index)?;
    Some((note, frequency_of_pitch_index(index, ref_a4)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_the_reference() {
        assert!((frequency_of_pitch_index(69, DEFAULT_A4_HZ) - 440.0).abs() < 1e-3);
        // One octave up doubles.
        assert!((frequency_of_pitch_index(81, DEFAULT_A4_HZ) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn index_frequency_round_trip() {
        // Representative range: C1 (24) through C8 (108).
        for p in 24..=108 {
            let f = frequency_of_pitch_index(p, DEFAULT_A4_HZ);
            assert_eq!(pitch_index_from_frequency(f, DEFAULT_A4_HZ), p);
        }
    }

    #[test]
    fn round_trip_respects_the_reference_tuning() {
        for p in 40..=90 {
            let f = frequency_of_pitch_index(p, 442.0);
            assert_eq!(pitch_index_from_frequency(f, 442.0), p);
        }
    }

    #[test]
    fn cents_of_a_frequency_against_itself_is_zero() {
        for f in [55.0, 233.08, 440.0, 1244.5] {
            assert_eq!(cents_offset(f, f), 0);
        }
    }

    #[test]
    fn cents_are_monotonic_and_semitone_is_one_hundred() {
        let target = frequency_of_pitch_index(60, DEFAULT_A4_HZ);
        let semitone_up = frequency_of_pitch_index(61, DEFAULT_A4_HZ);
        assert_eq!(cents_offset(semitone_up, target), 100);
        assert_eq!(cents_offset(target, semitone_up), -100);
        assert_eq!(cents_from_target_index(semitone_up, 60, DEFAULT_A4_HZ), 100);
        assert_eq!(cents_from_target_index(440.0, 69, DEFAULT_A4_HZ), 0);

        let mut last = i32::MIN;
        for step in 0..40 {
            let detected = target * (1.0 + step as f32 * 0.005);
            let cents = cents_offset(detected, target);
            assert!(cents >= last);
            last = cents;
        }
    }

    #[test]
    fn nearest_note_snaps_to_the_closest_semitone() {
        let (note, target) = nearest_note(443.0, DEFAULT_A4_HZ).unwrap();
        assert_eq!(note.to_string(), "A4");
        assert!((target - 440.0).abs() < 1e-3);

        let (note, _) = nearest_note(466.0, DEFAULT_A4_HZ).unwrap();
        assert_eq!(note.to_string(), "A#4");
    }
}
