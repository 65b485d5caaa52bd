//! # Transposing Instrument Model
//!
//! A transposing brass instrument sounds a fixed interval below the
//! pitch written on the page. Every crossing between the written and
//! sounding domains goes through this type; no other component may
//! apply or skip the offset, which is what keeps the two domains from
//! being mixed accidentally.

use crate::note::WrittenNote;
use crate::tuning;
use serde::{Deserialize, Serialize};

/// A fixed written-to-sounding transposition, in semitones downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransposingInstrument {
    transposition_semitones: i32,
}

impl TransposingInstrument {
    /// B-flat instrument read in treble clef: sounds a whole step
    /// below written pitch.
    pub const B_FLAT_TREBLE: TransposingInstrument = TransposingInstrument::new(2);

    /// Non-transposing (concert pitch) instrument.
    pub const CONCERT: TransposingInstrument = TransposingInstrument::new(0);

    pub const fn new(transposition_semitones: i32) -> Self {
        TransposingInstrument {
            transposition_semitones,
        }
    }

    pub const fn transposition_semitones(self) -> i32 {
        self.transposition_semitones
    }

    /// Written pitch index to the sounding pitch index the microphone
    /// will actually hear.
    pub const fn written_to_sounding(self, pitch_index: i32) -> i32 {
        pitch_index - self.transposition_semitones
    }

    /// Inverse of [`written_to_sounding`](Self::written_to_sounding).
    pub const fn sounding_to_written(self, pitch_index: i32) -> i32 {
        pitch_index + self.transposition_semitones
    }

    /// Sounding frequency a written note should produce on this
    /// instrument under the given reference tuning.
    pub fn target_frequency(self, note: WrittenNote, ref_a4: f32) -> f32 {
        tuning::frequency_of_pitch_index(self.written_to_sounding(note.pitch_index()), ref_a4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::DEFAULT_A4_HZ;

    #[test]
    fn b_flat_instrument_sounds_a_whole_step_down() {
        let written_c4 = WrittenNote::parse("C4").unwrap();
        let sounding = TransposingInstrument::B_FLAT_TREBLE.written_to_sounding(written_c4.pitch_index());
        assert_eq!(sounding, 58); // A#3, concert B-flat
    }

    #[test]
    fn transposition_round_trips() {
        let horn = TransposingInstrument::B_FLAT_TREBLE;
        for p in 48..=84 {
            assert_eq!(horn.sounding_to_written(horn.written_to_sounding(p)), p);
        }
    }

    #[test]
    fn written_a4_targets_concert_g() {
        let a4 = WrittenNote::parse("A4").unwrap();
        let target = TransposingInstrument::B_FLAT_TREBLE.target_frequency(a4, DEFAULT_A4_HZ);
        assert!((target - 392.0).abs() < 0.01); // G4
    }

    #[test]
    fn concert_instrument_applies_no_offset() {
        let a4 = WrittenNote::parse("A4").unwrap();
        let target = TransposingInstrument::CONCERT.target_frequency(a4, DEFAULT_A4_HZ);
        assert!((target - 440.0).abs() < 1e-3);
    }
}
