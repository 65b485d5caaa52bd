//! # Note Model
//!
//! Written note names, enharmonic normalization, and pitch-index
//! conversion. All lookups in the rest of the crate go through
//! [`PitchClass`] and [`WrittenNote`], so flat spellings are folded
//! into their sharp equivalents exactly once, at the parsing boundary.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Error returned when a note name or pitch class cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    input: String,
}

impl ParseError {
    fn new(input: &str) -> Self {
        ParseError {
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid note name", self.input)
    }
}

impl std::error::Error for ParseError {}

/// One of the twelve semitone classes, always spelled with sharps.
///
/// Flat names are accepted on input (`Bb`, `Eb`, ...) and normalized
/// to the sharp equivalent. The original flat spelling is never
/// stored; callers that need it must keep the source text themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All twelve classes in ascending semitone order, starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Semitone index within the octave, with C = 0.
    pub const fn index(self) -> i32 {
        self as i32
    }

    /// Canonical sharp spelling of this class.
    pub const fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Class for an arbitrary semitone offset; negative values wrap.
    pub fn from_index(index: i32) -> PitchClass {
        PitchClass::ALL[(index.rem_euclid(12)) as usize]
    }

    /// Parses a pitch-class name, folding the five flat spellings
    /// (`Ab`, `Bb`, `Db`, `Eb`, `Gb`) into their sharp equivalents.
    /// Every other spelling must already be canonical.
    pub fn from_name(name: &str) -> Result<PitchClass, ParseError> {
        match name {
            "C" => Ok(PitchClass::C),
            "C#" | "Db" => Ok(PitchClass::Cs),
            "D" => Ok(PitchClass::D),
            "D#" | "Eb" => Ok(PitchClass::Ds),
            "E" => Ok(PitchClass::E),
            "F" => Ok(PitchClass::F),
            "F#" | "Gb" => Ok(PitchClass::Fs),
            "G" => Ok(PitchClass::G),
            "G#" | "Ab" => Ok(PitchClass::Gs),
            "A" => Ok(PitchClass::A),
            "A#" | "Bb" => Ok(PitchClass::As),
            "B" => Ok(PitchClass::B),
            other => Err(ParseError::new(other)),
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PitchClass::from_name(s)
    }
}

/// A written note: pitch class plus octave, e.g. `C#4`.
///
/// The integer pitch index follows MIDI numbering:
/// `(octave + 1) * 12 + class_index`, so C4 is 60 and A4 is 69.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WrittenNote {
    pitch_class: PitchClass,
    octave: i32,
}

impl WrittenNote {
    pub const fn new(pitch_class: PitchClass, octave: i32) -> Self {
        WrittenNote {
            pitch_class,
            octave,
        }
    }

    pub const fn pitch_class(self) -> PitchClass {
        self.pitch_class
    }

    pub const fn octave(self) -> i32 {
        self.octave
    }

    /// MIDI-style pitch index of this note.
    pub const fn pitch_index(self) -> i32 {
        (self.octave + 1) * 12 + self.pitch_class.index()
    }

    /// Note for a pitch index, or `None` when the index falls outside
    /// the single-digit octave range the text form can express
    /// (C0 = 12 through B9 = 131).
    pub fn from_pitch_index(pitch_index: i32) -> Option<WrittenNote> {
        if !(12..=131).contains(&pitch_index) {
            return None;
        }
        Some(WrittenNote {
            pitch_class: PitchClass::from_index(pitch_index),
            octave: pitch_index / 12 - 1,
        })
    }

    /// Parses the `"<Letter>[#|b]<digit>"` text form. The accepted
    /// shape is exactly one letter A-G, an optional `#` or `b`, and a
    /// single decimal octave digit; anything else is a [`ParseError`].
    pub fn parse(text: &str) -> Result<WrittenNote, ParseError> {
        let mut chars = text.chars();
        let octave_char = chars.next_back().ok_or_else(|| ParseError::new(text))?;
        let octave = octave_char
            .to_digit(10)
            .ok_or_else(|| ParseError::new(text))? as i32;
        let name = chars.as_str();
        if name.is_empty() {
            return Err(ParseError::new(text));
        }
        let pitch_class = PitchClass::from_name(name).map_err(|_| ParseError::new(text))?;
        Ok(WrittenNote {
            pitch_class,
            octave,
        })
    }
}

impl fmt::Display for WrittenNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class.name(), self.octave)
    }
}

impl FromStr for WrittenNote {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WrittenNote::parse(s)
    }
}

impl TryFrom<String> for WrittenNote {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WrittenNote::parse(&value)
    }
}

impl From<WrittenNote> for String {
    fn from(note: WrittenNote) -> String {
        note.to_string()
    }
}

// Notes order by pitch, not by the derived (class, octave) tuple.
impl Ord for WrittenNote {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pitch_index().cmp(&other.pitch_index())
    }
}

impl PartialOrd for WrittenNote {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The flashcard practice pool: every written note of the fourth
/// octave, C4 (pitch index 60) through B4 (71).
pub fn practice_pool() -> Vec<WrittenNote> {
    (60..=71)
        .filter_map(WrittenNote::from_pitch_index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_naturals_sharps_and_flats() {
        let c4 = WrittenNote::parse("C4").unwrap();
        assert_eq!(c4.pitch_class(), PitchClass::C);
        assert_eq!(c4.octave(), 4);
        assert_eq!(c4.pitch_index(), 60);

        let cs4 = WrittenNote::parse("C#4").unwrap();
        assert_eq!(cs4.pitch_index(), 61);

        // Flats normalize to sharps and format never restores them.
        let bb3 = WrittenNote::parse("Bb3").unwrap();
        assert_eq!(bb3.pitch_class(), PitchClass::As);
        assert_eq!(bb3.to_string(), "A#3");
        assert_eq!(WrittenNote::parse("Eb4").unwrap(), WrittenNote::parse("D#4").unwrap());
    }

    #[test]
    fn rejects_malformed_note_text() {
        for bad in ["", "4", "C", "H4", "c4", "C#", "C##4", "Cb4", "E#4", "C#10", "C 4"] {
            assert!(WrittenNote::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn pitch_index_round_trip() {
        for index in 12..=131 {
            let note = WrittenNote::from_pitch_index(index).unwrap();
            assert_eq!(note.pitch_index(), index);
            assert_eq!(WrittenNote::parse(&note.to_string()).unwrap(), note);
        }
        assert!(WrittenNote::from_pitch_index(11).is_none());
        assert!(WrittenNote::from_pitch_index(132).is_none());
    }

    #[test]
    fn a4_is_sixty_nine() {
        assert_eq!(WrittenNote::parse("A4").unwrap().pitch_index(), 69);
    }

    #[test]
    fn notes_order_by_pitch() {
        let b3 = WrittenNote::parse("B3").unwrap();
        let c4 = WrittenNote::parse("C4").unwrap();
        assert!(b3 < c4);
    }

    #[test]
    fn practice_pool_spans_the_fourth_octave() {
        let pool = practice_pool();
        assert_eq!(pool.len(), 12);
        assert_eq!(pool.first().unwrap().to_string(), "C4");
        assert_eq!(pool.last().unwrap().to_string(), "B4");
    }

    #[test]
    fn serde_uses_the_text_form() {
        let note = WrittenNote::parse("Db5").unwrap();
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(json, "\"C#5\"");
        let back: WrittenNote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, note);
    }
}
