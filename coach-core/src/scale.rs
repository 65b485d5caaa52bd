//! # Scale Building and Traversal
//!
//! Major-scale sequences of written notes, plus the ping-pong cursor
//! that walks a sequence up and down during practice. Both the
//! sequence and the cursor are plain values; the driver owns whatever
//! per-session state it threads through them.

use crate::note::{PitchClass, WrittenNote};

/// Semitone steps of the major scale.
pub const MAJOR_SCALE_STEPS: [i32; 7] = [2, 2, 1, 2, 2, 2, 1];

/// Builds the written major scale from a tonic: eight notes (tonic
/// through the octave) before clamping. Entries above
/// `max_pitch_index` are dropped from the tail, but the tonic is
/// always retained even when it exceeds the clamp itself.
pub fn build_major_scale(
    tonic: PitchClass,
    start_octave: i32,
    max_pitch_index: i32,
) -> Vec<WrittenNote> {
    let tonic_note = WrittenNote::new(tonic, start_octave);
    let mut indices = Vec::with_capacity(MAJOR_SCALE_STEPS.len() + 1);
    let mut current = tonic_note.pitch_index();
    indices.push(current);
    for step in MAJOR_SCALE_STEPS {
        current += step;
        indices.push(current);
    }

    let mut notes: Vec<WrittenNote> = indices
        .into_iter()
        .filter(|&index| index <= max_pitch_index)
        .filter_map(WrittenNote::from_pitch_index)
        .collect();
    if notes.is_empty() {
        notes.push(tonic_note);
    }
    notes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Oscillating index into a scale sequence.
///
/// Advancing moves one step in the current direction; landing on
/// either end flips the direction, so a 3-note sequence yields
/// `1, 2, 1, 0, 1, ...` from a fresh cursor. Total for every sequence
/// length: a length-1 sequence stays at index 0 forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleCursor {
    index: usize,
    direction: Direction,
}

impl ScaleCursor {
    pub const fn new() -> Self {
        ScaleCursor {
            index: 0,
            direction: Direction::Ascending,
        }
    }

    pub const fn index(self) -> usize {
        self.index
    }

    pub const fn direction(self) -> Direction {
        self.direction
    }

    /// Steps the cursor through a sequence of `len` notes and returns
    /// the new index.
    pub fn advance(&mut self, len: usize) -> usize {
        if len <= 1 {
            self.index = 0;
            self.direction = Direction::Ascending;
            return 0;
        }
        // Re-clamp in case the sequence shrank since the last step.
        if self.index >= len {
            self.index = len - 1;
            self.direction = Direction::Descending;
        }
        match self.direction {
            Direction::Ascending => self.index += 1,
            Direction::Descending => self.index -= 1,
        }
        if self.index == len - 1 {
            self.direction = Direction::Descending;
        } else if self.index == 0 {
            self.direction = Direction::Ascending;
        }
        self.index
    }
}

impl Default for ScaleCursor {
    fn default() -> Self {
        ScaleCursor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(notes: &[WrittenNote]) -> Vec<String> {
        notes.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn c_major_is_eight_notes_before_clamping() {
        let scale = build_major_scale(PitchClass::C, 4, 120);
        assert_eq!(
            names(&scale),
            ["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"]
        );
    }

    #[test]
    fn clamping_drops_trailing_entries() {
        let scale = build_major_scale(PitchClass::C, 4, 71);
        assert_eq!(names(&scale), ["C4", "D4", "E4", "F4", "G4", "A4", "B4"]);
    }

    #[test]
    fn high_tonics_clamp_hard_but_keep_the_tonic() {
        // A4 major within the fourth octave: only A4 and B4 fit.
        let scale = build_major_scale(PitchClass::A, 4, 71);
        assert_eq!(names(&scale), ["A4", "B4"]);

        // Tonic above the clamp is still returned alone.
        let scale = build_major_scale(PitchClass::C, 5, 71);
        assert_eq!(names(&scale), ["C5"]);
    }

    #[test]
    fn flat_tonics_build_sharp_spelled_scales() {
        let scale = build_major_scale(PitchClass::from_name("Bb").unwrap(), 4, 120);
        assert_eq!(names(&scale)[0], "A#4");
        assert_eq!(scale.len(), 8);
    }

    #[test]
    fn three_note_sequence_oscillates_without_repeats() {
        let mut cursor = ScaleCursor::new();
        let produced: Vec<usize> = (0..7).map(|_| cursor.advance(3)).collect();
        assert_eq!(produced, [1, 2, 1, 0, 1, 2, 1]);
    }

    #[test]
    fn direction_flips_on_landing_at_the_ends() {
        let mut cursor = ScaleCursor::new();
        cursor.advance(3); // at 1, ascending
        assert_eq!(cursor.direction(), Direction::Ascending);
        cursor.advance(3); // lands on 2, flips
        assert_eq!(cursor.direction(), Direction::Descending);
        cursor.advance(3);
        cursor.advance(3); // lands on 0, flips back
        assert_eq!(cursor.direction(), Direction::Ascending);
    }

    #[test]
    fn single_note_sequence_is_total() {
        let mut cursor = ScaleCursor::new();
        for _ in 0..5 {
            assert_eq!(cursor.advance(1), 0);
        }
    }

    #[test]
    fn two_note_sequence_alternates() {
        let mut cursor = ScaleCursor::new();
        let produced: Vec<usize> = (0..6).map(|_| cursor.advance(2)).collect();
        assert_eq!(produced, [1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn cursor_reclamps_when_the_sequence_shrinks() {
        let mut cursor = ScaleCursor::new();
        for _ in 0..7 {
            cursor.advance(8);
        }
        assert_eq!(cursor.index(), 7);
        // Shrinking to 3 notes keeps the next step in range.
        let next = cursor.advance(3);
        assert!(next < 3);
    }
}
