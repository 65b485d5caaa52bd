//! # Valve Fingering Table
//!
//! Maps written notes to the valve combinations that are accepted for
//! them, and normalizes raw valve input into a canonical form. The
//! table itself is configuration data: it serializes as a plain JSON
//! object (`{"C4": ["0"], ...}`) so a driver can swap in a different
//! fingering chart without rebuilding.

use crate::note::WrittenNote;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Error returned for valve text that is not `0` or digits drawn
/// from `1`-`3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValveParseError {
    input: String,
}

impl fmt::Display for ValveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid valve combination", self.input)
    }
}

impl std::error::Error for ValveParseError {}

/// A set of pressed valves drawn from `{1, 2, 3}`.
///
/// The canonical text form is the ascending, duplicate-free digit
/// string (`"13"`, `"123"`); `"0"` is the distinct "no valves
/// pressed" sentinel. Internally the set is a 3-bit mask, so
/// normalization (sorting, de-duplication) falls out of construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValveCombination {
    mask: u8,
}

impl ValveCombination {
    /// No valves pressed.
    pub const OPEN: ValveCombination = ValveCombination { mask: 0 };

    const fn of(mask: u8) -> Self {
        ValveCombination { mask }
    }

    /// Builds the canonical combination from pressed valve numbers.
    /// Order and repetition are irrelevant; anything outside `1..=3`
    /// is rejected.
    pub fn from_valves(valves: &[u8]) -> Result<ValveCombination, ValveParseError> {
        let mut mask = 0_u8;
        for &v in valves {
            if !(1..=3).contains(&v) {
                return Err(ValveParseError {
                    input: v.to_string(),
                });
            }
            mask |= 1 << (v - 1);
        }
        Ok(ValveCombination { mask })
    }

    /// Parses valve text. Empty input and `"0"` both mean open;
    /// otherwise every character must be a digit `1`-`3`, in any
    /// order and with repeats allowed.
    pub fn parse(text: &str) -> Result<ValveCombination, ValveParseError> {
        if text.is_empty() || text == "0" {
            return Ok(ValveCombination::OPEN);
        }
        let mut mask = 0_u8;
        for ch in text.chars() {
            match ch {
                '1' => mask |= 0b001,
                '2' => mask |= 0b010,
                '3' => mask |= 0b100,
                _ => {
                    return Err(ValveParseError {
                        input: text.to_string(),
                    });
                }
            }
        }
        Ok(ValveCombination { mask })
    }

    pub const fn is_open(self) -> bool {
        self.mask == 0
    }

    pub const fn contains(self, valve: u8) -> bool {
        valve >= 1 && valve <= 3 && self.mask & (1 << (valve - 1)) != 0
    }

    /// True when this combination is a non-empty proper subset of
    /// `expected`: the player is on the way to the right fingering
    /// but has not finished pressing it.
    pub const fn is_partial_progress_toward(self, expected: ValveCombination) -> bool {
        self.mask != 0 && self.mask != expected.mask && self.mask & expected.mask == self.mask
    }
}

impl fmt::Display for ValveCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open() {
            return f.write_str("0");
        }
        for valve in 1..=3 {
            if self.contains(valve) {
                write!(f, "{valve}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for ValveCombination {
    type Err = ValveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValveCombination::parse(s)
    }
}

impl TryFrom<String> for ValveCombination {
    type Error = ValveParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ValveCombination::parse(&value)
    }
}

impl From<ValveCombination> for String {
    fn from(combination: ValveCombination) -> String {
        combination.to_string()
    }
}

// Mask shorthands for the built-in table.
const V0: ValveCombination = ValveCombination::of(0b000);
const V1: ValveCombination = ValveCombination::of(0b001);
const V2: ValveCombination = ValveCombination::of(0b010);
const V12: ValveCombination = ValveCombination::of(0b011);
const V13: ValveCombination = ValveCombination::of(0b101);
const V23: ValveCombination = ValveCombination::of(0b110);
const V123: ValveCombination = ValveCombination::of(0b111);

/// The built-in fourth-octave chart for the supported 3-valve
/// instrument, one row per written note C4..B4. Flat-spelled targets
/// land on the same rows because [`WrittenNote`] normalizes to
/// sharps before any lookup.
static DEFAULT_TABLE: Lazy<FingeringTable> = Lazy::new(|| {
    let rows: [(i32, &[ValveCombination]); 12] = [
        (60, &[V0]),   // C4
        (61, &[V123]), // C#4
        (62, &[V13]),  // D4
        (63, &[V23]),  // D#4
        (64, &[V12]),  // E4
        (65, &[V1]),   // F4
        (66, &[V2]),   // F#4
        (67, &[V0]),   // G4
        (68, &[V23]),  // G#4
        (69, &[V12]),  // A4
        (70, &[V1]),   // A#4
        (71, &[V2]),   // B4
    ];
    let entries = rows.iter().filter_map(|&(index, combinations)| {
        WrittenNote::from_pitch_index(index).map(|note| (note, combinations.to_vec()))
    });
    FingeringTable::from_entries(entries)
});

/// Written note → acceptable valve combinations, in priority order.
/// The first entry of each row is the primary fingering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingeringTable {
    entries: BTreeMap<WrittenNote, Vec<ValveCombination>>,
}

impl FingeringTable {
    pub fn from_entries(
        entries: impl IntoIterator<Item = (WrittenNote, Vec<ValveCombination>)>,
    ) -> Self {
        FingeringTable {
            entries: entries.into_iter().collect(),
        }
    }

    /// The shared built-in fourth-octave chart.
    pub fn builtin() -> &'static FingeringTable {
        &DEFAULT_TABLE
    }

    /// Acceptable combinations for a note, never empty.
    ///
    /// Notes outside the configured chart deliberately fall back to
    /// open fingering (`["0"]`) rather than failing, so an unmapped
    /// target degrades gracefully in the caller.
    pub fn expected_for(&self, note: WrittenNote) -> &[ValveCombination] {
        const OPEN_FALLBACK: [ValveCombination; 1] = [ValveCombination::OPEN];
        match self.entries.get(&note) {
            Some(combinations) if !combinations.is_empty() => combinations,
            _ => &OPEN_FALLBACK,
        }
    }

    /// The primary (first listed) fingering for a note.
    pub fn primary_for(&self, note: WrittenNote) -> ValveCombination {
        self.expected_for(note)[0]
    }

    /// Whether the pressed combination is one of the acceptable
    /// fingerings for the target note.
    pub fn is_acceptable(&self, pressed: ValveCombination, note: WrittenNote) -> bool {
        self.expected_for(note).contains(&pressed)
    }

    /// "Keep going" feedback: pressed valves so far are a non-empty
    /// proper subset of the primary fingering.
    pub fn is_partial_progress(&self, pressed: ValveCombination, note: WrittenNote) -> bool {
        pressed.is_partial_progress_toward(self.primary_for(note))
    }
}

impl Default for FingeringTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}
