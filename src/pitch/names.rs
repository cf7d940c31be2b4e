//! Scientific pitch names for twelve-division tunings.
//!
//! Octaves follow the MIDI convention: C4 = 60 (middle C), C-1 = 0, and the
//! octave number always changes at C.

use super::midi_pitch::MidiPitch;
use crate::error::StaffError;
use std::fmt;
use std::str::FromStr;

/// Note letter to semitone offset from C.
fn letter_to_semitone(letter: char) -> Option<i32> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Sharp spellings for each pitch class.
const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

impl FromStr for MidiPitch {
    type Err = StaffError;

    /// Parses names like `"E1"`, `"F#3"`, `"Bb-1"` or `"C##4"`.
    ///
    /// ```
    /// use staff::MidiPitch;
    ///
    /// assert_eq!("E1".parse::<MidiPitch>().unwrap().number(), 28);
    /// assert_eq!("Bb-1".parse::<MidiPitch>().unwrap().number(), 10);
    /// assert!("H2".parse::<MidiPitch>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StaffError::InvalidValue(format!("'{}' is not a pitch name", s));
        let trimmed = s.trim();
        let mut chars = trimmed.chars().peekable();

        let semitone = chars.next().and_then(letter_to_semitone).ok_or_else(invalid)?;

        let mut accidental = 0;
        while let Some(&c) = chars.peek() {
            match c {
                '#' | '♯' => accidental += 1,
                'b' | '♭' => accidental -= 1,
                _ => break,
            }
            chars.next();
        }

        let octave: i32 = chars.collect::<String>().parse().map_err(|_| invalid())?;
        let number = octave
            .checked_add(1)
            .and_then(|o| o.checked_mul(12))
            .and_then(|base| base.checked_add(semitone + accidental))
            .ok_or_else(invalid)?;

        Ok(MidiPitch::new(number))
    }
}

impl fmt::Display for MidiPitch {
    /// Twelve-division pitches print as note names (`A4`, `C#-1`); any other
    /// division count prints as `number/divs`. A bend is appended in steps.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.octave_divs() == 12 {
            write!(f, "{}{}", SHARP_NAMES[self.pitch_class() as usize], self.octave())?;
        } else {
            write!(f, "{}/{}", self.number(), self.octave_divs())?;
        }
        if !self.bend().is_zero() {
            write!(f, "{:+.2}", self.bend().fraction())?;
        }
        Ok(())
    }
}
