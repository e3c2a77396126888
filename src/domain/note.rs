//! Note Model
//!
//! Maps a natural note letter, an accidental shift and an octave to a
//! fundamental frequency in equal-tempered tuning (A4 = 440 Hz).

use thiserror::Error;

/// Reference pitch: A above middle C.
pub const REFERENCE_FREQUENCY_HZ: f64 = 440.0;

/// Note parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    #[error("Unknown note letter: {0:?}")]
    UnknownNote(String),

    #[error("Invalid octave in note name: {0:?}")]
    InvalidOctave(String),
}

/// The seven natural note letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Letter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Letter {
    /// Semitone offset from C within the octave (C=0 .. B=11).
    ///
    /// Octaves number from C in scientific pitch notation, so C4 sits
    /// nine semitones below A4.
    pub fn semitones_from_c(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Parse a single letter, case-insensitively.
    pub fn from_char(c: char) -> Result<Self, NoteError> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Letter::A),
            'B' => Ok(Letter::B),
            'C' => Ok(Letter::C),
            'D' => Ok(Letter::D),
            'E' => Ok(Letter::E),
            'F' => Ok(Letter::F),
            'G' => Ok(Letter::G),
            _ => Err(NoteError::UnknownNote(c.to_string())),
        }
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
        };
        write!(f, "{}", c)
    }
}

/// A single note request: natural letter, net accidental shift in
/// semitones (sharp − flat), and octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub letter: Letter,
    /// Net accidental shift in semitones. Sharp and flat asserted
    /// together cancel out.
    pub semitone_shift: i32,
    pub octave: i32,
}

impl Note {
    pub fn natural(letter: Letter, octave: i32) -> Self {
        Self {
            letter,
            semitone_shift: 0,
            octave,
        }
    }

    /// Fundamental frequency in Hz under 12-tone equal temperament.
    ///
    /// Always positive: octave shifts multiply by powers of two and the
    /// semitone ratio 2^(1/12) never crosses zero.
    pub fn frequency(&self) -> f64 {
        let semitones_from_a4 = (self.letter.semitones_from_c() - 9)
            + 12 * (self.octave - 4)
            + self.semitone_shift;
        REFERENCE_FREQUENCY_HZ * 2f64.powf(semitones_from_a4 as f64 / 12.0)
    }
}

/// Parse a note path segment like `"C"`, `"c"` or `"C4"`.
///
/// The first character is the letter; any remainder must be an integer
/// octave. Returns the letter and the embedded octave, if present.
pub fn parse_note_segment(segment: &str) -> Result<(Letter, Option<i32>), NoteError> {
    let mut chars = segment.chars();
    let first = chars
        .next()
        .ok_or_else(|| NoteError::UnknownNote(String::new()))?;
    let letter = Letter::from_char(first)?;

    let rest = chars.as_str();
    if rest.is_empty() {
        return Ok((letter, None));
    }

    let octave = rest
        .parse::<i32>()
        .map_err(|_| NoteError::InvalidOctave(segment.to_string()))?;
    Ok((letter, Some(octave)))
}
