//! Domain Layer
//!
//! Pure note model: letters, accidentals, octaves and their
//! equal-tempered frequencies. No I/O.

mod note;

pub use note::{parse_note_segment, Letter, Note, NoteError, REFERENCE_FREQUENCY_HZ};
