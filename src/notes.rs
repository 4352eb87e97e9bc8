//! Keyboard note table: one octave from C4 to C5 on the home row.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub key: char,
    pub name: &'static str,
    /// Equal-tempered pitch in Hz.
    pub frequency: f32,
}

pub const NOTES: [Note; 8] = [
    Note { key: 'a', name: "C4", frequency: 261.63 },
    Note { key: 's', name: "D4", frequency: 293.66 },
    Note { key: 'd', name: "E4", frequency: 329.63 },
    Note { key: 'f', name: "F4", frequency: 349.23 },
    Note { key: 'g', name: "G4", frequency: 392.00 },
    Note { key: 'h', name: "A4", frequency: 440.00 },
    Note { key: 'j', name: "B4", frequency: 493.88 },
    Note { key: 'k', name: "C5", frequency: 523.25 },
];

/// Looks up the note bound to `key`, ignoring case.
pub fn note_for_key(key: char) -> Option<&'static Note> {
    let key = key.to_ascii_lowercase();
    NOTES.iter().find(|note| note.key == key)
}
