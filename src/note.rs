use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Pitch classes (chromatic scale, sharp spelling). Octave-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Semitone within an octave (C=0, B=11)
    pub fn semitone(self) -> u8 {
        match self {
            NoteName::C => 0,
            NoteName::CSharp => 1,
            NoteName::D => 2,
            NoteName::DSharp => 3,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::FSharp => 6,
            NoteName::G => 7,
            NoteName::GSharp => 8,
            NoteName::A => 9,
            NoteName::ASharp => 10,
            NoteName::B => 11,
        }
    }

    /// Display label, sharp spelling ("C#")
    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }

    pub fn is_sharp(self) -> bool {
        self.as_str().ends_with('#')
    }

    /// Convert to MIDI note number given an octave (0-8)
    /// Middle C (C4) = MIDI 60
    pub fn to_midi(self, octave: u8) -> u8 {
        (octave + 1) * 12 + self.semitone()
    }

    /// Frequency in Hz (A4 = 440 Hz)
    pub fn to_freq(self, octave: u8) -> f64 {
        let midi = self.to_midi(octave) as f64;
        440.0 * 2.0_f64.powf((midi - 69.0) / 12.0)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label that is not one of the 12 pitch classes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown note '{0}'")]
pub struct UnknownNote(pub String);

impl FromStr for NoteName {
    type Err = UnknownNote;

    /// Accepts sharp spelling ("F#") and flat spelling ("Gb").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownNote(s.to_string());
        let mut chars = s.trim().chars();

        let base = match chars.next() {
            Some('C') | Some('c') => 0,
            Some('D') | Some('d') => 2,
            Some('E') | Some('e') => 4,
            Some('F') | Some('f') => 5,
            Some('G') | Some('g') => 7,
            Some('A') | Some('a') => 9,
            Some('B') | Some('b') => 11,
            _ => return Err(unknown()),
        };

        let offset: i8 = match chars.next() {
            None => 0,
            Some('#') | Some('♯') => 1,
            Some('b') | Some('♭') => -1,
            Some(_) => return Err(unknown()),
        };
        if chars.next().is_some() {
            return Err(unknown());
        }

        let semitone = (base + offset).rem_euclid(12) as usize;
        Ok(NoteName::ALL[semitone])
    }
}
