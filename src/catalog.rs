//! Static music catalog: scales for the scale challenge, songs for the
//! progression and song challenges.

use crate::note::NoteName::{self, *};

/// A named key and its seven notes in ascending order.
#[derive(Debug, PartialEq, Eq)]
pub struct ScaleDefinition {
    pub key: &'static str,
    pub notes: [NoteName; 7],
}

/// A song reduced to its four chord tonics plus the scale used to improvise
/// over it once the progression is solved.
#[derive(Debug, PartialEq, Eq)]
pub struct Song {
    pub title: &'static str,
    pub key: &'static str,
    pub progression: [NoteName; 4],
    pub improv_scale: &'static str,
    /// Unordered; only membership matters.
    pub scale_notes: &'static [NoteName],
}

pub static SCALES: &[ScaleDefinition] = &[
    ScaleDefinition {
        key: "Dó Maior (C)",
        notes: [C, D, E, F, G, A, B],
    },
    ScaleDefinition {
        key: "Sol Maior (G)",
        notes: [G, A, B, C, D, E, FSharp],
    },
    ScaleDefinition {
        key: "Mi Menor (Em)",
        notes: [E, FSharp, G, A, B, C, D],
    },
    ScaleDefinition {
        key: "Ré Maior (D)",
        notes: [D, E, FSharp, G, A, B, CSharp],
    },
];

pub static SONGS: &[Song] = &[
    Song {
        title: "Lindo És / O Meu Respirar",
        key: "Sol Maior (G)",
        // Em-C-G-D (vi-IV-I-V)
        progression: [E, C, G, D],
        improv_scale: "Escala Pentatônica de Mi Menor",
        scale_notes: &[E, G, A, B, D],
    },
    Song {
        title: "Pra Sempre (For the rest of my life)",
        key: "Dó Maior (C)",
        // C-G-Am-F (I-V-vi-IV)
        progression: [C, G, A, F],
        improv_scale: "Escala Pentatônica de Lá Menor",
        scale_notes: &[A, C, D, E, G],
    },
    Song {
        title: "Ousado Amor (Reckless Love)",
        key: "Lá Maior (A)",
        // A-E-F#m-D (I-V-vi-IV)
        progression: [A, E, FSharp, D],
        improv_scale: "Escala Pentatônica de Fá Sustenido Menor",
        scale_notes: &[FSharp, A, B, CSharp, E],
    },
];

/// The entries challenges are drawn from. Both lists must be non-empty.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    scales: &'static [ScaleDefinition],
    songs: &'static [Song],
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            scales: SCALES,
            songs: SONGS,
        }
    }

    pub fn scales(&self) -> &'static [ScaleDefinition] {
        self.scales
    }

    pub fn songs(&self) -> &'static [Song] {
        self.songs
    }

    /// First scale whose key name starts with `prefix`.
    pub fn scale_by_prefix(&self, prefix: &str) -> Option<&'static ScaleDefinition> {
        self.scales.iter().find(|s| s.key.starts_with(prefix))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_shapes() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.scales().len(), 4);
        assert_eq!(catalog.songs().len(), 3);
        for song in catalog.songs() {
            assert_eq!(song.scale_notes.len(), 5);
        }
    }

    #[test]
    fn test_scale_by_prefix() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.scale_by_prefix("Sol").map(|s| s.notes[0]), Some(G));
        assert_eq!(catalog.scale_by_prefix("Mi").map(|s| s.notes[0]), Some(E));
        assert!(catalog.scale_by_prefix("Lá").is_none());
    }

    #[test]
    fn test_major_scales_start_on_their_tonic() {
        for scale in SCALES {
            let letter = scale.key.rsplit('(').next().unwrap_or_default();
            let root = letter.trim_end_matches(')').trim_end_matches('m');
            assert_eq!(scale.notes[0].as_str(), root, "{}", scale.key);
        }
    }
}
