//! Roman-numeral degree labels for chord tonics, display only.
//!
//! The key is resolved by the first word of its name against the scale
//! catalog ("Sol" in "Sol Maior (G)"), not by deriving a key signature.
//! Chord quality is assumed from the usual major-key pattern: II, III and VI
//! are labelled minor.

use crate::catalog::Catalog;
use crate::note::NoteName;

const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Key roots that never get the A# -> B substitution.
const NO_SUBSTITUTION_ROOT: &str = "Fá";

/// Label for `note` within the key `key_name`, or an empty string when the key
/// is not in the catalog or the note is not in its scale.
pub fn name_degree(catalog: &Catalog, key_name: &str, note: NoteName) -> String {
    let Some(root) = key_name.split_whitespace().next() else {
        return String::new();
    };
    let Some(scale) = catalog.scale_by_prefix(root) else {
        return String::new();
    };

    let position = |n: NoteName| scale.notes.iter().position(|&s| s == n);

    let index = position(note).or_else(|| {
        // The only enharmonic fallback: A# is read as B.
        if note == NoteName::ASharp && root != NO_SUBSTITUTION_ROOT {
            position(NoteName::B)
        } else {
            None
        }
    });

    match index {
        Some(i) => {
            let numeral = NUMERALS[i];
            if matches!(i, 1 | 2 | 5) {
                format!("{numeral}m")
            } else {
                numeral.to_string()
            }
        }
        None => String::new(),
    }
}
