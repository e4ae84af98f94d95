//! Terminal piano: key layout, input mapping and drawing.
//!
//! One octave from C to the next C. White keys are laid out left to right;
//! black keys sit on the boundary between two white keys and cover only the
//! upper part, so they take priority when resolving a click.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::note::NoteName;

/// Map a keyboard character to a pitch class.
/// The layout spills past B (k, l, ;, ', o, p) into the same pitch classes.
pub fn char_to_note(c: char) -> Option<NoteName> {
    match c {
        // Home row: natural notes
        'a' | 'k' => Some(NoteName::C),
        's' | 'l' => Some(NoteName::D),
        'd' | ';' => Some(NoteName::E),
        'f' | '\'' => Some(NoteName::F),
        'g' => Some(NoteName::G),
        'h' => Some(NoteName::A),
        'j' => Some(NoteName::B),

        // Top row: sharps
        'w' | 'o' => Some(NoteName::CSharp),
        'e' | 'p' => Some(NoteName::DSharp),
        't' => Some(NoteName::FSharp),
        'y' => Some(NoteName::GSharp),
        'u' => Some(NoteName::ASharp),

        _ => None,
    }
}

const WHITE_KEYS: [NoteName; 8] = [
    NoteName::C,
    NoteName::D,
    NoteName::E,
    NoteName::F,
    NoteName::G,
    NoteName::A,
    NoteName::B,
    NoteName::C,
];

const WHITE_WIDTH: u16 = 6;
const WHITE_HEIGHT: u16 = 7;
const BLACK_WIDTH: u16 = 4;
const BLACK_HEIGHT: u16 = 4;

#[derive(Debug, Clone, PartialEq)]
struct Key {
    note: NoteName,
    col: u16,
    row: u16,
    width: u16,
    height: u16,
    black: bool,
}

impl Key {
    fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.col
            && col < self.col + self.width
            && row >= self.row
            && row < self.row + self.height
    }
}

/// Key geometry anchored at a terminal cell.
#[derive(Debug, Clone)]
pub struct KeyboardView {
    /// White keys first, then black keys.
    keys: Vec<Key>,
    origin_row: u16,
}

impl KeyboardView {
    pub fn new(origin_col: u16, origin_row: u16) -> Self {
        let mut keys = Vec::new();

        for (i, &note) in WHITE_KEYS.iter().enumerate() {
            keys.push(Key {
                note,
                col: origin_col + i as u16 * WHITE_WIDTH,
                row: origin_row,
                width: WHITE_WIDTH,
                height: WHITE_HEIGHT,
                black: false,
            });
        }

        // A black key straddles the boundary after the white key it sharpens.
        let mut boundary = 0;
        for note in NoteName::ALL {
            if note.is_sharp() {
                let edge = origin_col + boundary * WHITE_WIDTH;
                keys.push(Key {
                    note,
                    col: edge - BLACK_WIDTH / 2,
                    row: origin_row,
                    width: BLACK_WIDTH,
                    height: BLACK_HEIGHT,
                    black: true,
                });
            } else {
                boundary += 1;
            }
        }

        Self { keys, origin_row }
    }

    /// Pitch class of the key under a terminal cell, black keys first.
    pub fn resolve_click(&self, col: u16, row: u16) -> Option<NoteName> {
        self.keys
            .iter()
            .rev()
            .find(|k| k.contains(col, row))
            .map(|k| k.note)
    }

    /// Draw the keyboard, filling every key of `highlight`'s pitch class with its color.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        highlight: Option<(NoteName, Color)>,
    ) -> io::Result<()> {
        let fill = |key: &Key| match highlight {
            Some((note, color)) if note == key.note => color,
            _ if key.black => Color::Black,
            _ => Color::White,
        };

        for key in self.keys.iter().filter(|k| !k.black) {
            let bg = fill(key);
            for row in key.row..key.row + key.height {
                queue!(
                    out,
                    MoveTo(key.col, row),
                    SetBackgroundColor(bg),
                    SetForegroundColor(Color::DarkGrey),
                    Print("│"),
                    Print(" ".repeat(key.width as usize - 1)),
                )?;
            }
            queue!(
                out,
                MoveTo(key.col + key.width / 3, self.origin_row + key.height - 1),
                SetForegroundColor(Color::Black),
                Print(key.note),
            )?;
        }

        for key in self.keys.iter().filter(|k| k.black) {
            let bg = fill(key);
            for row in key.row..key.row + key.height {
                queue!(
                    out,
                    MoveTo(key.col, row),
                    SetBackgroundColor(bg),
                    Print(" ".repeat(key.width as usize)),
                )?;
            }
        }

        queue!(out, ResetColor)?;
        out.flush()
    }

    /// Redraw with no highlight.
    pub fn reset<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.render(out, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_mapping() {
        assert_eq!(char_to_note('a'), Some(NoteName::C));
        assert_eq!(char_to_note('w'), Some(NoteName::CSharp));
        assert_eq!(char_to_note('k'), Some(NoteName::C));
        assert_eq!(char_to_note('t'), Some(NoteName::FSharp));
        assert_eq!(char_to_note('z'), None);
    }

    #[test]
    fn test_every_pitch_class_is_typeable() {
        let keys = "awsedftgyhuj";
        for (c, note) in keys.chars().zip(NoteName::ALL) {
            assert_eq!(char_to_note(c), Some(note), "key {c}");
        }
    }

    #[test]
    fn test_layout_has_thirteen_keys() {
        let view = KeyboardView::new(0, 0);
        assert_eq!(view.keys.iter().filter(|k| !k.black).count(), 8);
        assert_eq!(view.keys.iter().filter(|k| k.black).count(), 5);
        assert_eq!(view.keys[7].col + WHITE_WIDTH, 48);
    }

    #[test]
    fn test_click_on_white_keys() {
        let view = KeyboardView::new(2, 3);
        // Bottom row, middle of each white key.
        let bottom = 3 + WHITE_HEIGHT - 1;
        for (i, &note) in WHITE_KEYS.iter().enumerate() {
            let col = 2 + i as u16 * WHITE_WIDTH + WHITE_WIDTH / 2;
            assert_eq!(view.resolve_click(col, bottom), Some(note));
        }
    }

    #[test]
    fn test_black_keys_take_priority() {
        let view = KeyboardView::new(2, 3);
        // The C#/D boundary sits at column 2 + 6 = 8.
        assert_eq!(view.resolve_click(8, 3), Some(NoteName::CSharp));
        assert_eq!(view.resolve_click(7, 4), Some(NoteName::CSharp));
        // Same column below the black key is the white key.
        assert_eq!(view.resolve_click(8, 3 + BLACK_HEIGHT), Some(NoteName::D));
        // Between E and F there is no black key.
        let ef = 2 + 3 * WHITE_WIDTH;
        assert_eq!(view.resolve_click(ef, 3), Some(NoteName::F));
        assert_eq!(view.resolve_click(ef - 1, 3), Some(NoteName::E));
    }

    #[test]
    fn test_click_outside_is_none() {
        let view = KeyboardView::new(2, 3);
        assert_eq!(view.resolve_click(0, 4), None);
        assert_eq!(view.resolve_click(10, 2), None);
        assert_eq!(view.resolve_click(10, 3 + WHITE_HEIGHT), None);
        assert_eq!(view.resolve_click(2 + 8 * WHITE_WIDTH, 5), None);
    }

    #[test]
    fn test_render_writes_labels() {
        let view = KeyboardView::new(0, 0);
        let mut out = Vec::new();
        view.render(&mut out, Some((NoteName::E, Color::Green)))
            .unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('E'));
        assert!(text.contains('│'));
    }
}
