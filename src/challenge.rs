//! Challenge state machine: picks a target sequence, tracks the player's
//! progress against it and judges every submitted note.
//!
//! Sequential modes (scale, progression, song tonics) require the target in
//! order and restart from the first note on any mistake. Solving a song's
//! tonics moves the engine into improvisation, where each note is judged only
//! by membership in the song's scale and nothing accumulates.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::catalog::{Catalog, ScaleDefinition, Song};
use crate::degree::name_degree;
use crate::note::NoteName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scale,
    Progression,
    SongTonics,
    Improvisation,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Scale => "scale",
            Mode::Progression => "progression",
            Mode::SongTonics => "song",
            Mode::Improvisation => "improvisation",
        })
    }
}

/// The single active challenge.
///
/// In sequential modes `progress` is always a prefix of `target`. An empty
/// `target` outside improvisation means nothing is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeState {
    mode: Mode,
    target: Vec<NoteName>,
    progress: Vec<NoteName>,
    active_song: Option<&'static Song>,
}

impl ChallengeState {
    fn idle() -> Self {
        Self {
            mode: Mode::Scale,
            target: Vec::new(),
            progress: Vec::new(),
            active_song: None,
        }
    }

    fn sequence(mode: Mode, target: &[NoteName], active_song: Option<&'static Song>) -> Self {
        Self {
            mode,
            target: target.to_vec(),
            progress: Vec::new(),
            active_song,
        }
    }

    /// The edge out of a solved song: improvise over its scale notes.
    fn improvise(song: &'static Song) -> Self {
        Self {
            mode: Mode::Improvisation,
            target: song.scale_notes.to_vec(),
            progress: Vec::new(),
            active_song: Some(song),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> &[NoteName] {
        &self.target
    }

    pub fn progress(&self) -> &[NoteName] {
        &self.progress
    }

    pub fn active_song(&self) -> Option<&'static Song> {
        self.active_song
    }

    pub fn is_active(&self) -> bool {
        self.mode == Mode::Improvisation || !self.target.is_empty()
    }
}

/// What to show when a challenge starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    Scale { key: &'static str },
    /// The title stays hidden until the tonics are solved.
    Song { chords: usize, first_tonic: NoteName },
    Progression { chords: usize, first_tonic: NoteName },
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Announcement::Scale { key } => {
                write!(f, "SCALE challenge: play every note of {key} in order.")
            }
            Announcement::Song {
                chords,
                first_tonic,
            } => write!(
                f,
                "Guess the song! Progression: {chords} chords. Play the tonics in order. \
                 1st tonic: {first_tonic}"
            ),
            Announcement::Progression {
                chords,
                first_tonic,
            } => write!(
                f,
                "PROGRESSION challenge: play the {chords} chord tonics in order. \
                 1st tonic: {first_tonic}"
            ),
        }
    }
}

/// Result of judging one note. Never an error: wrong notes and clicks with
/// no active challenge are ordinary outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// No challenge running; the note was ignored.
    Inactive,
    Progressing {
        mode: Mode,
        next: NoteName,
        /// Degree of `next` in the song key, song challenges only.
        degree: Option<String>,
    },
    SequenceComplete { mode: Mode },
    /// Song tonics solved; the engine is now in improvisation.
    SongSolved { song: &'static Song },
    InScale { played: NoteName },
    OutOfScale { played: NoteName },
    /// Wrong note in a sequence; progress restarted.
    Incorrect { played: NoteName, expected: NoteName },
}

impl Feedback {
    pub fn is_correct(&self) -> bool {
        matches!(
            self,
            Feedback::Progressing { .. }
                | Feedback::SequenceComplete { .. }
                | Feedback::SongSolved { .. }
                | Feedback::InScale { .. }
        )
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Inactive => write!(f, "No active challenge."),
            Feedback::Progressing {
                mode: Mode::SongTonics,
                next,
                degree: Some(degree),
            } => write!(f, "Correct! Next tonic: {next} ({degree})"),
            // Keys outside the scale catalog have no degree; omit the parentheses.
            Feedback::Progressing {
                mode: Mode::SongTonics,
                next,
                ..
            } => write!(f, "Correct! Next tonic: {next}"),
            Feedback::Progressing { next, .. } => write!(f, "Correct! Next note: {next}"),
            Feedback::SequenceComplete { mode } => write!(
                f,
                "Well done! {} challenge COMPLETE. Try the next one.",
                mode.to_string().to_uppercase()
            ),
            Feedback::SongSolved { song } => {
                let notes: Vec<&str> = song.scale_notes.iter().map(|n| n.as_str()).collect();
                write!(
                    f,
                    "CORRECT PROGRESSION! The song is: {} | Key: {} | \
                     FINAL CHALLENGE (improvise): play any note of {} ({})",
                    song.title,
                    song.key,
                    song.improv_scale,
                    notes.join(", ")
                )
            }
            Feedback::InScale { played } => write!(
                f,
                "Very good! {played} is in the improvisation scale. Keep practising!"
            ),
            Feedback::OutOfScale { played } => {
                write!(f, "Oops! {played} is NOT in the improvisation scale!")
            }
            Feedback::Incorrect { played, expected } => write!(
                f,
                "WRONG! You played {played}. The expected note was {expected}. Challenge restarted!"
            ),
        }
    }
}

/// Owns the catalog, the random source and the one active challenge.
pub struct ChallengeEngine {
    catalog: Catalog,
    state: ChallengeState,
    rng: ChaCha8Rng,
}

impl ChallengeEngine {
    /// Create an engine with nothing active. `seed` drives catalog picks.
    pub fn new(catalog: Catalog, seed: u64) -> Self {
        Self {
            catalog,
            state: ChallengeState::idle(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &ChallengeState {
        &self.state
    }

    /// Start a scale challenge on a uniformly random catalog scale.
    pub fn start_scale_challenge(&mut self) -> Announcement {
        let scales = self.catalog.scales();
        let scale = &scales[self.rng.gen_range(0..scales.len())];
        self.start_scale(scale)
    }

    /// Start a song challenge on a uniformly random catalog song.
    pub fn start_song_challenge(&mut self) -> Announcement {
        let song = self.pick_song();
        self.start_song(song)
    }

    /// Start a bare progression challenge on a random song's tonics.
    pub fn start_progression_challenge(&mut self) -> Announcement {
        let song = self.pick_song();
        self.start_progression(song)
    }

    pub fn start_scale(&mut self, scale: &'static ScaleDefinition) -> Announcement {
        info!(key = scale.key, "scale challenge started");
        self.state = ChallengeState::sequence(Mode::Scale, &scale.notes, None);
        Announcement::Scale { key: scale.key }
    }

    pub fn start_song(&mut self, song: &'static Song) -> Announcement {
        info!(title = song.title, "song challenge started");
        self.state = ChallengeState::sequence(Mode::SongTonics, &song.progression, Some(song));
        Announcement::Song {
            chords: song.progression.len(),
            first_tonic: song.progression[0],
        }
    }

    pub fn start_progression(&mut self, song: &'static Song) -> Announcement {
        info!(key = song.key, "progression challenge started");
        self.state = ChallengeState::sequence(Mode::Progression, &song.progression, None);
        Announcement::Progression {
            chords: song.progression.len(),
            first_tonic: song.progression[0],
        }
    }

    /// Judge one note against the active challenge.
    pub fn submit_note(&mut self, note: NoteName) -> Feedback {
        if !self.state.is_active() {
            debug!(%note, "no active challenge");
            return Feedback::Inactive;
        }

        if self.state.mode == Mode::Improvisation {
            return if self.state.target.contains(&note) {
                Feedback::InScale { played: note }
            } else {
                Feedback::OutOfScale { played: note }
            };
        }

        self.advance(note)
    }

    fn pick_song(&mut self) -> &'static Song {
        let songs = self.catalog.songs();
        &songs[self.rng.gen_range(0..songs.len())]
    }

    /// One step of a sequential challenge.
    fn advance(&mut self, note: NoteName) -> Feedback {
        let position = self.state.progress.len();
        let Some(&expected) = self.state.target.get(position) else {
            return Feedback::Inactive;
        };

        if note != expected {
            debug!(%note, %expected, position, "wrong note, restarting");
            self.state.progress.clear();
            return Feedback::Incorrect {
                played: note,
                expected,
            };
        }

        self.state.progress.push(note);
        debug!(%note, position, "correct note");

        if let Some(&next) = self.state.target.get(position + 1) {
            let degree = match (self.state.mode, self.state.active_song) {
                (Mode::SongTonics, Some(song)) => {
                    Some(name_degree(&self.catalog, song.key, next)).filter(|d| !d.is_empty())
                }
                _ => None,
            };
            return Feedback::Progressing {
                mode: self.state.mode,
                next,
                degree,
            };
        }

        match (self.state.mode, self.state.active_song) {
            (Mode::SongTonics, Some(song)) => {
                info!(title = song.title, "song solved, switching to improvisation");
                self.state = ChallengeState::improvise(song);
                Feedback::SongSolved { song }
            }
            (mode, _) => {
                info!(%mode, "challenge complete");
                self.state.target.clear();
                self.state.progress.clear();
                Feedback::SequenceComplete { mode }
            }
        }
    }
}
