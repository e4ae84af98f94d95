use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::{Color, Print};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::info;

use crate::catalog::Catalog;
use crate::challenge::{ChallengeEngine, Feedback, Mode};
use crate::config::Settings;
use crate::error::Result;
use crate::keyboard::{KeyboardView, char_to_note};
use crate::note::NoteName;
use crate::tone::{self, ToneEmitter};

const CHALLENGE_ROW: u16 = 10;
const STATUS_ROW: u16 = 11;
const FEEDBACK_ROW: u16 = 12;
const KEYBOARD_ROW: u16 = 14;
const KEYBOARD_COL: u16 = 2;

/// What one input event asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    StartScale,
    StartSong,
    StartProgression,
    Note(NoteName),
    Quit,
}

fn action_for(ev: &Event, view: &KeyboardView) -> Option<Action> {
    match ev {
        Event::Key(KeyEvent {
            code: KeyCode::Esc,
            kind: KeyEventKind::Press,
            ..
        }) => Some(Action::Quit),

        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),

        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            kind: KeyEventKind::Press,
            ..
        }) => match c {
            '1' => Some(Action::StartScale),
            '2' => Some(Action::StartSong),
            '3' => Some(Action::StartProgression),
            _ => char_to_note(*c).map(Action::Note),
        },

        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => view.resolve_click(*column, *row).map(Action::Note),

        _ => None,
    }
}

/// Engine plus its collaborators and what is currently on screen.
struct Session {
    engine: ChallengeEngine,
    tone: Box<dyn ToneEmitter>,
    view: KeyboardView,
    highlight: Option<(NoteName, Color)>,
    highlight_until: Option<Instant>,
    highlight_for: Duration,
    challenge_line: String,
    feedback_line: String,
}

impl Session {
    fn new(engine: ChallengeEngine, tone: Box<dyn ToneEmitter>, highlight_for: Duration) -> Self {
        Self {
            engine,
            tone,
            view: KeyboardView::new(KEYBOARD_COL, KEYBOARD_ROW),
            highlight: None,
            highlight_until: None,
            highlight_for,
            challenge_line: "Press 1 (scale), 2 (song) or 3 (progression) to start.".to_string(),
            feedback_line: String::new(),
        }
    }

    fn apply(&mut self, action: Action) {
        let announcement = match action {
            Action::StartScale => self.engine.start_scale_challenge(),
            Action::StartSong => self.engine.start_song_challenge(),
            Action::StartProgression => self.engine.start_progression_challenge(),
            Action::Note(note) => {
                self.press(note);
                return;
            }
            Action::Quit => return,
        };
        self.challenge_line = announcement.to_string();
        self.feedback_line = "Play the first note to begin.".to_string();
        self.clear_highlight();
    }

    /// Play, flash and judge one note.
    fn press(&mut self, note: NoteName) -> Feedback {
        let feedback = self.engine.submit_note(note);
        if feedback == Feedback::Inactive {
            self.feedback_line =
                "No active challenge. Press 1, 2 or 3 to start one.".to_string();
            return feedback;
        }

        self.tone.play(note);
        let color = if feedback.is_correct() {
            Color::Green
        } else {
            Color::Red
        };
        self.highlight = Some((note, color));
        self.highlight_until = Some(Instant::now() + self.highlight_for);
        self.feedback_line = feedback.to_string();
        feedback
    }

    fn clear_highlight(&mut self) {
        self.highlight = None;
        self.highlight_until = None;
    }

    /// Drop a highlight whose time is up. Returns true if one was dropped.
    fn expire_highlight(&mut self, now: Instant) -> bool {
        match self.highlight_until {
            Some(until) if now >= until => {
                self.clear_highlight();
                true
            }
            _ => false,
        }
    }

    fn status_line(&self) -> String {
        let state = self.engine.state();
        if !state.is_active() {
            return "Mode: -".to_string();
        }
        if state.mode() == Mode::Improvisation {
            let notes: Vec<&str> = state.target().iter().map(|n| n.as_str()).collect();
            return format!("Mode: {} | Scale: {}", state.mode(), notes.join(" "));
        }
        format!(
            "Mode: {} | Progress: {}/{}",
            state.mode(),
            state.progress().len(),
            state.target().len()
        )
    }

    fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (row, text) in [
            (CHALLENGE_ROW, &self.challenge_line),
            (STATUS_ROW, &self.status_line()),
            (FEEDBACK_ROW, &self.feedback_line),
        ] {
            queue!(
                out,
                MoveTo(0, row),
                Clear(ClearType::CurrentLine),
                Print("  "),
                Print(text)
            )?;
        }
        self.draw_keyboard(out)
    }

    fn draw_keyboard<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.highlight {
            Some(_) => self.view.render(out, self.highlight),
            None => self.view.reset(out),
        }
    }
}

/// Run the interactive quiz until Esc.
pub fn run(settings: &Settings) -> Result<()> {
    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(seed, "starting quiz session");

    let engine = ChallengeEngine::new(Catalog::builtin(), seed);
    let tone = tone::emitter(&settings.tone, settings.mute);
    let mut session = Session::new(
        engine,
        tone,
        Duration::from_secs_f64(settings.tone.highlight),
    );

    let mut stdout = io::stdout();

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;

    let result = match print_banner(&mut stdout).and_then(|_| session.draw(&mut stdout)) {
        Ok(()) => event_loop(&mut session, &mut stdout),
        Err(e) => Err(e.into()),
    };

    // Restore terminal
    let _ = execute!(stdout, DisableMouseCapture, Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn event_loop(session: &mut Session, stdout: &mut io::Stdout) -> Result<()> {
    loop {
        if session.expire_highlight(Instant::now()) {
            session.draw_keyboard(stdout)?;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        let ev = event::read()?;
        match action_for(&ev, &session.view) {
            Some(Action::Quit) => return Ok(()),
            Some(action) => {
                session.apply(action);
                session.draw(stdout)?;
            }
            None => {}
        }
    }
}

fn print_banner(stdout: &mut io::Stdout) -> io::Result<()> {
    let banner = "\x1b[2J\x1b[H\
keyquiz - ear training at the keyboard\r\n\
─────────────────────────────────────────\r\n\
\r\n\
  Natural notes:  a s d f g h j k       (or click a key)\r\n\
                  C D E F G A B C\r\n\
  Sharps:         w e   t y u\r\n\
                  C# D#  F# G# A#\r\n\
\r\n\
  Challenges:     1 scale   2 song   3 progression      Quit: Esc\r\n";
    write!(stdout, "{}", banner)?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SCALES, SONGS};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingTone(Rc<RefCell<Vec<NoteName>>>);

    impl ToneEmitter for RecordingTone {
        fn play(&self, note: NoteName) {
            self.0.borrow_mut().push(note);
        }
    }

    fn session() -> (Session, Rc<RefCell<Vec<NoteName>>>) {
        let played = Rc::new(RefCell::new(Vec::new()));
        let tone = Box::new(RecordingTone(Rc::clone(&played)));
        let engine = ChallengeEngine::new(Catalog::builtin(), 1);
        (Session::new(engine, tone, Duration::from_millis(200)), played)
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_key_actions() {
        let view = KeyboardView::new(KEYBOARD_COL, KEYBOARD_ROW);
        assert_eq!(action_for(&key('1'), &view), Some(Action::StartScale));
        assert_eq!(action_for(&key('2'), &view), Some(Action::StartSong));
        assert_eq!(action_for(&key('3'), &view), Some(Action::StartProgression));
        assert_eq!(action_for(&key('g'), &view), Some(Action::Note(NoteName::G)));
        assert_eq!(action_for(&key('z'), &view), None);
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(action_for(&esc, &view), Some(Action::Quit));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action_for(&ctrl_c, &view), Some(Action::Quit));
    }

    #[test]
    fn test_mouse_click_resolves_key() {
        let view = KeyboardView::new(KEYBOARD_COL, KEYBOARD_ROW);
        let click = |column, row| {
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            })
        };
        // Bottom of the first white key.
        assert_eq!(
            action_for(&click(KEYBOARD_COL + 3, KEYBOARD_ROW + 6), &view),
            Some(Action::Note(NoteName::C))
        );
        assert_eq!(action_for(&click(0, 0), &view), None);
    }

    #[test]
    fn test_inactive_press_is_silent() {
        let (mut session, played) = session();
        assert_eq!(session.press(NoteName::C), Feedback::Inactive);
        assert!(played.borrow().is_empty());
        assert!(session.highlight.is_none());
    }

    #[test]
    fn test_press_plays_flashes_and_judges() {
        let (mut session, played) = session();
        session.engine.start_scale(&SCALES[0]);

        assert!(session.press(NoteName::C).is_correct());
        assert_eq!(session.highlight, Some((NoteName::C, Color::Green)));
        assert_eq!(session.feedback_line, "Correct! Next note: D");

        assert!(!session.press(NoteName::E).is_correct());
        assert_eq!(session.highlight, Some((NoteName::E, Color::Red)));
        assert_eq!(*played.borrow(), vec![NoteName::C, NoteName::E]);
    }

    #[test]
    fn test_start_action_updates_lines() {
        let (mut session, _) = session();
        session.apply(Action::StartSong);
        assert!(session.challenge_line.contains("Guess the song"));
        assert!(session.engine.state().is_active());

        let song = session.engine.state().active_song().unwrap();
        assert!(SONGS.contains(song));
        for &note in &song.progression {
            session.apply(Action::Note(note));
        }
        assert!(session.feedback_line.contains(song.title));
        assert!(session.status_line().starts_with("Mode: improvisation | Scale: "));
    }

    #[test]
    fn test_status_line_tracks_progress() {
        let (mut session, _) = session();
        assert_eq!(session.status_line(), "Mode: -");
        session.engine.start_scale(&SCALES[1]);
        session.press(NoteName::G);
        session.press(NoteName::A);
        assert_eq!(session.status_line(), "Mode: scale | Progress: 2/7");
        session.press(NoteName::C);
        assert_eq!(session.status_line(), "Mode: scale | Progress: 0/7");
    }

    #[test]
    fn test_highlight_expires() {
        let (mut session, _) = session();
        session.engine.start_scale(&SCALES[0]);
        session.press(NoteName::C);
        let until = session.highlight_until.unwrap();
        assert!(!session.expire_highlight(until - Duration::from_millis(1)));
        assert!(session.expire_highlight(until));
        assert!(session.highlight.is_none());
        assert!(!session.expire_highlight(until));
    }

    #[test]
    fn test_draw_renders_lines() {
        let (mut session, _) = session();
        session.apply(Action::StartScale);
        let mut out = Vec::new();
        session.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("SCALE challenge"));
    }
}
