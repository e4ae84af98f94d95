//! Session settings and tone definitions loaded from `.tone` files.
//!
//! A tone file shapes the feedback tone played for every key and how long the
//! key stays highlighted. Missing keys take the defaults.

use std::fs;
use std::path::Path;

use crate::error::{QuizError, Result};

/// Tone and highlight parameters (times in seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSettings {
    /// Reference octave every pitch class is played in
    pub octave: u8,
    /// Peak gain (0.0..=1.0)
    pub gain: f64,
    /// Time at full gain before the fade starts
    pub hold: f64,
    /// Exponential fade to silence
    pub fade: f64,
    /// How long a pressed key stays highlighted
    pub highlight: f64,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            octave: 4,
            gain: 0.3,
            hold: 0.3,
            fade: 0.5,
            highlight: 0.2,
        }
    }
}

/// Everything an interactive session needs besides the catalog.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Catalog pick seed; drawn at random when absent.
    pub seed: Option<u64>,
    /// Skip the audio device entirely.
    pub mute: bool,
    pub tone: ToneSettings,
}

/// Parse a single "key: value" line. Returns (key, value) or None.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once(':')?;
    Some((key.trim(), value.trim()))
}

/// Upper bound for hold, fade and highlight times.
const MAX_SECONDS: f64 = 10.0;

fn number(value: &str, key: &str, line: usize) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(QuizError::Config {
            line,
            message: format!("invalid {} '{}'", key, value),
        }),
    }
}

fn seconds(value: &str, key: &str, line: usize) -> Result<f64> {
    let v = number(value, key, line)?;
    if v > MAX_SECONDS {
        return Err(QuizError::Config {
            line,
            message: format!("{} must be at most {} seconds", key, MAX_SECONDS),
        });
    }
    Ok(v)
}

/// Load tone settings from a `.tone` file.
pub fn load(path: &Path) -> Result<ToneSettings> {
    let content = fs::read_to_string(path).map_err(|source| QuizError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}

/// Parse tone settings.
///
/// Format (one per line, optional comments with #):
/// ```text
/// # feedback tone
/// octave: 4
/// gain: 0.3
/// hold: 0.3
/// fade: 0.5
/// highlight: 0.2
/// ```
pub fn parse(content: &str) -> Result<ToneSettings> {
    let mut settings = ToneSettings::default();

    for (idx, line) in content.lines().enumerate() {
        let line_num = idx + 1;
        let Some((key, value)) = parse_line(line) else {
            if !line.trim().is_empty() && !line.trim().starts_with('#') {
                return Err(QuizError::Config {
                    line: line_num,
                    message: format!("expected 'key: value', got '{}'", line.trim()),
                });
            }
            continue;
        };
        match key {
            "octave" => {
                settings.octave = match value.parse::<u8>() {
                    Ok(oct) if oct <= 8 => oct,
                    _ => {
                        return Err(QuizError::Config {
                            line: line_num,
                            message: "octave must be 0-8".into(),
                        });
                    }
                };
            }
            "gain" => settings.gain = number(value, key, line_num)?.clamp(0.0, 1.0),
            "hold" => settings.hold = seconds(value, key, line_num)?,
            "fade" => settings.fade = seconds(value, key, line_num)?,
            "highlight" => settings.highlight = seconds(value, key, line_num)?,
            _ => {
                return Err(QuizError::Config {
                    line: line_num,
                    message: format!("unknown key '{}'", key),
                });
            }
        }
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(parse("").unwrap(), ToneSettings::default());
        assert_eq!(parse("# only a comment\n\n").unwrap(), ToneSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = parse("octave: 5\ngain: 2.0\n").unwrap();
        assert_eq!(settings.octave, 5);
        assert_eq!(settings.gain, 1.0);
        assert_eq!(settings.fade, 0.5);
    }

    #[test]
    fn test_unknown_key_reports_line() {
        let err = parse("gain: 0.2\nattack: 0.1\n").unwrap_err();
        assert!(matches!(err, QuizError::Config { line: 2, .. }));
        assert!(err.to_string().contains("attack"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse("octave: 9"),
            Err(QuizError::Config { line: 1, .. })
        ));
        assert!(parse("hold: -1").is_err());
        assert!(parse("fade: soon").is_err());
        assert!(parse("just words").is_err());
    }

    #[test]
    fn test_times_are_capped() {
        let err = parse("gain: 0.3\nhighlight: 1e20").unwrap_err();
        assert!(matches!(err, QuizError::Config { line: 2, .. }));
        assert!(parse("hold: 11").is_err());
        assert!(parse("fade: 1e300").is_err());
        let settings = parse("highlight: 10").unwrap();
        assert_eq!(settings.highlight, 10.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# soft tone\nhold: 0.1\nfade: 1.5\nhighlight: 0.4").unwrap();
        let settings = load(file.path()).unwrap();
        assert_eq!(settings.hold, 0.1);
        assert_eq!(settings.fade, 1.5);
        assert_eq!(settings.highlight, 0.4);
        assert_eq!(settings.octave, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.tone")).unwrap_err();
        assert!(matches!(err, QuizError::ConfigRead { .. }));
    }
}
