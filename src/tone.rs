use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ToneSettings;
use crate::error::{QuizError, Result};
use crate::note::NoteName;

/// Plays a short tone for a note. Fire-and-forget: callers never wait for it.
pub trait ToneEmitter {
    fn play(&self, note: NoteName);
}

/// Emitter for muted sessions and machines without an output device.
pub struct SilentTone;

impl ToneEmitter for SilentTone {
    fn play(&self, note: NoteName) {
        debug!(%note, "tone muted");
    }
}

/// Gain at `t` seconds after the tone starts: flat for `hold`, then an
/// exponential ramp down to 0.001 over `fade`. Zero once the fade is over.
pub fn envelope(settings: &ToneSettings, t: f64) -> f64 {
    const FLOOR: f64 = 0.001;
    if t < settings.hold {
        return settings.gain;
    }
    let into_fade = t - settings.hold;
    if settings.gain <= FLOOR || into_fade >= settings.fade {
        return 0.0;
    }
    settings.gain * (FLOOR / settings.gain).powf(into_fade / settings.fade)
}

/// One sounding tone on the audio thread
struct Voice {
    freq: f64,
    sample: usize,
}

impl Voice {
    fn next(&mut self, settings: &ToneSettings, sample_rate: f64) -> f64 {
        let t = self.sample as f64 / sample_rate;
        self.sample += 1;
        (t * self.freq * 2.0 * std::f64::consts::PI).sin() * envelope(settings, t)
    }

    fn finished(&self, settings: &ToneSettings, sample_rate: f64) -> bool {
        self.sample as f64 / sample_rate >= settings.hold + settings.fade
    }
}

/// Sine tones through the default output device. Overlapping tones are
/// summed; each one ends on its own.
pub struct CpalTone {
    _stream: cpal::Stream,
    tx: mpsc::Sender<f64>,
    octave: u8,
}

impl CpalTone {
    pub fn new(settings: &ToneSettings) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(QuizError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| QuizError::AudioConfig(e.to_string()))?;

        let sample_rate = config.sample_rate() as f64;
        let channels = config.channels().max(1) as usize;
        info!(sample_rate, channels, "audio output ready");

        let (tx, rx) = mpsc::channel::<f64>();
        let envelope_settings = settings.clone();
        let mut voices: Vec<Voice> = Vec::new();

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // Pick up new tones (non-blocking)
                    while let Ok(freq) = rx.try_recv() {
                        voices.push(Voice { freq, sample: 0 });
                    }

                    for frame in data.chunks_mut(channels) {
                        let value: f64 = voices
                            .iter_mut()
                            .map(|v| v.next(&envelope_settings, sample_rate))
                            .sum();
                        let value = value.clamp(-1.0, 1.0) as f32;
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }

                    voices.retain(|v| !v.finished(&envelope_settings, sample_rate));
                },
                move |err| {
                    warn!("audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| QuizError::AudioStream(format!("failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| QuizError::AudioStream(format!("failed to play stream: {}", e)))?;

        Ok(Self {
            _stream: stream,
            tx,
            octave: settings.octave,
        })
    }

    fn send(&self, freq: f64) -> Result<()> {
        self.tx.send(freq).map_err(|_| QuizError::AudioDisconnected)
    }
}

impl ToneEmitter for CpalTone {
    fn play(&self, note: NoteName) {
        let freq = note.to_freq(self.octave);
        debug!(%note, freq, "tone");
        if let Err(e) = self.send(freq) {
            warn!("dropping tone for {}: {}", note, e);
        }
    }
}

/// Open the audio device, or fall back to silence when muted or unavailable.
pub fn emitter(settings: &ToneSettings, mute: bool) -> Box<dyn ToneEmitter> {
    if mute {
        return Box::new(SilentTone);
    }
    match CpalTone::new(settings) {
        Ok(tone) => Box::new(tone),
        Err(e) => {
            warn!("audio unavailable, continuing without sound: {}", e);
            Box::new(SilentTone)
        }
    }
}
