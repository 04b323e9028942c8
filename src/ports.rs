//! Capabilities the game talks to but does not own: a drawing surface, a sound
//! player, score displays and a key-value store.

use std::io;
use std::time::Duration;

use macroquad::color::Color;
use thiserror::Error;

/// Rectangle drawing in surface-local pixels.
pub trait Canvas {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Color);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Move,
    Rotate,
    Drop,
    LineClear,
    GameOver,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Move => "move",
            Cue::Rotate => "rotate",
            Cue::Drop => "drop",
            Cue::LineClear => "line-clear",
            Cue::GameOver => "game-over",
        }
    }

    /// Synthesized stand-in used when no sample is configured for the cue.
    pub fn fallback_tone(self) -> Tone {
        let (frequency, ms, waveform, volume) = match self {
            Cue::Move => (220.0, 40, Waveform::Square, 0.15),
            Cue::Rotate => (440.0, 60, Waveform::Triangle, 0.25),
            Cue::Drop => (140.0, 110, Waveform::Sawtooth, 0.3),
            Cue::LineClear => (660.0, 220, Waveform::Sine, 0.35),
            Cue::GameOver => (110.0, 600, Waveform::Square, 0.3),
        };
        Tone {
            frequency,
            duration: Duration::from_millis(ms),
            waveform,
            volume,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub duration: Duration,
    pub waveform: Waveform,
    pub volume: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sound {
    Effect(Cue),
    Tone(Tone),
}

/// Fire-and-forget playback. Implementations swallow their own failures.
pub trait SoundPlayer {
    fn has_sample(&self, cue: Cue) -> bool;
    fn play(&mut self, sound: Sound);
    fn start_music(&mut self);
}

pub trait ScoreDisplay {
    fn show_stats(&mut self, score: u32, lines: u32, level: u32);
    fn show_player(&mut self, name: &str, best: u32);
    fn show_leaderboard(&mut self, entries: &[(String, u32)]);
    /// `Some(final_score)` raises the game-over banner, `None` hides it.
    fn show_game_over(&mut self, final_score: Option<u32>);
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage i/o failed for {key}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("could not encode stored value")]
    Encode(#[from] serde_json::Error),
}

/// String values under string keys. Values are replaced wholesale.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}
