use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const COLS: usize = 10;
pub const ROWS: usize = 20;
pub const BLOCK_SIZE: f32 = 30.0;
pub const PREVIEW_BOX: f32 = 120.0;

pub const STORAGE_KEY: &str = "tetoris_scores";
pub const DEFAULT_PLAYER: &str = "Player";
pub const MAX_NAME_LEN: usize = 16;
pub const LEADERBOARD_SIZE: usize = 5;

/// Base points per number of rows cleared at once, multiplied by the level.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];
pub const LINES_PER_LEVEL: u32 = 10;

/// How long full rows flash before they are removed.
pub const CLEAR_REVEAL: Duration = Duration::from_millis(300);

const BASE_GRAVITY_MS: u64 = 800;
const GRAVITY_STEP_MS: u64 = 60;
const MIN_GRAVITY_MS: u64 = 100;

const CONFIG_ENV: &str = "TETORIS_CONFIG";
const CONFIG_FILE: &str = "tetoris.json";

/// Time between gravity steps at the given level.
pub fn gravity_interval(level: u32) -> Duration {
    let slowdown = GRAVITY_STEP_MS.saturating_mul(level.saturating_sub(1) as u64);
    let ms = BASE_GRAVITY_MS.saturating_sub(slowdown).max(MIN_GRAVITY_MS);
    Duration::from_millis(ms)
}

pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// Pointer gesture thresholds, in pixels and milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub swipe_px: f32,
    pub long_swipe_px: f32,
    pub tap_px: f32,
    pub tap_ms: u64,
    pub swipe_cooldown_ms: u64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            swipe_px: 24.0,
            long_swipe_px: 90.0,
            tap_px: 10.0,
            tap_ms: 250,
            swipe_cooldown_ms: 80,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: Option<PathBuf>,
    pub volume: f32,
    pub music: bool,
    pub music_path: Option<PathBuf>,
    /// Sample files keyed by cue name ("move", "rotate", "drop", "line-clear", "game-over").
    pub samples: HashMap<String, PathBuf>,
    pub gestures: GestureSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            volume: 0.5,
            music: true,
            music_path: None,
            samples: HashMap::new(),
            gestures: GestureSettings::default(),
        }
    }
}

impl Settings {
    /// Reads settings from `$TETORIS_CONFIG` or `./tetoris.json`.
    /// A missing file yields defaults; a malformed one is reported and ignored.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => {
                info!("loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                warn!("ignoring malformed settings in {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push("tetoris");
            path
        })
    }
}
