//! Keyboard and pointer input, reduced to the small command set the game understands.

use std::time::Duration;

use macroquad::input::KeyCode;
use macroquad::math::Vec2;

use crate::config::GestureSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
}

pub fn command_for_key(key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Left | KeyCode::A => Some(Command::MoveLeft),
        KeyCode::Right | KeyCode::D => Some(Command::MoveRight),
        KeyCode::Down | KeyCode::S => Some(Command::SoftDrop),
        KeyCode::Up | KeyCode::W => Some(Command::Rotate),
        KeyCode::Space => Some(Command::HardDrop),
        _ => None,
    }
}

const INITIAL_REPEAT_DELAY: Duration = Duration::from_millis(200);
const REPEAT_INTERVAL: Duration = Duration::from_millis(100);

/// Auto-repeat for held movement keys: one step on press, then a delay, then a steady rate.
#[derive(Debug, Default)]
pub struct KeyRepeat {
    held: Option<(KeyCode, Duration)>,
}

impl KeyRepeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call once per key press so the repeat timer starts from this moment.
    pub fn pressed(&mut self, key: KeyCode, now: Duration) {
        if matches!(
            command_for_key(key),
            Some(Command::MoveLeft | Command::MoveRight | Command::SoftDrop)
        ) {
            self.held = Some((key, now + INITIAL_REPEAT_DELAY));
        }
    }

    /// Called every frame with the current key-down state; yields a repeated command when due.
    pub fn update(&mut self, is_down: impl Fn(KeyCode) -> bool, now: Duration) -> Option<Command> {
        let (key, next_fire) = self.held?;
        if !is_down(key) {
            self.held = None;
            return None;
        }
        if now < next_fire {
            return None;
        }
        self.held = Some((key, now + REPEAT_INTERVAL));
        command_for_key(key)
    }
}

#[derive(Clone, Copy, Debug)]
struct Gesture {
    origin: Vec2,
    started_at: Duration,
    last: Vec2,
    last_swipe_at: Option<Duration>,
    swiped: bool,
    spent: bool,
}

/// Turns a pointer-down / move / up sequence into commands.
///
/// While the pointer is held, each jump of more than `swipe_px` since the last
/// processed point becomes a swipe command. A release that never swiped, stayed
/// within `tap_px` of the origin and came quickly enough is a tap, which rotates.
#[derive(Debug)]
pub struct GestureTracker {
    settings: GestureSettings,
    gesture: Option<Gesture>,
}

impl GestureTracker {
    pub fn new(settings: GestureSettings) -> Self {
        GestureTracker {
            settings,
            gesture: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn pointer_down(&mut self, pos: Vec2, now: Duration) {
        self.gesture = Some(Gesture {
            origin: pos,
            started_at: now,
            last: pos,
            last_swipe_at: None,
            swiped: false,
            spent: false,
        });
    }

    pub fn pointer_move(&mut self, pos: Vec2, now: Duration) -> Option<Command> {
        let settings = self.settings;
        let gesture = self.gesture.as_mut()?;
        if gesture.spent {
            return None;
        }
        let delta = pos - gesture.last;
        if delta.x.abs().max(delta.y.abs()) < settings.swipe_px {
            return None;
        }
        let cooldown = Duration::from_millis(settings.swipe_cooldown_ms);
        if let Some(at) = gesture.last_swipe_at {
            if now < at + cooldown {
                return None;
            }
        }

        let command = if delta.x.abs() > delta.y.abs() {
            if delta.x < 0.0 {
                Command::MoveLeft
            } else {
                Command::MoveRight
            }
        } else if delta.y > 0.0 {
            if delta.y >= settings.long_swipe_px {
                gesture.spent = true;
                Command::HardDrop
            } else {
                Command::SoftDrop
            }
        } else {
            Command::Rotate
        };

        gesture.last = pos;
        gesture.last_swipe_at = Some(now);
        gesture.swiped = true;
        Some(command)
    }

    pub fn pointer_up(&mut self, pos: Vec2, now: Duration) -> Option<Command> {
        // The release point still counts as a move, so a flick within one frame swipes.
        if let Some(command) = self.pointer_move(pos, now) {
            self.gesture = None;
            return Some(command);
        }
        let gesture = self.gesture.take()?;
        if gesture.swiped {
            return None;
        }
        let travelled = (pos - gesture.origin).length();
        let held = now.saturating_sub(gesture.started_at);
        if travelled < self.settings.tap_px && held <= Duration::from_millis(self.settings.tap_ms) {
            Some(Command::Rotate)
        } else {
            None
        }
    }

    /// Drops any gesture in progress without producing a command.
    pub fn cancel(&mut self) {
        self.gesture = None;
    }
}
