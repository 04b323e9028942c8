//! macroquad-backed adapters for the drawing and pointer ports.

use std::time::Duration;

use macroquad::prelude::*;

use crate::input::{Command, GestureTracker};
use crate::ports::Canvas;

/// Draws straight to the window, offset by `origin`.
pub struct MacroquadCanvas {
    pub origin: Vec2,
}

impl MacroquadCanvas {
    pub fn new(x: f32, y: f32) -> Self {
        MacroquadCanvas { origin: vec2(x, y) }
    }
}

impl Canvas for MacroquadCanvas {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        draw_rectangle(self.origin.x + x, self.origin.y + y, w, h, color);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Color) {
        draw_rectangle_lines(self.origin.x + x, self.origin.y + y, w, h, thickness, color);
    }
}

/// Phase of a single pointer sample, shared by touch and mouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Feeds one pointer sample to the tracker.
pub fn feed(tracker: &mut GestureTracker, phase: PointerPhase, pos: Vec2, now: Duration) -> Option<Command> {
    match phase {
        PointerPhase::Down => {
            tracker.pointer_down(pos, now);
            None
        }
        PointerPhase::Move => tracker.pointer_move(pos, now),
        PointerPhase::Up => tracker.pointer_up(pos, now),
        PointerPhase::Cancel => {
            tracker.cancel();
            None
        }
    }
}

/// Collects this frame's pointer samples. Touches win over the mouse, since
/// macroquad also reports the first touch as a simulated mouse.
pub fn pointer_samples() -> Vec<(PointerPhase, Vec2)> {
    let touches = touches();
    if let Some(touch) = touches.first() {
        let phase = match touch.phase {
            TouchPhase::Started => PointerPhase::Down,
            TouchPhase::Moved | TouchPhase::Stationary => PointerPhase::Move,
            TouchPhase::Ended => PointerPhase::Up,
            TouchPhase::Cancelled => PointerPhase::Cancel,
        };
        return vec![(phase, touch.position)];
    }

    let pos = Vec2::from(mouse_position());
    if is_mouse_button_pressed(MouseButton::Left) {
        vec![(PointerPhase::Down, pos)]
    } else if is_mouse_button_released(MouseButton::Left) {
        vec![(PointerPhase::Up, pos)]
    } else if is_mouse_button_down(MouseButton::Left) {
        vec![(PointerPhase::Move, pos)]
    } else {
        Vec::new()
    }
}

/// Commands produced by touch or mouse gestures this frame.
pub fn poll_pointer(tracker: &mut GestureTracker, now: Duration) -> Vec<Command> {
    pointer_samples()
        .into_iter()
        .filter_map(|(phase, pos)| feed(tracker, phase, pos, now))
        .collect()
}
