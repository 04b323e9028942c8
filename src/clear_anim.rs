use std::time::Duration;

use crate::config::CLEAR_REVEAL;

const MIN_ALPHA: f32 = 0.15;
const MAX_ALPHA: f32 = 0.9;

/// Rows waiting to be removed, and the window during which they flash.
#[derive(Clone, Debug, PartialEq)]
pub struct LineClear {
    rows: Vec<usize>,
    started_at: Duration,
    deadline: Duration,
}

impl LineClear {
    pub fn new(rows: Vec<usize>, now: Duration) -> Self {
        LineClear {
            rows,
            started_at: now,
            deadline: now + CLEAR_REVEAL,
        }
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.deadline
    }

    /// Elapsed fraction of the reveal window, clamped to `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f32 {
        let total = self.deadline.saturating_sub(self.started_at).as_secs_f32();
        if total <= 0.0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at).as_secs_f32();
        (elapsed / total).clamp(0.0, 1.0)
    }

    /// Overlay opacity for the flashing rows; grows as the deadline approaches.
    pub fn overlay_alpha(&self, now: Duration) -> f32 {
        MIN_ALPHA + (MAX_ALPHA - MIN_ALPHA) * self.progress(now)
    }

    pub fn into_rows(self) -> Vec<usize> {
        self.rows
    }
}
