use std::mem;
use std::time::Duration;

use ::rand::rngs::StdRng;
use ::rand::SeedableRng;
use log::debug;

use crate::board::Board;
use crate::clear_anim::LineClear;
use crate::collision::{collides, drop_distance, try_rotate};
use crate::config::{gravity_interval, level_for_lines, DEFAULT_PLAYER, LINE_SCORES, MAX_NAME_LEN};
use crate::input::Command;
use crate::tetromino::Tetromino;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No session started yet.
    Idle,
    Falling,
    Clearing,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Moved,
    Rotated,
    Locked,
    LinesCleared(usize),
    GameOver { score: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            score: 0,
            lines: 0,
            level: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedRun {
    pub name: String,
    pub score: u32,
}

/// Trims the entered name and falls back to the default when nothing is left.
pub fn normalize_name(raw: &str) -> String {
    let trimmed: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    if trimmed.is_empty() {
        DEFAULT_PLAYER.to_string()
    } else {
        trimmed
    }
}

/// All state of one player's run: the board, the falling and upcoming pieces,
/// the pending line clear and the tallies.
pub struct Session {
    board: Board,
    active: Option<Tetromino>,
    next: Tetromino,
    clearing: Option<LineClear>,
    stats: Stats,
    phase: Phase,
    player: Option<String>,
    finalized: bool,
    last_drop: Option<Duration>,
    events: Vec<GameEvent>,
    rng: StdRng,
}

impl Session {
    pub fn new(mut rng: StdRng) -> Self {
        let next = Tetromino::random(&mut rng);
        Session {
            board: Board::new(),
            active: None,
            next,
            clearing: None,
            stats: Stats::default(),
            phase: Phase::Idle,
            player: None,
            finalized: false,
            last_drop: None,
            events: Vec::new(),
            rng,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&Tetromino> {
        self.active.as_ref()
    }

    pub fn next(&self) -> &Tetromino {
        &self.next
    }

    pub fn clearing(&self) -> Option<&LineClear> {
        self.clearing.as_ref()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Begins a run for the given player name.
    pub fn start(&mut self, raw_name: &str) {
        let name = normalize_name(raw_name);
        debug!("starting session for {:?}", name);
        self.player = Some(name);
        self.reset();
    }

    /// Fresh board and tallies for the same player. Ignored before `start`.
    pub fn restart(&mut self) {
        if self.player.is_none() {
            return;
        }
        debug!("restarting session");
        self.reset();
    }

    fn reset(&mut self) {
        self.board = Board::new();
        self.active = None;
        self.clearing = None;
        self.stats = Stats::default();
        self.finalized = false;
        self.last_drop = None;
        self.events.clear();
        self.next = Tetromino::random(&mut self.rng);
        self.phase = Phase::Falling;
        self.spawn();
    }

    /// Promotes the preview piece and draws a new one. A piece that cannot
    /// move down from its spawn row ends the run.
    fn spawn(&mut self) {
        let upcoming = Tetromino::random(&mut self.rng);
        let piece = mem::replace(&mut self.next, upcoming);
        self.last_drop = None;
        if collides(&self.board, &piece, 0, 1, None) {
            debug!("spawn blocked for {:?}", piece.t_type);
            self.end_run();
            return;
        }
        self.active = Some(piece);
        self.phase = Phase::Falling;
    }

    fn end_run(&mut self) {
        self.active = None;
        self.clearing = None;
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::GameOver {
            score: self.stats.score,
        });
    }

    /// Applies one player command. Returns whether anything changed.
    pub fn apply(&mut self, command: Command, now: Duration) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        let Some(mut piece) = self.active else {
            return false;
        };
        let changed = match command {
            Command::MoveLeft | Command::MoveRight => {
                let dx = if command == Command::MoveLeft { -1 } else { 1 };
                let legal = !collides(&self.board, &piece, dx, 0, None);
                if legal {
                    piece.x += dx;
                }
                legal
            }
            Command::SoftDrop => {
                let legal = !collides(&self.board, &piece, 0, 1, None);
                if legal {
                    piece.y += 1;
                }
                legal
            }
            Command::Rotate => try_rotate(&self.board, &mut piece),
            Command::HardDrop => {
                piece.y += drop_distance(&self.board, &piece);
                self.active = Some(piece);
                self.lock(now);
                return true;
            }
        };
        if changed {
            self.active = Some(piece);
            self.events.push(if command == Command::Rotate {
                GameEvent::Rotated
            } else {
                GameEvent::Moved
            });
        }
        changed
    }

    /// Advances gravity and the line-clear animation to `now`.
    pub fn tick(&mut self, now: Duration) {
        match self.phase {
            Phase::Falling => {
                let Some(last) = self.last_drop else {
                    self.last_drop = Some(now);
                    return;
                };
                if now.saturating_sub(last) > gravity_interval(self.stats.level) {
                    self.last_drop = Some(now);
                    self.step_down(now);
                }
            }
            Phase::Clearing => {
                if self.clearing.as_ref().is_some_and(|c| c.is_due(now)) {
                    self.finish_clear();
                }
            }
            Phase::Idle | Phase::GameOver => {}
        }
    }

    fn step_down(&mut self, now: Duration) {
        let Some(piece) = self.active.as_mut() else {
            return;
        };
        if collides(&self.board, piece, 0, 1, None) {
            self.lock(now);
        } else {
            piece.y += 1;
        }
    }

    fn lock(&mut self, now: Duration) {
        let Some(piece) = self.active.take() else {
            return;
        };
        self.board.merge(&piece);
        self.events.push(GameEvent::Locked);
        if piece.cells().any(|(row, _)| row < 0) {
            debug!("{:?} locked above the top edge", piece.t_type);
            self.end_run();
            return;
        }
        let full = self.board.full_rows();
        if full.is_empty() {
            self.spawn();
        } else {
            debug!("rows {:?} full, clearing", full);
            self.clearing = Some(LineClear::new(full, now));
            self.phase = Phase::Clearing;
        }
    }

    fn finish_clear(&mut self) {
        let Some(clear) = self.clearing.take() else {
            return;
        };
        let rows = clear.into_rows();
        self.board.remove_rows(&rows);
        let count = rows.len();
        let stats = &mut self.stats;
        stats.lines += count as u32;
        stats.score += LINE_SCORES[count.min(LINE_SCORES.len() - 1)] * stats.level;
        stats.level = level_for_lines(stats.lines);
        self.events.push(GameEvent::LinesCleared(count));
        self.spawn();
    }

    /// Hands out the finished run once. Later calls return `None`.
    pub fn take_finished_run(&mut self) -> Option<FinishedRun> {
        if self.phase != Phase::GameOver || self.finalized {
            return None;
        }
        self.finalized = true;
        let name = self.player.clone()?;
        Some(FinishedRun {
            name,
            score: self.stats.score,
        })
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn set_active(&mut self, piece: Tetromino) {
        self.active = Some(piece);
    }
}
