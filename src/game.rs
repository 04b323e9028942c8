use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{info, warn};

use crate::config::LEADERBOARD_SIZE;
use crate::input::Command;
use crate::ports::{Canvas, Cue, KeyValueStore, ScoreDisplay, Sound, SoundPlayer};
use crate::records::ScoreBook;
use crate::render;
use crate::session::{normalize_name, GameEvent, Session};

/// Monotonic time since some fixed origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Shared switch for the frame loop. Cancelling stops further frames.
#[derive(Clone, Debug)]
pub struct LoopHandle {
    running: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn cancel(&self) {
        self.running.set(false);
    }
}

/// Owns the session and the score book, and pushes every frame's side effects
/// (drawing, sound, display updates) out through the injected ports.
pub struct Game<S: KeyValueStore, D: ScoreDisplay> {
    session: Session,
    scores: ScoreBook<S>,
    display: D,
    sound: Option<Box<dyn SoundPlayer>>,
    running: Rc<Cell<bool>>,
    music_started: bool,
}

impl<S: KeyValueStore, D: ScoreDisplay> Game<S, D> {
    pub fn new(session: Session, scores: ScoreBook<S>, display: D, sound: Option<Box<dyn SoundPlayer>>) -> Self {
        Game {
            session,
            scores,
            display,
            sound,
            running: Rc::new(Cell::new(false)),
            music_started: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scores(&self) -> &ScoreBook<S> {
        &self.scores
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Arms the frame loop and returns the handle that stops it.
    pub fn start(&mut self) -> LoopHandle {
        self.running.set(true);
        self.refresh_scoreboard();
        LoopHandle {
            running: Rc::clone(&self.running),
        }
    }

    /// Stops the loop; every handle sees it on its next check.
    pub fn stop(&mut self) {
        info!("stopping the frame loop");
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Best score for a name typed on the title screen, if anything was typed.
    pub fn preview_best(&self, raw_name: &str) -> Option<u32> {
        let name = raw_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(self.scores.best_score(name))
        }
    }

    pub fn start_session(&mut self, raw_name: &str) {
        let name = normalize_name(raw_name);
        info!("session started by {}", name);
        self.session.start(&name);
        self.display.show_game_over(None);
        self.refresh_scoreboard();
        if !self.music_started {
            self.music_started = true;
            if let Some(sound) = self.sound.as_mut() {
                sound.start_music();
            }
        }
    }

    pub fn restart(&mut self) {
        if !self.session.is_started() {
            return;
        }
        self.session.restart();
        self.display.show_game_over(None);
        self.refresh_scoreboard();
    }

    /// Input handler entry point; takes effect immediately, side effects go out next frame.
    pub fn handle(&mut self, command: Command, now: Duration) -> bool {
        self.session.apply(command, now)
    }

    /// Runs one frame. Returns false once the loop has been stopped.
    pub fn frame(&mut self, now: Duration, canvas: &mut dyn Canvas, preview: Option<&mut dyn Canvas>) -> bool {
        if !self.is_running() {
            return false;
        }
        self.session.tick(now);
        self.finalize_if_over();

        render::draw_frame(canvas, preview, &self.session, now);
        let stats = self.session.stats();
        self.display.show_stats(stats.score, stats.lines, stats.level);
        self.flush_audio();
        true
    }

    fn finalize_if_over(&mut self) {
        let Some(run) = self.session.take_finished_run() else {
            return;
        };
        info!("{} finished with {} points", run.name, run.score);
        if let Err(err) = self.scores.record(&run.name, run.score, Utc::now()) {
            match err.source() {
                Some(cause) => warn!("could not save score: {}: {}", err, cause),
                None => warn!("could not save score: {}", err),
            }
        }
        self.refresh_scoreboard();
        self.display.show_game_over(Some(run.score));
    }

    fn refresh_scoreboard(&mut self) {
        if let Some(name) = self.session.player() {
            let best = self.scores.best_score(name);
            self.display.show_player(name, best);
        }
        let entries = self.scores.leaderboard(LEADERBOARD_SIZE);
        self.display.show_leaderboard(&entries);
    }

    fn flush_audio(&mut self) {
        let events = self.session.drain_events();
        let Some(sound) = self.sound.as_mut() else {
            return;
        };
        for event in events {
            let cue = match event {
                GameEvent::Moved => Cue::Move,
                GameEvent::Rotated => Cue::Rotate,
                GameEvent::Locked => Cue::Drop,
                GameEvent::LinesCleared(_) => Cue::LineClear,
                GameEvent::GameOver { .. } => Cue::GameOver,
            };
            let sound_to_play = if sound.has_sample(cue) {
                Sound::Effect(cue)
            } else {
                Sound::Tone(cue.fallback_tone())
            };
            sound.play(sound_to_play);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use macroquad::color::Color;
    use std::cell::RefCell;

    struct NullCanvas;

    impl Canvas for NullCanvas {
        fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _c: Color) {}
        fn stroke_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _t: f32, _c: Color) {}
    }

    #[derive(Default)]
    struct Shown {
        stats: Option<(u32, u32, u32)>,
        player: Option<(String, u32)>,
        board: Vec<(String, u32)>,
        game_over: Option<u32>,
    }

    impl ScoreDisplay for Shown {
        fn show_stats(&mut self, score: u32, lines: u32, level: u32) {
            self.stats = Some((score, lines, level));
        }
        fn show_player(&mut self, name: &str, best: u32) {
            self.player = Some((name.to_string(), best));
        }
        fn show_leaderboard(&mut self, entries: &[(String, u32)]) {
            self.board = entries.to_vec();
        }
        fn show_game_over(&mut self, final_score: Option<u32>) {
            self.game_over = final_score;
        }
    }

    #[derive(Clone, Default)]
    struct Speaker {
        played: Rc<RefCell<Vec<Sound>>>,
        music: Rc<Cell<u32>>,
        sampled: Option<Cue>,
    }

    impl SoundPlayer for Speaker {
        fn has_sample(&self, cue: Cue) -> bool {
            self.sampled == Some(cue)
        }
        fn play(&mut self, sound: Sound) {
            self.played.borrow_mut().push(sound);
        }
        fn start_music(&mut self) {
            self.music.set(self.music.get() + 1);
        }
    }

    fn game(speaker: Speaker) -> Game<MemoryStore, Shown> {
        Game::new(
            Session::with_seed(11),
            ScoreBook::load(MemoryStore::new()),
            Shown::default(),
            Some(Box::new(speaker)),
        )
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn frames_stop_after_cancel() {
        let mut game = game(Speaker::default());
        assert!(!game.frame(ms(0), &mut NullCanvas, None));
        let handle = game.start();
        assert!(game.frame(ms(1), &mut NullCanvas, None));
        handle.cancel();
        assert!(!game.is_running());
        assert!(!game.frame(ms(2), &mut NullCanvas, None));
    }

    #[test]
    fn stop_is_seen_by_the_handle() {
        let mut game = game(Speaker::default());
        let handle = game.start();
        game.stop();
        assert!(!handle.is_running());
        assert!(!game.frame(ms(0), &mut NullCanvas, None));
    }

    #[test]
    fn runs_without_a_sound_player() {
        let mut game = Game::new(
            Session::with_seed(11),
            ScoreBook::load(MemoryStore::new()),
            Shown::default(),
            None,
        );
        game.start();
        game.start_session("quiet");
        assert!(game.handle(Command::HardDrop, ms(0)));
        assert!(game.frame(ms(1), &mut NullCanvas, None));
        assert_eq!(game.session().board().occupied_count(), 4);
        assert_eq!(game.display().stats, Some((0, 0, 1)));
        // Events are still drained when nobody plays them.
        assert!(game.session.drain_events().is_empty());
    }

    #[test]
    fn music_starts_once() {
        let speaker = Speaker::default();
        let mut game = game(speaker.clone());
        game.start();
        game.start_session("a");
        game.restart();
        game.start_session("b");
        assert_eq!(speaker.music.get(), 1);
    }

    #[test]
    fn cues_fall_back_to_tones_unless_sampled() {
        let speaker = Speaker {
            sampled: Some(Cue::Drop),
            ..Speaker::default()
        };
        let mut game = game(speaker.clone());
        game.start();
        game.start_session("a");
        game.handle(Command::Rotate, ms(0));
        game.handle(Command::HardDrop, ms(0));
        game.frame(ms(1), &mut NullCanvas, None);
        let played = speaker.played.borrow();
        assert!(played.contains(&Sound::Effect(Cue::Drop)));
        assert!(played
            .iter()
            .all(|s| !matches!(s, Sound::Tone(t) if *t == Cue::Drop.fallback_tone())));
    }

    #[test]
    fn game_over_records_once_and_updates_display() {
        let mut game = game(Speaker::default());
        game.start();
        game.start_session("  Kim ");
        assert_eq!(game.display().player, Some(("Kim".to_string(), 0)));
        assert_eq!(game.display().board[0].0, "Ace");

        let mut now = 0;
        while !game.session().is_over() {
            game.handle(Command::HardDrop, ms(now));
            game.frame(ms(now), &mut NullCanvas, None);
            now += 1000;
        }
        game.frame(ms(now), &mut NullCanvas, None);
        game.frame(ms(now + 1), &mut NullCanvas, None);

        let records = game.scores().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Kim");
        let score = records[0].score;
        assert_eq!(game.display().game_over, Some(score));
        assert_eq!(game.display().board[0], ("Kim".to_string(), score));

        game.restart();
        assert_eq!(game.display().game_over, None);
        assert_eq!(game.session().player(), Some("Kim"));
        assert_eq!(game.scores().records().len(), 1);
    }

    #[test]
    fn name_preview_reads_best_scores() {
        let mut game = game(Speaker::default());
        assert_eq!(game.preview_best("   "), None);
        assert_eq!(game.preview_best("Zed"), Some(0));
        game.scores.record("Zed", 40, Utc::now()).unwrap();
        assert_eq!(game.preview_best(" Zed "), Some(40));
    }
}
