use macroquad::prelude::*;

use crate::ports::ScoreDisplay;

const TEXT: Color = WHITE;
const DIM: Color = GRAY;
const RESTART_SIZE: (f32, f32) = (160.0, 40.0);

/// Side panel text. Values arrive through `ScoreDisplay` and are drawn every frame.
#[derive(Debug, Default)]
pub struct Hud {
    score: u32,
    lines: u32,
    level: u32,
    player: Option<(String, u32)>,
    leaderboard: Vec<(String, u32)>,
    final_score: Option<u32>,
}

impl ScoreDisplay for Hud {
    fn show_stats(&mut self, score: u32, lines: u32, level: u32) {
        self.score = score;
        self.lines = lines;
        self.level = level;
    }

    fn show_player(&mut self, name: &str, best: u32) {
        self.player = Some((name.to_string(), best));
    }

    fn show_leaderboard(&mut self, entries: &[(String, u32)]) {
        self.leaderboard = entries.to_vec();
    }

    fn show_game_over(&mut self, final_score: Option<u32>) {
        self.final_score = final_score;
    }
}

impl Hud {
    pub fn is_game_over(&self) -> bool {
        self.final_score.is_some()
    }

    /// Restart button placed under the board; only drawn after game over.
    pub fn restart_button(&self, board_origin: Vec2, board_size: (f32, f32)) -> Rect {
        Rect::new(
            board_origin.x + (board_size.0 - RESTART_SIZE.0) / 2.0,
            board_origin.y + board_size.1 / 2.0 + 30.0,
            RESTART_SIZE.0,
            RESTART_SIZE.1,
        )
    }

    pub fn draw_panel(&self, x: f32, y: f32) {
        let mut line_y = y;
        let mut line = |text: &str, size: f32, color: Color| {
            draw_text(text, x, line_y, size, color);
            line_y += size + 8.0;
        };

        line(&format!("Score: {}", self.score), 32.0, TEXT);
        line(&format!("Lines: {}", self.lines), 32.0, TEXT);
        line(&format!("Level: {}", self.level), 32.0, TEXT);
        match &self.player {
            Some((name, best)) => {
                line(&format!("Player: {}", name), 24.0, TEXT);
                line(&format!("Best: {}", best), 24.0, TEXT);
            }
            None => line("Player: -", 24.0, DIM),
        }
        line("Top scores", 24.0, YELLOW);
        for (i, (name, score)) in self.leaderboard.iter().enumerate() {
            line(&format!("{}. {} - {}", i + 1, name, score), 20.0, TEXT);
        }
    }

    pub fn draw_game_over(&self, board_origin: Vec2, board_size: (f32, f32)) {
        let Some(score) = self.final_score else {
            return;
        };
        let (w, h) = board_size;
        draw_rectangle(board_origin.x, board_origin.y, w, h, Color::new(0.0, 0.0, 0.0, 0.6));
        let msg = "Game Over";
        let measure = measure_text(msg, None, 50, 1.0);
        draw_text(msg, board_origin.x + (w - measure.width) / 2.0, board_origin.y + h / 2.0 - 30.0, 50.0, RED);
        let final_text = format!("Final score: {}", score);
        let measure = measure_text(&final_text, None, 28, 1.0);
        draw_text(&final_text, board_origin.x + (w - measure.width) / 2.0, board_origin.y + h / 2.0 + 5.0, 28.0, TEXT);

        let button = self.restart_button(board_origin, board_size);
        draw_rectangle(button.x, button.y, button.w, button.h, DARKGRAY);
        draw_rectangle_lines(button.x, button.y, button.w, button.h, 2.0, TEXT);
        draw_text("Restart (R)", button.x + 18.0, button.y + 27.0, 26.0, TEXT);
    }
}
