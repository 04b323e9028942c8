use macroquad::prelude::*;

use crate::config::{DEFAULT_PLAYER, MAX_NAME_LEN};

/// Title screen: the player types a name and presses Enter to start.
pub struct TitleMenu {
    pub player_name: String,
}

impl Default for TitleMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleMenu {
    pub fn new() -> Self {
        Self {
            player_name: DEFAULT_PLAYER.to_string(),
        }
    }

    /// Accepts letters, digits and spaces up to the name limit.
    pub fn type_char(&mut self, c: char) {
        if (c.is_alphanumeric() || c == ' ') && self.player_name.chars().count() < MAX_NAME_LEN {
            self.player_name.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.player_name.pop();
    }

    /// Returns true when Enter is pressed.
    pub fn update(&mut self) -> bool {
        if is_key_pressed(KeyCode::Backspace) {
            self.backspace();
        }
        while let Some(c) = get_char_pressed() {
            self.type_char(c);
        }
        is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter)
    }

    pub fn draw(&self, best: Option<u32>) {
        let start_x = screen_width() / 2.0 - 200.0;
        let mut start_y = screen_height() / 2.0 - 120.0;
        let spacing = 50.0;

        draw_text("TETORIS", start_x, start_y, 60.0, YELLOW);
        start_y += spacing + 20.0;

        draw_text(&format!("Player Name: {}_", self.player_name), start_x, start_y, 30.0, WHITE);
        start_y += spacing;

        let best_text = match best {
            Some(score) => format!("Best: {}", score),
            None => "Best: -".to_string(),
        };
        draw_text(&best_text, start_x, start_y, 26.0, WHITE);
        start_y += spacing;

        draw_text("Press Enter to start", start_x, start_y, 30.0, YELLOW);
        draw_text(
            "Type to change name. Backspace to delete. Esc quits.",
            start_x,
            start_y + 40.0,
            20.0,
            GRAY,
        );
    }
}
