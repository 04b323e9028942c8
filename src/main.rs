use log::{info, warn};
use macroquad::prelude::*;

use tetoris::config::{Settings, PREVIEW_BOX};
use tetoris::game::{Clock, Game, MonotonicClock};
use tetoris::hud::Hud;
use tetoris::input::{command_for_key, GestureTracker, KeyRepeat};
use tetoris::menu::TitleMenu;
use tetoris::platform::{poll_pointer, MacroquadCanvas};
use tetoris::ports::SoundPlayer;
use tetoris::records::ScoreBook;
use tetoris::render::board_size;
use tetoris::session::Session;
use tetoris::sound::RodioPlayer;
use tetoris::store::FileStore;

const MARGIN: f32 = 40.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Tetoris".to_owned(),
        window_width: 720,
        window_height: 700,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    let settings = Settings::load();

    let data_dir = settings.data_dir();
    info!("scores stored in {}", data_dir.display());
    let scores = ScoreBook::load(FileStore::new(data_dir));

    let sound: Option<Box<dyn SoundPlayer>> = match RodioPlayer::new(&settings) {
        Ok(player) => Some(Box::new(player)),
        Err(err) => {
            warn!("running without sound: {:#}", err);
            None
        }
    };

    let mut game = Game::new(Session::from_os_rng(), scores, Hud::default(), sound);
    let handle = game.start();
    let mut menu = TitleMenu::new();
    let clock = MonotonicClock::new();
    let mut gestures = GestureTracker::new(settings.gestures);
    let mut repeat = KeyRepeat::new();

    let (board_w, board_h) = board_size();
    let board_origin = vec2(MARGIN, MARGIN);
    let mut board = MacroquadCanvas::new(board_origin.x, board_origin.y);
    let preview_x = board_origin.x + board_w + MARGIN;
    let mut preview = MacroquadCanvas::new(preview_x, MARGIN);

    while handle.is_running() {
        if is_key_pressed(KeyCode::Escape) {
            game.stop();
            break;
        }
        let now = clock.now();
        clear_background(BLACK);

        if !game.session().is_started() {
            if menu.update() {
                game.start_session(&menu.player_name);
            } else {
                menu.draw(game.preview_best(&menu.player_name));
                next_frame().await;
                continue;
            }
        }

        for key in get_keys_pressed() {
            if key == KeyCode::R && game.session().is_over() {
                game.restart();
                continue;
            }
            if let Some(command) = command_for_key(key) {
                repeat.pressed(key, now);
                game.handle(command, now);
            }
        }
        if let Some(command) = repeat.update(is_key_down, now) {
            game.handle(command, now);
        }
        for command in poll_pointer(&mut gestures, now) {
            game.handle(command, now);
        }
        if game.session().is_over() && is_mouse_button_pressed(MouseButton::Left) {
            let button = game.display().restart_button(board_origin, (board_w, board_h));
            if button.contains(Vec2::from(mouse_position())) {
                gestures.cancel();
                game.restart();
            }
        }

        game.frame(now, &mut board, Some(&mut preview));
        draw_text("Next", preview_x, MARGIN - 8.0, 24.0, WHITE);
        game.display().draw_panel(preview_x, MARGIN + PREVIEW_BOX + 40.0);
        game.display().draw_game_over(board_origin, (board_w, board_h));

        next_frame().await;
    }
    info!("bye");
}
