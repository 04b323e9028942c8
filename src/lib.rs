pub mod board;
pub mod clear_anim;
pub mod collision;
pub mod config;
pub mod game;
pub mod hud;
pub mod input;
pub mod menu;
pub mod platform;
pub mod ports;
pub mod records;
pub mod render;
pub mod session;
pub mod sound;
pub mod store;
pub mod tetromino;
