use std::time::Duration;

use macroquad::color::Color;

use crate::config::{BLOCK_SIZE, COLS, PREVIEW_BOX, ROWS};
use crate::ports::Canvas;
use crate::session::Session;
use crate::tetromino::Tetromino;

const GAME_AREA_COLOR: Color = Color::new(0.06, 0.09, 0.16, 1.0);
const CELL_OUTLINE: Color = Color::new(0.06, 0.09, 0.16, 1.0);
const PIECE_EDGE: Color = Color::new(1.0, 1.0, 1.0, 0.85);
const EDGE_WIDTH: f32 = 2.0;

pub fn board_size() -> (f32, f32) {
    (COLS as f32 * BLOCK_SIZE, ROWS as f32 * BLOCK_SIZE)
}

/// One frame: settled cells, the falling piece with its edge highlight, the
/// flashing rows, and the next piece on the preview surface when there is one.
pub fn draw_frame(
    canvas: &mut dyn Canvas,
    preview: Option<&mut dyn Canvas>,
    session: &Session,
    now: Duration,
) {
    let (board_w, board_h) = board_size();
    canvas.fill_rect(0.0, 0.0, board_w, board_h, GAME_AREA_COLOR);

    for (y, row) in session.board().rows().iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if let Some(t) = cell {
                draw_cell(canvas, x as f32 * BLOCK_SIZE, y as f32 * BLOCK_SIZE, BLOCK_SIZE, t.color());
            }
        }
    }

    if let Some(piece) = session.active() {
        draw_piece(canvas, piece);
    }

    if let Some(clear) = session.clearing() {
        let flash = Color::new(1.0, 1.0, 1.0, clear.overlay_alpha(now));
        for &row in clear.rows() {
            canvas.fill_rect(0.0, row as f32 * BLOCK_SIZE, board_w, BLOCK_SIZE, flash);
        }
    }

    if let Some(preview) = preview {
        draw_preview(preview, session.next());
    }
}

fn draw_cell(canvas: &mut dyn Canvas, px: f32, py: f32, size: f32, color: Color) {
    canvas.fill_rect(px, py, size, size, color);
    canvas.stroke_rect(px + 0.5, py + 0.5, size - 1.0, size - 1.0, 1.0, CELL_OUTLINE);
}

fn draw_piece(canvas: &mut dyn Canvas, piece: &Tetromino) {
    let filled = |r: i32, c: i32| piece.shape.is_filled_at(r, c);
    for (r, c) in piece.shape.filled() {
        let row = piece.y + r;
        if row < 0 {
            continue;
        }
        let px = (piece.x + c) as f32 * BLOCK_SIZE;
        let py = row as f32 * BLOCK_SIZE;
        draw_cell(canvas, px, py, BLOCK_SIZE, piece.color());

        // Highlight only the sides that face away from the rest of the piece.
        if !filled(r - 1, c) {
            canvas.fill_rect(px, py, BLOCK_SIZE, EDGE_WIDTH, PIECE_EDGE);
        }
        if !filled(r + 1, c) {
            canvas.fill_rect(px, py + BLOCK_SIZE - EDGE_WIDTH, BLOCK_SIZE, EDGE_WIDTH, PIECE_EDGE);
        }
        if !filled(r, c - 1) {
            canvas.fill_rect(px, py, EDGE_WIDTH, BLOCK_SIZE, PIECE_EDGE);
        }
        if !filled(r, c + 1) {
            canvas.fill_rect(px + BLOCK_SIZE - EDGE_WIDTH, py, EDGE_WIDTH, BLOCK_SIZE, PIECE_EDGE);
        }
    }
}

/// Next piece, trimmed to its occupied cells and centered in a `PREVIEW_BOX` square.
pub fn draw_preview(canvas: &mut dyn Canvas, piece: &Tetromino) {
    canvas.fill_rect(0.0, 0.0, PREVIEW_BOX, PREVIEW_BOX, GAME_AREA_COLOR);
    let cells: Vec<(i32, i32)> = piece.shape.filled().collect();
    let (Some(min_r), Some(max_r)) = (
        cells.iter().map(|&(r, _)| r).min(),
        cells.iter().map(|&(r, _)| r).max(),
    ) else {
        return;
    };
    let min_c = cells.iter().map(|&(_, c)| c).min().unwrap_or(0);
    let max_c = cells.iter().map(|&(_, c)| c).max().unwrap_or(0);
    let w = (max_c - min_c + 1) as f32;
    let h = (max_r - min_r + 1) as f32;
    let tile = (PREVIEW_BOX / (w.max(h) + 1.0)).min(BLOCK_SIZE);
    let offset_x = (PREVIEW_BOX - w * tile) / 2.0;
    let offset_y = (PREVIEW_BOX - h * tile) / 2.0;
    for (r, c) in cells {
        let px = offset_x + (c - min_c) as f32 * tile;
        let py = offset_y + (r - min_r) as f32 * tile;
        draw_cell(canvas, px, py, tile, piece.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Command;
    use crate::tetromino::TetrominoType;

    #[derive(Default)]
    struct Recorder {
        fills: Vec<(f32, f32, f32, f32, Color)>,
        strokes: usize,
    }

    impl Canvas for Recorder {
        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
            self.fills.push((x, y, w, h, color));
        }

        fn stroke_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _t: f32, _c: Color) {
            self.strokes += 1;
        }
    }

    #[test]
    fn active_piece_gets_cells_and_edges() {
        let mut session = Session::with_seed(9);
        session.start("r");
        let piece = *session.active().unwrap();
        let mut canvas = Recorder::default();
        draw_frame(&mut canvas, None, &session, Duration::ZERO);
        let visible = piece.cells().filter(|&(r, _)| r >= 0).count();
        assert_eq!(canvas.strokes, visible);
        let edges = canvas.fills.iter().filter(|f| f.4 == PIECE_EDGE).count();
        assert!(edges >= visible * 2);
    }

    #[test]
    fn o_piece_has_eight_exposed_edges() {
        let mut canvas = Recorder::default();
        let mut piece = Tetromino::new(TetrominoType::O);
        piece.y = 3;
        draw_piece(&mut canvas, &piece);
        let edges = canvas.fills.iter().filter(|f| f.4 == PIECE_EDGE).count();
        assert_eq!(edges, 8);
    }

    #[test]
    fn preview_fits_its_box() {
        let mut canvas = Recorder::default();
        draw_preview(&mut canvas, &Tetromino::new(TetrominoType::I));
        for &(x, y, w, h, _) in &canvas.fills {
            assert!(x >= 0.0 && y >= 0.0);
            assert!(x + w <= PREVIEW_BOX && y + h <= PREVIEW_BOX);
        }
        assert_eq!(canvas.fills.len(), 5);
    }

    #[test]
    fn clearing_rows_get_a_full_width_overlay() {
        let mut session = Session::with_seed(4);
        session.start("r");
        for col in 2..COLS {
            session.board_mut().set(ROWS - 1, col, Some(TetrominoType::J));
        }
        let mut piece = Tetromino::new(TetrominoType::O);
        piece.x = 0;
        piece.y = 0;
        session.set_active(piece);
        session.apply(Command::HardDrop, Duration::ZERO);

        let mut canvas = Recorder::default();
        draw_frame(&mut canvas, None, &session, Duration::from_millis(100));
        let (board_w, _) = board_size();
        let overlays: Vec<_> = canvas
            .fills
            .iter()
            .filter(|f| f.0 == 0.0 && f.2 == board_w && f.3 == BLOCK_SIZE)
            .collect();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].1, (ROWS - 1) as f32 * BLOCK_SIZE);
        assert!(overlays[0].4.a > 0.0 && overlays[0].4.a < 1.0);
    }
}
