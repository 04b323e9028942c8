use crate::board::Board;
use crate::config::{COLS, ROWS};
use crate::tetromino::{Shape, Tetromino};

/// Horizontal offsets tried, in order, when a rotation does not fit in place.
const KICKS: [i32; 3] = [0, -1, 1];

/// True when `piece`, moved by `(dx, dy)` and optionally reshaped, would leave the
/// board sideways or through the floor, or overlap a settled cell.
/// Cells above the top edge only count against the side walls.
pub fn collides(board: &Board, piece: &Tetromino, dx: i32, dy: i32, shape: Option<&Shape>) -> bool {
    let shape = shape.unwrap_or(&piece.shape);
    piece.cells_with(shape, dx, dy).any(|(row, col)| {
        if col < 0 || col >= COLS as i32 || row >= ROWS as i32 {
            return true;
        }
        row >= 0 && board.is_occupied(row, col)
    })
}

/// Rotates clockwise in place, trying a one-column kick left then right.
/// Returns false and leaves the piece untouched when nothing fits.
pub fn try_rotate(board: &Board, piece: &mut Tetromino) -> bool {
    let rotated = piece.shape.rotated();
    match KICKS
        .iter()
        .copied()
        .find(|&dx| !collides(board, piece, dx, 0, Some(&rotated)))
    {
        Some(dx) => {
            piece.shape = rotated;
            piece.x += dx;
            true
        }
        None => false,
    }
}

/// Largest downward distance the piece can travel without colliding.
pub fn drop_distance(board: &Board, piece: &Tetromino) -> i32 {
    let mut dy = 0;
    while !collides(board, piece, 0, dy + 1, None) {
        dy += 1;
    }
    dy
}
