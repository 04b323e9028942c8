use ::rand::Rng;
use macroquad::color::Color;
use serde::{Deserialize, Serialize};

use crate::config::COLS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

pub const ALL_TYPES: [TetrominoType; 7] = [
    TetrominoType::I,
    TetrominoType::O,
    TetrominoType::T,
    TetrominoType::S,
    TetrominoType::Z,
    TetrominoType::J,
    TetrominoType::L,
];

const fn rgb(hex: u32) -> Color {
    Color {
        r: ((hex >> 16) & 0xff) as f32 / 255.0,
        g: ((hex >> 8) & 0xff) as f32 / 255.0,
        b: (hex & 0xff) as f32 / 255.0,
        a: 1.0,
    }
}

pub const PIECE_COLORS: [Color; 7] = [
    rgb(0x60a5fa), // I
    rgb(0xfacc15), // O
    rgb(0xc084fc), // T
    rgb(0x34d399), // S
    rgb(0xf87171), // Z
    rgb(0x38bdf8), // J
    rgb(0xfb923c), // L
];

impl TetrominoType {
    pub fn color(self) -> Color {
        PIECE_COLORS[self as usize]
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        ALL_TYPES[rng.random_range(0..ALL_TYPES.len())]
    }
}

pub const MAX_SHAPE: usize = 4;

/// Square occupancy matrix of side `size`; only the top-left `size × size` cells are meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    size: usize,
    cells: [[bool; MAX_SHAPE]; MAX_SHAPE],
}

impl Shape {
    pub const fn from_rows<const N: usize>(rows: [[u8; N]; N]) -> Self {
        let mut cells = [[false; MAX_SHAPE]; MAX_SHAPE];
        let mut r = 0;
        while r < N {
            let mut c = 0;
            while c < N {
                cells[r][c] = rows[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Shape { size: N, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// Like `is_filled` but tolerant of offsets outside the matrix.
    pub fn is_filled_at(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && self.is_filled(row as usize, col as usize)
    }

    /// Occupied cells as `(row, col)` offsets inside the matrix.
    pub fn filled(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |r| {
            (0..self.size)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (r as i32, c as i32))
        })
    }

    /// Quarter turn clockwise: `result[i][j] = self[n-1-j][i]`.
    pub fn rotated(&self) -> Self {
        let n = self.size;
        let mut cells = [[false; MAX_SHAPE]; MAX_SHAPE];
        for (i, row) in cells.iter_mut().enumerate().take(n) {
            for (j, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[n - 1 - j][i];
            }
        }
        Shape { size: n, cells }
    }
}

pub const TETROMINO_SHAPES: [Shape; 7] = [
    Shape::from_rows([[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]), // I
    Shape::from_rows([[1, 1], [1, 1]]),                                        // O
    Shape::from_rows([[0, 1, 0], [1, 1, 1], [0, 0, 0]]),                       // T
    Shape::from_rows([[0, 1, 1], [1, 1, 0], [0, 0, 0]]),                       // S
    Shape::from_rows([[1, 1, 0], [0, 1, 1], [0, 0, 0]]),                       // Z
    Shape::from_rows([[1, 0, 0], [1, 1, 1], [0, 0, 0]]),                       // J
    Shape::from_rows([[0, 0, 1], [1, 1, 1], [0, 0, 0]]),                       // L
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tetromino {
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
    pub t_type: TetrominoType,
}

impl Tetromino {
    /// Fresh piece at the spawn position: horizontally centered, one row above the board.
    pub fn new(t_type: TetrominoType) -> Self {
        let shape = TETROMINO_SHAPES[t_type as usize];
        Tetromino {
            shape,
            x: (COLS as i32 - shape.size() as i32) / 2,
            y: -1,
            t_type,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(TetrominoType::random(rng))
    }

    /// Absolute `(row, col)` board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells_with(&self.shape, 0, 0)
    }

    pub fn cells_with<'a>(
        &self,
        shape: &'a Shape,
        dx: i32,
        dy: i32,
    ) -> impl Iterator<Item = (i32, i32)> + 'a {
        let (x, y) = (self.x + dx, self.y + dy);
        shape.filled().map(move |(r, c)| (y + r, x + c))
    }

    pub fn color(&self) -> Color {
        self.t_type.color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::rngs::StdRng;
    use ::rand::SeedableRng;

    #[test]
    fn four_turns_return_to_start() {
        for shape in TETROMINO_SHAPES {
            let turned = shape.rotated().rotated().rotated().rotated();
            assert_eq!(turned, shape);
        }
    }

    #[test]
    fn t_rotates_clockwise() {
        let t = TETROMINO_SHAPES[TetrominoType::T as usize].rotated();
        assert_eq!(t, Shape::from_rows([[0, 1, 0], [0, 1, 1], [0, 1, 0]]));
    }

    #[test]
    fn i_rotates_to_vertical() {
        let i = TETROMINO_SHAPES[TetrominoType::I as usize].rotated();
        let cols: Vec<i32> = i.filled().map(|(_, c)| c).collect();
        assert_eq!(cols, vec![2, 2, 2, 2]);
    }

    #[test]
    fn every_shape_has_four_cells() {
        for shape in TETROMINO_SHAPES {
            assert_eq!(shape.filled().count(), 4);
        }
    }

    #[test]
    fn spawn_is_centered_above_board() {
        assert_eq!(Tetromino::new(TetrominoType::I).x, 3);
        assert_eq!(Tetromino::new(TetrominoType::O).x, 4);
        assert_eq!(Tetromino::new(TetrominoType::T).x, 3);
        assert_eq!(Tetromino::new(TetrominoType::T).y, -1);
    }

    #[test]
    fn rotating_a_piece_leaves_the_template_alone() {
        let mut piece = Tetromino::new(TetrominoType::L);
        piece.shape = piece.shape.rotated();
        assert_ne!(piece.shape, TETROMINO_SHAPES[TetrominoType::L as usize]);
        assert_eq!(
            Tetromino::new(TetrominoType::L).shape,
            TETROMINO_SHAPES[TetrominoType::L as usize]
        );
    }

    #[test]
    fn random_pieces_cover_all_types() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(Tetromino::random(&mut rng).t_type);
        }
        assert_eq!(seen.len(), 7);
    }
}
