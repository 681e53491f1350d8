//! Board state: grid of coloured tiles, configuration bounds, cell access.

use rand::Rng;
use thiserror::Error;

/// Number of colours in the palette; `num_colors` may not exceed this.
pub const PALETTE_SIZE: u8 = 6;

pub const MIN_WIDTH: usize = 5;
pub const MAX_WIDTH: usize = 25;
pub const MIN_HEIGHT: usize = 5;
pub const MAX_HEIGHT: usize = 20;
pub const MIN_COLORS: u8 = 4;

/// Single cell: either empty or a tile of a given colour index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Tile(u8), // colour index 0..num_colors
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// Colour index, or None for an empty cell.
    #[inline]
    pub fn color(self) -> Option<u8> {
        match self {
            Self::Empty => None,
            Self::Tile(c) => Some(c),
        }
    }
}

/// Grid coordinate. Row 0 is the top, column 0 the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board width {0} is outside 5..=25")]
    Width(usize),
    #[error("board height {0} is outside 5..=20")]
    Height(usize),
    #[error("colour count {0} is outside 4..=6")]
    Colors(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cell ({row}, {col}) is outside the {height}x{width} board")]
pub struct IndexError {
    pub row: usize,
    pub col: usize,
    pub height: usize,
    pub width: usize,
}

/// Validated board dimensions and colour count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardConfig {
    width: usize,
    height: usize,
    num_colors: u8,
}

impl BoardConfig {
    pub fn new(width: usize, height: usize, num_colors: u8) -> Result<Self, ConfigError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return Err(ConfigError::Width(width));
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height) {
            return Err(ConfigError::Height(height));
        }
        if !(MIN_COLORS..=PALETTE_SIZE).contains(&num_colors) {
            return Err(ConfigError::Colors(num_colors));
        }
        Ok(Self {
            width,
            height,
            num_colors,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }
}

impl Default for BoardConfig {
    /// 20x10 with 5 colours: the horizontal board the game opens with.
    fn default() -> Self {
        Self {
            width: 20,
            height: 10,
            num_colors: 5,
        }
    }
}

/// Board: grid of cells. rows[row][col]; rows[0] is top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) num_colors: u8,
    pub(crate) rows: Vec<Vec<Cell>>,
}

impl Board {
    /// Fill every cell with a uniformly random colour in `0..num_colors`.
    pub fn random<R: Rng>(config: BoardConfig, rng: &mut R) -> Self {
        let rows = (0..config.height)
            .map(|_| {
                (0..config.width)
                    .map(|_| Cell::Tile(rng.random_range(0..config.num_colors)))
                    .collect()
            })
            .collect();
        Self {
            width: config.width,
            height: config.height,
            num_colors: config.num_colors,
            rows,
        }
    }

    /// Build a board from explicit rows. Dimensions are not bound-checked so
    /// small fixtures (e.g. a single row) can be expressed; every row must have
    /// the same length and every tile colour must be below `num_colors`.
    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<Cell>>, num_colors: u8) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        assert!(rows.iter().all(|r| r.len() == width), "ragged board rows");
        assert!(
            rows.iter()
                .flatten()
                .filter_map(|c| c.color())
                .all(|c| c < num_colors),
            "tile colour outside palette of {num_colors}"
        );
        Self {
            width,
            height,
            num_colors,
            rows,
        }
    }

    /// Parse a fixture: one line per row, `.` for empty, digits for colours.
    #[cfg(test)]
    pub fn parse(s: &str, num_colors: u8) -> Self {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| {
                l.chars()
                    .map(|ch| match ch {
                        '.' => Cell::Empty,
                        d => Cell::Tile(d.to_digit(10).expect("digit") as u8),
                    })
                    .collect()
            })
            .collect();
        Self::from_rows(rows, num_colors)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Checked access for callers outside the engine.
    pub fn get(&self, row: usize, col: usize) -> Result<Cell, IndexError> {
        self.cell(Pos::new(row, col)).ok_or(IndexError {
            row,
            col,
            height: self.height,
            width: self.width,
        })
    }

    #[inline]
    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.rows.get(pos.row).and_then(|row| row.get(pos.col)).copied()
    }

    /// Clear the given cells. Every cell must be in range and hold a tile.
    pub fn remove_cells<'a>(&mut self, cells: impl IntoIterator<Item = &'a Pos>) {
        for &pos in cells {
            assert!(self.in_bounds(pos), "remove_cells: {pos:?} out of bounds");
            let cell = &mut self.rows[pos.row][pos.col];
            assert!(!cell.is_empty(), "remove_cells: {pos:?} already empty");
            *cell = Cell::Empty;
        }
    }

    /// Number of non-empty cells.
    pub fn tiles_left(&self) -> usize {
        self.rows.iter().flatten().filter(|c| !c.is_empty()).count()
    }

    pub fn is_cleared(&self) -> bool {
        self.rows.iter().flatten().all(|c| c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_config_bounds() {
        assert!(BoardConfig::new(5, 5, 4).is_ok());
        assert!(BoardConfig::new(25, 20, PALETTE_SIZE).is_ok());
        assert_eq!(BoardConfig::new(4, 10, 5), Err(ConfigError::Width(4)));
        assert_eq!(BoardConfig::new(26, 10, 5), Err(ConfigError::Width(26)));
        assert_eq!(BoardConfig::new(10, 4, 5), Err(ConfigError::Height(4)));
        assert_eq!(BoardConfig::new(10, 21, 5), Err(ConfigError::Height(21)));
        assert_eq!(BoardConfig::new(10, 10, 3), Err(ConfigError::Colors(3)));
        assert_eq!(
            BoardConfig::new(10, 10, PALETTE_SIZE + 1),
            Err(ConfigError::Colors(PALETTE_SIZE + 1))
        );
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::Width(30).to_string(),
            "board width 30 is outside 5..=25"
        );
        assert_eq!(
            ConfigError::Colors(2).to_string(),
            "colour count 2 is outside 4..=6"
        );
    }

    #[test]
    fn test_random_fill_uses_palette() {
        let config = BoardConfig::new(25, 20, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::random(config, &mut rng);
        assert_eq!(board.width(), 25);
        assert_eq!(board.height(), 20);
        assert_eq!(board.tiles_left(), 25 * 20);
        for row in 0..20 {
            for col in 0..25 {
                match board.get(row, col).unwrap() {
                    Cell::Tile(c) => assert!(c < 4),
                    Cell::Empty => panic!("fresh board has an empty cell"),
                }
            }
        }
    }

    #[test]
    fn test_random_fill_is_seeded() {
        let config = BoardConfig::default();
        let a = Board::random(config, &mut StdRng::seed_from_u64(42));
        let b = Board::random(config, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let board = Board::parse("01\n10", 4);
        assert_eq!(board.get(1, 1), Ok(Cell::Tile(0)));
        let err = board.get(2, 0).unwrap_err();
        assert_eq!(
            err,
            IndexError {
                row: 2,
                col: 0,
                height: 2,
                width: 2
            }
        );
        assert!(board.get(0, 2).is_err());
    }

    #[test]
    fn test_remove_cells() {
        let mut board = Board::parse("01\n10", 4);
        board.remove_cells(&[Pos::new(0, 0), Pos::new(1, 1)]);
        assert_eq!(board, Board::parse(".1\n1.", 4));
        assert_eq!(board.tiles_left(), 2);
    }

    #[test]
    #[should_panic(expected = "already empty")]
    fn test_remove_empty_cell_panics() {
        let mut board = Board::parse("0.", 4);
        board.remove_cells(&[Pos::new(0, 1)]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_remove_out_of_bounds_panics() {
        let mut board = Board::parse("00", 4);
        board.remove_cells(&[Pos::new(3, 0)]);
    }
}
