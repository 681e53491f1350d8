//! Connected same-colour regions and the no-moves-left scan.

use crate::board::{Board, Cell, Pos};
use std::collections::BTreeSet;

/// Smallest region that can be removed.
pub const MIN_REMOVABLE: usize = 2;

/// Orthogonal neighbours as (d_row, d_col).
const NEIGHBOURS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Maximal set of orthogonally connected cells sharing one colour.
/// Ordered so two regions compare equal exactly when they cover the same cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    cells: BTreeSet<Pos>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_removable(&self) -> bool {
        self.len() >= MIN_REMOVABLE
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    /// Top-left-most cell (smallest row, then column).
    pub fn origin(&self) -> Option<Pos> {
        self.cells.first().copied()
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a Pos;
    type IntoIter = std::collections::btree_set::Iter<'a, Pos>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl FromIterator<Pos> for Region {
    fn from_iter<I: IntoIterator<Item = Pos>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Board {
    /// Region containing `pos`. Empty for an out-of-range or empty cell.
    pub fn find_region(&self, pos: Pos) -> Region {
        let mut visited = vec![false; self.width * self.height];
        self.flood(pos, &mut visited).into_iter().collect()
    }

    /// True when no region of at least `MIN_REMOVABLE` cells exists.
    /// Each cell is flooded at most once: regions partition the tiles, so a
    /// visited cell already belongs to a region that has been measured.
    pub fn is_terminal(&self) -> bool {
        let mut visited = vec![false; self.width * self.height];
        for row in 0..self.height {
            for col in 0..self.width {
                let pos = Pos::new(row, col);
                if visited[self.index(pos)] {
                    continue;
                }
                if self.flood(pos, &mut visited).len() >= MIN_REMOVABLE {
                    return false;
                }
            }
        }
        true
    }

    /// Number of removable regions on the board.
    pub fn count_moves(&self) -> usize {
        let mut visited = vec![false; self.width * self.height];
        let mut moves = 0;
        for row in 0..self.height {
            for col in 0..self.width {
                let pos = Pos::new(row, col);
                if !visited[self.index(pos)] && self.flood(pos, &mut visited).len() >= MIN_REMOVABLE
                {
                    moves += 1;
                }
            }
        }
        moves
    }

    #[inline]
    fn index(&self, pos: Pos) -> usize {
        pos.row * self.width + pos.col
    }

    /// Depth-first walk over same-coloured orthogonal neighbours using an
    /// explicit stack. Marks every reached cell in `visited`.
    fn flood(&self, start: Pos, visited: &mut [bool]) -> Vec<Pos> {
        let color = match self.cell(start) {
            Some(Cell::Tile(c)) => c,
            _ => return Vec::new(),
        };
        let start_idx = self.index(start);
        if visited[start_idx] {
            return Vec::new();
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start_idx] = true;

        while let Some(pos) = stack.pop() {
            component.push(pos);
            for (dr, dc) in NEIGHBOURS_4 {
                let (Some(row), Some(col)) = (
                    pos.row.checked_add_signed(dr),
                    pos.col.checked_add_signed(dc),
                ) else {
                    continue;
                };
                let next = Pos::new(row, col);
                if self.cell(next) != Some(Cell::Tile(color)) {
                    continue;
                }
                let idx = self.index(next);
                if !visited[idx] {
                    visited[idx] = true;
                    stack.push(next);
                }
            }
        }
        component
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn region(cells: &[(usize, usize)]) -> Region {
        cells.iter().map(|&(r, c)| Pos::new(r, c)).collect()
    }

    #[test]
    fn test_find_region_basic() {
        let board = Board::parse(
            "
            0012
            0112
            3332
            ",
            4,
        );
        assert_eq!(
            board.find_region(Pos::new(0, 0)),
            region(&[(0, 0), (0, 1), (1, 0)])
        );
        assert_eq!(
            board.find_region(Pos::new(1, 2)),
            region(&[(0, 2), (1, 1), (1, 2)])
        );
        assert_eq!(
            board.find_region(Pos::new(2, 3)),
            region(&[(0, 3), (1, 3), (2, 3)])
        );
    }

    #[test]
    fn test_find_region_ignores_diagonals() {
        let board = Board::parse("01\n10", 4);
        assert_eq!(board.find_region(Pos::new(0, 0)), region(&[(0, 0)]));
        assert!(!board.find_region(Pos::new(0, 0)).is_removable());
    }

    #[test]
    fn test_find_region_empty_and_out_of_range() {
        let board = Board::parse("0.\n00", 4);
        assert!(board.find_region(Pos::new(0, 1)).is_empty());
        assert!(board.find_region(Pos::new(2, 0)).is_empty());
        assert!(board.find_region(Pos::new(0, 9)).is_empty());
    }

    #[test]
    fn test_find_region_is_pure() {
        let config = BoardConfig::new(15, 12, 4).unwrap();
        let board = Board::random(config, &mut StdRng::seed_from_u64(3));
        let before = board.clone();
        for row in 0..12 {
            for col in 0..15 {
                let pos = Pos::new(row, col);
                let first = board.find_region(pos);
                assert!(first.contains(pos));
                assert_eq!(first, board.find_region(pos));
            }
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_region_is_same_from_any_member() {
        let board = Board::parse("001\n101\n111", 4);
        let from_corner = board.find_region(Pos::new(2, 0));
        assert_eq!(from_corner.len(), 6);
        for pos in &from_corner {
            assert_eq!(board.find_region(*pos), from_corner);
        }
    }

    #[test]
    fn test_whole_board_region() {
        let rows = vec![vec![Cell::Tile(2); 25]; 20];
        let board = Board::from_rows(rows, 4);
        assert_eq!(board.find_region(Pos::new(10, 10)).len(), 500);
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_single_pair_is_not_terminal() {
        let board = Board::parse(
            "
            0123
            1230
            2302
            3011
            ",
            4,
        );
        assert!(!board.is_terminal());
        assert_eq!(board.count_moves(), 1);
    }

    #[test]
    fn test_checkerboard_is_terminal() {
        let board = Board::parse(
            "
            01010
            10101
            01010
            10101
            01010
            ",
            4,
        );
        assert!(board.is_terminal());
        assert_eq!(board.count_moves(), 0);
    }

    #[test]
    fn test_empty_board_is_terminal() {
        let board = Board::parse("....\n....", 4);
        assert!(board.is_terminal());
    }

    #[test]
    fn test_terminal_matches_naive_scan() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let config = BoardConfig::new(5, 5, 6).unwrap();
            let board = Board::random(config, &mut rng);
            let naive = (0..5).all(|row| {
                (0..5).all(|col| !board.find_region(Pos::new(row, col)).is_removable())
            });
            assert_eq!(board.is_terminal(), naive);
        }
    }
}
