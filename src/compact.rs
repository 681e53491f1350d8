//! Reflow after a removal: tiles fall within their column, then empty columns close up.

use crate::board::{Board, Cell};

impl Board {
    /// Gravity followed by the column shift. Must run in this order: a column
    /// only counts as empty once gravity has settled it.
    pub fn compact(&mut self) {
        self.apply_gravity();
        self.shift_columns();
    }

    /// Per column, tiles fall to the bottom keeping their top-to-bottom order;
    /// the vacated cells at the top become empty.
    pub fn apply_gravity(&mut self) {
        for col in 0..self.width {
            let mut empty_slots = 0;
            for row in (0..self.height).rev() {
                let cell = self.rows[row][col];
                if cell.is_empty() {
                    empty_slots += 1;
                } else if empty_slots > 0 {
                    self.rows[row + empty_slots][col] = cell;
                    self.rows[row][col] = Cell::Empty;
                }
            }
        }
    }

    /// Fully empty columns are dropped and the rest repacked from column 0
    /// in their original left-to-right order; trailing columns become empty.
    pub fn shift_columns(&mut self) {
        let mut write = 0;
        for col in 0..self.width {
            if self.column_is_empty(col) {
                continue;
            }
            if write != col {
                for row in &mut self.rows {
                    row[write] = row[col];
                    row[col] = Cell::Empty;
                }
            }
            write += 1;
        }
    }

    pub fn column_is_empty(&self, col: usize) -> bool {
        self.rows.iter().all(|row| row[col].is_empty())
    }
}
