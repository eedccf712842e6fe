//! 2D grid of cell states.

use daisy_core::{CellState, Error, Position, Result};

/// A fixed-size, bounded 2D grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<CellState>,
}

impl Grid {
    /// Create an all-barren grid.
    ///
    /// The area must fit in `i32` so every cell index maps to a `Position`.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width < 1 || height < 1 || width as i64 * height as i64 > i32::MAX as i64 {
            return Err(Error::InvalidDimension { width, height });
        }

        let size = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            cells: vec![CellState::Barren; size],
        })
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Get the cell at a position, `None` outside the grid
    pub fn get(&self, pos: Position) -> Option<CellState> {
        self.pos_to_index(pos).map(|index| self.cells[index])
    }

    /// Set the cell at a position; returns false outside the grid
    #[cfg(test)]
    pub(crate) fn set(&mut self, pos: Position, state: CellState) -> bool {
        match self.pos_to_index(pos) {
            Some(index) => {
                self.cells[index] = state;
                true
            }
            None => false,
        }
    }

    /// Mutable access to every cell in row-major order
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut CellState> + '_ {
        self.cells.iter_mut()
    }

    /// Count cells per state as `(dark, light, barren)`
    pub fn census(&self) -> (u64, u64, u64) {
        self.cells
            .iter()
            .fold((0, 0, 0), |(dark, light, barren), cell| match cell {
                CellState::Dark => (dark + 1, light, barren),
                CellState::Light => (dark, light + 1, barren),
                CellState::Barren => (dark, light, barren + 1),
            })
    }

    /// Net heat of all cells, summed from each cell's thermal contribution
    pub fn thermal_sum(&self) -> i64 {
        self.cells.iter().map(CellState::thermal_contribution).sum()
    }

    fn pos_to_index(&self, pos: Position) -> Option<usize> {
        if pos.in_bounds(self.width, self.height) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), *cell))
    }
}
