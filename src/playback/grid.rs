use crate::{
    foundation::{
        core::Position,
        error::{ReplayError, ReplayResult},
    },
    input::model::{HouseTask, WALL},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Dirt(u8),
}

/// Working copy of a house's dirt matrix, owned by exactly one track.
///
/// Dirt levels only ever go down, one unit per [`DirtGrid::apply`], and stop at 0.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DirtGrid {
    rows: usize,
    cols: usize,
    cells: Vec<i32>, // row-major
}

impl DirtGrid {
    pub fn from_house(house: &HouseTask) -> ReplayResult<Self> {
        house.validate()?;
        let rows = house.rows();
        let cols = house.cols();
        let cells = house.house.iter().flatten().copied().collect();
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, p: Position) -> Option<usize> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        let (r, c) = (p.x as usize, p.y as usize);
        (r < self.rows && c < self.cols).then_some(r * self.cols + c)
    }

    /// Raw matrix value at `p` (`-1` for walls), or `None` outside the grid.
    pub fn level_at(&self, p: Position) -> Option<i32> {
        self.index(p).map(|i| self.cells[i])
    }

    pub fn cell(&self, p: Position) -> Option<Cell> {
        self.level_at(p).map(|v| {
            if v == WALL {
                Cell::Wall
            } else {
                Cell::Dirt(v.clamp(0, i32::from(u8::MAX)) as u8)
            }
        })
    }

    /// Clean one unit of dirt at `p`. Returns whether anything was removed.
    pub fn apply(&mut self, p: Position) -> ReplayResult<bool> {
        let i = self
            .index(p)
            .ok_or_else(|| ReplayError::precondition(format!("clean outside the grid at {p}")))?;
        match self.cells[i] {
            WALL => Err(ReplayError::precondition(format!(
                "clean attempted on wall cell {p}"
            ))),
            v if v > 0 => {
                self.cells[i] = v - 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Sum of the dirt still present.
    pub fn total_dirt(&self) -> u64 {
        self.cells
            .iter()
            .filter(|&&v| v > 0)
            .map(|&v| v as u64)
            .sum()
    }

    /// Row slices for renderers.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[i32]> {
        self.cells.chunks(self.cols)
    }
}
