use crate::{
    foundation::error::{ReplayError, ReplayResult},
    input::model::HouseTask,
};

/// Walks the house log with a fixed stride.
///
/// The planner writes one house entry per algorithm run, so consecutive entries describe the
/// same house and the default stride of 2 visits each house once.
#[derive(Clone, Debug)]
pub struct HouseQueue<'a> {
    houses: &'a [HouseTask],
    index: usize,
    stride: usize,
}

impl<'a> HouseQueue<'a> {
    pub const DEFAULT_STRIDE: usize = 2;

    pub fn new(houses: &'a [HouseTask], stride: usize) -> ReplayResult<Self> {
        if stride == 0 {
            return Err(ReplayError::validation("house queue stride must be > 0"));
        }
        Ok(Self {
            houses,
            index: 0,
            stride,
        })
    }

    /// Index into the house log of the entry the next call to `next` returns.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.houses.len()
    }
}

impl<'a> Iterator for HouseQueue<'a> {
    type Item = &'a HouseTask;

    fn next(&mut self) -> Option<Self::Item> {
        let house = self.houses.get(self.index)?;
        self.index = self.index.saturating_add(self.stride);
        Some(house)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.houses.len().saturating_sub(self.index).div_ceil(self.stride);
        (left, Some(left))
    }
}

impl ExactSizeIterator for HouseQueue<'_> {}
