//! Splitting key lists into batches that match prepared statement shapes.
//!
//! Multi-key reads and removals use `IN (...)` statements with a fixed number
//! of parameters. Only the sizes in [`BATCH_LADDER`] are prepared, so a list of
//! keys is cut into batches where each batch takes the largest shape that the
//! remaining keys fill completely:
//!
//! | keys | batches  |
//! |------|----------|
//! | 5    | 4, 1     |
//! | 12   | 11, 1    |
//! | 52   | 51, 1    |
//! | 110  | 51, 51, 4, 4 |

pub use crate::constants::BATCH_LADDER;
use crate::store::StoreError;

/// One of the prepared batch sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BatchShape {
    One,
    Four,
    Eleven,
    FiftyOne,
}

impl BatchShape {
    /// Shapes from smallest to largest.
    pub const ALL: [BatchShape; 4] = [
        BatchShape::One,
        BatchShape::Four,
        BatchShape::Eleven,
        BatchShape::FiftyOne,
    ];

    /// Number of keys bound by this shape.
    pub const fn size(self) -> usize {
        BATCH_LADDER[self.index()]
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            BatchShape::One => 0,
            BatchShape::Four => 1,
            BatchShape::Eleven => 2,
            BatchShape::FiftyOne => 3,
        }
    }

    /// The shape for exactly `size` keys.
    pub fn for_size(size: usize) -> Result<Self, StoreError> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.size() == size)
            .ok_or(StoreError::InvalidBatchSize {
                size,
                supported: &BATCH_LADDER,
            })
    }

    /// The largest shape that `remaining` keys fill, if any keys remain.
    pub fn largest_within(remaining: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .rev()
            .find(|shape| shape.size() <= remaining)
    }
}

/// Iterator over consecutive batches of a slice.
#[derive(Debug, Clone)]
pub struct Batches<'a, T> {
    rest: &'a [T],
}

impl<'a, T> Iterator for Batches<'a, T> {
    type Item = (BatchShape, &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        let shape = BatchShape::largest_within(self.rest.len())?;
        let (batch, rest) = self.rest.split_at(shape.size());
        self.rest = rest;
        Some((shape, batch))
    }
}

/// Cut `items` into batches that each match a prepared shape exactly.
pub fn batches<T>(items: &[T]) -> Batches<'_, T> {
    Batches { rest: items }
}

/// The batch sizes used for `count` keys.
pub fn batch_sizes(count: usize) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut remaining = count;
    while let Some(shape) = BatchShape::largest_within(remaining) {
        sizes.push(shape.size());
        remaining -= shape.size();
    }
    sizes
}
