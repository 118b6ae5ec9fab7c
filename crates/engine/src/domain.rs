//! Index spaces the engine partitions.

use crate::plan::WorkUnit;
use serde::{Deserialize, Serialize};

/// A rectangular index space of independent cells, immutable for a run.
///
/// One-dimensional domains are a single row. Two-dimensional domains are
/// scheduled row by row: strips and chunks always align to row boundaries,
/// the way the renderers hand whole rows to a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    pub rows: usize,
    pub cols: usize,
}

impl Domain {
    pub fn grid(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn linear(len: usize) -> Self {
        Self { rows: 1, cols: len }
    }

    /// Total number of cells in the flattened domain.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Number of schedulable units: rows for 2-D domains, cells for 1-D.
    pub fn units(&self) -> usize {
        if self.rows > 1 {
            self.rows
        } else {
            self.cols
        }
    }

    /// Expand a range of schedulable units to its flat cell span.
    ///
    /// For 2-D domains a unit range is a row range, so the span covers
    /// every column of those rows; for 1-D domains units are the cells
    /// themselves.
    pub fn unit_span(&self, unit: WorkUnit) -> WorkUnit {
        if self.rows > 1 {
            WorkUnit::new(unit.lo * self.cols, unit.hi * self.cols)
        } else {
            unit
        }
    }

    /// Recover the (row, col) coordinate of a flat index.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

/// Argument handed to a kernel for one cell.
///
/// `worker` identifies the executing worker for flat runs and the block for
/// nested runs; the benchmark kernels use it to color their output.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub worker: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_round_trip() {
        let domain = Domain::grid(4, 7);
        for index in 0..domain.len() {
            let (row, col) = domain.coords(index);
            assert_eq!(row * domain.cols + col, index);
            assert!(row < domain.rows && col < domain.cols);
        }
    }

    #[test]
    fn linear_domain_is_one_row() {
        let domain = Domain::linear(12);
        assert_eq!(domain.len(), 12);
        assert_eq!(domain.coords(11), (0, 11));
    }

    #[test]
    fn two_dimensional_domains_schedule_rows() {
        let domain = Domain::grid(9, 13);
        assert_eq!(domain.units(), 9);
        assert_eq!(
            domain.unit_span(WorkUnit::new(2, 5)),
            WorkUnit::new(26, 65)
        );
    }

    #[test]
    fn linear_domains_schedule_cells() {
        let domain = Domain::linear(40);
        assert_eq!(domain.units(), 40);
        assert_eq!(
            domain.unit_span(WorkUnit::new(3, 17)),
            WorkUnit::new(3, 17)
        );
    }
}
