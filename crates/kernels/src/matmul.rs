//! Per-cell matrix-multiply workload.

use anyhow::{ensure, Result};
use gridsweep_engine::{Cell, CellKernel, Domain};
use ndarray::Array2;

/// Computes one output cell of `lhs @ rhs` per domain cell.
///
/// The domain is the output shape: cell (i, j) is the dot product of lhs
/// row i and rhs column j, so partitioning the domain partitions the
/// product without any cross-worker accumulation.
pub struct MatmulCells {
    lhs: Array2<f32>,
    rhs: Array2<f32>,
}

impl MatmulCells {
    pub fn new(lhs: Array2<f32>, rhs: Array2<f32>) -> Result<Self> {
        ensure!(
            lhs.ncols() == rhs.nrows(),
            "matmul dimension mismatch: lhs {}x{} vs rhs {}x{}",
            lhs.nrows(),
            lhs.ncols(),
            rhs.nrows(),
            rhs.ncols()
        );
        Ok(Self { lhs, rhs })
    }

    /// Seeded random problem of shape `(m, k) @ (k, n)`.
    pub fn random(m: usize, n: usize, k: usize, seed: u64) -> Self {
        fastrand::seed(seed);
        let lhs = Array2::from_shape_fn((m, k), |_| fastrand::f32() * 2.0 - 1.0);
        let rhs = Array2::from_shape_fn((k, n), |_| (fastrand::f32() * 2.0 - 1.0) * 0.1);
        Self { lhs, rhs }
    }

    /// The output index space: one cell per element of the product.
    pub fn domain(&self) -> Domain {
        Domain::grid(self.lhs.nrows(), self.rhs.ncols())
    }

    pub fn lhs(&self) -> &Array2<f32> {
        &self.lhs
    }

    pub fn rhs(&self) -> &Array2<f32> {
        &self.rhs
    }
}

impl CellKernel for MatmulCells {
    type Output = f32;

    fn name(&self) -> &'static str {
        "matmul-cells"
    }

    fn eval(&self, cell: Cell) -> Result<f32> {
        Ok(self.lhs.row(cell.row).dot(&self.rhs.column(cell.col)))
    }
}
