//! Nested execution: an outer block grid with an inner pool per block.

use crate::buffer::OutputSlots;
use crate::domain::{Cell, Domain};
use crate::error::EngineError;
use crate::plan::{WorkSource, WorkUnit};
use crate::policy::Policy;
use crate::pool::{drive_workers, CellKernel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outer decomposition of a 2-D domain into rectangular blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockGrid {
    pub x: usize,
    pub y: usize,
}

impl BlockGrid {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn blocks(&self) -> usize {
        self.x * self.y
    }
}

/// Partition the domain into `grid` blocks, split the block list statically
/// across `outer_workers`, and run an independent inner pool with
/// `inner_workers` and `inner_policy` over each block's rows.
///
/// Each block's inner join barrier completes before its outer worker takes
/// the next block, and the outer join barrier completes before this
/// function returns. The two claim scopes never share an atomic.
/// `Cell.worker` carries the block id, matching the quadrant coloring of
/// the nested benchmarks.
pub fn run_nested<K: CellKernel>(
    domain: Domain,
    grid: BlockGrid,
    outer_workers: usize,
    inner_workers: usize,
    inner_policy: Policy,
    kernel: &K,
    out: &mut [K::Output],
) -> Result<(), EngineError> {
    if domain.is_empty() {
        return Err(EngineError::Config(format!(
            "domain must be non-empty, got {}x{}",
            domain.rows, domain.cols
        )));
    }
    if grid.x == 0 || grid.y == 0 {
        return Err(EngineError::Config(format!(
            "block grid must be non-empty, got {}x{}",
            grid.x, grid.y
        )));
    }
    if grid.x > domain.cols || grid.y > domain.rows {
        return Err(EngineError::Config(format!(
            "block grid {}x{} exceeds domain {}x{}",
            grid.x, grid.y, domain.cols, domain.rows
        )));
    }
    if outer_workers == 0 || inner_workers == 0 {
        return Err(EngineError::Config(
            "outer and inner worker counts must be positive".into(),
        ));
    }
    if out.len() != domain.len() {
        return Err(EngineError::Config(format!(
            "output buffer holds {} cells, domain has {}",
            out.len(),
            domain.len()
        )));
    }
    inner_policy.validate()?;

    debug!(
        blocks_x = grid.x,
        blocks_y = grid.y,
        outer_workers,
        inner_workers,
        inner_policy = %inner_policy.name(),
        kernel = kernel.name(),
        "running nested pools"
    );

    let slots = OutputSlots::new(out);
    let outer = WorkSource::build(grid.blocks(), outer_workers, Policy::contiguous())?;
    let exec = |_outer_worker: usize, unit: WorkUnit| -> Result<(), EngineError> {
        for block in unit.lo..unit.hi {
            run_block(domain, grid, block, inner_workers, inner_policy, kernel, &slots)?;
        }
        Ok(())
    };
    drive_workers(outer_workers, &outer, &exec)
}

/// Run one block region to completion on its own inner pool.
fn run_block<K: CellKernel>(
    domain: Domain,
    grid: BlockGrid,
    block: usize,
    inner_workers: usize,
    inner_policy: Policy,
    kernel: &K,
    slots: &OutputSlots<'_, K::Output>,
) -> Result<(), EngineError> {
    let bx = block % grid.x;
    let by = block / grid.x;
    let row_lo = by * domain.rows / grid.y;
    let row_hi = (by + 1) * domain.rows / grid.y;
    let col_lo = bx * domain.cols / grid.x;
    let col_hi = (bx + 1) * domain.cols / grid.x;
    let block_rows = row_hi - row_lo;
    if block_rows == 0 || col_hi == col_lo {
        return Ok(());
    }

    // Inner units are the block's rows; each claimed row range walks the
    // block's full column span.
    let source = WorkSource::build(block_rows, inner_workers, inner_policy)?;
    let exec = |_inner_worker: usize, unit: WorkUnit| -> Result<(), EngineError> {
        for row in (row_lo + unit.lo)..(row_lo + unit.hi) {
            for col in col_lo..col_hi {
                let index = row * domain.cols + col;
                let cell = Cell {
                    index,
                    row,
                    col,
                    worker: block,
                };
                match kernel.eval(cell) {
                    Ok(value) => {
                        // SAFETY: blocks are disjoint rectangles and inner
                        // units partition this block's rows, so no other
                        // worker owns `index`.
                        unsafe { slots.write(index, value) };
                    }
                    Err(cause) => {
                        return Err(EngineError::Kernel {
                            worker: block,
                            index,
                            cause,
                        })
                    }
                }
            }
        }
        Ok(())
    };
    drive_workers(inner_workers, &source, &exec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::WorkerPool;

    struct BlockId;

    impl CellKernel for BlockId {
        type Output = usize;

        fn name(&self) -> &'static str {
            "block-id"
        }

        fn eval(&self, cell: Cell) -> anyhow::Result<usize> {
            Ok(cell.worker)
        }
    }

    struct Checker;

    impl CellKernel for Checker {
        type Output = u32;

        fn name(&self) -> &'static str {
            "checker"
        }

        fn eval(&self, cell: Cell) -> anyhow::Result<u32> {
            Ok(((cell.row ^ cell.col) & 1) as u32)
        }
    }

    #[test]
    fn quadrants_carry_their_block_id() {
        let domain = Domain::grid(100, 100);
        let grid = BlockGrid::new(2, 2);
        let mut out = vec![usize::MAX; domain.len()];
        run_nested(domain, grid, 2, 2, Policy::contiguous(), &BlockId, &mut out)
            .expect("nested run");

        for row in 0..domain.rows {
            for col in 0..domain.cols {
                let bx = usize::from(col >= 50);
                let by = usize::from(row >= 50);
                assert_eq!(out[row * domain.cols + col], by * 2 + bx);
            }
        }
    }

    #[test]
    fn nested_matches_flat_for_worker_independent_kernels() {
        let domain = Domain::grid(63, 41);
        let mut flat = vec![0u32; domain.len()];
        WorkerPool::new(4)
            .run(domain, Policy::contiguous(), &Checker, &mut flat)
            .expect("flat run");

        let mut nested = vec![0u32; domain.len()];
        run_nested(
            domain,
            BlockGrid::new(2, 2),
            2,
            2,
            Policy::Dynamic { chunk: Some(7) },
            &Checker,
            &mut nested,
        )
        .expect("nested run");

        assert_eq!(flat, nested);
    }

    #[test]
    fn oversized_block_grids_are_rejected() {
        let domain = Domain::grid(4, 4);
        let mut out = vec![0usize; domain.len()];
        let err = run_nested(
            domain,
            BlockGrid::new(8, 2),
            2,
            2,
            Policy::contiguous(),
            &BlockId,
            &mut out,
        )
        .expect_err("grid wider than domain");
        assert!(matches!(err, EngineError::Config(_)));
    }
}
