//! Timing harness for single configuration runs.

use gridsweep_engine::{run_nested, BlockGrid, CellKernel, Domain, EngineError, Policy, WorkerPool};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

/// Whether a run is flat or block-nested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nesting {
    Flat,
    Blocks {
        grid: BlockGrid,
        inner_workers: usize,
    },
}

/// One immutable benchmark configuration.
///
/// For nested runs `workers` is the outer worker count and `policy` governs
/// the inner partitioning; the outer level always splits the block list
/// statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub domain: Domain,
    pub workers: usize,
    pub policy: Policy,
    pub nesting: Nesting,
}

impl RunConfig {
    pub fn flat(domain: Domain, workers: usize, policy: Policy) -> Self {
        Self {
            domain,
            workers,
            policy,
            nesting: Nesting::Flat,
        }
    }

    pub fn nested(
        domain: Domain,
        grid: BlockGrid,
        outer_workers: usize,
        inner_workers: usize,
        policy: Policy,
    ) -> Self {
        Self {
            domain,
            workers: outer_workers,
            policy,
            nesting: Nesting::Blocks {
                grid,
                inner_workers,
            },
        }
    }

    /// Reject every bad-input case before any worker starts.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.domain.is_empty() {
            return Err(EngineError::Config(format!(
                "domain must be non-empty, got {}x{}",
                self.domain.rows, self.domain.cols
            )));
        }
        if self.workers == 0 {
            return Err(EngineError::Config("worker count must be positive".into()));
        }
        self.policy.validate()?;
        if let Nesting::Blocks {
            grid,
            inner_workers,
        } = self.nesting
        {
            if grid.x == 0 || grid.y == 0 {
                return Err(EngineError::Config(format!(
                    "block grid must be non-empty, got {}x{}",
                    grid.x, grid.y
                )));
            }
            if inner_workers == 0 {
                return Err(EngineError::Config(
                    "inner worker count must be positive".into(),
                ));
            }
            if grid.x > self.domain.cols || grid.y > self.domain.rows {
                return Err(EngineError::Config(format!(
                    "block grid {}x{} exceeds domain {}x{}",
                    grid.x, grid.y, self.domain.cols, self.domain.rows
                )));
            }
        }
        Ok(())
    }

    /// Human-readable configuration name used in reports.
    pub fn label(&self) -> String {
        match self.nesting {
            Nesting::Flat => format!("{} x{}", self.policy.name(), self.workers),
            Nesting::Blocks {
                grid,
                inner_workers,
            } => format!(
                "nested {}x{} ({} inner, {})",
                grid.x,
                grid.y,
                inner_workers,
                self.policy.name()
            ),
        }
    }
}

/// Elapsed wall-clock time for one configuration. Produced once, never
/// mutated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingResult {
    pub config: RunConfig,
    pub elapsed: Duration,
}

impl TimingResult {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Run one configuration to completion and record its wall-clock time.
///
/// The clock starts immediately before pool construction and stops when the
/// join barrier returns; output serialization and reporting are excluded
/// from the measured interval.
pub fn measure<K: CellKernel>(
    config: &RunConfig,
    kernel: &K,
    out: &mut [K::Output],
) -> Result<TimingResult, EngineError> {
    config.validate()?;
    if out.len() != config.domain.len() {
        return Err(EngineError::Config(format!(
            "output buffer holds {} cells, domain has {}",
            out.len(),
            config.domain.len()
        )));
    }

    let start = Instant::now();
    match config.nesting {
        Nesting::Flat => {
            WorkerPool::new(config.workers).run(config.domain, config.policy, kernel, out)?;
        }
        Nesting::Blocks {
            grid,
            inner_workers,
        } => {
            run_nested(
                config.domain,
                grid,
                config.workers,
                inner_workers,
                config.policy,
                kernel,
                out,
            )?;
        }
    }
    let elapsed = start.elapsed();

    info!(
        kernel = kernel.name(),
        config = %config.label(),
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "configuration measured"
    );
    Ok(TimingResult {
        config: *config,
        elapsed,
    })
}

/// Like [`measure`], but refills a reused buffer first so stale cells from
/// a previous configuration can never leak into this run's output.
pub fn measure_zeroed<K>(
    config: &RunConfig,
    kernel: &K,
    out: &mut [K::Output],
) -> Result<TimingResult, EngineError>
where
    K: CellKernel,
    K::Output: Clone + Default,
{
    out.fill(K::Output::default());
    measure(config, kernel, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsweep_engine::Cell;

    struct One;

    impl CellKernel for One {
        type Output = u8;

        fn name(&self) -> &'static str {
            "one"
        }

        fn eval(&self, _cell: Cell) -> anyhow::Result<u8> {
            Ok(1)
        }
    }

    #[test]
    fn measure_fills_the_whole_buffer() {
        let config = RunConfig::flat(Domain::grid(20, 30), 4, Policy::dynamic());
        let mut out = vec![0u8; 600];
        let result = measure(&config, &One, &mut out).expect("measured run");
        assert!(out.iter().all(|&v| v == 1));
        assert!(result.elapsed_ms() >= 0.0);
    }

    #[test]
    fn invalid_configs_fail_before_running() {
        let mut out = vec![0u8; 100];

        let zero_workers = RunConfig::flat(Domain::grid(10, 10), 0, Policy::contiguous());
        assert!(matches!(
            measure(&zero_workers, &One, &mut out),
            Err(EngineError::Config(_))
        ));

        let empty_domain = RunConfig::flat(Domain::grid(0, 10), 2, Policy::contiguous());
        assert!(matches!(
            measure(&empty_domain, &One, &mut []),
            Err(EngineError::Config(_))
        ));

        let bad_grid = RunConfig::nested(
            Domain::grid(10, 10),
            BlockGrid::new(20, 2),
            2,
            2,
            Policy::contiguous(),
        );
        assert!(matches!(
            measure(&bad_grid, &One, &mut out),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn measure_zeroed_clears_stale_cells() {
        let config = RunConfig::flat(Domain::linear(64), 2, Policy::contiguous());
        let mut out = vec![9u8; 64];
        measure_zeroed(&config, &One, &mut out).expect("measured run");
        assert!(out.iter().all(|&v| v == 1));
    }

    #[test]
    fn labels_read_like_schedule_names() {
        let flat = RunConfig::flat(Domain::linear(10), 8, Policy::Dynamic { chunk: Some(100) });
        assert_eq!(flat.label(), "dynamic,100 x8");

        let bare = RunConfig::flat(Domain::linear(10), 8, Policy::dynamic());
        assert_eq!(bare.label(), "dynamic x8");

        let nested = RunConfig::nested(
            Domain::grid(10, 10),
            BlockGrid::new(2, 2),
            2,
            2,
            Policy::contiguous(),
        );
        assert_eq!(nested.label(), "nested 2x2 (2 inner, static)");
    }
}
