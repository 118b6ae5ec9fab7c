//! Configuration sweeps over worker counts and scheduling policies.

use crate::report::{SweepReport, SweepRow};
use crate::timing::{measure, measure_zeroed, RunConfig, TimingResult};
use gridsweep_engine::{CellKernel, Domain, EngineError, Policy};
use std::time::Duration;
use tracing::info;

/// A named configuration inside a sweep.
#[derive(Debug, Clone)]
pub struct SweepCase {
    pub name: String,
    pub config: RunConfig,
}

impl SweepCase {
    pub fn new(name: impl Into<String>, config: RunConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// Runs a fixed, caller-ordered list of configurations and collects one
/// timing result per case.
pub struct ConfigSweep {
    cases: Vec<SweepCase>,
    baseline: usize,
}

impl ConfigSweep {
    pub fn new(cases: Vec<SweepCase>) -> Self {
        Self { cases, baseline: 0 }
    }

    /// Designate the case speedups are computed against (default: first).
    pub fn with_baseline(mut self, baseline: usize) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn cases(&self) -> &[SweepCase] {
        &self.cases
    }

    /// Thread ladder at a fixed policy, 1 through 16 workers in the
    /// benchmark defaults.
    pub fn thread_ladder(domain: Domain, workers: &[usize], policy: Policy) -> Self {
        let cases = workers
            .iter()
            .map(|&count| {
                SweepCase::new(
                    format!("{count} thread(s)"),
                    RunConfig::flat(domain, count, policy),
                )
            })
            .collect();
        Self::new(cases)
    }

    /// The eight schedule variants compared at a fixed worker count.
    /// Chunk sizes count rows, matching schedules applied to a renderer's
    /// row loop; bare `dynamic` leaves the chunk to the engine default.
    pub fn schedule_suite(domain: Domain, workers: usize) -> Self {
        let schedules: [(&str, Policy); 8] = [
            ("static (default)", Policy::Static { chunk: None }),
            ("static,1", Policy::Static { chunk: Some(1) }),
            ("static,100", Policy::Static { chunk: Some(100) }),
            ("dynamic", Policy::Dynamic { chunk: None }),
            ("dynamic,1", Policy::Dynamic { chunk: Some(1) }),
            ("dynamic,100", Policy::Dynamic { chunk: Some(100) }),
            ("guided", Policy::guided()),
            ("auto", Policy::Auto),
        ];
        let cases = schedules
            .iter()
            .map(|&(name, policy)| SweepCase::new(name, RunConfig::flat(domain, workers, policy)))
            .collect();
        Self::new(cases)
    }

    /// Run every case against one shared buffer, refilled between runs.
    ///
    /// `kernel_for` builds the kernel for each configuration, so kernels
    /// that color by worker can see the case's worker count.
    pub fn run<K, F>(&self, kernel_for: F) -> Result<SweepReport, EngineError>
    where
        K: CellKernel,
        K::Output: Clone + Default,
        F: Fn(&RunConfig) -> K,
    {
        if self.cases.is_empty() {
            return Err(EngineError::Config("sweep has no cases".into()));
        }
        let longest = self
            .cases
            .iter()
            .map(|case| case.config.domain.len())
            .max()
            .unwrap_or(0);
        let mut buffer = vec![K::Output::default(); longest];

        let mut results = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            let kernel = kernel_for(&case.config);
            let out = &mut buffer[..case.config.domain.len()];
            let result = measure_zeroed(&case.config, &kernel, out)?;
            info!(case = %case.name, elapsed_ms = result.elapsed_ms(), "case complete");
            results.push(result);
        }
        Ok(self.report(results))
    }

    /// Run every case with a fresh buffer and return the outputs alongside
    /// the report, for callers that write one image per configuration.
    pub fn run_collect<K, F>(
        &self,
        kernel_for: F,
    ) -> Result<(SweepReport, Vec<Vec<K::Output>>), EngineError>
    where
        K: CellKernel,
        K::Output: Clone + Default,
        F: Fn(&RunConfig) -> K,
    {
        if self.cases.is_empty() {
            return Err(EngineError::Config("sweep has no cases".into()));
        }
        let mut results = Vec::with_capacity(self.cases.len());
        let mut outputs = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            let kernel = kernel_for(&case.config);
            let mut out = vec![K::Output::default(); case.config.domain.len()];
            let result = measure(&case.config, &kernel, &mut out)?;
            info!(case = %case.name, elapsed_ms = result.elapsed_ms(), "case complete");
            results.push(result);
            outputs.push(out);
        }
        Ok((self.report(results), outputs))
    }

    fn report(&self, results: Vec<TimingResult>) -> SweepReport {
        let baseline = self.baseline.min(results.len() - 1);
        let base_elapsed = results[baseline].elapsed;
        let rows = self
            .cases
            .iter()
            .zip(&results)
            .enumerate()
            .map(|(idx, (case, result))| SweepRow {
                case: case.name.clone(),
                label: result.config.label(),
                workers: result.config.workers,
                policy: result.config.policy.name(),
                elapsed_ms: result.elapsed_ms(),
                speedup: speedup(base_elapsed, result.elapsed),
                baseline: idx == baseline,
            })
            .collect();
        SweepReport::new(rows)
    }
}

/// Baseline elapsed over case elapsed; equal durations yield exactly 1.0.
fn speedup(baseline: Duration, elapsed: Duration) -> f64 {
    if elapsed == baseline {
        1.0
    } else {
        baseline.as_secs_f64() / elapsed.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsweep_engine::Cell;

    struct SumCoords;

    impl CellKernel for SumCoords {
        type Output = u32;

        fn name(&self) -> &'static str {
            "sum-coords"
        }

        fn eval(&self, cell: Cell) -> anyhow::Result<u32> {
            Ok((cell.row + cell.col) as u32)
        }
    }

    #[test]
    fn speedup_tie_is_exactly_one() {
        let tick = Duration::from_micros(125);
        assert_eq!(speedup(tick, tick), 1.0);
        assert!(speedup(Duration::from_millis(4), Duration::from_millis(2)) > 1.9);
    }

    #[test]
    fn ladder_preserves_caller_order_and_marks_baseline() {
        let sweep = ConfigSweep::thread_ladder(
            Domain::grid(16, 16),
            &[1, 2, 4],
            Policy::contiguous(),
        );
        let report = sweep.run(|_| SumCoords).expect("sweep run");

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].case, "1 thread(s)");
        assert!(report.rows[0].baseline);
        assert_eq!(report.rows[0].speedup, 1.0);
        assert!(report.rows.iter().all(|row| row.speedup > 0.0));
    }

    #[test]
    fn schedule_suite_lists_all_eight_variants() {
        let sweep = ConfigSweep::schedule_suite(Domain::grid(8, 8), 4);
        let names: Vec<&str> = sweep.cases().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "static (default)",
                "static,1",
                "static,100",
                "dynamic",
                "dynamic,1",
                "dynamic,100",
                "guided",
                "auto",
            ]
        );
    }

    #[test]
    fn collected_outputs_are_identical_across_policies() {
        let sweep = ConfigSweep::schedule_suite(Domain::grid(24, 17), 4);
        let (_, outputs) = sweep.run_collect(|_| SumCoords).expect("sweep run");
        for output in &outputs[1..] {
            assert_eq!(output, &outputs[0]);
        }
    }

    #[test]
    fn empty_sweeps_are_rejected() {
        let sweep = ConfigSweep::new(Vec::new());
        assert!(matches!(
            sweep.run(|_| SumCoords),
            Err(EngineError::Config(_))
        ));
    }
}
