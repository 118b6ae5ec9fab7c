//! Static partition plans and work-source construction.

use crate::error::EngineError;
use crate::policy::Policy;
use crate::queue::{ChunkQueue, GuidedQueue};
use serde::{Deserialize, Serialize};

/// A half-open range `[lo, hi)` of scheduling units — rows of a 2-D
/// domain, cells of a 1-D one — owned by exactly one worker while live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkUnit {
    pub lo: usize,
    pub hi: usize,
}

impl WorkUnit {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }
}

/// Precomputed assignment of work units to workers.
#[derive(Debug, Clone)]
pub struct PartitionPlan {
    assignments: Vec<Vec<WorkUnit>>,
}

impl PartitionPlan {
    /// One contiguous range per worker.
    ///
    /// Truncating division puts the range edges at `w * len / workers`, so
    /// the last range ends exactly at the domain end regardless of
    /// divisibility.
    pub fn contiguous(len: usize, workers: usize) -> Self {
        let assignments = (0..workers)
            .map(|worker| {
                let lo = worker * len / workers;
                let hi = (worker + 1) * len / workers;
                if lo < hi {
                    vec![WorkUnit::new(lo, hi)]
                } else {
                    Vec::new()
                }
            })
            .collect();
        Self { assignments }
    }

    /// Fixed-size chunks dealt round-robin across workers.
    pub fn chunked(len: usize, workers: usize, chunk: usize) -> Self {
        let mut assignments = vec![Vec::new(); workers];
        for (nth, lo) in (0..len).step_by(chunk.max(1)).enumerate() {
            let hi = (lo + chunk).min(len);
            assignments[nth % workers].push(WorkUnit::new(lo, hi));
        }
        Self { assignments }
    }

    /// Build from explicit per-worker assignments. `verify` is the caller's
    /// responsibility before execution.
    pub fn from_assignments(assignments: Vec<Vec<WorkUnit>>) -> Self {
        Self { assignments }
    }

    pub fn workers(&self) -> usize {
        self.assignments.len()
    }

    pub fn worker(&self, worker: usize) -> &[WorkUnit] {
        &self.assignments[worker]
    }

    /// Check full, disjoint coverage of `0..len`.
    pub fn verify(&self, len: usize) -> Result<(), EngineError> {
        let mut units: Vec<WorkUnit> = self.assignments.iter().flatten().copied().collect();
        units.sort_by_key(|unit| unit.lo);

        let mut next = 0;
        for unit in units {
            if unit.is_empty() {
                return Err(EngineError::PartitionInvariant(format!(
                    "empty unit [{}, {})",
                    unit.lo, unit.hi
                )));
            }
            if unit.lo < next {
                return Err(EngineError::PartitionInvariant(format!(
                    "unit starting at {} overlaps coverage up to {next}",
                    unit.lo
                )));
            }
            if unit.lo > next {
                return Err(EngineError::PartitionInvariant(format!(
                    "gap between {next} and {}",
                    unit.lo
                )));
            }
            next = unit.hi;
        }
        if next != len {
            return Err(EngineError::PartitionInvariant(format!(
                "coverage ends at {next}, domain has {len} cells"
            )));
        }
        Ok(())
    }
}

/// Work source for one pool invocation, built once from the policy.
#[derive(Debug)]
pub enum WorkSource {
    Plan(PartitionPlan),
    Queue(ChunkQueue),
    Guided(GuidedQueue),
}

impl WorkSource {
    /// Build the source for one pool invocation over `units` scheduling
    /// units (the domain's rows, or its cells when 1-D).
    pub fn build(units: usize, workers: usize, policy: Policy) -> Result<Self, EngineError> {
        policy.validate()?;
        let source = match policy {
            Policy::Static { chunk: None } | Policy::Auto => {
                WorkSource::Plan(PartitionPlan::contiguous(units, workers))
            }
            Policy::Static { chunk: Some(chunk) } => {
                WorkSource::Plan(PartitionPlan::chunked(units, workers, chunk))
            }
            Policy::Dynamic { chunk } => WorkSource::Queue(ChunkQueue::new(
                units,
                chunk.unwrap_or_else(|| default_dynamic_chunk(units, workers)),
            )),
            Policy::Guided { min_chunk, factor } => {
                WorkSource::Guided(GuidedQueue::new(units, workers, min_chunk, factor))
            }
        };
        if let WorkSource::Plan(plan) = &source {
            plan.verify(units)?;
        }
        Ok(source)
    }
}

/// Chunk size for `Dynamic { chunk: None }`: about eight claims per worker,
/// clamped to a single unit.
fn default_dynamic_chunk(units: usize, workers: usize) -> usize {
    (units / (workers.max(1) * 8)).max(1)
}
