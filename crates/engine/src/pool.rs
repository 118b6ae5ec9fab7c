//! Fixed-size worker pool with a full join barrier.

use crate::buffer::OutputSlots;
use crate::domain::{Cell, Domain};
use crate::error::EngineError;
use crate::plan::{WorkSource, WorkUnit};
use crate::policy::Policy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use tracing::debug;

/// Per-cell computation the pool drives in parallel.
///
/// Implementations must be callable from any worker thread for any cell in
/// an assigned range, with no shared mutable state beyond the partitioned
/// output buffer.
pub trait CellKernel: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    fn eval(&self, cell: Cell) -> anyhow::Result<Self::Output>;
}

/// A fixed set of worker threads created per invocation.
///
/// Each `run` cold-starts its own workers and joins all of them before
/// returning, so a measured interval includes thread startup the way the
/// benchmarks intend. There is no warm pool to reuse across configurations.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drive `kernel` over every cell of `domain`, writing one output per
    /// cell, and block until all workers have terminated.
    ///
    /// 2-D domains are scheduled row by row, so static strips and dynamic
    /// chunks always cover whole rows; 1-D domains are scheduled cell by
    /// cell.
    pub fn run<K: CellKernel>(
        &self,
        domain: Domain,
        policy: Policy,
        kernel: &K,
        out: &mut [K::Output],
    ) -> Result<(), EngineError> {
        if self.workers == 0 {
            return Err(EngineError::Config("worker count must be positive".into()));
        }
        if domain.is_empty() {
            return Err(EngineError::Config(format!(
                "domain must be non-empty, got {}x{}",
                domain.rows, domain.cols
            )));
        }
        if out.len() != domain.len() {
            return Err(EngineError::Config(format!(
                "output buffer holds {} cells, domain has {}",
                out.len(),
                domain.len()
            )));
        }

        let source = WorkSource::build(domain.units(), self.workers, policy)?;
        debug!(
            workers = self.workers,
            policy = %policy.name(),
            cells = domain.len(),
            kernel = kernel.name(),
            "running worker pool"
        );

        let slots = OutputSlots::new(out);
        let exec = |worker: usize, unit: WorkUnit| -> Result<(), EngineError> {
            let span = domain.unit_span(unit);
            // SAFETY: units come from a verified plan or a linearizable
            // queue claim, and disjoint unit ranges map to disjoint cell
            // spans.
            let slice = unsafe { slots.unit_slice(span) };
            for (slot, index) in slice.iter_mut().zip(span.lo..span.hi) {
                let (row, col) = domain.coords(index);
                let cell = Cell {
                    index,
                    row,
                    col,
                    worker,
                };
                match kernel.eval(cell) {
                    Ok(value) => *slot = value,
                    Err(cause) => {
                        return Err(EngineError::Kernel {
                            worker,
                            index,
                            cause,
                        })
                    }
                }
            }
            Ok(())
        };
        drive_workers(self.workers, &source, &exec)
    }
}

/// Spawn `workers` threads over `source`, run `exec` per claimed unit, and
/// join every thread before surfacing the first failure.
pub(crate) fn drive_workers<F>(
    workers: usize,
    source: &WorkSource,
    exec: &F,
) -> Result<(), EngineError>
where
    F: Fn(usize, WorkUnit) -> Result<(), EngineError> + Sync,
{
    let gate = StartGate::new();
    let poison = AtomicBool::new(false);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let gate = &gate;
            let poison = &poison;
            let spawned = thread::Builder::new()
                .name(format!("gridsweep-worker-{worker}"))
                .spawn_scoped(scope, move || -> Result<(), EngineError> {
                    if !gate.wait() {
                        return Ok(());
                    }
                    worker_loop(worker, source, exec, poison)
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    // Hold already-spawned workers back so no partial work
                    // runs; the scope still joins them on the way out.
                    gate.abort();
                    return Err(EngineError::Spawn(err));
                }
            }
        }
        gate.open();

        let mut first_failure = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
                Err(_) => {
                    if first_failure.is_none() {
                        first_failure = Some(EngineError::WorkerPanic { worker });
                    }
                }
            }
        }
        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    })
}

fn worker_loop<F>(
    worker: usize,
    source: &WorkSource,
    exec: &F,
    poison: &AtomicBool,
) -> Result<(), EngineError>
where
    F: Fn(usize, WorkUnit) -> Result<(), EngineError> + Sync,
{
    let step = |unit: WorkUnit| -> Result<(), EngineError> {
        exec(worker, unit).inspect_err(|_| poison.store(true, Ordering::Relaxed))
    };

    match source {
        WorkSource::Plan(plan) => {
            if worker < plan.workers() {
                for &unit in plan.worker(worker) {
                    if poison.load(Ordering::Relaxed) {
                        break;
                    }
                    step(unit)?;
                }
            }
        }
        WorkSource::Queue(queue) => {
            while !poison.load(Ordering::Relaxed) {
                match queue.claim() {
                    Some(unit) => step(unit)?,
                    None => break,
                }
            }
        }
        WorkSource::Guided(queue) => {
            while !poison.load(Ordering::Relaxed) {
                match queue.claim() {
                    Some(unit) => step(unit)?,
                    None => break,
                }
            }
        }
    }
    Ok(())
}

/// Holds workers until every spawn has succeeded, so a failed spawn never
/// leaves partial work behind.
struct StartGate {
    state: Mutex<Option<bool>>,
    ready: Condvar,
}

impl StartGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Block until the gate resolves; `true` means go.
    fn wait(&self) -> bool {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while state.is_none() {
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.unwrap_or(false)
    }

    fn open(&self) {
        self.resolve(true);
    }

    fn abort(&self) {
        self.resolve(false);
    }

    fn resolve(&self, go: bool) {
        *self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(go);
        self.ready.notify_all();
    }
}
