//! Engine error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad caller-supplied configuration, detected before any worker starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A constructed plan failed full or disjoint coverage. Always an
    /// engine bug, never a caller error.
    #[error("partition invariant violated: {0}")]
    PartitionInvariant(String),

    /// First kernel failure observed; surfaced after every worker joined.
    #[error("kernel failed at index {index} on worker {worker}: {cause}")]
    Kernel {
        worker: usize,
        index: usize,
        cause: anyhow::Error,
    },

    /// A worker panicked; surfaced after the join barrier.
    #[error("worker {worker} panicked")]
    WorkerPanic { worker: usize },

    /// The OS refused to create a worker thread. No work was started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(std::io::Error),
}
