//! Convenience facade over the gridsweep workspace crates.

pub use gridsweep_engine as engine;
pub use gridsweep_harness as harness;
pub use gridsweep_kernels as kernels;
