//! Parallel domain-partitioning execution engine.
//!
//! Splits a 1-D or 2-D cell domain among a fixed pool of worker threads
//! under a scheduling policy, drives a per-cell kernel to completion behind
//! a full join barrier, and guarantees no two workers ever write the same
//! output cell.

pub mod buffer;
pub mod domain;
pub mod error;
pub mod nested;
pub mod plan;
pub mod policy;
pub mod pool;
pub mod queue;

pub use buffer::*;
pub use domain::*;
pub use error::*;
pub use nested::*;
pub use plan::*;
pub use policy::*;
pub use pool::*;
pub use queue::*;
