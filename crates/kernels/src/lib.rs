//! Demo workloads for the gridsweep engine.

pub mod color;
pub mod mandelbrot;
pub mod matmul;
pub mod ulam;

pub use color::*;
pub use mandelbrot::*;
pub use matmul::*;
pub use ulam::*;
