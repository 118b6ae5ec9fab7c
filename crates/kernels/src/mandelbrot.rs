//! Boolean escape-time Mandelbrot workload.

use crate::color::{worker_color, Rgb};
use anyhow::Result;
use gridsweep_engine::{Cell, CellKernel, Domain};

/// Region of the parameter plane mapped onto the pixel grid.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub cx_min: f64,
    pub cx_max: f64,
    pub cy_min: f64,
    pub cy_max: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            cx_min: -2.5,
            cx_max: 1.5,
            cy_min: -2.0,
            cy_max: 2.0,
        }
    }
}

/// Renders the set interior black and the exterior in the worker's color,
/// so the finished image doubles as a picture of the partitioning.
pub struct MandelbrotKernel {
    viewport: Viewport,
    iteration_max: u32,
    escape_radius_sq: f64,
    pixel_width: f64,
    pixel_height: f64,
    workers: usize,
}

impl MandelbrotKernel {
    pub fn new(domain: Domain, workers: usize) -> Self {
        Self::with_viewport(domain, workers, Viewport::default(), 200)
    }

    pub fn with_viewport(
        domain: Domain,
        workers: usize,
        viewport: Viewport,
        iteration_max: u32,
    ) -> Self {
        let pixel_width = (viewport.cx_max - viewport.cx_min) / domain.cols.max(1) as f64;
        let pixel_height = (viewport.cy_max - viewport.cy_min) / domain.rows.max(1) as f64;
        Self {
            viewport,
            iteration_max,
            escape_radius_sq: 4.0,
            pixel_width,
            pixel_height,
            workers,
        }
    }

    /// Escape iteration count for one parameter-plane point.
    pub fn escape_time(&self, cx: f64, cy: f64) -> u32 {
        let (mut zx, mut zy) = (0.0f64, 0.0f64);
        let (mut zx2, mut zy2) = (0.0f64, 0.0f64);
        let mut iteration = 0;
        while iteration < self.iteration_max && zx2 + zy2 < self.escape_radius_sq {
            zy = 2.0 * zx * zy + cy;
            zx = zx2 - zy2 + cx;
            zx2 = zx * zx;
            zy2 = zy * zy;
            iteration += 1;
        }
        iteration
    }
}

impl CellKernel for MandelbrotKernel {
    type Output = Rgb;

    fn name(&self) -> &'static str {
        "mandelbrot"
    }

    fn eval(&self, cell: Cell) -> Result<Rgb> {
        let mut cy = self.viewport.cy_min + cell.row as f64 * self.pixel_height;
        if cy.abs() < self.pixel_height / 2.0 {
            // main antenna
            cy = 0.0;
        }
        let cx = self.viewport.cx_min + cell.col as f64 * self.pixel_width;

        if self.escape_time(cx, cy) == self.iteration_max {
            Ok([0, 0, 0])
        } else {
            Ok(worker_color(cell.worker, self.workers))
        }
    }
}
