//! Ulam-spiral primality workload.

use crate::color::{worker_color, Rgb};
use anyhow::Result;
use gridsweep_engine::{Cell, CellKernel};

/// Value of the square spiral at pixel (x, y) of a `size`-wide grid
/// centered on 1.
pub fn spiral_value(x: usize, y: usize, size: usize) -> u64 {
    let cx = x as i64 - (size / 2) as i64;
    let cy = y as i64 - (size / 2) as i64;
    let ring = cx.abs().max(cy.abs());
    if ring == 0 {
        return 1;
    }

    let mut value = (2 * ring - 1) * (2 * ring - 1);
    if cx == ring {
        value += ring + cy;
    } else if cy == ring {
        value += 3 * ring - cx;
    } else if cx == -ring {
        value += 5 * ring - cy;
    } else {
        value += 7 * ring + cx;
    }
    value as u64
}

/// Deterministic 6k±1 trial division.
pub fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Paints primes in the worker color and composites dark gray.
pub struct UlamKernel {
    size: usize,
    workers: usize,
}

impl UlamKernel {
    pub fn new(size: usize, workers: usize) -> Self {
        Self { size, workers }
    }
}

impl CellKernel for UlamKernel {
    type Output = Rgb;

    fn name(&self) -> &'static str {
        "ulam-spiral"
    }

    fn eval(&self, cell: Cell) -> Result<Rgb> {
        if is_prime(spiral_value(cell.col, cell.row, self.size)) {
            Ok(worker_color(cell.worker, self.workers))
        } else {
            Ok([50, 50, 50])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ring_walks_the_renderer_order() {
        // 5x5 grid centered at (2, 2); rows grow downward.
        assert_eq!(spiral_value(2, 2, 5), 1);
        assert_eq!(spiral_value(3, 2, 5), 2);
        assert_eq!(spiral_value(3, 3, 5), 3);
        assert_eq!(spiral_value(2, 3, 5), 4);
        assert_eq!(spiral_value(1, 3, 5), 5);
        assert_eq!(spiral_value(1, 2, 5), 6);
        assert_eq!(spiral_value(1, 1, 5), 7);
        assert_eq!(spiral_value(2, 1, 5), 8);
    }

    #[test]
    fn second_ring_edge_midpoints() {
        assert_eq!(spiral_value(4, 2, 5), 11);
        assert_eq!(spiral_value(2, 4, 5), 15);
        assert_eq!(spiral_value(0, 2, 5), 19);
        assert_eq!(spiral_value(2, 0, 5), 23);
    }

    #[test]
    fn small_primes_are_detected() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(is_prime(7919));
        assert!(!is_prime(7917));
    }
}
