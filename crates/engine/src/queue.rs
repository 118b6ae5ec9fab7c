//! Shared work queues for dynamic and guided scheduling.

use crate::plan::WorkUnit;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Monotonic cursor over `0..len`; each claim is one `fetch_add`.
///
/// Claims only serialize the cursor itself. Result visibility is published
/// by the pool's join barrier, so relaxed ordering is sufficient.
#[derive(Debug)]
pub struct ChunkQueue {
    cursor: AtomicUsize,
    len: usize,
    chunk: usize,
}

impl ChunkQueue {
    pub fn new(len: usize, chunk: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(0),
            len,
            chunk: chunk.max(1),
        }
    }

    /// Claim the next chunk, clamped to the domain end.
    pub fn claim(&self) -> Option<WorkUnit> {
        let lo = self.cursor.fetch_add(self.chunk, Ordering::Relaxed);
        if lo >= self.len {
            return None;
        }
        Some(WorkUnit::new(lo, (lo + self.chunk).min(self.len)))
    }
}

/// Cursor whose chunk shrinks geometrically with the remaining work.
///
/// The chunk clamps to at least `min_chunk`, so the queue drains in O(len)
/// claims for any `min_chunk >= 1`.
#[derive(Debug)]
pub struct GuidedQueue {
    cursor: AtomicUsize,
    len: usize,
    workers: usize,
    min_chunk: usize,
    factor: usize,
}

impl GuidedQueue {
    pub fn new(len: usize, workers: usize, min_chunk: usize, factor: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(0),
            len,
            workers: workers.max(1),
            min_chunk: min_chunk.max(1),
            factor: factor.max(1),
        }
    }

    fn chunk_for(&self, remaining: usize) -> usize {
        (remaining / (self.workers * self.factor))
            .max(self.min_chunk)
            .min(remaining)
    }

    pub fn claim(&self) -> Option<WorkUnit> {
        let mut lo = self.cursor.load(Ordering::Relaxed);
        loop {
            if lo >= self.len {
                return None;
            }
            let hi = lo + self.chunk_for(self.len - lo);
            match self
                .cursor
                .compare_exchange_weak(lo, hi, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return Some(WorkUnit::new(lo, hi)),
                Err(observed) => lo = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn assert_claims_cover(mut claims: Vec<WorkUnit>, len: usize) {
        claims.sort_by_key(|unit| unit.lo);
        let mut next = 0;
        for unit in &claims {
            assert_eq!(unit.lo, next, "claims must be disjoint and gap-free");
            assert!(unit.hi > unit.lo);
            next = unit.hi;
        }
        assert_eq!(next, len, "claims must reach the domain end");
    }

    fn drain_concurrently(claim: impl Fn() -> Option<WorkUnit> + Sync, threads: usize) -> Vec<WorkUnit> {
        let claim = &claim;
        thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(move || {
                        let mut mine = Vec::new();
                        while let Some(unit) = claim() {
                            mine.push(unit);
                        }
                        mine
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().expect("claimer thread"))
                .collect()
        })
    }

    #[test]
    fn dynamic_claims_are_disjoint_and_exact() {
        for chunk in [1, 7, 100] {
            let queue = ChunkQueue::new(10_000, chunk);
            let claims = drain_concurrently(|| queue.claim(), 8);
            assert_claims_cover(claims, 10_000);
        }
    }

    #[test]
    fn dynamic_final_chunk_clamps_to_domain_end() {
        let queue = ChunkQueue::new(10, 4);
        let mut last = None;
        while let Some(unit) = queue.claim() {
            last = Some(unit);
        }
        assert_eq!(last, Some(WorkUnit::new(8, 10)));
    }

    #[test]
    fn guided_claims_are_disjoint_and_exact() {
        let queue = GuidedQueue::new(100_000, 8, 1, 2);
        let claims = drain_concurrently(|| queue.claim(), 8);
        assert_claims_cover(claims, 100_000);
    }

    #[test]
    fn guided_chunks_shrink_to_the_floor() {
        let queue = GuidedQueue::new(10_000, 4, 16, 2);
        let mut previous = usize::MAX;
        let mut claims = 0;
        while let Some(unit) = queue.claim() {
            let len = unit.len();
            assert!(
                len <= previous || len >= 16,
                "chunks shrink until they reach the floor"
            );
            assert!(len >= 16 || unit.hi == 10_000, "only the tail may be short");
            previous = len;
            claims += 1;
        }
        assert!(claims <= 10_000, "termination is bounded by the domain size");
    }

    #[test]
    fn guided_terminates_with_minimum_chunk_of_one() {
        let queue = GuidedQueue::new(257, 16, 1, 2);
        let claims = drain_concurrently(|| queue.claim(), 16);
        assert!(claims.len() <= 257);
        assert_claims_cover(claims, 257);
    }
}
