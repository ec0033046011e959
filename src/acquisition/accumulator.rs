//! Shared pixel-sum accumulator.
//!
//! One buffer of wide sums is shared by both cameras' integration loops.
//! Correctness without per-pixel locking rests on a strict protocol:
//!
//! - exactly one loop (the designated owner) zeroes the buffer, once per
//!   session, before the first cycle;
//! - both loops only ever *add* into positions during a pass, never store;
//! - the start barrier orders the owner's reset before any sibling add.
//!
//! Adds are relaxed atomic increments: addition commutes, and the barrier
//! (session start) and task join (session end) provide the happens-before
//! edges the reset and the final read need.

use crate::acquisition::lut::{Correction, QUADRANTS};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Barrier;

/// Pixel-indexed running sums shared by the sibling integration loops.
pub struct SharedAccumulator {
    sums: Box<[AtomicU64]>,
    start: Barrier,
}

impl SharedAccumulator {
    /// Create an accumulator for frames of `sample_count` samples, shared
    /// by `participants` integration loops (1 or 2).
    pub fn new(sample_count: usize, participants: usize) -> Self {
        let sums = (0..sample_count).map(|_| AtomicU64::new(0)).collect();
        Self {
            sums,
            start: Barrier::new(participants),
        }
    }

    /// Number of pixel positions.
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// Whether the accumulator holds no positions.
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Zero every position. Owner loop only, before the start barrier.
    pub fn reset(&self) {
        for sum in self.sums.iter() {
            sum.store(0, Ordering::Relaxed);
        }
    }

    /// Rendezvous of all participating loops at session start. Returns
    /// only once every loop has arrived, which orders the owner's
    /// [`reset`](Self::reset) before any add from a sibling.
    pub async fn align_start(&self) {
        self.start.wait().await;
    }

    /// Add one frame's corrected samples into the running sums.
    ///
    /// Samples are consumed in stream order, four at a time (one per
    /// quadrant), the sample cursor and the sum cursor advancing in
    /// lockstep. A trailing group of fewer than four samples is not a
    /// frame the hardware can produce and is ignored.
    pub fn accumulate(&self, samples: &[u16], correction: &Correction) {
        for (group, sums) in samples
            .chunks_exact(QUADRANTS)
            .zip(self.sums.chunks_exact(QUADRANTS))
        {
            for (quad, (&raw, sum)) in group.iter().zip(sums).enumerate() {
                sum.fetch_add(u64::from(correction.apply(quad, raw)), Ordering::Relaxed);
            }
        }
    }

    /// Copy of the current sums. Valid for consumption only after every
    /// participating loop's session has completed.
    pub fn snapshot(&self) -> Vec<u64> {
        self.sums.iter().map(|s| s.load(Ordering::Relaxed)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::lut::QuadrantLut;
    use std::sync::Arc;

    #[test]
    fn accumulates_raw_samples_in_passthrough() {
        let acc = SharedAccumulator::new(8, 1);
        acc.accumulate(&[1, 2, 3, 4, 5, 6, 7, 8], &Correction::Passthrough);
        acc.accumulate(&[10, 20, 30, 40, 50, 60, 70, 80], &Correction::Passthrough);

        assert_eq!(acc.snapshot(), vec![11, 22, 33, 44, 55, 66, 77, 88]);
    }

    #[test]
    fn accumulates_corrected_samples_per_quadrant() {
        let offset_table =
            |offset: u16| -> Vec<u16> { (0..=u16::MAX).map(|v| v.wrapping_add(offset)).collect() };
        let lut = QuadrantLut::from_tables([
            offset_table(1),
            offset_table(2),
            offset_table(3),
            offset_table(4),
        ])
        .unwrap();

        let acc = SharedAccumulator::new(4, 1);
        acc.accumulate(&[100, 100, 100, 100], &Correction::Lut(lut));

        assert_eq!(acc.snapshot(), vec![101, 102, 103, 104]);
    }

    #[test]
    fn reset_zeroes_every_position() {
        let acc = SharedAccumulator::new(4, 1);
        acc.accumulate(&[9, 9, 9, 9], &Correction::Passthrough);
        acc.reset();
        assert_eq!(acc.snapshot(), vec![0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn concurrent_adds_from_two_tasks_never_lose_counts() {
        let acc = Arc::new(SharedAccumulator::new(4, 1));
        let samples = [1u16, 1, 1, 1];

        let mut handles = Vec::new();
        for _ in 0..2 {
            let acc = Arc::clone(&acc);
            handles.push(tokio::spawn(async move {
                for _ in 0..1000 {
                    acc.accumulate(&samples, &Correction::Passthrough);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(acc.snapshot(), vec![2000, 2000, 2000, 2000]);
    }

    #[tokio::test]
    async fn start_barrier_releases_all_participants() {
        let acc = Arc::new(SharedAccumulator::new(4, 2));
        let first = Arc::clone(&acc);
        let second = Arc::clone(&acc);

        tokio::join!(
            async move { first.align_start().await },
            async move { second.align_start().await },
        );
    }
}
