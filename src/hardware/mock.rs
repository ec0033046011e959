//! Mock frame source.
//!
//! Provides a scripted, in-memory [`FrameSource`] for testing the
//! integration loop without frame-grabber hardware. Wait outcomes, control
//! states and backlog readings are queues loaded before the session runs;
//! once a queue drains the source falls back to a quiet default
//! (`QueueEmpty` waits, `Running` control, zero backlog), so a script
//! describes exactly the session it wants and nothing more.
//!
//! Released frames are recorded in handback order, which lets tests assert
//! that every consumed frame went back to the circular buffer exactly once.

use crate::hardware::{ControlStatus, Frame, FrameSource, WaitOutcome};
use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::debug;

/// Scripted in-memory frame source.
pub struct MockFrameSource {
    label: String,
    outcomes: Mutex<VecDeque<WaitOutcome>>,
    control: Mutex<VecDeque<ControlStatus>>,
    queued: Mutex<VecDeque<u32>>,
    released: Mutex<Vec<u64>>,
}

impl MockFrameSource {
    /// Create an empty source. Every wait reports `QueueEmpty` until
    /// outcomes are scripted.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            outcomes: Mutex::new(VecDeque::new()),
            control: Mutex::new(VecDeque::new()),
            queued: Mutex::new(VecDeque::new()),
            released: Mutex::new(Vec::new()),
        }
    }

    /// Create a source pre-loaded with `count` ready frames, where frame
    /// `seq` gets the samples produced by `samples_for(seq)`.
    pub fn with_ready_frames(
        label: impl Into<String>,
        count: u64,
        samples_for: impl Fn(u64) -> Vec<u16>,
    ) -> Self {
        let outcomes = (0..count)
            .map(|seq| WaitOutcome::Ready(Frame::new(seq, samples_for(seq))))
            .collect();
        Self {
            outcomes: Mutex::new(outcomes),
            ..Self::new(label)
        }
    }

    /// Create a source pre-loaded with `count` frames of seeded random
    /// samples, for hardware-free demo sessions.
    pub fn with_noise_frames(label: impl Into<String>, count: u64, len: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcomes = (0..count)
            .map(|seq| {
                let samples: Vec<u16> = (0..len).map(|_| rng.gen()).collect();
                WaitOutcome::Ready(Frame::new(seq, samples))
            })
            .collect();
        Self {
            outcomes: Mutex::new(outcomes),
            ..Self::new(label)
        }
    }

    /// Append one scripted wait outcome.
    pub async fn push_outcome(&self, outcome: WaitOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Append one ready frame.
    pub async fn push_frame(&self, frame: Frame) {
        self.push_outcome(WaitOutcome::Ready(frame)).await;
    }

    /// Script the control states returned by successive polls. Once the
    /// script drains, polls report `Running`.
    pub async fn script_control(&self, states: impl IntoIterator<Item = ControlStatus>) {
        self.control.lock().await.extend(states);
    }

    /// Script the backlog readings returned by successive queue-size
    /// queries. Once the script drains, queries report 0.
    pub async fn script_queued(&self, counts: impl IntoIterator<Item = u32>) {
        self.queued.lock().await.extend(counts);
    }

    /// Sequence numbers of released frames, in handback order.
    pub async fn released(&self) -> Vec<u64> {
        self.released.lock().await.clone()
    }

    /// Number of frames handed back so far.
    pub async fn release_count(&self) -> usize {
        self.released.lock().await.len()
    }

    /// Scripted wait outcomes not yet consumed.
    pub async fn remaining_outcomes(&self) -> usize {
        self.outcomes.lock().await.len()
    }
}

#[async_trait]
impl FrameSource for MockFrameSource {
    async fn wait_for_frame(&self) -> WaitOutcome {
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(WaitOutcome::QueueEmpty)
    }

    async fn control_status(&self) -> ControlStatus {
        self.control
            .lock()
            .await
            .pop_front()
            .unwrap_or(ControlStatus::Running)
    }

    async fn queued_frame_count(&self) -> u32 {
        self.queued.lock().await.pop_front().unwrap_or(0)
    }

    async fn release_frame(&self, frame: Frame) {
        debug!(source = %self.label, seq = frame.seq, "frame handed back");
        self.released.lock().await.push(frame.seq);
    }
}
