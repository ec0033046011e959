//! Frame integration loop.
//!
//! One [`IntegrationLoop`] drives a single camera: for each integration
//! cycle it consumes one completed frame per quadrant pass from its
//! [`FrameSource`], applies the camera's [`Correction`], adds the result
//! into the [`SharedAccumulator`], and watches the board for backpressure
//! and adverse status. A sibling loop runs concurrently for the other
//! camera against the same accumulator.
//!
//! Adverse statuses (stop, abort, wait timeout, wait failure, empty queue)
//! end the session for this camera only: the loop transitions to a
//! terminal phase, skips every remaining pass, and returns a
//! [`SessionReport`] normally. Partial sums already in the accumulator are
//! preserved; zeroing is the reset owner's job, never the error path's.

use crate::acquisition::accumulator::SharedAccumulator;
use crate::acquisition::lut::{Correction, QUADRANTS};
use crate::hardware::{FrameSource, WaitOutcome};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Which sibling zeroes the shared accumulator at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorRole {
    /// This loop performs the zero-reset before the start barrier.
    Owner,
    /// This loop relies on the owner's reset and only ever adds.
    Sibling,
}

/// Why a session ended before its configured integration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Acquisition has been stopped.
    Stopped,
    /// Acquisition has been aborted.
    Aborted,
    /// The wait for a completed frame timed out.
    WaitTimeout,
    /// The wait for a completed frame failed.
    WaitFailed,
    /// The board's frame queue was empty.
    QueueEmpty,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            StopReason::Stopped => "acquisition has been stopped",
            StopReason::Aborted => "acquisition has been aborted",
            StopReason::WaitTimeout => "wait for a completed frame timed out",
            StopReason::WaitFailed => "wait for a completed frame failed",
            StopReason::QueueEmpty => "the frame queue was empty",
        };
        f.write_str(message)
    }
}

/// How a camera's session went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Integration cycles that ran all four quadrant passes.
    pub cycles_completed: u32,
    /// Frames corrected and added into the accumulator.
    pub frames_accumulated: u32,
    /// Total frames the board queued ahead of the loop over the session.
    pub backlog_total: u64,
    /// Why the session ended early, if it did.
    pub stop_reason: Option<StopReason>,
}

impl SessionReport {
    /// Whether every configured integration cycle ran.
    pub fn ran_to_completion(&self) -> bool {
        self.stop_reason.is_none()
    }
}

/// Loop phase: integrating, or terminal for the rest of the session.
enum LoopPhase {
    Integrating,
    Terminal(StopReason),
}

/// Mutable per-session state. Created at loop entry, consumed into the
/// report at loop exit.
struct IntegrationState {
    phase: LoopPhase,
    cycles_completed: u32,
    frames_accumulated: u32,
    backlog_total: u64,
}

impl IntegrationState {
    fn new() -> Self {
        Self {
            phase: LoopPhase::Integrating,
            cycles_completed: 0,
            frames_accumulated: 0,
            backlog_total: 0,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self.phase, LoopPhase::Terminal(_))
    }

    fn terminate(&mut self, reason: StopReason) {
        // First adverse status wins; a session ends exactly once.
        if !self.is_terminal() {
            self.phase = LoopPhase::Terminal(reason);
        }
    }

    fn into_report(self) -> SessionReport {
        let stop_reason = match self.phase {
            LoopPhase::Integrating => None,
            LoopPhase::Terminal(reason) => Some(reason),
        };
        SessionReport {
            cycles_completed: self.cycles_completed,
            frames_accumulated: self.frames_accumulated,
            backlog_total: self.backlog_total,
            stop_reason,
        }
    }
}

/// The acquisition-accumulation control loop for one camera.
pub struct IntegrationLoop<S: FrameSource> {
    camera: String,
    role: AccumulatorRole,
    source: Arc<S>,
    correction: Correction,
    accumulator: Arc<SharedAccumulator>,
    num_integrations: u32,
}

impl<S: FrameSource> IntegrationLoop<S> {
    /// Build a loop for one camera.
    pub fn new(
        camera: impl Into<String>,
        role: AccumulatorRole,
        source: Arc<S>,
        correction: Correction,
        accumulator: Arc<SharedAccumulator>,
        num_integrations: u32,
    ) -> Self {
        Self {
            camera: camera.into(),
            role,
            source,
            correction,
            accumulator,
            num_integrations,
        }
    }

    /// Run the full session: N integration cycles of four quadrant passes.
    ///
    /// Always returns normally. An adverse hardware status surfaces as
    /// `stop_reason` in the report, with whatever sums had accumulated by
    /// then left intact.
    pub async fn run_session(&self) -> SessionReport {
        if self.role == AccumulatorRole::Owner {
            self.accumulator.reset();
        }
        // No add may land before the owner's reset: every participant
        // holds here until all have arrived.
        self.accumulator.align_start().await;

        let mut state = IntegrationState::new();
        for cycle in 0..self.num_integrations {
            if state.is_terminal() {
                break;
            }
            self.run_cycle(cycle, &mut state).await;
        }
        state.into_report()
    }

    /// Run one integration cycle: four quadrant passes in fixed order.
    async fn run_cycle(&self, cycle: u32, state: &mut IntegrationState) {
        for quad in 0..QUADRANTS {
            if state.is_terminal() {
                return;
            }
            self.run_quadrant_pass(cycle, quad, state).await;
        }
        if !state.is_terminal() {
            state.cycles_completed += 1;
        }
    }

    /// Run one quadrant pass: wait for a frame, correct, accumulate,
    /// hand the buffer back.
    async fn run_quadrant_pass(&self, cycle: u32, quad: usize, state: &mut IntegrationState) {
        let outcome = self.source.wait_for_frame().await;
        let control = self.source.control_status().await;

        let queued = self.source.queued_frame_count().await;
        if queued != 0 {
            state.backlog_total += u64::from(queued);
            warn!(
                camera = %self.camera,
                frames = queued,
                "circular buffer fell behind"
            );
        }

        if control.is_cleanup() {
            // The board is reclaiming buffers: this pass contributes
            // nothing, and the frame must not be touched or handed back.
            debug!(camera = %self.camera, cycle, quad, "cleanup in progress, pass discarded");
            return;
        }

        match outcome {
            WaitOutcome::Ready(frame) => {
                let seq = frame.seq;
                // Correction must finish before the handback; releasing
                // first would race the board's writer on the buffer.
                self.accumulator.accumulate(&frame.samples, &self.correction);
                self.source.release_frame(frame).await;
                state.frames_accumulated += 1;

                if self.source.control_status().await.is_cleanup() {
                    debug!(camera = %self.camera, seq, "cleanup requested after correction");
                }
            }
            WaitOutcome::Stopped => self.enter_terminal(state, StopReason::Stopped, cycle, quad),
            WaitOutcome::Aborted => self.enter_terminal(state, StopReason::Aborted, cycle, quad),
            WaitOutcome::WaitTimeout => {
                self.enter_terminal(state, StopReason::WaitTimeout, cycle, quad);
            }
            WaitOutcome::WaitFailed => {
                self.enter_terminal(state, StopReason::WaitFailed, cycle, quad);
            }
            WaitOutcome::QueueEmpty => {
                self.enter_terminal(state, StopReason::QueueEmpty, cycle, quad);
            }
        }
    }

    fn enter_terminal(
        &self,
        state: &mut IntegrationState,
        reason: StopReason,
        cycle: u32,
        quad: usize,
    ) {
        // Partial sums stay in the accumulator: zeroing happens only at
        // session start, and only in the reset owner's loop.
        error!(camera = %self.camera, cycle, quad, "{reason}");
        state.terminate(reason);
    }
}
