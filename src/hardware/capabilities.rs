//! Frame-source capability trait.
//!
//! The integration loop is hardware-agnostic: anything that can deliver
//! completed frames from a circular buffer implements [`FrameSource`].
//! Real boards wrap their driver SDK behind this trait; tests use
//! [`MockFrameSource`](crate::hardware::mock::MockFrameSource).
//!
//! # Design
//!
//! Each method is async (`#[async_trait]`), thread-safe (`Send + Sync`),
//! and reports hardware conditions in-band. The wait carries no caller-side
//! timeout: cancellation is the board's responsibility, surfaced as
//! [`WaitOutcome::WaitTimeout`] or [`WaitOutcome::Aborted`].

use crate::hardware::{ControlStatus, Frame, WaitOutcome};
use async_trait::async_trait;

/// A source of completed frames backed by a hardware circular buffer.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Block until the board reports something: a completed frame, a stop,
    /// an abort, a wait timeout or failure, or an empty queue.
    ///
    /// The wait is unbounded from the caller's perspective; the board's own
    /// timeout and abort signaling are the only ways out.
    async fn wait_for_frame(&self) -> WaitOutcome;

    /// Poll the board's control state.
    ///
    /// The loop polls once after every wait and once more after a
    /// successful correction pass, matching the board's cleanup protocol.
    async fn control_status(&self) -> ControlStatus;

    /// Completed frames queued in the circular buffer and not yet consumed.
    ///
    /// A non-zero value means the consumer fell behind the acquisition
    /// rate. Diagnostic only; draining is still one frame per wait.
    async fn queued_frame_count(&self) -> u32;

    /// Hand a consumed frame's buffer back to the circular buffer.
    ///
    /// Must be called only after the correction pass over the frame has
    /// finished; taking ownership of the [`Frame`] enforces that no borrow
    /// of the sample data survives the handback.
    async fn release_frame(&self, frame: Frame);
}
