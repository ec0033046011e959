//! Hardware abstractions for the frame-grabber boards.
//!
//! Defines the data types crossing the board boundary ([`Frame`],
//! [`WaitOutcome`], [`ControlStatus`]) and the [`FrameSource`] capability
//! trait the integration loop consumes. [`mock`] provides a scripted
//! in-memory implementation for tests and hardware-free runs.

pub mod capabilities;
pub mod mock;

pub use capabilities::FrameSource;
pub use mock::MockFrameSource;

/// A single completed frame handed out by a board's circular buffer.
///
/// Samples are fixed-width unsigned pixel values, interleaved in quadrant
/// order: sample `i` belongs to quadrant stream `i mod 4`. The integration
/// loop owns a frame for exactly one correction pass and then moves it back
/// to the board with [`FrameSource::release_frame`]; holding the frame any
/// longer would stall the circular buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Hardware sequence number of this frame.
    pub seq: u64,
    /// Raw pixel samples, quadrant-interleaved.
    pub samples: Vec<u16>,
}

impl Frame {
    /// Create a frame from raw samples.
    pub fn new(seq: u64, samples: Vec<u16>) -> Self {
        Self { seq, samples }
    }

    /// Create a frame with every sample set to `value`.
    pub fn filled(seq: u64, len: usize, value: u16) -> Self {
        Self {
            seq,
            samples: vec![value; len],
        }
    }

    /// Number of samples in this frame.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the frame carries no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// What the board reported when asked for the next completed frame.
///
/// Adverse conditions are in-band values rather than errors: the board
/// reports them through the same wait call that delivers frames, and the
/// integration loop reacts to each without ever propagating a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A frame completed and is ready for correction.
    Ready(Frame),
    /// Acquisition has been stopped.
    Stopped,
    /// Acquisition has been aborted.
    Aborted,
    /// The wait for a completed frame timed out.
    WaitTimeout,
    /// The wait call itself failed.
    WaitFailed,
    /// The board's frame queue was empty.
    QueueEmpty,
}

/// Board control state, polled after each wait and again after a
/// successful correction pass.
///
/// A single enum rather than independent start/stop/abort/pause/cleanup
/// booleans, so contradictory flag combinations cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStatus {
    /// Acquisition armed and delivering frames.
    Running,
    /// Acquisition paused; frames may still drain from the queue.
    Paused,
    /// A stop has been requested.
    Stopping,
    /// An abort has been requested.
    Aborting,
    /// The board is reclaiming buffers. In-flight frames must not be
    /// consumed or handed back while this state holds.
    Cleanup,
}

impl ControlStatus {
    /// Whether the board is reclaiming buffers.
    pub fn is_cleanup(self) -> bool {
        matches!(self, ControlStatus::Cleanup)
    }
}
