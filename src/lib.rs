//! # dualcam-daq
//!
//! Real-time frame-acquisition-and-integration engine for a dual-camera
//! imaging rig. Two integration loops, one per camera, drain completed
//! frames from their boards' circular buffers, apply per-quadrant
//! lookup-table correction, and add the corrected samples into one shared
//! running-sum buffer across a configured number of integration cycles.
//! Adverse hardware statuses (stop, abort, timeout, wait failure, empty
//! queue) end a camera's session gracefully, preserving the partial sums.
//!
//! ## Crate Structure
//!
//! - **`acquisition`**: The core control loop (`IntegrationLoop`), the
//!   shared accumulator, and the quadrant correction tables.
//! - **`config`**: Strongly-typed session configuration loaded from TOML
//!   and environment variables. See `config::Settings`.
//! - **`diagnostics`**: Two-sink `tracing` setup: operational console plus
//!   a persistent log file.
//! - **`error`**: The crate error type, `DaqError`, for session bring-up
//!   failures.
//! - **`hardware`**: The `FrameSource` capability trait, the data types
//!   crossing the board boundary, and a scripted mock source.

pub mod acquisition;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hardware;
