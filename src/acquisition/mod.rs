//! Acquisition-accumulation core.
//!
//! The control loop ([`integration`]), the shared sum buffer
//! ([`accumulator`]) and the per-quadrant correction tables ([`lut`]).

pub mod accumulator;
pub mod integration;
pub mod lut;

pub use accumulator::SharedAccumulator;
pub use integration::{AccumulatorRole, IntegrationLoop, SessionReport, StopReason};
pub use lut::{Correction, QuadrantLut, LUT_SIZE, QUADRANTS};
