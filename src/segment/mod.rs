//! # External Segment Operations
//!
//! Slice, cut-and-rejoin, and insert: thin orchestration over the external
//! ffmpeg binary. Each operation tries an ordered chain of invocation
//! strategies (stream copy first, re-encode last), treating individual
//! failures as non-fatal: the first success wins, and only total exhaustion
//! is surfaced, as a status carrying every attempt's diagnostics.

pub mod ops;
pub mod strategy;

// Re-exports for convenience
pub use ops::{cut, insert, parse_timecode, slice};
pub use strategy::{SegmentOutcome, Strategy};
