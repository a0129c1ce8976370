//! # vidmark
//!
//! Frame-accurate timed overlays, captions and zoom effects for video, plus
//! ffmpeg-backed segment editing (slice, cut, insert).
//!
//! The heart of the library is the timed frame compositor: it reads a video
//! as a frame sequence, applies every effect whose active window contains
//! the current timestamp, and re-encodes the result at the input's own
//! resolution and frame rate. Container and codec work is delegated to the
//! external `ffmpeg`/`ffprobe` binaries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vidmark::{
//!     compositor::Engine,
//!     config::Config,
//!     effects::{EffectDescriptor, EffectKind},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let caption = EffectDescriptor {
//!     start: 1.0,
//!     end: Some(3.0),
//!     kind: EffectKind::Text {
//!         text: "Welcome!".to_string(),
//!         position: (380, 480),
//!         color: [255, 0, 0],
//!         scale: 1.5,
//!     },
//! };
//!
//! let engine = Engine::new(Config::default(), vec![caption]);
//! engine.render("input.mp4", "output.mp4").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`compositor`] - the timed-effect compositing engine
//! - [`effects`] - the closed set of effect kinds and their transforms
//! - [`video`] - frame buffers, probing, extraction, encoding
//! - [`segment`] - slice/cut/insert fallback chains over external ffmpeg
//! - [`config`] - configuration and effect project files

pub mod compositor;
pub mod config;
pub mod effects;
pub mod error;
pub mod segment;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    compositor::Engine,
    config::{Config, EffectProject},
    effects::{EffectDescriptor, EffectKind, TimeWindow},
    error::{CompositorError, Result},
    segment::SegmentOutcome,
};
