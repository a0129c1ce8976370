//! # Video I/O Module
//!
//! Frame buffers, ffprobe-backed metadata probing, source frame extraction,
//! and re-encoding of processed frame sequences. All container and codec
//! work is delegated to the external ffmpeg/ffprobe binaries.

pub mod encoder;
pub mod loader;
pub mod probe;
pub mod types;

pub use encoder::{VideoEncoder, Workspace};
pub use loader::{check_ffmpeg_available, extract_frame_sequence, FrameSequence};
pub use probe::{probe, probe_has_audio, VideoMetadata};
pub use types::{Frame, VideoParams};
