use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tokio::task;
use tracing::{debug, info};

use crate::error::{Result, VideoError};
use crate::video::types::Frame;

/// Check that the external ffmpeg binary is invocable
pub fn check_ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// An extracted sequence of source frames on disk, one PNG per input frame,
/// in input order
#[derive(Debug)]
pub struct FrameSequence {
    dir: PathBuf,
    count: usize,
}

impl FrameSequence {
    /// Number of frames in the sequence
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Path of the frame at the given zero-based index.
    ///
    /// ffmpeg's image2 muxer numbers files from 1.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("in_{:06}.png", index + 1))
    }

    /// Load the frame at the given zero-based index
    pub fn load_frame(&self, index: usize) -> Result<Frame> {
        let path = self.frame_path(index);
        Frame::open(&path).map_err(|e| {
            VideoError::FrameProcessingFailed {
                reason: format!("failed to read source frame {}: {}", path.display(), e),
            }
            .into()
        })
    }
}

/// Decode every frame of the input into `dest_dir` as numbered PNGs.
///
/// `-vsync 0` keeps the exported count equal to the stream's own frame
/// count; the compositor re-times the output from the probed rate, so no
/// frame may be dropped or duplicated here.
pub async fn extract_frame_sequence<P: AsRef<Path>>(
    input: P,
    dest_dir: P,
) -> Result<FrameSequence> {
    let input = input.as_ref().to_path_buf();
    let dest_dir = dest_dir.as_ref().to_path_buf();

    if !input.exists() {
        return Err(VideoError::LoadFailed {
            path: input.display().to_string(),
        }
        .into());
    }

    std::fs::create_dir_all(&dest_dir)?;
    let pattern = dest_dir.join("in_%06d.png").display().to_string();

    info!("Extracting source frames from {}", input.display());

    let input_str = input.display().to_string();
    let output = task::spawn_blocking(move || {
        Command::new("ffmpeg")
            .args(["-y", "-i", input_str.as_str(), "-vsync", "0", pattern.as_str()])
            .output()
    })
    .await
    .map_err(|e| VideoError::LoadFailed {
        path: format!("ffmpeg task failed: {}", e),
    })?
    .map_err(|e| VideoError::LoadFailed {
        path: format!("{}: {}", input.display(), e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VideoError::LoadFailed {
            path: format!("{}: {}", input.display(), stderr),
        }
        .into());
    }

    let count = std::fs::read_dir(&dest_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with("in_") && name.ends_with(".png"))
                .unwrap_or(false)
        })
        .count();

    if count == 0 {
        return Err(VideoError::LoadFailed {
            path: format!("{}: no frames decoded", input.display()),
        }
        .into());
    }

    debug!("Extracted {} source frames to {}", count, dest_dir.display());

    Ok(FrameSequence {
        dir: dest_dir,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_paths_are_one_based() {
        let seq = FrameSequence {
            dir: PathBuf::from("/tmp/frames"),
            count: 3,
        };
        assert_eq!(seq.len(), 3);
        assert_eq!(
            seq.frame_path(0),
            PathBuf::from("/tmp/frames/in_000001.png")
        );
        assert_eq!(
            seq.frame_path(2),
            PathBuf::from("/tmp/frames/in_000003.png")
        );
    }

    #[test]
    fn test_load_frame_reports_missing_file() {
        let seq = FrameSequence {
            dir: PathBuf::from("/tmp/definitely-missing"),
            count: 1,
        };
        assert!(seq.load_frame(0).is_err());
    }
}
