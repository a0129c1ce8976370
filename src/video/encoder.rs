use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tokio::task;
use tracing::{debug, info, warn};

use crate::error::{Result, VideoError};
use crate::video::types::VideoParams;

/// Per-run scratch directory for intermediate artifacts (decoded source
/// frames, processed frames, extracted audio). Removed on drop, whether the
/// run succeeded or not.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    cleaned: bool,
}

impl Workspace {
    pub fn create() -> Result<Self> {
        let root = PathBuf::from(format!("./temp_vidmark_{}", std::process::id()));
        create_dir_all(&root)?;
        create_dir_all(root.join("source"))?;
        create_dir_all(root.join("processed"))?;
        Ok(Self {
            root,
            cleaned: false,
        })
    }

    pub fn source_frames_dir(&self) -> PathBuf {
        self.root.join("source")
    }

    pub fn processed_frames_dir(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn audio_path(&self) -> PathBuf {
        self.root.join("audio.aac")
    }

    pub fn video_only_path(&self) -> PathBuf {
        self.root.join("video_only.mp4")
    }

    pub fn frame_list_path(&self) -> PathBuf {
        self.root.join("frame_list.txt")
    }

    /// Path for an arbitrary intermediate artifact inside the workspace
    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            warn!(
                "Failed to remove temporary directory {}: {}",
                self.root.display(),
                e
            );
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Encodes processed frame sequences back into a video file and re-attaches
/// source audio, all through external FFmpeg commands.
pub struct VideoEncoder {
    params: VideoParams,
}

impl VideoEncoder {
    pub fn new(params: VideoParams) -> Self {
        Self { params }
    }

    /// Encode an ordered list of frame image paths into a video-only file
    pub async fn encode_frames(
        &self,
        frame_paths: &[PathBuf],
        list_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        if frame_paths.is_empty() {
            return Err(VideoError::EncodingFailed {
                reason: "no frames to encode".to_string(),
            }
            .into());
        }

        self.create_frame_list(frame_paths, list_path)?;

        let args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.display().to_string(),
            "-c:v".to_string(),
            self.params.codec.clone(),
            "-r".to_string(),
            self.params.fps.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-crf".to_string(),
            quality_to_crf(self.params.quality).to_string(),
            output_path.display().to_string(),
        ];

        info!("Encoding {} frames at {:.2} fps", frame_paths.len(), self.params.fps);
        run_ffmpeg(args).await?;
        Ok(())
    }

    /// Extract the source audio track to `audio_path`.
    ///
    /// Tries a stream copy first, then an AAC re-encode. Returns false when
    /// neither produced a usable track, which the caller treats as "publish
    /// video-only" rather than a failure.
    pub async fn extract_audio(&self, input: &Path, audio_path: &Path) -> Result<bool> {
        let copy_args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "copy".to_string(),
            audio_path.display().to_string(),
        ];

        if run_ffmpeg(copy_args).await.is_ok() && audio_path.exists() {
            return Ok(true);
        }

        debug!("Audio stream copy failed, retrying with AAC re-encode");

        let reencode_args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-vn".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            audio_path.display().to_string(),
        ];

        match run_ffmpeg(reencode_args).await {
            Ok(()) => Ok(audio_path.exists()),
            Err(e) => {
                warn!("Audio extraction failed, output will be video-only: {}", e);
                Ok(false)
            }
        }
    }

    /// Re-multiplex the processed video stream with the extracted audio,
    /// trimmed to the shorter of the two
    pub async fn mux_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            video_path.display().to_string(),
            "-i".to_string(),
            audio_path.display().to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-shortest".to_string(),
            output_path.display().to_string(),
        ];

        run_ffmpeg(args).await
    }

    /// Write the concat demuxer list: one `file`/`duration` pair per frame,
    /// with the final frame repeated so its duration is honored
    fn create_frame_list(&self, frame_paths: &[PathBuf], list_path: &Path) -> Result<()> {
        let mut file = File::create(list_path)?;
        let frame_duration = 1.0 / self.params.fps;

        for frame_path in frame_paths {
            let absolute = frame_path
                .canonicalize()
                .unwrap_or_else(|_| frame_path.clone());
            writeln!(file, "file '{}'", absolute.display())?;
            writeln!(file, "duration {:.6}", frame_duration)?;
        }

        if let Some(last) = frame_paths.last() {
            let absolute = last.canonicalize().unwrap_or_else(|_| last.clone());
            writeln!(file, "file '{}'", absolute.display())?;
        }

        Ok(())
    }
}

/// Map the 0-100 quality knob onto ffmpeg's inverted 0-51 CRF scale
pub fn quality_to_crf(quality: u8) -> u8 {
    (51 - ((quality.min(100) as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
}

async fn run_ffmpeg(args: Vec<String>) -> Result<()> {
    let output = task::spawn_blocking(move || Command::new("ffmpeg").args(&args).output())
        .await
        .map_err(|e| VideoError::EncodingFailed {
            reason: format!("failed to spawn FFmpeg task: {}", e),
        })?
        .map_err(|e| VideoError::EncodingFailed {
            reason: format!("FFmpeg execution failed: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VideoError::EncodingFailed {
            reason: format!("FFmpeg failed: {}", stderr),
        }
        .into());
    }

    Ok(())
}
