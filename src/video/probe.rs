use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Result, VideoError};

/// Metadata of a video stream as reported by ffprobe
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub frame_count: i64,
    pub has_audio: bool,
}

/// Probe a video file with ffprobe.
///
/// Fatal if the file is missing or ffprobe cannot read it; the compositor
/// must not start on a stream whose geometry and rate are unknown.
pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoMetadata> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VideoError::LoadFailed {
            path: path.display().to_string(),
        }
        .into());
    }

    let path_str = path.display().to_string();
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
            path_str.as_str(),
        ])
        .output()
        .map_err(|e| VideoError::ProbeFailed {
            path: path.display().to_string(),
            reason: format!("ffprobe could not be invoked: {}", e),
        })?;

    if !output.status.success() {
        return Err(VideoError::ProbeFailed {
            path: path.display().to_string(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        }
        .into());
    }

    let json = String::from_utf8(output.stdout).map_err(|_| VideoError::ProbeFailed {
        path: path.display().to_string(),
        reason: "invalid ffprobe output".to_string(),
    })?;

    let width = extract_json_number(&json, "width").unwrap_or(1920.0) as u32;
    let height = extract_json_number(&json, "height").unwrap_or(1080.0) as u32;
    let duration = extract_json_number(&json, "duration").unwrap_or(0.0);
    let fps = extract_fps_from_json(&json).unwrap_or(30.0);
    let has_audio = probe_has_audio(path);

    debug!(
        "Probed {}: {}x{} @ {:.2}fps, {:.2}s, audio: {}",
        path.display(),
        width,
        height,
        fps,
        duration,
        has_audio
    );

    Ok(VideoMetadata {
        duration,
        fps,
        width,
        height,
        frame_count: (duration * fps).round() as i64,
        has_audio,
    })
}

/// Check whether the file carries at least one audio stream
pub fn probe_has_audio<P: AsRef<Path>>(path: P) -> bool {
    let path_str = path.as_ref().display().to_string();
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "a",
            path_str.as_str(),
        ])
        .output();

    match output {
        Ok(out) if out.status.success() => {
            String::from_utf8_lossy(&out.stdout).contains("\"codec_type\": \"audio\"")
        }
        _ => {
            warn!(
                "Audio probe failed for {}, assuming no audio",
                path.as_ref().display()
            );
            false
        }
    }
}

// ffprobe's JSON is shallow enough that a couple of string scans beat pulling
// in a parser for two numeric fields.
fn extract_json_number(json: &str, key: &str) -> Option<f64> {
    let pattern = format!("\"{}\":", key);
    let start = json.find(&pattern)? + pattern.len();
    let remaining = json[start..].trim_start().trim_start_matches('"');
    let end = remaining
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .unwrap_or(remaining.len());
    remaining[..end].trim_end_matches('"').parse().ok()
}

fn extract_fps_from_json(json: &str) -> Option<f64> {
    let start = json.find("\"avg_frame_rate\":")? + "\"avg_frame_rate\":".len();
    let remaining = json[start..].trim_start().trim_start_matches('"');
    let end = remaining.find('"')?;
    let fps_str = &remaining[..end];

    let slash_pos = fps_str.find('/')?;
    let num: f64 = fps_str[..slash_pos].parse().ok()?;
    let den: f64 = fps_str[slash_pos + 1..].parse().ok()?;
    if den != 0.0 {
        Some(num / den)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_number() {
        let json = r#"{"streams": [{"width": 1280, "height": 720, "duration": "12.5"}]}"#;
        assert_eq!(extract_json_number(json, "width"), Some(1280.0));
        assert_eq!(extract_json_number(json, "height"), Some(720.0));
        assert_eq!(extract_json_number(json, "duration"), Some(12.5));
        assert_eq!(extract_json_number(json, "missing"), None);
    }

    #[test]
    fn test_extract_fps() {
        let json = r#"{"streams": [{"avg_frame_rate": "30000/1001"}]}"#;
        let fps = extract_fps_from_json(json).unwrap();
        assert!((fps - 29.97).abs() < 0.01);

        let degenerate = r#"{"streams": [{"avg_frame_rate": "0/0"}]}"#;
        assert_eq!(extract_fps_from_json(degenerate), None);
    }

    #[test]
    fn test_probe_missing_file_is_fatal() {
        let result = probe("/definitely/not/here.mp4");
        assert!(result.is_err());
    }
}
