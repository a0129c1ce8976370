use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    config::Config,
    effects::{EffectDescriptor, FrameContext, PreparedEffect},
    error::{Result, VideoError},
    video::{
        check_ffmpeg_available, extract_frame_sequence, probe, Frame, VideoEncoder, VideoParams,
        Workspace,
    },
};

/// Summary of a completed render
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub path: String,
    pub duration: f64,
    pub frame_count: usize,
    pub file_size: u64,
}

/// The timed-effect compositing engine.
///
/// One engine instance carries the output configuration and an ordered
/// effect list; `render` runs the whole pipeline:
/// 1. Probe - read frame rate, resolution and audio presence from the input
/// 2. Prepare - load and validate every effect asset up front
/// 3. Extract - decode the input into an on-disk frame sequence
/// 4. Composite - apply active effects to each frame, in declaration order
/// 5. Encode - re-encode the processed sequence, re-attaching audio when
///    the effect list calls for it
pub struct Engine {
    config: Config,
    effects: Vec<EffectDescriptor>,
}

impl Engine {
    pub fn new(config: Config, effects: Vec<EffectDescriptor>) -> Self {
        Self { config, effects }
    }

    pub async fn render<P: AsRef<Path>>(&self, input: P, output: P) -> Result<RenderReport> {
        let input = input.as_ref();
        let output = output.as_ref();

        info!("🎬 Compositing {} -> {}", input.display(), output.display());
        info!("   Effects: {}", self.effects.len());

        if !check_ffmpeg_available() {
            return Err(VideoError::EncodingFailed {
                reason: "FFmpeg not found. Please install FFmpeg.".to_string(),
            }
            .into());
        }

        // Step 1: probe the input; output geometry and rate mirror it
        let metadata = probe(input)?;
        let params = VideoParams {
            fps: metadata.fps,
            resolution: (metadata.width, metadata.height),
            codec: self.config.output.codec.clone(),
            quality: self.config.output.quality,
        };

        // Step 2: prepare effects; asset and parameter faults abort here,
        // before any frame is read
        let prepared = self
            .effects
            .iter()
            .map(|descriptor| descriptor.prepare(&params))
            .collect::<Result<Vec<_>>>()?;
        let wants_audio = self.effects.iter().any(|e| e.wants_audio_remux());

        // Step 3: decode the source into a frame sequence
        let mut workspace = Workspace::create()?;
        let sequence =
            extract_frame_sequence(&input.to_path_buf(), &workspace.source_frames_dir()).await?;
        info!("   Source: {} frames @ {:.2} fps", sequence.len(), params.fps);

        // Step 4: the compositing loop. Strictly sequential: one frame in,
        // one frame out, same order, same count. Any fault aborts the run
        // rather than emitting a corrupt frame.
        let processed_dir = workspace.processed_frames_dir();
        let mut frame_paths = Vec::with_capacity(sequence.len());

        for index in 0..sequence.len() {
            let mut frame = sequence.load_frame(index)?;
            let ctx = FrameContext {
                index,
                timestamp: params.timestamp(index),
                fps: params.fps,
            };

            render_frame(&mut frame, &prepared, &ctx)?;

            let frame_path = processed_dir.join(format!("frame_{:06}.png", index));
            frame
                .save_png(&frame_path)
                .map_err(|e| VideoError::FrameProcessingFailed {
                    reason: format!("failed to save frame {}: {}", index, e),
                })?;
            frame_paths.push(frame_path);

            if index % 250 == 0 {
                debug!("Composited frame {}/{}", index, sequence.len());
            }
        }

        // Step 5: encode, re-attaching source audio when a zoom asked for it
        let encoder = VideoEncoder::new(params.clone());
        self.encode_output(
            &encoder,
            &workspace,
            &frame_paths,
            input,
            output,
            wants_audio && metadata.has_audio,
        )
        .await?;

        let file_size = std::fs::metadata(output)?.len();
        let report = RenderReport {
            path: output.display().to_string(),
            duration: sequence.len() as f64 / params.fps,
            frame_count: sequence.len(),
            file_size,
        };

        info!(
            "✅ Composited {} frames ({:.1}s, {:.1} MB)",
            report.frame_count,
            report.duration,
            report.file_size as f64 / 1024.0 / 1024.0
        );

        workspace.cleanup();
        Ok(report)
    }

    async fn encode_output(
        &self,
        encoder: &VideoEncoder,
        workspace: &Workspace,
        frame_paths: &[PathBuf],
        input: &Path,
        output: &Path,
        remux_audio: bool,
    ) -> Result<()> {
        let list_path = workspace.frame_list_path();

        if !remux_audio {
            return encoder
                .encode_frames(frame_paths, &list_path, output)
                .await;
        }

        let audio_path = workspace.audio_path();
        if !encoder.extract_audio(input, &audio_path).await? {
            // No usable audio after both strategies; publish video-only
            return encoder
                .encode_frames(frame_paths, &list_path, output)
                .await;
        }

        let video_only = workspace.video_only_path();
        encoder
            .encode_frames(frame_paths, &list_path, &video_only)
            .await?;
        encoder.mux_audio(&video_only, &audio_path, output).await
    }
}

/// Apply every effect whose window contains the frame's timestamp, in
/// declaration order. This is the whole per-frame contract; the engine and
/// the tests share it.
pub fn render_frame(
    frame: &mut Frame,
    effects: &[PreparedEffect],
    ctx: &FrameContext,
) -> Result<()> {
    for effect in effects {
        if effect.is_active(ctx.timestamp) {
            effect.apply(frame, ctx)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectKind, FILLED};

    const FPS: f64 = 5.0;

    fn params() -> VideoParams {
        VideoParams {
            fps: FPS,
            resolution: (64, 48),
            ..VideoParams::default()
        }
    }

    fn prepare_all(descriptors: &[EffectDescriptor]) -> Vec<PreparedEffect> {
        descriptors
            .iter()
            .map(|d| d.prepare(&params()).unwrap())
            .collect()
    }

    fn composite_sequence(
        frames: Vec<Frame>,
        effects: &[PreparedEffect],
    ) -> Vec<Frame> {
        frames
            .into_iter()
            .enumerate()
            .map(|(index, mut frame)| {
                let ctx = FrameContext {
                    index,
                    timestamp: index as f64 / FPS,
                    fps: FPS,
                };
                render_frame(&mut frame, effects, &ctx).unwrap();
                frame
            })
            .collect()
    }

    #[test]
    fn test_rectangle_window_over_synthetic_sequence() {
        // 10 frames at 5 fps; rectangle active [1.0, 2.0] covers frames 5-9
        let descriptor = EffectDescriptor {
            start: 1.0,
            end: Some(2.0),
            kind: EffectKind::Rectangle {
                top_left: (10, 10),
                bottom_right: (20, 20),
                color: [0, 255, 0],
                thickness: 1,
            },
        };
        let effects = prepare_all(&[descriptor]);

        let input: Vec<Frame> = (0..10).map(|_| Frame::new_filled(64, 48, [0, 0, 0])).collect();
        let output = composite_sequence(input.clone(), &effects);

        assert_eq!(output.len(), input.len());
        for i in 0..5 {
            assert_eq!(output[i], input[i], "frame {} must be untouched", i);
        }
        for i in 5..10 {
            assert_eq!(output[i].get_pixel(10, 10), [0, 255, 0], "frame {}", i);
            assert_eq!(output[i].get_pixel(15, 10), [0, 255, 0]);
            // Interior untouched by the stroke
            assert_eq!(output[i].get_pixel(15, 15), [0, 0, 0]);
        }
    }

    #[test]
    fn test_empty_effect_list_is_identity() {
        let input: Vec<Frame> = (0..6)
            .map(|i| Frame::new_filled(16, 16, [i as u8 * 40, 0, 0]))
            .collect();
        let output = composite_sequence(input.clone(), &[]);
        assert_eq!(output, input);
    }

    #[test]
    fn test_later_descriptors_paint_over_earlier() {
        let first = EffectDescriptor {
            start: 0.0,
            end: Some(10.0),
            kind: EffectKind::Rectangle {
                top_left: (0, 0),
                bottom_right: (10, 10),
                color: [255, 0, 0],
                thickness: FILLED,
            },
        };
        let second = EffectDescriptor {
            start: 0.0,
            end: Some(10.0),
            kind: EffectKind::Rectangle {
                top_left: (5, 5),
                bottom_right: (15, 15),
                color: [0, 0, 255],
                thickness: FILLED,
            },
        };
        let effects = prepare_all(&[first, second]);

        let mut frame = Frame::new_filled(32, 32, [0, 0, 0]);
        let ctx = FrameContext {
            index: 0,
            timestamp: 0.0,
            fps: FPS,
        };
        render_frame(&mut frame, &effects, &ctx).unwrap();

        // Overlap belongs to the later descriptor
        assert_eq!(frame.get_pixel(7, 7), [0, 0, 255]);
        // Non-overlapping part of the first survives
        assert_eq!(frame.get_pixel(2, 2), [255, 0, 0]);
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let descriptor = EffectDescriptor {
            start: 1.0,
            end: Some(2.0),
            kind: EffectKind::Line {
                from: (0, 0),
                to: (10, 0),
                color: [9, 9, 9],
                thickness: 1,
            },
        };
        let effects = prepare_all(&[descriptor]);

        // Frame 5 lands exactly on start (1.0), frame 10 exactly on end (2.0)
        for index in [5usize, 10] {
            let mut frame = Frame::new_filled(16, 16, [0, 0, 0]);
            let ctx = FrameContext {
                index,
                timestamp: index as f64 / FPS,
                fps: FPS,
            };
            render_frame(&mut frame, &effects, &ctx).unwrap();
            assert_eq!(frame.get_pixel(5, 0), [9, 9, 9], "frame {}", index);
        }
    }

    #[tokio::test]
    async fn test_render_missing_input_fails_fast() {
        let engine = Engine::new(Config::default(), Vec::new());
        let result = engine
            .render("/definitely/not/here.mp4", "/tmp/vidmark_out.mp4")
            .await;
        assert!(result.is_err());
    }
}
