use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    effects::{
        overlay::{self, AnimationAssets, OverlayAsset},
        shape, text,
        zoom::{self, ZoomEnvelope},
    },
    error::{EffectError, Result},
    video::types::{Frame, VideoParams},
};

/// Inclusive timestamp range `[start, end]` during which an effect applies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Both endpoints are inside the window
    pub fn contains(&self, timestamp: f64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    fn validate(&self) -> Result<()> {
        if self.start < 0.0 || self.end < self.start {
            return Err(EffectError::InvalidWindow {
                details: format!("[{}, {}]", self.start, self.end),
            }
            .into());
        }
        Ok(())
    }
}

/// The closed set of effect kinds the compositor understands.
///
/// Declaration order in an effect list is paint order: later descriptors
/// paint over earlier ones wherever they overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    /// Composite a transparent PNG at a fixed anchor
    OverlayImage {
        path: PathBuf,
        position: (i64, i64),
    },

    /// Composite a numbered directory of transparent PNGs, advancing through
    /// them across the active window
    OverlayAnimation {
        dir: PathBuf,
        position: (i64, i64),
    },

    /// Axis-aligned rectangle, stroked or filled
    Rectangle {
        top_left: (i64, i64),
        bottom_right: (i64, i64),
        color: [u8; 3],
        thickness: i32,
    },

    /// Circle, stroked or filled
    Circle {
        center: (i64, i64),
        radius: u32,
        color: [u8; 3],
        thickness: i32,
    },

    /// Straight line segment
    Line {
        from: (i64, i64),
        to: (i64, i64),
        color: [u8; 3],
        thickness: i32,
    },

    /// Caption rendered with the built-in bitmap font; `position` is the
    /// baseline origin of the first glyph
    Text {
        text: String,
        position: (i64, i64),
        color: [u8; 3],
        #[serde(default = "default_text_scale")]
        scale: f32,
    },

    /// Ease-in / hold / ease-out zoom toward a fractional target point
    Zoom {
        factor: f64,
        zoom_duration: f64,
        hold_duration: f64,
        target: (f64, f64),
    },
}

fn default_text_scale() -> f32 {
    1.0
}

/// One timed effect: a kind plus the window it is active in.
///
/// `end` may be omitted for zoom, whose window length is determined by its
/// phase durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(flatten)]
    pub kind: EffectKind,
}

impl EffectDescriptor {
    /// Resolve the active window, deriving zoom's end from its phases
    pub fn window(&self) -> Result<TimeWindow> {
        let window = match &self.kind {
            EffectKind::Zoom {
                zoom_duration,
                hold_duration,
                ..
            } => TimeWindow::new(
                self.start,
                self.start + 2.0 * zoom_duration + hold_duration,
            ),
            _ => {
                let end = self.end.ok_or_else(|| EffectError::InvalidWindow {
                    details: format!("effect at {} has no end time", self.start),
                })?;
                TimeWindow::new(self.start, end)
            }
        };
        window.validate()?;
        Ok(window)
    }

    /// Load and validate everything the effect needs before the frame loop
    /// starts. Asset problems (missing file, no alpha channel, empty
    /// animation directory) surface here, never per frame.
    pub fn prepare(&self, params: &VideoParams) -> Result<PreparedEffect> {
        let window = self.window()?;

        let op = match &self.kind {
            EffectKind::OverlayImage { path, position } => PreparedOp::Overlay {
                asset: OverlayAsset::load(path)?,
                position: *position,
            },
            EffectKind::OverlayAnimation { dir, position } => PreparedOp::Animation {
                assets: AnimationAssets::load_dir(dir)?,
                position: *position,
            },
            EffectKind::Rectangle {
                top_left,
                bottom_right,
                color,
                thickness,
            } => PreparedOp::Rectangle {
                top_left: *top_left,
                bottom_right: *bottom_right,
                color: *color,
                thickness: *thickness,
            },
            EffectKind::Circle {
                center,
                radius,
                color,
                thickness,
            } => PreparedOp::Circle {
                center: *center,
                radius: *radius,
                color: *color,
                thickness: *thickness,
            },
            EffectKind::Line {
                from,
                to,
                color,
                thickness,
            } => PreparedOp::Line {
                from: *from,
                to: *to,
                color: *color,
                thickness: *thickness,
            },
            EffectKind::Text {
                text,
                position,
                color,
                scale,
            } => {
                if *scale <= 0.0 {
                    return Err(EffectError::InvalidParameters {
                        details: format!("text scale must be positive, got {}", scale),
                    }
                    .into());
                }
                PreparedOp::Text {
                    text: text.clone(),
                    position: *position,
                    color: *color,
                    scale: *scale,
                }
            }
            EffectKind::Zoom {
                factor,
                zoom_duration,
                hold_duration,
                target,
            } => {
                if *factor < 1.0 {
                    return Err(EffectError::InvalidParameters {
                        details: format!("zoom factor must be >= 1.0, got {}", factor),
                    }
                    .into());
                }
                PreparedOp::Zoom {
                    envelope: ZoomEnvelope::new(
                        self.start,
                        *zoom_duration,
                        *hold_duration,
                        *factor,
                        params.fps,
                    ),
                    target: *target,
                }
            }
        };

        Ok(PreparedEffect { window, op })
    }

    /// True when the effect needs the source audio re-attached after the
    /// video-only re-encode
    pub fn wants_audio_remux(&self) -> bool {
        matches!(self.kind, EffectKind::Zoom { .. })
    }
}

/// Per-frame inputs to effect evaluation
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub index: usize,
    pub timestamp: f64,
    pub fps: f64,
}

/// An effect descriptor with its assets loaded and parameters validated,
/// ready for per-frame application
pub struct PreparedEffect {
    window: TimeWindow,
    op: PreparedOp,
}

enum PreparedOp {
    Overlay {
        asset: OverlayAsset,
        position: (i64, i64),
    },
    Animation {
        assets: AnimationAssets,
        position: (i64, i64),
    },
    Rectangle {
        top_left: (i64, i64),
        bottom_right: (i64, i64),
        color: [u8; 3],
        thickness: i32,
    },
    Circle {
        center: (i64, i64),
        radius: u32,
        color: [u8; 3],
        thickness: i32,
    },
    Line {
        from: (i64, i64),
        to: (i64, i64),
        color: [u8; 3],
        thickness: i32,
    },
    Text {
        text: String,
        position: (i64, i64),
        color: [u8; 3],
        scale: f32,
    },
    Zoom {
        envelope: ZoomEnvelope,
        target: (f64, f64),
    },
}

impl PreparedEffect {
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn is_active(&self, timestamp: f64) -> bool {
        self.window.contains(timestamp)
    }

    /// Apply the effect to the frame in place. Callers only invoke this for
    /// frames whose timestamp is inside the active window.
    pub fn apply(&self, frame: &mut Frame, ctx: &FrameContext) -> Result<()> {
        match &self.op {
            PreparedOp::Overlay { asset, position } => {
                overlay::blend_overlay(frame, asset, *position);
            }
            PreparedOp::Animation { assets, position } => {
                let asset = assets.frame_for(ctx.timestamp, self.window);
                overlay::blend_overlay(frame, asset, *position);
            }
            PreparedOp::Rectangle {
                top_left,
                bottom_right,
                color,
                thickness,
            } => {
                shape::draw_rectangle(frame, *top_left, *bottom_right, *color, *thickness);
            }
            PreparedOp::Circle {
                center,
                radius,
                color,
                thickness,
            } => {
                shape::draw_circle(frame, *center, *radius, *color, *thickness);
            }
            PreparedOp::Line {
                from,
                to,
                color,
                thickness,
            } => {
                shape::draw_line(frame, *from, *to, *color, *thickness);
            }
            PreparedOp::Text {
                text,
                position,
                color,
                scale,
            } => {
                text::draw_text(frame, text, *position, *color, *scale);
            }
            PreparedOp::Zoom { envelope, target } => {
                if let Some(factor) = envelope.factor_at(ctx.index) {
                    zoom::apply_zoom(frame, factor, *target);
                }
            }
        }
        Ok(())
    }
}
