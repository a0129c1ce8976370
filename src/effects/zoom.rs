//! Ease-in / hold / ease-out zoom toward a fractional target point.
//!
//! Phase boundaries live in frame-index space, so the envelope is a pure
//! function of the frame counter; no state is carried between frames.

use image::imageops::{self, FilterType};

use crate::video::types::Frame;

/// The three-phase zoom envelope, resolved to frame indices at prepare time
#[derive(Debug, Clone, Copy)]
pub struct ZoomEnvelope {
    start_frame: i64,
    zoom_in_end: i64,
    hold_end: i64,
    zoom_out_end: i64,
    factor: f64,
}

impl ZoomEnvelope {
    pub fn new(
        start_time: f64,
        zoom_duration: f64,
        hold_duration: f64,
        factor: f64,
        fps: f64,
    ) -> Self {
        let start_frame = (start_time * fps) as i64;
        let zoom_frames = (zoom_duration * fps) as i64;
        let hold_frames = (hold_duration * fps) as i64;

        let zoom_in_end = start_frame + zoom_frames;
        let hold_end = zoom_in_end + hold_frames;
        let zoom_out_end = hold_end + zoom_frames;

        Self {
            start_frame,
            zoom_in_end,
            hold_end,
            zoom_out_end,
            factor,
        }
    }

    /// Instantaneous zoom factor for a frame, or None when the frame falls
    /// outside every phase and passes through unchanged
    pub fn factor_at(&self, frame_index: usize) -> Option<f64> {
        let i = frame_index as i64;

        if i < self.start_frame || i >= self.zoom_out_end {
            None
        } else if i < self.zoom_in_end {
            let span = (self.zoom_in_end - self.start_frame) as f64;
            let progress = (i - self.start_frame) as f64 / span;
            Some(1.0 + (self.factor - 1.0) * progress)
        } else if i < self.hold_end {
            Some(self.factor)
        } else {
            let span = (self.zoom_out_end - self.hold_end) as f64;
            let progress = (i - self.hold_end) as f64 / span;
            Some(self.factor - (self.factor - 1.0) * progress)
        }
    }
}

/// Crop a `(w/factor, h/factor)` window centered as closely as possible on
/// the fractional target, clamped by shifting (never shrinking), and resize
/// it back to full resolution with bilinear filtering.
pub fn apply_zoom(frame: &mut Frame, factor: f64, target: (f64, f64)) {
    if factor <= 1.0 + 1e-9 {
        return;
    }

    let width = frame.width();
    let height = frame.height();
    let (x, y, crop_w, crop_h) = crop_window(width, height, factor, target);

    let cropped = imageops::crop_imm(frame.as_image(), x, y, crop_w, crop_h).to_image();
    let resized = imageops::resize(&cropped, width, height, FilterType::Triangle);
    frame.replace(resized);
}

/// Compute the clamped crop window for a given factor and target point
pub(crate) fn crop_window(
    width: u32,
    height: u32,
    factor: f64,
    target: (f64, f64),
) -> (u32, u32, u32, u32) {
    let crop_w = ((f64::from(width) / factor) as u32).clamp(1, width);
    let crop_h = ((f64::from(height) / factor) as u32).clamp(1, height);

    let target_x = (target.0 * f64::from(width)) as i64;
    let target_y = (target.1 * f64::from(height)) as i64;

    let mut x = (target_x - i64::from(crop_w) / 2).max(0);
    let mut y = (target_y - i64::from(crop_h) / 2).max(0);

    // Shift the window back inside the frame rather than shrinking it
    if x + i64::from(crop_w) > i64::from(width) {
        x = i64::from(width) - i64::from(crop_w);
    }
    if y + i64::from(crop_h) > i64::from(height) {
        y = i64::from(height) - i64::from(crop_h);
    }

    (x as u32, y as u32, crop_w, crop_h)
}
