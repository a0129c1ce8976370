use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Represents a single video frame
///
/// This is a simple wrapper around an RGB image buffer that provides
/// convenient methods for pixel manipulation used by effects.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Load a frame from an image file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let image = image::open(path)?;
        Ok(Self {
            buffer: image.to_rgb8(),
        })
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let pixel = self.buffer.get_pixel(x, y);
        [pixel[0], pixel[1], pixel[2]]
    }

    /// Get a mutable reference to a pixel at the given coordinates
    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let pixel = self.buffer.get_pixel_mut(x, y);
        &mut pixel.0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Get a mutable reference to the underlying image buffer
    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    /// Replace the underlying image buffer
    pub fn replace(&mut self, buffer: RgbImage) {
        self.buffer = buffer;
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

/// Video processing parameters
///
/// Frame rate and resolution always come from probing the input (the output
/// stream must match the input stream exactly); codec and quality govern the
/// re-encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoParams {
    /// Frame rate of the stream
    pub fps: f64,

    /// Resolution (width, height)
    pub resolution: (u32, u32),

    /// Video codec to use for output
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            fps: 30.0,
            resolution: (1920, 1080),
            codec: "libx264".to_string(),
            quality: 85,
        }
    }
}

impl VideoParams {
    /// Timestamp of the frame at the given index
    pub fn timestamp(&self, frame_index: usize) -> f64 {
        frame_index as f64 / self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_frame_pixels() {
        let frame = Frame::new_filled(4, 3, [10, 20, 30]);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.get_pixel(3, 2), [10, 20, 30]);
    }

    #[test]
    fn test_pixel_roundtrip() {
        let mut frame = Frame::new_filled(2, 2, [0, 0, 0]);
        frame.set_pixel(1, 0, [255, 128, 1]);
        assert_eq!(frame.get_pixel(1, 0), [255, 128, 1]);

        let px = frame.get_pixel_mut(0, 1);
        px[2] = 99;
        assert_eq!(frame.get_pixel(0, 1), [0, 0, 99]);
    }

    #[test]
    fn test_timestamp_from_index() {
        let params = VideoParams {
            fps: 5.0,
            ..VideoParams::default()
        };
        assert_eq!(params.timestamp(0), 0.0);
        assert_eq!(params.timestamp(5), 1.0);
        assert_eq!(params.timestamp(7), 1.4);
    }
}
