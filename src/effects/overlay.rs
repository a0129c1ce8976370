//! Transparent PNG overlays, static and animated.
//!
//! Assets are loaded and validated once before the frame loop; blending is
//! the standard src-over formula applied per color channel with the asset's
//! alpha normalized to `[0, 1]`.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    effects::descriptor::TimeWindow,
    error::{EffectError, Result},
    video::types::Frame,
};

/// An immutable RGBA overlay asset
pub struct OverlayAsset {
    rgba: RgbaImage,
}

impl OverlayAsset {
    /// Load an asset, rejecting anything without an alpha channel
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|_| EffectError::AssetLoadFailed {
            path: path.display().to_string(),
        })?;

        if !image.color().has_alpha() {
            return Err(EffectError::AssetMissingAlpha {
                path: path.display().to_string(),
            }
            .into());
        }

        Ok(Self {
            rgba: image.to_rgba8(),
        })
    }

    /// Wrap an in-memory RGBA buffer
    pub fn from_image(rgba: RgbaImage) -> Self {
        Self { rgba }
    }

    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}

/// Composite `asset` onto `frame` anchored at `position` (top-left corner).
///
/// The destination region is the asset's native size clamped to the frame
/// size; the anchor is clamped by reducing its coordinates so the region
/// stays fully on-frame. When region and asset sizes differ, the asset is
/// bilinear-resized to the region, never the other way around.
pub fn blend_overlay(frame: &mut Frame, asset: &OverlayAsset, position: (i64, i64)) {
    let frame_w = frame.width();
    let frame_h = frame.height();
    if frame_w == 0 || frame_h == 0 {
        return;
    }

    let dest_w = asset.width().min(frame_w);
    let dest_h = asset.height().min(frame_h);
    if dest_w == 0 || dest_h == 0 {
        return;
    }

    let x = position.0.clamp(0, i64::from(frame_w - dest_w)) as u32;
    let y = position.1.clamp(0, i64::from(frame_h - dest_h)) as u32;

    let resized;
    let src: &RgbaImage = if asset.width() == dest_w && asset.height() == dest_h {
        &asset.rgba
    } else {
        resized = imageops::resize(&asset.rgba, dest_w, dest_h, FilterType::Triangle);
        &resized
    };

    for dy in 0..dest_h {
        for dx in 0..dest_w {
            let src_px = src.get_pixel(dx, dy);
            let alpha = f32::from(src_px[3]) / 255.0;
            if alpha == 0.0 {
                continue;
            }

            let dst = frame.get_pixel_mut(x + dx, y + dy);
            for c in 0..3 {
                let blended = alpha * f32::from(src_px[c]) + (1.0 - alpha) * f32::from(dst[c]);
                dst[c] = blended.round() as u8;
            }
        }
    }
}

/// An ordered run of overlay frames loaded from a numbered directory
pub struct AnimationAssets {
    frames: Vec<OverlayAsset>,
}

impl AnimationAssets {
    /// Load every PNG in `dir`, ordered by the numeric suffix embedded in
    /// each file stem (`frame_2.png` sorts before `frame_10.png`).
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let mut numbered: Vec<(u64, std::path::PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|_| EffectError::NoAnimationFrames {
            path: dir.display().to_string(),
        })? {
            let entry = entry?;
            let path = entry.path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false);
            if !path.is_file() || !is_png {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            let number =
                numeric_suffix(stem).ok_or_else(|| EffectError::UnnumberedAnimationFrame {
                    name: path.display().to_string(),
                })?;
            numbered.push((number, path));
        }

        if numbered.is_empty() {
            return Err(EffectError::NoAnimationFrames {
                path: dir.display().to_string(),
            }
            .into());
        }

        numbered.sort_by_key(|(number, _)| *number);

        // Decoding happens up front, in parallel; the frame loop itself only
        // ever indexes into the finished list.
        let frames = numbered
            .par_iter()
            .map(|(_, path)| OverlayAsset::load(path))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Loaded {} animation frames from {}",
            frames.len(),
            dir.display()
        );

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Map elapsed time inside the window to a frame index:
    /// `floor(progress * n)`, clamped to the final frame at the window end.
    pub fn index_for(&self, timestamp: f64, window: TimeWindow) -> usize {
        let n = self.frames.len();
        if n == 0 {
            return 0;
        }
        let duration = window.duration();
        if duration <= 0.0 {
            return 0;
        }

        let progress = (timestamp - window.start) / duration;
        let index = (progress * n as f64).floor() as i64;
        index.clamp(0, n as i64 - 1) as usize
    }

    pub fn frame_for(&self, timestamp: f64, window: TimeWindow) -> &OverlayAsset {
        &self.frames[self.index_for(timestamp, window)]
    }
}

fn numeric_suffix(stem: &str) -> Option<u64> {
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn solid_asset(width: u32, height: u32, rgba: [u8; 4]) -> OverlayAsset {
        OverlayAsset::from_image(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    #[test]
    fn test_numeric_suffix_parsing() {
        assert_eq!(numeric_suffix("frame_0003"), Some(3));
        assert_eq!(numeric_suffix("frame_42"), Some(42));
        assert_eq!(numeric_suffix("clip7frame12"), Some(12));
        assert_eq!(numeric_suffix("no_digits"), None);
    }

    #[test]
    fn test_opaque_overlay_replaces_destination() {
        let mut frame = Frame::new_filled(10, 10, [0, 0, 0]);
        let asset = solid_asset(4, 4, [200, 100, 50, 255]);
        blend_overlay(&mut frame, &asset, (2, 2));

        assert_eq!(frame.get_pixel(2, 2), [200, 100, 50]);
        assert_eq!(frame.get_pixel(5, 5), [200, 100, 50]);
        assert_eq!(frame.get_pixel(6, 6), [0, 0, 0]);
        assert_eq!(frame.get_pixel(1, 1), [0, 0, 0]);
    }

    #[test]
    fn test_transparent_overlay_is_a_no_op() {
        let original = Frame::new_filled(10, 10, [9, 9, 9]);
        let mut frame = original.clone();
        let asset = solid_asset(4, 4, [200, 100, 50, 0]);
        blend_overlay(&mut frame, &asset, (2, 2));
        assert_eq!(frame, original);
    }

    #[test]
    fn test_half_alpha_blends_toward_source() {
        let mut frame = Frame::new_filled(4, 4, [0, 0, 0]);
        let asset = solid_asset(4, 4, [200, 0, 0, 128]);
        blend_overlay(&mut frame, &asset, (0, 0));

        // alpha 128/255 of 200 rounds to 100
        assert_eq!(frame.get_pixel(0, 0), [100, 0, 0]);
    }

    #[test]
    fn test_anchor_is_clamped_into_frame() {
        let mut frame = Frame::new_filled(10, 10, [0, 0, 0]);
        let asset = solid_asset(4, 4, [255, 255, 255, 255]);
        // Anchor would push the asset off the bottom-right corner
        blend_overlay(&mut frame, &asset, (9, 9));

        // Region shifted back so the full asset fits: x,y clamped to 6
        assert_eq!(frame.get_pixel(6, 6), [255, 255, 255]);
        assert_eq!(frame.get_pixel(9, 9), [255, 255, 255]);
        assert_eq!(frame.get_pixel(5, 5), [0, 0, 0]);
    }

    #[test]
    fn test_oversized_asset_is_resized_to_frame() {
        let mut frame = Frame::new_filled(8, 8, [0, 0, 0]);
        let asset = solid_asset(32, 32, [10, 20, 30, 255]);
        blend_overlay(&mut frame, &asset, (100, 100));

        // Whole frame becomes the downscaled asset
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(frame.get_pixel(x, y), [10, 20, 30]);
            }
        }
    }

    #[test]
    fn test_animation_sorts_by_numeric_suffix() {
        let dir = tempdir().unwrap();
        let red = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let blue = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        // Lexical order would put frame_10 before frame_2
        red.save(dir.path().join("frame_2.png")).unwrap();
        blue.save(dir.path().join("frame_10.png")).unwrap();

        let assets = AnimationAssets::load_dir(dir.path()).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets.frames[0].rgba.get_pixel(0, 0)[0], 255);
        assert_eq!(assets.frames[1].rgba.get_pixel(0, 0)[2], 255);
    }

    #[test]
    fn test_animation_rejects_rgb_assets() {
        let dir = tempdir().unwrap();
        let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
        rgb.save(dir.path().join("frame_1.png")).unwrap();

        // PNG without transparency must be rejected before processing
        assert!(AnimationAssets::load_dir(dir.path()).is_err());
    }

    #[test]
    fn test_empty_directory_is_rejected() {
        let dir = tempdir().unwrap();
        assert!(AnimationAssets::load_dir(dir.path()).is_err());
    }

    #[test]
    fn test_index_selection_monotonic_and_clamped() {
        let frames = (0..5)
            .map(|_| solid_asset(1, 1, [0, 0, 0, 255]))
            .collect::<Vec<_>>();
        let assets = AnimationAssets { frames };
        let window = TimeWindow::new(2.0, 6.0);

        let mut last = 0;
        let mut t = 2.0;
        while t <= 6.0 {
            let index = assets.index_for(t, window);
            assert!(index >= last, "index went backwards at t={}", t);
            assert!(index < 5);
            last = index;
            t += 0.1;
        }

        assert_eq!(assets.index_for(2.0, window), 0);
        // floor(progress * n) hits n exactly at the window end; clamped
        assert_eq!(assets.index_for(6.0, window), 4);
    }
}
