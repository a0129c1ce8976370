//! Geometric primitives drawn by direct overwrite of covered samples.
//!
//! Stroke thickness is centered on the ideal outline; the negative sentinel
//! [`FILLED`] fills the interior instead.

use crate::video::types::Frame;

/// Thickness sentinel: fill the shape instead of stroking its outline
pub const FILLED: i32 = -1;

/// Axis-aligned rectangle between two corner points (any corner order)
pub fn draw_rectangle(
    frame: &mut Frame,
    a: (i64, i64),
    b: (i64, i64),
    color: [u8; 3],
    thickness: i32,
) {
    let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
    let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));

    if thickness < 0 {
        fill_region(frame, x0, x1, y0, y1, color);
        return;
    }

    let t = i64::from(thickness.max(1));
    let lo = (t - 1) / 2;
    let hi = t / 2;

    // Four edge bands; corners are covered twice, which is harmless with
    // overwrite semantics.
    fill_region(frame, x0 - lo, x1 + hi, y0 - lo, y0 + hi, color); // top
    fill_region(frame, x0 - lo, x1 + hi, y1 - lo, y1 + hi, color); // bottom
    fill_region(frame, x0 - lo, x0 + hi, y0 - lo, y1 + hi, color); // left
    fill_region(frame, x1 - lo, x1 + hi, y0 - lo, y1 + hi, color); // right
}

/// Circle around a center point
pub fn draw_circle(
    frame: &mut Frame,
    center: (i64, i64),
    radius: u32,
    color: [u8; 3],
    thickness: i32,
) {
    let (cx, cy) = center;
    let r = f64::from(radius);
    let reach = i64::from(radius) + i64::from(thickness.max(1));

    for y in (cy - reach)..=(cy + reach) {
        for x in (cx - reach)..=(cx + reach) {
            let dx = (x - cx) as f64;
            let dy = (y - cy) as f64;
            let dist = (dx * dx + dy * dy).sqrt();

            let covered = if thickness < 0 {
                dist <= r
            } else {
                (dist - r).abs() <= f64::from(thickness) / 2.0
            };

            if covered {
                set_pixel_clipped(frame, x, y, color);
            }
        }
    }
}

/// Straight segment between two points. Thickness below 1 draws a single-
/// pixel line; there is no fill notion for lines.
pub fn draw_line(frame: &mut Frame, from: (i64, i64), to: (i64, i64), color: [u8; 3], thickness: i32) {
    let t = i64::from(thickness.max(1));
    let lo = (t - 1) / 2;
    let hi = t / 2;

    // Bresenham walk, stamping a t-wide square at each step
    let (mut x, mut y) = from;
    let dx = (to.0 - from.0).abs();
    let dy = -(to.1 - from.1).abs();
    let sx = if from.0 < to.0 { 1 } else { -1 };
    let sy = if from.1 < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        fill_region(frame, x - lo, x + hi, y - lo, y + hi, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn fill_region(frame: &mut Frame, x_min: i64, x_max: i64, y_min: i64, y_max: i64, color: [u8; 3]) {
    let x_lo = x_min.max(0);
    let x_hi = x_max.min(i64::from(frame.width()) - 1);
    let y_lo = y_min.max(0);
    let y_hi = y_max.min(i64::from(frame.height()) - 1);

    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            frame.set_pixel(x as u32, y as u32, color);
        }
    }
}

fn set_pixel_clipped(frame: &mut Frame, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && x < i64::from(frame.width()) && y < i64::from(frame.height()) {
        frame.set_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 3] = [255, 0, 0];
    const BLACK: [u8; 3] = [0, 0, 0];

    #[test]
    fn test_stroked_rectangle_leaves_interior() {
        let mut frame = Frame::new_filled(20, 20, BLACK);
        draw_rectangle(&mut frame, (4, 4), (15, 15), RED, 1);

        assert_eq!(frame.get_pixel(4, 4), RED);
        assert_eq!(frame.get_pixel(15, 4), RED);
        assert_eq!(frame.get_pixel(4, 15), RED);
        assert_eq!(frame.get_pixel(10, 4), RED);
        // Interior untouched
        assert_eq!(frame.get_pixel(10, 10), BLACK);
    }

    #[test]
    fn test_filled_rectangle_covers_interior() {
        let mut frame = Frame::new_filled(20, 20, BLACK);
        draw_rectangle(&mut frame, (4, 4), (15, 15), RED, FILLED);

        assert_eq!(frame.get_pixel(10, 10), RED);
        assert_eq!(frame.get_pixel(4, 4), RED);
        assert_eq!(frame.get_pixel(3, 3), BLACK);
    }

    #[test]
    fn test_rectangle_corner_order_does_not_matter() {
        let mut a = Frame::new_filled(20, 20, BLACK);
        let mut b = Frame::new_filled(20, 20, BLACK);
        draw_rectangle(&mut a, (4, 4), (15, 15), RED, FILLED);
        draw_rectangle(&mut b, (15, 15), (4, 4), RED, FILLED);
        assert_eq!(a, b);
    }

    #[test]
    fn test_filled_circle() {
        let mut frame = Frame::new_filled(21, 21, BLACK);
        draw_circle(&mut frame, (10, 10), 5, RED, FILLED);

        assert_eq!(frame.get_pixel(10, 10), RED);
        assert_eq!(frame.get_pixel(10, 5), RED); // on the rim
        assert_eq!(frame.get_pixel(10, 3), BLACK); // outside
        assert_eq!(frame.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn test_stroked_circle_ring_only() {
        let mut frame = Frame::new_filled(21, 21, BLACK);
        draw_circle(&mut frame, (10, 10), 6, RED, 1);

        assert_eq!(frame.get_pixel(10, 4), RED); // top of ring
        assert_eq!(frame.get_pixel(10, 10), BLACK); // center untouched
    }

    #[test]
    fn test_line_endpoints_and_diagonal() {
        let mut frame = Frame::new_filled(20, 20, BLACK);
        draw_line(&mut frame, (0, 0), (19, 19), RED, 1);

        assert_eq!(frame.get_pixel(0, 0), RED);
        assert_eq!(frame.get_pixel(19, 19), RED);
        assert_eq!(frame.get_pixel(10, 10), RED);
        assert_eq!(frame.get_pixel(0, 19), BLACK);
    }

    #[test]
    fn test_shapes_clip_to_frame_bounds() {
        let mut frame = Frame::new_filled(10, 10, BLACK);
        // All partially or fully out of bounds; must not panic
        draw_rectangle(&mut frame, (-5, -5), (4, 4), RED, 2);
        draw_circle(&mut frame, (0, 0), 8, RED, 3);
        draw_line(&mut frame, (-3, 5), (15, 5), RED, 2);
        assert_eq!(frame.get_pixel(5, 5), RED);
    }
}
