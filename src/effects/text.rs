//! Caption rendering with a built-in 5x7 bitmap font.
//!
//! Glyph cells are replicated into square pixel blocks sized from the font
//! scale, anchored at a baseline origin. Overwrite semantics: no blending,
//! no wrapping, no layout feedback.

use crate::video::types::Frame;

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: i64 = 7;
/// One empty column of spacing between glyphs
const GLYPH_ADVANCE: i64 = 6;
/// Cell size in pixels at scale 1.0; a glyph then stands 21 px tall
const BASE_CELL: f32 = 3.0;

/// Draw `text` with its first glyph's baseline at `position`.
///
/// Characters outside the printable ASCII range render as spaces.
pub fn draw_text(frame: &mut Frame, text: &str, position: (i64, i64), color: [u8; 3], scale: f32) {
    let cell = ((scale * BASE_CELL).round() as i64).max(1);
    let (origin_x, baseline_y) = position;
    let top_y = baseline_y - GLYPH_HEIGHT * cell;

    for (char_index, ch) in text.chars().enumerate() {
        let glyph = glyph_columns(ch);
        let glyph_x = origin_x + char_index as i64 * GLYPH_ADVANCE * cell;

        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits & (1 << row) == 0 {
                    continue;
                }
                let x0 = glyph_x + col as i64 * cell;
                let y0 = top_y + row * cell;
                fill_cell(frame, x0, y0, cell, color);
            }
        }
    }
}

fn fill_cell(frame: &mut Frame, x0: i64, y0: i64, cell: i64, color: [u8; 3]) {
    let x_lo = x0.max(0);
    let y_lo = y0.max(0);
    let x_hi = (x0 + cell - 1).min(i64::from(frame.width()) - 1);
    let y_hi = (y0 + cell - 1).min(i64::from(frame.height()) - 1);

    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            frame.set_pixel(x as u32, y as u32, color);
        }
    }
}

fn glyph_columns(ch: char) -> [u8; GLYPH_WIDTH] {
    let code = ch as usize;
    if (0x20..=0x7E).contains(&code) {
        FONT_5X7[code - 0x20]
    } else {
        FONT_5X7[0] // space
    }
}

// Classic 5x7 column font (bit 0 = top row), printable ASCII 0x20..0x7E.
#[rustfmt::skip]
const FONT_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x14, 0x08, 0x3E, 0x08, 0x14], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x08, 0x04, 0x08, 0x10, 0x08], // '~'
];

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];
    const BLACK: [u8; 3] = [0, 0, 0];

    fn count_colored(frame: &Frame, color: [u8; 3]) -> usize {
        let mut n = 0;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.get_pixel(x, y) == color {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_bar_glyph_fills_column_above_baseline() {
        let mut frame = Frame::new_filled(40, 40, BLACK);
        // '|' is a single full-height column; at scale 1.0 the cell is 3 px
        draw_text(&mut frame, "|", (10, 30), WHITE, 1.0);

        // Center column of the glyph (columns 0,1 are empty, so the lit
        // cells start at x = 10 + 2*3)
        assert_eq!(frame.get_pixel(16, 29), WHITE);
        assert_eq!(frame.get_pixel(16, 30 - 21), WHITE);
        // Nothing below the baseline or left of the glyph
        assert_eq!(frame.get_pixel(16, 31), BLACK);
        assert_eq!(frame.get_pixel(9, 25), BLACK);
        // 7 rows * one 3x3 cell each
        assert_eq!(count_colored(&frame, WHITE), 7 * 9);
    }

    #[test]
    fn test_empty_string_is_a_no_op() {
        let original = Frame::new_filled(20, 20, [7, 8, 9]);
        let mut frame = original.clone();
        draw_text(&mut frame, "", (5, 15), WHITE, 2.0);
        assert_eq!(frame, original);
    }

    #[test]
    fn test_spaces_paint_nothing() {
        let mut frame = Frame::new_filled(60, 30, BLACK);
        draw_text(&mut frame, "   ", (2, 25), WHITE, 1.0);
        assert_eq!(count_colored(&frame, WHITE), 0);
    }

    #[test]
    fn test_scale_grows_glyphs() {
        let mut small = Frame::new_filled(200, 100, BLACK);
        let mut large = Frame::new_filled(200, 100, BLACK);
        draw_text(&mut small, "A", (10, 90), WHITE, 1.0);
        draw_text(&mut large, "A", (10, 90), WHITE, 2.0);
        assert!(count_colored(&large, WHITE) > count_colored(&small, WHITE));
    }

    #[test]
    fn test_offscreen_text_clips_without_panic() {
        let mut frame = Frame::new_filled(10, 10, BLACK);
        draw_text(&mut frame, "clipped caption", (-30, 5), WHITE, 3.0);
    }
}
