use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};

/// Edge length of one glyph cell in the bitmap font.
pub(crate) const GLYPH_SIZE: u32 = 8;

/// Pixel width of `text` drawn at the given integer scale.
pub(crate) fn measure(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Pixel height of one text line at the given integer scale.
pub(crate) fn line_height(scale: u32) -> u32 {
    GLYPH_SIZE * scale
}

/// Blit `text` onto the canvas with its top-left corner at (x, y).
/// Pixels outside the canvas are clipped; non-ASCII characters draw as '?'.
pub(crate) fn draw(canvas: &mut RgbaImage, text: &str, x: i32, y: i32, scale: u32, color: Rgba<u8>) {
    let mut pen_x = x;
    for ch in text.chars() {
        let code = ch as usize;
        let glyph = if code < BASIC_LEGACY.len() {
            BASIC_LEGACY[code]
        } else {
            BASIC_LEGACY[b'?' as usize]
        };
        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                // One font pixel becomes a scale x scale block
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = pen_x.saturating_add((col * scale + dx) as i32);
                        let py = y.saturating_add((row as u32 * scale + dy) as i32);
                        if px >= 0
                            && py >= 0
                            && (px as u32) < canvas.width()
                            && (py as u32) < canvas.height()
                        {
                            canvas.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
        pen_x = pen_x.saturating_add((GLYPH_SIZE * scale) as i32);
    }
}
