//! Pixel rasterizer.
//!
//! Every routine writes palette indices straight into a [`PixelBuffer`] and
//! clips per pixel: coordinates outside the buffer are dropped, never an
//! error. Inputs are the DC's 16-bit coordinates widened to `i32`.

use super::glyphs::{glyph, glyph_bit, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::surface::PixelBuffer;

/// Bounds-checked single pixel write.
#[inline]
pub fn plot(buffer: &mut PixelBuffer, x: i32, y: i32, color: u8) {
    buffer.put(x, y, color);
}

/// Bresenham line, both endpoints inclusive.
pub fn line(buffer: &mut PixelBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u8) {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;
    let mut x = x0;
    let mut y = y0;

    loop {
        plot(buffer, x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Fill `[left, right) x [top, bottom)`, clamped to the buffer.
pub fn fill_rect(buffer: &mut PixelBuffer, left: i32, top: i32, right: i32, bottom: i32, color: u8) {
    let x_start = left.max(0);
    let x_end = right.min(buffer.width());
    let y_start = top.max(0);
    let y_end = bottom.min(buffer.height());

    for y in y_start..y_end {
        for x in x_start..x_end {
            buffer.put(x, y, color);
        }
    }
}

/// One-pixel border around `[left, right) x [top, bottom)`.
pub fn frame_rect(buffer: &mut PixelBuffer, left: i32, top: i32, right: i32, bottom: i32, color: u8) {
    if right <= left || bottom <= top {
        return;
    }
    line(buffer, left, top, right - 1, top, color);
    line(buffer, right - 1, top, right - 1, bottom - 1, color);
    line(buffer, right - 1, bottom - 1, left, bottom - 1, color);
    line(buffer, left, bottom - 1, left, top, color);
}

/// XOR every pixel of `[left, right) x [top, bottom)` with 0xFF.
pub fn invert_rect(buffer: &mut PixelBuffer, left: i32, top: i32, right: i32, bottom: i32) {
    for y in top.max(0)..bottom.min(buffer.height()) {
        for x in left.max(0)..right.min(buffer.width()) {
            if let Some(value) = buffer.get(x, y) {
                buffer.put(x, y, value ^ 0xFF);
            }
        }
    }
}

/// Filled and outlined rectangle.
///
/// The interior `left+1..right-1` x `top+1..bottom-1` is filled first, then
/// the edges are stroked top, right, bottom, left over
/// `[left, right-1] x [top, bottom-1]`. `None` skips that part.
pub fn rectangle(
    buffer: &mut PixelBuffer,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    pen: Option<u8>,
    brush: Option<u8>,
) {
    if let Some(fill) = brush {
        fill_rect(buffer, left + 1, top + 1, right - 1, bottom - 1, fill);
    }
    if let Some(color) = pen {
        line(buffer, left, top, right - 1, top, color);
        line(buffer, right - 1, top, right - 1, bottom - 1, color);
        line(buffer, right - 1, bottom - 1, left, bottom - 1, color);
        line(buffer, left, bottom - 1, left, top, color);
    }
}

#[inline]
fn plot_quadrants(buffer: &mut PixelBuffer, cx: i64, cy: i64, x: i64, y: i64, color: u8) {
    for (px, py) in [(cx + x, cy + y), (cx - x, cy + y), (cx + x, cy - y), (cx - x, cy - y)] {
        if let (Ok(px), Ok(py)) = (i32::try_from(px), i32::try_from(py)) {
            plot(buffer, px, py, color);
        }
    }
}

/// Two-region midpoint ellipse inscribed in the bounding box.
///
/// A box with a non-positive radius on either axis plots only its center.
pub fn ellipse(buffer: &mut PixelBuffer, left: i32, top: i32, right: i32, bottom: i32, color: u8) {
    let cx = (left + right) / 2;
    let cy = (top + bottom) / 2;
    let rx = (right - left) / 2;
    let ry = (bottom - top) / 2;

    if rx <= 0 || ry <= 0 {
        plot(buffer, cx, cy, color);
        return;
    }

    let (cx, cy) = (cx as i64, cy as i64);
    let (rx, ry) = (rx as i64, ry as i64);
    let rx2 = rx * rx;
    let ry2 = ry * ry;

    let mut x: i64 = 0;
    let mut y: i64 = ry;
    let mut px: i64 = 0;
    let mut py: i64 = 2 * rx2 * y;

    // Region 1: |slope| < 1, step x.
    let mut p = ry2 - rx2 * ry + rx2 / 4;
    while px < py {
        plot_quadrants(buffer, cx, cy, x, y, color);
        x += 1;
        px += 2 * ry2;
        if p < 0 {
            p += ry2 + px;
        } else {
            y -= 1;
            py -= 2 * rx2;
            p += ry2 + px - py;
        }
    }

    // Region 2: |slope| >= 1, step y.
    let mut p = (ry2 * (2 * x + 1) * (2 * x + 1)) / 4 + rx2 * (y - 1) * (y - 1) - rx2 * ry2;
    while y >= 0 {
        plot_quadrants(buffer, cx, cy, x, y, color);
        y -= 1;
        py -= 2 * rx2;
        if p > 0 {
            p += rx2 - py;
        } else {
            x += 1;
            px += 2 * ry2;
            p += rx2 - py + px;
        }
    }
}

/// Connect consecutive points; `closed` adds the last-to-first segment.
/// Callers guarantee at least two points.
pub fn polyline(buffer: &mut PixelBuffer, points: &[(i32, i32)], color: u8, closed: bool) {
    for pair in points.windows(2) {
        line(buffer, pair[0].0, pair[0].1, pair[1].0, pair[1].1, color);
    }
    if closed {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            line(buffer, last.0, last.1, first.0, first.1, color);
        }
    }
}

/// Characters a text call renders: up to the first NUL when `len` is
/// `None`, otherwise the first `len` bytes.
pub fn text_span(text: &[u8], len: Option<usize>) -> &[u8] {
    match len {
        Some(n) => &text[..n.min(text.len())],
        None => {
            let end = text.iter().position(|b| *b == 0).unwrap_or(text.len());
            &text[..end]
        }
    }
}

/// Blit glyph ink for each byte of `text`, advancing 8 pixels per char.
/// Only set bits are written.
pub fn text(buffer: &mut PixelBuffer, x: i32, y: i32, text: &[u8], color: u8) {
    for (index, &code) in text.iter().enumerate() {
        let origin = x as i64 + index as i64 * GLYPH_WIDTH as i64;
        if origin >= buffer.width() as i64 {
            break;
        }
        let origin = origin as i32;
        let bits = glyph(code);
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if glyph_bit(bits, col, row) {
                    plot(buffer, origin + col, y + row, color);
                }
            }
        }
    }
}

/// Fixed-cell extent of `count` characters.
pub fn text_extent(count: usize) -> (i32, i32) {
    let width = (count as i64 * GLYPH_WIDTH as i64).min(i32::MAX as i64) as i32;
    (width, GLYPH_HEIGHT)
}
