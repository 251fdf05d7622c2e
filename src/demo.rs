//! Demo scene used by the `gdi16` binary.

use anyhow::{Context, Result};
use std::path::Path;

use crate::graphics::objects::{BrushStyle, PenStyle};
use crate::graphics::{ColorRef, GdiContext, GdiResult, Hdc, PixelBuffer, Point, RasterOp, Rect};

const BACKGROUND: ColorRef = ColorRef::from_index(0x20);
const PANEL: ColorRef = ColorRef::from_index(0x50);
const OUTLINE: ColorRef = ColorRef::from_index(0xE0);
const ACCENT: ColorRef = ColorRef::from_index(0xA0);
const TILE_SIZE: i16 = 8;

fn dim(value: i32) -> i16 {
    i16::try_from(value).unwrap_or(i16::MAX)
}

/// Draw the demo scene onto the screen of `gdi` through window 1.
///
/// Every DC and object it allocates is released again before returning.
pub fn render_scene(gdi: &mut GdiContext) -> GdiResult<()> {
    let (width, height) = {
        let screen = gdi.screen()?;
        (dim(screen.width()), dim(screen.height()))
    };
    let hdc = gdi.get_dc(1)?;

    let background = gdi.create_solid_brush(BACKGROUND)?;
    gdi.fill_rect(hdc, &Rect::new(0, 0, width, height), background)?;

    let pen = gdi.create_pen(PenStyle::Solid, 1, OUTLINE)?;
    let panel = gdi.create_solid_brush(PANEL)?;
    gdi.select_object(hdc, pen)?;
    gdi.select_object(hdc, panel)?;
    gdi.rectangle(hdc, width / 16, height / 16, width / 2, height / 2)?;
    gdi.ellipse(hdc, width / 2, height / 8, width - width / 16, height / 2)?;

    let triangle = [
        Point::new(width / 8, height - height / 8),
        Point::new(width / 4, height / 2 + height / 8),
        Point::new(width / 2 - width / 16, height - height / 8),
    ];
    gdi.polygon(hdc, &triangle)?;

    gdi.set_text_color(hdc, ACCENT)?;
    gdi.text_out(hdc, width / 16 + 4, height / 16 + 4, b"gdi16 demo", None)?;

    let tiles = checker_tile(gdi, hdc)?;
    gdi.stretchblt(
        hdc,
        width / 2,
        height / 2 + height / 8,
        width / 4,
        height / 4,
        tiles,
        0,
        0,
        TILE_SIZE,
        TILE_SIZE,
        RasterOp::SrcCopy,
    )?;
    gdi.release_dc(0, tiles)?;

    gdi.invert_rect(hdc, &Rect::new(width - width / 8, 0, width, height / 16))?;

    let hollow = gdi.create_brush(BrushStyle::Null, BACKGROUND)?;
    gdi.select_object(hdc, hollow)?;
    gdi.rectangle(hdc, 0, 0, width, height)?;

    gdi.release_dc(1, hdc)?;
    for object in [background, pen, panel, hollow] {
        gdi.delete_object(object)?;
    }
    Ok(())
}

/// Memory DC holding an 8x8 two-tone checkerboard.
fn checker_tile(gdi: &mut GdiContext, reference: Hdc) -> GdiResult<Hdc> {
    let tiles = gdi.create_compatible_dc(reference)?;
    let half = TILE_SIZE / 2;
    gdi.patblt(tiles, 0, 0, TILE_SIZE, TILE_SIZE, RasterOp::Whiteness)?;
    gdi.patblt(tiles, 0, 0, half, half, RasterOp::Blackness)?;
    gdi.patblt(tiles, half, half, half, half, RasterOp::Blackness)?;
    Ok(tiles)
}

/// Write a framebuffer as an 8-bit grayscale PNG.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let image = image::GrayImage::from_raw(
        buffer.width() as u32,
        buffer.height() as u32,
        buffer.as_bytes().to_vec(),
    )
    .context("Framebuffer size does not match its dimensions")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))
}
