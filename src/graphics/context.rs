//! GDI context: the single owner of all device-context, object and
//! framebuffer state.
//!
//! Key concepts:
//! - `GdiContext`: entry point for every operation; either initialized or
//!   torn down. Every call on a torn-down context fails `NotInitialized`.
//! - Target resolution: a DC draws into its private surface when it has one,
//!   otherwise into the shared screen framebuffer.
//! - Stale selections: deleting an object does not touch DCs. Draw calls
//!   re-resolve the selected handles and fall back to the default pen
//!   (white) or brush (black) when the handle no longer resolves.

use crate::config::GdiConfig;

use super::blit::{self, BlitRegion, RasterOp, SourceMap};
use super::dc::{DcTable, DeviceContext};
use super::error::{GdiError, GdiResult};
use super::objects::{
    truncate_face_name, Bitmap, Brush, BrushStyle, Font, GdiObject, ObjectInfo, ObjectKind,
    ObjectTable, Pen, PenStyle, ANSI_CHARSET,
};
use super::raster;
use super::surface::PixelBuffer;
use super::types::{BkMode, ColorRef, HGdiObj, Hdc, PaintInfo, Point, Rect, WindowId};

/// Pen index used when no usable pen is selected.
pub const DEFAULT_PEN_INDEX: u8 = ColorRef::WHITE.index();
/// Brush index used when no usable brush is selected.
pub const DEFAULT_BRUSH_INDEX: u8 = ColorRef::BLACK.index();

/// Colors a draw call resolves from the DC before touching pixels.
/// `None` means the selected pen/brush has the null style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DrawColors {
    pen: Option<u8>,
    brush: Option<u8>,
    pattern: u8,
    text: u8,
}

#[derive(Debug)]
struct GdiState {
    config: GdiConfig,
    screen: PixelBuffer,
    dcs: DcTable,
    objects: ObjectTable,
}

impl GdiState {
    fn colors(&self, dc: &DeviceContext) -> DrawColors {
        let pen = match self.objects.pen(dc.selection.pen) {
            Some(Pen {
                style: PenStyle::Null,
                ..
            }) => None,
            Some(pen) => Some(pen.color.index()),
            None => Some(DEFAULT_PEN_INDEX),
        };
        let (brush, pattern) = match self.objects.brush(dc.selection.brush) {
            Some(Brush {
                style: BrushStyle::Null,
                color,
            }) => (None, color.index()),
            Some(brush) => (Some(brush.color.index()), brush.color.index()),
            None => (Some(DEFAULT_BRUSH_INDEX), DEFAULT_BRUSH_INDEX),
        };
        DrawColors {
            pen,
            brush,
            pattern,
            text: dc.text_color.index(),
        }
    }

    /// Buffer a DC renders into.
    fn surface(&self, hdc: Hdc) -> GdiResult<&PixelBuffer> {
        let dc = self.dcs.resolve(hdc)?;
        Ok(dc.surface.as_ref().unwrap_or(&self.screen))
    }

    /// Run `f` against the DC's target buffer with its resolved colors.
    fn draw<R>(
        &mut self,
        hdc: Hdc,
        f: impl FnOnce(&mut PixelBuffer, &DrawColors) -> R,
    ) -> GdiResult<R> {
        let colors = {
            let dc = self.dcs.resolve(hdc)?;
            self.colors(dc)
        };
        let GdiState { dcs, screen, .. } = self;
        let dc = dcs.resolve_mut(hdc)?;
        let target = match dc.surface.as_mut() {
            Some(surface) => surface,
            None => screen,
        };
        Ok(f(target, &colors))
    }

    fn dimensions_for(&self, hdc: Hdc) -> GdiResult<(i32, i32)> {
        if hdc.is_null() {
            return Ok((self.screen.width(), self.screen.height()));
        }
        let surface = self.surface(hdc)?;
        Ok((surface.width(), surface.height()))
    }

    /// Shared body of `bitblt` and `stretchblt`.
    fn transfer(
        &mut self,
        dst: Hdc,
        (x, y, w, h): (i32, i32, i32, i32),
        src: Hdc,
        map: SourceMap,
        op: RasterOp,
    ) -> GdiResult<()> {
        let (dst_width, dst_height) = {
            let surface = self.surface(dst)?;
            (surface.width(), surface.height())
        };
        let source = if src.is_null() {
            None
        } else {
            Some(self.surface(src)?)
        };
        let Some(region) = BlitRegion::clip(dst_width, dst_height, x, y, w, h) else {
            return Ok(());
        };
        let samples = blit::sample(source, &region, &map, op);
        self.draw(dst, |target, colors| {
            blit::combine(target, &region, &samples, op, colors.pattern)
        })
    }
}

/// Owner of the screen framebuffer, the DC table and the object table.
///
/// Not internally synchronized; callers sharing one context across threads
/// must serialize access themselves.
#[derive(Debug, Default)]
pub struct GdiContext {
    state: Option<GdiState>,
}

impl GdiContext {
    /// A context that has not been initialized. Every operation on it
    /// fails with `NotInitialized` until replaced by [`GdiContext::init`].
    pub const fn uninitialized() -> Self {
        Self { state: None }
    }

    /// Initialize with the default 640x480 screen and table sizes.
    pub fn init() -> GdiResult<Self> {
        Self::init_with(GdiConfig::default())
    }

    pub fn init_with(config: GdiConfig) -> GdiResult<Self> {
        config
            .validate()
            .map_err(|err| GdiError::InvalidArgument(err.to_string()))?;
        let screen = PixelBuffer::new(config.screen_width, config.screen_height)?;
        log::debug!(
            "GDI initialized: {}x{} screen, {} DC slots, {} object slots",
            config.screen_width,
            config.screen_height,
            config.max_dcs,
            config.max_objects
        );
        Ok(Self {
            state: Some(GdiState {
                config,
                screen,
                dcs: DcTable::new(config.max_dcs),
                objects: ObjectTable::new(config.max_objects),
            }),
        })
    }

    /// Release the screen, every memory-DC surface and every bitmap.
    /// Calling it again is a no-op.
    pub fn free(&mut self) {
        if let Some(state) = self.state.take() {
            log::debug!(
                "GDI freed: {} DCs and {} objects released",
                state.dcs.len(),
                state.objects.len()
            );
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn state(&self) -> GdiResult<&GdiState> {
        self.state.as_ref().ok_or(GdiError::NotInitialized)
    }

    fn state_mut(&mut self) -> GdiResult<&mut GdiState> {
        self.state.as_mut().ok_or(GdiError::NotInitialized)
    }

    pub fn config(&self) -> GdiResult<GdiConfig> {
        Ok(self.state()?.config)
    }

    /// The shared screen framebuffer.
    pub fn screen(&self) -> GdiResult<&PixelBuffer> {
        Ok(&self.state()?.screen)
    }

    /// The buffer `hdc` renders into.
    pub fn surface(&self, hdc: Hdc) -> GdiResult<&PixelBuffer> {
        self.state()?.surface(hdc)
    }

    pub fn dc_count(&self) -> GdiResult<usize> {
        Ok(self.state()?.dcs.len())
    }

    pub fn object_count(&self) -> GdiResult<usize> {
        Ok(self.state()?.objects.len())
    }

    // ------------------------------------------------------------------
    // Device contexts
    // ------------------------------------------------------------------

    pub fn get_dc(&mut self, window: WindowId) -> GdiResult<Hdc> {
        let state = self.state_mut()?;
        state.dcs.insert(DeviceContext::new(window)).map_err(|err| {
            log::warn!("get_dc({}) failed: {}", window, err);
            err
        })
    }

    /// Release a DC and its private surface. `window` is not checked
    /// against the DC's owner.
    pub fn release_dc(&mut self, window: WindowId, hdc: Hdc) -> GdiResult<()> {
        let state = self.state_mut()?;
        state.dcs.remove(hdc).map(drop).map_err(|err| {
            log::warn!("release_dc({}, {}) failed: {}", window, hdc, err);
            err
        })
    }

    pub fn begin_paint(&mut self, window: WindowId) -> GdiResult<PaintInfo> {
        let hdc = self.get_dc(window)?;
        self.state_mut()?.dcs.resolve_mut(hdc)?.painting = true;
        Ok(PaintInfo {
            hdc,
            erase_background: true,
            update_rect: Rect::default(),
        })
    }

    pub fn end_paint(&mut self, window: WindowId, paint: &PaintInfo) -> GdiResult<()> {
        self.release_dc(window, paint.hdc)
    }

    /// Create a memory DC sized like `reference` (its private surface, or
    /// the screen when it has none). `Hdc::NULL` means the screen.
    pub fn create_compatible_dc(&mut self, reference: Hdc) -> GdiResult<Hdc> {
        let state = self.state_mut()?;
        let (width, height) = state.dimensions_for(reference)?;
        let surface = PixelBuffer::new(width, height)?;
        let mut dc = DeviceContext::new(0);
        dc.surface = Some(surface);
        state.dcs.insert(dc)
    }

    pub fn get_window(&self, hdc: Hdc) -> GdiResult<WindowId> {
        Ok(self.state()?.dcs.resolve(hdc)?.window)
    }

    pub fn is_painting(&self, hdc: Hdc) -> GdiResult<bool> {
        Ok(self.state()?.dcs.resolve(hdc)?.painting)
    }

    pub fn get_dc_extent(&self, hdc: Hdc) -> GdiResult<(i32, i32)> {
        let surface = self.surface(hdc)?;
        Ok((surface.width(), surface.height()))
    }

    pub fn set_text_color(&mut self, hdc: Hdc, color: ColorRef) -> GdiResult<ColorRef> {
        let dc = self.state_mut()?.dcs.resolve_mut(hdc)?;
        Ok(std::mem::replace(&mut dc.text_color, color))
    }

    pub fn get_text_color(&self, hdc: Hdc) -> GdiResult<ColorRef> {
        Ok(self.state()?.dcs.resolve(hdc)?.text_color)
    }

    pub fn set_bk_color(&mut self, hdc: Hdc, color: ColorRef) -> GdiResult<ColorRef> {
        let dc = self.state_mut()?.dcs.resolve_mut(hdc)?;
        Ok(std::mem::replace(&mut dc.bk_color, color))
    }

    pub fn get_bk_color(&self, hdc: Hdc) -> GdiResult<ColorRef> {
        Ok(self.state()?.dcs.resolve(hdc)?.bk_color)
    }

    pub fn set_bk_mode(&mut self, hdc: Hdc, mode: BkMode) -> GdiResult<BkMode> {
        let dc = self.state_mut()?.dcs.resolve_mut(hdc)?;
        Ok(std::mem::replace(&mut dc.bk_mode, mode))
    }

    pub fn get_bk_mode(&self, hdc: Hdc) -> GdiResult<BkMode> {
        Ok(self.state()?.dcs.resolve(hdc)?.bk_mode)
    }

    pub fn get_current_position(&self, hdc: Hdc) -> GdiResult<Point> {
        Ok(self.state()?.dcs.resolve(hdc)?.position)
    }

    /// Handle selected in the `kind` slot; may be stale.
    pub fn get_current_object(&self, hdc: Hdc, kind: ObjectKind) -> GdiResult<HGdiObj> {
        Ok(self.state()?.dcs.resolve(hdc)?.selection.get(kind))
    }

    // ------------------------------------------------------------------
    // Graphics objects
    // ------------------------------------------------------------------

    fn insert_object(&mut self, object: GdiObject) -> GdiResult<HGdiObj> {
        let state = self.state_mut()?;
        state.objects.insert(object).map_err(|err| {
            log::warn!("object allocation failed: {}", err);
            err
        })
    }

    pub fn create_pen(&mut self, style: PenStyle, width: i16, color: ColorRef) -> GdiResult<HGdiObj> {
        self.insert_object(GdiObject::Pen(Pen {
            style,
            width,
            color,
        }))
    }

    pub fn create_brush(&mut self, style: BrushStyle, color: ColorRef) -> GdiResult<HGdiObj> {
        self.insert_object(GdiObject::Brush(Brush { style, color }))
    }

    pub fn create_solid_brush(&mut self, color: ColorRef) -> GdiResult<HGdiObj> {
        self.create_brush(BrushStyle::Solid, color)
    }

    /// Face names longer than the fixed field are truncated.
    pub fn create_font(
        &mut self,
        height: i16,
        width: i16,
        weight: i16,
        face_name: &str,
    ) -> GdiResult<HGdiObj> {
        self.insert_object(GdiObject::Font(Font {
            height,
            width,
            weight,
            face_name: truncate_face_name(face_name),
            charset: ANSI_CHARSET,
        }))
    }

    /// Create a bitmap with `width * height` bytes of storage, seeded from
    /// `initial` when given (extra bytes ignored, missing bytes zero).
    pub fn create_bitmap(
        &mut self,
        width: i16,
        height: i16,
        planes: u8,
        bits_per_pixel: u8,
        initial: Option<&[u8]>,
    ) -> GdiResult<HGdiObj> {
        self.state()?;
        let pixels = match initial {
            Some(data) => PixelBuffer::with_data(width as i32, height as i32, data)?,
            None => PixelBuffer::new(width as i32, height as i32)?,
        };
        self.insert_object(GdiObject::Bitmap(Bitmap {
            planes,
            bits_per_pixel,
            pixels,
        }))
    }

    /// Single-plane 8bpp bitmap. The reference DC is accepted for
    /// interface compatibility only.
    pub fn create_compatible_bitmap(
        &mut self,
        _reference: Hdc,
        width: i16,
        height: i16,
    ) -> GdiResult<HGdiObj> {
        self.create_bitmap(width, height, 1, 8, None)
    }

    /// Select an object into the matching slot of the DC, returning the
    /// handle previously held by that slot (`HGdiObj::NULL` if none).
    pub fn select_object(&mut self, hdc: Hdc, object: HGdiObj) -> GdiResult<HGdiObj> {
        let state = self.state_mut()?;
        state.dcs.resolve(hdc)?;
        let kind = state.objects.resolve(object)?.kind();
        let dc = state.dcs.resolve_mut(hdc)?;
        Ok(dc.selection.replace(kind, object))
    }

    /// Delete an object. DCs that still select it are left alone; their
    /// selection resolves to the default at draw time.
    pub fn delete_object(&mut self, object: HGdiObj) -> GdiResult<()> {
        let state = self.state_mut()?;
        state.objects.remove(object).map(drop)
    }

    pub fn get_object(&self, object: HGdiObj) -> GdiResult<ObjectInfo> {
        let state = self.state()?;
        Ok(ObjectInfo::from(state.objects.resolve(object)?))
    }

    fn bitmap_mut(&mut self, object: HGdiObj) -> GdiResult<&mut Bitmap> {
        match self.state_mut()?.objects.resolve_mut(object)? {
            GdiObject::Bitmap(bitmap) => Ok(bitmap),
            other => Err(GdiError::InvalidArgument(format!(
                "{} is a {:?}, not a bitmap",
                object,
                other.kind()
            ))),
        }
    }

    /// Copy bitmap pixels into `out`; returns the number of bytes copied.
    pub fn get_bitmap_bits(&self, object: HGdiObj, out: &mut [u8]) -> GdiResult<usize> {
        match self.state()?.objects.resolve(object)? {
            GdiObject::Bitmap(bitmap) => Ok(bitmap.pixels.store(out)),
            other => Err(GdiError::InvalidArgument(format!(
                "{} is a {:?}, not a bitmap",
                object,
                other.kind()
            ))),
        }
    }

    /// Overwrite bitmap pixels from `data`; returns the number of bytes copied.
    pub fn set_bitmap_bits(&mut self, object: HGdiObj, data: &[u8]) -> GdiResult<usize> {
        Ok(self.bitmap_mut(object)?.pixels.load(data))
    }

    // ------------------------------------------------------------------
    // Rasterizer
    // ------------------------------------------------------------------

    /// Bounds-checked pixel write with an explicit color.
    pub fn plot(&mut self, hdc: Hdc, x: i16, y: i16, color: ColorRef) -> GdiResult<()> {
        self.state_mut()?.draw(hdc, |target, _| {
            raster::plot(target, x as i32, y as i32, color.index())
        })
    }

    /// Line with an explicit color, both endpoints inclusive.
    pub fn line(
        &mut self,
        hdc: Hdc,
        x0: i16,
        y0: i16,
        x1: i16,
        y1: i16,
        color: ColorRef,
    ) -> GdiResult<()> {
        self.state_mut()?.draw(hdc, |target, _| {
            raster::line(target, x0 as i32, y0 as i32, x1 as i32, y1 as i32, color.index())
        })
    }

    /// Set the current position; returns the previous one.
    pub fn move_to(&mut self, hdc: Hdc, x: i16, y: i16) -> GdiResult<Point> {
        let dc = self.state_mut()?.dcs.resolve_mut(hdc)?;
        Ok(std::mem::replace(&mut dc.position, Point::new(x, y)))
    }

    /// Draw from the current position with the selected pen and move there.
    pub fn line_to(&mut self, hdc: Hdc, x: i16, y: i16) -> GdiResult<()> {
        let state = self.state_mut()?;
        let from = state.dcs.resolve(hdc)?.position;
        state.draw(hdc, |target, colors| {
            if let Some(pen) = colors.pen {
                raster::line(target, from.x as i32, from.y as i32, x as i32, y as i32, pen);
            }
        })?;
        state.dcs.resolve_mut(hdc)?.position = Point::new(x, y);
        Ok(())
    }

    pub fn rectangle(&mut self, hdc: Hdc, left: i16, top: i16, right: i16, bottom: i16) -> GdiResult<()> {
        self.state_mut()?.draw(hdc, |target, colors| {
            raster::rectangle(
                target,
                left as i32,
                top as i32,
                right as i32,
                bottom as i32,
                colors.pen,
                colors.brush,
            )
        })
    }

    pub fn ellipse(&mut self, hdc: Hdc, left: i16, top: i16, right: i16, bottom: i16) -> GdiResult<()> {
        self.state_mut()?.draw(hdc, |target, colors| {
            if let Some(pen) = colors.pen {
                raster::ellipse(target, left as i32, top as i32, right as i32, bottom as i32, pen);
            }
        })
    }

    fn poly(&mut self, hdc: Hdc, points: &[Point], closed: bool) -> GdiResult<()> {
        let state = self.state_mut()?;
        if points.len() < 2 {
            return Err(GdiError::InvalidArgument(format!(
                "need at least 2 points, got {}",
                points.len()
            )));
        }
        let points: Vec<(i32, i32)> = points.iter().map(|p| (p.x as i32, p.y as i32)).collect();
        state.draw(hdc, |target, colors| {
            if let Some(pen) = colors.pen {
                raster::polyline(target, &points, pen, closed);
            }
        })
    }

    /// Open figure through `points` (at least two).
    pub fn polyline(&mut self, hdc: Hdc, points: &[Point]) -> GdiResult<()> {
        self.poly(hdc, points, false)
    }

    /// Closed figure through `points` (at least two).
    pub fn polygon(&mut self, hdc: Hdc, points: &[Point]) -> GdiResult<()> {
        self.poly(hdc, points, true)
    }

    /// Render `text` with the built-in 8x8 font in the DC's text color.
    ///
    /// `len == None` stops at the first NUL; otherwise exactly `len`
    /// bytes (capped at the slice) are drawn.
    pub fn text_out(&mut self, hdc: Hdc, x: i16, y: i16, text: &[u8], len: Option<usize>) -> GdiResult<()> {
        let span = raster::text_span(text, len);
        self.state_mut()?.draw(hdc, |target, colors| {
            raster::text(target, x as i32, y as i32, span, colors.text)
        })
    }

    /// Fixed-cell extent: `(8 * chars, 8)`.
    pub fn get_text_extent(&self, hdc: Hdc, text: &[u8], len: Option<usize>) -> GdiResult<(i32, i32)> {
        self.state()?.dcs.resolve(hdc)?;
        Ok(raster::text_extent(raster::text_span(text, len).len()))
    }

    /// Write one pixel. Returns the stored color, or `ColorRef::INVALID`
    /// for a bad DC or out-of-range coordinate.
    pub fn set_pixel(&mut self, hdc: Hdc, x: i16, y: i16, color: ColorRef) -> ColorRef {
        let value = color.index();
        let written = self
            .state_mut()
            .and_then(|state| state.draw(hdc, |target, _| target.put(x as i32, y as i32, value)));
        match written {
            Ok(true) => ColorRef::from_index(value),
            _ => ColorRef::INVALID,
        }
    }

    /// Read one pixel, or `ColorRef::INVALID` on failure.
    pub fn get_pixel(&self, hdc: Hdc, x: i16, y: i16) -> ColorRef {
        self.surface(hdc)
            .ok()
            .and_then(|surface| surface.get(x as i32, y as i32))
            .map(ColorRef::from_index)
            .unwrap_or(ColorRef::INVALID)
    }

    /// Fill `rect` (bottom-right exclusive) with `brush`'s color.
    pub fn fill_rect(&mut self, hdc: Hdc, rect: &Rect, brush: HGdiObj) -> GdiResult<()> {
        let state = self.state_mut()?;
        let Some(color) = brush_fill(&state.objects, brush)? else {
            return state.draw(hdc, |_, _| ());
        };
        state.draw(hdc, |target, _| {
            raster::fill_rect(
                target,
                rect.left as i32,
                rect.top as i32,
                rect.right as i32,
                rect.bottom as i32,
                color,
            )
        })
    }

    /// One-pixel border of `rect` in `brush`'s color.
    pub fn frame_rect(&mut self, hdc: Hdc, rect: &Rect, brush: HGdiObj) -> GdiResult<()> {
        let state = self.state_mut()?;
        let Some(color) = brush_fill(&state.objects, brush)? else {
            return state.draw(hdc, |_, _| ());
        };
        state.draw(hdc, |target, _| {
            raster::frame_rect(
                target,
                rect.left as i32,
                rect.top as i32,
                rect.right as i32,
                rect.bottom as i32,
                color,
            )
        })
    }

    pub fn invert_rect(&mut self, hdc: Hdc, rect: &Rect) -> GdiResult<()> {
        self.state_mut()?.draw(hdc, |target, _| {
            raster::invert_rect(
                target,
                rect.left as i32,
                rect.top as i32,
                rect.right as i32,
                rect.bottom as i32,
            )
        })
    }

    // ------------------------------------------------------------------
    // Block transfers
    // ------------------------------------------------------------------

    /// 1:1 transfer from `src` (or no source when `Hdc::NULL`).
    #[allow(clippy::too_many_arguments)]
    pub fn bitblt(
        &mut self,
        dst: Hdc,
        x: i16,
        y: i16,
        width: i16,
        height: i16,
        src: Hdc,
        sx: i16,
        sy: i16,
        op: RasterOp,
    ) -> GdiResult<()> {
        self.state_mut()?.transfer(
            dst,
            (x as i32, y as i32, width as i32, height as i32),
            src,
            SourceMap::identity(sx as i32, sy as i32),
            op,
        )
    }

    /// Nearest-neighbour scaled transfer. A non-positive destination size
    /// draws nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn stretchblt(
        &mut self,
        dst: Hdc,
        x: i16,
        y: i16,
        width: i16,
        height: i16,
        src: Hdc,
        sx: i16,
        sy: i16,
        src_width: i16,
        src_height: i16,
        op: RasterOp,
    ) -> GdiResult<()> {
        let map = SourceMap::scaled(
            sx as i32,
            sy as i32,
            src_width as i32,
            src_height as i32,
            width as i32,
            height as i32,
        );
        self.state_mut()?.transfer(
            dst,
            (x as i32, y as i32, width as i32, height as i32),
            src,
            map,
            op,
        )
    }

    /// Brush-pattern fill: a transfer whose source pixel is always 0.
    pub fn patblt(&mut self, hdc: Hdc, x: i16, y: i16, width: i16, height: i16, op: RasterOp) -> GdiResult<()> {
        self.state_mut()?.draw(hdc, |target, colors| {
            blit::pat_blt(
                target,
                x as i32,
                y as i32,
                width as i32,
                height as i32,
                op,
                colors.pattern,
            )
        })
    }
}

/// Fill color for an explicitly passed brush; `None` for a null brush.
fn brush_fill(objects: &ObjectTable, brush: HGdiObj) -> GdiResult<Option<u8>> {
    match objects.resolve(brush)? {
        GdiObject::Brush(Brush {
            style: BrushStyle::Null,
            ..
        }) => Ok(None),
        GdiObject::Brush(Brush { color, .. }) => Ok(Some(color.index())),
        other => Err(GdiError::InvalidArgument(format!(
            "{} is a {:?}, not a brush",
            brush,
            other.kind()
        ))),
    }
}
