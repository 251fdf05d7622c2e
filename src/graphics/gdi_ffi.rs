//! GDI FFI bridge: C-callable functions over a process-wide `GdiContext`.
//!
//! The context lives behind a `parking_lot::Mutex` so calls from any thread
//! are serialized. Every export is wrapped with `catch_unwind`; a panic is
//! reported as the generic failure value of that function.
//!
//! # Return conventions
//!
//! - Handle-returning functions return the handle (> 0) or a negative
//!   `GdiError` code.
//! - Status functions return 0 or a negative code.
//! - Pixel and color functions return `0xFFFFFFFF` on failure.
//! - A required pointer that is null yields `CODE_NULL_ARGUMENT` (-1).
//!
//! # Exported Functions
//!
//! | Group       | Rust export                                                |
//! |-------------|------------------------------------------------------------|
//! | Lifecycle   | `rust_gdi_init`, `rust_gdi_init_with`, `rust_gdi_free`     |
//! | DCs         | `rust_gdi_get_dc`, `rust_gdi_release_dc`, paint sessions   |
//! | Objects     | `rust_gdi_create_*`, `rust_gdi_select_object`, ...         |
//! | Drawing     | `rust_gdi_line_to`, `rust_gdi_rectangle`, `rust_gdi_text_out` |
//! | Transfers   | `rust_gdi_bitblt`, `rust_gdi_stretchblt`, `rust_gdi_patblt` |
//! | Read-back   | `rust_gdi_copy_screen`, `rust_gdi_get_pixel`               |

use std::ffi::{c_char, c_int, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice;

use parking_lot::Mutex;

use crate::config::GdiConfig;
use crate::logging::{set_log_level, LogLevel};

use super::blit::RasterOp;
use super::context::GdiContext;
use super::error::{GdiError, GdiResult};
use super::objects::{BrushStyle, PenStyle};
use super::types::{BkMode, ColorRef, HGdiObj, Hdc, PaintInfo, Point, Rect};

// ============================================================================
// Global context singleton
// ============================================================================

static GDI: Mutex<GdiContext> = parking_lot::const_mutex(GdiContext::uninitialized());

const FAILURE: c_int = GdiError::CODE_NULL_ARGUMENT;
const INVALID_COLOR: u32 = ColorRef::INVALID.0;

/// Run `f` against the global context, mapping a panic to `fallback`.
fn with_gdi<T>(fallback: T, f: impl FnOnce(&mut GdiContext) -> T) -> T {
    catch_unwind(AssertUnwindSafe(|| {
        let mut gdi = GDI.lock();
        f(&mut gdi)
    }))
    .unwrap_or(fallback)
}

fn status(result: GdiResult<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}

fn dc_code(result: GdiResult<Hdc>) -> c_int {
    match result {
        Ok(hdc) => c_int::from(hdc.raw()),
        Err(err) => err.code(),
    }
}

fn object_code(result: GdiResult<HGdiObj>) -> c_int {
    match result {
        Ok(handle) => c_int::from(handle.raw()),
        Err(err) => err.code(),
    }
}

fn count_code(result: GdiResult<usize>) -> c_int {
    match result {
        Ok(count) => c_int::try_from(count).unwrap_or(c_int::MAX),
        Err(err) => err.code(),
    }
}

fn color_code(result: GdiResult<ColorRef>) -> u32 {
    result.map(|color| color.0).unwrap_or(INVALID_COLOR)
}

/// Borrow `len` bytes at `ptr`. `None` for a null pointer.
///
/// # Safety
///
/// A non-null `ptr` must be valid for `len` reads.
unsafe fn bytes<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if ptr.is_null() {
        None
    } else {
        Some(slice::from_raw_parts(ptr, len))
    }
}

/// # Safety
///
/// A non-null `ptr` must be valid for `len` writes.
unsafe fn bytes_mut<'a>(ptr: *mut u8, len: usize) -> Option<&'a mut [u8]> {
    if ptr.is_null() {
        None
    } else {
        Some(slice::from_raw_parts_mut(ptr, len))
    }
}

/// Text argument: a negative `len` means NUL-terminated.
///
/// # Safety
///
/// `ptr` must be null, a NUL-terminated string (`len < 0`), or valid for
/// `len` reads.
unsafe fn text_arg<'a>(ptr: *const c_char, len: c_int) -> Option<(&'a [u8], Option<usize>)> {
    if ptr.is_null() {
        return None;
    }
    match usize::try_from(len) {
        Ok(len) => Some((slice::from_raw_parts(ptr.cast::<u8>(), len), Some(len))),
        Err(_) => Some((CStr::from_ptr(ptr).to_bytes(), None)),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Initialize the global context with the default configuration.
///
/// Returns 0 on success, `CODE_INVALID_ARGUMENT` if already initialized, or
/// `CODE_OUT_OF_MEMORY` when the screen cannot be allocated.
// PANIC-FREE: catch_unwind wraps entire body.
#[no_mangle]
pub extern "C" fn rust_gdi_init() -> c_int {
    let config = GdiConfig::default();
    rust_gdi_init_with(
        config.screen_width,
        config.screen_height,
        config.max_dcs as c_int,
        config.max_objects as c_int,
    )
}

/// Initialize with an explicit screen size and table capacities.
// PANIC-FREE: catch_unwind wraps entire body.
#[no_mangle]
pub extern "C" fn rust_gdi_init_with(
    width: c_int,
    height: c_int,
    max_dcs: c_int,
    max_objects: c_int,
) -> c_int {
    with_gdi(FAILURE, |gdi| {
        if gdi.is_initialized() {
            log::warn!("rust_gdi_init: already initialized");
            return GdiError::CODE_INVALID_ARGUMENT;
        }
        let (Ok(max_dcs), Ok(max_objects)) = (usize::try_from(max_dcs), usize::try_from(max_objects))
        else {
            return GdiError::CODE_INVALID_ARGUMENT;
        };
        let config = GdiConfig::default()
            .with_screen(width, height)
            .with_capacities(max_dcs, max_objects);
        match GdiContext::init_with(config) {
            Ok(context) => {
                *gdi = context;
                0
            }
            Err(err) => {
                log::warn!("rust_gdi_init: {}", err);
                err.code()
            }
        }
    })
}

/// Tear down the global context. Safe to call when not initialized.
// PANIC-FREE: catch_unwind wraps entire body.
#[no_mangle]
pub extern "C" fn rust_gdi_free() {
    with_gdi((), |gdi| gdi.free())
}

/// Returns 1 when initialized, 0 otherwise.
#[no_mangle]
pub extern "C" fn rust_gdi_is_initialized() -> c_int {
    with_gdi(0, |gdi| c_int::from(gdi.is_initialized()))
}

/// Set the maximum log level using the legacy 0..6 scale.
#[no_mangle]
pub extern "C" fn rust_gdi_set_log_level(level: c_int) {
    let _ = catch_unwind(|| set_log_level(LogLevel::from_i32(level)));
}

// ============================================================================
// Device contexts
// ============================================================================

#[no_mangle]
pub extern "C" fn rust_gdi_get_dc(window: u16) -> c_int {
    with_gdi(FAILURE, |gdi| dc_code(gdi.get_dc(window)))
}

#[no_mangle]
pub extern "C" fn rust_gdi_release_dc(window: u16, hdc: u16) -> c_int {
    with_gdi(FAILURE, |gdi| status(gdi.release_dc(window, Hdc(hdc))))
}

/// Start a paint session and fill `paint`. Returns the new DC handle.
///
/// # Safety
///
/// `paint` must be null or point to writable `PaintInfo` storage.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_begin_paint(window: u16, paint: *mut PaintInfo) -> c_int {
    if paint.is_null() {
        return GdiError::CODE_NULL_ARGUMENT;
    }
    with_gdi(FAILURE, |gdi| match gdi.begin_paint(window) {
        Ok(info) => {
            *paint = info;
            c_int::from(info.hdc.raw())
        }
        Err(err) => err.code(),
    })
}

/// # Safety
///
/// `paint` must be null or point to a `PaintInfo` filled by `begin_paint`.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_end_paint(window: u16, paint: *const PaintInfo) -> c_int {
    let Some(info) = paint.as_ref() else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| status(gdi.end_paint(window, info)))
}

/// `hdc == 0` sizes the new memory DC like the screen.
#[no_mangle]
pub extern "C" fn rust_gdi_create_compatible_dc(hdc: u16) -> c_int {
    with_gdi(FAILURE, |gdi| dc_code(gdi.create_compatible_dc(Hdc(hdc))))
}

#[no_mangle]
pub extern "C" fn rust_gdi_set_text_color(hdc: u16, color: u32) -> u32 {
    with_gdi(INVALID_COLOR, |gdi| {
        color_code(gdi.set_text_color(Hdc(hdc), ColorRef(color)))
    })
}

#[no_mangle]
pub extern "C" fn rust_gdi_set_bk_color(hdc: u16, color: u32) -> u32 {
    with_gdi(INVALID_COLOR, |gdi| {
        color_code(gdi.set_bk_color(Hdc(hdc), ColorRef(color)))
    })
}

/// Returns the previous mode (1 or 2) or a negative code.
#[no_mangle]
pub extern "C" fn rust_gdi_set_bk_mode(hdc: u16, mode: c_int) -> c_int {
    with_gdi(FAILURE, |gdi| {
        let Some(mode) = BkMode::from_i32(mode) else {
            return GdiError::CODE_INVALID_ARGUMENT;
        };
        match gdi.set_bk_mode(Hdc(hdc), mode) {
            Ok(previous) => previous.as_i32(),
            Err(err) => err.code(),
        }
    })
}

// ============================================================================
// Objects
// ============================================================================

#[no_mangle]
pub extern "C" fn rust_gdi_create_pen(style: c_int, width: i16, color: u32) -> c_int {
    with_gdi(FAILURE, |gdi| {
        object_code(gdi.create_pen(PenStyle::from_i32(style), width, ColorRef(color)))
    })
}

#[no_mangle]
pub extern "C" fn rust_gdi_create_brush(style: c_int, color: u32) -> c_int {
    with_gdi(FAILURE, |gdi| {
        object_code(gdi.create_brush(BrushStyle::from_i32(style), ColorRef(color)))
    })
}

/// # Safety
///
/// `face_name` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_create_font(
    height: i16,
    width: i16,
    weight: i16,
    face_name: *const c_char,
) -> c_int {
    if face_name.is_null() {
        return GdiError::CODE_NULL_ARGUMENT;
    }
    let face = CStr::from_ptr(face_name).to_string_lossy();
    with_gdi(FAILURE, |gdi| {
        object_code(gdi.create_font(height, width, weight, &face))
    })
}

/// `bits` may be null for a zero-filled bitmap; otherwise up to `len`
/// bytes seed the pixels.
///
/// # Safety
///
/// A non-null `bits` must be valid for `len` reads.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_create_bitmap(
    width: i16,
    height: i16,
    planes: u8,
    bits_per_pixel: u8,
    bits: *const u8,
    len: usize,
) -> c_int {
    let initial = bytes(bits, len);
    with_gdi(FAILURE, |gdi| {
        object_code(gdi.create_bitmap(width, height, planes, bits_per_pixel, initial))
    })
}

#[no_mangle]
pub extern "C" fn rust_gdi_create_compatible_bitmap(hdc: u16, width: i16, height: i16) -> c_int {
    with_gdi(FAILURE, |gdi| {
        object_code(gdi.create_compatible_bitmap(Hdc(hdc), width, height))
    })
}

/// Returns the previously selected handle of the same kind (0 if none).
#[no_mangle]
pub extern "C" fn rust_gdi_select_object(hdc: u16, object: u16) -> c_int {
    with_gdi(FAILURE, |gdi| {
        object_code(gdi.select_object(Hdc(hdc), HGdiObj(object)))
    })
}

#[no_mangle]
pub extern "C" fn rust_gdi_delete_object(object: u16) -> c_int {
    with_gdi(FAILURE, |gdi| status(gdi.delete_object(HGdiObj(object))))
}

/// Copy bitmap pixels out; returns the byte count.
///
/// # Safety
///
/// `out` must be null or valid for `len` writes.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_get_bitmap_bits(object: u16, out: *mut u8, len: usize) -> c_int {
    let Some(out) = bytes_mut(out, len) else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| {
        count_code(gdi.get_bitmap_bits(HGdiObj(object), out))
    })
}

/// Copy bitmap pixels in; returns the byte count.
///
/// # Safety
///
/// `data` must be null or valid for `len` reads.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_set_bitmap_bits(object: u16, data: *const u8, len: usize) -> c_int {
    let Some(data) = bytes(data, len) else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| {
        count_code(gdi.set_bitmap_bits(HGdiObj(object), data))
    })
}

// ============================================================================
// Drawing
// ============================================================================

#[no_mangle]
pub extern "C" fn rust_gdi_move_to(hdc: u16, x: i16, y: i16) -> c_int {
    with_gdi(FAILURE, |gdi| status(gdi.move_to(Hdc(hdc), x, y).map(drop)))
}

#[no_mangle]
pub extern "C" fn rust_gdi_line_to(hdc: u16, x: i16, y: i16) -> c_int {
    with_gdi(FAILURE, |gdi| status(gdi.line_to(Hdc(hdc), x, y)))
}

#[no_mangle]
pub extern "C" fn rust_gdi_line(hdc: u16, x0: i16, y0: i16, x1: i16, y1: i16, color: u32) -> c_int {
    with_gdi(FAILURE, |gdi| {
        status(gdi.line(Hdc(hdc), x0, y0, x1, y1, ColorRef(color)))
    })
}

#[no_mangle]
pub extern "C" fn rust_gdi_rectangle(hdc: u16, left: i16, top: i16, right: i16, bottom: i16) -> c_int {
    with_gdi(FAILURE, |gdi| {
        status(gdi.rectangle(Hdc(hdc), left, top, right, bottom))
    })
}

#[no_mangle]
pub extern "C" fn rust_gdi_ellipse(hdc: u16, left: i16, top: i16, right: i16, bottom: i16) -> c_int {
    with_gdi(FAILURE, |gdi| {
        status(gdi.ellipse(Hdc(hdc), left, top, right, bottom))
    })
}

/// # Safety
///
/// `points` must be null or valid for `count` reads.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_polyline(hdc: u16, points: *const Point, count: c_int) -> c_int {
    if points.is_null() {
        return GdiError::CODE_NULL_ARGUMENT;
    }
    let points = slice::from_raw_parts(points, usize::try_from(count).unwrap_or(0));
    with_gdi(FAILURE, |gdi| status(gdi.polyline(Hdc(hdc), points)))
}

/// # Safety
///
/// `points` must be null or valid for `count` reads.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_polygon(hdc: u16, points: *const Point, count: c_int) -> c_int {
    if points.is_null() {
        return GdiError::CODE_NULL_ARGUMENT;
    }
    let points = slice::from_raw_parts(points, usize::try_from(count).unwrap_or(0));
    with_gdi(FAILURE, |gdi| status(gdi.polygon(Hdc(hdc), points)))
}

/// Draw `len` bytes of `text`, or up to the NUL when `len` is negative.
///
/// # Safety
///
/// See [`rust_gdi_get_text_extent`].
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_text_out(
    hdc: u16,
    x: i16,
    y: i16,
    text: *const c_char,
    len: c_int,
) -> c_int {
    let Some((text, len)) = text_arg(text, len) else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| status(gdi.text_out(Hdc(hdc), x, y, text, len)))
}

/// Width in pixels of the rendered text; the height is always 8.
///
/// # Safety
///
/// `text` must be null, NUL-terminated when `len < 0`, or valid for `len`
/// reads.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_get_text_extent(hdc: u16, text: *const c_char, len: c_int) -> c_int {
    let Some((text, len)) = text_arg(text, len) else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| match gdi.get_text_extent(Hdc(hdc), text, len) {
        Ok((width, _)) => width,
        Err(err) => err.code(),
    })
}

#[no_mangle]
pub extern "C" fn rust_gdi_set_pixel(hdc: u16, x: i16, y: i16, color: u32) -> u32 {
    with_gdi(INVALID_COLOR, |gdi| gdi.set_pixel(Hdc(hdc), x, y, ColorRef(color)).0)
}

#[no_mangle]
pub extern "C" fn rust_gdi_get_pixel(hdc: u16, x: i16, y: i16) -> u32 {
    with_gdi(INVALID_COLOR, |gdi| gdi.get_pixel(Hdc(hdc), x, y).0)
}

/// # Safety
///
/// `rect` must be null or point to a valid `Rect`.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_fill_rect(hdc: u16, rect: *const Rect, brush: u16) -> c_int {
    let Some(rect) = rect.as_ref() else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| status(gdi.fill_rect(Hdc(hdc), rect, HGdiObj(brush))))
}

/// # Safety
///
/// `rect` must be null or point to a valid `Rect`.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_frame_rect(hdc: u16, rect: *const Rect, brush: u16) -> c_int {
    let Some(rect) = rect.as_ref() else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| status(gdi.frame_rect(Hdc(hdc), rect, HGdiObj(brush))))
}

/// # Safety
///
/// `rect` must be null or point to a valid `Rect`.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_invert_rect(hdc: u16, rect: *const Rect) -> c_int {
    let Some(rect) = rect.as_ref() else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| status(gdi.invert_rect(Hdc(hdc), rect)))
}

// ============================================================================
// Block transfers
// ============================================================================

/// `src == 0` runs the operation without a source.
#[allow(clippy::too_many_arguments)]
#[no_mangle]
pub extern "C" fn rust_gdi_bitblt(
    dst: u16,
    x: i16,
    y: i16,
    width: i16,
    height: i16,
    src: u16,
    sx: i16,
    sy: i16,
    rop: u32,
) -> c_int {
    with_gdi(FAILURE, |gdi| {
        status(gdi.bitblt(
            Hdc(dst),
            x,
            y,
            width,
            height,
            Hdc(src),
            sx,
            sy,
            RasterOp::from_code(rop),
        ))
    })
}

#[allow(clippy::too_many_arguments)]
#[no_mangle]
pub extern "C" fn rust_gdi_stretchblt(
    dst: u16,
    x: i16,
    y: i16,
    width: i16,
    height: i16,
    src: u16,
    sx: i16,
    sy: i16,
    src_width: i16,
    src_height: i16,
    rop: u32,
) -> c_int {
    with_gdi(FAILURE, |gdi| {
        status(gdi.stretchblt(
            Hdc(dst),
            x,
            y,
            width,
            height,
            Hdc(src),
            sx,
            sy,
            src_width,
            src_height,
            RasterOp::from_code(rop),
        ))
    })
}

#[no_mangle]
pub extern "C" fn rust_gdi_patblt(hdc: u16, x: i16, y: i16, width: i16, height: i16, rop: u32) -> c_int {
    with_gdi(FAILURE, |gdi| {
        status(gdi.patblt(Hdc(hdc), x, y, width, height, RasterOp::from_code(rop)))
    })
}

// ============================================================================
// Read-back
// ============================================================================

/// Copy up to `len` bytes of the screen framebuffer into `out`, row-major.
/// Returns the byte count.
///
/// # Safety
///
/// `out` must be null or valid for `len` writes.
#[no_mangle]
pub unsafe extern "C" fn rust_gdi_copy_screen(out: *mut u8, len: usize) -> c_int {
    let Some(out) = bytes_mut(out, len) else {
        return GdiError::CODE_NULL_ARGUMENT;
    };
    with_gdi(FAILURE, |gdi| {
        count_code(gdi.screen().map(|screen| screen.store(out)))
    })
}
