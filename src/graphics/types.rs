//! Boundary types shared by every GDI operation.
//!
//! Handles are 16-bit with zero reserved as "none"; colors are 32-bit
//! `0x00BBGGRR` values that the single-byte framebuffer reduces to their low
//! byte; coordinates are signed 16-bit.

use std::fmt;

/// Device-context handle. `Hdc::NULL` is the invalid sentinel.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hdc(pub u16);

impl Hdc {
    pub const NULL: Hdc = Hdc(0);

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Hdc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hdc#{}", self.0)
    }
}

/// Graphics-object handle (pen, brush, font or bitmap).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HGdiObj(pub u16);

impl HGdiObj {
    pub const NULL: HGdiObj = HGdiObj(0);

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for HGdiObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hobj#{}", self.0)
    }
}

/// Owning window identifier. Zero means screen-level.
pub type WindowId = u16;

/// A 32-bit color reference, `0x00BBGGRR`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorRef(pub u32);

impl ColorRef {
    pub const BLACK: ColorRef = ColorRef(0x0000_0000);
    pub const WHITE: ColorRef = ColorRef(0x00FF_FFFF);
    /// Out-of-band value returned by `set_pixel`/`get_pixel` on failure.
    pub const INVALID: ColorRef = ColorRef(0xFFFF_FFFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self((r as u32) | ((g as u32) << 8) | ((b as u32) << 16))
    }

    pub const fn from_index(index: u8) -> Self {
        Self(index as u32)
    }

    pub const fn red(self) -> u8 {
        self.0 as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Palette index written to the framebuffer (the low byte).
    pub const fn index(self) -> u8 {
        self.0 as u8
    }

    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }
}

impl From<u32> for ColorRef {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A point in device coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

impl From<(i16, i16)> for Point {
    fn from((x, y): (i16, i16)) -> Self {
        Self { x, y }
    }
}

/// Rectangle with inclusive top-left and exclusive bottom-right.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl Rect {
    pub const fn new(left: i16, top: i16, right: i16, bottom: i16) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn width(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    pub const fn height(&self) -> i32 {
        self.bottom as i32 - self.top as i32
    }

    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Background mix mode. Numeric values match the historical constants.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BkMode {
    Transparent = 1,
    #[default]
    Opaque = 2,
}

impl BkMode {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(BkMode::Transparent),
            2 => Some(BkMode::Opaque),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Record returned by `begin_paint` and consumed by `end_paint`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintInfo {
    pub hdc: Hdc,
    pub erase_background: bool,
    pub update_rect: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorref_channels() {
        let c = ColorRef::rgb(0x12, 0x34, 0x56);
        assert_eq!(c.0, 0x0056_3412);
        assert_eq!(c.red(), 0x12);
        assert_eq!(c.green(), 0x34);
        assert_eq!(c.blue(), 0x56);
        assert_eq!(c.index(), 0x12);
    }

    #[test]
    fn test_colorref_defaults() {
        assert_eq!(ColorRef::WHITE.index(), 0xFF);
        assert_eq!(ColorRef::BLACK.index(), 0x00);
        assert!(ColorRef::INVALID.is_invalid());
        assert!(!ColorRef::from_index(0xFF).is_invalid());
    }

    #[test]
    fn test_null_handles() {
        assert!(Hdc::NULL.is_null());
        assert!(HGdiObj::default().is_null());
        assert!(!Hdc(3).is_null());
        assert_eq!(HGdiObj(9).raw(), 9);
    }

    #[test]
    fn test_rect_extent() {
        let r = Rect::new(2, 3, 10, 7);
        assert_eq!(r.width(), 8);
        assert_eq!(r.height(), 4);
        assert!(!r.is_empty());
        assert!(Rect::new(5, 5, 5, 9).is_empty());
    }

    #[test]
    fn test_bk_mode_values() {
        assert_eq!(BkMode::default(), BkMode::Opaque);
        assert_eq!(BkMode::from_i32(1), Some(BkMode::Transparent));
        assert_eq!(BkMode::from_i32(2), Some(BkMode::Opaque));
        assert_eq!(BkMode::from_i32(0), None);
        assert_eq!(BkMode::Opaque.as_i32(), 2);
    }
}
