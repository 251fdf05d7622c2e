//! Graphics objects: pens, brushes, fonts and bitmaps.

use super::error::{GdiError, GdiResult, TableKind};
use super::surface::PixelBuffer;
use super::table::HandleTable;
use super::types::{ColorRef, HGdiObj};

/// Longest face name kept, in bytes (historical field holds 32 incl. NUL).
pub const FACE_NAME_MAX: usize = 31;

pub const ANSI_CHARSET: u8 = 0;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PenStyle {
    #[default]
    Solid = 0,
    Dash = 1,
    Dot = 2,
    DashDot = 3,
    DashDotDot = 4,
    Null = 5,
    InsideFrame = 6,
}

impl PenStyle {
    /// Unknown values fall back to `Solid`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => PenStyle::Dash,
            2 => PenStyle::Dot,
            3 => PenStyle::DashDot,
            4 => PenStyle::DashDotDot,
            5 => PenStyle::Null,
            6 => PenStyle::InsideFrame,
            _ => PenStyle::Solid,
        }
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BrushStyle {
    #[default]
    Solid = 0,
    Null = 1,
    Hatched = 2,
    Pattern = 3,
}

impl BrushStyle {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => BrushStyle::Null,
            2 => BrushStyle::Hatched,
            3 => BrushStyle::Pattern,
            _ => BrushStyle::Solid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pen {
    pub style: PenStyle,
    pub width: i16,
    pub color: ColorRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub style: BrushStyle,
    pub color: ColorRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub height: i16,
    pub width: i16,
    pub weight: i16,
    pub face_name: String,
    pub charset: u8,
}

/// Bitmap object; owns its pixel storage until deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub planes: u8,
    pub bits_per_pixel: u8,
    pub pixels: PixelBuffer,
}

impl Bitmap {
    pub fn width(&self) -> i32 {
        self.pixels.width()
    }

    pub fn height(&self) -> i32 {
        self.pixels.height()
    }
}

/// Selection slot an object occupies inside a DC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Pen,
    Brush,
    Font,
    Bitmap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GdiObject {
    Pen(Pen),
    Brush(Brush),
    Font(Font),
    Bitmap(Bitmap),
}

impl GdiObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            GdiObject::Pen(_) => ObjectKind::Pen,
            GdiObject::Brush(_) => ObjectKind::Brush,
            GdiObject::Font(_) => ObjectKind::Font,
            GdiObject::Bitmap(_) => ObjectKind::Bitmap,
        }
    }
}

/// Copy of an object's descriptor without its pixel storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectInfo {
    Pen(Pen),
    Brush(Brush),
    Font(Font),
    Bitmap {
        width: i32,
        height: i32,
        planes: u8,
        bits_per_pixel: u8,
    },
}

impl From<&GdiObject> for ObjectInfo {
    fn from(object: &GdiObject) -> Self {
        match object {
            GdiObject::Pen(pen) => ObjectInfo::Pen(*pen),
            GdiObject::Brush(brush) => ObjectInfo::Brush(*brush),
            GdiObject::Font(font) => ObjectInfo::Font(font.clone()),
            GdiObject::Bitmap(bitmap) => ObjectInfo::Bitmap {
                width: bitmap.width(),
                height: bitmap.height(),
                planes: bitmap.planes,
                bits_per_pixel: bitmap.bits_per_pixel,
            },
        }
    }
}

/// Truncate `name` to at most `FACE_NAME_MAX` bytes on a char boundary.
pub fn truncate_face_name(name: &str) -> String {
    if name.len() <= FACE_NAME_MAX {
        return name.to_string();
    }
    let mut end = FACE_NAME_MAX;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// Fixed-capacity table of live graphics objects.
#[derive(Debug)]
pub struct ObjectTable {
    table: HandleTable<GdiObject>,
}

impl ObjectTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            table: HandleTable::new(TableKind::Object, capacity),
        }
    }

    pub fn insert(&mut self, object: GdiObject) -> GdiResult<HGdiObj> {
        let kind = object.kind();
        let handle = HGdiObj(self.table.insert(object)?);
        log::debug!("created {:?} object {}", kind, handle);
        Ok(handle)
    }

    pub fn get(&self, handle: HGdiObj) -> Option<&GdiObject> {
        self.table.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: HGdiObj) -> Option<&mut GdiObject> {
        self.table.get_mut(handle.0)
    }

    /// Resolve a handle, distinguishing the null sentinel from a miss.
    pub fn resolve(&self, handle: HGdiObj) -> GdiResult<&GdiObject> {
        if handle.is_null() {
            return Err(GdiError::BadHandle);
        }
        self.get(handle)
            .ok_or_else(|| GdiError::object_not_found(handle))
    }

    pub fn resolve_mut(&mut self, handle: HGdiObj) -> GdiResult<&mut GdiObject> {
        if handle.is_null() {
            return Err(GdiError::BadHandle);
        }
        self.get_mut(handle)
            .ok_or_else(|| GdiError::object_not_found(handle))
    }

    /// Remove an object. Dropping a `Bitmap` releases its pixel storage.
    pub fn remove(&mut self, handle: HGdiObj) -> GdiResult<GdiObject> {
        if handle.is_null() {
            return Err(GdiError::BadHandle);
        }
        let object = self
            .table
            .remove(handle.0)
            .ok_or_else(|| GdiError::object_not_found(handle))?;
        log::debug!("deleted {:?} object {}", object.kind(), handle);
        Ok(object)
    }

    /// Pen for a possibly stale selection.
    pub fn pen(&self, handle: HGdiObj) -> Option<&Pen> {
        match self.get(handle) {
            Some(GdiObject::Pen(pen)) => Some(pen),
            _ => None,
        }
    }

    pub fn brush(&self, handle: HGdiObj) -> Option<&Brush> {
        match self.get(handle) {
            Some(GdiObject::Brush(brush)) => Some(brush),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
