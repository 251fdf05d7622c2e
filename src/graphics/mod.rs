//! Graphics device interface: device contexts, graphics objects, the
//! rasterizer and block transfers over 8-bit indexed framebuffers.

pub mod blit;
pub mod context;
pub mod dc;
pub mod error;
pub mod gdi_ffi;
pub mod glyphs;
pub mod objects;
pub mod raster;
pub mod surface;
pub mod table;
pub mod types;

pub use blit::RasterOp;
pub use context::GdiContext;
pub use error::{GdiError, GdiResult, TableKind};
pub use objects::{BrushStyle, ObjectInfo, ObjectKind, PenStyle};
pub use surface::PixelBuffer;
pub use types::{BkMode, ColorRef, HGdiObj, Hdc, PaintInfo, Point, Rect, WindowId};
