//! Device contexts and their fixed-capacity table.

use super::error::{GdiError, GdiResult, TableKind};
use super::objects::ObjectKind;
use super::surface::PixelBuffer;
use super::table::HandleTable;
use super::types::{BkMode, ColorRef, HGdiObj, Hdc, Point, WindowId};

/// Handles currently selected into a DC. Any of them may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub pen: HGdiObj,
    pub brush: HGdiObj,
    pub font: HGdiObj,
    pub bitmap: HGdiObj,
}

impl Selection {
    pub fn get(&self, kind: ObjectKind) -> HGdiObj {
        match kind {
            ObjectKind::Pen => self.pen,
            ObjectKind::Brush => self.brush,
            ObjectKind::Font => self.font,
            ObjectKind::Bitmap => self.bitmap,
        }
    }

    /// Overwrite the slot for `kind`, returning what it held.
    pub fn replace(&mut self, kind: ObjectKind, handle: HGdiObj) -> HGdiObj {
        let slot = match kind {
            ObjectKind::Pen => &mut self.pen,
            ObjectKind::Brush => &mut self.brush,
            ObjectKind::Font => &mut self.font,
            ObjectKind::Bitmap => &mut self.bitmap,
        };
        std::mem::replace(slot, handle)
    }
}

#[derive(Debug)]
pub struct DeviceContext {
    pub window: WindowId,
    pub position: Point,
    pub selection: Selection,
    pub text_color: ColorRef,
    pub bk_color: ColorRef,
    pub bk_mode: BkMode,
    pub painting: bool,
    /// Present only for memory DCs; otherwise drawing targets the screen.
    pub surface: Option<PixelBuffer>,
}

impl DeviceContext {
    pub fn new(window: WindowId) -> Self {
        Self {
            window,
            position: Point::default(),
            selection: Selection::default(),
            text_color: ColorRef::WHITE,
            bk_color: ColorRef::BLACK,
            bk_mode: BkMode::Opaque,
            painting: false,
            surface: None,
        }
    }

    pub fn is_memory(&self) -> bool {
        self.surface.is_some()
    }
}

#[derive(Debug)]
pub struct DcTable {
    table: HandleTable<DeviceContext>,
}

impl DcTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            table: HandleTable::new(TableKind::DeviceContext, capacity),
        }
    }

    pub fn insert(&mut self, dc: DeviceContext) -> GdiResult<Hdc> {
        let window = dc.window;
        let hdc = Hdc(self.table.insert(dc)?);
        log::debug!("allocated {} for window {}", hdc, window);
        Ok(hdc)
    }

    pub fn resolve(&self, hdc: Hdc) -> GdiResult<&DeviceContext> {
        if hdc.is_null() {
            return Err(GdiError::BadHandle);
        }
        self.table
            .get(hdc.0)
            .ok_or_else(|| GdiError::dc_not_found(hdc))
    }

    pub fn resolve_mut(&mut self, hdc: Hdc) -> GdiResult<&mut DeviceContext> {
        if hdc.is_null() {
            return Err(GdiError::BadHandle);
        }
        self.table
            .get_mut(hdc.0)
            .ok_or_else(|| GdiError::dc_not_found(hdc))
    }

    /// Free the slot; any private surface is dropped with it.
    pub fn remove(&mut self, hdc: Hdc) -> GdiResult<DeviceContext> {
        if hdc.is_null() {
            return Err(GdiError::BadHandle);
        }
        let dc = self
            .table
            .remove(hdc.0)
            .ok_or_else(|| GdiError::dc_not_found(hdc))?;
        log::debug!("released {} (memory: {})", hdc, dc.is_memory());
        Ok(dc)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
