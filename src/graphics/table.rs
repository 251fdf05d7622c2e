//! Fixed-capacity handle table shared by the DC and object tables.
//!
//! Slots are found by linear scan and entries are looked up by handle, so a
//! handle stays valid regardless of which slot it landed in. Handles come
//! from a monotonically increasing 16-bit counter that skips zero and any
//! value still in use after wrapping.

use super::error::{GdiError, GdiResult, TableKind};

#[derive(Debug)]
struct Slot<T> {
    handle: u16,
    value: T,
}

#[derive(Debug)]
pub struct HandleTable<T> {
    kind: TableKind,
    slots: Vec<Option<Slot<T>>>,
    next_handle: u16,
}

impl<T> HandleTable<T> {
    pub fn new(kind: TableKind, capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            kind,
            slots,
            next_handle: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, handle: u16) -> Option<usize> {
        if handle == 0 {
            return None;
        }
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(s) if s.handle == handle))
    }

    pub fn contains(&self, handle: u16) -> bool {
        self.position(handle).is_some()
    }

    fn take_handle(&mut self) -> u16 {
        loop {
            let candidate = self.next_handle;
            self.next_handle = self.next_handle.wrapping_add(1);
            if self.next_handle == 0 {
                self.next_handle = 1;
            }
            if candidate != 0 && !self.contains(candidate) {
                return candidate;
            }
        }
    }

    /// Store `value` in the first free slot and return its new handle.
    pub fn insert(&mut self, value: T) -> GdiResult<u16> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(GdiError::CapacityExceeded { table: self.kind })?;
        let handle = self.take_handle();
        self.slots[index] = Some(Slot { handle, value });
        Ok(handle)
    }

    pub fn get(&self, handle: u16) -> Option<&T> {
        self.position(handle)
            .and_then(|i| self.slots[i].as_ref())
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: u16) -> Option<&mut T> {
        let index = self.position(handle)?;
        self.slots[index].as_mut().map(|s| &mut s.value)
    }

    /// Clear the slot holding `handle`, returning the stored value.
    pub fn remove(&mut self, handle: u16) -> Option<T> {
        let index = self.position(handle)?;
        self.slots[index].take().map(|s| s.value)
    }

}
