//! Single-byte indexed-color pixel storage.
//!
//! A `PixelBuffer` backs the screen framebuffer, every memory DC and every
//! bitmap object. Rows are stored top to bottom, one byte per pixel.

use super::error::{GdiError, GdiResult};

#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: i32,
    height: i32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer.
    ///
    /// Uses a fallible reservation so an oversized request is reported as
    /// `OutOfMemory` rather than aborting the process.
    pub fn new(width: i32, height: i32) -> GdiResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(GdiError::InvalidArgument(format!(
                "pixel buffer dimensions {}x{} must be positive",
                width, height
            )));
        }
        let len = width as usize * height as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| GdiError::OutOfMemory { bytes: len })?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Allocate and copy `initial` into the start of the buffer.
    ///
    /// Data beyond `width * height` is ignored; a short slice leaves the
    /// remainder zeroed.
    pub fn with_data(width: i32, height: i32, initial: &[u8]) -> GdiResult<Self> {
        let mut buffer = Self::new(width, height)?;
        buffer.load(initial);
        Ok(buffer)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Read a pixel, `None` outside the buffer.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if self.contains(x, y) {
            Some(self.data[self.offset(x, y)])
        } else {
            None
        }
    }

    /// Write a pixel; out-of-range coordinates are clipped silently.
    /// Returns whether the write landed.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, value: u8) -> bool {
        if self.contains(x, y) {
            let offset = self.offset(x, y);
            self.data[offset] = value;
            true
        } else {
            false
        }
    }

    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Copy up to `len()` bytes from `src`; returns the count copied.
    pub fn load(&mut self, src: &[u8]) -> usize {
        let count = src.len().min(self.data.len());
        self.data[..count].copy_from_slice(&src[..count]);
        count
    }

    /// Copy up to `len()` bytes into `dst`; returns the count copied.
    pub fn store(&self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.data.len());
        dst[..count].copy_from_slice(&self.data[..count]);
        count
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
