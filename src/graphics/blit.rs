//! Block-transfer engine.
//!
//! A transfer runs in two phases: the source pixel for every visible
//! destination pixel is sampled first, then each sample is combined with the
//! destination and the pattern byte through a [`RasterOp`]. Sampling before
//! writing lets a DC blit onto itself (or two screen DCs share the
//! framebuffer) with copy semantics and no aliasing.

use super::surface::PixelBuffer;

pub const SRCCOPY: u32 = 0x00CC_0020;
pub const SRCPAINT: u32 = 0x00EE_0086;
pub const SRCAND: u32 = 0x0088_00C6;
pub const SRCINVERT: u32 = 0x0066_0046;
pub const SRCERASE: u32 = 0x0044_0328;
pub const NOTSRCCOPY: u32 = 0x0033_0008;
pub const MERGEPAINT: u32 = 0x00BB_0226;
pub const PATCOPY: u32 = 0x00F0_0021;
pub const PATINVERT: u32 = 0x005A_0049;
pub const DSTINVERT: u32 = 0x0055_0009;
pub const BLACKNESS: u32 = 0x0000_0042;
pub const WHITENESS: u32 = 0x00FF_0062;

/// Ternary raster operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterOp {
    SrcCopy,
    SrcPaint,
    SrcAnd,
    SrcInvert,
    SrcErase,
    NotSrcCopy,
    MergePaint,
    PatCopy,
    PatInvert,
    DstInvert,
    Blackness,
    Whiteness,
    /// Unrecognized code; combines like `SrcCopy`.
    Unknown(u32),
}

impl RasterOp {
    pub fn from_code(code: u32) -> Self {
        match code {
            SRCCOPY => RasterOp::SrcCopy,
            SRCPAINT => RasterOp::SrcPaint,
            SRCAND => RasterOp::SrcAnd,
            SRCINVERT => RasterOp::SrcInvert,
            SRCERASE => RasterOp::SrcErase,
            NOTSRCCOPY => RasterOp::NotSrcCopy,
            MERGEPAINT => RasterOp::MergePaint,
            PATCOPY => RasterOp::PatCopy,
            PATINVERT => RasterOp::PatInvert,
            DSTINVERT => RasterOp::DstInvert,
            BLACKNESS => RasterOp::Blackness,
            WHITENESS => RasterOp::Whiteness,
            other => RasterOp::Unknown(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            RasterOp::SrcCopy => SRCCOPY,
            RasterOp::SrcPaint => SRCPAINT,
            RasterOp::SrcAnd => SRCAND,
            RasterOp::SrcInvert => SRCINVERT,
            RasterOp::SrcErase => SRCERASE,
            RasterOp::NotSrcCopy => NOTSRCCOPY,
            RasterOp::MergePaint => MERGEPAINT,
            RasterOp::PatCopy => PATCOPY,
            RasterOp::PatInvert => PATINVERT,
            RasterOp::DstInvert => DSTINVERT,
            RasterOp::Blackness => BLACKNESS,
            RasterOp::Whiteness => WHITENESS,
            RasterOp::Unknown(code) => code,
        }
    }

    /// Whether the result depends on the source pixel.
    pub fn uses_source(self) -> bool {
        !matches!(
            self,
            RasterOp::PatCopy
                | RasterOp::PatInvert
                | RasterOp::DstInvert
                | RasterOp::Blackness
                | RasterOp::Whiteness
        )
    }

    /// Combine destination `d`, source `s` and pattern `p`.
    #[inline]
    pub fn apply(self, d: u8, s: u8, p: u8) -> u8 {
        match self {
            RasterOp::SrcCopy => s,
            RasterOp::SrcPaint => d | s,
            RasterOp::SrcAnd => d & s,
            RasterOp::SrcInvert => d ^ s,
            RasterOp::SrcErase => s & !d,
            RasterOp::NotSrcCopy => !s,
            RasterOp::MergePaint => !s | d,
            RasterOp::PatCopy => p,
            RasterOp::PatInvert => d ^ p,
            RasterOp::DstInvert => !d,
            RasterOp::Blackness => 0x00,
            RasterOp::Whiteness => 0xFF,
            RasterOp::Unknown(_) => s,
        }
    }
}

impl From<u32> for RasterOp {
    fn from(code: u32) -> Self {
        RasterOp::from_code(code)
    }
}

/// Destination rectangle after clipping to the destination buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitRegion {
    /// Unclipped destination origin.
    pub origin_x: i32,
    pub origin_y: i32,
    /// Clipped destination span, `[x0, x1) x [y0, y1)`.
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BlitRegion {
    /// Clip `w x h` at (`x`, `y`) to a `dst_width x dst_height` buffer.
    /// `None` when nothing is visible or the size is non-positive.
    pub fn clip(dst_width: i32, dst_height: i32, x: i32, y: i32, w: i32, h: i32) -> Option<Self> {
        if w <= 0 || h <= 0 {
            return None;
        }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x as i64 + w as i64).min(dst_width as i64) as i32;
        let y1 = (y as i64 + h as i64).min(dst_height as i64) as i32;
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Self {
            origin_x: x,
            origin_y: y,
            x0,
            y0,
            x1,
            y1,
        })
    }

    pub fn width(&self) -> usize {
        (self.x1 - self.x0) as usize
    }

    pub fn height(&self) -> usize {
        (self.y1 - self.y0) as usize
    }
}

/// Maps a destination offset to a source coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMap {
    pub x: i32,
    pub y: i32,
    pub src_width: i32,
    pub src_height: i32,
    pub dst_width: i32,
    pub dst_height: i32,
}

impl SourceMap {
    /// 1:1 mapping used by `bitblt`.
    pub fn identity(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            src_width: 1,
            src_height: 1,
            dst_width: 1,
            dst_height: 1,
        }
    }

    /// Nearest-neighbour mapping used by `stretchblt`.
    pub fn scaled(x: i32, y: i32, src_width: i32, src_height: i32, dst_width: i32, dst_height: i32) -> Self {
        Self {
            x,
            y,
            src_width,
            src_height,
            dst_width,
            dst_height,
        }
    }

    /// Source coordinate for destination offset (`ix`, `iy`).
    #[inline]
    pub fn map(&self, ix: i64, iy: i64) -> (i64, i64) {
        let offset_x = if self.src_width > 0 {
            ix * self.src_width as i64 / self.dst_width as i64
        } else {
            0
        };
        let offset_y = if self.src_height > 0 {
            iy * self.src_height as i64 / self.dst_height as i64
        } else {
            0
        };
        (self.x as i64 + offset_x, self.y as i64 + offset_y)
    }
}

/// Sample the source pixel for every pixel of `region`, row-major.
///
/// Missing sources and out-of-range coordinates sample as 0.
pub fn sample(src: Option<&PixelBuffer>, region: &BlitRegion, map: &SourceMap, op: RasterOp) -> Vec<u8> {
    let mut samples = vec![0u8; region.width() * region.height()];
    let src = match src {
        Some(src) if op.uses_source() => src,
        _ => return samples,
    };

    let mut i = 0;
    for y in region.y0..region.y1 {
        let iy = (y - region.origin_y) as i64;
        for x in region.x0..region.x1 {
            let ix = (x - region.origin_x) as i64;
            let (sx, sy) = map.map(ix, iy);
            if let (Ok(sx), Ok(sy)) = (i32::try_from(sx), i32::try_from(sy)) {
                samples[i] = src.get(sx, sy).unwrap_or(0);
            }
            i += 1;
        }
    }
    samples
}

/// Write `op(dest, sample, pattern)` over `region`.
pub fn combine(dst: &mut PixelBuffer, region: &BlitRegion, samples: &[u8], op: RasterOp, pattern: u8) {
    let mut i = 0;
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            if let Some(d) = dst.get(x, y) {
                dst.put(x, y, op.apply(d, samples[i], pattern));
            }
            i += 1;
        }
    }
}

/// 1:1 transfer between two distinct buffers.
#[allow(clippy::too_many_arguments)]
pub fn bit_blt(
    dst: &mut PixelBuffer,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    src: Option<&PixelBuffer>,
    sx: i32,
    sy: i32,
    op: RasterOp,
    pattern: u8,
) {
    if let Some(region) = BlitRegion::clip(dst.width(), dst.height(), x, y, w, h) {
        let samples = sample(src, &region, &SourceMap::identity(sx, sy), op);
        combine(dst, &region, &samples, op, pattern);
    }
}

/// Nearest-neighbour scaled transfer between two distinct buffers.
#[allow(clippy::too_many_arguments)]
pub fn stretch_blt(
    dst: &mut PixelBuffer,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    src: Option<&PixelBuffer>,
    sx: i32,
    sy: i32,
    sw: i32,
    sh: i32,
    op: RasterOp,
    pattern: u8,
) {
    if let Some(region) = BlitRegion::clip(dst.width(), dst.height(), x, y, w, h) {
        let map = SourceMap::scaled(sx, sy, sw, sh, w, h);
        let samples = sample(src, &region, &map, op);
        combine(dst, &region, &samples, op, pattern);
    }
}

/// Pattern fill: a transfer whose source is always 0.
pub fn pat_blt(dst: &mut PixelBuffer, x: i32, y: i32, w: i32, h: i32, op: RasterOp, pattern: u8) {
    bit_blt(dst, x, y, w, h, None, 0, 0, op, pattern);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn filled(width: i32, height: i32, value: u8) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height).unwrap();
        buffer.fill(value);
        buffer
    }

    #[rstest]
    #[case(SRCCOPY, 0xF0, 0x0F, 0x0F)]
    #[case(SRCPAINT, 0xF0, 0x0F, 0xFF)]
    #[case(SRCAND, 0xF0, 0x0F, 0x00)]
    #[case(SRCAND, 0xFC, 0x3F, 0x3C)]
    #[case(SRCINVERT, 0xFF, 0x0F, 0xF0)]
    #[case(BLACKNESS, 0xAB, 0xCD, 0x00)]
    #[case(WHITENESS, 0xAB, 0xCD, 0xFF)]
    #[case(PATCOPY, 0xAB, 0xCD, 0x5A)]
    #[case(NOTSRCCOPY, 0x00, 0x0F, 0xF0)]
    #[case(DSTINVERT, 0x0F, 0x33, 0xF0)]
    #[case(SRCERASE, 0x0F, 0xFF, 0xF0)]
    #[case(MERGEPAINT, 0x01, 0xFF, 0x01)]
    #[case(PATINVERT, 0xFF, 0x00, 0xA5)]
    #[case(0x1234_5678, 0x11, 0x22, 0x22)]
    fn test_rop_table(#[case] code: u32, #[case] d: u8, #[case] s: u8, #[case] expected: u8) {
        assert_eq!(RasterOp::from_code(code).apply(d, s, 0x5A), expected);
    }

    #[test]
    fn test_code_round_trip_for_known_ops() {
        for code in [SRCCOPY, SRCPAINT, SRCAND, SRCINVERT, PATCOPY, BLACKNESS, WHITENESS] {
            assert_eq!(RasterOp::from_code(code).code(), code);
        }
        assert_eq!(RasterOp::from_code(7), RasterOp::Unknown(7));
    }

    #[test]
    fn test_clip_region() {
        assert_eq!(BlitRegion::clip(10, 10, 0, 0, 0, 5), None);
        assert_eq!(BlitRegion::clip(10, 10, 10, 0, 5, 5), None);
        let region = BlitRegion::clip(10, 10, -2, 8, 5, 5).unwrap();
        assert_eq!((region.x0, region.y0, region.x1, region.y1), (0, 8, 3, 10));
        assert_eq!(region.width() * region.height(), 6);
    }

    #[test]
    fn test_bit_blt_copies_with_offset() {
        let mut src = PixelBuffer::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                src.put(x, y, (y * 4 + x) as u8);
            }
        }
        let mut dst = PixelBuffer::new(4, 4).unwrap();
        bit_blt(&mut dst, 1, 1, 2, 2, Some(&src), 2, 2, RasterOp::SrcCopy, 0);
        assert_eq!(dst.get(1, 1), Some(10));
        assert_eq!(dst.get(2, 1), Some(11));
        assert_eq!(dst.get(1, 2), Some(14));
        assert_eq!(dst.get(2, 2), Some(15));
        assert_eq!(dst.get(0, 0), Some(0));
    }

    #[test]
    fn test_bit_blt_source_out_of_range_reads_zero() {
        let src = filled(2, 2, 9);
        let mut dst = filled(4, 1, 7);
        bit_blt(&mut dst, 0, 0, 4, 1, Some(&src), 0, 0, RasterOp::SrcCopy, 0);
        assert_eq!(dst.as_bytes(), &[9, 9, 0, 0]);
    }

    #[test]
    fn test_stretch_blt_scale_down() {
        let mut src = PixelBuffer::new(10, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                src.put(x, y, (y * 10 + x) as u8);
            }
        }
        let mut dst = PixelBuffer::new(5, 5).unwrap();
        stretch_blt(&mut dst, 0, 0, 5, 5, Some(&src), 0, 0, 10, 10, RasterOp::SrcCopy, 0);
        for iy in 0..5 {
            for ix in 0..5 {
                assert_eq!(dst.get(ix, iy), src.get(ix * 2, iy * 2));
            }
        }
    }

    #[test]
    fn test_stretch_blt_scale_up() {
        let src = PixelBuffer::with_data(2, 1, &[3, 4]).unwrap();
        let mut dst = PixelBuffer::new(4, 2).unwrap();
        stretch_blt(&mut dst, 0, 0, 4, 2, Some(&src), 0, 0, 2, 1, RasterOp::SrcCopy, 0);
        assert_eq!(dst.as_bytes(), &[3, 3, 4, 4, 3, 3, 4, 4]);
    }

    #[test]
    fn test_stretch_blt_zero_source_size_repeats_origin() {
        let src = PixelBuffer::with_data(2, 2, &[6, 7, 8, 9]).unwrap();
        let mut dst = PixelBuffer::new(3, 1).unwrap();
        stretch_blt(&mut dst, 0, 0, 3, 1, Some(&src), 1, 1, 0, 0, RasterOp::SrcCopy, 0);
        assert_eq!(dst.as_bytes(), &[9, 9, 9]);
    }

    #[test]
    fn test_stretch_blt_non_positive_destination_is_noop() {
        let src = filled(2, 2, 5);
        let mut dst = filled(2, 2, 1);
        stretch_blt(&mut dst, 0, 0, 0, 2, Some(&src), 0, 0, 2, 2, RasterOp::SrcCopy, 0);
        stretch_blt(&mut dst, 0, 0, 2, -1, Some(&src), 0, 0, 2, 2, RasterOp::SrcCopy, 0);
        assert_eq!(dst.as_bytes(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_pat_blt() {
        let mut dst = filled(3, 3, 0xF0);
        pat_blt(&mut dst, 0, 0, 2, 2, RasterOp::PatCopy, 0x22);
        assert_eq!(dst.get(1, 1), Some(0x22));
        assert_eq!(dst.get(2, 2), Some(0xF0));

        pat_blt(&mut dst, 0, 0, 3, 3, RasterOp::SrcAnd, 0x22);
        assert!(dst.as_bytes().iter().all(|b| *b == 0));
    }
}
