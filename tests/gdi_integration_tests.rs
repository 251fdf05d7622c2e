//! End-to-end tests for the GDI context: lifecycle, handle tables and
//! rendering through the public API.

use std::collections::HashSet;

use gdi16::config::GdiConfig;
use gdi16::graphics::blit::RasterOp;
use gdi16::graphics::glyphs::{glyph, glyph_bit, GLYPH_HEIGHT, GLYPH_WIDTH};
use gdi16::graphics::{
    BrushStyle, ColorRef, GdiContext, GdiError, HGdiObj, Hdc, ObjectInfo, ObjectKind, PenStyle,
    Point, Rect, TableKind,
};
use proptest::prelude::*;

fn small(width: i32, height: i32) -> GdiContext {
    GdiContext::init_with(GdiConfig::default().with_screen(width, height)).unwrap()
}

fn ascii(gdi: &GdiContext, hdc: Hdc, width: i16, height: i16) -> String {
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    if gdi.get_pixel(hdc, x, y) == ColorRef::from_index(0) {
                        '.'
                    } else {
                        '#'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn end_to_end_red_diagonal() {
    let mut gdi = GdiContext::init().unwrap();
    let hdc = gdi.get_dc(1).unwrap();
    assert_eq!(hdc, Hdc(1));

    let red = ColorRef::rgb(255, 0, 0);
    let pen = gdi.create_pen(PenStyle::Solid, 1, red).unwrap();
    assert_eq!(pen, HGdiObj(1));
    assert_eq!(gdi.select_object(hdc, pen).unwrap(), HGdiObj::NULL);

    gdi.move_to(hdc, 0, 0).unwrap();
    gdi.line_to(hdc, 5, 5).unwrap();
    for i in 0..=5 {
        assert_eq!(gdi.get_pixel(hdc, i, i), ColorRef::from_index(red.index()));
    }
    assert_eq!(gdi.get_pixel(hdc, 6, 6), ColorRef::from_index(0));
    assert_eq!(gdi.get_current_position(hdc).unwrap(), Point::new(5, 5));

    gdi.release_dc(1, hdc).unwrap();
    assert_eq!(
        gdi.release_dc(1, hdc),
        Err(GdiError::NotFound { handle: 1 })
    );
}

#[test]
fn dc_table_capacity_and_monotonic_handles() {
    let mut gdi = GdiContext::init().unwrap();
    let handles: Vec<Hdc> = (0..32).map(|_| gdi.get_dc(0).unwrap()).collect();
    assert_eq!(handles.first(), Some(&Hdc(1)));
    assert_eq!(handles.last(), Some(&Hdc(32)));
    assert_eq!(
        gdi.get_dc(0),
        Err(GdiError::CapacityExceeded {
            table: TableKind::DeviceContext
        })
    );

    gdi.release_dc(0, Hdc(7)).unwrap();
    assert_eq!(gdi.get_dc(0).unwrap(), Hdc(33));
}

#[test]
fn object_table_capacity() {
    let mut gdi = GdiContext::init_with(GdiConfig::default().with_screen(8, 8).with_capacities(2, 3))
        .unwrap();
    for _ in 0..3 {
        gdi.create_solid_brush(ColorRef::WHITE).unwrap();
    }
    let err = gdi.create_pen(PenStyle::Solid, 1, ColorRef::WHITE).unwrap_err();
    assert_eq!(err, GdiError::CapacityExceeded { table: TableKind::Object });
    assert_eq!(err.code(), -3);

    gdi.delete_object(HGdiObj(2)).unwrap();
    assert_eq!(gdi.create_font(8, 8, 400, "System").unwrap(), HGdiObj(4));
}

#[test]
fn teardown_is_safe() {
    let mut gdi = small(16, 16);
    let hdc = gdi.get_dc(1).unwrap();
    let brush = gdi.create_solid_brush(ColorRef::WHITE).unwrap();
    gdi.free();
    gdi.free();

    assert!(!gdi.is_initialized());
    assert_eq!(gdi.get_dc(1), Err(GdiError::NotInitialized));
    assert_eq!(gdi.release_dc(1, hdc), Err(GdiError::NotInitialized));
    assert_eq!(gdi.delete_object(brush), Err(GdiError::NotInitialized));
    assert_eq!(gdi.rectangle(hdc, 0, 0, 4, 4), Err(GdiError::NotInitialized));
    assert_eq!(
        gdi.bitblt(hdc, 0, 0, 4, 4, hdc, 0, 0, RasterOp::SrcCopy),
        Err(GdiError::NotInitialized)
    );
    assert_eq!(gdi.set_pixel(hdc, 0, 0, ColorRef::WHITE), ColorRef::INVALID);
    assert_eq!(gdi.get_pixel(hdc, 0, 0), ColorRef::INVALID);
    assert_eq!(gdi.screen().unwrap_err().code(), -2);
}

#[test]
fn handle_zero_is_rejected() {
    let mut gdi = small(16, 16);
    let hdc = gdi.get_dc(1).unwrap();
    assert_eq!(gdi.release_dc(1, Hdc::NULL), Err(GdiError::BadHandle));
    assert_eq!(gdi.select_object(hdc, HGdiObj::NULL), Err(GdiError::BadHandle));
    assert_eq!(gdi.delete_object(HGdiObj::NULL), Err(GdiError::BadHandle));
}

#[test]
fn select_object_tracks_slots_per_kind() {
    let mut gdi = small(16, 16);
    let hdc = gdi.get_dc(1).unwrap();
    let pen_a = gdi.create_pen(PenStyle::Solid, 1, ColorRef::WHITE).unwrap();
    let pen_b = gdi.create_pen(PenStyle::Dash, 1, ColorRef::WHITE).unwrap();
    let brush = gdi.create_solid_brush(ColorRef::BLACK).unwrap();

    assert_eq!(gdi.select_object(hdc, pen_a).unwrap(), HGdiObj::NULL);
    assert_eq!(gdi.select_object(hdc, brush).unwrap(), HGdiObj::NULL);
    assert_eq!(gdi.select_object(hdc, pen_b).unwrap(), pen_a);
    assert_eq!(gdi.get_current_object(hdc, ObjectKind::Pen).unwrap(), pen_b);
    assert_eq!(gdi.get_current_object(hdc, ObjectKind::Brush).unwrap(), brush);
    assert_eq!(gdi.get_current_object(hdc, ObjectKind::Font).unwrap(), HGdiObj::NULL);

    gdi.delete_object(brush).unwrap();
    assert_eq!(
        gdi.select_object(hdc, brush),
        Err(GdiError::NotFound { handle: brush.0 })
    );
}

#[test]
fn reselecting_returns_same_handle() {
    let mut gdi = small(8, 8);
    let hdc = gdi.get_dc(1).unwrap();
    let brush = gdi.create_solid_brush(ColorRef::WHITE).unwrap();
    gdi.select_object(hdc, brush).unwrap();
    assert_eq!(gdi.select_object(hdc, brush).unwrap(), brush);
}

#[test]
fn rectangle_interior_and_border() {
    let mut gdi = small(16, 16);
    let hdc = gdi.get_dc(1).unwrap();
    let pen = gdi.create_pen(PenStyle::Solid, 1, ColorRef::from_index(0xAA)).unwrap();
    let brush = gdi.create_solid_brush(ColorRef::from_index(0x55)).unwrap();
    gdi.select_object(hdc, pen).unwrap();
    gdi.select_object(hdc, brush).unwrap();
    gdi.rectangle(hdc, 0, 0, 10, 10).unwrap();
    for y in 1..9 {
        for x in 1..9 {
            assert_eq!(gdi.get_pixel(hdc, x, y), ColorRef::from_index(0x55));
        }
    }
    for i in 0..10 {
        assert_eq!(gdi.get_pixel(hdc, i, 0), ColorRef::from_index(0xAA));
        assert_eq!(gdi.get_pixel(hdc, i, 9), ColorRef::from_index(0xAA));
        assert_eq!(gdi.get_pixel(hdc, 0, i), ColorRef::from_index(0xAA));
        assert_eq!(gdi.get_pixel(hdc, 9, i), ColorRef::from_index(0xAA));
    }
    assert_eq!(gdi.get_pixel(hdc, 10, 10), ColorRef::from_index(0));
}

#[test]
fn stretchblt_scale_down_samples_every_other_pixel() {
    let mut gdi = small(16, 16);
    let screen = gdi.get_dc(1).unwrap();
    let mem = gdi.create_compatible_dc(Hdc::NULL).unwrap();
    for y in 0..10i16 {
        for x in 0..10i16 {
            gdi.set_pixel(mem, x, y, ColorRef::from_index((y * 10 + x) as u8));
        }
    }
    gdi.stretchblt(screen, 0, 0, 5, 5, mem, 0, 0, 10, 10, RasterOp::SrcCopy)
        .unwrap();
    for iy in 0..5i16 {
        for ix in 0..5i16 {
            let expected = (iy * 2 * 10 + ix * 2) as u8;
            assert_eq!(gdi.get_pixel(screen, ix, iy), ColorRef::from_index(expected));
        }
    }
}

#[test]
fn get_object_describes_font_and_bitmap() {
    let mut gdi = small(16, 16);
    let long_name = "A".repeat(40);
    let font = gdi.create_font(12, 6, 700, &long_name).unwrap();
    match gdi.get_object(font).unwrap() {
        ObjectInfo::Font(info) => {
            assert_eq!(info.height, 12);
            assert_eq!(info.weight, 700);
            assert_eq!(info.face_name.len(), 31);
        }
        other => panic!("expected a font, got {:?}", other),
    }

    let bitmap = gdi.create_bitmap(4, 3, 1, 8, None).unwrap();
    assert_eq!(
        gdi.get_object(bitmap).unwrap(),
        ObjectInfo::Bitmap {
            width: 4,
            height: 3,
            planes: 1,
            bits_per_pixel: 8
        }
    );
}

#[test]
fn rectangle_outline_and_fill() {
    let mut gdi = small(8, 8);
    let hdc = gdi.get_dc(1).unwrap();
    let pen = gdi.create_pen(PenStyle::Solid, 1, ColorRef::from_index(0x11)).unwrap();
    let brush = gdi.create_solid_brush(ColorRef::from_index(0x22)).unwrap();
    gdi.select_object(hdc, pen).unwrap();
    gdi.select_object(hdc, brush).unwrap();
    gdi.rectangle(hdc, 1, 1, 6, 5).unwrap();

    let expected = [
        "........",
        ".aaaaa..",
        ".abbba..",
        ".abbba..",
        ".aaaaa..",
        "........",
        "........",
        "........",
    ];
    for (y, row) in expected.iter().enumerate() {
        for (x, cell) in row.chars().enumerate() {
            let want = match cell {
                'a' => 0x11,
                'b' => 0x22,
                _ => 0,
            };
            assert_eq!(
                gdi.get_pixel(hdc, x as i16, y as i16),
                ColorRef::from_index(want),
                "pixel ({}, {})",
                x,
                y
            );
        }
    }
}

#[test]
fn ellipse_shape() {
    let mut gdi = small(11, 11);
    let hdc = gdi.get_dc(1).unwrap();
    gdi.ellipse(hdc, 0, 0, 10, 10).unwrap();
    insta::assert_snapshot!(ascii(&gdi, hdc, 11, 11), @r"
    ...#####...
    ..#.....#..
    .#.......#.
    #.........#
    #.........#
    #.........#
    #.........#
    #.........#
    .#.......#.
    ..#.....#..
    ...#####...
    ");
}

#[test]
fn null_pen_skips_outlines() {
    let mut gdi = small(16, 16);
    let hdc = gdi.get_dc(1).unwrap();
    let pen = gdi.create_pen(PenStyle::Null, 1, ColorRef::WHITE).unwrap();
    gdi.select_object(hdc, pen).unwrap();
    gdi.line_to(hdc, 10, 10).unwrap();
    gdi.polyline(hdc, &[Point::new(0, 3), Point::new(10, 3)]).unwrap();
    assert!(gdi.screen().unwrap().as_bytes().iter().all(|&p| p == 0));
    assert_eq!(gdi.get_current_position(hdc).unwrap(), Point::new(10, 10));
}

#[test]
fn polygon_closes_figure() {
    let mut gdi = small(8, 8);
    let hdc = gdi.get_dc(1).unwrap();
    let points = [Point::new(0, 0), Point::new(4, 0), Point::new(4, 4)];
    gdi.polyline(hdc, &points).unwrap();
    assert_eq!(gdi.get_pixel(hdc, 2, 2), ColorRef::from_index(0));
    gdi.polygon(hdc, &points).unwrap();
    assert_eq!(gdi.get_pixel(hdc, 2, 2), ColorRef::from_index(0xFF));
}

#[test]
fn text_out_draws_glyph_ink() {
    let mut gdi = small(32, 8);
    let hdc = gdi.get_dc(1).unwrap();
    gdi.set_text_color(hdc, ColorRef::from_index(0x7F)).unwrap();
    gdi.text_out(hdc, 0, 0, b"A\0B", Some(3)).unwrap();

    let a = glyph(b'A');
    let b = glyph(b'B');
    for row in 0..GLYPH_HEIGHT {
        for col in 0..GLYPH_WIDTH {
            let expect = |set: bool| ColorRef::from_index(if set { 0x7F } else { 0 });
            assert_eq!(
                gdi.get_pixel(hdc, col as i16, row as i16),
                expect(glyph_bit(a, col, row))
            );
            // NUL renders as a blank cell
            assert_eq!(gdi.get_pixel(hdc, (8 + col) as i16, row as i16), expect(false));
            assert_eq!(
                gdi.get_pixel(hdc, (16 + col) as i16, row as i16),
                expect(glyph_bit(b, col, row))
            );
        }
    }
}

#[test]
fn text_stops_at_nul_without_length() {
    let mut gdi = small(32, 8);
    let hdc = gdi.get_dc(1).unwrap();
    gdi.text_out(hdc, 0, 0, b"\0AB", None).unwrap();
    assert!(gdi.screen().unwrap().as_bytes().iter().all(|&p| p == 0));
    assert_eq!(gdi.get_text_extent(hdc, b"hello\0world", None).unwrap(), (40, 8));
    assert_eq!(gdi.get_text_extent(hdc, b"hello", Some(3)).unwrap(), (24, 8));
}

#[test]
fn bitblt_between_memory_dc_and_screen() {
    let mut gdi = small(16, 16);
    let screen = gdi.get_dc(1).unwrap();
    let mem = gdi.create_compatible_dc(screen).unwrap();
    gdi.set_pixel(mem, 0, 0, ColorRef::from_index(0x0F));
    gdi.set_pixel(mem, 1, 0, ColorRef::from_index(0xF0));
    gdi.set_pixel(screen, 10, 10, ColorRef::from_index(0x3C));

    gdi.bitblt(screen, 10, 10, 2, 1, mem, 0, 0, RasterOp::SrcInvert).unwrap();
    assert_eq!(gdi.get_pixel(screen, 10, 10), ColorRef::from_index(0x33));
    assert_eq!(gdi.get_pixel(screen, 11, 10), ColorRef::from_index(0xF0));

    // Off-screen destination is clipped without error.
    gdi.bitblt(screen, 15, 15, 4, 4, mem, 0, 0, RasterOp::SrcCopy).unwrap();
    assert_eq!(gdi.get_pixel(screen, 15, 15), ColorRef::from_index(0x0F));

    gdi.bitblt(screen, 0, 0, 2, 2, Hdc::NULL, 0, 0, RasterOp::Whiteness).unwrap();
    assert_eq!(gdi.get_pixel(screen, 1, 1), ColorRef::from_index(0xFF));

    assert_eq!(
        gdi.bitblt(screen, 0, 0, 2, 2, Hdc(99), 0, 0, RasterOp::SrcCopy),
        Err(GdiError::NotFound { handle: 99 })
    );
}

#[test]
fn stretchblt_doubles_source() {
    let mut gdi = small(8, 8);
    let screen = gdi.get_dc(1).unwrap();
    let mem = gdi.create_compatible_dc(Hdc::NULL).unwrap();
    gdi.set_pixel(mem, 0, 0, ColorRef::from_index(1));
    gdi.set_pixel(mem, 1, 0, ColorRef::from_index(2));
    gdi.set_pixel(mem, 0, 1, ColorRef::from_index(3));
    gdi.set_pixel(mem, 1, 1, ColorRef::from_index(4));

    gdi.stretchblt(screen, 0, 0, 4, 4, mem, 0, 0, 2, 2, RasterOp::SrcCopy)
        .unwrap();
    let expected = [[1, 1, 2, 2], [1, 1, 2, 2], [3, 3, 4, 4], [3, 3, 4, 4]];
    for (y, row) in expected.iter().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            assert_eq!(
                gdi.get_pixel(screen, x as i16, y as i16),
                ColorRef::from_index(value)
            );
        }
    }

    gdi.stretchblt(screen, 0, 0, 0, 4, mem, 0, 0, 2, 2, RasterOp::Blackness)
        .unwrap();
    assert_eq!(gdi.get_pixel(screen, 0, 0), ColorRef::from_index(1));
}

#[test]
fn patblt_with_hollow_brush_uses_its_color() {
    let mut gdi = small(8, 8);
    let hdc = gdi.get_dc(1).unwrap();
    let brush = gdi.create_brush(BrushStyle::Null, ColorRef::from_index(0x44)).unwrap();
    gdi.select_object(hdc, brush).unwrap();
    gdi.patblt(hdc, 0, 0, 2, 2, RasterOp::PatCopy).unwrap();
    assert_eq!(gdi.get_pixel(hdc, 1, 1), ColorRef::from_index(0x44));
}

#[test]
fn memory_dc_released_with_its_surface() {
    let mut gdi = small(8, 8);
    let mem = gdi.create_compatible_dc(Hdc::NULL).unwrap();
    gdi.release_dc(0, mem).unwrap();
    assert_eq!(gdi.get_dc_extent(mem), Err(GdiError::NotFound { handle: mem.0 }));
    assert_eq!(gdi.dc_count().unwrap(), 0);
}

#[test]
fn paint_session_lifecycle() {
    let mut gdi = small(8, 8);
    let paint = gdi.begin_paint(4).unwrap();
    assert!(gdi.is_painting(paint.hdc).unwrap());
    assert_eq!(gdi.get_window(paint.hdc).unwrap(), 4);
    assert_eq!(paint.update_rect, Rect::default());
    gdi.end_paint(4, &paint).unwrap();
    assert_eq!(
        gdi.end_paint(4, &paint),
        Err(GdiError::NotFound { handle: paint.hdc.0 })
    );
}

proptest! {
    #[test]
    fn pixel_round_trip(x in -20i16..40, y in -20i16..40, value in any::<u8>()) {
        let mut gdi = small(20, 20);
        let hdc = gdi.get_dc(1).unwrap();
        let written = gdi.set_pixel(hdc, x, y, ColorRef::from_index(value));
        let read = gdi.get_pixel(hdc, x, y);
        if (0..20).contains(&x) && (0..20).contains(&y) {
            prop_assert_eq!(written, ColorRef::from_index(value));
            prop_assert_eq!(read, ColorRef::from_index(value));
        } else {
            prop_assert_eq!(written, ColorRef::INVALID);
            prop_assert_eq!(read, ColorRef::INVALID);
        }
    }

    #[test]
    fn line_plots_both_endpoints(
        x0 in 0i16..24, y0 in 0i16..24, x1 in 0i16..24, y1 in 0i16..24,
    ) {
        let mut gdi = small(24, 24);
        let hdc = gdi.get_dc(1).unwrap();
        gdi.line(hdc, x0, y0, x1, y1, ColorRef::from_index(9)).unwrap();
        prop_assert_eq!(gdi.get_pixel(hdc, x0, y0), ColorRef::from_index(9));
        prop_assert_eq!(gdi.get_pixel(hdc, x1, y1), ColorRef::from_index(9));
        let lit = gdi.screen().unwrap().as_bytes().iter().filter(|&&p| p == 9).count();
        let span = (x1 - x0).unsigned_abs().max((y1 - y0).unsigned_abs()) as usize + 1;
        prop_assert_eq!(lit, span);
    }

    #[test]
    fn shapes_never_fail_off_screen(
        left in i16::MIN..i16::MAX, top in i16::MIN..i16::MAX,
        right in i16::MIN..i16::MAX, bottom in i16::MIN..i16::MAX,
    ) {
        let mut gdi = small(16, 16);
        let hdc = gdi.get_dc(1).unwrap();
        prop_assert!(gdi.rectangle(hdc, left, top, right, bottom).is_ok());
        prop_assert!(gdi.ellipse(hdc, left / 64, top / 64, right / 64, bottom / 64).is_ok());
        prop_assert!(gdi.patblt(hdc, left, top, right, bottom, RasterOp::PatInvert).is_ok());
    }

    #[test]
    fn live_object_handles_are_unique(ops in proptest::collection::vec(any::<bool>(), 1..64)) {
        let mut gdi = GdiContext::init_with(
            GdiConfig::default().with_screen(4, 4).with_capacities(1, 8),
        ).unwrap();
        let mut live: Vec<HGdiObj> = Vec::new();
        for create in ops {
            if create || live.is_empty() {
                match gdi.create_solid_brush(ColorRef::WHITE) {
                    Ok(handle) => {
                        prop_assert!(!live.contains(&handle));
                        prop_assert!(!handle.is_null());
                        live.push(handle);
                    }
                    Err(err) => {
                        prop_assert_eq!(live.len(), 8);
                        prop_assert_eq!(err.code(), -3);
                    }
                }
            } else if let Some(handle) = live.pop() {
                gdi.delete_object(handle).unwrap();
            }
        }
        let unique: HashSet<u16> = live.iter().map(|h| h.0).collect();
        prop_assert_eq!(unique.len(), live.len());
    }
}
