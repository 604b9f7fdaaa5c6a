use super::*;

const BLUE: [u8; 4] = [0, 0, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn body() -> RasterImage {
    RasterImage::solid(100, 100, BLUE).unwrap()
}

fn checker(w: u32, h: u32) -> RasterImage {
    let mut buf = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 30 } else { 220 };
            buf.extend_from_slice(&[v, 255 - v, (x * 7) as u8, 255]);
        }
    }
    RasterImage::from_rgba8(w, h, buf).unwrap()
}

#[test]
fn body_only_at_stage_size_is_an_exact_copy() {
    let b = checker(17, 9);
    let out = flatten(&b, b.size(), 1.0, None).unwrap();
    assert_eq!(out, b);
}

#[test]
fn body_only_scaled_matches_a_plain_resample() {
    let b = checker(16, 10);
    let out = flatten(&b, b.size(), 2.0, None).unwrap();
    assert_eq!((out.width(), out.height()), (32, 20));

    let expected = image::imageops::resize(
        &b.to_rgba_image().unwrap(),
        32,
        20,
        image::imageops::FilterType::Triangle,
    );
    assert_eq!(out.as_rgba8(), expected.as_raw().as_slice());
}

#[test]
fn identity_placement_centres_the_overlay() {
    let design = RasterImage::solid(10, 10, RED).unwrap();
    let placement = PlacementState::IDENTITY;
    let out = flatten(
        &body(),
        body().size(),
        1.0,
        Some(Overlay {
            image: &design,
            placement: &placement,
        }),
    )
    .unwrap();
    assert_eq!(out.pixel_at(50, 50), Some(RED));
    assert_eq!(out.pixel_at(45, 45), Some(RED));
    assert_eq!(out.pixel_at(54, 54), Some(RED));
    assert_eq!(out.pixel_at(40, 50), Some(BLUE));
    assert_eq!(out.pixel_at(0, 0), Some(BLUE));
}

#[test]
fn offset_is_scaled_with_the_output() {
    let design = RasterImage::solid(10, 10, RED).unwrap();
    let placement = PlacementState {
        x: 30.0,
        ..PlacementState::IDENTITY
    };
    let overlay = Overlay {
        image: &design,
        placement: &placement,
    };

    let out = flatten(&body(), body().size(), 1.0, Some(overlay)).unwrap();
    assert_eq!(out.pixel_at(80, 50), Some(RED));
    assert_eq!(out.pixel_at(50, 50), Some(BLUE));

    let out = flatten(&body(), body().size(), 2.0, Some(overlay)).unwrap();
    assert_eq!((out.width(), out.height()), (200, 200));
    assert_eq!(out.pixel_at(160, 100), Some(RED));
    assert_eq!(out.pixel_at(100, 100), Some(BLUE));
    // 10 px design at scale 1 and output_scale 2 spans 20 px.
    assert_eq!(out.pixel_at(151, 100), Some(RED));
    assert_eq!(out.pixel_at(145, 100), Some(BLUE));
}

#[test]
fn rotation_turns_a_bar_upright() {
    let design = RasterImage::solid(20, 4, RED).unwrap();
    let placement = PlacementState {
        rotate_deg: 90.0,
        ..PlacementState::IDENTITY
    };
    let out = flatten(
        &body(),
        body().size(),
        1.0,
        Some(Overlay {
            image: &design,
            placement: &placement,
        }),
    )
    .unwrap();
    assert_eq!(out.pixel_at(50, 42), Some(RED));
    assert_eq!(out.pixel_at(50, 57), Some(RED));
    assert_eq!(out.pixel_at(58, 50), Some(BLUE));
}

#[test]
fn transparent_overlay_pixels_leave_the_body_alone() {
    let design = RasterImage::solid(30, 30, [255, 255, 255, 0]).unwrap();
    let placement = PlacementState::IDENTITY;
    let b = checker(64, 48);
    let out = flatten(
        &b,
        b.size(),
        1.0,
        Some(Overlay {
            image: &design,
            placement: &placement,
        }),
    )
    .unwrap();
    assert_eq!(out, b);
}

#[test]
fn overlay_outside_the_output_is_skipped() {
    let design = RasterImage::solid(10, 10, RED).unwrap();
    let placement = PlacementState {
        x: 500.0,
        ..PlacementState::IDENTITY
    };
    let out = flatten(
        &body(),
        body().size(),
        1.0,
        Some(Overlay {
            image: &design,
            placement: &placement,
        }),
    )
    .unwrap();
    assert_eq!(out, body());
}

#[test]
fn bad_output_scales_are_render_failures() {
    for s in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(
            matches!(
                flatten(&body(), body().size(), s, None),
                Err(ImageError::RenderFailure(_))
            ),
            "scale {s}"
        );
    }
}

#[test]
fn oversized_output_is_shrunk_to_the_maximum_side() {
    let body = RasterImage::solid(8, 2, BLUE).unwrap();
    let stage = PixelSize::new(10_000, 40).unwrap();
    let out = flatten(&body, stage, 2.0, None).unwrap();
    // 40 * 16384 / 10000 = 65.536
    assert_eq!((out.width(), out.height()), (MAX_OUTPUT_SIDE, 66));
    assert_eq!(out.pixel_at(MAX_OUTPUT_SIDE - 1, 65), Some(BLUE));
}
