use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_pixels() {
    let bytes = png_bytes(3, 2, [100, 50, 200, 128]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (3, 2));
    assert_eq!(img.pixel_at(2, 1), Some([100, 50, 200, 128]));
}

#[test]
fn decode_garbage_is_a_decode_failure() {
    assert!(matches!(
        decode_image(b"definitely not an image"),
        Err(ImageError::DecodeFailure(_))
    ));
}

#[test]
fn validation_checks_type_then_size() {
    let ok = ImageFile::new("a.png", "image/png", vec![0; 10]);
    validate_image_file(&ok, 10).unwrap();

    let too_big = ImageFile::new("a.png", "image/png", vec![0; 11]);
    assert!(matches!(
        validate_image_file(&too_big, 10),
        Err(ImageError::InvalidOrTooLarge(_))
    ));

    let not_image = ImageFile::new("a.txt", "text/plain", vec![0; 1]);
    assert!(matches!(
        validate_image_file(&not_image, 10),
        Err(ImageError::InvalidOrTooLarge(_))
    ));
}

#[test]
fn fit_within_caps_the_longest_side() {
    let s = |w, h| PixelSize::new(w, h).unwrap();
    assert_eq!(fit_within(s(2000, 1000), 1200), s(1200, 600));
    assert_eq!(fit_within(s(1000, 3000), 1200), s(400, 1200));
    assert_eq!(fit_within(s(800, 600), 1200), s(800, 600));
    assert_eq!(fit_within(s(5000, 1), 1200), s(1200, 1));
}

#[test]
fn prepare_design_downscales_and_encodes() {
    let file = ImageFile::new("d.png", "image/png", png_bytes(2400, 600, [0, 0, 0, 255]));
    let prepared = prepare_design(&file, &CompositorConfig::default()).unwrap();
    assert_eq!(
        (prepared.original.width(), prepared.original.height()),
        (1200, 300)
    );
    assert_eq!(prepared.rendered.size(), prepared.original.size());
}

#[test]
fn prepare_body_keeps_full_resolution() {
    let file = ImageFile::new("b.png", "image/png", png_bytes(1600, 20, [9, 9, 9, 255]));
    let body = prepare_body(&file, &CompositorConfig::default()).unwrap();
    assert_eq!((body.width(), body.height()), (1600, 20));
}

#[test]
fn from_path_derives_mime_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("body.png");
    std::fs::write(&path, png_bytes(1, 1, [1, 1, 1, 255])).unwrap();
    let file = ImageFile::from_path(&path).unwrap();
    assert_eq!(file.mime, "image/png");
    assert_eq!(file.name, "body.png");

    let odd = dir.path().join("notes.unknownext");
    std::fs::write(&odd, b"x").unwrap();
    let file = ImageFile::from_path(&odd).unwrap();
    assert!(!file.mime.starts_with("image/"));
}
