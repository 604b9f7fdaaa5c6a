use super::*;

fn gradient(w: u32, h: u32) -> RasterImage {
    let mut buf = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            buf.extend_from_slice(&[x as u8, y as u8, 7, 255]);
        }
    }
    RasterImage::from_rgba8(w, h, buf).unwrap()
}

#[test]
fn from_rgba8_checks_length_and_size() {
    assert!(RasterImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(RasterImage::from_rgba8(0, 2, vec![]).is_err());
    let img = RasterImage::from_rgba8(2, 2, vec![0; 16]).unwrap();
    assert_eq!(img.pixel_count(), 4);
}

#[test]
fn pixel_access_by_index_and_coords_agree() {
    let img = gradient(5, 3);
    assert_eq!(img.pixel_at(4, 2), Some([4, 2, 7, 255]));
    assert_eq!(img.pixel(2 * 5 + 4), img.pixel_at(4, 2));
    assert_eq!(img.pixel_at(5, 0), None);
    assert_eq!(img.pixel(15), None);
}

#[test]
fn crop_copies_the_requested_window() {
    let img = gradient(6, 4);
    let c = img
        .crop(PixelRect {
            x: 2,
            y: 1,
            width: 3,
            height: 2,
        })
        .unwrap();
    assert_eq!((c.width(), c.height()), (3, 2));
    assert_eq!(c.pixel_at(0, 0), Some([2, 1, 7, 255]));
    assert_eq!(c.pixel_at(2, 1), Some([4, 2, 7, 255]));
}

#[test]
fn crop_outside_bounds_is_rejected() {
    let img = gradient(4, 4);
    let r = PixelRect {
        x: 3,
        y: 0,
        width: 2,
        height: 1,
    };
    assert!(img.crop(r).is_err());
}

#[test]
fn clones_share_the_buffer() {
    let img = RasterImage::solid(3, 3, [1, 2, 3, 4]).unwrap();
    let copy = img.clone();
    assert!(std::ptr::eq(img.as_rgba8(), copy.as_rgba8()));
    assert_eq!(img.transparent_count(), 0);
}
