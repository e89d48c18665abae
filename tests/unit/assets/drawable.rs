use std::io::Cursor;

use super::*;

#[test]
fn decode_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let d = Drawable::decode(&buf).unwrap();
    assert_eq!((d.width(), d.height()), (1, 1));
    assert_eq!(
        d.pixel(0, 0).unwrap(),
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_svg_rasterizes_at_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"><rect width="4" height="2" fill="#ff0000"/></svg>"##;
    let d = Drawable::decode(svg).unwrap();
    assert_eq!((d.width(), d.height()), (4, 2));
    assert_eq!(d.pixel(1, 1).unwrap(), [255, 0, 0, 255]);

    assert!(Drawable::from_svg(b"<svg").is_err());
}

#[test]
fn solid_fills_every_pixel() {
    let d = Drawable::solid(3, 2, Color::rgb(1, 2, 3)).unwrap();
    assert_eq!(d.premul_bytes().len(), 3 * 2 * 4);
    assert_eq!(d.pixel(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(d.pixel(3, 0), None);
}

#[test]
fn byte_length_mismatch_is_rejected() {
    assert!(Drawable::from_rgba8(2, 2, vec![0; 4]).is_err());
    assert!(Drawable::from_premul_rgba8(0, 1, Vec::new()).is_err());
}

#[test]
fn clones_share_pixels() {
    let a = Drawable::solid(2, 2, Color::WHITE).unwrap();
    let b = a.clone();
    assert_eq!(a, b);
    assert!(std::ptr::eq(a.premul_bytes(), b.premul_bytes()));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(Drawable::decode(b"definitely not an image").is_err());
}
