use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_zeroes_transparent_and_scales_partial() {
    let mut px = vec![100u8, 50, 200, 128, 9, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        &px[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
}

#[test]
fn unpremultiply_restores_opaque_and_approximates_partial() {
    let mut px = vec![10u8, 20, 30, 255, 64, 0, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
    assert!((i32::from(px[4]) - 128).abs() <= 1);
    assert_eq!(px[7], 128);
}
