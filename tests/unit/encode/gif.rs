use std::io::Cursor;

use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;

use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: false,
    }
}

fn decode(bytes: &[u8]) -> Vec<image::Frame> {
    GifDecoder::new(Cursor::new(bytes))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
}

#[test]
fn frames_round_trip_through_the_gif_stream() {
    let mut enc = ImageGifEncoder::new();
    enc.start(4, 4, QuantizeAlgorithm::Neuquant, false).unwrap();
    enc.set_frame_rate(25).unwrap();
    enc.add_frame(&solid(4, 4, [255, 0, 0, 255])).unwrap();
    enc.add_frame(&solid(4, 4, [0, 0, 255, 255])).unwrap();
    let bytes = enc.finish().unwrap();

    assert!(bytes.starts_with(b"GIF89a"));
    let frames = decode(&bytes);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].buffer().get_pixel(1, 1).0, [255, 0, 0, 255]);
    assert_eq!(frames[1].buffer().get_pixel(3, 0).0, [0, 0, 255, 255]);
    let (numer, denom) = frames[0].delay().numer_denom_ms();
    assert_eq!(numer / denom, 40);
}

#[test]
fn loop_extension_is_written_only_when_repeat_is_set() {
    let encode = |repeat: Option<Repeat>| {
        let mut enc = ImageGifEncoder::new();
        enc.start(2, 2, QuantizeAlgorithm::Neuquant, false).unwrap();
        if let Some(r) = repeat {
            enc.set_repeat(r).unwrap();
        }
        enc.add_frame(&solid(2, 2, [0, 255, 0, 255])).unwrap();
        enc.finish().unwrap()
    };
    let has_loop = |bytes: &[u8]| bytes.windows(11).any(|w| w == b"NETSCAPE2.0");
    assert!(!has_loop(&encode(None)));
    assert!(has_loop(&encode(Some(Repeat::Infinite))));
    assert!(has_loop(&encode(Some(Repeat::Finite(3)))));
}

#[test]
fn transparent_color_is_keyed_out() {
    let mut frame = solid(2, 1, [255, 255, 255, 255]);
    frame.data[..4].copy_from_slice(&[0, 0, 0, 255]);

    let mut enc = ImageGifEncoder::new();
    enc.start(2, 1, QuantizeAlgorithm::Neuquant, false).unwrap();
    enc.set_transparent(Color::BLACK).unwrap();
    enc.add_frame(&frame).unwrap();
    let frames = decode(&enc.finish().unwrap());

    assert_eq!(frames[0].buffer().get_pixel(0, 0).0[3], 0);
    assert_eq!(frames[0].buffer().get_pixel(1, 0).0, [255, 255, 255, 255]);
}

#[test]
fn optimized_stream_decodes_to_the_same_pictures() {
    let red = solid(4, 4, [255, 0, 0, 255]);
    let mut dot = red.clone();
    dot.data[..4].copy_from_slice(&[0, 0, 255, 255]);

    let mut enc = ImageGifEncoder::new();
    enc.start(4, 4, QuantizeAlgorithm::Octree, true).unwrap();
    enc.set_threshold(50).unwrap();
    enc.add_frame(&red).unwrap();
    enc.add_frame(&dot).unwrap();
    enc.add_frame(&red).unwrap();
    let frames = decode(&enc.finish().unwrap());

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1].buffer().get_pixel(0, 0).0, [0, 0, 255, 255]);
    assert_eq!(frames[1].buffer().get_pixel(3, 3).0, [255, 0, 0, 255]);
    assert_eq!(frames[2].buffer().get_pixel(0, 0).0, [255, 0, 0, 255]);
}

#[test]
fn delta_keeps_only_changed_pixels_below_threshold() {
    let prev = [1, 1, 1, 255].repeat(4);
    let mut cur = prev.clone();
    cur[..4].copy_from_slice(&[9, 9, 9, 255]);

    let delta = delta_frame(&prev, &cur, 90).unwrap();
    assert_eq!(&delta[..4], &[9, 9, 9, 255]);
    assert!(delta[4..].chunks_exact(4).all(|p| p == [0, 0, 0, 0]));

    // 1 of 4 changed is exactly 25%.
    assert!(delta_frame(&prev, &cur, 25).is_none());
    assert!(delta_frame(&prev, &cur, 26).is_some());
}

#[test]
fn delta_is_skipped_when_pixels_turn_transparent() {
    let prev = [1, 1, 1, 255].repeat(4);
    let mut cur = prev.clone();
    cur[..4].copy_from_slice(&[0, 0, 0, 0]);
    assert!(delta_frame(&prev, &cur, 90).is_none());
}

#[test]
fn encoder_rejects_misuse() {
    let mut enc = ImageGifEncoder::new();
    assert!(matches!(
        enc.add_frame(&solid(1, 1, [0; 4])),
        Err(GifStackError::Encoding(_))
    ));
    assert!(enc.finish().is_err());

    enc.start(2, 2, QuantizeAlgorithm::Neuquant, false).unwrap();
    assert!(enc.set_quality(0).is_err());
    assert!(enc.set_threshold(101).is_err());
    assert!(enc.set_frame_rate(0).is_err());
    assert!(enc.add_frame(&solid(3, 2, [0; 4])).is_err());
}

#[test]
fn keyed_holes_do_not_show_the_previous_frame() {
    let mut enc = ImageGifEncoder::new();
    enc.start(2, 1, QuantizeAlgorithm::Neuquant, true).unwrap();
    enc.set_transparent(Color::BLACK).unwrap();
    enc.add_frame(&solid(2, 1, [255, 255, 255, 255])).unwrap();
    enc.add_frame(&solid(2, 1, [0, 0, 0, 255])).unwrap();
    let frames = decode(&enc.finish().unwrap());

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].buffer().get_pixel(0, 0).0[3], 0);
    assert_eq!(frames[1].buffer().get_pixel(1, 0).0[3], 0);
}

#[test]
fn frame_delay_rounds_to_hundredths() {
    assert_eq!(frame_delay_cs(None), 10);
    assert_eq!(frame_delay_cs(Some(25)), 4);
    assert_eq!(frame_delay_cs(Some(30)), 3);
    assert_eq!(frame_delay_cs(Some(1000)), 1);
}
