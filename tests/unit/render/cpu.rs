use kurbo::ParamCurve;

use super::*;
use crate::composition::model::{ExpColor, ExpOptions, TextOptions};
use crate::foundation::core::Placement;

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn draw_calls_need_an_open_frame() {
    let mut cpu = CpuCanvas::new();
    assert!(matches!(
        cpu.background(&Paint::Color(Color::BLACK)),
        Err(GifStackError::Render(_))
    ));
    assert!(matches!(cpu.snapshot(), Err(GifStackError::Render(_))));
}

#[test]
fn color_background_fills_the_canvas() {
    let mut cpu = CpuCanvas::new();
    cpu.begin_frame(canvas(8, 6)).unwrap();
    cpu.background(&Paint::Color(Color::rgb(10, 200, 30))).unwrap();
    let frame = cpu.snapshot().unwrap();
    assert_eq!((frame.width, frame.height), (8, 6));
    assert!(frame.premultiplied);
    assert_eq!(px(&frame, 0, 0), [10, 200, 30, 255]);
    assert_eq!(px(&frame, 7, 5), [10, 200, 30, 255]);
}

#[test]
fn frames_start_from_a_cleared_canvas() {
    let mut cpu = CpuCanvas::new();
    cpu.begin_frame(canvas(4, 4)).unwrap();
    cpu.background(&Paint::Color(Color::WHITE)).unwrap();
    cpu.snapshot().unwrap();

    cpu.begin_frame(canvas(4, 4)).unwrap();
    let frame = cpu.snapshot().unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn image_is_scaled_into_its_placement() {
    let red = Drawable::solid(2, 2, Color::rgb(255, 0, 0)).unwrap();
    let layer = ImageLayer {
        source: red.clone().into(),
        placement: Placement::new(0.0, 0.0, 4.0, 4.0),
        crop: None,
    };
    let mut cpu = CpuCanvas::new();
    cpu.begin_frame(canvas(8, 8)).unwrap();
    cpu.image(&layer, &red).unwrap();
    let frame = cpu.snapshot().unwrap();

    let inside = px(&frame, 1, 1);
    assert!(inside[0] > 240 && inside[3] > 240, "{inside:?}");
    assert_eq!(px(&frame, 6, 6)[3], 0);
}

#[test]
fn crop_outside_the_image_is_a_render_error() {
    let img = Drawable::solid(2, 2, Color::WHITE).unwrap();
    let layer = ImageLayer {
        source: img.clone().into(),
        placement: Placement::square(0.0, 0.0, 2.0),
        crop: Some(Placement::square(10.0, 10.0, 2.0)),
    };
    let mut cpu = CpuCanvas::new();
    cpu.begin_frame(canvas(4, 4)).unwrap();
    assert!(matches!(cpu.image(&layer, &img), Err(GifStackError::Render(_))));
}

#[test]
fn color_frame_fills_its_shape() {
    let layer = FrameLayer {
        shape: FrameShape::Square,
        placement: Placement::new(2.0, 2.0, 4.0, 4.0),
        content: FrameContent::Color(Color::rgb(0, 0, 255)),
        outline: None,
    };
    let mut cpu = CpuCanvas::new();
    cpu.begin_frame(canvas(8, 8)).unwrap();
    cpu.frame(&layer, None).unwrap();
    let frame = cpu.snapshot().unwrap();
    assert_eq!(px(&frame, 3, 3), [0, 0, 255, 255]);
    assert_eq!(px(&frame, 0, 0)[3], 0);
}

#[test]
fn progress_bar_fills_from_the_left() {
    let bar = ProgressBar {
        options: ExpOptions {
            placement: Placement::new(0.0, 0.0, 20.0, 4.0),
            radius: 0.0,
        },
        progress: 50,
        color: ExpColor {
            track: Color::rgb(0, 0, 0),
            fill: Color::rgb(255, 255, 255),
        },
    };
    let mut cpu = CpuCanvas::new();
    cpu.begin_frame(canvas(20, 4)).unwrap();
    cpu.exp(&bar).unwrap();
    let frame = cpu.snapshot().unwrap();
    assert_eq!(px(&frame, 2, 2), [255, 255, 255, 255]);
    assert_eq!(px(&frame, 17, 2), [0, 0, 0, 255]);
}

#[test]
fn text_without_a_font_is_a_render_error() {
    let layer = TextLayer {
        text: "hi".to_owned(),
        position: Point::new(0.0, 0.0),
        options: TextOptions::default(),
    };
    let mut cpu = CpuCanvas::new();
    cpu.begin_frame(canvas(8, 8)).unwrap();
    assert!(matches!(cpu.text(&layer), Err(GifStackError::Render(_))));
}

#[test]
fn corner_radius_clears_the_corners() {
    let mut cpu = CpuCanvas::new();
    cpu.begin_frame(canvas(32, 32)).unwrap();
    cpu.background(&Paint::Color(Color::rgb(0, 128, 0))).unwrap();
    cpu.corner_radius(&CornerRadius::new(8.0)).unwrap();
    let frame = cpu.snapshot().unwrap();
    assert_eq!(px(&frame, 0, 0)[3], 0);
    assert_eq!(px(&frame, 31, 31)[3], 0);
    assert_eq!(px(&frame, 16, 16), [0, 128, 0, 255]);
}

#[test]
fn mask_corners_leaves_the_interior_alone() {
    let mut data = vec![255u8; 10 * 10 * 4];
    mask_corners(&mut data, 10, 10, 4.0);
    assert_eq!(&data[..4], &[0, 0, 0, 0]);
    let center = (5 * 10 + 5) * 4;
    assert_eq!(&data[center..center + 4], &[255, 255, 255, 255]);

    let mut untouched = vec![7u8; 4 * 4 * 4];
    mask_corners(&mut untouched, 4, 4, 0.0);
    assert!(untouched.iter().all(|&b| b == 7));
}

#[test]
fn progress_paths_cover_the_requested_fraction() {
    assert!(circle_progress_path(Point::ZERO, 10.0, 0.0).is_none());
    assert!(circle_progress_path(Point::ZERO, 10.0, 0.5).is_some());

    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(square_progress_path(rect, 0.0).is_none());
    let half = square_progress_path(rect, 0.5).unwrap();
    let end = half.segments().last().unwrap().end();
    assert!((end.x - 10.0).abs() < 1e-9 && (end.y - 10.0).abs() < 1e-9);
    let eighth = square_progress_path(rect, 0.125).unwrap();
    let end = eighth.segments().last().unwrap().end();
    assert!((end.x - 5.0).abs() < 1e-9 && end.y.abs() < 1e-9);
}

#[test]
fn frame_shapes_stay_inside_their_rect() {
    let rect = Rect::new(1.0, 2.0, 11.0, 8.0);
    for shape in [
        FrameShape::Square,
        FrameShape::RoundedSquare { radius: 3.0 },
        FrameShape::Circle,
    ] {
        let bbox = frame_shape_path(shape, rect).bounding_box();
        assert!(bbox.x0 >= rect.x0 - 1e-6 && bbox.x1 <= rect.x1 + 1e-6, "{shape:?}");
        assert!(bbox.y0 >= rect.y0 - 1e-6 && bbox.y1 <= rect.y1 + 1e-6, "{shape:?}");
    }
}
