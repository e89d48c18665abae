use super::*;
use crate::assets::color::Color;
use crate::composition::model::{
    AnimatedSource, ContentSource, FrameContent, FrameLayer, FrameShape, ImageLayer, ImageSource,
};
use crate::foundation::core::Placement;
use crate::progress::SilentProgress;
use crate::render::backend::{DrawCall, RecordingCanvas};
use crate::resolve::decoder::InMemoryDecoder;

fn px(r: u8) -> Drawable {
    Drawable::solid(1, 1, Color::rgb(r, 0, 0)).unwrap()
}

fn seq(n: u8) -> Vec<Drawable> {
    (0..n).map(px).collect()
}

fn image(name: &str) -> Operation {
    Operation::Image(ImageLayer {
        source: ImageSource::Animated(AnimatedSource::path(name)),
        placement: Placement::square(0.0, 0.0, 4.0),
        crop: None,
    })
}

fn canvas() -> Canvas {
    Canvas::new(4, 4).unwrap()
}

fn run_all(
    dispatcher: &mut FrameDispatcher<'_>,
    backend: &mut RecordingCanvas,
) -> Vec<FrameIndex> {
    let mut out = Vec::new();
    while let Some((idx, _)) = dispatcher.next_frame(backend, &mut SilentProgress).unwrap() {
        out.push(idx);
    }
    out
}

#[test]
fn dispatch_requires_resolution_first() {
    let ops = vec![Operation::Background(ContentSource::Color(Color::BLACK))];
    let mut d = FrameDispatcher::new(&ops, canvas());
    let err = d
        .next_frame(&mut RecordingCanvas::new(), &mut SilentProgress)
        .unwrap_err();
    assert!(matches!(err, GifStackError::Validation(_)));

    let mut dec = InMemoryDecoder::new();
    d.resolve(&mut dec).unwrap();
    assert!(matches!(
        d.resolve(&mut dec),
        Err(GifStackError::Validation(_))
    ));
}

#[test]
fn shorter_sequences_replay_cyclically() {
    let ops = vec![image("short.gif"), image("long.gif")];
    let mut dec = InMemoryDecoder::new()
        .with(AnimatedSource::path("short.gif"), seq(2))
        .with(AnimatedSource::path("long.gif"), seq(5));
    let mut d = FrameDispatcher::new(&ops, canvas());
    assert_eq!(d.resolve(&mut dec).unwrap().length(), 5);

    let mut backend = RecordingCanvas::new();
    let indices = run_all(&mut d, &mut backend);
    assert_eq!(indices, (0..5).map(FrameIndex).collect::<Vec<_>>());
    assert!(d.is_done());
    assert_eq!(backend.snapshots, 5);

    let expected_short = [0, 1, 0, 1, 0];
    for (i, calls) in backend.frames.iter().enumerate() {
        assert_eq!(
            calls,
            &vec![
                DrawCall::Image(px(expected_short[i])),
                DrawCall::Image(px(i as u8)),
            ]
        );
    }
}

#[test]
fn static_queue_renders_one_frame_in_insertion_order() {
    let still = px(9);
    let ops = vec![
        Operation::Background(ContentSource::Color(Color::WHITE)),
        Operation::Image(ImageLayer {
            source: ImageSource::Still(still.clone()),
            placement: Placement::square(0.0, 0.0, 2.0),
            crop: None,
        }),
        Operation::Axis(crate::composition::model::Axis::X),
    ];
    let mut d = FrameDispatcher::new(&ops, canvas());
    d.resolve(&mut InMemoryDecoder::new()).unwrap();
    let mut backend = RecordingCanvas::new();
    assert_eq!(run_all(&mut d, &mut backend), vec![FrameIndex(0)]);
    assert_eq!(
        backend.frames,
        vec![vec![
            DrawCall::Background(Paint::Color(Color::WHITE)),
            DrawCall::Image(still),
            DrawCall::Axis(crate::composition::model::Axis::X),
        ]]
    );
}

#[test]
fn non_image_frame_content_never_consults_a_cursor() {
    let ops = vec![
        Operation::Frame(FrameLayer {
            shape: FrameShape::Square,
            placement: Placement::square(0.0, 0.0, 4.0),
            content: FrameContent::Color(Color::BLACK),
            outline: None,
        }),
        Operation::Frame(FrameLayer {
            shape: FrameShape::Circle,
            placement: Placement::square(0.0, 0.0, 4.0),
            content: FrameContent::Image(AnimatedSource::path("a.gif").into()),
            outline: None,
        }),
    ];
    let mut dec = InMemoryDecoder::new().with(AnimatedSource::path("a.gif"), seq(3));
    let mut d = FrameDispatcher::new(&ops, canvas());
    d.resolve(&mut dec).unwrap();
    let mut backend = RecordingCanvas::new();
    run_all(&mut d, &mut backend);

    assert_eq!(backend.frames.len(), 3);
    for (i, calls) in backend.frames.iter().enumerate() {
        assert_eq!(
            calls,
            &vec![DrawCall::Frame(None), DrawCall::Frame(Some(px(i as u8)))]
        );
    }
}

#[test]
fn progress_is_reported_once_per_frame() {
    let ops = vec![image("a.gif")];
    let mut dec = InMemoryDecoder::new().with(AnimatedSource::path("a.gif"), seq(3));
    let mut d = FrameDispatcher::new(&ops, canvas());
    d.resolve(&mut dec).unwrap();

    let mut seen = Vec::new();
    let mut progress = |current: u64, total: u64, label: &str| {
        seen.push((current, total, label.to_owned()));
    };
    let mut backend = RecordingCanvas::new();
    while d.next_frame(&mut backend, &mut progress).unwrap().is_some() {}
    assert!(d.next_frame(&mut backend, &mut progress).unwrap().is_none());
    assert_eq!(
        seen,
        vec![
            (1, 3, PROGRESS_LABEL.to_owned()),
            (2, 3, PROGRESS_LABEL.to_owned()),
            (3, 3, PROGRESS_LABEL.to_owned()),
        ]
    );
}
