use super::*;
use crate::composition::model::{AnimatedSource, ImageLayer, TextLayer, TextOptions};
use crate::foundation::core::{Placement, Point};
use crate::resolve::decoder::InMemoryDecoder;

fn px(r: u8) -> Drawable {
    Drawable::solid(1, 1, Color::rgb(r, 0, 0)).unwrap()
}

fn image_op(src: ImageSource) -> Operation {
    Operation::Image(ImageLayer {
        source: src,
        placement: Placement::square(0.0, 0.0, 1.0),
        crop: None,
    })
}

#[test]
fn colors_and_stills_resolve_static_without_decoding() {
    let mut dec = InMemoryDecoder::new();
    let mut resolver = ContentResolver::new(&mut dec);

    let color = ContentSource::Color(Color::BLACK);
    assert_eq!(
        resolver.resolve(SourceRef::Content(&color)).unwrap(),
        ResolvedSource::Static(Paint::Color(Color::BLACK))
    );
    let still = ImageSource::Still(px(7));
    assert_eq!(
        resolver.resolve_image(&still).unwrap(),
        ResolvedSource::Static(Paint::Image(px(7)))
    );
    drop(resolver);
    assert!(dec.calls.is_empty());
}

#[test]
fn animated_sources_resolve_to_sequences() {
    let a = AnimatedSource::path("a.gif");
    let mut dec = InMemoryDecoder::new().with(a.clone(), vec![px(1), px(2), px(3)]);
    let resolved = ContentResolver::new(&mut dec)
        .resolve_image(&ImageSource::Animated(a))
        .unwrap();
    assert_eq!(resolved.sequence_len(), Some(3));
}

#[test]
fn empty_decodes_are_resolution_errors() {
    let a = AnimatedSource::path("empty.gif");
    let mut dec = InMemoryDecoder::new().with(a.clone(), Vec::new());
    let err = ContentResolver::new(&mut dec)
        .resolve_image(&ImageSource::Animated(a))
        .unwrap_err();
    assert!(matches!(err, GifStackError::SourceResolution(_)));
    assert!(err.to_string().contains("empty.gif"));
}

#[test]
fn queue_resolution_is_aligned_with_queue_indices() {
    let a = AnimatedSource::path("a.gif");
    let b = AnimatedSource::path("b.gif");
    let mut dec = InMemoryDecoder::new()
        .with(a.clone(), vec![px(1), px(2)])
        .with(b.clone(), vec![px(1), px(2), px(3), px(4), px(5)]);
    let ops = vec![
        Operation::Background(ContentSource::Color(Color::BLACK)),
        Operation::Text(TextLayer {
            text: "hi".to_owned(),
            position: Point::new(0.0, 0.0),
            options: TextOptions::default(),
        }),
        image_op(ImageSource::Animated(a.clone())),
        image_op(ImageSource::Animated(b.clone())),
    ];

    let resolved = resolve_queue(&ops, &mut dec).unwrap();
    assert_eq!(resolved.len(), 4);
    assert!(matches!(resolved.get(0), Some(ResolvedSource::Static(_))));
    assert!(resolved.get(1).is_none());
    assert_eq!(resolved.sequence_lengths().collect::<Vec<_>>(), vec![2, 5]);
    assert_eq!(dec.calls, vec![a, b]);
}

#[test]
fn first_failure_aborts_queue_resolution() {
    let mut dec = InMemoryDecoder::new();
    let ops = vec![
        image_op(ImageSource::Animated(AnimatedSource::path("missing.gif"))),
        image_op(ImageSource::Animated(AnimatedSource::path("never.gif"))),
    ];
    assert!(resolve_queue(&ops, &mut dec).is_err());
    assert_eq!(dec.calls.len(), 1);
}
