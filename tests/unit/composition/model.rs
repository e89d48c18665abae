use super::*;

#[test]
fn animated_names_are_detected_case_insensitively() {
    assert!(is_animated_name("spin.gif"));
    assert!(is_animated_name("  dir/Spin.GIF  "));
    assert!(!is_animated_name(".gif"));
    assert!(!is_animated_name("frames/.gif"));
    assert!(is_animated_name("a.gif"));
    assert!(!is_animated_name("still.png"));
    assert!(!is_animated_name("#ff0000"));
}

#[test]
fn animated_bytes_require_a_gif_signature() {
    assert!(is_animated_bytes(b"GIF89a...."));
    assert!(is_animated_bytes(b"GIF87a"));
    assert!(!is_animated_bytes(b"\x89PNG\r\n"));
    assert!(AnimatedSource::bytes(b"not a gif".to_vec()).is_err());
    assert!(AnimatedSource::bytes(b"GIF89a".to_vec()).is_ok());
}

#[test]
fn content_source_parses_colors_and_gif_paths() {
    assert_eq!(
        ContentSource::parse("#000000").unwrap(),
        ContentSource::Color(Color::BLACK)
    );
    assert_eq!(
        "bg.gif".parse::<ContentSource>().unwrap(),
        ContentSource::Image(ImageSource::Animated(AnimatedSource::path("bg.gif")))
    );
    let err = ContentSource::parse("not-a-color").unwrap_err();
    assert!(matches!(err, GifStackError::InvalidOperationParameter(_)));
    let err = ContentSource::parse(".gif").unwrap_err();
    assert!(matches!(err, GifStackError::InvalidOperationParameter(_)));
}

#[test]
fn image_source_from_bytes_decodes_stills_and_keeps_gifs_lazy() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"><rect width="2" height="2" fill="#00ff00"/></svg>"##;
    match ImageSource::from_bytes(svg).unwrap() {
        ImageSource::Still(d) => assert_eq!((d.width(), d.height()), (2, 2)),
        other => panic!("expected still, got {other:?}"),
    }
    match ImageSource::from_bytes(b"GIF89a-truncated").unwrap() {
        ImageSource::Animated(AnimatedSource::Bytes(b)) => assert_eq!(&b[..6], b"GIF89a"),
        other => panic!("expected animated bytes, got {other:?}"),
    }
}

#[test]
fn only_image_content_consults_the_timeline() {
    let placement = Placement::square(0.0, 0.0, 10.0);
    let frame = |content| {
        Operation::Frame(FrameLayer {
            shape: FrameShape::Circle,
            placement,
            content,
            outline: None,
        })
    };
    assert!(frame(FrameContent::Empty).timeline_source().is_none());
    assert!(frame(FrameContent::Color(Color::WHITE)).timeline_source().is_none());
    assert!(
        frame(FrameContent::Text(FrameText {
            text: "hi".to_owned(),
            color: Color::WHITE,
            size: None,
        }))
        .timeline_source()
        .is_none()
    );
    let animated = frame(FrameContent::Image(ImageSource::Animated(AnimatedSource::path(
        "a.gif",
    ))));
    assert!(matches!(
        animated.timeline_source(),
        Some(SourceRef::Image(ImageSource::Animated(_)))
    ));
    assert_eq!(animated.category(), Some(LayerCategory::Frame));

    assert!(Operation::Axis(Axis::Both).timeline_source().is_none());
    assert_eq!(Operation::Axis(Axis::Both).category(), None);
    assert!(matches!(
        Operation::Background(ContentSource::Color(Color::BLACK)).timeline_source(),
        Some(SourceRef::Content(_))
    ));
}

#[test]
fn layer_category_indices_are_dense() {
    let mut seen = [false; LayerCategory::COUNT];
    for c in LayerCategory::ALL {
        seen[c.index()] = true;
    }
    assert!(seen.iter().all(|s| *s));
}

#[test]
fn parameter_validation_rejects_out_of_range_values() {
    let bar = ProgressBar {
        options: ExpOptions {
            placement: Placement::new(0.0, 0.0, 100.0, 10.0),
            radius: 5.0,
        },
        progress: 101,
        color: ExpColor::default(),
    };
    assert!(bar.validate().is_err());
    assert!(ProgressBar { progress: 100, ..bar }.validate().is_ok());

    assert!(CornerRadius::new(-1.0).validate().is_err());
    assert!(CornerRadius::new(f64::INFINITY).validate().is_err());
    assert!(CornerRadius::new(12.0).validate().is_ok());

    let text = TextLayer {
        text: String::new(),
        position: Point::new(0.0, 0.0),
        options: TextOptions::default(),
    };
    assert!(text.validate().is_err());

    let loading = LoadingIndicator {
        shape: LoadingShape::Circle,
        options: LoadingOptions {
            center: Point::new(5.0, 5.0),
            size: 0.0,
            thickness: 2.0,
            progress: 50,
            color: Color::WHITE,
            track: None,
        },
    };
    assert!(loading.validate().is_err());
}

#[test]
fn corner_radius_serde_fills_defaults() {
    let c: CornerRadius = serde_json::from_str(r#"{"radius": 8}"#).unwrap();
    assert_eq!(c, CornerRadius::new(8.0));
    assert_eq!(c.outline, 3.0);
    assert_eq!(c.color, Color::WHITE);
}

#[test]
fn frame_shape_serde_is_tagged() {
    let s: FrameShape = serde_json::from_str(r#"{"kind": "rounded_square", "radius": 4}"#).unwrap();
    assert_eq!(s, FrameShape::RoundedSquare { radius: 4.0 });
    let s: FrameShape = serde_json::from_str(r#"{"kind": "circle"}"#).unwrap();
    assert_eq!(s, FrameShape::Circle);
}
