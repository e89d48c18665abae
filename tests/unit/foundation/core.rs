use super::*;

#[test]
fn canvas_rejects_zero_and_oversized_sides() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(Canvas::MAX_SIDE + 1, 10).is_err());
    let c = Canvas::new(4, 3).unwrap();
    assert_eq!(c.rgba_len(), 48);
    assert_eq!(c.rect(), Rect::new(0.0, 0.0, 4.0, 3.0));
}

#[test]
fn placement_validation_names_the_parameter() {
    let err = Placement::new(0.0, 0.0, 0.0, 5.0)
        .validate("image placement")
        .unwrap_err();
    assert!(err.to_string().contains("image placement"));

    assert!(
        Placement::new(f64::NAN, 0.0, 1.0, 1.0)
            .validate("frame")
            .is_err()
    );
    assert!(Placement::square(1.0, 2.0, 3.0).validate("frame").is_ok());
}

#[test]
fn placement_to_rect_spans_size() {
    let r = Placement::new(10.0, 20.0, 5.0, 6.0).to_rect();
    assert_eq!(r, Rect::new(10.0, 20.0, 15.0, 26.0));
}
