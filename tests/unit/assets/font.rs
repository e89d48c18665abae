use super::*;

#[test]
fn empty_font_bytes_are_rejected() {
    assert!(matches!(
        FontFace::from_bytes(Vec::new()),
        Err(GifStackError::InvalidOperationParameter(_))
    ));
}

#[test]
fn clones_share_one_face_key() {
    let face = FontFace::from_bytes(vec![0u8; 8]).unwrap();
    let other = FontFace::from_bytes(vec![0u8; 8]).unwrap();
    assert_eq!(face.key(), face.clone().key());
    assert_ne!(face.key(), other.key());
}

#[test]
fn bytes_without_a_face_fail_to_register() {
    let mut book = FontBook::default();
    let face = FontFace::from_bytes(b"definitely not a font".to_vec()).unwrap();
    assert!(matches!(book.family(&face), Err(GifStackError::Render(_))));
}

#[test]
fn shaping_rejects_non_positive_sizes() {
    let mut book = FontBook::default();
    for size in [0.0, -4.0, f32::NAN] {
        let err = book
            .shape("hi", "Any", size, [0, 0, 0, 255], None, TextAlign::Start)
            .err().unwrap();
        assert!(matches!(err, GifStackError::Render(_)));
    }
}
