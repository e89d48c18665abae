use std::sync::Arc;

use super::*;
use crate::assets::color::Color;
use crate::assets::drawable::Drawable;
use crate::resolve::resolver::{Paint, ResolvedSource};

#[test]
fn cycle_wraps_modulo_length() {
    let seq = [10, 11, 12];
    let picked: Vec<_> = (0..7).map(|i| *cycle(&seq, i).unwrap()).collect();
    assert_eq!(picked, vec![10, 11, 12, 10, 11, 12, 10]);
    assert!(cycle::<u8>(&[], 3).is_none());
}

#[test]
fn cursor_replays_short_sequences_per_slot() {
    let short = [0, 1];
    let long = [0, 1, 2, 3, 4];
    let mut cursor = CyclicCursor::new();
    let mut short_seen = Vec::new();
    let mut long_seen = Vec::new();
    for _ in 0..5 {
        cursor.begin_frame();
        long_seen.push(*cursor.advance(&long).unwrap());
        short_seen.push(*cursor.advance(&short).unwrap());
    }
    assert_eq!(long_seen, vec![0, 1, 2, 3, 4]);
    assert_eq!(short_seen, vec![0, 1, 0, 1, 0]);
    assert_eq!(cursor.plays(0), 5);
    assert_eq!(cursor.plays(1), 5);
    assert_eq!(cursor.plays(2), 0);
}

#[test]
fn cursor_sets_are_independent_per_category() {
    let seq = [0, 1, 2];
    let mut set = CursorSet::new();
    set.begin_frame();
    assert_eq!(set.get_mut(LayerCategory::Image).advance(&seq), Some(&0));
    set.begin_frame();
    assert_eq!(set.get_mut(LayerCategory::Image).advance(&seq), Some(&1));
    assert_eq!(set.get_mut(LayerCategory::Banner).advance(&seq), Some(&0));
    assert_eq!(set.get(LayerCategory::Background).plays(0), 0);
}

#[test]
fn timeline_length_is_longest_sequence_floored_at_one() {
    let d = Drawable::solid(1, 1, Color::WHITE).unwrap();
    let seq = |n: usize| ResolvedSource::Sequence(Arc::from(vec![d.clone(); n]));

    let queue = ResolvedQueue::from_slots(vec![None, Some(ResolvedSource::Static(Paint::Color(Color::BLACK)))]);
    assert_eq!(Timeline::from_resolved(&queue).length(), 1);

    let queue = ResolvedQueue::from_slots(vec![Some(seq(2)), None, Some(seq(5))]);
    let t = Timeline::from_resolved(&queue);
    assert_eq!(t.length(), 5);
    assert_eq!(
        t.indices().collect::<Vec<_>>(),
        (0..5).map(FrameIndex).collect::<Vec<_>>()
    );
}
