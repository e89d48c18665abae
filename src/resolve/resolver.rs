use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::drawable::Drawable;
use crate::composition::model::{ContentSource, ImageSource, Operation, SourceRef};
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::resolve::decoder::SequenceDecoder;

/// A static value handed to the backend unchanged on every frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Solid color.
    Color(Color),
    /// Still image.
    Image(Drawable),
}

/// Shape of a content source after resolution. Fixed for the rest of the pass.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedSource {
    /// Same value on every output frame; does not affect the timeline length.
    Static(Paint),
    /// Non-empty ordered sub-frames, replayed cyclically.
    Sequence(Arc<[Drawable]>),
}

impl ResolvedSource {
    /// Number of sub-frames, for sequences.
    pub fn sequence_len(&self) -> Option<usize> {
        match self {
            Self::Static(_) => None,
            Self::Sequence(frames) => Some(frames.len()),
        }
    }
}

/// Turns raw content sources into [`ResolvedSource`]s, decoding animated ones.
pub struct ContentResolver<'d> {
    decoder: &'d mut dyn SequenceDecoder,
}

impl<'d> ContentResolver<'d> {
    /// Resolve through `decoder`.
    pub fn new(decoder: &'d mut dyn SequenceDecoder) -> Self {
        Self { decoder }
    }

    /// Resolve any source an operation can carry.
    pub fn resolve(&mut self, source: SourceRef<'_>) -> GifStackResult<ResolvedSource> {
        match source {
            SourceRef::Content(ContentSource::Color(c)) => {
                Ok(ResolvedSource::Static(Paint::Color(*c)))
            }
            SourceRef::Content(ContentSource::Image(img)) | SourceRef::Image(img) => {
                self.resolve_image(img)
            }
        }
    }

    /// Resolve an image source: stills pass through, animated sources are decoded.
    pub fn resolve_image(&mut self, source: &ImageSource) -> GifStackResult<ResolvedSource> {
        match source {
            ImageSource::Still(d) => Ok(ResolvedSource::Static(Paint::Image(d.clone()))),
            ImageSource::Animated(a) => {
                let frames = self.decoder.decode(a)?;
                if frames.is_empty() {
                    return Err(GifStackError::source(format!(
                        "animated source {} decoded to zero frames",
                        a.describe()
                    )));
                }
                tracing::debug!(source = %a.describe(), frames = frames.len(), "resolved sequence");
                Ok(ResolvedSource::Sequence(frames.into()))
            }
        }
    }
}

/// Resolved sources for one queue, indexed like the queue.
///
/// Operations without a timeline source hold `None`.
#[derive(Clone, Debug, Default)]
pub struct ResolvedQueue {
    slots: Vec<Option<ResolvedSource>>,
}

impl ResolvedQueue {
    pub(crate) fn from_slots(slots: Vec<Option<ResolvedSource>>) -> Self {
        Self { slots }
    }

    /// Resolved source of the operation at `index`.
    pub fn get(&self, index: usize) -> Option<&ResolvedSource> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of queue entries covered.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` for an empty queue.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Lengths of every sequence, in queue order.
    pub fn sequence_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref().and_then(ResolvedSource::sequence_len))
    }
}

/// Resolve every source in `ops`, sequentially and in queue order.
///
/// The first failure aborts the pass.
pub fn resolve_queue(
    ops: &[Operation],
    decoder: &mut dyn SequenceDecoder,
) -> GifStackResult<ResolvedQueue> {
    let mut resolver = ContentResolver::new(decoder);
    let mut slots = Vec::with_capacity(ops.len());
    for op in ops {
        let slot = match op.timeline_source() {
            Some(src) => Some(resolver.resolve(src)?),
            None => None,
        };
        slots.push(slot);
    }
    Ok(ResolvedQueue::from_slots(slots))
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/resolver.rs"]
mod tests;
