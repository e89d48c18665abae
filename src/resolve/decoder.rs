use std::collections::HashMap;
use std::io::Cursor;

use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;

use crate::assets::drawable::Drawable;
use crate::composition::model::AnimatedSource;
use crate::foundation::error::{GifStackError, GifStackResult};

/// Decoding collaborator: expands an animated source into its ordered sub-frames.
///
/// Implementations return every sub-frame at full logical-screen size. An empty result is
/// allowed here; the resolver turns it into a [`GifStackError::SourceResolution`].
pub trait SequenceDecoder {
    /// Decode `source` into sub-frames, in playback order.
    fn decode(&mut self, source: &AnimatedSource) -> GifStackResult<Vec<Drawable>>;
}

/// Decodes GIF files and in-memory GIF streams with the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct GifFileDecoder;

impl GifFileDecoder {
    /// Create a decoder.
    pub fn new() -> Self {
        Self
    }

    fn read(source: &AnimatedSource) -> GifStackResult<Vec<u8>> {
        match source {
            AnimatedSource::Path(p) => std::fs::read(p).map_err(|e| {
                GifStackError::source(format!("failed to read {}: {e}", source.describe()))
            }),
            AnimatedSource::Bytes(b) => Ok(b.to_vec()),
        }
    }
}

impl SequenceDecoder for GifFileDecoder {
    #[tracing::instrument(skip(self), fields(source = %source.describe()))]
    fn decode(&mut self, source: &AnimatedSource) -> GifStackResult<Vec<Drawable>> {
        let bytes = Self::read(source)?;
        let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(|e| {
            GifStackError::source(format!("failed to open {}: {e}", source.describe()))
        })?;
        let frames = decoder.into_frames().collect_frames().map_err(|e| {
            GifStackError::source(format!("failed to decode {}: {e}", source.describe()))
        })?;

        let mut out = Vec::with_capacity(frames.len());
        for frame in frames {
            let buffer = frame.into_buffer();
            let (w, h) = buffer.dimensions();
            out.push(Drawable::from_rgba8(w, h, buffer.into_raw())?);
        }
        tracing::debug!(frames = out.len(), "decoded animated source");
        Ok(out)
    }
}

/// In-memory decoder for tests and debugging.
///
/// Sources are matched exactly; unknown sources fail with a resolution error.
#[derive(Debug, Default)]
pub struct InMemoryDecoder {
    sequences: HashMap<AnimatedSource, Vec<Drawable>>,
    /// Every source passed to [`SequenceDecoder::decode`], in call order.
    pub calls: Vec<AnimatedSource>,
}

impl InMemoryDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the sub-frames returned for `source`.
    pub fn with(mut self, source: AnimatedSource, frames: Vec<Drawable>) -> Self {
        self.sequences.insert(source, frames);
        self
    }
}

impl SequenceDecoder for InMemoryDecoder {
    fn decode(&mut self, source: &AnimatedSource) -> GifStackResult<Vec<Drawable>> {
        self.calls.push(source.clone());
        self.sequences.get(source).cloned().ok_or_else(|| {
            GifStackError::source(format!("no sequence registered for {}", source.describe()))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/decoder.rs"]
mod tests;
