use crate::encode::config::EncoderConfig;
use crate::encode::sink::GifEncoding;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::render::backend::FrameRGBA;

/// Owns the encoder for one finalize pass: start, parameterize, append, finish.
///
/// Ordering contract: `add_frame` indices are strictly increasing and every frame matches the
/// canvas size.
pub struct EncodingSession<'e> {
    encoder: &'e mut dyn GifEncoding,
    canvas: Canvas,
    last: Option<FrameIndex>,
    frames: u64,
}

impl<'e> EncodingSession<'e> {
    /// Validate `config`, start the encoder and apply every configured option.
    pub fn start(
        encoder: &'e mut dyn GifEncoding,
        canvas: Canvas,
        config: &EncoderConfig,
    ) -> GifStackResult<Self> {
        config.validate()?;
        encoder.start(canvas.width, canvas.height, config.algorithm, config.optimizer)?;
        if let Some(q) = config.quality {
            encoder.set_quality(q)?;
        }
        if let Some(t) = config.threshold {
            encoder.set_threshold(t)?;
        }
        if let Some(fps) = config.frame_rate {
            encoder.set_frame_rate(fps)?;
        }
        if let Some(c) = config.transparent_color {
            encoder.set_transparent(c)?;
        }
        if let Some(r) = config.repeat {
            encoder.set_repeat(r)?;
        }
        Ok(Self {
            encoder,
            canvas,
            last: None,
            frames: 0,
        })
    }

    /// Append the frame captured for output index `idx`.
    pub fn add_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GifStackResult<()> {
        if let Some(last) = self.last
            && idx <= last
        {
            return Err(GifStackError::validation(format!(
                "frame {} pushed after frame {}",
                idx.0, last.0
            )));
        }
        if frame.width != self.canvas.width || frame.height != self.canvas.height {
            return Err(GifStackError::encoding(format!(
                "frame is {}x{}, expected {}x{}",
                frame.width, frame.height, self.canvas.width, self.canvas.height
            )));
        }
        if frame.data.len() != self.canvas.rgba_len() {
            return Err(GifStackError::encoding("frame data length mismatch"));
        }
        self.encoder.add_frame(frame)?;
        self.last = Some(idx);
        self.frames += 1;
        tracing::trace!(frame = idx.0, "frame encoded");
        Ok(())
    }

    /// Frames appended so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Finish the stream. A session without frames is rejected.
    pub fn finish(self) -> GifStackResult<Vec<u8>> {
        if self.frames == 0 {
            return Err(GifStackError::validation(
                "encoding session finished without frames",
            ));
        }
        self.encoder.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/session.rs"]
mod tests;
