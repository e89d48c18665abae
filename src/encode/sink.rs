use crate::assets::color::Color;
use crate::encode::config::{QuantizeAlgorithm, Repeat};
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::render::backend::FrameRGBA;

/// Encoding collaborator.
///
/// Call order contract: `start` once, then any of the `set_*` methods, then `add_frame` for
/// every frame in output order, then `finish` once.
pub trait GifEncoding {
    /// Begin a stream of `width x height` frames.
    fn start(
        &mut self,
        width: u32,
        height: u32,
        algorithm: QuantizeAlgorithm,
        optimizer: bool,
    ) -> GifStackResult<()>;
    /// NeuQuant quality.
    fn set_quality(&mut self, quality: u8) -> GifStackResult<()>;
    /// Optimizer threshold in percent.
    fn set_threshold(&mut self, threshold: u8) -> GifStackResult<()>;
    /// Frames per second.
    fn set_frame_rate(&mut self, frame_rate: u32) -> GifStackResult<()>;
    /// Color keyed to transparency.
    fn set_transparent(&mut self, color: Color) -> GifStackResult<()>;
    /// Loop behavior.
    fn set_repeat(&mut self, repeat: Repeat) -> GifStackResult<()>;
    /// Append one frame.
    fn add_frame(&mut self, frame: &FrameRGBA) -> GifStackResult<()>;
    /// Finish the stream and return the encoded bytes.
    fn finish(&mut self) -> GifStackResult<Vec<u8>>;
}

/// A call observed by [`InMemoryEncoder`].
#[derive(Clone, Debug, PartialEq)]
pub enum EncoderCall {
    /// `start`.
    Start {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
        /// Palette algorithm.
        algorithm: QuantizeAlgorithm,
        /// Optimizer flag.
        optimizer: bool,
    },
    /// `set_quality`.
    Quality(u8),
    /// `set_threshold`.
    Threshold(u8),
    /// `set_frame_rate`.
    FrameRate(u32),
    /// `set_transparent`.
    Transparent(Color),
    /// `set_repeat`.
    Repeat(Repeat),
    /// `add_frame`.
    Frame,
    /// `finish`.
    Finish,
}

/// In-memory encoder for tests and debugging.
///
/// `finish` returns a short deterministic marker instead of a real GIF stream.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    /// Calls in order.
    pub calls: Vec<EncoderCall>,
    /// Frames received, in order.
    pub frames: Vec<FrameRGBA>,
}

impl InMemoryEncoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    fn started(&self) -> GifStackResult<()> {
        if !matches!(self.calls.first(), Some(EncoderCall::Start { .. })) {
            return Err(GifStackError::encoding("encoder used before start"));
        }
        Ok(())
    }
}

impl GifEncoding for InMemoryEncoder {
    fn start(
        &mut self,
        width: u32,
        height: u32,
        algorithm: QuantizeAlgorithm,
        optimizer: bool,
    ) -> GifStackResult<()> {
        self.calls.clear();
        self.frames.clear();
        self.calls.push(EncoderCall::Start {
            width,
            height,
            algorithm,
            optimizer,
        });
        Ok(())
    }

    fn set_quality(&mut self, quality: u8) -> GifStackResult<()> {
        self.started()?;
        self.calls.push(EncoderCall::Quality(quality));
        Ok(())
    }

    fn set_threshold(&mut self, threshold: u8) -> GifStackResult<()> {
        self.started()?;
        self.calls.push(EncoderCall::Threshold(threshold));
        Ok(())
    }

    fn set_frame_rate(&mut self, frame_rate: u32) -> GifStackResult<()> {
        self.started()?;
        self.calls.push(EncoderCall::FrameRate(frame_rate));
        Ok(())
    }

    fn set_transparent(&mut self, color: Color) -> GifStackResult<()> {
        self.started()?;
        self.calls.push(EncoderCall::Transparent(color));
        Ok(())
    }

    fn set_repeat(&mut self, repeat: Repeat) -> GifStackResult<()> {
        self.started()?;
        self.calls.push(EncoderCall::Repeat(repeat));
        Ok(())
    }

    fn add_frame(&mut self, frame: &FrameRGBA) -> GifStackResult<()> {
        self.started()?;
        self.calls.push(EncoderCall::Frame);
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> GifStackResult<Vec<u8>> {
        self.started()?;
        self.calls.push(EncoderCall::Finish);
        Ok(format!("GIF89a;frames={}", self.frames.len()).into_bytes())
    }
}
