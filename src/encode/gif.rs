use gif::{DisposalMethod, Encoder, Frame};

use crate::assets::color::Color;
use crate::encode::config::{EncoderConfig, QuantizeAlgorithm, Repeat};
use crate::encode::palette::quantize_octree_in_place;
use crate::encode::sink::GifEncoding;
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::render::backend::FrameRGBA;

/// Colors left for the octree palette; one index stays free for transparency.
const OCTREE_COLORS: usize = 255;

#[derive(Debug)]
struct GifStream {
    width: u32,
    height: u32,
    algorithm: QuantizeAlgorithm,
    optimizer: bool,
    quality: Option<u8>,
    threshold: Option<u8>,
    frame_rate: Option<u32>,
    transparent: Option<Color>,
    repeat: Option<Repeat>,
    /// Straight-alpha RGBA8 frames, transparency already keyed.
    frames: Vec<Vec<u8>>,
}

/// GIF89a encoder backed by the `gif` crate.
///
/// Frames are buffered until [`GifEncoding::finish`]; palettes come from NeuQuant inside the
/// `gif` encoder or from the octree quantizer. Optimized delta frames are composed over the
/// previous picture, which is kept on screen.
#[derive(Debug, Default)]
pub struct ImageGifEncoder {
    stream: Option<GifStream>,
}

impl ImageGifEncoder {
    /// Create an idle encoder.
    pub fn new() -> Self {
        Self::default()
    }

    fn stream_mut(&mut self) -> GifStackResult<&mut GifStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| GifStackError::encoding("encoder used before start"))
    }
}

impl GifEncoding for ImageGifEncoder {
    fn start(
        &mut self,
        width: u32,
        height: u32,
        algorithm: QuantizeAlgorithm,
        optimizer: bool,
    ) -> GifStackResult<()> {
        if width == 0 || height == 0 || width > u32::from(u16::MAX) || height > u32::from(u16::MAX)
        {
            return Err(GifStackError::encoding(format!(
                "gif size {width}x{height} is out of range"
            )));
        }
        self.stream = Some(GifStream {
            width,
            height,
            algorithm,
            optimizer,
            quality: None,
            threshold: None,
            frame_rate: None,
            transparent: None,
            repeat: None,
            frames: Vec::new(),
        });
        Ok(())
    }

    fn set_quality(&mut self, quality: u8) -> GifStackResult<()> {
        if !(1..=30).contains(&quality) {
            return Err(GifStackError::encoding(format!(
                "quality {quality} is outside 1..=30"
            )));
        }
        self.stream_mut()?.quality = Some(quality);
        Ok(())
    }

    fn set_threshold(&mut self, threshold: u8) -> GifStackResult<()> {
        if !(1..=100).contains(&threshold) {
            return Err(GifStackError::encoding(format!(
                "threshold {threshold} is outside 1..=100"
            )));
        }
        self.stream_mut()?.threshold = Some(threshold);
        Ok(())
    }

    fn set_frame_rate(&mut self, frame_rate: u32) -> GifStackResult<()> {
        if frame_rate == 0 {
            return Err(GifStackError::encoding("frame rate must be > 0"));
        }
        self.stream_mut()?.frame_rate = Some(frame_rate);
        Ok(())
    }

    fn set_transparent(&mut self, color: Color) -> GifStackResult<()> {
        self.stream_mut()?.transparent = Some(color);
        Ok(())
    }

    fn set_repeat(&mut self, repeat: Repeat) -> GifStackResult<()> {
        self.stream_mut()?.repeat = Some(repeat);
        Ok(())
    }

    fn add_frame(&mut self, frame: &FrameRGBA) -> GifStackResult<()> {
        let stream = self.stream_mut()?;
        if frame.width != stream.width || frame.height != stream.height {
            return Err(GifStackError::encoding(format!(
                "frame is {}x{}, stream is {}x{}",
                frame.width, frame.height, stream.width, stream.height
            )));
        }
        let expected = (stream.width as usize) * (stream.height as usize) * 4;
        if frame.data.len() != expected {
            return Err(GifStackError::encoding("frame data length mismatch"));
        }

        let mut rgba = frame.to_straight_rgba8();
        if let Some(key) = stream.transparent {
            key_transparent(&mut rgba, key);
        }
        if stream.algorithm == QuantizeAlgorithm::Octree {
            quantize_octree_in_place(&mut rgba, OCTREE_COLORS);
        }
        stream.frames.push(rgba);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn finish(&mut self) -> GifStackResult<Vec<u8>> {
        let stream = self
            .stream
            .take()
            .ok_or_else(|| GifStackError::encoding("finish called before start"))?;

        let speed = match stream.algorithm {
            QuantizeAlgorithm::Neuquant => stream.quality.unwrap_or(EncoderConfig::DEFAULT_QUALITY),
            // Octree frames carry at most 256 colors, which the gif encoder maps exactly.
            QuantizeAlgorithm::Octree => EncoderConfig::DEFAULT_QUALITY,
        };
        let delay = frame_delay_cs(stream.frame_rate);
        let threshold = stream.threshold.unwrap_or(EncoderConfig::DEFAULT_THRESHOLD);

        let mut pictures: Vec<(Vec<u8>, bool)> = Vec::with_capacity(stream.frames.len());
        let mut previous: Option<&[u8]> = None;
        for rgba in &stream.frames {
            let picture = match previous {
                Some(prev) if stream.optimizer => match delta_frame(prev, rgba, threshold) {
                    Some(delta) => (delta, true),
                    None => (rgba.clone(), false),
                },
                _ => (rgba.clone(), false),
            };
            pictures.push(picture);
            previous = Some(rgba.as_slice());
        }
        let deltas = pictures.iter().filter(|(_, delta)| *delta).count();

        let width = u16::try_from(stream.width)
            .map_err(|_| GifStackError::encoding("gif width out of range"))?;
        let height = u16::try_from(stream.height)
            .map_err(|_| GifStackError::encoding("gif height out of range"))?;

        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, width, height, &[])
                .map_err(|e| GifStackError::encoding(format!("write gif header: {e}")))?;
            if let Some(repeat) = stream.repeat {
                let repeat = match repeat {
                    Repeat::Infinite => gif::Repeat::Infinite,
                    Repeat::Finite(n) => gif::Repeat::Finite(n),
                };
                encoder
                    .set_repeat(repeat)
                    .map_err(|e| GifStackError::encoding(format!("set repeat: {e}")))?;
            }

            let keeps: Vec<bool> = pictures
                .iter()
                .skip(1)
                .map(|(_, delta)| *delta)
                .chain(std::iter::once(false))
                .collect();
            let speed = i32::from(speed.clamp(1, 30));
            for ((mut pixels, _), keep) in pictures.into_iter().zip(keeps) {
                let mut frame = Frame::from_rgba_speed(width, height, &mut pixels, speed);
                frame.delay = delay;
                // The next frame is a delta and only paints what changed.
                frame.dispose = if keep {
                    DisposalMethod::Keep
                } else {
                    DisposalMethod::Background
                };
                encoder
                    .write_frame(&frame)
                    .map_err(|e| GifStackError::encoding(format!("encode frame: {e}")))?;
            }
            encoder
                .into_inner()
                .map_err(|e| GifStackError::encoding(format!("write gif trailer: {e}")))?;
            tracing::debug!(frames = stream.frames.len(), deltas, "gif frames written");
        }
        Ok(out)
    }
}

/// Frame delay in GIF hundredths of a second, rounded and at least 1.
fn frame_delay_cs(frame_rate: Option<u32>) -> u16 {
    let cs = match frame_rate {
        Some(fps) if fps > 0 => (200 + u64::from(fps)) / (2 * u64::from(fps)),
        _ => u64::from(EncoderConfig::DEFAULT_DELAY_MS / 10),
    };
    u16::try_from(cs.max(1)).unwrap_or(u16::MAX)
}

fn key_transparent(rgba: &mut [u8], key: Color) {
    for px in rgba.chunks_exact_mut(4) {
        if px[3] != 0 && px[0] == key.r && px[1] == key.g && px[2] == key.b {
            px.copy_from_slice(&[0, 0, 0, 0]);
        }
    }
}

/// Delta of `current` against `previous`: unchanged pixels become transparent.
///
/// `None` when the changed share reaches `threshold` percent, or when a pixel turns
/// transparent (a delta cannot erase what the previous frame left behind).
pub(crate) fn delta_frame(previous: &[u8], current: &[u8], threshold: u8) -> Option<Vec<u8>> {
    if previous.len() != current.len() || current.is_empty() {
        return None;
    }
    let total = current.len() / 4;
    let mut changed = 0usize;
    for (p, c) in previous.chunks_exact(4).zip(current.chunks_exact(4)) {
        if p != c {
            if c[3] == 0 {
                return None;
            }
            changed += 1;
        }
    }
    if changed * 100 >= total * usize::from(threshold) {
        return None;
    }

    let mut out = current.to_vec();
    for (o, p) in out.chunks_exact_mut(4).zip(previous.chunks_exact(4)) {
        if o == p {
            o.copy_from_slice(&[0, 0, 0, 0]);
        }
    }
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
