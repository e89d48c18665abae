use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::error::{GifStackError, GifStackResult};

/// Palette construction algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizeAlgorithm {
    /// NeuQuant neural-net quantizer; honors `quality`.
    #[default]
    Neuquant,
    /// Octree quantizer.
    Octree,
}

/// Loop behavior written into the GIF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// Loop forever.
    Infinite,
    /// Loop the given number of times.
    Finite(u16),
}

/// Encoder settings for one builder. Unset options leave the encoder default untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncoderConfig {
    /// Palette algorithm.
    #[serde(default)]
    pub algorithm: QuantizeAlgorithm,
    /// Store near-identical frames as deltas against the previous frame.
    #[serde(default)]
    pub optimizer: bool,
    /// NeuQuant sampling factor, `1..=30` (lower is better and slower).
    #[serde(default)]
    pub quality: Option<u8>,
    /// Optimizer threshold in percent of changed pixels, `1..=100`.
    #[serde(default)]
    pub threshold: Option<u8>,
    /// Loop behavior.
    #[serde(default)]
    pub repeat: Option<Repeat>,
    /// Frames per second; the per-frame delay is `1000 / frame_rate` ms.
    #[serde(default)]
    pub frame_rate: Option<u32>,
    /// Color keyed to full transparency.
    #[serde(default)]
    pub transparent_color: Option<Color>,
}

impl EncoderConfig {
    /// NeuQuant quality used when none is configured.
    pub const DEFAULT_QUALITY: u8 = 10;
    /// Optimizer threshold used when none is configured.
    pub const DEFAULT_THRESHOLD: u8 = 90;
    /// Frame delay used when no frame rate is configured.
    pub const DEFAULT_DELAY_MS: u32 = 100;

    /// Default configuration with `algorithm`.
    pub fn new(algorithm: QuantizeAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    /// Enable or disable the optimizer.
    pub fn with_optimizer(mut self, optimizer: bool) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Set the NeuQuant quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the optimizer threshold.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the loop behavior.
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Set the frame rate.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    /// Set the transparent color.
    pub fn with_transparent_color(mut self, color: Color) -> Self {
        self.transparent_color = Some(color);
        self
    }

    /// Check ranges and option combinations.
    pub fn validate(&self) -> GifStackResult<()> {
        if let Some(q) = self.quality {
            if !(1..=30).contains(&q) {
                return Err(GifStackError::invalid_param(format!(
                    "encoder quality must be in 1..=30 (got {q})"
                )));
            }
            if self.algorithm != QuantizeAlgorithm::Neuquant {
                return Err(GifStackError::invalid_param(
                    "encoder quality only applies to the neuquant algorithm",
                ));
            }
        }
        if let Some(t) = self.threshold {
            if !(1..=100).contains(&t) {
                return Err(GifStackError::invalid_param(format!(
                    "encoder threshold must be in 1..=100 (got {t})"
                )));
            }
            if !self.optimizer {
                return Err(GifStackError::invalid_param(
                    "encoder threshold requires the optimizer",
                ));
            }
        }
        if self.frame_rate == Some(0) {
            return Err(GifStackError::invalid_param(
                "encoder frame rate must be > 0",
            ));
        }
        Ok(())
    }

    /// Delay between frames in milliseconds, as a `numer / denom` pair.
    pub fn frame_delay_ms(&self) -> (u32, u32) {
        match self.frame_rate {
            Some(fps) if fps > 0 => (1000, fps),
            _ => (Self::DEFAULT_DELAY_MS, 1),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/config.rs"]
mod tests;
