use crate::foundation::error::{GifStackError, GifStackResult};

pub use kurbo::{Point, Rect};

/// 0-based index of a frame in the output timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Largest supported side; the CPU rasterizer addresses pixels with `u16`.
    pub const MAX_SIDE: u32 = u16::MAX as u32;

    /// Create a validated canvas.
    pub fn new(width: u32, height: u32) -> GifStackResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Check that both sides are non-zero and addressable.
    pub fn validate(self) -> GifStackResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GifStackError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if self.width > Self::MAX_SIDE || self.height > Self::MAX_SIDE {
            return Err(GifStackError::validation(format!(
                "canvas {}x{} exceeds {}x{}",
                self.width,
                self.height,
                Self::MAX_SIDE,
                Self::MAX_SIDE
            )));
        }
        Ok(())
    }

    /// Number of bytes in one tightly packed RGBA8 frame.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Full-canvas rectangle.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Axis-aligned placement of a layer on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Placement {
    /// Placement at `(x, y)` with size `width x height`.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square placement of side `size`.
    pub fn square(x: f64, y: f64, size: f64) -> Self {
        Self::new(x, y, size, size)
    }

    /// Reject non-finite coordinates and non-positive sizes. `what` names the parameter.
    pub fn validate(&self, what: &str) -> GifStackResult<()> {
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(GifStackError::invalid_param(format!(
                "{what} must have finite coordinates"
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(GifStackError::invalid_param(format!(
                "{what} width/height must be > 0"
            )));
        }
        Ok(())
    }

    /// Convert to a `kurbo` rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
