use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::color::Color;
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Largest raster side accepted from decoded or rasterized sources.
const MAX_DIM: u32 = 16_384;

/// A decoded still image, ready to draw.
///
/// Pixels are premultiplied RGBA8, row-major and tightly packed. Cloning is cheap: the pixel
/// buffer is shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Drawable {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl Drawable {
    /// Build from straight-alpha RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> GifStackResult<Self> {
        check_len(width, height, rgba.len())?;
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Build from bytes that are already premultiplied.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> GifStackResult<Self> {
        check_len(width, height, rgba8_premul.len())?;
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// A `width x height` image filled with `color`.
    pub fn solid(width: u32, height: u32, color: Color) -> GifStackResult<Self> {
        let px = color.to_premul_array();
        let count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(count * 4);
        for _ in 0..count {
            data.extend_from_slice(&px);
        }
        Self::from_premul_rgba8(width, height, data)
    }

    /// Decode encoded image bytes: SVG documents go through `usvg`/`resvg`, everything else
    /// through `image`. Animated formats decode to their first frame only.
    pub fn decode(bytes: &[u8]) -> GifStackResult<Self> {
        if looks_like_svg(bytes) {
            return Self::from_svg(bytes);
        }
        let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    /// Rasterize an SVG document at its intrinsic size.
    pub fn from_svg(bytes: &[u8]) -> GifStackResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
        let (width, height) = svg_raster_size(&tree)?;
        let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, width, height)?;
        Self::from_premul_rgba8(width, height, rgba8_premul)
    }

    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> GifStackResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        Self::decode(&bytes)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 pixels.
    pub fn premul_bytes(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Premultiplied pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.rgba8_premul[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Identity of the shared pixel buffer; clones of one drawable share it.
    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.rgba8_premul) as usize
    }
}

fn check_len(width: u32, height: u32, len: usize) -> GifStackResult<()> {
    if width == 0 || height == 0 {
        return Err(GifStackError::validation("image width/height must be non-zero"));
    }
    if width > MAX_DIM || height > MAX_DIM {
        return Err(GifStackError::validation(format!(
            "image size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let expected = (width as usize) * (height as usize) * 4;
    if len != expected {
        return Err(GifStackError::validation(format!(
            "image byte length {len} does not match {width}x{height} RGBA8 ({expected})"
        )));
    }
    Ok(())
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

fn svg_raster_size(tree: &usvg::Tree) -> GifStackResult<(u32, u32)> {
    fn to_px(v: f32) -> GifStackResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(GifStackError::validation("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width())?;
    let h = to_px(size.height())?;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(GifStackError::validation(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> GifStackResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| GifStackError::validation("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/drawable.rs"]
mod tests;
