use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::composition::model::TextAlign;
use crate::foundation::error::{GifStackError, GifStackResult};

/// Raw font file bytes (TTF/OTF) used by `set_font`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFace {
    bytes: Arc<Vec<u8>>,
}

impl FontFace {
    /// Wrap font bytes. Parsing is deferred until a backend registers the face.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> GifStackResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(GifStackError::invalid_param("font bytes must be non-empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
        })
    }

    /// Read a font file.
    pub fn from_path(path: impl AsRef<Path>) -> GifStackResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// Raw font bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Identity of the shared byte buffer; clones of one face share it.
    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.bytes) as usize
    }
}

/// Straight-alpha RGBA8 carried through parley as the glyph brush.
pub(crate) type GlyphBrush = [u8; 4];

/// Font faces registered with parley, keyed by the face's byte buffer.
#[derive(Default)]
pub(crate) struct FontBook {
    fonts: parley::FontContext,
    layouts: parley::LayoutContext<GlyphBrush>,
    families: HashMap<usize, String>,
}

impl FontBook {
    /// Family name of `face`, registering it on first use.
    pub(crate) fn family(&mut self, face: &FontFace) -> GifStackResult<String> {
        if let Some(name) = self.families.get(&face.key()) {
            return Ok(name.clone());
        }
        let registered = self
            .fonts
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes().to_vec()), None);
        let (id, _) = registered
            .first()
            .ok_or_else(|| GifStackError::render("font bytes hold no usable face"))?;
        let name = self
            .fonts
            .collection
            .family_name(*id)
            .ok_or_else(|| GifStackError::render("font face has no family name"))?
            .to_owned();
        self.families.insert(face.key(), name.clone());
        Ok(name)
    }

    /// Shape `text` in `family`. Lines wrap at `max_width` and are aligned against the widest
    /// one, so the layout box is always `layout.width()` wide.
    pub(crate) fn shape(
        &mut self,
        text: &str,
        family: &str,
        size: f32,
        brush: GlyphBrush,
        max_width: Option<f32>,
        align: TextAlign,
    ) -> GifStackResult<parley::Layout<GlyphBrush>> {
        if !size.is_finite() || size <= 0.0 {
            return Err(GifStackError::render(format!("font size {size} is not positive")));
        }
        let mut builder = self.layouts.ranged_builder(&mut self.fonts, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(family.to_owned().into()),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout = builder.build(text);
        layout.break_all_lines(max_width);
        let alignment = match align {
            TextAlign::Start => parley::Alignment::Start,
            TextAlign::Center => parley::Alignment::Center,
            TextAlign::End => parley::Alignment::End,
        };
        layout.align(None, alignment, parley::AlignmentOptions::default());
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
