use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine;

use crate::assets::font::FontFace;
use crate::composition::model::{
    Axis, BannerLayer, ContentSource, CornerRadius, ExpColor, ExpOptions, FontSpec, FrameLayer,
    ImageLayer, ImageSource, LoadingIndicator, LoadingOptions, LoadingShape, Operation,
    ProgressBar, TextLayer, TextOptions,
};
use crate::encode::config::EncoderConfig;
use crate::encode::gif::ImageGifEncoder;
use crate::foundation::core::{Canvas, Placement, Point};
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::progress::TracingProgress;
use crate::render::cpu::CpuCanvas;
use crate::render::pipeline::{Collaborators, render_gif};
use crate::resolve::decoder::GifFileDecoder;

/// Declarative GIF composition.
///
/// Configuration methods append one operation each, in order; nothing is resolved or rendered
/// until a finalize method (`to_buffer`, `to_buffer_with`, `generated_to`, `to_data_url`) runs.
/// Finalize methods borrow the builder and can be called any number of times.
///
/// ```no_run
/// use gifstack::{GifBuilder, Placement};
///
/// let gif = GifBuilder::new(128, 128)?
///     .set_background("#202020".parse::<gifstack::ContentSource>()?)
///     .set_image(
///         gifstack::ImageSource::from_path("spinner.gif")?,
///         Placement::square(32.0, 32.0, 64.0),
///         None,
///     )?
///     .to_buffer()?;
/// # Ok::<(), gifstack::GifStackError>(())
/// ```
#[derive(Clone, Debug)]
pub struct GifBuilder {
    canvas: Canvas,
    operations: Vec<Operation>,
    encoder: EncoderConfig,
}

impl GifBuilder {
    /// Start an empty composition on a `width x height` canvas.
    pub fn new(width: u32, height: u32) -> GifStackResult<Self> {
        Ok(Self {
            canvas: Canvas::new(width, height)?,
            operations: Vec::new(),
            encoder: EncoderConfig::default(),
        })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Queued operations, in render order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Current encoder configuration.
    pub fn encoder_config(&self) -> &EncoderConfig {
        &self.encoder
    }

    /// Validate `op` and append it.
    pub fn push(mut self, op: Operation) -> GifStackResult<Self> {
        validate_operation(&op)?;
        self.operations.push(op);
        Ok(self)
    }

    fn push_unchecked(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Round the canvas corners.
    pub fn set_corner_radius(self, corner: CornerRadius) -> GifStackResult<Self> {
        self.push(Operation::CornerRadius(corner))
    }

    /// Fill the canvas with a color, a still image or an animated source.
    pub fn set_background(self, source: impl Into<ContentSource>) -> Self {
        self.push_unchecked(Operation::Background(source.into()))
    }

    /// Draw an image into `placement`, optionally cropping the source first.
    pub fn set_image(
        self,
        source: impl Into<ImageSource>,
        placement: Placement,
        crop: Option<Placement>,
    ) -> GifStackResult<Self> {
        self.push(Operation::Image(ImageLayer {
            source: source.into(),
            placement,
            crop,
        }))
    }

    /// Draw a decorative frame.
    pub fn set_frame(self, frame: FrameLayer) -> GifStackResult<Self> {
        self.push(Operation::Frame(frame))
    }

    /// Draw text at `position` with the most recent font.
    pub fn set_text(
        self,
        text: impl Into<String>,
        position: Point,
        options: TextOptions,
    ) -> GifStackResult<Self> {
        self.push(Operation::Text(TextLayer {
            text: text.into(),
            position,
            options,
        }))
    }

    /// Use `face` for every text drawn after this point.
    pub fn set_font(self, face: FontFace, size: Option<f32>) -> GifStackResult<Self> {
        self.push(Operation::Font(FontSpec { face, size }))
    }

    /// Draw a progress bar at `progress` percent.
    pub fn set_exp(
        self,
        options: ExpOptions,
        progress: u8,
        color: Option<ExpColor>,
    ) -> GifStackResult<Self> {
        self.push(Operation::Exp(ProgressBar {
            options,
            progress,
            color: color.unwrap_or_default(),
        }))
    }

    /// Draw a loading indicator.
    pub fn set_loading(self, shape: LoadingShape, options: LoadingOptions) -> GifStackResult<Self> {
        self.push(Operation::Loading(LoadingIndicator { shape, options }))
    }

    /// Draw guide lines through the canvas center.
    pub fn set_axis(self, axis: Axis) -> Self {
        self.push_unchecked(Operation::Axis(axis))
    }

    /// Draw a banner.
    pub fn set_banner(self, banner: BannerLayer) -> GifStackResult<Self> {
        self.push(Operation::Banner(banner))
    }

    /// Replace the encoder configuration. Does not enqueue an operation.
    pub fn set_encoder(mut self, config: EncoderConfig) -> GifStackResult<Self> {
        config.validate()?;
        self.encoder = config;
        Ok(self)
    }

    /// Render and encode with the built-in collaborators.
    pub fn to_buffer(&self) -> GifStackResult<Vec<u8>> {
        let mut decoder = GifFileDecoder::new();
        let mut backend = CpuCanvas::new();
        let mut encoder = ImageGifEncoder::new();
        let mut progress = TracingProgress;
        self.to_buffer_with(&mut Collaborators {
            decoder: &mut decoder,
            backend: &mut backend,
            encoder: &mut encoder,
            progress: &mut progress,
        })
    }

    /// Render and encode with caller-supplied collaborators.
    pub fn to_buffer_with(&self, collaborators: &mut Collaborators<'_>) -> GifStackResult<Vec<u8>> {
        render_gif(&self.operations, self.canvas, &self.encoder, collaborators)
    }

    /// Write `<dir>/<name>.gif` and return its path. `dir` is created if missing.
    pub fn generated_to(&self, dir: impl AsRef<Path>, name: &str) -> GifStackResult<PathBuf> {
        let path = output_path(dir.as_ref(), name)?;
        let bytes = self.to_buffer()?;
        write_output(&path, &bytes)?;
        Ok(path)
    }

    /// [`GifBuilder::generated_to`] with caller-supplied collaborators.
    pub fn generated_to_with(
        &self,
        dir: impl AsRef<Path>,
        name: &str,
        collaborators: &mut Collaborators<'_>,
    ) -> GifStackResult<PathBuf> {
        let path = output_path(dir.as_ref(), name)?;
        let bytes = self.to_buffer_with(collaborators)?;
        write_output(&path, &bytes)?;
        Ok(path)
    }

    /// Standard base64 of the encoded GIF, without a `data:` prefix.
    pub fn to_data_url(&self) -> GifStackResult<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_buffer()?))
    }

    /// [`GifBuilder::to_data_url`] with caller-supplied collaborators.
    pub fn to_data_url_with(&self, collaborators: &mut Collaborators<'_>) -> GifStackResult<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_buffer_with(collaborators)?))
    }
}

fn validate_operation(op: &Operation) -> GifStackResult<()> {
    match op {
        Operation::CornerRadius(c) => c.validate(),
        Operation::Background(_) | Operation::Axis(_) => Ok(()),
        Operation::Image(layer) => layer.validate(),
        Operation::Frame(layer) => layer.validate(),
        Operation::Text(layer) => layer.validate(),
        Operation::Font(font) => match font.size {
            Some(s) if !s.is_finite() || s <= 0.0 => Err(GifStackError::invalid_param(format!(
                "font size must be finite and > 0 (got {s})"
            ))),
            _ => Ok(()),
        },
        Operation::Exp(bar) => bar.validate(),
        Operation::Loading(l) => l.validate(),
        Operation::Banner(layer) => layer.validate(),
    }
}

fn output_path(dir: &Path, name: &str) -> GifStackResult<PathBuf> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(GifStackError::validation(format!(
            "output name '{name}' must be a plain file stem"
        )));
    }
    Ok(dir.join(format!("{name}.gif")))
}

fn write_output(path: &Path, bytes: &[u8]) -> GifStackResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write gif '{}'", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "gif written");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/composition/builder.rs"]
mod tests;
