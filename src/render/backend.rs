use crate::assets::drawable::Drawable;
use crate::composition::model::{
    Axis, BannerLayer, CornerRadius, FontSpec, FrameLayer, ImageLayer, LoadingIndicator,
    ProgressBar, TextLayer,
};
use crate::foundation::core::Canvas;
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::resolve::resolver::Paint;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame of `canvas` size.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba_len()],
            premultiplied: true,
        }
    }

    /// Pixels as straight-alpha RGBA8.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut rgba = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut rgba);
        }
        rgba
    }
}

/// Rendering collaborator. One method per operation kind.
///
/// The dispatcher calls [`CanvasBackend::begin_frame`] before every output frame, then one
/// draw method per queued operation in insertion order, then [`CanvasBackend::snapshot`].
/// Animated content arrives already cycled to the sub-frame for the current index.
pub trait CanvasBackend {
    /// Start a clean frame.
    fn begin_frame(&mut self, canvas: Canvas) -> GifStackResult<()>;
    /// Round the canvas corners when the frame is captured.
    fn corner_radius(&mut self, params: &CornerRadius) -> GifStackResult<()>;
    /// Fill the canvas.
    fn background(&mut self, paint: &Paint) -> GifStackResult<()>;
    /// Draw an image layer.
    fn image(&mut self, layer: &ImageLayer, image: &Drawable) -> GifStackResult<()>;
    /// Draw a frame; `image` is set when the content is an image.
    fn frame(&mut self, layer: &FrameLayer, image: Option<&Drawable>) -> GifStackResult<()>;
    /// Draw free text with the current font.
    fn text(&mut self, layer: &TextLayer) -> GifStackResult<()>;
    /// Switch the current font.
    fn font(&mut self, font: &FontSpec) -> GifStackResult<()>;
    /// Draw a progress bar.
    fn exp(&mut self, bar: &ProgressBar) -> GifStackResult<()>;
    /// Draw a loading indicator.
    fn loading(&mut self, indicator: &LoadingIndicator) -> GifStackResult<()>;
    /// Draw axis guides.
    fn axis(&mut self, axis: Axis) -> GifStackResult<()>;
    /// Draw a banner; `image` is set when the content is an image.
    fn banner(&mut self, layer: &BannerLayer, image: Option<&Drawable>) -> GifStackResult<()>;
    /// Capture the current frame.
    fn snapshot(&mut self) -> GifStackResult<FrameRGBA>;
}

/// A draw call observed by [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// `corner_radius`, with the radius.
    CornerRadius(f64),
    /// `background`.
    Background(Paint),
    /// `image`, with the drawn image.
    Image(Drawable),
    /// `frame`, with the drawn image if any.
    Frame(Option<Drawable>),
    /// `text`, with the text.
    Text(String),
    /// `font`.
    Font,
    /// `exp`, with the progress.
    Exp(u8),
    /// `loading`, with the progress.
    Loading(u8),
    /// `axis`.
    Axis(Axis),
    /// `banner`, with the drawn image if any.
    Banner(Option<Drawable>),
}

/// Backend that records draw calls per frame, for tests and debugging.
///
/// Snapshots are transparent canvas-sized frames.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    canvas: Option<Canvas>,
    /// Draw calls of every frame begun so far.
    pub frames: Vec<Vec<DrawCall>>,
    /// Number of snapshots taken.
    pub snapshots: usize,
}

impl RecordingCanvas {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, call: DrawCall) -> GifStackResult<()> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| GifStackError::render("draw call before begin_frame"))?;
        frame.push(call);
        Ok(())
    }
}

impl CanvasBackend for RecordingCanvas {
    fn begin_frame(&mut self, canvas: Canvas) -> GifStackResult<()> {
        self.canvas = Some(canvas);
        self.frames.push(Vec::new());
        Ok(())
    }

    fn corner_radius(&mut self, params: &CornerRadius) -> GifStackResult<()> {
        self.record(DrawCall::CornerRadius(params.radius))
    }

    fn background(&mut self, paint: &Paint) -> GifStackResult<()> {
        self.record(DrawCall::Background(paint.clone()))
    }

    fn image(&mut self, _layer: &ImageLayer, image: &Drawable) -> GifStackResult<()> {
        self.record(DrawCall::Image(image.clone()))
    }

    fn frame(&mut self, _layer: &FrameLayer, image: Option<&Drawable>) -> GifStackResult<()> {
        self.record(DrawCall::Frame(image.cloned()))
    }

    fn text(&mut self, layer: &TextLayer) -> GifStackResult<()> {
        self.record(DrawCall::Text(layer.text.clone()))
    }

    fn font(&mut self, _font: &FontSpec) -> GifStackResult<()> {
        self.record(DrawCall::Font)
    }

    fn exp(&mut self, bar: &ProgressBar) -> GifStackResult<()> {
        self.record(DrawCall::Exp(bar.progress))
    }

    fn loading(&mut self, indicator: &LoadingIndicator) -> GifStackResult<()> {
        self.record(DrawCall::Loading(indicator.options.progress))
    }

    fn axis(&mut self, axis: Axis) -> GifStackResult<()> {
        self.record(DrawCall::Axis(axis))
    }

    fn banner(&mut self, _layer: &BannerLayer, image: Option<&Drawable>) -> GifStackResult<()> {
        self.record(DrawCall::Banner(image.cloned()))
    }

    fn snapshot(&mut self) -> GifStackResult<FrameRGBA> {
        let canvas = self
            .canvas
            .ok_or_else(|| GifStackError::render("snapshot before begin_frame"))?;
        self.snapshots += 1;
        Ok(FrameRGBA::transparent(canvas))
    }
}
