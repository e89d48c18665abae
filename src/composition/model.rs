use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::assets::drawable::Drawable;
use crate::assets::font::FontFace;
use crate::foundation::core::{Placement, Point};
use crate::foundation::error::{GifStackError, GifStackResult};

/// File extension that marks a path as an animated source.
pub const ANIMATED_EXTENSION: &str = "gif";

/// Return `true` when `name` refers to an animated source by file name.
pub fn is_animated_name(name: &str) -> bool {
    let file = name.trim().rsplit(['/', '\\']).next().unwrap_or_default();
    match file.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && ext.eq_ignore_ascii_case(ANIMATED_EXTENSION),
        None => false,
    }
}

/// Return `true` when `bytes` start with a GIF signature.
pub fn is_animated_bytes(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
}

/// Reference to an animated source that the decoding collaborator expands into sub-frames.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnimatedSource {
    /// A file on disk.
    Path(PathBuf),
    /// An in-memory GIF stream.
    Bytes(Arc<[u8]>),
}

impl AnimatedSource {
    /// Reference a file by path. The path is not checked until resolution.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Wrap in-memory GIF bytes; rejects anything without a GIF signature.
    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> GifStackResult<Self> {
        let bytes = bytes.into();
        if !is_animated_bytes(&bytes) {
            return Err(GifStackError::invalid_param(
                "animated source bytes must start with a GIF signature",
            ));
        }
        Ok(Self::Bytes(bytes))
    }

    /// Short human-readable description for logs and errors.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => format!("'{}'", p.display()),
            Self::Bytes(b) => format!("<{} gif bytes>", b.len()),
        }
    }
}

/// Source for layers that draw images: a still drawable or an animated reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Drawn as-is on every output frame.
    Still(Drawable),
    /// Expanded into sub-frames at resolution time.
    Animated(AnimatedSource),
}

impl ImageSource {
    /// Classify encoded bytes by content: GIF streams are animated, anything else is decoded
    /// immediately as a still image.
    pub fn from_bytes(bytes: &[u8]) -> GifStackResult<Self> {
        if is_animated_bytes(bytes) {
            return Ok(Self::Animated(AnimatedSource::bytes(bytes.to_vec())?));
        }
        Ok(Self::Still(Drawable::decode(bytes)?))
    }

    /// Classify a path by name: `*.gif` is animated, anything else is read as a still image.
    pub fn from_path(path: impl AsRef<Path>) -> GifStackResult<Self> {
        let path = path.as_ref();
        if is_animated_name(&path.to_string_lossy()) {
            return Ok(Self::Animated(AnimatedSource::path(path)));
        }
        Ok(Self::Still(Drawable::open(path)?))
    }
}

impl From<Drawable> for ImageSource {
    fn from(value: Drawable) -> Self {
        Self::Still(value)
    }
}

impl From<AnimatedSource> for ImageSource {
    fn from(value: AnimatedSource) -> Self {
        Self::Animated(value)
    }
}

/// Background content: a color or an image source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentSource {
    /// Solid color; never animated.
    Color(Color),
    /// Still or animated image.
    Image(ImageSource),
}

impl ContentSource {
    /// Parse a string source: names ending in `.gif` are animated paths, everything else must
    /// be a color.
    pub fn parse(s: &str) -> GifStackResult<Self> {
        if is_animated_name(s) {
            return Ok(Self::Image(ImageSource::Animated(AnimatedSource::path(
                s.trim(),
            ))));
        }
        Ok(Self::Color(Color::parse(s)?))
    }
}

impl FromStr for ContentSource {
    type Err = GifStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Color> for ContentSource {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<Drawable> for ContentSource {
    fn from(value: Drawable) -> Self {
        Self::Image(ImageSource::Still(value))
    }
}

impl From<ImageSource> for ContentSource {
    fn from(value: ImageSource) -> Self {
        Self::Image(value)
    }
}

impl From<AnimatedSource> for ContentSource {
    fn from(value: AnimatedSource) -> Self {
        Self::Image(ImageSource::Animated(value))
    }
}

fn check_finite_non_negative(v: f64, what: &str) -> GifStackResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(GifStackError::invalid_param(format!(
            "{what} must be finite and >= 0 (got {v})"
        )));
    }
    Ok(())
}

fn check_progress(progress: u8, what: &str) -> GifStackResult<()> {
    if progress > 100 {
        return Err(GifStackError::invalid_param(format!(
            "{what} must be in 0..=100 (got {progress})"
        )));
    }
    Ok(())
}

fn check_size(size: Option<f32>, what: &str) -> GifStackResult<()> {
    if let Some(s) = size
        && (!s.is_finite() || s <= 0.0)
    {
        return Err(GifStackError::invalid_param(format!(
            "{what} must be finite and > 0 (got {s})"
        )));
    }
    Ok(())
}

/// Rounded canvas corners with an optional outline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerRadius {
    /// Corner radius in pixels.
    pub radius: f64,
    /// Outline stroke width; `0` disables the outline.
    #[serde(default = "CornerRadius::default_outline")]
    pub outline: f64,
    /// Outline color.
    #[serde(default = "CornerRadius::default_color")]
    pub color: Color,
}

impl CornerRadius {
    fn default_outline() -> f64 {
        3.0
    }

    fn default_color() -> Color {
        Color::WHITE
    }

    /// Corner radius with the default 3px white outline.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            outline: Self::default_outline(),
            color: Self::default_color(),
        }
    }

    pub(crate) fn validate(&self) -> GifStackResult<()> {
        check_finite_non_negative(self.radius, "corner radius")?;
        check_finite_non_negative(self.outline, "corner outline")
    }
}

/// An image drawn into `placement`, optionally cropped from the source first.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLayer {
    /// Image content.
    pub source: ImageSource,
    /// Destination on the canvas.
    pub placement: Placement,
    /// Source rectangle in image pixels; `None` draws the whole image.
    pub crop: Option<Placement>,
}

impl ImageLayer {
    pub(crate) fn validate(&self) -> GifStackResult<()> {
        self.placement.validate("image placement")?;
        if let Some(crop) = &self.crop {
            crop.validate("image crop")?;
        }
        Ok(())
    }
}

/// Outline stroke around a frame or banner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Stroke width in pixels.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
}

/// Geometry of a decorative frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameShape {
    /// Axis-aligned rectangle.
    Square,
    /// Rectangle with rounded corners.
    RoundedSquare {
        /// Corner radius in pixels.
        radius: f64,
    },
    /// Ellipse inscribed in the placement.
    Circle,
}

/// Text drawn centered inside a frame or banner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameText {
    /// Text to draw.
    pub text: String,
    /// Fill color.
    #[serde(default = "default_text_color")]
    pub color: Color,
    /// Font size; falls back to the current font size.
    #[serde(default)]
    pub size: Option<f32>,
}

fn default_text_color() -> Color {
    Color::WHITE
}

/// What fills a frame or banner.
///
/// Only [`FrameContent::Image`] takes part in timeline synchronization; the other variants
/// carry their payload literally and render identically on every frame.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameContent {
    /// Nothing inside; only the outline (if any) is drawn.
    Empty,
    /// Solid fill.
    Color(Color),
    /// Centered text.
    Text(FrameText),
    /// Still or animated image clipped to the shape.
    Image(ImageSource),
}

impl FrameContent {
    /// Image source that consults the timeline, if any.
    pub fn image_source(&self) -> Option<&ImageSource> {
        match self {
            Self::Image(src) => Some(src),
            Self::Empty | Self::Color(_) | Self::Text(_) => None,
        }
    }

    fn validate(&self, what: &str) -> GifStackResult<()> {
        if let Self::Text(t) = self {
            if t.text.is_empty() {
                return Err(GifStackError::invalid_param(format!(
                    "{what} text must be non-empty"
                )));
            }
            check_size(t.size, &format!("{what} text size"))?;
        }
        Ok(())
    }
}

/// A decorative frame: a shape with content and an optional outline.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameLayer {
    /// Frame geometry.
    pub shape: FrameShape,
    /// Bounding box on the canvas.
    pub placement: Placement,
    /// Fill content.
    pub content: FrameContent,
    /// Optional outline.
    pub outline: Option<Outline>,
}

impl FrameLayer {
    pub(crate) fn validate(&self) -> GifStackResult<()> {
        self.placement.validate("frame placement")?;
        if let FrameShape::RoundedSquare { radius } = self.shape {
            check_finite_non_negative(radius, "frame corner radius")?;
        }
        if let Some(o) = &self.outline {
            check_finite_non_negative(o.width, "frame outline width")?;
        }
        self.content.validate("frame")
    }
}

/// A rounded strip with content, typically spanning the canvas width.
#[derive(Clone, Debug, PartialEq)]
pub struct BannerLayer {
    /// Bounding box on the canvas.
    pub placement: Placement,
    /// Corner radius in pixels.
    pub radius: f64,
    /// Fill content.
    pub content: FrameContent,
    /// Optional outline.
    pub outline: Option<Outline>,
}

impl BannerLayer {
    pub(crate) fn validate(&self) -> GifStackResult<()> {
        self.placement.validate("banner placement")?;
        check_finite_non_negative(self.radius, "banner radius")?;
        if let Some(o) = &self.outline {
            check_finite_non_negative(o.width, "banner outline width")?;
        }
        self.content.validate("banner")
    }
}

/// Horizontal text alignment relative to the text position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Text starts at the position.
    #[default]
    Start,
    /// Text is centered on the position.
    Center,
    /// Text ends at the position.
    End,
}

/// Styling for [`TextLayer`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    /// Font size; falls back to the current font size.
    #[serde(default)]
    pub size: Option<f32>,
    /// Fill color.
    #[serde(default = "default_text_color")]
    pub color: Color,
    /// Wrap width in pixels.
    #[serde(default)]
    pub max_width: Option<f32>,
    /// Alignment relative to the position.
    #[serde(default)]
    pub align: TextAlign,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: None,
            color: default_text_color(),
            max_width: None,
            align: TextAlign::Start,
        }
    }
}

/// Free text at a canvas position (top-left of the text box for `TextAlign::Start`).
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayer {
    /// Text to draw.
    pub text: String,
    /// Anchor position.
    pub position: Point,
    /// Styling.
    pub options: TextOptions,
}

impl TextLayer {
    pub(crate) fn validate(&self) -> GifStackResult<()> {
        if self.text.is_empty() {
            return Err(GifStackError::invalid_param("text must be non-empty"));
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(GifStackError::invalid_param(
                "text position must be finite",
            ));
        }
        check_size(self.options.size, "text size")?;
        check_size(self.options.max_width, "text max width")
    }
}

/// Font used by every text drawn after it in the queue.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Font file.
    pub face: FontFace,
    /// Default size for subsequent text.
    pub size: Option<f32>,
}

/// Geometry of a progress bar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpOptions {
    /// Bounding box of the track.
    pub placement: Placement,
    /// Corner radius of track and fill.
    #[serde(default)]
    pub radius: f64,
}

/// Progress bar colors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpColor {
    /// Background track.
    pub track: Color,
    /// Filled portion.
    pub fill: Color,
}

impl Default for ExpColor {
    fn default() -> Self {
        Self {
            track: Color::rgb(72, 75, 78),
            fill: Color::WHITE,
        }
    }
}

/// Experience-style progress bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressBar {
    /// Geometry.
    pub options: ExpOptions,
    /// Percent filled, `0..=100`.
    pub progress: u8,
    /// Colors.
    pub color: ExpColor,
}

impl ProgressBar {
    pub(crate) fn validate(&self) -> GifStackResult<()> {
        self.options.placement.validate("progress bar placement")?;
        check_finite_non_negative(self.options.radius, "progress bar radius")?;
        check_progress(self.progress, "progress")
    }
}

/// Outline traced by a loading indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingShape {
    /// Circular ring; progress sweeps clockwise from 12 o'clock.
    #[default]
    Circle,
    /// Square track; progress runs clockwise from the top-left corner.
    Square,
}

/// Geometry and colors of a loading indicator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadingOptions {
    /// Center of the indicator.
    pub center: Point,
    /// Outer diameter / side length.
    pub size: f64,
    /// Stroke thickness.
    #[serde(default = "LoadingOptions::default_thickness")]
    pub thickness: f64,
    /// Percent complete, `0..=100`.
    pub progress: u8,
    /// Progress stroke color.
    #[serde(default = "default_text_color")]
    pub color: Color,
    /// Optional full-track color drawn under the progress stroke.
    #[serde(default)]
    pub track: Option<Color>,
}

impl LoadingOptions {
    fn default_thickness() -> f64 {
        4.0
    }
}

/// Loading indicator operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadingIndicator {
    /// Outline traced.
    pub shape: LoadingShape,
    /// Geometry and colors.
    pub options: LoadingOptions,
}

impl LoadingIndicator {
    pub(crate) fn validate(&self) -> GifStackResult<()> {
        let o = &self.options;
        if !o.center.x.is_finite() || !o.center.y.is_finite() {
            return Err(GifStackError::invalid_param(
                "loading center must be finite",
            ));
        }
        if !o.size.is_finite() || o.size <= 0.0 {
            return Err(GifStackError::invalid_param("loading size must be > 0"));
        }
        if !o.thickness.is_finite() || o.thickness <= 0.0 {
            return Err(GifStackError::invalid_param(
                "loading thickness must be > 0",
            ));
        }
        check_progress(o.progress, "loading progress")
    }
}

/// Guide lines through the canvas center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Horizontal line.
    X,
    /// Vertical line.
    Y,
    /// Both lines.
    Both,
}

/// Operation categories whose content can be animated. Each has its own cyclic cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerCategory {
    /// `set_background` layers.
    Background,
    /// `set_image` layers.
    Image,
    /// `set_frame` layers.
    Frame,
    /// `set_banner` layers.
    Banner,
}

impl LayerCategory {
    /// Number of categories.
    pub const COUNT: usize = 4;

    /// All categories in a fixed order.
    pub const ALL: [Self; Self::COUNT] = [Self::Background, Self::Image, Self::Frame, Self::Banner];

    /// Dense index in `0..COUNT`.
    pub fn index(self) -> usize {
        match self {
            Self::Background => 0,
            Self::Image => 1,
            Self::Frame => 2,
            Self::Banner => 3,
        }
    }
}

/// Borrowed view of the source an operation resolves against the timeline.
#[derive(Clone, Copy, Debug)]
pub enum SourceRef<'a> {
    /// Background content.
    Content(&'a ContentSource),
    /// Image, frame or banner image content.
    Image(&'a ImageSource),
}

/// One declared unit of visual composition, in queue order.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// Rounded canvas corners.
    CornerRadius(CornerRadius),
    /// Canvas background.
    Background(ContentSource),
    /// Image layer.
    Image(ImageLayer),
    /// Decorative frame.
    Frame(FrameLayer),
    /// Free text.
    Text(TextLayer),
    /// Font switch.
    Font(FontSpec),
    /// Progress bar.
    Exp(ProgressBar),
    /// Loading indicator.
    Loading(LoadingIndicator),
    /// Axis guides.
    Axis(Axis),
    /// Banner strip.
    Banner(BannerLayer),
}

impl Operation {
    /// Stable lowercase name, matching the scene file `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CornerRadius(_) => "corner_radius",
            Self::Background(_) => "background",
            Self::Image(_) => "image",
            Self::Frame(_) => "frame",
            Self::Text(_) => "text",
            Self::Font(_) => "font",
            Self::Exp(_) => "exp",
            Self::Loading(_) => "loading",
            Self::Axis(_) => "axis",
            Self::Banner(_) => "banner",
        }
    }

    /// Cursor category, for operations that can carry animated content.
    pub fn category(&self) -> Option<LayerCategory> {
        match self {
            Self::Background(_) => Some(LayerCategory::Background),
            Self::Image(_) => Some(LayerCategory::Image),
            Self::Frame(_) => Some(LayerCategory::Frame),
            Self::Banner(_) => Some(LayerCategory::Banner),
            _ => None,
        }
    }

    /// Source this operation draws from the timeline.
    ///
    /// `None` for operations without content and for frames/banners whose content is
    /// empty, a color or text: those never consult a cursor.
    pub fn timeline_source(&self) -> Option<SourceRef<'_>> {
        match self {
            Self::Background(src) => Some(SourceRef::Content(src)),
            Self::Image(layer) => Some(SourceRef::Image(&layer.source)),
            Self::Frame(layer) => layer.content.image_source().map(SourceRef::Image),
            Self::Banner(layer) => layer.content.image_source().map(SourceRef::Image),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
