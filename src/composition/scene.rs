use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::assets::drawable::Drawable;
use crate::assets::font::FontFace;
use crate::composition::builder::GifBuilder;
use crate::composition::model::{
    AnimatedSource, Axis, BannerLayer, ContentSource, CornerRadius, ExpColor, ExpOptions,
    FontSpec, FrameContent, FrameLayer, FrameShape, FrameText, ImageLayer, ImageSource,
    LoadingIndicator, LoadingOptions, LoadingShape, Operation, Outline, ProgressBar, TextLayer,
    TextOptions,
};
use crate::encode::config::EncoderConfig;
use crate::foundation::core::{Canvas, Placement, Point};
use crate::foundation::error::{GifStackError, GifStackResult};

/// Where a layer's pixels come from, as written in a scene file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDef {
    /// Solid color.
    Color(Color),
    /// Still image file (raster or SVG).
    Image(PathBuf),
    /// Animated GIF file.
    Animated(PathBuf),
}

/// Frame and banner content, as written in a scene file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDef {
    /// Nothing inside.
    #[default]
    Empty,
    /// Solid fill.
    Color(Color),
    /// Centered text.
    Text(FrameText),
    /// Still image file.
    Image(PathBuf),
    /// Animated GIF file.
    Animated(PathBuf),
}

/// One queued operation, tagged by `op`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationDef {
    /// See [`GifBuilder::set_corner_radius`].
    CornerRadius(CornerRadius),
    /// See [`GifBuilder::set_background`].
    Background {
        /// Background content.
        source: SourceDef,
    },
    /// See [`GifBuilder::set_image`].
    Image {
        /// Image content; colors are rejected.
        source: SourceDef,
        /// Destination.
        placement: Placement,
        /// Source crop.
        #[serde(default)]
        crop: Option<Placement>,
    },
    /// See [`GifBuilder::set_frame`].
    Frame {
        /// Geometry.
        shape: FrameShape,
        /// Bounding box.
        placement: Placement,
        /// Fill content.
        #[serde(default)]
        content: ContentDef,
        /// Outline.
        #[serde(default)]
        outline: Option<Outline>,
    },
    /// See [`GifBuilder::set_text`].
    Text {
        /// Text to draw.
        text: String,
        /// Anchor.
        position: Point,
        /// Styling.
        #[serde(default)]
        options: TextOptions,
    },
    /// See [`GifBuilder::set_font`].
    Font {
        /// Font file.
        path: PathBuf,
        /// Default size.
        #[serde(default)]
        size: Option<f32>,
    },
    /// See [`GifBuilder::set_exp`].
    Exp {
        /// Geometry.
        options: ExpOptions,
        /// Percent filled.
        progress: u8,
        /// Colors.
        #[serde(default)]
        color: Option<ExpColor>,
    },
    /// See [`GifBuilder::set_loading`].
    Loading {
        /// Outline traced.
        #[serde(default)]
        shape: LoadingShape,
        /// Geometry and colors.
        options: LoadingOptions,
    },
    /// See [`GifBuilder::set_axis`].
    Axis {
        /// Which guides.
        axis: Axis,
    },
    /// See [`GifBuilder::set_banner`].
    Banner {
        /// Bounding box.
        placement: Placement,
        /// Corner radius.
        #[serde(default)]
        radius: f64,
        /// Fill content.
        #[serde(default)]
        content: ContentDef,
        /// Outline.
        #[serde(default)]
        outline: Option<Outline>,
    },
}

/// JSON scene file: canvas, encoder settings and the ordered operation list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Output canvas.
    pub canvas: Canvas,
    /// Encoder settings.
    #[serde(default)]
    pub encoder: EncoderConfig,
    /// Operations in render order.
    #[serde(default)]
    pub operations: Vec<OperationDef>,
}

impl Scene {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GifStackResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GifStackError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON string.
    pub fn from_json_str(s: &str) -> GifStackResult<Self> {
        serde_json::from_str(s).map_err(|e| GifStackError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> GifStackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GifStackError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> GifStackResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GifStackError::serde(format!("serialize scene JSON: {e}")))
    }

    /// Build the composition. Relative paths resolve against `root`; still images and fonts
    /// are loaded here, animated sources stay references until finalize.
    pub fn into_builder(self, root: impl AsRef<Path>) -> GifStackResult<GifBuilder> {
        let root = root.as_ref();
        let mut builder = GifBuilder::new(self.canvas.width, self.canvas.height)?
            .set_encoder(self.encoder)?;
        for (i, def) in self.operations.into_iter().enumerate() {
            let op = operation_from_def(def, root).map_err(|e| match e {
                GifStackError::InvalidOperationParameter(m) => {
                    GifStackError::invalid_param(format!("operation #{i}: {m}"))
                }
                other => other,
            })?;
            builder = builder.push(op)?;
        }
        Ok(builder)
    }
}

fn resolve_path(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

fn content_source(root: &Path, def: SourceDef) -> GifStackResult<ContentSource> {
    Ok(match def {
        SourceDef::Color(c) => ContentSource::Color(c),
        SourceDef::Image(p) => ContentSource::Image(ImageSource::Still(Drawable::open(
            resolve_path(root, &p),
        )?)),
        SourceDef::Animated(p) => {
            ContentSource::Image(ImageSource::Animated(AnimatedSource::path(resolve_path(root, &p))))
        }
    })
}

fn frame_content(root: &Path, def: ContentDef) -> GifStackResult<FrameContent> {
    Ok(match def {
        ContentDef::Empty => FrameContent::Empty,
        ContentDef::Color(c) => FrameContent::Color(c),
        ContentDef::Text(t) => FrameContent::Text(t),
        ContentDef::Image(p) => {
            FrameContent::Image(ImageSource::Still(Drawable::open(resolve_path(root, &p))?))
        }
        ContentDef::Animated(p) => {
            FrameContent::Image(ImageSource::Animated(AnimatedSource::path(resolve_path(root, &p))))
        }
    })
}

fn operation_from_def(def: OperationDef, root: &Path) -> GifStackResult<Operation> {
    Ok(match def {
        OperationDef::CornerRadius(c) => Operation::CornerRadius(c),
        OperationDef::Background { source } => Operation::Background(content_source(root, source)?),
        OperationDef::Image {
            source,
            placement,
            crop,
        } => {
            let source = match content_source(root, source)? {
                ContentSource::Image(img) => img,
                ContentSource::Color(_) => {
                    return Err(GifStackError::invalid_param(
                        "image source must be an image or animated file",
                    ));
                }
            };
            Operation::Image(ImageLayer {
                source,
                placement,
                crop,
            })
        }
        OperationDef::Frame {
            shape,
            placement,
            content,
            outline,
        } => Operation::Frame(FrameLayer {
            shape,
            placement,
            content: frame_content(root, content)?,
            outline,
        }),
        OperationDef::Text {
            text,
            position,
            options,
        } => Operation::Text(TextLayer {
            text,
            position,
            options,
        }),
        OperationDef::Font { path, size } => Operation::Font(FontSpec {
            face: FontFace::from_path(resolve_path(root, &path))?,
            size,
        }),
        OperationDef::Exp {
            options,
            progress,
            color,
        } => Operation::Exp(ProgressBar {
            options,
            progress,
            color: color.unwrap_or_default(),
        }),
        OperationDef::Loading { shape, options } => {
            Operation::Loading(LoadingIndicator { shape, options })
        }
        OperationDef::Axis { axis } => Operation::Axis(axis),
        OperationDef::Banner {
            placement,
            radius,
            content,
            outline,
        } => Operation::Banner(BannerLayer {
            placement,
            radius,
            content: frame_content(root, content)?,
            outline,
        }),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/composition/scene.rs"]
mod tests;
