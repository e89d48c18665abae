//! gifstack composes animated GIFs from a declarative stack of operations.
//!
//! A [`GifBuilder`] records backgrounds, images, frames, banners, text, progress bars,
//! loading indicators, axis guides and corner rounding in order. Finalizing it:
//!
//! - resolves every content source (colors, still images, animated GIFs)
//! - sizes the output timeline to the longest animated source
//! - replays the queue once per output frame, cycling shorter animations
//! - streams the frames into a GIF encoder
//!
//! Decoding, rendering, encoding and progress reporting go through the
//! [`SequenceDecoder`], [`CanvasBackend`], [`GifEncoding`] and [`ProgressReporter`] traits;
//! the crate ships a built-in implementation of each plus in-memory variants for tests.
#![forbid(unsafe_code)]

mod assets;
mod composition;
mod encode;
mod foundation;
mod progress;
mod render;
mod resolve;

pub use crate::foundation::core::{Canvas, FrameIndex, Placement, Point, Rect};
pub use crate::foundation::error::{GifStackError, GifStackResult};

pub use crate::assets::color::Color;
pub use crate::assets::drawable::Drawable;
pub use crate::assets::font::FontFace;

pub use crate::composition::builder::GifBuilder;
pub use crate::composition::model::{
    ANIMATED_EXTENSION, AnimatedSource, Axis, BannerLayer, ContentSource, CornerRadius, ExpColor,
    ExpOptions, FontSpec, FrameContent, FrameLayer, FrameShape, FrameText, ImageLayer,
    ImageSource, LayerCategory, LoadingIndicator, LoadingOptions, LoadingShape, Operation,
    Outline, ProgressBar, SourceRef, TextAlign, TextLayer, TextOptions, is_animated_bytes,
    is_animated_name,
};
pub use crate::composition::scene::{ContentDef, OperationDef, Scene, SourceDef};

pub use crate::resolve::decoder::{GifFileDecoder, InMemoryDecoder, SequenceDecoder};
pub use crate::resolve::resolver::{
    ContentResolver, Paint, ResolvedQueue, ResolvedSource, resolve_queue,
};
pub use crate::resolve::timeline::{CursorSet, CyclicCursor, Timeline, cycle};

pub use crate::render::backend::{CanvasBackend, DrawCall, FrameRGBA, RecordingCanvas};
pub use crate::render::cpu::{CpuCanvas, DEFAULT_FONT_SIZE};
pub use crate::render::dispatch::FrameDispatcher;
pub use crate::render::pipeline::{Collaborators, render_gif};

pub use crate::encode::config::{EncoderConfig, QuantizeAlgorithm, Repeat};
pub use crate::encode::gif::ImageGifEncoder;
pub use crate::encode::session::EncodingSession;
pub use crate::encode::sink::{EncoderCall, GifEncoding, InMemoryEncoder};

pub use crate::progress::{PROGRESS_LABEL, ProgressReporter, SilentProgress, TracingProgress};
