use crate::assets::drawable::Drawable;
use crate::composition::model::{LayerCategory, Operation};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::progress::{PROGRESS_LABEL, ProgressReporter};
use crate::render::backend::{CanvasBackend, FrameRGBA};
use crate::resolve::decoder::SequenceDecoder;
use crate::resolve::resolver::{Paint, ResolvedQueue, ResolvedSource, resolve_queue};
use crate::resolve::timeline::{CursorSet, Timeline};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DispatchState {
    Resolving,
    Dispatching { next: u64 },
    Done,
}

/// Replays the operation queue once per output index.
///
/// Lifecycle: [`FrameDispatcher::resolve`] once, then [`FrameDispatcher::next_frame`] until it
/// returns `None`.
pub struct FrameDispatcher<'q> {
    ops: &'q [Operation],
    canvas: Canvas,
    state: DispatchState,
    resolved: ResolvedQueue,
    timeline: Option<Timeline>,
    cursors: CursorSet,
}

impl<'q> FrameDispatcher<'q> {
    /// Dispatcher over `ops` for `canvas`, in the resolving state.
    pub fn new(ops: &'q [Operation], canvas: Canvas) -> Self {
        Self {
            ops,
            canvas,
            state: DispatchState::Resolving,
            resolved: ResolvedQueue::default(),
            timeline: None,
            cursors: CursorSet::new(),
        }
    }

    /// Resolve every source and fix the timeline. Only valid once.
    #[tracing::instrument(skip_all, fields(ops = self.ops.len()))]
    pub fn resolve(&mut self, decoder: &mut dyn SequenceDecoder) -> GifStackResult<Timeline> {
        if self.state != DispatchState::Resolving {
            return Err(GifStackError::validation("dispatcher already resolved"));
        }
        self.resolved = resolve_queue(self.ops, decoder)?;
        let timeline = Timeline::from_resolved(&self.resolved);
        tracing::info!(frames = timeline.length(), "timeline resolved");
        self.timeline = Some(timeline);
        self.cursors = CursorSet::new();
        self.state = DispatchState::Dispatching { next: 0 };
        Ok(timeline)
    }

    /// Timeline fixed by [`FrameDispatcher::resolve`].
    pub fn timeline(&self) -> Option<Timeline> {
        self.timeline
    }

    /// `true` once every output frame has been produced.
    pub fn is_done(&self) -> bool {
        self.state == DispatchState::Done
    }

    /// Render the next output frame, or `None` once the timeline is exhausted.
    pub fn next_frame(
        &mut self,
        backend: &mut dyn CanvasBackend,
        progress: &mut dyn ProgressReporter,
    ) -> GifStackResult<Option<(FrameIndex, FrameRGBA)>> {
        let next = match self.state {
            DispatchState::Resolving => {
                return Err(GifStackError::validation("dispatch before resolve"));
            }
            DispatchState::Done => return Ok(None),
            DispatchState::Dispatching { next } => next,
        };
        let total = self
            .timeline
            .map(Timeline::length)
            .ok_or_else(|| GifStackError::validation("dispatch before resolve"))?;

        backend.begin_frame(self.canvas)?;
        self.cursors.begin_frame();
        for (i, op) in self.ops.iter().enumerate() {
            draw_operation(backend, &self.resolved, &mut self.cursors, i, op)?;
        }
        let frame = backend.snapshot()?;
        tracing::trace!(frame = next, "frame rendered");
        progress.report(next + 1, total, PROGRESS_LABEL);

        self.state = if next + 1 >= total {
            DispatchState::Done
        } else {
            DispatchState::Dispatching { next: next + 1 }
        };
        Ok(Some((FrameIndex(next), frame)))
    }
}

fn resolved_at<'r>(
    resolved: &'r ResolvedQueue,
    index: usize,
    op: &Operation,
) -> GifStackResult<&'r ResolvedSource> {
    resolved.get(index).ok_or_else(|| {
        GifStackError::validation(format!("{} operation #{index} was not resolved", op.name()))
    })
}

/// Pick the drawable for this frame from an image-shaped source.
fn image_for<'r>(
    source: &'r ResolvedSource,
    cursors: &mut CursorSet,
    category: LayerCategory,
) -> GifStackResult<&'r Drawable> {
    match source {
        ResolvedSource::Static(Paint::Image(d)) => Ok(d),
        ResolvedSource::Static(Paint::Color(_)) => {
            Err(GifStackError::render("image content resolved to a color"))
        }
        ResolvedSource::Sequence(frames) => cursors
            .get_mut(category)
            .advance(frames)
            .ok_or_else(|| GifStackError::render("empty sequence")),
    }
}

fn draw_operation(
    backend: &mut dyn CanvasBackend,
    resolved: &ResolvedQueue,
    cursors: &mut CursorSet,
    index: usize,
    op: &Operation,
) -> GifStackResult<()> {
    match op {
        Operation::CornerRadius(p) => backend.corner_radius(p),
        Operation::Background(_) => match resolved_at(resolved, index, op)? {
            ResolvedSource::Static(paint) => backend.background(paint),
            ResolvedSource::Sequence(frames) => {
                let d = cursors
                    .get_mut(LayerCategory::Background)
                    .advance(frames)
                    .ok_or_else(|| GifStackError::render("empty sequence"))?;
                backend.background(&Paint::Image(d.clone()))
            }
        },
        Operation::Image(layer) => {
            let src = resolved_at(resolved, index, op)?;
            let d = image_for(src, cursors, LayerCategory::Image)?;
            backend.image(layer, d)
        }
        Operation::Frame(layer) => {
            if layer.content.image_source().is_none() {
                return backend.frame(layer, None);
            }
            let src = resolved_at(resolved, index, op)?;
            let d = image_for(src, cursors, LayerCategory::Frame)?;
            backend.frame(layer, Some(d))
        }
        Operation::Banner(layer) => {
            if layer.content.image_source().is_none() {
                return backend.banner(layer, None);
            }
            let src = resolved_at(resolved, index, op)?;
            let d = image_for(src, cursors, LayerCategory::Banner)?;
            backend.banner(layer, Some(d))
        }
        Operation::Text(t) => backend.text(t),
        Operation::Font(f) => backend.font(f),
        Operation::Exp(bar) => backend.exp(bar),
        Operation::Loading(l) => backend.loading(l),
        Operation::Axis(a) => backend.axis(*a),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dispatch.rs"]
mod tests;
