use crate::composition::model::Operation;
use crate::encode::config::EncoderConfig;
use crate::encode::session::EncodingSession;
use crate::encode::sink::GifEncoding;
use crate::foundation::core::Canvas;
use crate::foundation::error::GifStackResult;
use crate::progress::ProgressReporter;
use crate::render::backend::CanvasBackend;
use crate::render::dispatch::FrameDispatcher;
use crate::resolve::decoder::SequenceDecoder;

/// The collaborators one finalize pass talks to.
pub struct Collaborators<'a> {
    /// Expands animated sources.
    pub decoder: &'a mut dyn SequenceDecoder,
    /// Draws operations and captures frames.
    pub backend: &'a mut dyn CanvasBackend,
    /// Writes the output stream.
    pub encoder: &'a mut dyn GifEncoding,
    /// Receives per-frame progress.
    pub progress: &'a mut dyn ProgressReporter,
}

/// Resolve, render and encode `ops` into GIF bytes.
///
/// Pipeline:
/// 1. resolve every content source in queue order
/// 2. start the encoding session with `config`
/// 3. replay the queue once per output index and append each frame
/// 4. finish the session
///
/// Any error aborts the pass; nothing partial is returned.
#[tracing::instrument(skip_all, fields(ops = ops.len(), width = canvas.width, height = canvas.height))]
pub fn render_gif(
    ops: &[Operation],
    canvas: Canvas,
    config: &EncoderConfig,
    collaborators: &mut Collaborators<'_>,
) -> GifStackResult<Vec<u8>> {
    canvas.validate()?;
    let mut dispatcher = FrameDispatcher::new(ops, canvas);
    dispatcher.resolve(collaborators.decoder)?;

    let mut session = EncodingSession::start(collaborators.encoder, canvas, config)?;
    while let Some((idx, frame)) =
        dispatcher.next_frame(collaborators.backend, collaborators.progress)?
    {
        session.add_frame(idx, &frame)?;
    }
    let frames = session.frames();
    let bytes = session.finish()?;
    tracing::info!(frames, bytes = bytes.len(), "gif encoded");
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
