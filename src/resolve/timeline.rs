use crate::composition::model::LayerCategory;
use crate::foundation::core::FrameIndex;
use crate::resolve::resolver::ResolvedQueue;

/// Sub-frame shown after `plays` previous draws: `seq[plays mod len]`.
///
/// `None` only for an empty sequence, which resolution never produces.
pub fn cycle<T>(seq: &[T], plays: u64) -> Option<&T> {
    if seq.is_empty() {
        return None;
    }
    let i = plays % (seq.len() as u64);
    seq.get(i as usize)
}

/// Output timeline of one finalize pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeline {
    length: u64,
}

impl Timeline {
    /// Longest sequence length, or 1 when everything is static.
    pub fn from_resolved(resolved: &ResolvedQueue) -> Self {
        let length = resolved.sequence_lengths().max().unwrap_or(1).max(1) as u64;
        Self { length }
    }

    /// Number of output frames.
    pub fn length(self) -> u64 {
        self.length
    }

    /// Output indices in order.
    pub fn indices(self) -> impl Iterator<Item = FrameIndex> {
        (0..self.length).map(FrameIndex)
    }
}

/// Per-category cursor.
///
/// The slot counter restarts at every output frame and identifies which sequence of the
/// category is being drawn; the play counters persist across frames.
#[derive(Clone, Debug, Default)]
pub struct CyclicCursor {
    slot: usize,
    plays: Vec<u64>,
}

impl CyclicCursor {
    /// Fresh cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the slot counter for a new output frame.
    pub fn begin_frame(&mut self) {
        self.slot = 0;
    }

    /// Pick the sub-frame for the next slot of this category and record the play.
    pub fn advance<'s, T>(&mut self, seq: &'s [T]) -> Option<&'s T> {
        let slot = self.slot;
        self.slot += 1;
        if self.plays.len() <= slot {
            self.plays.resize(slot + 1, 0);
        }
        let plays = self.plays[slot];
        self.plays[slot] += 1;
        cycle(seq, plays)
    }

    /// Times the sequence in `slot` has been drawn so far.
    pub fn plays(&self, slot: usize) -> u64 {
        self.plays.get(slot).copied().unwrap_or(0)
    }
}

/// One [`CyclicCursor`] per [`LayerCategory`].
#[derive(Clone, Debug, Default)]
pub struct CursorSet {
    cursors: [CyclicCursor; LayerCategory::COUNT],
}

impl CursorSet {
    /// Fresh cursors for a new pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart every slot counter.
    pub fn begin_frame(&mut self) {
        for c in &mut self.cursors {
            c.begin_frame();
        }
    }

    /// Cursor for `category`.
    pub fn get(&self, category: LayerCategory) -> &CyclicCursor {
        &self.cursors[category.index()]
    }

    /// Mutable cursor for `category`.
    pub fn get_mut(&mut self, category: LayerCategory) -> &mut CyclicCursor {
        &mut self.cursors[category.index()]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/timeline.rs"]
mod tests;
