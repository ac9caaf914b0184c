//! Stereo wavetable oscillator driven by the real-time callback
//!
//! Left and right read the same table through independent phase accumulators
//! advancing at different steps, so the channels are audibly distinct in pitch.

use super::types::{CallbackResult, RenderCallback, StatusFlags, StreamTimeInfo, CHANNEL_COUNT};
use super::wavetable::Wavetable;
use std::sync::Arc;

/// Table entries the left channel advances per frame
pub const LEFT_PHASE_STEP: usize = 1;

/// Table entries the right channel advances per frame (higher pitch)
pub const RIGHT_PHASE_STEP: usize = 3;

/// Integer index into a wavetable, always in `[0, len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseAccumulator {
    index: usize,
    step: usize,
    len: usize,
}

impl PhaseAccumulator {
    /// Accumulator at `index`; panics unless `index < len`
    pub fn new(index: usize, step: usize, len: usize) -> Self {
        assert!(index < len, "phase {} outside table of {} entries", index, len);
        Self { index, step, len }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move forward one frame, wrapping modulo the table length
    #[inline]
    pub fn advance(&mut self) {
        self.index = (self.index + self.step) % self.len;
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

/// Session state bound into each stream: shared table plus both phases
#[derive(Debug, Clone)]
pub struct SineOscillator {
    table: Arc<Wavetable>,
    left: PhaseAccumulator,
    right: PhaseAccumulator,
}

impl SineOscillator {
    /// Oscillator with both phases at zero; panics on an empty table
    pub fn new(table: Arc<Wavetable>) -> Self {
        Self::with_phases(table, 0, 0)
    }

    /// Oscillator starting at the given left/right phases
    pub fn with_phases(table: Arc<Wavetable>, left_phase: usize, right_phase: usize) -> Self {
        let len = table.len();
        Self {
            left: PhaseAccumulator::new(left_phase, LEFT_PHASE_STEP, len),
            right: PhaseAccumulator::new(right_phase, RIGHT_PHASE_STEP, len),
            table,
        }
    }

    pub fn left_phase(&self) -> usize {
        self.left.index()
    }

    pub fn right_phase(&self) -> usize {
        self.right.index()
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

impl RenderCallback for SineOscillator {
    /// Fill `output` with interleaved left/right frames.
    ///
    /// Timing info and status flags are accepted and ignored: the signal does
    /// not depend on when or how the engine calls. Always continues; the
    /// controller, not the callback, decides when the stream stops.
    fn render(
        &mut self,
        output: &mut [f32],
        _time: &StreamTimeInfo,
        _flags: StatusFlags,
    ) -> CallbackResult {
        for frame in output.chunks_exact_mut(CHANNEL_COUNT as usize) {
            frame[0] = self.table.get(self.left.index());
            frame[1] = self.table.get(self.right.index());
            self.left.advance();
            self.right.advance();
        }

        CallbackResult::Continue
    }
}
