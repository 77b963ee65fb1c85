//! Single-threaded rendering of a control performance.
//!
//! [`OfflineRenderer`] replays the live arrangement on one thread: the
//! sampler ticks once every `sample_rate / poll_hz` frames and the engine
//! renders fixed-size blocks from whatever the store holds at block start.
//! With a deterministic [`RawSource`] the output is bit-for-bit repeatable.

use partials_synth::AdditiveEngine;
use tracing::debug;

use crate::sampler::ControlSampler;
use crate::source::RawSource;

/// Sampler and engine driven from a shared sample clock.
#[derive(Debug)]
pub struct OfflineRenderer<S> {
    sampler: ControlSampler<S>,
    engine: AdditiveEngine,
    block_size: usize,
    frames_per_tick: usize,
    frames_since_tick: usize,
}

impl<S: RawSource> OfflineRenderer<S> {
    /// Create a renderer. The first block is preceded by a sampler tick.
    pub fn new(sampler: ControlSampler<S>, engine: AdditiveEngine, block_size: usize) -> Self {
        let poll_hz = f64::from(sampler.settings().poll_hz);
        let ratio = f64::from(engine.sample_rate()) / poll_hz;
        let frames_per_tick = if ratio.is_finite() && ratio >= 1.0 {
            ratio.round() as usize
        } else {
            1
        };
        debug!(block_size, frames_per_tick, "offline renderer ready");

        Self {
            sampler,
            engine,
            block_size: block_size.max(1),
            frames_per_tick,
            frames_since_tick: frames_per_tick,
        }
    }

    /// Render `frames` samples into a new buffer.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render_into(&mut out, |_| {});
        out
    }

    /// Fill `out` block by block, calling `on_block` with the frames written
    /// after each block.
    pub fn render_into(&mut self, out: &mut [f32], mut on_block: impl FnMut(usize)) {
        for block in out.chunks_mut(self.block_size) {
            while self.frames_since_tick >= self.frames_per_tick {
                self.sampler.tick();
                self.frames_since_tick -= self.frames_per_tick;
            }

            let params = self.sampler.store().load();
            self.engine.process_block(&params, block);
            self.frames_since_tick += block.len();
            on_block(block.len());
        }
    }

    /// Frames between sampler ticks.
    pub fn frames_per_tick(&self) -> usize {
        self.frames_per_tick
    }

    /// The sampler.
    pub fn sampler(&self) -> &ControlSampler<S> {
        &self.sampler
    }

    /// The engine.
    pub fn engine(&self) -> &AdditiveEngine {
        &self.engine
    }
}
