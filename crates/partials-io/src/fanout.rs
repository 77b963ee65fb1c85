//! Mono-to-interleaved fan-out for device buffers.

/// Renders mono blocks into a preallocated scratch buffer and copies each
/// sample to every channel of an interleaved device buffer.
///
/// Device buffers of any size are split into blocks no longer than the
/// scratch, so the render closure always sees at most `max_block` frames and
/// nothing is allocated once the fan-out exists.
#[derive(Debug, Clone)]
pub struct MonoFanout {
    channels: usize,
    scratch: Vec<f32>,
}

impl MonoFanout {
    /// Create a fan-out for `channels` interleaved channels, rendering at
    /// most `max_block` frames at a time. Both are clamped to at least 1.
    pub fn new(channels: u16, max_block: usize) -> Self {
        Self {
            channels: usize::from(channels.max(1)),
            scratch: vec![0.0; max_block.max(1)],
        }
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Largest block handed to the render closure.
    pub fn max_block(&self) -> usize {
        self.scratch.len()
    }

    /// Fill `out` with rendered audio, calling `render` once per block.
    ///
    /// Trailing samples that do not make up a whole frame are zeroed.
    /// Returns the number of frames written.
    pub fn fill(&mut self, out: &mut [f32], mut render: impl FnMut(&mut [f32])) -> usize {
        let channels = self.channels;
        let frames = out.len() / channels;
        let whole = frames * channels;

        for chunk in out[..whole].chunks_mut(self.scratch.len() * channels) {
            let block = &mut self.scratch[..chunk.len() / channels];
            render(block);
            for (frame, &sample) in chunk.chunks_exact_mut(channels).zip(block.iter()) {
                frame.fill(sample);
            }
        }
        out[whole..].fill(0.0);
        frames
    }
}
