//! Display reporting.
//!
//! The reporter reads the published parameters every `interval` and hands a
//! [`RenderRequest`] to a [`DisplaySink`]. It never writes shared state and
//! has no timing relationship to audio; a slow sink only delays the next
//! render.
//!
//! A request carries the same text and waveform preview a small monochrome
//! panel would show: two text lines and one waveform row per pixel column
//! beneath an 18-pixel header.

use std::f32::consts::TAU;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use partials_core::ControlParams;
use tracing::{info, warn};

use crate::store::ParamStore;

/// Pixel rows reserved for the text lines above the waveform.
pub const HEADER_HEIGHT: u32 = 18;

/// Parameters and surface geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// Fundamental frequency in Hz.
    pub frequency: f32,
    /// Fundamental amplitude.
    pub amplitude: f32,
    /// Partial frequency ratio.
    pub base: f32,
    /// Partial amplitude falloff.
    pub decay: f32,
    /// Partials drawn in the preview.
    pub partials: usize,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

impl RenderRequest {
    /// Build a request from a parameter snapshot.
    pub fn new(params: &ControlParams, partials: usize, width: u32, height: u32) -> Self {
        Self {
            frequency: params.frequency,
            amplitude: params.amplitude,
            base: params.base,
            decay: params.decay,
            partials,
            width,
            height,
        }
    }

    /// The two header lines: integer frequency and base to two decimals.
    ///
    /// ```rust
    /// use partials_core::ControlParams;
    /// use partials_platform::RenderRequest;
    ///
    /// let req = RenderRequest::new(&ControlParams::new(440.7, 0.2, 1.25, 2.0), 6, 128, 64);
    /// assert_eq!(req.text_lines(), ["Freq: 440 Hz".to_string(), "Base: 1.25".to_string()]);
    /// ```
    pub fn text_lines(&self) -> [String; 2] {
        [
            format!("Freq: {} Hz", self.frequency as i64),
            format!("Base: {:.2}", self.base),
        ]
    }

    /// Preview value at normalized position `t` across one fundamental cycle:
    /// `Σ a/d^n · sin(2πt · b^n)`.
    pub fn waveform_value(&self, t: f32) -> f32 {
        let phase = t * TAU;
        let base = neutral_if_degenerate(self.base);
        let decay = neutral_if_degenerate(self.decay);
        (0..self.partials)
            .map(|n| {
                let n = n as i32;
                self.amplitude / decay.powi(n) * (phase * base.powi(n)).sin()
            })
            .sum()
    }

    /// Pixel row of the waveform for every column `0..width`.
    ///
    /// Rows are centred in the area below the header and clamped to the
    /// surface. An empty surface yields no rows.
    pub fn waveform_rows(&self) -> Vec<u32> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        let wave_height = self.height.saturating_sub(HEADER_HEIGHT);
        let top = HEADER_HEIGHT.min(self.height - 1);
        let bottom = self.height - 1;
        let center = (top + wave_height / 2) as f32;
        let half = (wave_height / 2) as f32;

        (0..self.width)
            .map(|x| {
                let value = self.waveform_value(x as f32 / self.width as f32);
                let y = (center - half * value).trunc();
                if y.is_finite() {
                    (y.max(0.0) as u32).clamp(top, bottom)
                } else {
                    top + wave_height / 2
                }
            })
            .collect()
    }
}

fn neutral_if_degenerate(ratio: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

/// Something that can show a [`RenderRequest`].
pub trait DisplaySink {
    /// Render one request. Failures are the sink's own business.
    fn render(&mut self, request: &RenderRequest);
}

/// Collects every request; handy for tests and offline inspection.
impl DisplaySink for Vec<RenderRequest> {
    fn render(&mut self, request: &RenderRequest) {
        self.push(*request);
    }
}

/// Writes one status line per render to any [`Write`] target.
///
/// With the preview enabled, a line of block glyphs approximating the
/// waveform follows each status line.
#[derive(Debug)]
pub struct TerminalDisplay<W: Write> {
    out: W,
    preview: bool,
    failed: bool,
}

impl<W: Write> TerminalDisplay<W> {
    /// Create a terminal display writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            preview: false,
            failed: false,
        }
    }

    /// Enable or disable the waveform preview line.
    #[must_use]
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_request(&mut self, request: &RenderRequest) -> std::io::Result<()> {
        let [freq, base] = request.text_lines();
        writeln!(
            self.out,
            "{freq} | {base} | Amp: {:.2} | Decay: {:.2}",
            request.amplitude, request.decay
        )?;
        if self.preview {
            writeln!(self.out, "{}", preview_line(request))?;
        }
        self.out.flush()
    }
}

impl<W: Write> DisplaySink for TerminalDisplay<W> {
    fn render(&mut self, request: &RenderRequest) {
        if let Err(err) = self.write_request(request) {
            // Report once; a closed terminal would otherwise flood the log
            if !self.failed {
                warn!(error = %err, "terminal display write failed");
                self.failed = true;
            }
        }
    }
}

/// Map waveform rows onto eight block glyphs, highest row tallest.
fn preview_line(request: &RenderRequest) -> String {
    const GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let top = HEADER_HEIGHT.min(request.height.saturating_sub(1));
    let bottom = request.height.saturating_sub(1);
    let span = bottom.saturating_sub(top).max(1) as f32;
    request
        .waveform_rows()
        .iter()
        .map(|&row| {
            let height = (bottom - row.min(bottom)) as f32 / span;
            GLYPHS[((height * 7.0).round() as usize).min(7)]
        })
        .collect()
}

/// Emits each render as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDisplay;

impl DisplaySink for TracingDisplay {
    fn render(&mut self, request: &RenderRequest) {
        info!(
            target: "partials::display",
            frequency = request.frequency,
            amplitude = request.amplitude,
            base = request.base,
            decay = request.decay,
            "display"
        );
    }
}

/// Periodically renders the published parameters to a sink.
#[derive(Debug)]
pub struct DisplayReporter<D> {
    sink: D,
    store: ParamStore,
    interval: Duration,
    partials: usize,
    width: u32,
    height: u32,
    renders: u64,
}

impl<D: DisplaySink> DisplayReporter<D> {
    /// Create a reporter for a `width × height` surface.
    pub fn new(
        sink: D,
        store: ParamStore,
        interval: Duration,
        partials: usize,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            sink,
            store,
            interval,
            partials,
            width,
            height,
            renders: 0,
        }
    }

    /// Render the current snapshot once and return the request sent.
    pub fn render_once(&mut self) -> RenderRequest {
        let params = self.store.load();
        let request = RenderRequest::new(&params, self.partials, self.width, self.height);
        self.sink.render(&request);
        self.renders += 1;
        request
    }

    /// Render every `interval` until `stop` is set.
    pub fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Acquire) {
            self.render_once();
            thread::sleep(self.interval);
        }
    }

    /// Renders so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// The sink.
    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Consume the reporter, returning the sink.
    pub fn into_sink(self) -> D {
        self.sink
    }
}
