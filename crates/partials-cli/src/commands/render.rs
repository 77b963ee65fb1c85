//! Offline rendering of a knob performance to WAV.

use super::common::{ConfigSource, ControlArgs, build_engine, build_sampler, load_config};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use partials_io::write_wav;
use partials_platform::{OfflineRenderer, ParamStore};
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Length of the render in seconds
    #[arg(short, long, default_value = "5.0")]
    duration: f32,

    #[command(flatten)]
    controls: ControlArgs,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: RenderArgs, source: ConfigSource<'_>) -> anyhow::Result<()> {
    if !(args.duration.is_finite() && args.duration > 0.0) {
        anyhow::bail!("Duration must be positive, got {}", args.duration);
    }

    let config = load_config(source)?;
    let sample_rate = config.audio.sample_rate;
    let frames = (f64::from(args.duration) * f64::from(sample_rate)).round() as usize;

    let store = ParamStore::new(config.initial_params());
    let sampler = build_sampler(&args.controls, &config, store);
    let engine = build_engine(&config);
    let mut renderer = OfflineRenderer::new(sampler, engine, config.audio.block_size as usize);

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(frames as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );

    let mut audio = vec![0.0f32; frames];
    renderer.render_into(&mut audio, |written| pb.inc(written as u64));
    pb.finish_and_clear();

    write_wav(&args.output, &audio, sample_rate)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    let peak = audio.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let sampler = renderer.sampler();
    tracing::info!(
        frames,
        ticks = sampler.ticks(),
        skipped = sampler.skipped(),
        peak,
        "render finished"
    );
    println!(
        "Rendered {:.2}s ({} frames, {} control ticks, peak {:.3}) to {}",
        args.duration,
        frames,
        sampler.ticks(),
        peak,
        args.output.display()
    );
    Ok(())
}
