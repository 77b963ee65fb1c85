//! Live playback: sampler thread, audio stream and display reporter.

use super::common::{ConfigSource, ControlArgs, build_engine, build_sampler, load_config};
use anyhow::Context;
use clap::Args;
use partials_io::{AudioBackend, CpalBackend, MonoFanout, OutputStreamConfig};
use partials_platform::{DisplayReporter, ParamStore, TerminalDisplay};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    controls: ControlArgs,

    /// Output device (exact or partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Device buffer size in frames (device default if omitted)
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Stop after this many seconds
    #[arg(short, long, value_name = "SECONDS")]
    duration: Option<f32>,

    /// Show a waveform preview under each status line
    #[arg(long)]
    preview: bool,
}

pub fn run(args: PlayArgs, source: ConfigSource<'_>) -> anyhow::Result<()> {
    let config = load_config(source)?;
    let backend = CpalBackend::new();

    let device_name = args.output.clone().or_else(|| config.audio.device.clone());
    let channels = output_channels(&backend, device_name.as_deref())?;

    let store = ParamStore::new(config.initial_params());
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Release);
        })?;
    }

    let sampler = build_sampler(&args.controls, &config, store.clone())
        .spawn(Arc::clone(&stop))
        .context("failed to start control sampler")?;

    let mut engine = build_engine(&config);
    let mut fanout = MonoFanout::new(channels, config.audio.block_size as usize);
    let callback_store = store.clone();

    let stream_config = OutputStreamConfig {
        sample_rate: config.audio.sample_rate,
        buffer_size: args.buffer_size,
        channels,
        device_name,
    };
    let stream = backend.build_output_stream(
        &stream_config,
        Box::new(move |data: &mut [f32]| {
            fanout.fill(data, |block| {
                let params = callback_store.load();
                engine.process_block(&params, block);
            });
        }),
        Box::new(|err: &str| tracing::warn!(error = err, "audio stream error")),
    );
    let stream = match stream {
        Ok(stream) => stream,
        Err(err) => {
            sampler.stop();
            if sampler.join().is_err() {
                tracing::warn!("control sampler thread panicked");
            }
            return Err(err).context("failed to open audio output");
        }
    };

    println!(
        "Playing {} partials at {} Hz on {} channel(s). Press Ctrl+C to stop.",
        config.voice.partials, config.audio.sample_rate, channels
    );

    if let Some(seconds) = args.duration {
        let stop = Arc::clone(&stop);
        let limit = Duration::try_from_secs_f32(seconds.max(0.0)).unwrap_or(Duration::ZERO);
        thread::Builder::new()
            .name("partials-timer".into())
            .spawn(move || {
                thread::sleep(limit);
                stop.store(true, Ordering::Release);
            })
            .context("failed to start timer")?;
    }

    let started = Instant::now();
    if config.display.enabled {
        let display = TerminalDisplay::new(std::io::stdout()).with_preview(args.preview);
        let mut reporter = DisplayReporter::new(
            display,
            store.clone(),
            config.display_interval(),
            config.voice.partials,
            config.display.width,
            config.display.height,
        );
        reporter.run(&stop);
    } else {
        while !stop.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(50));
        }
    }

    drop(stream);
    let sampler = sampler
        .join()
        .map_err(|_| anyhow::anyhow!("control sampler thread panicked"))?;
    tracing::info!(
        seconds = started.elapsed().as_secs_f32(),
        ticks = sampler.ticks(),
        skipped = sampler.skipped(),
        publishes = store.publish_count(),
        "playback stopped"
    );
    println!("Stopped.");
    Ok(())
}

/// Channel count of the chosen output device.
fn output_channels(backend: &dyn AudioBackend, name: Option<&str>) -> anyhow::Result<u16> {
    let device = match name {
        Some(search) => {
            let needle = search.to_lowercase();
            backend
                .list_devices()?
                .into_iter()
                .find(|d| d.name.to_lowercase().contains(&needle))
        }
        None => backend.default_output_device()?,
    };
    let device = device.with_context(|| match name {
        Some(search) => format!("no output device matching '{search}'"),
        None => "no default output device".to_string(),
    })?;
    tracing::info!(device = %device.name, channels = device.channels, "output device");
    Ok(device.channels)
}
