//! Partials CLI - play, render and configure the additive synthesizer.

mod commands;

use clap::{Parser, Subcommand};
use commands::common::ConfigSource;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "partials")]
#[command(author, version, about = "Four-knob additive wavetable synthesizer", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user or system config)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run on the built-in default configuration, ignoring any config file
    #[arg(long, global = true, conflicts_with = "config")]
    defaults: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play live to an audio device
    Play(commands::play::PlayArgs),

    /// Render a knob performance to a WAV file
    Render(commands::render::RenderArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),

    /// Show, create or check a configuration file
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigSource::from_flags(cli.config.as_deref(), cli.defaults);

    match cli.command {
        Commands::Play(args) => commands::play::run(args, config),
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Config(args) => commands::config::run(args, config),
    }
}
