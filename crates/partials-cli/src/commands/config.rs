//! Configuration file management.

use super::common::{ConfigSource, load_config};
use anyhow::Context;
use clap::{Args, Subcommand};
use partials_config::{SynthConfig, user_config_file};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML (`--defaults` for the built-in one)
    Show,

    /// Write a default configuration file
    Init {
        /// Destination (the user config file if omitted)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Check a configuration file and report every problem
    Validate {
        /// File to check (the --config file or the one found on disk if omitted)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

pub fn run(args: ConfigArgs, source: ConfigSource<'_>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            print!("{}", load_config(source)?.to_toml()?);
        }

        ConfigCommand::Init { path, force } => {
            let path = path.unwrap_or_else(user_config_file);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            SynthConfig::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }

        ConfigCommand::Validate { path } => {
            let path = path
                .or_else(|| source.path().map(Path::to_path_buf))
                .or_else(partials_config::find_config)
                .context("no configuration file to validate")?;
            let config = SynthConfig::load(&path)?;
            match config.validate() {
                Ok(()) => println!("{}: ok", path.display()),
                Err(err) => {
                    let problems = err.into_vec();
                    println!("{}: {} problem(s)", path.display(), problems.len());
                    for problem in &problems {
                        println!("  - {problem}");
                    }
                    anyhow::bail!("configuration is invalid");
                }
            }
        }
    }

    Ok(())
}
