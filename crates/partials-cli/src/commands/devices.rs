//! Audio output device listing.

use clap::Args;
use partials_io::{AudioBackend, CpalBackend};

#[derive(Args)]
pub struct DevicesArgs {
    /// Show only the default output device
    #[arg(long)]
    default: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let backend = CpalBackend::new();

    if args.default {
        match backend.default_output_device()? {
            Some(device) => {
                println!("Default Output:");
                println!("  Name: {}", device.name);
                println!("  Channels: {}", device.channels);
                println!("  Sample Rate: {} Hz", device.default_sample_rate);
            }
            None => println!("Default Output: None"),
        }
        return Ok(());
    }

    let devices = backend.list_devices()?;
    if devices.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let marker = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} ch, {} Hz){}",
            idx, device.name, device.channels, device.default_sample_rate, marker
        );
    }
    println!();
    println!("Tip: select one by (partial) name with --output:");
    println!("  partials play --output \"USB\"");
    Ok(())
}
