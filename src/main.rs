//! wavplay - main entry point
//!
//! Plays a linear-PCM RIFF/WAVE file: decode the container, wait for an audio
//! output device to appear, then stream the samples through a pull-based
//! output session until the device reports the end of the stream.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wavplay::audio::{self, CpalAudioSink, CpalDeviceMonitor};
use wavplay::playback::PlaybackEngine;
use wavplay::{wave, Error};

/// Command-line arguments for wavplay
#[derive(Parser, Debug)]
#[command(name = "wavplay")]
#[command(about = "Plays a linear-PCM RIFF/WAVE file to an audio output device")]
#[command(version)]
struct Args {
    /// Path of the WAVE file to play
    wav_path: Option<PathBuf>,

    /// Restrict discovery to the output device with this name
    #[arg(short, long, env = "WAVPLAY_DEVICE")]
    device: Option<String>,

    /// Seconds to wait for an output device to appear
    #[arg(long, default_value = "5", env = "WAVPLAY_DISCOVERY_TIMEOUT")]
    discovery_timeout_secs: u64,

    /// List available output devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavplay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.list_devices {
        for name in audio::list_output_devices().context("Failed to enumerate output devices")? {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(wav_path) = args.wav_path else {
        Args::command().print_help()?;
        std::process::exit(1);
    };

    let decoded = wave::decode_file(&wav_path)
        .with_context(|| format!("Failed to decode {}", wav_path.display()))?;
    info!(
        "{}: {:.1}s of {}ch {}Hz {}",
        wav_path.display(),
        decoded
            .pcm
            .duration_seconds(decoded.format, decoded.sample_rate, decoded.channels),
        decoded.channels,
        decoded.sample_rate,
        decoded.format,
    );

    let timeout = Duration::from_secs(args.discovery_timeout_secs);
    let monitor = CpalDeviceMonitor::new(args.device.clone());
    info!("waiting for an audio output device");
    let device = audio::resolve(&monitor, timeout).ok_or(Error::DeviceResolutionTimeout(timeout))?;
    info!("using output device '{}'", device.name());

    let sink = CpalAudioSink::new(device, decoded.format, decoded.sample_rate, decoded.channels);
    let mut engine = PlaybackEngine::new(sink);
    engine
        .play(decoded.pcm)
        .context("Playback session failed")?;

    Ok(())
}
