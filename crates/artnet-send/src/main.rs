use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use artnet_engine::{ArtNetEngine, ArtNetError, UniverseAddress};

mod config;
mod logging_setup;
mod pattern;

use config::SenderConfig;

fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SenderConfig::load(&path)?,
        None => SenderConfig::default(),
    };

    logging_setup::init(&config.log)?;
    run(&config)
}

fn run(config: &SenderConfig) -> Result<()> {
    let output = &config.output;
    output.validate().context("Invalid output settings")?;

    let engine = ArtNetEngine::new();
    let engine_config = engine
        .configure(&config.artnet)
        .context("Invalid Art-Net settings")?;

    let universes = if output.universes.is_empty() {
        vec![engine_config.base_address]
    } else {
        output
            .universes
            .iter()
            .map(|&port_address| UniverseAddress::from_port_address(port_address))
            .collect::<artnet_engine::Result<Vec<_>>>()
            .context("Invalid universe in output.universes")?
    };

    engine.start().context("Failed to open Art-Net socket")?;

    let frame_time = Duration::from_secs_f64(1.0 / output.rate_hz as f64);
    // Past the range of `Instant` means "run until killed"
    let deadline = output
        .duration_secs
        .and_then(|secs| Instant::now().checked_add(Duration::from_secs_f64(secs)));

    tracing::info!(
        "Sending {:?} to {} universe(s) at {} Hz",
        output.pattern,
        universes.len(),
        output.rate_hz
    );

    let mut frame = 0u64;
    let mut failed_passes = 0u64;
    let mut channels = Vec::with_capacity(output.channels);
    let mut next_frame = Instant::now();

    while deadline.map_or(true, |d| Instant::now() < d) {
        output.pattern.render(frame, output.channels, &mut channels);
        for universe in &universes {
            if let Err(e) = engine.set_dmx_data(Some(*universe), &channels) {
                tracing::warn!("Skipping universe {}: {}", universe, e);
            }
        }

        match engine.send_dmx() {
            Ok(_) => {}
            // Transient, the next pass retries
            Err(e @ ArtNetError::SendAborted { .. }) => {
                failed_passes += 1;
                tracing::debug!("{}", e);
            }
            Err(e) => return Err(e).context("Send pass failed"),
        }

        frame += 1;
        next_frame += frame_time;
        let now = Instant::now();
        if next_frame > now {
            thread::sleep(next_frame - now);
        } else {
            next_frame = now;
        }
    }

    engine.stop();
    tracing::info!("Sent {} frames ({} incomplete)", frame, failed_passes);
    Ok(())
}
