//! Voice Sender Application
//!
//! Frames a synthesized voice-band test tone and broadcasts it over UDP.
//! A real deployment feeds the framer from a microphone driver instead;
//! the tone source keeps the demo self-contained.

use anyhow::Result;
use std::f32::consts::TAU;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ptt_voice_streamer::{
    config::AppConfig,
    network::UdpBroadcastLink,
    transport::{Framer, TransportStats},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting voice sender");

    let config = AppConfig::default();

    // Target address from args or broadcast on the default port
    let target: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| {
            format!(
                "{}:{}",
                config.network.broadcast_address, config.network.udp_port
            )
        })
        .parse()
        .expect("Invalid target address");

    tracing::info!("Broadcasting to {}", target);

    let link = UdpBroadcastLink::new("0.0.0.0:0".parse()?, target)?;
    let stats = Arc::new(TransportStats::new());
    let mut framer = Framer::new(link, config.stream.frame_capacity, config.gate, stats.clone())?;
    framer.set_header(&config.stream.frame_header)?;

    let sample_rate = config.stream.sample_rate;
    // 20 ms of samples per iteration, matching real capture cadence
    let chunk_samples = (sample_rate / 50) as usize;
    let phase_step = 440.0 * TAU / sample_rate as f32;
    let amplitude = 6000.0f32;
    let mut phase = 0.0f32;
    let mut last_stats = Instant::now();

    tracing::info!(
        "Sending 440 Hz talk spurts at {} Hz, {} byte frames - press Ctrl+C to stop",
        sample_rate,
        config.stream.frame_capacity
    );

    loop {
        // 2 s talk spurt, one 20 ms chunk per iteration
        for _ in 0..100 {
            for _ in 0..chunk_samples {
                let sample = (phase.sin() * amplitude) as i16;
                phase += phase_step;
                if phase >= TAU {
                    phase -= TAU;
                }
                framer.push_sample_i16(sample);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        // end of spurt: get the partial frame on the air
        framer.flush();

        // 1 s of silence between spurts
        tokio::time::sleep(Duration::from_secs(1)).await;

        if last_stats.elapsed() >= Duration::from_secs(5) {
            let snapshot = stats.snapshot_and_reset();
            tracing::info!(
                "TX stats: {} frames sent, {} failures, gate {}",
                snapshot.tx_frames,
                snapshot.tx_failures,
                if framer.gate_open() { "open" } else { "closed" }
            );
            last_stats = Instant::now();
        }
    }
}
