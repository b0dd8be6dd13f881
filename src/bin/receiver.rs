//! Voice Receiver Application
//!
//! Listens for broadcast voice frames, feeds the jitter buffer, and drains
//! it at the playback cadence. A real deployment hands each drained chunk
//! to a speaker driver; the demo tracks the output level range instead.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ptt_voice_streamer::{
    audio::JitterBuffer,
    config::AppConfig,
    network::UdpFrameListener,
    transport::{FrameReceiver, TransportStats},
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

    tracing::info!("Starting voice receiver");

    let config = AppConfig::default();

    let bind: SocketAddr = format!("{}:{}", config.network.bind_address, config.network.udp_port)
        .parse()
        .expect("Invalid bind address");

    let buffer = Arc::new(JitterBuffer::new(config.stream.target_depth)?);
    let stats = Arc::new(TransportStats::new());
    let receiver = FrameReceiver::new(
        config.stream.frame_header.clone(),
        config.stream.frame_capacity,
        config.stream.gap_threshold_ms,
        buffer.clone(),
        stats.clone(),
    );

    let listener = UdpFrameListener::start(bind, receiver)?;
    tracing::info!(
        "Listening on {} ({} sample pre-roll, {} sample store)",
        listener.local_addr(),
        buffer.target_depth(),
        buffer.capacity()
    );

    // Playback loop: drain 20 ms chunks at the device cadence. The sink is
    // external; the demo just watches the level range like a VU meter.
    let chunk_samples = (config.stream.sample_rate / 50) as usize;
    let mut chunk = vec![0u8; chunk_samples];
    let mut level_min = u8::MAX;
    let mut level_max = u8::MIN;
    let mut last_stats = Instant::now();

    loop {
        buffer.pop_into(&mut chunk);
        for &value in &chunk {
            level_min = level_min.min(value);
            level_max = level_max.max(value);
        }

        tokio::time::sleep(Duration::from_millis(20)).await;

        if last_stats.elapsed() >= Duration::from_secs(5) {
            let jitter = buffer.snapshot_and_reset_stats();
            let transport = stats.snapshot_and_reset();
            tracing::info!(
                "RX stats: {} frames / {} bytes ok, {} bad header, {} bad length, \
                 {} gaps (max {} ms), {} underruns, {} overflows, level {}..{}",
                transport.rx_ok_frames,
                transport.rx_ok_bytes,
                transport.rx_bad_header,
                transport.rx_invalid_length,
                transport.rx_gap_events,
                transport.rx_max_gap_ms,
                jitter.underruns,
                jitter.overflows,
                level_min,
                level_max
            );
            if let Some(e) = listener.check_errors() {
                tracing::warn!("listener error: {}", e);
            }
            level_min = u8::MAX;
            level_max = u8::MIN;
            last_stats = Instant::now();
        }
    }
}
