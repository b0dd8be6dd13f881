//! Inbound frame validation and delivery
//!
//! The link driver invokes [`FrameReceiver::handle_frame`] whenever a
//! datagram arrives, from whatever context the driver runs in. Frames
//! failing validation are counted and dropped without touching the jitter
//! buffer; valid payload is forwarded and arrival timing feeds the gap
//! diagnostics.

use std::sync::Arc;
use std::time::Instant;

use crate::audio::JitterBuffer;
use crate::transport::stats::TransportStats;

/// Validator and unpacker for inbound frames
///
/// An owned value: move it into the driver context that produces frames
/// (a socket thread, a radio callback). Independent receivers carry
/// independent arrival state, so several links can coexist.
pub struct FrameReceiver {
    header: Vec<u8>,
    max_frame_len: usize,
    gap_threshold_ms: u32,
    buffer: Arc<JitterBuffer>,
    stats: Arc<TransportStats>,
    last_arrival: Option<Instant>,
}

impl FrameReceiver {
    pub fn new(
        header: Vec<u8>,
        max_frame_len: usize,
        gap_threshold_ms: u32,
        buffer: Arc<JitterBuffer>,
        stats: Arc<TransportStats>,
    ) -> Self {
        Self {
            header,
            max_frame_len,
            gap_threshold_ms,
            buffer,
            stats,
            last_arrival: None,
        }
    }

    /// Validate one inbound frame and forward its payload.
    pub fn handle_frame(&mut self, data: &[u8]) {
        self.handle_frame_at(data, Instant::now());
    }

    /// Same as [`FrameReceiver::handle_frame`] with an explicit arrival
    /// time, so gap accounting is observable without wall-clock waits.
    pub fn handle_frame_at(&mut self, data: &[u8], now: Instant) {
        // a frame must carry at least one payload byte and fit the MTU
        if data.len() <= self.header.len() || data.len() > self.max_frame_len {
            self.stats.record_rx_invalid_length();
            tracing::debug!(len = data.len(), "dropping frame with out-of-range length");
            return;
        }
        if data[..self.header.len()] != self.header[..] {
            self.stats.record_rx_bad_header();
            tracing::debug!("dropping frame with unknown header");
            return;
        }

        if let Some(previous) = self.last_arrival {
            let gap_ms = now
                .saturating_duration_since(previous)
                .as_millis()
                .min(u128::from(u32::MAX)) as u32;
            if gap_ms > self.gap_threshold_ms {
                self.stats.record_rx_gap_event();
            }
            self.stats.observe_rx_gap_ms(gap_ms);
        }
        self.last_arrival = Some(now);

        let payload = &data[self.header.len()..];
        self.buffer.push(payload);
        self.stats.record_rx_ok(payload.len());
    }
}
