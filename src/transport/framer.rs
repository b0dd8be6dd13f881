//! Outbound frame assembly
//!
//! Accumulates the transmit sample stream into header-prefixed frames and
//! hands each completed frame to the broadcast link. The 16-bit entry
//! point runs the noise gate and the 8-bit downsample first; the 8-bit
//! entry point is for producers that already speak the wire format.

use std::sync::Arc;

use crate::audio::gate::{downsample_to_u8, NoiseGate};
use crate::config::NoiseGateConfig;
use crate::constants::MAX_FRAME_SIZE;
use crate::error::TransportError;
use crate::transport::stats::TransportStats;
use crate::transport::BroadcastLink;

/// Packetizer for the transmit path
///
/// Driven synchronously by the transmit loop; not shared across contexts.
pub struct Framer<L: BroadcastLink> {
    link: L,
    stats: Arc<TransportStats>,
    gate: NoiseGate,
    /// header bytes followed by the payload being filled
    frame: Vec<u8>,
    header_len: usize,
    payload_len: usize,
    frame_capacity: usize,
}

impl<L: BroadcastLink> Framer<L> {
    pub fn new(
        link: L,
        frame_capacity: usize,
        gate: NoiseGateConfig,
        stats: Arc<TransportStats>,
    ) -> Result<Self, TransportError> {
        if frame_capacity == 0 || frame_capacity > MAX_FRAME_SIZE {
            return Err(TransportError::FrameTooLarge(frame_capacity));
        }
        Ok(Self {
            link,
            stats,
            gate: NoiseGate::new(gate),
            frame: vec![0; frame_capacity],
            header_len: 0,
            payload_len: 0,
            frame_capacity,
        })
    }

    /// Tag every outgoing frame with `header`.
    ///
    /// The header is a peer contract: receivers drop frames that carry
    /// anything else. Configure it once at session start, before pushing
    /// samples.
    pub fn set_header(&mut self, header: &[u8]) -> Result<(), TransportError> {
        if header.len() >= self.frame_capacity {
            return Err(TransportError::HeaderTooLarge {
                header: header.len(),
                capacity: self.frame_capacity,
            });
        }
        self.frame[..header.len()].copy_from_slice(header);
        self.header_len = header.len();
        Ok(())
    }

    /// Gate, downsample, and enqueue one capture sample.
    pub fn push_sample_i16(&mut self, sample: i16) {
        let gated = self.gate.process(sample);
        self.push_sample_u8(downsample_to_u8(gated));
    }

    /// Enqueue one sample already in the 8-bit wire format.
    pub fn push_sample_u8(&mut self, sample: u8) {
        self.frame[self.header_len + self.payload_len] = sample;
        self.payload_len += 1;
        if self.header_len + self.payload_len == self.frame_capacity {
            self.send_frame();
        }
    }

    /// Transmit a partially filled frame so the end of a talk spurt is not
    /// stranded waiting for a full one.
    pub fn flush(&mut self) {
        if self.payload_len > 0 {
            self.send_frame();
        }
    }

    /// Payload samples waiting for the frame to fill
    pub fn pending(&self) -> usize {
        self.payload_len
    }

    /// Whether the noise gate currently passes audio
    pub fn gate_open(&self) -> bool {
        self.gate.is_open()
    }

    fn send_frame(&mut self) {
        self.stats.record_tx_frame();
        let len = self.header_len + self.payload_len;
        if let Err(e) = self.link.send(&self.frame[..len]) {
            self.stats.record_tx_failure();
            tracing::warn!("frame send failed: {e}");
        }
        self.payload_len = 0;
    }
}
