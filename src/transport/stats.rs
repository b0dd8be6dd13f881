//! Link-health counters
//!
//! Transmit and receive sides increment from different execution contexts
//! while a diagnostics loop reads and clears, so every counter is an
//! atomic and the snapshot swaps each one to zero individually.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Shared transport counters
///
/// One instance is shared (via `Arc`) by the framer, the frame receiver,
/// and whatever reports diagnostics.
#[derive(Debug, Default)]
pub struct TransportStats {
    rx_ok_frames: AtomicU64,
    rx_ok_bytes: AtomicU64,
    rx_bad_header: AtomicU64,
    rx_invalid_length: AtomicU64,
    rx_gap_events: AtomicU64,
    rx_max_gap_ms: AtomicU32,
    tx_frames: AtomicU64,
    tx_failures: AtomicU64,
}

/// Point-in-time counter values returned by
/// [`TransportStats::snapshot_and_reset`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportSnapshot {
    pub rx_ok_frames: u64,
    pub rx_ok_bytes: u64,
    pub rx_bad_header: u64,
    pub rx_invalid_length: u64,
    pub rx_gap_events: u64,
    pub rx_max_gap_ms: u32,
    pub tx_frames: u64,
    pub tx_failures: u64,
}

impl TransportStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_rx_ok(&self, payload_bytes: usize) {
        self.rx_ok_frames.fetch_add(1, Ordering::Relaxed);
        self.rx_ok_bytes
            .fetch_add(payload_bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_rx_bad_header(&self) {
        self.rx_bad_header.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rx_invalid_length(&self) {
        self.rx_invalid_length.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rx_gap_event(&self) {
        self.rx_gap_events.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn observe_rx_gap_ms(&self, gap_ms: u32) {
        self.rx_max_gap_ms.fetch_max(gap_ms, Ordering::Relaxed);
    }

    pub(crate) fn record_tx_frame(&self) {
        self.tx_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tx_failure(&self) {
        self.tx_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return current values and clear every counter (read-and-clear)
    pub fn snapshot_and_reset(&self) -> TransportSnapshot {
        TransportSnapshot {
            rx_ok_frames: self.rx_ok_frames.swap(0, Ordering::Relaxed),
            rx_ok_bytes: self.rx_ok_bytes.swap(0, Ordering::Relaxed),
            rx_bad_header: self.rx_bad_header.swap(0, Ordering::Relaxed),
            rx_invalid_length: self.rx_invalid_length.swap(0, Ordering::Relaxed),
            rx_gap_events: self.rx_gap_events.swap(0, Ordering::Relaxed),
            rx_max_gap_ms: self.rx_max_gap_ms.swap(0, Ordering::Relaxed),
            tx_frames: self.tx_frames.swap(0, Ordering::Relaxed),
            tx_failures: self.tx_failures.swap(0, Ordering::Relaxed),
        }
    }
}
