//! Frame transport
//!
//! Packetizes the transmit sample stream into MTU-bounded, header-tagged
//! frames, validates and unpacks inbound frames, and keeps link-health
//! counters. The radio itself sits behind the [`BroadcastLink`] seam.

pub mod framer;
pub mod receiver;
pub mod stats;

pub use framer::Framer;
pub use receiver::FrameReceiver;
pub use stats::{TransportStats, TransportSnapshot};

use crate::error::NetworkError;

/// One-way broadcast transmission primitive.
///
/// Implementations hand a completed frame to the underlying radio or
/// socket. Broadcast is fire-and-forget: no acknowledgement, no retry;
/// a failure is reported once and the stream moves on.
pub trait BroadcastLink {
    fn send(&mut self, frame: &[u8]) -> Result<(), NetworkError>;
}
