//! Concrete broadcast links
//!
//! The UDP link is the shipping transport; the loopback link keeps the
//! same delivery shape for radio-free testing.

pub mod loopback;
pub mod udp;

pub use loopback::{LoopbackDriver, LoopbackLink};
pub use udp::{UdpBroadcastLink, UdpFrameListener};
