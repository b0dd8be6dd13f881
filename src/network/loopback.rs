//! In-process loopback link
//!
//! Radio-free transport for local testing: frames the framer sends are
//! queued as they would be in flight, and a driver half delivers them to
//! the frame receiver on demand. Keeps the asynchronous-delivery shape of
//! a real link without any sockets.

use bytes::Bytes;
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::NetworkError;
use crate::transport::{BroadcastLink, FrameReceiver};

/// Transmit half: queues frames instead of broadcasting them
pub struct LoopbackLink {
    tx: Sender<Bytes>,
}

/// Receive half: owns the [`FrameReceiver`] and plays the link driver
pub struct LoopbackDriver {
    rx: Receiver<Bytes>,
    receiver: FrameReceiver,
}

impl LoopbackLink {
    /// Create a connected link/driver pair holding at most `depth` frames
    /// in flight.
    pub fn pair(receiver: FrameReceiver, depth: usize) -> (LoopbackLink, LoopbackDriver) {
        let (tx, rx) = bounded(depth);
        (LoopbackLink { tx }, LoopbackDriver { rx, receiver })
    }
}

impl BroadcastLink for LoopbackLink {
    fn send(&mut self, frame: &[u8]) -> Result<(), NetworkError> {
        self.tx
            .try_send(Bytes::copy_from_slice(frame))
            .map_err(|e| NetworkError::SendFailed(e.to_string()))
    }
}

impl LoopbackDriver {
    /// Deliver every queued frame to the receiver; returns how many.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(frame) = self.rx.try_recv() {
            self.receiver.handle_frame(&frame);
            delivered += 1;
        }
        delivered
    }
}
