//! UDP broadcast link
//!
//! Desktop stand-in for a broadcast radio: frames go out as UDP broadcast
//! datagrams and arrive on a dedicated listener thread that plays the role
//! of the radio driver, invoking the frame receiver for every datagram.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use socket2::{Domain, Protocol, Socket, Type};

use crate::error::NetworkError;
use crate::transport::{BroadcastLink, FrameReceiver};

fn make_socket(bind: SocketAddr, broadcast: bool) -> Result<UdpSocket, NetworkError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
    socket
        .set_reuse_address(true)
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
    if broadcast {
        socket
            .set_broadcast(true)
            .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
    }
    socket
        .bind(&bind.into())
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
    Ok(socket.into())
}

/// Transmit side: broadcasts each frame as one datagram
pub struct UdpBroadcastLink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpBroadcastLink {
    pub fn new(bind: SocketAddr, target: SocketAddr) -> Result<Self, NetworkError> {
        let socket = make_socket(bind, true)?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl BroadcastLink for UdpBroadcastLink {
    fn send(&mut self, frame: &[u8]) -> Result<(), NetworkError> {
        self.socket
            .send_to(frame, self.target)
            .map_err(|e| NetworkError::SendFailed(e.to_string()))?;
        Ok(())
    }
}

/// Receive side: a dedicated thread owning the [`FrameReceiver`]
///
/// The thread is the asynchronous receive context: it delivers every
/// datagram straight into `FrameReceiver::handle_frame`, independent of
/// the transmit and playback loops. Socket errors surface through
/// [`UdpFrameListener::check_errors`].
pub struct UdpFrameListener {
    running: Arc<AtomicBool>,
    local_addr: SocketAddr,
    thread_handle: Option<JoinHandle<()>>,
    error_rx: Option<Receiver<NetworkError>>,
}

impl UdpFrameListener {
    /// Bind `addr` and start delivering datagrams to `receiver`.
    pub fn start(addr: SocketAddr, mut receiver: FrameReceiver) -> Result<Self, NetworkError> {
        let socket = make_socket(addr, false)?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
        // short read timeout so the thread notices the stop flag
        socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

        let running = Arc::new(AtomicBool::new(true));
        let running_for_loop = running.clone();
        let (error_tx, error_rx) = bounded::<NetworkError>(16);

        let handle = thread::Builder::new()
            .name("udp-frame-listener".to_string())
            .spawn(move || {
                // must exceed the MTU: oversized datagrams have to arrive
                // intact so length validation rejects them
                let mut buf = [0u8; 2048];
                while running_for_loop.load(Ordering::Relaxed) {
                    match socket.recv_from(&mut buf) {
                        Ok((len, _addr)) => receiver.handle_frame(&buf[..len]),
                        Err(e)
                            if matches!(
                                e.kind(),
                                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                            ) => {}
                        Err(e) => {
                            let _ = error_tx.try_send(NetworkError::ReceiveFailed(e.to_string()));
                        }
                    }
                }
            })
            .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

        Ok(Self {
            running,
            local_addr,
            thread_handle: Some(handle),
            error_rx: Some(error_rx),
        })
    }

    /// Address the listener actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Check for socket errors reported by the listener thread
    pub fn check_errors(&self) -> Option<NetworkError> {
        self.error_rx.as_ref().and_then(|rx| rx.try_recv().ok())
    }

    /// Stop the listener thread and wait for it to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for UdpFrameListener {
    fn drop(&mut self) {
        self.stop();
    }
}
