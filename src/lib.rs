//! # PTT Voice Streamer
//!
//! Low-latency push-to-talk voice streaming over an unreliable,
//! unacknowledged, best-effort broadcast link.
//!
//! ## Architecture Overview
//!
//! ```text
//!  TRANSMIT CONTEXT                                    RECEIVE CONTEXT
//!  ┌────────────────┐                                  ┌──────────────────┐
//!  │ Capture driver │ 16-bit samples                   │ Link driver      │
//!  │ (external)     │──────┐                           │ (UDP listener /  │
//!  └────────────────┘      ▼                           │  radio callback) │
//!                   ┌─────────────┐                    └────────┬─────────┘
//!                   │ NoiseGate   │                             │ datagrams
//!                   │ + 8-bit     │                             ▼
//!                   │ downsample  │                    ┌──────────────────┐
//!                   └──────┬──────┘                    │ FrameReceiver    │
//!                          ▼                           │ header/length    │
//!                   ┌─────────────┐    MTU-bounded     │ validation, gap  │
//!                   │ Framer      │    header-tagged   │ diagnostics      │
//!                   │ (transport) │────── frames ────▶ └────────┬─────────┘
//!                   └──────┬──────┘    over the air             │ payload
//!                          │                                    ▼
//!                          ▼                           ┌──────────────────┐
//!                   ┌─────────────┐                    │ JitterBuffer     │
//!                   │BroadcastLink│                    │ conceal + slew   │
//!                   └─────────────┘                    └────────┬─────────┘
//!                                                               │ fixed-cadence pop
//!                                                               ▼
//!                                                      PLAYBACK CONTEXT
//!                                                      ┌──────────────────┐
//!                                                      │ Playback driver  │
//!                                                      │ (external)       │
//!                                                      └──────────────────┘
//! ```
//!
//! Three execution contexts touch the core: the transmit loop drives the
//! [`transport::Framer`], the link driver invokes the
//! [`transport::FrameReceiver`] whenever a frame arrives, and the playback
//! loop drains the [`audio::JitterBuffer`] at the device cadence. The jitter
//! buffer is the only shared mutable state and is protected by a single
//! coarse lock; transport counters are atomics.

pub mod audio;
pub mod config;
pub mod error;
pub mod network;
pub mod transport;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Default sample rate for the voice stream
    pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

    /// Largest frame the broadcast link will carry (link MTU)
    pub const MAX_FRAME_SIZE: usize = 250;

    /// Default jitter buffer pre-roll depth in samples (120 ms at 16 kHz)
    pub const DEFAULT_TARGET_DEPTH: usize = 120 * 16;

    /// Center of the 8-bit unsigned PCM sample space
    pub const PCM_CENTER: u8 = 128;

    /// Arrival gaps longer than this count as a gap event
    pub const DEFAULT_GAP_THRESHOLD_MS: u32 = 30;

    /// Default UDP port for the broadcast demo link
    pub const DEFAULT_UDP_PORT: u16 = 5000;

    /// Default header tag prefixed to every frame
    pub const DEFAULT_FRAME_HEADER: [u8; 2] = *b"V1";
}
