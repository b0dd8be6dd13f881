//! Playback jitter buffer
//!
//! Decouples bursty frame arrival from the fixed-cadence playback loop.
//! The buffer is a circular byte store with two modes: while `Buffering`
//! it accumulates samples up to a target depth and feeds the consumer a
//! synthesized concealment signal; once the pre-roll is reached it plays
//! buffered audio. Underruns fade the output toward the PCM center instead
//! of snapping to silence, and the first samples played after an underrun
//! are slew-limited so the seam back to live audio does not click.
//!
//! One producer context (the receive callback) and one consumer context
//! (the playback loop) share the buffer through `Arc`; every operation
//! takes a single coarse lock for the duration of the call. Critical
//! sections are O(chunk length), never O(session length).

use parking_lot::Mutex;

use crate::constants::PCM_CENTER;
use crate::error::BufferError;

/// Largest per-sample step while easing concealment output toward center
const CONCEAL_STEP: i32 = 4;

/// Largest per-sample step for audio played right after an underrun
const RECOVERY_SLEW: i32 = 12;

/// How many played samples stay slew-limited after an underrun
const RECOVERY_WINDOW: u32 = 32;

/// Capacity headroom over the target depth for [`JitterBuffer::new`]
const CAPACITY_MARGIN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Buffering,
    Playing,
}

/// Underrun/overflow counters, snapshotted and cleared together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JitterStats {
    pub underruns: u64,
    pub overflows: u64,
}

struct Inner {
    buf: Vec<u8>,
    read_index: usize,
    write_index: usize,
    available: usize,
    target_depth: usize,
    mode: Mode,
    /// Last emitted value; seeds concealment and slew across calls
    last_output: u8,
    recovery_remaining: u32,
    underruns: u64,
    overflows: u64,
}

impl Inner {
    fn push_sample(&mut self, sample: u8) {
        let capacity = self.buf.len();
        self.buf[self.write_index] = sample;
        self.write_index = (self.write_index + 1) % capacity;
        if self.available < capacity {
            self.available += 1;
        } else {
            // full: evict the oldest byte so the newest always fits
            self.read_index = (self.read_index + 1) % capacity;
            self.overflows += 1;
        }
    }

    fn next_sample(&mut self) -> u8 {
        if self.available == 0 && self.mode == Mode::Playing {
            self.mode = Mode::Buffering;
            self.underruns += 1;
            self.recovery_remaining = RECOVERY_WINDOW;
        }

        if self.mode == Mode::Buffering && self.available < self.target_depth {
            // conceal the gap by easing toward center instead of a hard jump
            let previous = i32::from(self.last_output);
            let step = (i32::from(PCM_CENTER) - previous).clamp(-CONCEAL_STEP, CONCEAL_STEP);
            let value = (previous + step) as u8;
            self.last_output = value;
            value
        } else {
            if self.mode == Mode::Buffering {
                self.mode = Mode::Playing;
                // restart the slew window armed by the underrun; a fresh
                // buffer's first fill has no window to restart
                if self.recovery_remaining > 0 {
                    self.recovery_remaining = RECOVERY_WINDOW;
                }
            }
            let raw = self.buf[self.read_index];
            self.read_index = (self.read_index + 1) % self.buf.len();
            self.available -= 1;

            let mut value = i32::from(raw);
            if self.recovery_remaining > 0 {
                let previous = i32::from(self.last_output);
                value = previous + (value - previous).clamp(-RECOVERY_SLEW, RECOVERY_SLEW);
                self.recovery_remaining -= 1;
            }
            let value = value as u8;
            self.last_output = value;
            value
        }
    }
}

/// Circular buffer of 8-bit unsigned PCM samples with underrun concealment
///
/// Shared between the receive callback (producer) and the playback loop
/// (consumer); both sides hold an `Arc<JitterBuffer>` and call through
/// `&self`.
pub struct JitterBuffer {
    inner: Mutex<Inner>,
}

impl JitterBuffer {
    /// Create a buffer with the default 3x capacity headroom over
    /// `target_depth`.
    pub fn new(target_depth: usize) -> Result<Self, BufferError> {
        Self::with_capacity(target_depth.saturating_mul(CAPACITY_MARGIN), target_depth)
    }

    /// Create a buffer with an explicit capacity.
    ///
    /// This is the only fallible operation on the buffer; an invalid
    /// geometry must abort session startup.
    pub fn with_capacity(capacity: usize, target_depth: usize) -> Result<Self, BufferError> {
        if capacity < 2 {
            return Err(BufferError::CapacityTooSmall(capacity));
        }
        if target_depth < 1 || target_depth >= capacity {
            return Err(BufferError::InvalidTargetDepth {
                target: target_depth,
                capacity,
            });
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                buf: vec![0; capacity],
                read_index: 0,
                write_index: 0,
                available: 0,
                target_depth,
                mode: Mode::Buffering,
                last_output: PCM_CENTER,
                recovery_remaining: 0,
                underruns: 0,
                overflows: 0,
            }),
        })
    }

    /// Append samples from the transport.
    ///
    /// Never fails and never blocks the producer: when the buffer is full
    /// the oldest byte is evicted per incoming byte, so the store always
    /// holds the most recent `capacity` bytes.
    pub fn push(&self, samples: &[u8]) {
        let mut inner = self.inner.lock();
        for &sample in samples {
            inner.push_sample(sample);
        }
    }

    /// Fill `out` completely, concealing as needed.
    ///
    /// The request is always fully satisfied; the consumer never sees a
    /// short read or an error.
    pub fn pop_into(&self, out: &mut [u8]) {
        let mut inner = self.inner.lock();
        for slot in out.iter_mut() {
            *slot = inner.next_sample();
        }
    }

    /// Allocating convenience wrapper around [`JitterBuffer::pop_into`].
    pub fn pop(&self, count: usize) -> Vec<u8> {
        let mut out = vec![0u8; count];
        self.pop_into(&mut out);
        out
    }

    /// Number of buffered, unread samples
    pub fn available(&self) -> usize {
        self.inner.lock().available
    }

    /// Total size of the backing store
    pub fn capacity(&self) -> usize {
        self.inner.lock().buf.len()
    }

    /// Current pre-roll depth
    pub fn target_depth(&self) -> usize {
        self.inner.lock().target_depth
    }

    /// Whether the buffer is accumulating pre-roll
    pub fn is_buffering(&self) -> bool {
        self.inner.lock().mode == Mode::Buffering
    }

    /// Change the pre-roll depth, clamped to `[1, capacity - 1]`
    pub fn set_target_depth(&self, target_depth: usize) {
        let mut inner = self.inner.lock();
        let max = inner.buf.len() - 1;
        inner.target_depth = target_depth.clamp(1, max);
    }

    /// Return and clear the underrun/overflow counters
    pub fn snapshot_and_reset_stats(&self) -> JitterStats {
        let mut inner = self.inner.lock();
        let stats = JitterStats {
            underruns: inner.underruns,
            overflows: inner.overflows,
        };
        inner.underruns = 0;
        inner.overflows = 0;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn buffer(capacity: usize, target: usize) -> JitterBuffer {
        JitterBuffer::with_capacity(capacity, target).unwrap()
    }

    #[test]
    fn test_construction_validation() {
        assert!(JitterBuffer::with_capacity(0, 1).is_err());
        assert!(JitterBuffer::with_capacity(16, 0).is_err());
        assert!(JitterBuffer::with_capacity(16, 16).is_err());
        assert!(JitterBuffer::with_capacity(16, 15).is_ok());

        let buf = JitterBuffer::new(100).unwrap();
        assert_eq!(buf.capacity(), 300);
        assert_eq!(buf.target_depth(), 100);
    }

    #[test]
    fn test_round_trip_unmodified() {
        let buf = buffer(48, 16);
        let data: Vec<u8> = (1..=40).collect();
        buf.push(&data);
        assert_eq!(buf.pop(40), data);
        assert_eq!(buf.snapshot_and_reset_stats(), JitterStats::default());
    }

    #[test]
    fn test_overflow_keeps_newest() {
        let buf = buffer(8, 2);
        let data: Vec<u8> = (0..13).collect();
        buf.push(&data);

        let stats = buf.snapshot_and_reset_stats();
        assert_eq!(stats.overflows, 5);
        assert_eq!(buf.available(), 8);
        // content is the last `capacity` bytes pushed
        assert_eq!(buf.pop(8), &data[5..]);
    }

    #[test]
    fn test_underrun_counted_once_per_transition() {
        let buf = buffer(48, 4);
        buf.push(&[10, 20, 30, 40]);
        buf.pop(4);
        assert!(!buf.is_buffering());

        // one empty pop of many samples is still a single underrun event
        buf.pop(16);
        assert!(buf.is_buffering());
        assert_eq!(buf.snapshot_and_reset_stats().underruns, 1);

        // further empty pops while already buffering add nothing
        buf.pop(16);
        assert_eq!(buf.snapshot_and_reset_stats().underruns, 0);
    }

    #[test]
    fn test_fresh_buffer_conceals_without_underrun() {
        let buf = buffer(48, 16);
        // never played, so an empty pop is pre-roll, not an underrun
        let out = buf.pop(8);
        assert_eq!(out, vec![PCM_CENTER; 8]);
        assert_eq!(buf.snapshot_and_reset_stats().underruns, 0);
    }

    #[test]
    fn test_concealment_eases_toward_center() {
        let buf = buffer(48, 4);
        buf.push(&[200, 200, 200, 200]);
        buf.pop(4);

        // underrun: output fades from 200 toward 128, at most 4 per step
        let out = buf.pop(24);
        let mut previous = 200i32;
        for &value in &out {
            let value = i32::from(value);
            assert!((value - previous).abs() <= 4);
            assert!(value <= previous);
            assert!(value >= i32::from(PCM_CENTER));
            previous = value;
        }
        // long enough to land exactly on center and stay there
        assert_eq!(*out.last().unwrap(), PCM_CENTER);
    }

    #[test]
    fn test_recovery_slew_bound() {
        let buf = buffer(200, 16);
        buf.push(&vec![200u8; 16]);
        buf.pop(16);

        // underrun, concealment fades toward center
        let concealed = buf.pop(8);
        let mut previous = i32::from(*concealed.last().unwrap());

        // refill with audio far from the concealed level
        buf.push(&vec![10u8; 48]);
        let out = buf.pop(48);
        for (i, &value) in out.iter().enumerate() {
            let value = i32::from(value);
            if i < 32 {
                assert!(
                    (value - previous).abs() <= 12,
                    "sample {i} jumped {} -> {}",
                    previous,
                    value
                );
            }
            previous = value;
        }
        // slew has converged onto the live signal by the end
        assert_eq!(*out.last().unwrap(), 10);
    }

    #[test]
    fn test_preroll_then_play_scenario() {
        let buf = buffer(48, 16);
        let data: Vec<u8> = (1..=16).collect();
        buf.push(&data);
        assert_eq!(buf.available(), 16);

        // pre-roll satisfied: playback starts and returns the bytes as-is
        assert_eq!(buf.pop(16), data);
        assert!(!buf.is_buffering());

        // next pop underruns; first concealment byte eases 16 toward 128
        let out = buf.pop(1);
        assert_eq!(out[0], 20);
        assert!(buf.is_buffering());
        assert_eq!(buf.snapshot_and_reset_stats().underruns, 1);
    }

    #[test]
    fn test_buffering_holds_until_target_depth() {
        let buf = buffer(48, 16);
        buf.push(&[7; 8]);
        // below target: still concealing, buffered bytes untouched
        buf.pop(4);
        assert_eq!(buf.available(), 8);
        assert!(buf.is_buffering());

        buf.push(&[7; 8]);
        assert_eq!(buf.pop(1), vec![7]);
        assert!(!buf.is_buffering());
    }

    #[test]
    fn test_set_target_depth_clamps() {
        let buf = buffer(48, 16);
        buf.set_target_depth(0);
        assert_eq!(buf.target_depth(), 1);
        buf.set_target_depth(1000);
        assert_eq!(buf.target_depth(), 47);
        buf.set_target_depth(20);
        assert_eq!(buf.target_depth(), 20);
    }

    #[test]
    fn test_stats_reset_on_snapshot() {
        let buf = buffer(8, 2);
        buf.push(&[0; 12]);
        buf.pop(10);

        let first = buf.snapshot_and_reset_stats();
        assert!(first.overflows > 0);
        assert!(first.underruns > 0);
        assert_eq!(buf.snapshot_and_reset_stats(), JitterStats::default());
    }

    #[test]
    fn test_concurrent_push_pop() {
        use std::sync::Arc;

        let buf = Arc::new(buffer(1024, 64));
        let producer = {
            let buf = buf.clone();
            std::thread::spawn(move || {
                for chunk in (0..200u32).map(|i| vec![(i % 256) as u8; 96]) {
                    buf.push(&chunk);
                }
            })
        };
        let consumer = {
            let buf = buf.clone();
            std::thread::spawn(move || {
                let mut out = [0u8; 128];
                for _ in 0..150 {
                    buf.pop_into(&mut out);
                }
            })
        };
        producer.join().unwrap();
        consumer.join().unwrap();
        assert!(buf.available() <= buf.capacity());
    }

    proptest! {
        #[test]
        fn prop_available_never_exceeds_capacity(pushes in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..64), 0..32)
        ) {
            let buf = buffer(128, 16);
            for chunk in &pushes {
                buf.push(chunk);
                prop_assert!(buf.available() <= buf.capacity());
            }
        }

        #[test]
        fn prop_round_trip_at_or_above_target(data in proptest::collection::vec(any::<u8>(), 16..128)) {
            let buf = buffer(128, 16);
            buf.push(&data);
            prop_assert_eq!(buf.pop(data.len()), data);
        }

        #[test]
        fn prop_overflow_count_matches_excess(extra in 1usize..64) {
            let capacity = 64;
            let buf = buffer(capacity, 8);
            buf.push(&vec![1u8; capacity + extra]);
            prop_assert_eq!(buf.snapshot_and_reset_stats().overflows, extra as u64);
            prop_assert_eq!(buf.available(), capacity);
        }

        #[test]
        fn prop_pop_always_fills(request in 1usize..256) {
            let buf = buffer(64, 8);
            buf.push(&[42; 20]);
            let out = buf.pop(request);
            prop_assert_eq!(out.len(), request);
        }
    }
}
