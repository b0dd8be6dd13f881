//! Jitter buffer and framer throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use ptt_voice_streamer::audio::JitterBuffer;
use ptt_voice_streamer::config::NoiseGateConfig;
use ptt_voice_streamer::error::NetworkError;
use ptt_voice_streamer::transport::{BroadcastLink, Framer, TransportStats};

struct NullLink;

impl BroadcastLink for NullLink {
    fn send(&mut self, frame: &[u8]) -> Result<(), NetworkError> {
        black_box(frame);
        Ok(())
    }
}

fn bench_jitter_buffer(c: &mut Criterion) {
    // 20 ms chunks at 16 kHz, the steady-state workload
    let chunk = vec![0x80u8; 320];

    c.bench_function("jitter_push_pop_320", |b| {
        let buffer = JitterBuffer::new(1920).unwrap();
        let mut out = vec![0u8; 320];
        b.iter(|| {
            buffer.push(black_box(&chunk));
            buffer.pop_into(black_box(&mut out));
        });
    });

    c.bench_function("jitter_pop_concealing_320", |b| {
        let buffer = JitterBuffer::new(1920).unwrap();
        let mut out = vec![0u8; 320];
        b.iter(|| {
            buffer.pop_into(black_box(&mut out));
        });
    });
}

fn bench_framer(c: &mut Criterion) {
    c.bench_function("framer_push_i16_320", |b| {
        let stats = Arc::new(TransportStats::new());
        let mut framer =
            Framer::new(NullLink, 250, NoiseGateConfig::default(), stats).unwrap();
        framer.set_header(b"V1").unwrap();
        b.iter(|| {
            for i in 0..320i16 {
                framer.push_sample_i16(black_box(i * 64));
            }
        });
    });
}

criterion_group!(benches, bench_jitter_buffer, bench_framer);
criterion_main!(benches);
