//! Whole-block processing cost.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::{
    io::{midi::MidiEvent, AudioInput, AudioOutput},
    EngineConfig, PolyEngine, MAX_VOICES,
};

use super::TickVoice;
use crate::BLOCK_SIZES;

fn engine(config: EngineConfig) -> PolyEngine<TickVoice> {
    PolyEngine::from_factory(config, MAX_VOICES, |_| TickVoice::new()).unwrap()
}

pub fn bench_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/blocks");
    let input = AudioInput::default();

    for &size in BLOCK_SIZES {
        let mut output = AudioOutput::with_channels(2, size);

        // === IDLE ===
        // Nothing playing: should be little more than zeroing the output
        let mut idle = engine(EngineConfig::default());
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, &size| {
            b.iter(|| idle.process_block(black_box(&input), &mut output, size))
        });

        // === FULL POOL ===
        // Every voice held, no events
        let mut full = engine(EngineConfig::default());
        for key in 0..MAX_VOICES as u8 {
            full.add_event(MidiEvent::note_on(36 + key, 100), 0);
        }
        full.process_block(&input, &mut output, size);
        group.bench_with_input(BenchmarkId::new("full_pool", size), &size, |b, &size| {
            b.iter(|| full.process_block(black_box(&input), &mut output, size))
        });

        // === EVENT PER WINDOW ===
        // A note on/off pair and a bend in every 16-sample window
        let mut busy = engine(EngineConfig::default().with_unison_voices(2));
        let mut key = 0u8;
        group.bench_with_input(BenchmarkId::new("event_per_window", size), &size, |b, &size| {
            b.iter(|| {
                for offset in (0..size).step_by(16) {
                    key = (key + 7) % 48;
                    busy.add_event(MidiEvent::note_on(48 + key, 90), offset);
                    busy.add_event(MidiEvent::note_off(48 + (key + 24) % 48), offset);
                    busy.add_event(
                        MidiEvent::PitchBend {
                            channel: 0,
                            value: (offset as i16) - 256,
                        },
                        offset,
                    );
                }
                busy.process_block(black_box(&input), &mut output, size)
            })
        });
    }

    group.finish();
}
