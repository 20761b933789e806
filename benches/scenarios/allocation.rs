//! Allocation under pressure: steals and mono re-triggers.

use std::hint::black_box;

use criterion::Criterion;
use saavy_poly::{
    io::{midi::MidiEvent, AudioInput, AudioOutput},
    EngineConfig, PolyEngine, PolyMode, MAX_VOICES,
};

use super::TickVoice;

const BLOCK: usize = 128;

pub fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/allocation");
    let input = AudioInput::default();
    let mut output = AudioOutput::with_channels(2, BLOCK);

    // === STEAL STORM ===
    // Keys never released, so past the pool size every note steals
    let mut poly = PolyEngine::from_factory(
        EngineConfig::default().with_unison_voices(4),
        MAX_VOICES,
        |_| TickVoice::new(),
    )
    .unwrap();
    let mut key = 0u8;
    group.bench_function("steal_storm", |b| {
        b.iter(|| {
            for offset in (0..BLOCK).step_by(16) {
                key = (key + 5) % 128;
                poly.add_event(MidiEvent::note_on(key, 100), offset);
            }
            poly.process_block(black_box(&input), &mut output, BLOCK)
        })
    });

    // === MONO TRILL ===
    // Two keys alternating: glide back and forth through the held stack
    let mut mono = PolyEngine::from_factory(
        EngineConfig::default().with_poly_mode(PolyMode::Mono),
        8,
        |_| TickVoice::new(),
    )
    .unwrap();
    mono.add_event(MidiEvent::note_on(60, 100), 0);
    group.bench_function("mono_trill", |b| {
        b.iter(|| {
            for offset in (0..BLOCK).step_by(32) {
                mono.add_event(MidiEvent::note_on(62, 100), offset);
                mono.add_event(MidiEvent::note_off(62), offset + 16);
            }
            mono.process_block(black_box(&input), &mut output, BLOCK)
        })
    });

    group.finish();
}
