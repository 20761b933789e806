//! Headless mode: render a scripted phrase offline and log what the
//! scheduler does with it, block by block.
//!
//! Set `RUST_LOG=debug` to also see engine setup.

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use log::info;
use saavy_poly::{
    io::{
        midi::{MidiEvent, TimedEvent},
        AudioInput, AudioOutput,
    },
    EngineConfig, PolyEngine, PolyMode,
};
use std::collections::VecDeque;

use super::tone::ToneVoice;

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 512;
const VOICES: usize = 8;

enum Step {
    Midi(MidiEvent),
    Mode(PolyMode),
}

/// (time in seconds, step)
fn phrase() -> Vec<(f32, Step)> {
    use MidiEvent as M;
    use Step::*;
    vec![
        // Chord caught by the pedal, then a fourth key on top
        (0.00, Midi(M::note_on(60, 100))),
        (0.01, Midi(M::note_on(64, 90))),
        (0.02, Midi(M::note_on(67, 80))),
        (0.10, Midi(M::sustain(true))),
        (0.20, Midi(M::note_off(60))),
        (0.20, Midi(M::note_off(64))),
        (0.20, Midi(M::note_off(67))),
        (0.30, Midi(M::note_on(72, 110))),
        (0.40, Midi(M::sustain(false))),
        (0.50, Midi(M::note_off(72))),
        // Mono trill falling back to the held key
        (0.80, Mode(PolyMode::Mono)),
        (0.80, Midi(M::note_on(55, 100))),
        (0.90, Midi(M::note_on(57, 100))),
        (1.00, Midi(M::note_off(57))),
        (1.10, Midi(M::note_on(57, 100))),
        (1.20, Midi(M::note_off(57))),
        (1.30, Midi(M::note_off(55))),
        // Legato glide
        (1.50, Mode(PolyMode::Legato)),
        (1.50, Midi(M::note_on(48, 100))),
        (1.60, Midi(M::note_on(52, 100))),
        (1.70, Midi(M::note_on(55, 100))),
        (1.90, Midi(M::all_notes_off())),
    ]
}

pub fn run() -> EyreResult<()> {
    let config = EngineConfig::default()
        .with_sample_rate(SAMPLE_RATE)
        .with_max_block_size(BLOCK);
    let mut engine = PolyEngine::from_factory(config, VOICES, |_| ToneVoice::new())
        .wrap_err("failed to build voice engine")?;

    let input = AudioInput::default();
    let mut output = AudioOutput::with_channels(1, BLOCK);
    let mut pending: VecDeque<TimedEvent> = VecDeque::new();

    let mut script = phrase()
        .into_iter()
        .map(|(t, step)| ((t * SAMPLE_RATE) as u64, step))
        .peekable();
    let end = (2.2 * SAMPLE_RATE) as u64;

    info!(
        "rendering {:.1}s at {} Hz in {}-sample blocks",
        end as f32 / SAMPLE_RATE,
        SAMPLE_RATE,
        BLOCK
    );

    // Own clock: the engine's only advances on blocks it renders
    let mut block_start = 0u64;
    while block_start < end {
        let block_end = block_start + BLOCK as u64;

        // Mode changes apply between blocks; MIDI lands inside the block
        while let Some((time, _)) = script.peek() {
            if *time >= block_end {
                break;
            }
            if let Some((time, step)) = script.next() {
                match step {
                    Step::Mode(mode) => {
                        info!("@{:>6} mode -> {:?}", block_start, mode);
                        engine.set_poly_mode(mode);
                    }
                    Step::Midi(event) => {
                        let offset = time.saturating_sub(block_start) as usize;
                        pending.push_back(TimedEvent::new(offset, event));
                    }
                }
            }
        }
        let queued = engine.ingest(&mut pending);

        let silent = engine.process_block(&input, &mut output, BLOCK);
        block_start = block_end;
        if silent {
            continue;
        }

        let peak = output.buffers[0].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let held: Vec<u8> = engine.held_keys().iter().map(|k| k.key).collect();
        let sustained: Vec<u8> = engine.sustained_notes().iter().map(|k| k.key).collect();
        info!(
            "@{:>6} [{}] events {} held {:?} sustained {:?} pedal {} peak {:.3}",
            block_end - BLOCK as u64,
            engine.voice_status(),
            queued,
            held,
            sustained,
            engine.sustain_pedal(),
            peak
        );
    }

    info!(
        "done: {} samples rendered of {}, {} events dropped",
        engine.sample_time(),
        end,
        engine.dropped_events()
    );
    Ok(())
}
