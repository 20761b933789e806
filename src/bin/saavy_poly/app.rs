//! Live mode: cpal output stream driving the engine, TUI on the main thread

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use saavy_poly::{
    io::{AudioInput, AudioOutput},
    synth::message::event_channel,
    EngineConfig, PolyEngine, MAX_BLOCK_SIZE,
};

use super::tone::ToneVoice;
use super::ui::{ControlMessage, StatusUpdate, UiApp};

pub const VOICES: usize = 16;
const EVENT_CAPACITY: usize = 256;

pub fn run() -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let engine_config = EngineConfig::default().with_sample_rate(sample_rate);
    let mut engine = PolyEngine::from_factory(engine_config, VOICES, |_| ToneVoice::new())
        .wrap_err("failed to build voice engine")?;

    // Everything below is preallocated before the callback takes ownership
    let (events_tx, mut events_rx) = event_channel(EVENT_CAPACITY);
    let (control_tx, mut control_rx) = RingBuffer::<ControlMessage>::new(32);
    let (mut status_tx, status_rx) = RingBuffer::<StatusUpdate>::new(64);
    let initial = StatusUpdate::capture(&engine);

    let input = AudioInput::default();
    let mut output = AudioOutput::with_channels(1, MAX_BLOCK_SIZE);

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            while let Ok(message) = control_rx.pop() {
                match message {
                    ControlMessage::SetPolyMode(mode) => engine.set_poly_mode(mode),
                    ControlMessage::SetUnison(voices) => {
                        engine.set_unison_voices(voices);
                    }
                    ControlMessage::Panic => engine.all_notes_off(),
                }
            }
            engine.ingest(&mut events_rx);

            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                engine.process_block(&input, &mut output, frames_to_render);

                // Copy to output (mono to all channels)
                let out_off = frames_written * channels;
                for (i, &s) in output.buffers[0][..frames_to_render].iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                }

                frames_written += frames_to_render;
            }

            // UI only wants the latest; a full ring just skips a frame
            let _ = status_tx.push(StatusUpdate::capture(&engine));
        },
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;

    stream.play()?;

    let mut terminal = ratatui::init();
    let result =
        UiApp::new(events_tx, control_tx, status_rx, initial, sample_rate).run(&mut terminal);
    ratatui::restore();

    result
}
