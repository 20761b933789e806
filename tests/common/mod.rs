//! Test voice that journals every call the engine makes.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use saavy_poly::{
    io::{midi::MidiEvent, AudioInput, AudioOutput},
    EngineConfig, PolyEngine, Voice, VoiceInfo,
};

/// Frames a released voice keeps sounding.
pub const RELEASE_FRAMES: usize = 64;
/// Frames a soft-killed voice takes to fade.
pub const SOFT_KILL_FRAMES: usize = 8;
/// What each busy voice adds to every output sample.
pub const VOICE_LEVEL: f32 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Trigger {
        key: Option<u8>,
        level: f32,
        retrigger: bool,
        stack_index: usize,
    },
    Release,
    Kill {
        soft: bool,
    },
    Render {
        start: usize,
        frames: usize,
        pitch_bend: f32,
        aftertouch: f32,
    },
    SampleRate(f32),
}

pub type Journal = Arc<Mutex<Vec<(usize, Call)>>>;

pub struct RecordingVoice {
    index: usize,
    journal: Journal,
    busy: bool,
    released: bool,
    remaining: usize,
}

impl RecordingVoice {
    pub fn new(index: usize, journal: Journal) -> Self {
        Self {
            index,
            journal,
            busy: false,
            released: true,
            remaining: 0,
        }
    }

    fn log(&self, call: Call) {
        self.journal.lock().unwrap().push((self.index, call));
    }
}

impl Voice for RecordingVoice {
    fn is_busy(&self) -> bool {
        self.busy
    }

    fn is_released(&self) -> bool {
        self.released || !self.busy
    }

    fn trigger(&mut self, info: &VoiceInfo, level: f32, is_retrigger: bool) {
        self.log(Call::Trigger {
            key: info.key,
            level,
            retrigger: is_retrigger,
            stack_index: info.stack_index,
        });
        self.busy = true;
        self.released = false;
    }

    fn release(&mut self) {
        self.log(Call::Release);
        self.released = true;
        self.remaining = RELEASE_FRAMES;
    }

    fn kill(&mut self, soft: bool) {
        self.log(Call::Kill { soft });
        if soft && self.busy {
            self.released = true;
            self.remaining = SOFT_KILL_FRAMES;
        } else {
            self.busy = false;
            self.released = true;
            self.remaining = 0;
        }
    }

    fn render_samples(
        &mut self,
        info: &VoiceInfo,
        _input: &AudioInput,
        output: &mut AudioOutput,
        start: usize,
        frames: usize,
        pitch_bend: f32,
    ) {
        self.log(Call::Render {
            start,
            frames,
            pitch_bend,
            aftertouch: info.aftertouch,
        });
        for channel in &mut output.buffers {
            for s in &mut channel[start..start + frames] {
                *s += VOICE_LEVEL;
            }
        }
        if self.released {
            self.remaining = self.remaining.saturating_sub(frames);
            if self.remaining == 0 {
                self.busy = false;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.log(Call::SampleRate(sample_rate));
    }
}

/// Engine plus journal, with helpers for driving blocks.
pub struct Rig {
    pub engine: PolyEngine<RecordingVoice>,
    pub journal: Journal,
    pub output: AudioOutput,
    input: AudioInput,
}

impl Rig {
    pub fn new(config: EngineConfig, voices: usize) -> Self {
        let journal = Journal::default();
        let pool = (0..voices)
            .map(|i| RecordingVoice::new(i, journal.clone()))
            .collect();
        let engine = PolyEngine::new(config, pool).expect("valid config");
        journal.lock().unwrap().clear();

        Self {
            engine,
            journal,
            output: AudioOutput::with_channels(2, 512),
            input: AudioInput::default(),
        }
    }

    pub fn poly(voices: usize) -> Self {
        Self::new(EngineConfig::default(), voices)
    }

    pub fn send(&mut self, event: MidiEvent) {
        self.send_at(event, 0);
    }

    pub fn send_at(&mut self, event: MidiEvent, offset: usize) {
        assert!(self.engine.add_event(event, offset));
    }

    /// Queue an event and process a block so it takes effect.
    pub fn play(&mut self, event: MidiEvent) {
        self.send(event);
        self.block(32);
    }

    pub fn block(&mut self, frames: usize) -> bool {
        self.engine
            .process_block(&self.input, &mut self.output, frames)
    }

    pub fn take_calls(&self) -> Vec<(usize, Call)> {
        std::mem::take(&mut *self.journal.lock().unwrap())
    }

    /// Journal entries other than renders.
    pub fn take_commands(&self) -> Vec<(usize, Call)> {
        self.take_calls()
            .into_iter()
            .filter(|(_, c)| !matches!(c, Call::Render { .. }))
            .collect()
    }

    pub fn triggers(calls: &[(usize, Call)]) -> Vec<usize> {
        calls
            .iter()
            .filter(|(_, c)| matches!(c, Call::Trigger { .. }))
            .map(|(v, _)| *v)
            .collect()
    }

    pub fn releases(calls: &[(usize, Call)]) -> Vec<usize> {
        calls
            .iter()
            .filter(|(_, c)| *c == Call::Release)
            .map(|(v, _)| *v)
            .collect()
    }

    pub fn held(&self) -> Vec<u8> {
        self.engine.held_keys().iter().map(|p| p.key).collect()
    }

    pub fn sustained(&self) -> Vec<u8> {
        self.engine.sustained_notes().iter().map(|p| p.key).collect()
    }

    pub fn bound_keys(&self) -> Vec<Option<u8>> {
        (0..self.engine.voice_count())
            .map(|i| self.engine.voice_info(i).and_then(|info| info.key))
            .collect()
    }
}
