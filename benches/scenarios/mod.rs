//! Scheduling scenarios with a trivially cheap voice, so the numbers show
//! the engine's own overhead rather than synthesis cost.

mod allocation;
mod blocks;

pub use allocation::bench_allocation;
pub use blocks::bench_blocks;

use saavy_poly::{
    io::{AudioInput, AudioOutput},
    Voice, VoiceInfo,
};

/// Adds a constant while held, then counts down a short tail.
pub struct TickVoice {
    level: f32,
    tail: usize,
    busy: bool,
    released: bool,
}

impl TickVoice {
    pub fn new() -> Self {
        Self {
            level: 0.0,
            tail: 0,
            busy: false,
            released: true,
        }
    }
}

impl Voice for TickVoice {
    fn is_busy(&self) -> bool {
        self.busy
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn trigger(&mut self, _info: &VoiceInfo, level: f32, _is_retrigger: bool) {
        self.level = level;
        self.busy = true;
        self.released = false;
    }

    fn release(&mut self) {
        self.released = true;
        self.tail = 256;
    }

    fn kill(&mut self, _soft: bool) {
        self.busy = false;
        self.released = true;
    }

    fn render_samples(
        &mut self,
        _info: &VoiceInfo,
        _input: &AudioInput,
        output: &mut AudioOutput,
        start: usize,
        frames: usize,
        pitch_bend: f32,
    ) {
        let value = self.level * (1.0 + pitch_bend * 0.01);
        for channel in &mut output.buffers {
            for s in &mut channel[start..start + frames] {
                *s += value;
            }
        }
        if self.released {
            self.tail = self.tail.saturating_sub(frames);
            self.busy = self.tail > 0;
        }
    }
}
