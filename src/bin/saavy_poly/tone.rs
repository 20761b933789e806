//! Sine voice with a linear attack/release envelope and a short glide
//!
//! Just enough sound to hear the scheduler at work: unison copies are
//! detuned by stack index, aftertouch deepens a vibrato, pitch bend spans
//! two semitones.

use saavy_poly::{
    io::{converter::pitch_to_freq, AudioInput, AudioOutput},
    Voice, VoiceInfo,
};
use std::f32::consts::TAU;

const ATTACK_SECONDS: f32 = 0.005;
const RELEASE_SECONDS: f32 = 0.25;
const SOFT_KILL_SECONDS: f32 = 0.004;
const GLIDE_SECONDS: f32 = 0.06;
const BEND_RANGE: f32 = 2.0;
const DETUNE_CENTS: f32 = 9.0;
const VIBRATO_HZ: f32 = 5.5;
const GAIN: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Sustain,
    Release,
}

pub struct ToneVoice {
    stage: Stage,
    sample_rate: f32,
    phase: f32,
    vibrato_phase: f32,
    /// Current pitch in semitones; chases `info.base_pitch`.
    pitch: f32,
    velocity: f32,
    level: f32,
    release_step: f32,
}

impl ToneVoice {
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            sample_rate: 48_000.0,
            phase: 0.0,
            vibrato_phase: 0.0,
            pitch: 60.0,
            velocity: 0.0,
            level: 0.0,
            release_step: 0.0,
        }
    }

    fn per_sample(&self, seconds: f32) -> f32 {
        1.0 / (seconds * self.sample_rate).max(1.0)
    }

    fn begin_release(&mut self, seconds: f32) {
        // Full scale to silence in `seconds`; lower levels get there sooner
        self.release_step = self.per_sample(seconds);
        self.stage = Stage::Release;
    }

    fn next_level(&mut self) -> f32 {
        match self.stage {
            Stage::Idle => {}
            Stage::Attack => {
                self.level += self.per_sample(ATTACK_SECONDS);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => {}
            Stage::Release => {
                self.level -= self.release_step;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }
}

impl Voice for ToneVoice {
    fn is_busy(&self) -> bool {
        self.stage != Stage::Idle
    }

    fn is_released(&self) -> bool {
        matches!(self.stage, Stage::Idle | Stage::Release)
    }

    fn trigger(&mut self, info: &VoiceInfo, level: f32, is_retrigger: bool) {
        if !is_retrigger {
            self.phase = 0.0;
            self.level = 0.0;
            self.pitch = info.base_pitch;
        }
        self.velocity = level;
        self.stage = Stage::Attack;
    }

    fn release(&mut self) {
        if self.is_busy() {
            self.begin_release(RELEASE_SECONDS);
        }
    }

    fn kill(&mut self, soft: bool) {
        if soft && self.is_busy() {
            self.begin_release(SOFT_KILL_SECONDS);
        } else {
            self.stage = Stage::Idle;
            self.level = 0.0;
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
        // One-pole glide toward the bound key's pitch
        let glide = 1.0 - (-1.0 / (GLIDE_SECONDS * self.sample_rate)).exp();
        let vibrato_step = VIBRATO_HZ / self.sample_rate;
        let detune = spread(info.stack_index) * DETUNE_CENTS / 100.0;
        let target = info.base_pitch + detune + pitch_bend * BEND_RANGE;

        for i in start..start + frames {
            self.pitch += (target - self.pitch) * glide;
            let vibrato = (self.vibrato_phase * TAU).sin() * info.aftertouch * 0.5;
            let freq = pitch_to_freq(self.pitch + vibrato);

            let sample = (self.phase * TAU).sin() * self.next_level() * self.velocity * GAIN;
            for channel in &mut output.buffers {
                if let Some(out) = channel.get_mut(i) {
                    *out += sample;
                }
            }

            self.phase = (self.phase + freq / self.sample_rate).fract();
            self.vibrato_phase = (self.vibrato_phase + vibrato_step).fract();
            if self.stage == Stage::Idle {
                break;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }
}

impl Default for ToneVoice {
    fn default() -> Self {
        Self::new()
    }
}

/// Symmetric unison spread: 0, +1, -1, +2, -2, ...
fn spread(stack_index: usize) -> f32 {
    let step = stack_index.div_ceil(2) as f32;
    if stack_index % 2 == 1 {
        step
    } else {
        -step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(voice: &mut ToneVoice, info: &VoiceInfo, frames: usize) -> Vec<f32> {
        let mut out = AudioOutput::with_channels(1, frames);
        voice.render_samples(info, &AudioInput::default(), &mut out, 0, frames, 0.0);
        out.buffers.remove(0)
    }

    #[test]
    fn release_tail_ends_idle() {
        let mut voice = ToneVoice::new();
        let info = VoiceInfo {
            base_pitch: 69.0,
            ..VoiceInfo::new()
        };
        voice.trigger(&info, 1.0, false);
        render(&mut voice, &info, 1_000);
        assert!(voice.is_busy() && !voice.is_released());

        voice.release();
        assert!(voice.is_released());
        render(&mut voice, &info, 48_000);
        assert!(!voice.is_busy());
    }

    #[test]
    fn hard_kill_is_immediate() {
        let mut voice = ToneVoice::new();
        voice.trigger(&VoiceInfo::new(), 1.0, false);
        voice.kill(false);
        assert!(!voice.is_busy());
    }

    #[test]
    fn output_accumulates() {
        let mut voice = ToneVoice::new();
        let info = VoiceInfo {
            base_pitch: 69.0,
            ..VoiceInfo::new()
        };
        voice.trigger(&info, 1.0, false);
        let mut out = AudioOutput::with_channels(1, 64);
        out.buffers[0].fill(1.0);
        voice.render_samples(&info, &AudioInput::default(), &mut out, 0, 64, 0.0);
        assert!(out.buffers[0].iter().all(|&s| (s - 1.0).abs() <= GAIN));
    }

    #[test]
    fn unison_spread_alternates() {
        let spreads: Vec<f32> = (0..5).map(spread).collect();
        assert_eq!(spreads, vec![0.0, 1.0, -1.0, 2.0, -2.0]);
    }
}
