use crate::io::{AudioInput, AudioOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Sounding,  // Triggered, not yet released
    Releasing, // Released, fading out on its own timing
}

/// Scheduling bookkeeping for one pool slot.
///
/// The engine owns and writes this; voices receive it by reference when
/// they are triggered and rendered, so pitch and aftertouch changes made
/// between sub-blocks are visible on the next render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceInfo {
    /// Sample time at which the voice was last allocated to a key.
    pub start_time: u64,
    /// Key the voice is bound to. `None` while unbound, even if the voice
    /// is still busy fading out.
    pub key: Option<u8>,
    pub previous_key: Option<u8>,
    /// MIDI pitch after tuning and offset, in (fractional) semitones.
    pub base_pitch: f32,
    pub aftertouch: f32,
    /// Position within the unison stack.
    pub stack_index: usize,
}

impl VoiceInfo {
    pub const fn new() -> Self {
        Self {
            start_time: 0,
            key: None,
            previous_key: None,
            base_pitch: 0.0,
            aftertouch: 0.0,
            stack_index: 0,
        }
    }

    /// Unbind from the current key. Called once per stop or kill.
    pub(crate) fn detach(&mut self) {
        self.previous_key = self.key.take();
        self.aftertouch = 0.0;
    }
}

impl Default for VoiceInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// A sound generator the engine can schedule.
///
/// Implementors own their own envelope timing: `is_busy` stays true through
/// the release tail and only drops once the voice has gone silent.
pub trait Voice: Send {
    fn is_busy(&self) -> bool;

    /// True once the voice has been released (or is free).
    fn is_released(&self) -> bool;

    /// Start, or restart, a note.
    ///
    /// `level` is the normalized velocity. `is_retrigger` is set when the
    /// voice was still busy, either stolen or re-attacked in mono mode.
    fn trigger(&mut self, _info: &VoiceInfo, _level: f32, _is_retrigger: bool) {}

    /// Enter the release phase.
    fn release(&mut self) {}

    /// Stop the voice. Hard kills go silent immediately; soft kills fade as
    /// fast as possible without clicking.
    fn kill(&mut self, _soft: bool) {}

    /// Render `frames` samples starting at `start`, adding into `output`.
    ///
    /// Never overwrite: every busy voice sums into the same buffers.
    fn render_samples(
        &mut self,
        _info: &VoiceInfo,
        _input: &AudioInput,
        _output: &mut AudioOutput,
        _start: usize,
        _frames: usize,
        _pitch_bend: f32,
    ) {
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn state(&self) -> VoiceState {
        if !self.is_busy() {
            VoiceState::Free
        } else if self.is_released() {
            VoiceState::Releasing
        } else {
            VoiceState::Sounding
        }
    }
}

/// Allow boxed voices to be pooled (for dynamic dispatch)
impl Voice for Box<dyn Voice> {
    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }

    fn is_released(&self) -> bool {
        (**self).is_released()
    }

    fn trigger(&mut self, info: &VoiceInfo, level: f32, is_retrigger: bool) {
        (**self).trigger(info, level, is_retrigger)
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn kill(&mut self, soft: bool) {
        (**self).kill(soft)
    }

    fn render_samples(
        &mut self,
        info: &VoiceInfo,
        input: &AudioInput,
        output: &mut AudioOutput,
        start: usize,
        frames: usize,
        pitch_bend: f32,
    ) {
        (**self).render_samples(info, input, output, start, frames, pitch_bend)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        (**self).set_sample_rate(sample_rate)
    }
}
