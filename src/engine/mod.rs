//! The block scheduler.
//!
//! [`PolyEngine`] owns the voice pool, the key state and the event queue.
//! Each call to [`PolyEngine::process_block`] slices the block at the
//! configured granularity, applies the events due in each slice, then has
//! every busy voice render that slice into the output.
//!
//! ```ignore
//! use saavy_poly::{io::{midi::MidiEvent, AudioInput, AudioOutput}, EngineConfig, PolyEngine};
//!
//! let mut engine = PolyEngine::new(EngineConfig::default(), voices)?;
//! engine.add_event(MidiEvent::note_on(60, 100), 0);
//!
//! let mut out = AudioOutput::with_channels(2, 256);
//! let silent = engine.process_block(&AudioInput::default(), &mut out, 256);
//! ```

pub mod allocator;
pub mod config;
pub mod pool;
pub mod queue;
pub mod scheduler;
mod trigger;

use log::{debug, warn};

use self::{
    config::{validate_block_size, validate_sample_rate, AftertouchMode, EngineConfig, PolyMode},
    pool::{VoicePool, VoiceStatus},
    queue::{quantize, BlockQueue, EventQueue},
    scheduler::SubBlocks,
};
use crate::{
    error::ConfigError,
    io::{
        midi::{cc, normalize_control, normalize_pitch_bend, MidiEvent},
        AudioInput, AudioOutput,
    },
    synth::{
        factory::VoiceFactory,
        keys::{KeyPress, KeyTracker},
        message::EventReceiver,
        tables::{LookupTable, TuningTable},
        voice::{Voice, VoiceInfo},
    },
};

/// Timing and controller state shared by every voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthState {
    pub sample_rate: f32,
    /// Samples processed since the last reset.
    pub sample_time: u64,
    /// -1.0..=1.0
    pub pitch_bend: f32,
    /// 0.0..=1.0
    pub mod_wheel: f32,
    pub sustain_down: bool,
    /// Cleared after a block in which no voice was busy.
    pub voices_active: bool,
    /// Last key triggered in poly mode.
    pub previous_key: Option<u8>,
    pub dropped_events: u64,
}

impl SynthState {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            sample_time: 0,
            pitch_bend: 0.0,
            mod_wheel: 0.0,
            sustain_down: false,
            voices_active: false,
            previous_key: None,
            dropped_events: 0,
        }
    }
}

/// Polyphonic note allocator and voice scheduler.
pub struct PolyEngine<V: Voice, Q: EventQueue = BlockQueue> {
    pool: VoicePool<V>,
    keys: KeyTracker,
    queue: Q,
    config: EngineConfig,
    state: SynthState,
}

impl<V: Voice> PolyEngine<V> {
    pub fn new(config: EngineConfig, voices: Vec<V>) -> Result<Self, ConfigError> {
        let queue = BlockQueue::with_capacity(config.max_block_size);
        Self::with_queue(config, voices, queue)
    }

    /// Build a pool of `count` voices from a factory.
    pub fn from_factory<F>(
        config: EngineConfig,
        count: usize,
        factory: F,
    ) -> Result<Self, ConfigError>
    where
        F: VoiceFactory<Voice = V>,
    {
        let voices = (0..count).map(|i| factory.create_voice(i)).collect();
        Self::new(config, voices)
    }
}

impl<V: Voice, Q: EventQueue> PolyEngine<V, Q> {
    /// Build an engine around a custom event queue.
    pub fn with_queue(
        config: EngineConfig,
        voices: Vec<V>,
        mut queue: Q,
    ) -> Result<Self, ConfigError> {
        config.validate(voices.len())?;

        let mut pool = VoicePool::new(voices)?;
        if let Some(count) = config.voice_count {
            pool.set_len(count)?;
        }
        for slot in pool.all_mut() {
            slot.voice.set_sample_rate(config.sample_rate);
        }
        queue.resize(config.max_block_size);

        let state = SynthState::new(config.sample_rate);
        let mut engine = Self {
            pool,
            keys: KeyTracker::new(),
            queue,
            config,
            state,
        };
        engine.set_unison_voices(engine.config.unison_voices);

        debug!(
            "engine ready: {}/{} voices, {:?}, unison {}, granularity {}",
            engine.pool.len(),
            engine.pool.capacity(),
            engine.config.poly_mode,
            engine.config.unison_voices,
            engine.config.granularity
        );
        Ok(engine)
    }

    // ---------------------------------------------------------------------
    // Event input
    // ---------------------------------------------------------------------

    /// Queue an event at `offset` samples into the next block, rounded down
    /// to the granularity. Returns `false` if the queue was full.
    pub fn add_event(&mut self, event: MidiEvent, offset: usize) -> bool {
        let offset = quantize(offset, self.config.granularity);
        let queued = self.queue.add(event, offset);
        if !queued {
            self.state.dropped_events += 1;
        }
        queued
    }

    /// Move everything pending in `rx` into the queue. Returns how many
    /// events were taken.
    pub fn ingest<R: EventReceiver + ?Sized>(&mut self, rx: &mut R) -> usize {
        let mut taken = 0;
        while let Some(e) = rx.pop() {
            self.add_event(e.event, e.offset);
            taken += 1;
        }
        taken
    }

    // ---------------------------------------------------------------------
    // Block processing
    // ---------------------------------------------------------------------

    /// Render one block. Returns `true` if the block was silent: no voice
    /// was active and no event was pending, so nothing was rendered.
    pub fn process_block(
        &mut self,
        input: &AudioInput,
        output: &mut AudioOutput,
        frames: usize,
    ) -> bool {
        self.process_block_with(input, output, frames, |_, _, _| {})
    }

    /// Like [`process_block`](Self::process_block), calling `slice` with
    /// `(output, start, len)` once per sub-block after its events are
    /// applied and before the voices render.
    pub fn process_block_with<F>(
        &mut self,
        input: &AudioInput,
        output: &mut AudioOutput,
        frames: usize,
        mut slice: F,
    ) -> bool
    where
        F: FnMut(&mut AudioOutput, usize, usize),
    {
        debug_assert!(
            output.channels() == 0 || frames <= output.capacity(),
            "output buffers shorter than the block"
        );
        let frames = if output.channels() == 0 {
            frames
        } else {
            frames.min(output.capacity())
        };

        output.clear(frames);

        if !self.state.voices_active && self.queue.is_empty() {
            return true;
        }

        for (start, len) in SubBlocks::new(frames, self.config.granularity) {
            while let Some(e) = self.queue.peek().copied() {
                if e.offset > start {
                    break;
                }
                self.dispatch(e.event);
                self.queue.remove();
            }

            slice(output, start, len);

            let pitch_bend = self.state.pitch_bend;
            for slot in self.pool.slots_mut() {
                if slot.voice.is_busy() {
                    slot.voice
                        .render_samples(&slot.info, input, output, start, len, pitch_bend);
                }
            }

            self.state.sample_time += len as u64;
        }

        self.state.voices_active = self.pool.refresh_status();
        self.queue.flush(frames);

        false
    }

    fn dispatch(&mut self, event: MidiEvent) {
        match event {
            MidiEvent::NoteOn { key, velocity, .. } if velocity > 0 => self.note_on(key, velocity),
            MidiEvent::NoteOn { key, .. } | MidiEvent::NoteOff { key, .. } => self.note_off(key),
            MidiEvent::PolyAftertouch { key, pressure, .. } => {
                if self.config.aftertouch_mode == AftertouchMode::PerKey {
                    let value = self.config.aftertouch_curve.normalized(pressure);
                    for slot in self.pool.slots_mut() {
                        if slot.info.key == Some(key) {
                            slot.info.aftertouch = value;
                        }
                    }
                }
            }
            MidiEvent::ChannelAftertouch { pressure, .. } => {
                if self.config.aftertouch_mode == AftertouchMode::Channel {
                    let value = self.config.aftertouch_curve.normalized(pressure);
                    for slot in self.pool.slots_mut() {
                        slot.info.aftertouch = value;
                    }
                }
            }
            MidiEvent::PitchBend { value, .. } => {
                self.state.pitch_bend = normalize_pitch_bend(value);
            }
            MidiEvent::ControlChange {
                controller, value, ..
            } => self.control_change(controller, value),
            MidiEvent::ProgramChange { .. } => {}
        }
    }

    fn note_on(&mut self, key: u8, velocity: u8) {
        if key > 127 {
            return;
        }
        let press = KeyPress::new(key, self.config.velocity_curve.velocity(velocity));
        match self.config.poly_mode {
            PolyMode::Poly => self.poly_note_on(press),
            PolyMode::Mono | PolyMode::Legato => self.mono_note_on(press),
        }
    }

    fn note_off(&mut self, key: u8) {
        // Physical release is tracked whatever the pedal is doing
        self.keys.held.remove(key);

        match self.config.poly_mode {
            PolyMode::Poly => self.poly_note_off(key),
            PolyMode::Mono | PolyMode::Legato => self.mono_note_off(key),
        }
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        match controller {
            cc::MOD_WHEEL => self.state.mod_wheel = normalize_control(value),
            cc::SUSTAIN => {
                self.state.sustain_down = normalize_control(value) >= 0.5;
                if !self.state.sustain_down {
                    self.release_sustained();
                }
            }
            cc::ALL_NOTES_OFF => self.all_notes_off(),
            _ => {}
        }
    }

    /// Pedal up: stop every sustained key that is no longer held.
    fn release_sustained(&mut self) {
        let KeyTracker { held, sustained } = &mut self.keys;
        let pool = &mut self.pool;
        sustained.retain(|press| {
            if held.contains(press.key) {
                true
            } else {
                pool.stop_key(press.key);
                false
            }
        });
    }

    // ---------------------------------------------------------------------
    // Control
    // ---------------------------------------------------------------------

    /// Forget all key state, lift the pedal and fade out every voice.
    pub fn all_notes_off(&mut self) {
        self.keys.clear();
        self.state.sustain_down = false;
        self.pool.kill_all(true);
    }

    /// Back to time zero: key state cleared, every voice hard-killed.
    /// Pending events stay queued.
    pub fn reset(&mut self) {
        self.state.sample_time = 0;
        self.keys.clear();
        self.pool.kill_all(false);
        self.state.voices_active = self.pool.refresh_status();
        debug!("reset");
    }

    /// Host audio settings changed. Resets the engine, resizes the event
    /// queue and tells every voice about the new rate.
    ///
    /// Allocates; call from the host's setup path, not the audio callback.
    pub fn set_sample_rate_and_block_size(
        &mut self,
        sample_rate: f32,
        max_block_size: usize,
    ) -> Result<(), ConfigError> {
        validate_sample_rate(sample_rate)?;
        validate_block_size(max_block_size)?;

        self.reset();
        self.state.sample_rate = sample_rate;
        self.config.sample_rate = sample_rate;
        self.config.max_block_size = max_block_size;
        self.queue.resize(max_block_size);
        for slot in self.pool.all_mut() {
            slot.voice.set_sample_rate(sample_rate);
        }

        debug!("sample rate {sample_rate} Hz, max block {max_block_size}");
        Ok(())
    }

    pub fn set_granularity(&mut self, granularity: usize) -> Result<(), ConfigError> {
        if granularity == 0 {
            return Err(ConfigError::ZeroGranularity);
        }
        self.config.granularity = granularity;
        Ok(())
    }

    /// Change how many voices take part. Every voice is hard-killed first.
    pub fn set_voice_count(&mut self, count: usize) -> Result<(), ConfigError> {
        self.pool.set_len(count)?;
        self.state.voices_active = false;
        self.config.voice_count = Some(count);
        if self.config.unison_voices > count {
            self.set_unison_voices(count);
        }
        debug!("voice count {count}");
        Ok(())
    }

    /// Set the unison stack size, clamped to `1..=voice_count()`.
    /// Returns the value applied.
    pub fn set_unison_voices(&mut self, voices: usize) -> usize {
        let applied = voices.clamp(1, self.pool.len());
        if applied != voices {
            warn!(
                "unison {voices} out of range, using {applied} (pool has {})",
                self.pool.len()
            );
        }
        self.config.unison_voices = applied;
        applied
    }

    pub fn set_poly_mode(&mut self, mode: PolyMode) {
        if mode != self.config.poly_mode {
            debug!("poly mode {:?} -> {:?}", self.config.poly_mode, mode);
        }
        self.config.poly_mode = mode;
    }

    pub fn set_aftertouch_mode(&mut self, mode: AftertouchMode) {
        self.config.aftertouch_mode = mode;
    }

    /// Global transpose in semitones, applied to notes triggered from now on.
    pub fn set_pitch_offset(&mut self, semitones: f32) {
        self.config.pitch_offset = semitones;
    }

    /// Override the "voices active" flag, e.g. to keep a drone stack
    /// rendering when voices are driven outside the note path.
    pub fn set_voices_active(&mut self, active: bool) {
        self.state.voices_active = active;
    }

    pub fn velocity_curve_mut(&mut self) -> &mut LookupTable {
        &mut self.config.velocity_curve
    }

    pub fn aftertouch_curve_mut(&mut self) -> &mut LookupTable {
        &mut self.config.aftertouch_curve
    }

    pub fn tuning_mut(&mut self) -> &mut TuningTable {
        &mut self.config.tuning
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SynthState {
        &self.state
    }

    pub fn poly_mode(&self) -> PolyMode {
        self.config.poly_mode
    }

    pub fn aftertouch_mode(&self) -> AftertouchMode {
        self.config.aftertouch_mode
    }

    pub fn unison_voices(&self) -> usize {
        self.config.unison_voices
    }

    pub fn granularity(&self) -> usize {
        self.config.granularity
    }

    /// Voices taking part in scheduling.
    pub fn voice_count(&self) -> usize {
        self.pool.len()
    }

    /// Voices the pool was built with.
    pub fn max_voice_count(&self) -> usize {
        self.pool.capacity()
    }

    /// Busy voices as of the end of the last block.
    pub fn active_voice_count(&self) -> usize {
        self.pool.status().count()
    }

    pub fn voice_status(&self) -> VoiceStatus {
        self.pool.status()
    }

    pub fn voices_active(&self) -> bool {
        self.state.voices_active
    }

    pub fn sample_rate(&self) -> f32 {
        self.state.sample_rate
    }

    pub fn sample_time(&self) -> u64 {
        self.state.sample_time
    }

    pub fn pitch_bend(&self) -> f32 {
        self.state.pitch_bend
    }

    pub fn mod_wheel(&self) -> f32 {
        self.state.mod_wheel
    }

    pub fn sustain_pedal(&self) -> bool {
        self.state.sustain_down
    }

    pub fn previous_key(&self) -> Option<u8> {
        self.state.previous_key
    }

    /// Events lost to a full queue since construction.
    pub fn dropped_events(&self) -> u64 {
        self.state.dropped_events
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn held_keys(&self) -> &[KeyPress] {
        self.keys.held.as_slice()
    }

    pub fn sustained_notes(&self) -> &[KeyPress] {
        self.keys.sustained.as_slice()
    }

    pub fn voice(&self, index: usize) -> Option<&V> {
        self.pool.get(index).map(|s| &s.voice)
    }

    pub fn voice_mut(&mut self, index: usize) -> Option<&mut V> {
        self.pool.get_mut(index).map(|s| &mut s.voice)
    }

    pub fn voice_info(&self, index: usize) -> Option<&VoiceInfo> {
        self.pool.get(index).map(|s| &s.info)
    }

    /// Slot index of a voice borrowed from this engine.
    pub fn voice_index_of(&self, voice: &V) -> Option<usize> {
        self.pool
            .slots()
            .iter()
            .position(|s| std::ptr::eq(&s.voice, voice))
    }

    /// First slot bound to `key`.
    pub fn voice_for_key(&self, key: u8) -> Option<usize> {
        self.pool.find_key(key)
    }
}
