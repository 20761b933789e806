//! Trigger policies: how key transitions become voice triggers.
//!
//! Poly gives each key its own voices from the allocator. Mono and Legato
//! always play on the first `unison` slots and keep the held keys as a
//! stack, falling back to the previous key when the current one is lifted.

use super::{allocator, config::PolyMode, queue::EventQueue, PolyEngine};
use crate::synth::{keys::KeyPress, voice::Voice};

impl<V: Voice, Q: EventQueue> PolyEngine<V, Q> {
    pub(super) fn poly_note_on(&mut self, press: KeyPress) {
        self.keys.held.push_unique(press);
        self.keys.sustained.push_unique(press);

        let base_pitch = self.config.tuning.pitch(press.key, self.config.pitch_offset);

        for stack_index in 0..self.config.unison_voices {
            let Some(idx) = allocator::find_voice(self.pool.slots()) else {
                debug_assert!(false, "no voice available in a non-empty pool");
                return;
            };

            let slot = &mut self.pool.slots_mut()[idx];
            slot.info.start_time = self.state.sample_time;
            slot.info.key = Some(press.key);
            slot.info.stack_index = stack_index;
            slot.info.base_pitch = base_pitch;
            slot.info.aftertouch = 0.0;

            // A busy target was stolen
            let is_retrigger = slot.voice.is_busy();
            slot.voice.trigger(&slot.info, press.velocity, is_retrigger);
        }

        self.state.voices_active = true;
        self.state.previous_key = Some(press.key);
    }

    pub(super) fn poly_note_off(&mut self, key: u8) {
        if !self.state.sustain_down {
            self.keys.sustained.remove(key);
            self.pool.stop_key(key);
        }
    }

    pub(super) fn mono_note_on(&mut self, press: KeyPress) {
        self.keys.held.push_unique(press);
        self.keys.sustained.replace_with(press);
        self.trigger_mono_note(press);
    }

    pub(super) fn mono_note_off(&mut self, key: u8) {
        let bound = self.mono_key();

        if let Some(queued) = self.keys.held.last() {
            // Fall back to the most recent key still down
            if Some(queued.key) != bound {
                self.keys.sustained.replace_with(queued);
                self.trigger_mono_note(queued);
            }
        } else if self.state.sustain_down {
            // Already the only sustained entry, no need to re-add
            if let Some(queued) = self.keys.sustained.last() {
                if Some(queued.key) != bound {
                    self.trigger_mono_note(queued);
                }
            }
        } else {
            self.pool.stop_key(key);
        }
    }

    /// Rebind the unison slots to `press`.
    ///
    /// Idle voices start fresh. A busy voice re-attacks in Mono mode, or in
    /// Legato mode only once it has been released; a Legato voice that is
    /// still sounding just takes the new pitch.
    fn trigger_mono_note(&mut self, press: KeyPress) {
        let base_pitch = self.config.tuning.pitch(press.key, self.config.pitch_offset);
        let always_retrigger = self.config.poly_mode == PolyMode::Mono;
        let unison = self.config.unison_voices;

        for (stack_index, slot) in self.pool.slots_mut().iter_mut().take(unison).enumerate() {
            slot.info.key = Some(press.key);
            slot.info.stack_index = stack_index;
            slot.info.base_pitch = base_pitch;
            slot.info.aftertouch = 0.0;

            if !slot.voice.is_busy() {
                slot.voice.trigger(&slot.info, press.velocity, false);
            } else if always_retrigger || slot.voice.is_released() {
                slot.voice.trigger(&slot.info, press.velocity, true);
            }
        }

        self.state.voices_active = true;
    }

    /// Key bound to the first mono slot.
    fn mono_key(&self) -> Option<u8> {
        self.pool.get(0).and_then(|s| s.info.key)
    }
}
