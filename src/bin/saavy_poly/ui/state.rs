//! Messages crossing between the UI thread and the audio thread
//!
//! Everything here is `Copy` so it can travel through rtrb without
//! allocating on the audio side.

use saavy_poly::{PolyEngine, PolyMode, Voice};

/// Most keys shown in the held/sustained lists.
pub const KEY_SLOTS: usize = 16;

/// Commands sent from UI thread to audio thread
#[derive(Clone, Copy, Debug)]
pub enum ControlMessage {
    SetPolyMode(PolyMode),
    SetUnison(usize),
    /// All notes off: clears keys, lifts the pedal, soft-kills voices
    Panic,
}

/// Fixed-capacity key list for display
#[derive(Clone, Copy, Debug, Default)]
pub struct KeySnapshot {
    keys: [u8; KEY_SLOTS],
    len: u8,
}

impl KeySnapshot {
    fn capture(keys: impl Iterator<Item = u8>) -> Self {
        let mut snapshot = Self::default();
        for key in keys.take(KEY_SLOTS) {
            snapshot.keys[snapshot.len as usize] = key;
            snapshot.len += 1;
        }
        snapshot
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.keys[..self.len as usize]
    }
}

/// Engine state published after every audio callback
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusUpdate {
    /// Busy bitmap, bit `i` for voice `i`
    pub voice_bits: u32,
    pub voice_count: u8,
    pub poly_mode: PolyMode,
    pub unison: u8,
    pub sustain: bool,
    pub held: KeySnapshot,
    pub sustained: KeySnapshot,
    pub previous_key: Option<u8>,
    pub dropped_events: u64,
    pub sample_time: u64,
}

impl StatusUpdate {
    pub fn capture<V: Voice>(engine: &PolyEngine<V>) -> Self {
        let status = engine.voice_status();
        Self {
            voice_bits: status.bits(),
            voice_count: status.len() as u8,
            poly_mode: engine.poly_mode(),
            unison: engine.unison_voices() as u8,
            sustain: engine.sustain_pedal(),
            held: KeySnapshot::capture(engine.held_keys().iter().map(|k| k.key)),
            sustained: KeySnapshot::capture(engine.sustained_notes().iter().map(|k| k.key)),
            previous_key: engine.previous_key(),
            dropped_events: engine.dropped_events(),
            sample_time: engine.sample_time(),
        }
    }

    pub fn is_busy(&self, voice: usize) -> bool {
        voice < 32 && self.voice_bits & (1 << voice) != 0
    }

    pub fn busy_count(&self) -> u32 {
        self.voice_bits.count_ones()
    }
}
