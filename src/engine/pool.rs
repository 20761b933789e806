//! Fixed-capacity, index-addressed voice storage.

use std::fmt;

use crate::{
    error::ConfigError,
    synth::voice::{Voice, VoiceInfo},
    MAX_VOICES,
};

const _: () = assert!(MAX_VOICES <= u32::BITS as usize);

/// One pool entry: the voice and the engine's bookkeeping for it.
#[derive(Debug)]
pub struct VoiceSlot<V> {
    pub voice: V,
    pub info: VoiceInfo,
}

/// Busy flags for the active part of the pool, one bit per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoiceStatus {
    bits: u32,
    len: u8,
}

impl VoiceStatus {
    pub fn count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_busy(&self, index: usize) -> bool {
        index < self.len as usize && self.bits & (1 << index) != 0
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }
}

/// Slot 0 first: `_` free, `X` busy.
impl fmt::Display for VoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len() {
            f.write_str(if self.is_busy(i) { "X" } else { "_" })?;
        }
        Ok(())
    }
}

/// The engine's voices. Capacity is fixed at construction; only the first
/// `len` voices take part in scheduling.
#[derive(Debug)]
pub struct VoicePool<V> {
    slots: Vec<VoiceSlot<V>>,
    len: usize,
    status: VoiceStatus,
}

impl<V: Voice> VoicePool<V> {
    pub fn new(voices: Vec<V>) -> Result<Self, ConfigError> {
        if voices.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        if voices.len() > MAX_VOICES {
            return Err(ConfigError::TooManyVoices(voices.len()));
        }

        let len = voices.len();
        let slots = voices
            .into_iter()
            .map(|voice| VoiceSlot {
                voice,
                info: VoiceInfo::new(),
            })
            .collect();

        Ok(Self {
            slots,
            len,
            status: VoiceStatus {
                bits: 0,
                len: len as u8,
            },
        })
    }

    /// Number of voices the pool was built with.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of voices in use.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Change the number of voices in use. Every voice is hard-killed first
    /// so nothing keeps sounding outside the active range.
    pub fn set_len(&mut self, len: usize) -> Result<(), ConfigError> {
        if len == 0 || len > self.capacity() {
            return Err(ConfigError::VoiceCount {
                requested: len,
                available: self.capacity(),
            });
        }
        self.kill_all(false);
        self.len = len;
        self.refresh_status();
        Ok(())
    }

    pub fn slots(&self) -> &[VoiceSlot<V>] {
        &self.slots[..self.len]
    }

    pub fn slots_mut(&mut self) -> &mut [VoiceSlot<V>] {
        &mut self.slots[..self.len]
    }

    pub fn get(&self, index: usize) -> Option<&VoiceSlot<V>> {
        self.slots().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut VoiceSlot<V>> {
        self.slots_mut().get_mut(index)
    }

    /// Every voice including inactive ones, for host-side setup such as
    /// sample-rate changes.
    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut VoiceSlot<V>> {
        self.slots.iter_mut()
    }

    pub fn any_busy(&self) -> bool {
        self.slots().iter().any(|s| s.voice.is_busy())
    }

    /// Re-read every voice's busy flag. Returns whether any voice is busy.
    pub fn refresh_status(&mut self) -> bool {
        let mut bits = 0u32;
        for (i, slot) in self.slots().iter().enumerate() {
            if slot.voice.is_busy() {
                bits |= 1 << i;
            }
        }
        self.status = VoiceStatus {
            bits,
            len: self.len as u8,
        };
        bits != 0
    }

    /// Status as of the last refresh.
    pub fn status(&self) -> VoiceStatus {
        self.status
    }

    /// First voice bound to `key`, if any.
    pub fn find_key(&self, key: u8) -> Option<usize> {
        self.slots().iter().position(|s| s.info.key == Some(key))
    }

    /// Release every busy voice bound to `key` and unbind it.
    pub fn stop_key(&mut self, key: u8) {
        for slot in self.slots_mut() {
            if slot.info.key == Some(key) && slot.voice.is_busy() {
                slot.voice.release();
                slot.info.detach();
            }
        }
    }

    pub fn kill_all(&mut self, soft: bool) {
        for slot in self.slots_mut() {
            slot.voice.kill(soft);
            slot.info.detach();
        }
    }
}
