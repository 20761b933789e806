//! Voice selection for new notes.

use crate::{engine::pool::VoiceSlot, synth::voice::Voice};

/// Pick the slot a new note should play on.
///
/// The first idle voice wins. With every voice busy, the one triggered
/// longest ago is stolen; equal start times go to the lowest index.
/// Returns `None` only for an empty slice.
pub fn find_voice<V: Voice>(slots: &[VoiceSlot<V>]) -> Option<usize> {
    find_free_voice(slots).or_else(|| find_steal_target(slots))
}

/// First slot whose voice is not busy.
pub fn find_free_voice<V: Voice>(slots: &[VoiceSlot<V>]) -> Option<usize> {
    slots.iter().position(|s| !s.voice.is_busy())
}

/// Oldest-triggered slot. `min_by_key` keeps the first of equal minima.
pub fn find_steal_target<V: Voice>(slots: &[VoiceSlot<V>]) -> Option<usize> {
    slots
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| s.info.start_time)
        .map(|(idx, _)| idx)
}
