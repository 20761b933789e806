//! Held and sustained key bookkeeping.
//!
//! Both lists are insertion-ordered and sized up front for all 128 keys,
//! so pushes never reallocate on the audio thread.

const KEY_COUNT: usize = 128;

/// A key press. Identity is the key alone; velocity rides along.
#[derive(Debug, Clone, Copy)]
pub struct KeyPress {
    pub key: u8,
    /// Velocity after the lookup table, 1/127..=1.0.
    pub velocity: f32,
}

impl KeyPress {
    pub fn new(key: u8, velocity: f32) -> Self {
        Self { key, velocity }
    }
}

impl PartialEq for KeyPress {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for KeyPress {}

/// Ordered set of key presses with no duplicate keys.
#[derive(Debug, Clone)]
pub struct KeyList {
    presses: Vec<KeyPress>,
}

impl KeyList {
    pub fn new() -> Self {
        Self {
            presses: Vec::with_capacity(KEY_COUNT),
        }
    }

    pub fn contains(&self, key: u8) -> bool {
        self.presses.iter().any(|p| p.key == key)
    }

    /// Append unless the key is already present. Returns whether it was added.
    pub fn push_unique(&mut self, press: KeyPress) -> bool {
        if self.presses.contains(&press) {
            return false;
        }
        self.presses.push(press);
        true
    }

    /// Remove the entry for `key`, if any. Missing keys are a no-op.
    pub fn remove(&mut self, key: u8) -> Option<KeyPress> {
        let idx = self.presses.iter().position(|p| p.key == key)?;
        Some(self.presses.remove(idx))
    }

    /// Replace the whole list with a single entry.
    pub fn replace_with(&mut self, press: KeyPress) {
        self.presses.clear();
        self.presses.push(press);
    }

    /// Most recently added entry.
    pub fn last(&self) -> Option<KeyPress> {
        self.presses.last().copied()
    }

    pub fn retain(&mut self, f: impl FnMut(&KeyPress) -> bool) {
        self.presses.retain(f);
    }

    pub fn clear(&mut self) {
        self.presses.clear();
    }

    pub fn len(&self) -> usize {
        self.presses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presses.is_empty()
    }

    pub fn as_slice(&self) -> &[KeyPress] {
        &self.presses
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyPress> {
        self.presses.iter()
    }
}

impl Default for KeyList {
    fn default() -> Self {
        Self::new()
    }
}

/// Physically held keys, and keys that must keep sounding (held or pedalled).
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    pub held: KeyList,
    pub sustained: KeyList,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.sustained.clear();
    }
}
