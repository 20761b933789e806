//! Velocity / aftertouch remapping and per-key tuning.
//!
//! Tables are plain arrays so lookups are branch-free on the audio thread.
//! With the `serde` feature they serialize as flat sequences and refuse to
//! deserialize from the wrong number of entries or from entries above 127.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const TABLE_LEN: usize = 128;

/// 7-bit to 7-bit remapping curve. Identity by default.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<u8>", into = "Vec<u8>")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTable {
    values: [u8; TABLE_LEN],
}

impl LookupTable {
    pub fn identity() -> Self {
        Self::from_fn(|i| i)
    }

    /// Build a table from a mapping; results above 127 are clipped.
    pub fn from_fn(mut f: impl FnMut(u8) -> u8) -> Self {
        let mut values = [0u8; TABLE_LEN];
        for (i, v) in values.iter_mut().enumerate() {
            *v = f(i as u8).min(127);
        }
        Self { values }
    }

    /// Out-of-range inputs are clipped to the table domain before indexing.
    #[inline]
    pub fn get(&self, input: u8) -> u8 {
        self.values[input.min(127) as usize]
    }

    pub fn set(&mut self, input: u8, output: u8) {
        self.values[input.min(127) as usize] = output.min(127);
    }

    /// Mapped value scaled to 0.0..=1.0.
    #[inline]
    pub fn normalized(&self, input: u8) -> f32 {
        self.get(input) as f32 / 127.0
    }

    /// Mapped velocity scaled to 1/127..=1.0. A sounding note never maps to
    /// zero level, whatever the curve says.
    #[inline]
    pub fn velocity(&self, input: u8) -> f32 {
        self.get(input).clamp(1, 127) as f32 / 127.0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::identity()
    }
}

impl TryFrom<Vec<u8>> for LookupTable {
    type Error = ConfigError;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        if values.len() != TABLE_LEN {
            return Err(ConfigError::TableLength(values.len()));
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, &v)| v > 127) {
            return Err(ConfigError::TableValue { index, value });
        }
        Ok(Self::from_fn(|i| values[i as usize]))
    }
}

impl From<LookupTable> for Vec<u8> {
    fn from(table: LookupTable) -> Self {
        table.values.to_vec()
    }
}

/// Per-key pitch deviation in semitones, for microtonal scales.
/// All zeros (12-TET) by default.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<f32>", into = "Vec<f32>")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningTable {
    offsets: [f32; TABLE_LEN],
}

impl TuningTable {
    pub fn equal_tempered() -> Self {
        Self {
            offsets: [0.0; TABLE_LEN],
        }
    }

    pub fn from_fn(mut f: impl FnMut(u8) -> f32) -> Self {
        let mut offsets = [0.0; TABLE_LEN];
        for (i, o) in offsets.iter_mut().enumerate() {
            *o = f(i as u8);
        }
        Self { offsets }
    }

    #[inline]
    pub fn offset(&self, key: u8) -> f32 {
        self.offsets[key.min(127) as usize]
    }

    pub fn set_offset(&mut self, key: u8, semitones: f32) {
        self.offsets[key.min(127) as usize] = semitones;
    }

    /// Pitch for `key` in semitones, with a global transpose applied.
    #[inline]
    pub fn pitch(&self, key: u8, transpose: f32) -> f32 {
        key as f32 + transpose + self.offset(key)
    }
}

impl Default for TuningTable {
    fn default() -> Self {
        Self::equal_tempered()
    }
}

impl TryFrom<Vec<f32>> for TuningTable {
    type Error = ConfigError;

    fn try_from(offsets: Vec<f32>) -> Result<Self, Self::Error> {
        if offsets.len() != TABLE_LEN {
            return Err(ConfigError::TableLength(offsets.len()));
        }
        Ok(Self::from_fn(|i| offsets[i as usize]))
    }
}

impl From<TuningTable> for Vec<f32> {
    fn from(table: TuningTable) -> Self {
        table.offsets.to_vec()
    }
}
