#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    synth::tables::{LookupTable, TuningTable},
    DEFAULT_GRANULARITY, MAX_BLOCK_SIZE,
};

/// How held keys map onto voices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolyMode {
    /// Every key gets its own voice (or unison stack).
    #[default]
    Poly,
    /// One note at a time; overlapping notes glide without re-attacking.
    Legato,
    /// One note at a time; every new note re-attacks.
    Mono,
}

impl PolyMode {
    /// Next mode in display order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            PolyMode::Poly => PolyMode::Legato,
            PolyMode::Legato => PolyMode::Mono,
            PolyMode::Mono => PolyMode::Poly,
        }
    }
}

/// Which aftertouch messages the engine listens to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AftertouchMode {
    /// Channel pressure applies to every voice.
    #[default]
    Channel,
    /// Polyphonic pressure applies to the voices bound to that key.
    PerKey,
}

/// Engine settings. Everything here can be persisted by the host.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub poly_mode: PolyMode,
    pub aftertouch_mode: AftertouchMode,
    /// Voices stacked per key. Clamped to the active voice count.
    pub unison_voices: usize,
    /// Active voices, `None` for the whole pool.
    pub voice_count: Option<usize>,
    /// Event quantization window in samples.
    pub granularity: usize,
    /// Global transpose, in semitones.
    pub pitch_offset: f32,
    pub sample_rate: f32,
    /// Largest block the host will ask for; sizes the event queue.
    pub max_block_size: usize,
    pub velocity_curve: LookupTable,
    pub aftertouch_curve: LookupTable,
    pub tuning: TuningTable,
}

impl EngineConfig {
    pub fn with_poly_mode(mut self, mode: PolyMode) -> Self {
        self.poly_mode = mode;
        self
    }

    pub fn with_aftertouch_mode(mut self, mode: AftertouchMode) -> Self {
        self.aftertouch_mode = mode;
        self
    }

    pub fn with_unison_voices(mut self, voices: usize) -> Self {
        self.unison_voices = voices;
        self
    }

    pub fn with_voice_count(mut self, voices: usize) -> Self {
        self.voice_count = Some(voices);
        self
    }

    pub fn with_granularity(mut self, granularity: usize) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_pitch_offset(mut self, semitones: f32) -> Self {
        self.pitch_offset = semitones;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_block_size(mut self, frames: usize) -> Self {
        self.max_block_size = frames;
        self
    }

    pub fn with_velocity_curve(mut self, curve: LookupTable) -> Self {
        self.velocity_curve = curve;
        self
    }

    pub fn with_aftertouch_curve(mut self, curve: LookupTable) -> Self {
        self.aftertouch_curve = curve;
        self
    }

    pub fn with_tuning(mut self, tuning: TuningTable) -> Self {
        self.tuning = tuning;
        self
    }

    /// Check the settings against a pool of `pool_size` voices.
    ///
    /// Unison is not checked here; it is clamped when applied.
    pub fn validate(&self, pool_size: usize) -> Result<(), ConfigError> {
        if pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        if pool_size > crate::MAX_VOICES {
            return Err(ConfigError::TooManyVoices(pool_size));
        }
        if let Some(requested) = self.voice_count {
            if requested == 0 || requested > pool_size {
                return Err(ConfigError::VoiceCount {
                    requested,
                    available: pool_size,
                });
            }
        }
        if self.granularity == 0 {
            return Err(ConfigError::ZeroGranularity);
        }
        validate_block_size(self.max_block_size)?;
        validate_sample_rate(self.sample_rate)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poly_mode: PolyMode::Poly,
            aftertouch_mode: AftertouchMode::Channel,
            unison_voices: 1,
            voice_count: None,
            granularity: DEFAULT_GRANULARITY,
            pitch_offset: 0.0,
            sample_rate: 48_000.0,
            max_block_size: MAX_BLOCK_SIZE,
            velocity_curve: LookupTable::identity(),
            aftertouch_curve: LookupTable::identity(),
            tuning: TuningTable::equal_tempered(),
        }
    }
}

pub(crate) fn validate_sample_rate(sample_rate: f32) -> Result<(), ConfigError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::SampleRate(sample_rate))
    }
}

pub(crate) fn validate_block_size(max_block_size: usize) -> Result<(), ConfigError> {
    if max_block_size == 0 {
        return Err(ConfigError::ZeroBlockSize);
    }
    Ok(())
}
