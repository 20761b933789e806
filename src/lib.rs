pub mod engine; // Block scheduling, trigger policies, voice allocation
pub mod error;
pub mod io;
pub mod synth; // Voice contract, key tracking, lookup tables

pub use engine::{
    config::{AftertouchMode, EngineConfig, PolyMode},
    PolyEngine,
};
pub use error::ConfigError;
pub use synth::voice::{Voice, VoiceInfo};

/// Upper bound on the number of voices a pool can hold.
pub const MAX_VOICES: usize = 32;
pub const MAX_BLOCK_SIZE: usize = 2048;
/// Default event quantization window, in samples.
pub const DEFAULT_GRANULARITY: usize = 16;
