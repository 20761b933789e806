use thiserror::Error;

/// Rejected engine configuration.
///
/// Everything here is caught before the first block is processed; the audio
/// path itself never returns an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("voice pool is empty")]
    EmptyPool,
    #[error("voice pool holds {0} voices, the maximum is {max}", max = crate::MAX_VOICES)]
    TooManyVoices(usize),
    #[error("active voice count {requested} is outside 1..={available}")]
    VoiceCount { requested: usize, available: usize },
    #[error("granularity must be at least one sample")]
    ZeroGranularity,
    #[error("maximum block size must be at least one frame")]
    ZeroBlockSize,
    #[error("sample rate must be positive and finite, got {0}")]
    SampleRate(f32),
    #[error("lookup table needs 128 entries, got {0}")]
    TableLength(usize),
    #[error("lookup table entry {index} is {value}, the maximum is 127")]
    TableValue { index: usize, value: u8 },
}
