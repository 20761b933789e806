use crate::synth::voice::Voice;

/// Factory for filling a voice pool
///
/// Configure the sound once, then the engine calls this for every slot.
/// The slot index is passed so stacked voices can be built with per-slot
/// variations (detune, pan) if the instrument wants them.
pub trait VoiceFactory {
    type Voice: Voice;

    fn create_voice(&self, index: usize) -> Self::Voice;
}

impl<F, T> VoiceFactory for F
where
    F: Fn(usize) -> T,
    T: Voice,
{
    type Voice = T;

    fn create_voice(&self, index: usize) -> Self::Voice {
        self(index)
    }
}
