/// Controller numbers the engine reacts to.
pub mod cc {
    pub const MOD_WHEEL: u8 = 1;
    pub const SUSTAIN: u8 = 64;
    pub const ALL_NOTES_OFF: u8 = 123;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    PolyAftertouch { channel: u8, key: u8, pressure: u8 },
    ChannelAftertouch { channel: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Signed, centered 14-bit bend: -8192..=8191.
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    pub fn note_on(key: u8, velocity: u8) -> Self {
        MidiEvent::NoteOn {
            channel: 0,
            key,
            velocity,
        }
    }

    pub fn note_off(key: u8) -> Self {
        MidiEvent::NoteOff {
            channel: 0,
            key,
            velocity: 0,
        }
    }

    pub fn control(controller: u8, value: u8) -> Self {
        MidiEvent::ControlChange {
            channel: 0,
            controller,
            value,
        }
    }

    pub fn sustain(down: bool) -> Self {
        Self::control(cc::SUSTAIN, if down { 127 } else { 0 })
    }

    pub fn all_notes_off() -> Self {
        Self::control(cc::ALL_NOTES_OFF, 0)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::PolyAftertouch { channel, .. }
            | MidiEvent::ChannelAftertouch { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

/// An event positioned inside the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    /// Sample offset from the start of the block being processed.
    pub offset: usize,
    pub event: MidiEvent,
}

impl TimedEvent {
    pub fn new(offset: usize, event: MidiEvent) -> Self {
        Self { offset, event }
    }
}

/// Pitch-bend wheel position mapped to -1.0..=1.0.
#[inline]
pub fn normalize_pitch_bend(value: i16) -> f32 {
    (value as f32 / 8192.0).clamp(-1.0, 1.0)
}

/// 7-bit controller value mapped to 0.0..=1.0.
#[inline]
pub fn normalize_control(value: u8) -> f32 {
    value.min(127) as f32 / 127.0
}
