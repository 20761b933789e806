use crate::io::midi::MidiEvent;

/// Decode a raw channel-voice message.
///
/// Running status and system messages are not handled; anything that is not
/// a complete channel message comes back as `None`.
pub fn parse_midi(bytes: &[u8]) -> Option<MidiEvent> {
    let (&status, data) = bytes.split_first()?;
    if status & 0x80 == 0 {
        return None;
    }

    let channel = status & 0x0F;
    let byte = |i: usize| data.get(i).map(|b| b & 0x7F);

    let event = match status & 0xF0 {
        0x80 => MidiEvent::NoteOff {
            channel,
            key: byte(0)?,
            velocity: byte(1)?,
        },
        0x90 => MidiEvent::NoteOn {
            channel,
            key: byte(0)?,
            velocity: byte(1)?,
        },
        0xA0 => MidiEvent::PolyAftertouch {
            channel,
            key: byte(0)?,
            pressure: byte(1)?,
        },
        0xB0 => MidiEvent::ControlChange {
            channel,
            controller: byte(0)?,
            value: byte(1)?,
        },
        0xC0 => MidiEvent::ProgramChange {
            channel,
            program: byte(0)?,
        },
        0xD0 => MidiEvent::ChannelAftertouch {
            channel,
            pressure: byte(0)?,
        },
        0xE0 => {
            let raw = (byte(1)? as i16) << 7 | byte(0)? as i16;
            MidiEvent::PitchBend {
                channel,
                value: raw - 8192,
            }
        }
        _ => return None,
    };

    Some(event)
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    pitch_to_freq(note as f32)
}

/// Fractional MIDI pitch to Hz. A4 = 69 = 440 Hz.
pub fn pitch_to_freq(pitch: f32) -> f32 {
    440.0 * 2.0_f32.powf((pitch - 69.0) / 12.0)
}
