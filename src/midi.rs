// src/midi.rs

/// Channel messages the modulators react to. Everything else is dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiMessage {
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    /// Normalized to [-1, 1].
    PitchBend(f32),
}

/// A message stamped with its sample offset inside the block.
/// Lists handed to the engine are expected in ascending offset order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiEvent {
    pub sample_offset: usize,
    pub message: MidiMessage,
}

impl MidiMessage {
    const PITCH_BEND_CENTER: f32 = 8192.0;

    /// Decodes a raw channel message. Note-on with zero velocity is a note-off.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        match status & 0xF0 {
            0x80 => Some(MidiMessage::NoteOff {
                note: *data.first()? & 0x7F,
            }),
            0x90 => {
                let note = *data.first()? & 0x7F;
                let velocity = *data.get(1)? & 0x7F;
                if velocity == 0 {
                    Some(MidiMessage::NoteOff { note })
                } else {
                    Some(MidiMessage::NoteOn {
                        note,
                        velocity: velocity as f32 / 127.0,
                    })
                }
            }
            0xE0 => {
                let lsb = (*data.first()? & 0x7F) as u16;
                let msb = (*data.get(1)? & 0x7F) as u16;
                Some(MidiMessage::pitch_bend_from_raw((msb << 7) | lsb))
            }
            _ => None,
        }
    }

    /// Maps a 14-bit bend value (center 8192) onto [-1, 1].
    pub fn pitch_bend_from_raw(raw: u16) -> Self {
        let value = (raw.min(0x3FFF) as f32 - Self::PITCH_BEND_CENTER) / Self::PITCH_BEND_CENTER;
        MidiMessage::PitchBend(value.clamp(-1.0, 1.0))
    }
}

impl MidiEvent {
    pub fn new(sample_offset: usize, message: MidiMessage) -> Self {
        Self {
            sample_offset,
            message,
        }
    }

    pub fn from_bytes(sample_offset: usize, bytes: &[u8]) -> Option<Self> {
        MidiMessage::from_bytes(bytes).map(|message| Self::new(sample_offset, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_note_on_and_off() {
        assert_eq!(
            MidiMessage::from_bytes(&[0x91, 60, 127]),
            Some(MidiMessage::NoteOn {
                note: 60,
                velocity: 1.0
            })
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0x80, 60, 0]),
            Some(MidiMessage::NoteOff { note: 60 })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(
            MidiMessage::from_bytes(&[0x90, 64, 0]),
            Some(MidiMessage::NoteOff { note: 64 })
        );
    }

    #[test]
    fn pitch_bend_is_normalized() {
        assert_eq!(
            MidiMessage::from_bytes(&[0xE0, 0x00, 0x40]),
            Some(MidiMessage::PitchBend(0.0))
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0xE0, 0x00, 0x00]),
            Some(MidiMessage::PitchBend(-1.0))
        );
        match MidiMessage::from_bytes(&[0xE0, 0x7F, 0x7F]) {
            Some(MidiMessage::PitchBend(v)) => assert!(v > 0.999 && v <= 1.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn ignores_other_messages_and_truncated_data() {
        assert_eq!(MidiMessage::from_bytes(&[0xB0, 1, 64]), None);
        assert_eq!(MidiMessage::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiMessage::from_bytes(&[]), None);
    }

    #[test]
    fn event_keeps_offset() {
        let event = MidiEvent::from_bytes(17, &[0x90, 60, 100]);
        assert_eq!(event.map(|e| e.sample_offset), Some(17));
    }
}
