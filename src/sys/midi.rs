//! Decoding of raw MIDI channel messages.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
enum Status {
    NoteOff = 0x8,
    NoteOn = 0x9,
    PolyPressure = 0xA,
    ControlChange = 0xB,
    ProgramChange = 0xC,
    ChannelPressure = 0xD,
    PitchBend = 0xE,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Any other message, identified by its status byte.
    Other(u8),
}

impl MidiMessage {
    /// Decodes one message from its raw bytes. Returns `None` for data that
    /// is too short to be a channel message.
    ///
    /// A note-on with velocity 0 is a note-off by convention and decodes as
    /// [`MidiMessage::Other`].
    pub fn decode(bytes: &[u8]) -> Option<MidiMessage> {
        let &status_byte = bytes.first()?;
        let channel = status_byte & 0x0F;
        let message = match Status::try_from(status_byte >> 4) {
            Ok(Status::NoteOn) => {
                let (&note, &velocity) = (bytes.get(1)?, bytes.get(2)?);
                if velocity == 0 {
                    MidiMessage::Other(status_byte)
                } else {
                    MidiMessage::NoteOn { channel, note, velocity }
                }
            }
            Ok(Status::ControlChange) => {
                let (&controller, &value) = (bytes.get(1)?, bytes.get(2)?);
                MidiMessage::ControlChange { channel, controller, value }
            }
            _ => MidiMessage::Other(status_byte),
        };
        Some(message)
    }
}
