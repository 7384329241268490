use std::fmt;

/// The eight structural markers of the wire format, one byte each.
///
/// Start/end pairs bracket a frame. The discriminants are the wire bytes and
/// are fixed; payloads written today must stay readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlMessage {
    StartPayload = 0,
    EndPayload = 1,
    StartTable = 2,
    EndTable = 3,
    StartDataAttribute = 4,
    EndDataAttribute = 5,
    StartReferenceAttribute = 6,
    EndReferenceAttribute = 7,
}

impl ControlMessage {
    /// The marker byte as written to the stream.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Looks up a marker by wire byte. Returns `None` for bytes outside `0..=7`.
    pub const fn from_tag(tag: u8) -> Option<ControlMessage> {
        Some(match tag {
            0 => ControlMessage::StartPayload,
            1 => ControlMessage::EndPayload,
            2 => ControlMessage::StartTable,
            3 => ControlMessage::EndTable,
            4 => ControlMessage::StartDataAttribute,
            5 => ControlMessage::EndDataAttribute,
            6 => ControlMessage::StartReferenceAttribute,
            7 => ControlMessage::EndReferenceAttribute,
            _ => return None,
        })
    }

    /// camelCase marker name used in diagnostics, matching the wire format docs.
    pub const fn name(self) -> &'static str {
        match self {
            ControlMessage::StartPayload => "startPayload",
            ControlMessage::EndPayload => "endPayload",
            ControlMessage::StartTable => "startTable",
            ControlMessage::EndTable => "endTable",
            ControlMessage::StartDataAttribute => "startDataAttribute",
            ControlMessage::EndDataAttribute => "endDataAttribute",
            ControlMessage::StartReferenceAttribute => "startReferenceAttribute",
            ControlMessage::EndReferenceAttribute => "endReferenceAttribute",
        }
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
