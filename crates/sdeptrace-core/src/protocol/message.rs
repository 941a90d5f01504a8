use super::layout;

/// The four SDEP message kinds, each identified by a distinct lead byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Command,
    Response,
    Alert,
    Error,
}

impl MessageType {
    /// Looks up a lead byte. Any byte outside the table is not a message
    /// start.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            layout::LEAD_COMMAND => Some(Self::Command),
            layout::LEAD_RESPONSE => Some(Self::Response),
            layout::LEAD_ALERT => Some(Self::Alert),
            layout::LEAD_ERROR => Some(Self::Error),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Self::Command => layout::LEAD_COMMAND,
            Self::Response => layout::LEAD_RESPONSE,
            Self::Alert => layout::LEAD_ALERT,
            Self::Error => layout::LEAD_ERROR,
        }
    }

    pub fn long_label(self) -> &'static str {
        match self {
            Self::Command => "Command",
            Self::Response => "Response",
            Self::Alert => "Alert",
            Self::Error => "Error",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Self::Command => "cmd",
            Self::Response => "rsp",
            Self::Alert => "alr",
            Self::Error => "err",
        }
    }
}

/// The four decoded fields of a message, before channel qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    MessageType,
    CommandId,
    PayloadLength,
    Payload,
}
