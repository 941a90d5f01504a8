use crate::Span;

use super::layout;
use super::message::{FieldKind, MessageType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    Start,
    CommandIdLow,
    CommandIdHigh,
    Length,
    Payload,
}

/// One decoded field, not yet qualified with a channel.
///
/// The span may cover more than the triggering sample: the command-id event
/// spans both of its bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEvent {
    pub span: Span,
    pub field: FieldKind,
    /// Labels ordered longest to shortest, at least one entry.
    pub labels: Vec<String>,
}

/// Running totals kept by one machine, read-only to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCounters {
    /// Bytes absorbed in `Start` while hunting for a valid lead byte.
    pub sync_discards: u64,
    /// Messages whose lead byte was seen.
    pub messages_started: u64,
    /// Messages decoded through their final byte.
    pub messages_completed: u64,
    /// Completed messages by type.
    pub commands: u64,
    pub responses: u64,
    pub alerts: u64,
    pub errors: u64,
    /// Payload bytes consumed across all messages.
    pub payload_bytes: u64,
}

/// Resynchronizing decoder for one bus direction.
///
/// Consumes one `(span, byte)` sample at a time, in arrival order, and
/// yields at most one [`FieldEvent`] per call. There is no error path:
/// a capture that begins mid-message recovers as soon as a valid lead
/// byte arrives, and malformed streams are absorbed as best-effort
/// partial decodes.
#[derive(Debug)]
pub struct ChannelMachine {
    state: DecoderState,
    message: Option<MessageType>,
    cmd_id_low: u8,
    cmd_id_start: u64,
    remaining: u8,
    counters: ChannelCounters,
}

impl ChannelMachine {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Start,
            message: None,
            cmd_id_low: 0,
            cmd_id_start: 0,
            remaining: 0,
            counters: ChannelCounters::default(),
        }
    }

    /// Returns the machine to `Start` with partial fields and counters
    /// cleared, for a fresh decode of a restarted capture session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn counters(&self) -> &ChannelCounters {
        &self.counters
    }

    /// Consumes one sample for this channel.
    ///
    /// State always advances positionally; only `Start` inspects content
    /// to decide whether to advance at all.
    pub fn decode(&mut self, span: Span, byte: u8) -> Option<FieldEvent> {
        match self.state {
            DecoderState::Start => {
                let Some(message) = MessageType::from_byte(byte) else {
                    self.counters.sync_discards += 1;
                    return None;
                };
                self.message = Some(message);
                self.counters.messages_started += 1;
                self.state = DecoderState::CommandIdLow;
                Some(FieldEvent {
                    span,
                    field: FieldKind::MessageType,
                    labels: vec![
                        message.long_label().to_string(),
                        message.short_label().to_string(),
                    ],
                })
            }
            DecoderState::CommandIdLow => {
                self.cmd_id_low = byte;
                self.cmd_id_start = span.start;
                self.state = DecoderState::CommandIdHigh;
                None
            }
            DecoderState::CommandIdHigh => {
                let cmd_id = u16::from_le_bytes([self.cmd_id_low, byte]);
                self.state = DecoderState::Length;
                Some(FieldEvent {
                    span: Span::new(self.cmd_id_start, span.end),
                    field: FieldKind::CommandId,
                    labels: vec![
                        format!("Command ID: 0x{cmd_id:04x}"),
                        format!("cmd_id: {cmd_id:04x}"),
                    ],
                })
            }
            DecoderState::Length => {
                let more = u8::from(byte & layout::MORE_FLAG_BIT != 0);
                let payload_len = byte & layout::PAYLOAD_LEN_MASK;
                self.remaining = payload_len;
                if payload_len == 0 {
                    // Zero-length messages skip the payload state entirely.
                    self.finish_message();
                } else {
                    self.state = DecoderState::Payload;
                }
                Some(FieldEvent {
                    span,
                    field: FieldKind::PayloadLength,
                    labels: vec![
                        format!("Payload Length: {payload_len}, More: {more}"),
                        format!("len: {payload_len}, more: {more}"),
                    ],
                })
            }
            DecoderState::Payload => {
                self.remaining -= 1;
                self.counters.payload_bytes += 1;
                if self.remaining == 0 {
                    self.finish_message();
                }
                Some(FieldEvent {
                    span,
                    field: FieldKind::Payload,
                    labels: vec![payload_label(byte)],
                })
            }
        }
    }

    fn finish_message(&mut self) {
        if let Some(message) = self.message.take() {
            self.counters.messages_completed += 1;
            match message {
                MessageType::Command => self.counters.commands += 1,
                MessageType::Response => self.counters.responses += 1,
                MessageType::Alert => self.counters.alerts += 1,
                MessageType::Error => self.counters.errors += 1,
            }
        }
        self.state = DecoderState::Start;
    }
}

impl Default for ChannelMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Printable ASCII is rendered as the character itself, anything else as a
/// `\x`-prefixed hex escape so control bytes stay legible in the sink.
fn payload_label(byte: u8) -> String {
    if (0x20..=0x7e).contains(&byte) {
        (byte as char).to_string()
    } else {
        format!("\\x{byte:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelMachine, DecoderState, FieldEvent, payload_label};
    use crate::Span;
    use crate::protocol::FieldKind;

    fn feed(machine: &mut ChannelMachine, bytes: &[u8]) -> Vec<FieldEvent> {
        bytes
            .iter()
            .enumerate()
            .filter_map(|(i, &byte)| machine.decode(Span::new(i as u64, i as u64 + 1), byte))
            .collect()
    }

    #[test]
    fn lead_bytes_start_a_message() {
        for (byte, long, short) in [
            (0x10u8, "Command", "cmd"),
            (0x20, "Response", "rsp"),
            (0x40, "Alert", "alr"),
            (0x80, "Error", "err"),
        ] {
            let mut machine = ChannelMachine::new();
            let event = machine.decode(Span::new(0, 1), byte).expect("lead byte");
            assert_eq!(event.field, FieldKind::MessageType);
            assert_eq!(event.labels, vec![long.to_string(), short.to_string()]);
            assert_eq!(event.span, Span::new(0, 1));
            assert_eq!(machine.state, DecoderState::CommandIdLow);
        }
    }

    #[test]
    fn non_lead_bytes_are_absorbed_in_start() {
        let mut machine = ChannelMachine::new();
        let mut absorbed = 0u64;
        for byte in 0u8..=255 {
            if [0x10, 0x20, 0x40, 0x80].contains(&byte) {
                continue;
            }
            assert!(machine.decode(Span::new(0, 1), byte).is_none());
            assert_eq!(machine.state, DecoderState::Start);
            absorbed += 1;
        }
        assert_eq!(machine.counters().sync_discards, absorbed);
    }

    #[test]
    fn decodes_a_full_command_message() {
        let mut machine = ChannelMachine::new();
        let events = feed(&mut machine, &[0x10, 0x34, 0x12, 0x02, 0x68, 0x69]);

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].labels[0], "Command");
        assert_eq!(events[1].labels[0], "Command ID: 0x1234");
        assert_eq!(events[1].span, Span::new(1, 3));
        assert_eq!(events[2].labels[0], "Payload Length: 2, More: 0");
        assert_eq!(events[3].labels, vec!["h".to_string()]);
        assert_eq!(events[4].labels, vec!["i".to_string()]);
        assert_eq!(machine.state, DecoderState::Start);

        let counters = machine.counters();
        assert_eq!(counters.messages_completed, 1);
        assert_eq!(counters.commands, 1);
        assert_eq!(counters.payload_bytes, 2);
    }

    #[test]
    fn resynchronizes_after_junk_bytes() {
        let mut machine = ChannelMachine::new();
        let events = feed(&mut machine, &[0xFF, 0xFF, 0x20, 0x00, 0x00, 0x00]);

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].labels[0], "Response");
        assert_eq!(events[0].span, Span::new(2, 3));
        assert_eq!(events[1].labels[0], "Command ID: 0x0000");
        assert_eq!(events[1].span, Span::new(3, 5));
        assert_eq!(events[2].labels[0], "Payload Length: 0, More: 0");
        assert_eq!(machine.state, DecoderState::Start);
        assert_eq!(machine.counters().sync_discards, 2);
        assert_eq!(machine.counters().responses, 1);
    }

    #[test]
    fn zero_length_payload_returns_directly_to_start() {
        let mut machine = ChannelMachine::new();
        let events = feed(&mut machine, &[0x10, 0x01, 0x00, 0x00, 0x10]);

        // Length byte closes the message; the trailing 0x10 starts a new one.
        assert_eq!(events.len(), 4);
        assert_eq!(events[2].field, FieldKind::PayloadLength);
        assert_eq!(events[3].field, FieldKind::MessageType);
        assert_eq!(machine.counters().payload_bytes, 0);
    }

    #[test]
    fn more_flag_and_length_are_split_from_one_byte() {
        let mut machine = ChannelMachine::new();
        let events = feed(&mut machine, &[0x20, 0x00, 0x00, 0x9F]);

        // 0x9F = more bit set, five length bits all set.
        assert_eq!(events[2].labels[0], "Payload Length: 31, More: 1");
        assert_eq!(events[2].labels[1], "len: 31, more: 1");
        assert_eq!(machine.state, DecoderState::Payload);
        assert_eq!(machine.remaining, 31);
    }

    #[test]
    fn bit_six_of_the_length_byte_is_ignored() {
        let mut machine = ChannelMachine::new();
        let events = feed(&mut machine, &[0x20, 0x00, 0x00, 0x42]);

        assert_eq!(events[2].labels[0], "Payload Length: 2, More: 0");
    }

    #[test]
    fn command_id_is_little_endian() {
        let mut machine = ChannelMachine::new();
        let events = feed(&mut machine, &[0x10, 0xCD, 0xAB, 0x00]);

        assert_eq!(events[1].labels, vec![
            "Command ID: 0xabcd".to_string(),
            "cmd_id: abcd".to_string(),
        ]);
    }

    #[test]
    fn reset_clears_a_partial_decode() {
        let mut machine = ChannelMachine::new();
        feed(&mut machine, &[0x10, 0x34]);
        machine.reset();

        assert_eq!(machine.state, DecoderState::Start);
        assert_eq!(machine.counters().messages_started, 0);

        // A lead byte right after reset starts a fresh message.
        let event = machine.decode(Span::new(9, 10), 0x40).expect("lead byte");
        assert_eq!(event.labels[0], "Alert");
    }

    #[test]
    fn payload_labels_escape_non_printable_bytes() {
        assert_eq!(payload_label(b'h'), "h");
        assert_eq!(payload_label(0x7e), "~");
        assert_eq!(payload_label(0x0a), "\\x0a");
        assert_eq!(payload_label(0xff), "\\xff");
    }
}
