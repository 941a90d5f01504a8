use serde::{Deserialize, Serialize};

use crate::Span;
use crate::protocol::{ChannelCounters, ChannelMachine, FieldKind};
use crate::source::{DualSample, SampleKind};

/// One of the two independent byte directions on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    HostToDevice,
    DeviceToHost,
}

impl Channel {
    pub fn label(self) -> &'static str {
        match self {
            Self::HostToDevice => "host",
            Self::DeviceToHost => "device",
        }
    }
}

/// Presentation categories: the four decoded fields, qualified per channel
/// so a sink can group annotations into one display row per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    HostMessageType,
    HostCommandId,
    HostPayloadLength,
    HostPayload,
    DeviceMessageType,
    DeviceCommandId,
    DevicePayloadLength,
    DevicePayload,
}

impl AnnotationKind {
    /// Total mapping from channel and decoded field to presentation
    /// category.
    pub fn for_field(channel: Channel, field: FieldKind) -> Self {
        match (channel, field) {
            (Channel::HostToDevice, FieldKind::MessageType) => Self::HostMessageType,
            (Channel::HostToDevice, FieldKind::CommandId) => Self::HostCommandId,
            (Channel::HostToDevice, FieldKind::PayloadLength) => Self::HostPayloadLength,
            (Channel::HostToDevice, FieldKind::Payload) => Self::HostPayload,
            (Channel::DeviceToHost, FieldKind::MessageType) => Self::DeviceMessageType,
            (Channel::DeviceToHost, FieldKind::CommandId) => Self::DeviceCommandId,
            (Channel::DeviceToHost, FieldKind::PayloadLength) => Self::DevicePayloadLength,
            (Channel::DeviceToHost, FieldKind::Payload) => Self::DevicePayload,
        }
    }

    /// Display row this category belongs to.
    pub fn row(self) -> Channel {
        match self {
            Self::HostMessageType
            | Self::HostCommandId
            | Self::HostPayloadLength
            | Self::HostPayload => Channel::HostToDevice,
            Self::DeviceMessageType
            | Self::DeviceCommandId
            | Self::DevicePayloadLength
            | Self::DevicePayload => Channel::DeviceToHost,
        }
    }
}

/// A decoded field rendered as a timestamped, labeled span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub span: Span,
    pub kind: AnnotationKind,
    /// Labels ordered longest to shortest, at least one entry.
    pub labels: Vec<String>,
}

/// Destination for decoded annotations. Display formatting is the sink's
/// concern; the decoder never truncates or pads labels.
pub trait AnnotationSink {
    fn annotate(&mut self, annotation: Annotation);
}

impl AnnotationSink for Vec<Annotation> {
    fn annotate(&mut self, annotation: Annotation) {
        self.push(annotation);
    }
}

/// Fans each dual sample out to the two per-channel machines and forwards
/// their events, channel-qualified, to the sink.
#[derive(Debug, Default)]
pub struct Dispatcher {
    host: ChannelMachine,
    device: ChannelMachine,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one dual sample. Control cycles are skipped entirely: no
    /// state transition, no annotation.
    pub fn on_sample<S: AnnotationSink>(&mut self, sample: DualSample, sink: &mut S) {
        if sample.kind != SampleKind::Data {
            return;
        }
        if let Some(event) = self.host.decode(sample.span, sample.host) {
            sink.annotate(Annotation {
                span: event.span,
                kind: AnnotationKind::for_field(Channel::HostToDevice, event.field),
                labels: event.labels,
            });
        }
        if let Some(event) = self.device.decode(sample.span, sample.device) {
            sink.annotate(Annotation {
                span: event.span,
                kind: AnnotationKind::for_field(Channel::DeviceToHost, event.field),
                labels: event.labels,
            });
        }
    }

    /// Returns both machines to their start state with cleared counters.
    pub fn reset(&mut self) {
        self.host.reset();
        self.device.reset();
    }

    pub fn counters(&self, channel: Channel) -> &ChannelCounters {
        match channel {
            Channel::HostToDevice => self.host.counters(),
            Channel::DeviceToHost => self.device.counters(),
        }
    }
}
