//! Core decoder library for SDEP serial-bus captures.
//!
//! This crate turns a stream of timestamped dual-channel byte samples into
//! labeled, time-spanned protocol annotations: sample sources feed the
//! dispatcher, which drives one resynchronizing state machine per bus
//! direction and forwards each decoded field to the host's annotation sink.
//! Decoding is byte-oriented and performs no I/O; sample acquisition lives
//! behind the `source` trait and display formatting belongs to the sink.
//!
//! Invariants:
//! - The two bus directions are decoded by isolated machines; neither ever
//!   observes the other's state.
//! - No byte is ever rejected: bytes that match no message start are
//!   silently absorbed until a valid lead byte resynchronizes the machine.
//! - At most one annotation is emitted per channel per consumed sample.
//! - Control (non-data) bus cycles cause no state transition and no
//!   annotation.
//!
//! # Examples
//! ```
//! use sdeptrace_core::{
//!     Annotation, DecodeConfig, DualSample, ReplaySource, SampleKind, Span, decode_source,
//! };
//!
//! let samples: Vec<DualSample> = [0x10, 0x34, 0x12, 0x02, 0x68, 0x69]
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, byte)| DualSample {
//!         span: Span::new(i as u64, i as u64 + 1),
//!         kind: SampleKind::Data,
//!         host: byte,
//!         device: 0x00,
//!     })
//!     .collect();
//!
//! let source = ReplaySource::new(samples)?;
//! let mut annotations: Vec<Annotation> = Vec::new();
//! let report = decode_source(source, &mut annotations, &DecodeConfig::default())?;
//!
//! assert_eq!(report.samples_total, 6);
//! assert_eq!(report.host.commands, 1);
//! assert_eq!(annotations[0].labels, vec!["Command".to_string(), "cmd".to_string()]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod dispatch;
mod protocol;
mod session;
mod source;

pub use dispatch::{Annotation, AnnotationKind, AnnotationSink, Channel, Dispatcher};
pub use protocol::{ChannelCounters, ChannelMachine, FieldEvent, FieldKind, MessageType};
pub use session::{DecodeError, decode_source};
pub use source::{DualSample, ReplaySource, SampleKind, SampleSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Fallback timestamp used when formatting the report generation time fails.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Half-open timestamp span `[start, end)` in bus sample-clock units.
///
/// # Examples
/// ```
/// use sdeptrace_core::Span;
///
/// let span = Span::new(4, 6);
/// assert_eq!(span.start, 4);
/// assert_eq!(span.end, 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// First sample-clock unit covered by the span.
    pub start: u64,
    /// One past the last sample-clock unit covered by the span.
    pub end: u64,
}

impl Span {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }
}

/// Decoder configuration supplied by the embedding host.
///
/// The sample rate is accepted and retained but never consulted by the
/// decoding logic; it only supports wall-clock conversion in the report.
///
/// # Examples
/// ```
/// use sdeptrace_core::DecodeConfig;
///
/// let config = DecodeConfig { sample_rate: Some(1_000_000) };
/// assert_eq!(config.sample_rate, Some(1_000_000));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Samples per second, when the host knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u64>,
}

/// Summary of one decode run with deterministic per-channel totals.
///
/// # Examples
/// ```
/// use sdeptrace_core::{ChannelSummary, DecodeReport, ToolInfo};
///
/// let report = DecodeReport {
///     report_version: sdeptrace_core::REPORT_VERSION,
///     tool: ToolInfo {
///         name: "sdeptrace".to_string(),
///         version: "0.1.0".to_string(),
///     },
///     generated_at: "1970-01-01T00:00:00Z".to_string(),
///     samples_total: 0,
///     control_samples: 0,
///     span_start: None,
///     span_end: None,
///     duration_s: None,
///     host: ChannelSummary::default(),
///     device: ChannelSummary::default(),
/// };
/// assert_eq!(report.report_version, sdeptrace_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Total samples pulled from the source, control cycles included.
    pub samples_total: u64,
    /// Control cycles skipped without touching decoder state.
    pub control_samples: u64,
    /// Start of the first observed sample span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_start: Option<u64>,
    /// End of the last observed sample span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_end: Option<u64>,
    /// Capture duration in seconds, present only when a sample rate was
    /// configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,

    /// Host-to-device channel totals.
    pub host: ChannelSummary,
    /// Device-to-host channel totals.
    pub device: ChannelSummary,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use sdeptrace_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "sdeptrace".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "sdeptrace");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "sdeptrace").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Per-channel decode totals.
///
/// Per-message-type counts tally completed messages; `messages_started`
/// additionally counts messages whose lead byte was seen but whose decode
/// did not finish before the capture ended.
///
/// # Examples
/// ```
/// use sdeptrace_core::ChannelSummary;
///
/// let summary = ChannelSummary::default();
/// assert_eq!(summary.messages_completed, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    /// Messages whose lead byte was observed.
    pub messages_started: u64,
    /// Messages decoded through their final byte.
    pub messages_completed: u64,
    /// Completed Command messages.
    pub commands: u64,
    /// Completed Response messages.
    pub responses: u64,
    /// Completed Alert messages.
    pub alerts: u64,
    /// Completed Error messages.
    pub errors: u64,
    /// Payload bytes consumed across all messages.
    pub payload_bytes: u64,
    /// Bytes absorbed while hunting for a valid lead byte.
    pub sync_discards: u64,
}
