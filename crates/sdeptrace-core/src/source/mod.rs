mod replay;

pub use replay::ReplaySource;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Span;

/// Bus framing tag for one sample. Control cycles (chip-select changes,
/// idle time) carry no data byte and are skipped by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    Data,
    Control,
}

/// One bus clock unit: a timestamp span plus one byte per direction,
/// already demultiplexed by the acquisition layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualSample {
    pub span: Span,
    pub kind: SampleKind,
    /// Host-to-device byte.
    pub host: u8,
    /// Device-to-host byte.
    pub device: u8,
}

/// Ordered sample input. Implementations must yield samples strictly
/// ordered by span start, non-overlapping.
pub trait SampleSource {
    fn next_sample(&mut self) -> Result<Option<DualSample>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("inverted span: [{start}, {end})")]
    InvertedSpan { start: u64, end: u64 },
    #[error("samples out of order: span [{start}, {end}) begins before {previous_end}")]
    OutOfOrder {
        start: u64,
        end: u64,
        previous_end: u64,
    },
}
