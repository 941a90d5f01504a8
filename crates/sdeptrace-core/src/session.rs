use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::dispatch::{AnnotationSink, Channel, Dispatcher};
use crate::protocol::ChannelCounters;
use crate::source::{SampleKind, SampleSource, SourceError};
use crate::{ChannelSummary, DEFAULT_GENERATED_AT, DecodeConfig, DecodeReport, REPORT_VERSION, ToolInfo};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Drains a sample source through a fresh dispatcher, forwarding every
/// annotation to the sink, and returns a summary of the run.
pub fn decode_source<S, A>(
    mut source: S,
    sink: &mut A,
    config: &DecodeConfig,
) -> Result<DecodeReport, DecodeError>
where
    S: SampleSource,
    A: AnnotationSink,
{
    let mut dispatcher = Dispatcher::new();
    let mut samples_total = 0u64;
    let mut control_samples = 0u64;
    let mut span_start = None;
    let mut span_end = None;

    while let Some(sample) = source.next_sample()? {
        samples_total += 1;
        if span_start.is_none() {
            span_start = Some(sample.span.start);
        }
        span_end = Some(sample.span.end);
        if sample.kind == SampleKind::Control {
            control_samples += 1;
        }
        dispatcher.on_sample(sample, sink);
    }

    let duration_s = match (span_start, span_end, config.sample_rate) {
        (Some(start), Some(end), Some(rate)) if rate > 0 => {
            Some((end - start) as f64 / rate as f64)
        }
        _ => None,
    };

    Ok(DecodeReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "sdeptrace".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: now_rfc3339(),
        samples_total,
        control_samples,
        span_start,
        span_end,
        duration_s,
        host: summarize(dispatcher.counters(Channel::HostToDevice)),
        device: summarize(dispatcher.counters(Channel::DeviceToHost)),
    })
}

fn summarize(counters: &ChannelCounters) -> ChannelSummary {
    ChannelSummary {
        messages_started: counters.messages_started,
        messages_completed: counters.messages_completed,
        commands: counters.commands,
        responses: counters.responses,
        alerts: counters.alerts,
        errors: counters.errors,
        payload_bytes: counters.payload_bytes,
        sync_discards: counters.sync_discards,
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string())
}

#[cfg(test)]
mod tests {
    use super::decode_source;
    use crate::source::{DualSample, ReplaySource, SampleKind};
    use crate::{Annotation, DecodeConfig, Span};

    fn data(start: u64, host: u8, device: u8) -> DualSample {
        DualSample {
            span: Span::new(start, start + 1),
            kind: SampleKind::Data,
            host,
            device,
        }
    }

    #[test]
    fn duration_requires_a_sample_rate() {
        let samples = vec![data(0, 0x00, 0x00), data(1, 0x00, 0x00)];
        let source = ReplaySource::new(samples.clone()).expect("valid");
        let mut sink: Vec<Annotation> = Vec::new();
        let report = decode_source(source, &mut sink, &DecodeConfig::default()).expect("decode");
        assert_eq!(report.duration_s, None);
        assert_eq!(report.span_start, Some(0));
        assert_eq!(report.span_end, Some(2));

        let source = ReplaySource::new(samples).expect("valid");
        let config = DecodeConfig {
            sample_rate: Some(1000),
        };
        let report = decode_source(source, &mut sink, &config).expect("decode");
        assert_eq!(report.duration_s, Some(0.002));
    }

    #[test]
    fn empty_capture_produces_an_empty_report() {
        let source = ReplaySource::new(Vec::new()).expect("valid");
        let mut sink: Vec<Annotation> = Vec::new();
        let report = decode_source(source, &mut sink, &DecodeConfig::default()).expect("decode");
        assert_eq!(report.samples_total, 0);
        assert_eq!(report.span_start, None);
        assert_eq!(report.host.messages_started, 0);
        assert!(sink.is_empty());
    }
}
