use super::{DualSample, SampleSource, SourceError};

/// In-memory source over a pre-supplied capture.
///
/// Span ordering is validated once at construction; iteration never fails
/// afterwards.
#[derive(Debug)]
pub struct ReplaySource {
    samples: std::vec::IntoIter<DualSample>,
}

impl ReplaySource {
    pub fn new(samples: Vec<DualSample>) -> Result<Self, SourceError> {
        let mut previous_end: Option<u64> = None;
        for sample in &samples {
            let span = sample.span;
            if span.end < span.start {
                return Err(SourceError::InvertedSpan {
                    start: span.start,
                    end: span.end,
                });
            }
            if let Some(previous_end) = previous_end {
                if span.start < previous_end {
                    return Err(SourceError::OutOfOrder {
                        start: span.start,
                        end: span.end,
                        previous_end,
                    });
                }
            }
            previous_end = Some(span.end);
        }
        Ok(Self {
            samples: samples.into_iter(),
        })
    }
}

impl SampleSource for ReplaySource {
    fn next_sample(&mut self) -> Result<Option<DualSample>, SourceError> {
        Ok(self.samples.next())
    }
}
