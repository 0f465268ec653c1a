//! Streaming filter stage
//!
//! A [`FrameProcessor`] owns everything one stage needs: the sample history,
//! the kernel, the output block and the timing sink. Each frame goes through
//! merge, filter and emit, after which the history advances by one frame.

use std::time::Instant;

use crate::bfp::{BfpVector, OverflowPolicy};
use crate::coefficients::FilterCoefficients;
use crate::config::{FilterConfig, FrameExponentMode, check_exponent};
use crate::error::{FirError, Result};
use crate::history::SampleHistory;
use crate::kernel::{FilterKernel, KernelBackend, create_kernel, filter_frame, filter_frame_bfp};
use crate::timing::{NoTiming, TimingReport, TimingSink};
use crate::transport::{FrameSink, FrameSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    AwaitingFrame,
    Merging,
    Filtering,
    Emitting,
    /// The final frame has been processed; no further frames are accepted
    Finished,
}

/// Counters for one stage
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub name: String,
    pub frames: u64,
    pub samples: u64,
    pub saturated: u64,
    pub timing: Option<TimingReport>,
}

pub struct FrameProcessor {
    name: String,
    config: FilterConfig,
    history: SampleHistory,
    kernel: Box<dyn FilterKernel>,
    output: BfpVector,
    state: ProcessorState,
    timing: Box<dyn TimingSink>,
    frames: u64,
    samples: u64,
    saturated: u64,
}

impl FrameProcessor {
    /// Create a stage filtering with `coefficients`
    ///
    /// # Errors
    /// Returns `FirError::Config` if the configuration is invalid, the
    /// number of coefficients differs from `config.tap_count` or the
    /// coefficient exponent is out of range.
    pub fn new(config: &FilterConfig, coefficients: FilterCoefficients) -> Result<Self> {
        config.validate()?;
        if coefficients.len() != config.tap_count {
            return Err(FirError::Config(format!(
                "expected {} coefficients, got {}",
                config.tap_count,
                coefficients.len()
            )));
        }
        check_exponent("coefficient exponent", coefficients.exp())?;

        let history = SampleHistory::new(config.tap_count, config.frame_size, config.input_exp)?;
        let output = BfpVector::zeros(config.frame_size, config.output_exp)?;
        let kernel = create_kernel(config.backend, &coefficients);

        Ok(Self {
            name: "fir".to_string(),
            config: config.clone(),
            history,
            kernel,
            output,
            state: ProcessorState::AwaitingFrame,
            timing: Box::new(NoTiming),
            frames: 0,
            samples: 0,
            saturated: 0,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timing(mut self, timing: Box<dyn TimingSink>) -> Self {
        self.timing = timing;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn backend(&self) -> KernelBackend {
        self.kernel.backend()
    }

    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    fn transition(&mut self, next: ProcessorState) {
        log::trace!("{}: {:?} -> {:?}", self.name, self.state, next);
        self.state = next;
    }

    /// Filter one frame
    ///
    /// A frame of exactly `frame_size` samples yields `frame_size` outputs. A
    /// shorter frame is the final one: it is zero-padded, its output is
    /// truncated to the genuine sample count and the processor finishes. An
    /// empty frame finishes the processor without output.
    ///
    /// # Errors
    /// `FirError::StreamFinished` once finished, `FirError::FrameTooLong` if
    /// the frame exceeds `frame_size`.
    pub fn process_frame(&mut self, frame: &[i32]) -> Result<Vec<i32>> {
        if self.state == ProcessorState::Finished {
            return Err(FirError::StreamFinished);
        }
        let frame_size = self.config.frame_size;
        if frame.len() > frame_size {
            return Err(FirError::FrameTooLong {
                frame_size,
                len: frame.len(),
            });
        }

        self.transition(ProcessorState::Merging);
        let is_final = frame.len() < frame_size;
        let count = if is_final {
            match self
                .history
                .receive_partial_frame(frame, self.config.input_exp)?
            {
                Some(count) => count,
                None => {
                    log::debug!("{}: empty frame, end of stream", self.name);
                    self.transition(ProcessorState::Finished);
                    return Ok(Vec::new());
                }
            }
        } else {
            self.history.receive_frame(frame, self.config.input_exp)?;
            frame_size
        };

        self.transition(ProcessorState::Filtering);
        let start = self.timing.enabled().then(Instant::now);
        let out = self.filter(count);

        self.transition(ProcessorState::Emitting);
        if let Some(start) = start {
            self.timing.record_frame(start.elapsed());
        }
        self.history.advance();
        self.frames += 1;
        self.samples += count as u64;

        if is_final {
            log::debug!("{}: final frame of {} samples", self.name, count);
            self.transition(ProcessorState::Finished);
        } else {
            self.transition(ProcessorState::AwaitingFrame);
        }
        Ok(out)
    }

    fn filter(&mut self, count: usize) -> Vec<i32> {
        let output_exp = self.config.output_exp;
        let (out, saturated) = match self.config.frame_exponent {
            FrameExponentMode::Wire => {
                let mut out = vec![0; count];
                let saturated = filter_frame(
                    self.kernel.as_ref(),
                    &self.history,
                    &mut out,
                    output_exp,
                    self.timing.as_mut(),
                );
                (out, saturated)
            }
            FrameExponentMode::Auto => {
                let frame_exp = filter_frame_bfp(
                    self.kernel.as_ref(),
                    &self.history,
                    &mut self.output,
                    count,
                    output_exp,
                    self.timing.as_mut(),
                );
                log::debug!(
                    "{}: frame {} exponent {} headroom {}",
                    self.name,
                    self.frames,
                    frame_exp,
                    self.output.headroom()
                );
                self.output.rescale(output_exp, OverflowPolicy::Saturate);
                let out = self.output.data()[..count].to_vec();
                let saturated = out
                    .iter()
                    .filter(|&&y| y == i32::MAX || y == i32::MIN)
                    .count();
                (out, saturated)
            }
        };

        if saturated > 0 {
            log::warn!(
                "{}: {} of {} samples saturated in frame {}",
                self.name,
                saturated,
                count,
                self.frames
            );
            self.saturated += saturated as u64;
        }
        out
    }

    /// Mark the end of the stream without a partial frame
    pub fn finish(&mut self) {
        if self.state != ProcessorState::Finished {
            self.transition(ProcessorState::Finished);
        }
    }

    /// Process frames from `source` until end of stream, sending every output
    /// frame to `sink`
    ///
    /// Stops after a partial frame or when the source reports end of stream.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> Result<RunSummary> {
        log::info!(
            "{}: starting ({:?} backend, {} taps, {} samples per frame)",
            self.name,
            self.kernel.backend(),
            self.kernel.tap_count(),
            self.config.frame_size
        );

        while self.state != ProcessorState::Finished {
            let Some(frame) = source.next_frame()? else {
                log::debug!("{}: end of stream", self.name);
                self.finish();
                break;
            };
            let out = self.process_frame(&frame)?;
            if !out.is_empty() {
                sink.send_frame(out)?;
            }
        }

        let summary = self.summary();
        log::info!(
            "{}: finished after {} frames ({} samples, {} saturated)",
            self.name,
            summary.frames,
            summary.samples,
            summary.saturated
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            name: self.name.clone(),
            frames: self.frames,
            samples: self.samples,
            saturated: self.saturated,
            timing: self.timing.report(),
        }
    }
}

/// Filter a whole signal on the calling thread
///
/// The signal is cut into frames; a trailing remainder is processed as the
/// final partial frame, so the output has the same length as the input.
pub fn filter_signal(processor: &mut FrameProcessor, samples: &[i32]) -> Result<Vec<i32>> {
    let mut output = Vec::with_capacity(samples.len());
    for frame in samples.chunks(processor.frame_size()) {
        output.extend(processor.process_frame(frame)?);
    }
    processor.finish();
    Ok(output)
}
