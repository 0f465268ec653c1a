//! Chain of filter stages on dedicated threads
//!
//! Each stage runs on its own named thread and talks to its neighbours only
//! through bounded channels carrying whole frames. Back-pressure comes from
//! the channel bound: a stage blocks on send until downstream has room.

use std::thread;

use crossbeam_channel::{Sender, bounded};

use crate::error::{FirError, Result};
use crate::framing::FrameBuffer;
use crate::processor::{FrameProcessor, RunSummary};
use crate::transport::FrameSink;

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Output of the last stage, same length as the input
    pub samples: Vec<i32>,
    /// One summary per stage, in pipeline order
    pub summaries: Vec<RunSummary>,
}

pub struct Pipeline {
    stages: Vec<FrameProcessor>,
    depth: usize,
    frame_size: usize,
}

impl Pipeline {
    /// Chain `stages` in order
    ///
    /// # Arguments
    /// * `stages` - Processors, first stage first
    /// * `depth` - Frames each channel can buffer before the sender blocks
    ///
    /// # Errors
    /// Returns `FirError::Config` if there are no stages, `depth` is zero or
    /// the stages disagree on frame size.
    pub fn new(stages: Vec<FrameProcessor>, depth: usize) -> Result<Self> {
        let Some(first) = stages.first() else {
            return Err(FirError::Config("pipeline needs at least one stage".into()));
        };
        if depth == 0 {
            return Err(FirError::Config("channel depth must be at least 1".into()));
        }
        let frame_size = first.frame_size();
        if let Some(stage) = stages.iter().find(|s| s.frame_size() != frame_size) {
            return Err(FirError::Config(format!(
                "stage '{}' uses {} samples per frame, expected {}",
                stage.name(),
                stage.frame_size(),
                frame_size
            )));
        }

        Ok(Self {
            stages,
            depth,
            frame_size,
        })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Push `samples` through every stage and collect the result
    ///
    /// The input is cut into frames on a feeder thread; a trailing remainder
    /// becomes the final partial frame. When several stages fail, the first
    /// error that is not a transport error is returned: a stage that fails
    /// disconnects its neighbours, whose transport errors are only a
    /// consequence. A panicking stage is reported as `FirError::StagePanic`.
    pub fn run(self, samples: &[i32]) -> Result<PipelineOutput> {
        let frame_size = self.frame_size;
        let depth = self.depth;
        log::info!(
            "Running {} samples through {} stages",
            samples.len(),
            self.stages.len()
        );

        let (input_tx, mut upstream) = bounded::<Vec<i32>>(depth);
        let mut handles = Vec::with_capacity(self.stages.len());
        for mut stage in self.stages {
            let (tx, rx) = bounded::<Vec<i32>>(depth);
            let mut source = upstream;
            let mut sink = tx;
            let name = stage.name().to_string();
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || stage.run(&mut source, &mut sink))
                .map_err(|e| FirError::Transport(format!("failed to spawn stage '{name}': {e}")))?;
            handles.push((name, handle));
            upstream = rx;
        }
        let output_rx = upstream;

        thread::scope(|scope| {
            scope.spawn(move || feed(samples, frame_size, input_tx));

            let mut output = Vec::with_capacity(samples.len());
            for frame in output_rx.iter() {
                output.extend(frame);
            }

            let mut summaries = Vec::with_capacity(handles.len());
            let mut errors = Vec::new();
            for (name, handle) in handles {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(FirError::StagePanic(name.clone())));
                match result {
                    Ok(summary) => summaries.push(summary),
                    Err(e) => {
                        log::warn!("Stage '{name}' failed: {e}");
                        errors.push(e);
                    }
                }
            }

            match root_cause(errors) {
                Some(e) => Err(e),
                None => Ok(PipelineOutput {
                    samples: output,
                    summaries,
                }),
            }
        })
    }
}

/// First error that is not a transport error, else the first error
fn root_cause(mut errors: Vec<FirError>) -> Option<FirError> {
    let index = errors
        .iter()
        .position(|e| !matches!(e, FirError::Transport(_)))
        .unwrap_or(0);
    (index < errors.len()).then(|| errors.swap_remove(index))
}

fn feed(samples: &[i32], frame_size: usize, mut tx: Sender<Vec<i32>>) {
    let mut framer = FrameBuffer::new(frame_size);
    for chunk in samples.chunks(frame_size) {
        for full in framer.extend(chunk) {
            if tx.send_frame(full).is_err() {
                log::warn!("First stage stopped accepting frames");
                return;
            }
        }
    }
    if let Some(partial) = framer.finish() {
        if tx.send_frame(partial).is_err() {
            log::warn!("First stage stopped accepting frames before the final frame");
        }
    }
}
