pub mod bfp;
pub mod coefficients;
pub mod config;
pub mod constants;
pub mod error;
pub mod framing;
pub mod history;
pub mod kernel;
pub mod pipeline;
pub mod processor;
pub mod timing;
pub mod transport;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use coefficients::FilterCoefficients;
pub use config::{FilterConfig, FrameExponentMode};
pub use error::{FirError, Result};
pub use kernel::{FilterKernel, KernelBackend, create_kernel};
pub use pipeline::{Pipeline, PipelineOutput};
pub use processor::{FrameProcessor, ProcessorState, RunSummary, filter_signal};
