//! Frame transport between filter stages
//!
//! A message is one frame of PCM words. A message shorter than the frame
//! size is the final, partial frame; an empty message or a disconnected
//! channel ends the stream.

use crossbeam_channel::{Receiver, Sender};

use crate::error::{FirError, Result};

/// Upstream end of a stage
pub trait FrameSource: Send {
    /// Block until the next frame arrives
    ///
    /// Returns `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Vec<i32>>>;
}

/// Downstream end of a stage
pub trait FrameSink: Send {
    /// Block until the frame has been handed over
    fn send_frame(&mut self, frame: Vec<i32>) -> Result<()>;
}

impl FrameSource for Receiver<Vec<i32>> {
    fn next_frame(&mut self) -> Result<Option<Vec<i32>>> {
        match self.recv() {
            Ok(frame) if frame.is_empty() => Ok(None),
            Ok(frame) => Ok(Some(frame)),
            Err(_) => Ok(None),
        }
    }
}

impl FrameSink for Sender<Vec<i32>> {
    fn send_frame(&mut self, frame: Vec<i32>) -> Result<()> {
        self.send(frame)
            .map_err(|_| FirError::Transport("downstream stage disconnected".into()))
    }
}

impl FrameSource for std::vec::IntoIter<Vec<i32>> {
    fn next_frame(&mut self) -> Result<Option<Vec<i32>>> {
        Ok(self.next().filter(|frame| !frame.is_empty()))
    }
}

/// Collects frames in memory
impl FrameSink for Vec<Vec<i32>> {
    fn send_frame(&mut self, frame: Vec<i32>) -> Result<()> {
        self.push(frame);
        Ok(())
    }
}
