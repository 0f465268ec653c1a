use crate::bfp::{BfpSlice, BfpVector, OverflowPolicy, common_exponent, shift_slice};
use crate::error::{FirError, Result};

/// Sliding sample history for a block floating-point FIR filter
///
/// Holds `tap_count + frame_size` samples newest-first: index 0 is the most
/// recently received sample. After a frame is received, the first
/// `frame_size` entries are new and the rest is the retained tail needed to
/// give the oldest new sample a full `tap_count` window.
///
/// Windows are reverse-chronological, so window `s` lines up index-for-index
/// with forward-ordered filter coefficients.
pub struct SampleHistory {
    samples: BfpVector,
    tap_count: usize,
    frame_size: usize,
}

impl SampleHistory {
    /// Create an all-zero history
    ///
    /// # Arguments
    /// * `tap_count` - Filter length; each window spans this many samples
    /// * `frame_size` - Number of new samples per frame
    /// * `exp` - Initial exponent (only meaningful once samples arrive)
    pub fn new(tap_count: usize, frame_size: usize, exp: i32) -> Result<Self> {
        if tap_count == 0 || frame_size == 0 {
            return Err(FirError::Config(format!(
                "history needs non-zero tap count and frame size (got {} and {})",
                tap_count, frame_size
            )));
        }
        Ok(Self {
            samples: BfpVector::zeros(tap_count + frame_size, exp)?,
            tap_count,
            frame_size,
        })
    }

    /// Merge one full frame of forward-time samples into the history
    ///
    /// The frame is stored reversed at the front of the buffer. Its exponent
    /// and the retained tail's exponent are reconciled to
    /// `max(tail.exp - tail.hr, frame.exp - frame.hr)`, so the tail is only
    /// right-shifted when the new frame needs the extra range.
    ///
    /// # Errors
    /// Returns `FirError::LengthMismatch` unless `frame.len() == frame_size`.
    pub fn receive_frame(&mut self, frame: &[i32], input_exp: i32) -> Result<()> {
        if frame.len() != self.frame_size {
            return Err(FirError::LengthMismatch {
                expected: self.frame_size,
                actual: frame.len(),
            });
        }

        let mut incoming = BfpVector::new(frame.iter().rev().copied().collect(), input_exp)?;

        let tail_data = &self.samples.data()[self.frame_size..];
        let tail = BfpSlice {
            data: tail_data,
            exp: self.samples.exp(),
            hr: crate::bfp::headroom(tail_data)?,
        };
        let exp = common_exponent(tail, incoming.as_slice());
        let tail_shr = exp - self.samples.exp();

        incoming.rescale(exp, OverflowPolicy::Saturate);

        let frame_size = self.frame_size;
        self.samples.update_with_exponent(exp, |data| {
            shift_slice(&mut data[frame_size..], tail_shr, OverflowPolicy::Saturate);
            data[..frame_size].copy_from_slice(incoming.data());
        });

        log::trace!(
            "History merged at exponent {} (tail shift {}, headroom {})",
            exp,
            tail_shr,
            self.samples.headroom()
        );
        Ok(())
    }

    /// Merge a final, possibly short, frame
    ///
    /// The frame is zero-padded to `frame_size` and received as usual.
    ///
    /// # Returns
    /// The number of genuine samples, or `None` when `frame` is empty and
    /// there is nothing to flush (the history is left untouched).
    ///
    /// # Errors
    /// Returns `FirError::FrameTooLong` if `frame` exceeds `frame_size`.
    pub fn receive_partial_frame(&mut self, frame: &[i32], input_exp: i32) -> Result<Option<usize>> {
        if frame.is_empty() {
            return Ok(None);
        }
        if frame.len() > self.frame_size {
            return Err(FirError::FrameTooLong {
                frame_size: self.frame_size,
                len: frame.len(),
            });
        }

        let mut padded = frame.to_vec();
        padded.resize(self.frame_size, 0);
        self.receive_frame(&padded, input_exp)?;
        Ok(Some(frame.len()))
    }

    /// Window used for output sample `s` of the current frame
    ///
    /// Covers `[frame_size - 1 - s, frame_size - 1 - s + tap_count)`, so
    /// `s = 0` ends at the oldest new sample and `s = frame_size - 1` starts
    /// at the newest. The window carries the whole buffer's headroom.
    pub fn window(&self, s: usize) -> BfpSlice<'_> {
        debug_assert!(s < self.frame_size);
        self.samples.window(self.frame_size - 1 - s, self.tap_count)
    }

    /// Shift the history by one frame, discarding the oldest samples
    ///
    /// The newest `tap_count` samples move to the end of the buffer. The front
    /// `frame_size` entries keep stale copies until the next frame overwrites
    /// them.
    pub fn advance(&mut self) {
        let (tap_count, frame_size) = (self.tap_count, self.frame_size);
        self.samples.update(|data| data.copy_within(0..tap_count, frame_size));
    }

    /// Clear to silence at exponent `exp`
    pub fn reset(&mut self, exp: i32) {
        self.samples.fill_with(exp, |_| 0);
    }

    pub fn samples(&self) -> &BfpVector {
        &self.samples
    }

    pub fn exp(&self) -> i32 {
        self.samples.exp()
    }

    pub fn headroom(&self) -> u32 {
        self.samples.headroom()
    }

    pub fn tap_count(&self) -> usize {
        self.tap_count
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
