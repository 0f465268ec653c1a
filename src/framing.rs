/// Accumulates a sample stream into fixed-size frames
///
/// Samples are added one at a time; a complete frame is handed back as soon
/// as it fills. At end-of-stream, [`FrameBuffer::finish`] returns whatever
/// partial frame remains so the filter can zero-pad it and the caller can
/// truncate the output to the genuine sample count.
pub struct FrameBuffer {
    data: Vec<i32>,
    size: usize,
}

impl FrameBuffer {
    pub fn new(frame_size: usize) -> Self {
        Self {
            data: Vec::with_capacity(frame_size),
            size: frame_size,
        }
    }

    /// Add one sample, returning the completed frame when it fills
    pub fn add_sample(&mut self, sample: i32) -> Option<Vec<i32>> {
        self.data.push(sample);
        if self.data.len() == self.size {
            Some(std::mem::replace(
                &mut self.data,
                Vec::with_capacity(self.size),
            ))
        } else {
            None
        }
    }

    /// Add a run of samples, returning every frame completed along the way
    pub fn extend(&mut self, samples: &[i32]) -> Vec<Vec<i32>> {
        samples
            .iter()
            .filter_map(|&sample| self.add_sample(sample))
            .collect()
    }

    /// Take the remaining partial frame, if any samples are pending
    pub fn finish(&mut self) -> Option<Vec<i32>> {
        if self.data.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.data))
        }
    }

    /// Number of samples waiting for the current frame
    pub fn pending(&self) -> usize {
        self.data.len()
    }

    pub fn frame_size(&self) -> usize {
        self.size
    }

    pub fn reset(&mut self) {
        self.data.clear();
    }
}
