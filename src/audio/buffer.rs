use crate::utils::sanitize;

pub const CHANNELS: usize = 2;

/// Stereo scratch/output buffer, sized once at prepare time.
#[derive(Clone, Debug)]
pub struct ModBuffer {
    data: [Vec<f32>; CHANNELS],
    size: usize,
}

impl ModBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            data: [vec![0.0; size], vec![0.0; size]],
            size,
        }
    }

    /// Reallocates. Only call outside the audio callback.
    pub fn resize(&mut self, size: usize) {
        for channel in &mut self.data {
            channel.clear();
            channel.resize(size, 0.0);
        }
        self.size = size;
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn clear(&mut self) {
        for channel in &mut self.data {
            channel.fill(0.0);
        }
    }

    pub fn fill(&mut self, value: f32) {
        for channel in &mut self.data {
            channel.fill(value);
        }
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.data[index.min(CHANNELS - 1)]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.data[index.min(CHANNELS - 1)]
    }

    /// Both channels at once, for generators that write left and right together.
    pub fn channels_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        let [left, right] = &mut self.data;
        (left.as_mut_slice(), right.as_mut_slice())
    }

    /// Replaces non-finite samples in the first `num_samples` frames with zero.
    pub fn sanitize(&mut self, num_samples: usize) {
        let n = num_samples.min(self.size);
        for channel in &mut self.data {
            for sample in &mut channel[..n] {
                *sample = sanitize(*sample);
            }
        }
    }

    /// Copies channel 0 into channel 1.
    pub fn duplicate_left(&mut self, num_samples: usize) {
        let n = num_samples.min(self.size);
        let (left, right) = self.channels_mut();
        right[..n].copy_from_slice(&left[..n]);
    }
}
