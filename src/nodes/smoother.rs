use crate::utils::time_to_alpha;

/// One-pole lag toward a target, with the time constant set in seconds.
#[derive(Debug, Clone)]
pub struct Smoother {
    sample_rate: f32,
    time: f32,
    alpha: f32,
    current: f32,
}

impl Smoother {
    pub fn new(sample_rate: f32, time: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        let time = time.max(0.0);
        Self {
            sample_rate,
            time,
            alpha: time_to_alpha(sample_rate, time),
            current: 0.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.alpha = time_to_alpha(self.sample_rate, self.time);
    }

    pub fn set_time(&mut self, time: f32) {
        let time = time.max(0.0);
        if time != self.time {
            self.time = time;
            self.alpha = time_to_alpha(self.sample_rate, time);
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Jumps straight to `value`.
    pub fn snap(&mut self, value: f32) {
        self.current = value;
    }

    #[inline]
    pub fn next_value(&mut self, target: f32) -> f32 {
        self.current += self.alpha * (target - self.current);
        self.current
    }

    /// Fills `out` with the glide toward a constant target.
    pub fn fill(&mut self, target: f32, out: &mut [f32]) {
        for sample in out {
            *sample = self.next_value(target);
        }
    }
}
