use crate::utils::{raised_cosine, safe_div};

/// Gain ramps for `N` parallel tracks. Each track moves independently toward
/// 1 (enabled) or 0 (disabled) along a raised-cosine curve, so any number of
/// fades can overlap.
#[derive(Debug, Clone)]
pub struct GainRampMixer<const N: usize> {
    progress: [f32; N],
    enabled: [bool; N],
    duration_ms: f32,
    increment: f32,
}

impl<const N: usize> GainRampMixer<N> {
    /// Track `initial` starts fully on, the rest off.
    pub fn new(duration_ms: f32, initial: usize) -> Self {
        let mut mixer = Self {
            progress: [0.0; N],
            enabled: [false; N],
            duration_ms: duration_ms.max(0.0),
            increment: 1.0,
        };
        if initial < N {
            mixer.progress[initial] = 1.0;
            mixer.enabled[initial] = true;
        }
        mixer.prepare(48_000.0);
        mixer
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        let samples = self.duration_ms * 0.001 * sample_rate;
        self.increment = if samples < 1.0 {
            1.0
        } else {
            safe_div(1.0, samples)
        };
    }

    pub fn set_enabled(&mut self, track: usize, enabled: bool) {
        if let Some(flag) = self.enabled.get_mut(track) {
            *flag = enabled;
        }
    }

    /// Enables `track` and starts every other track fading out.
    pub fn solo(&mut self, track: usize) {
        for (i, flag) in self.enabled.iter_mut().enumerate() {
            *flag = i == track;
        }
    }

    pub fn is_enabled(&self, track: usize) -> bool {
        self.enabled.get(track).copied().unwrap_or(false)
    }

    /// A track needs rendering while its gain is non-zero or it is ramping up.
    pub fn is_active(&self, track: usize) -> bool {
        track < N && (self.progress[track] > 0.0 || self.enabled[track])
    }

    /// True when every track sits at its target.
    pub fn is_settled(&self) -> bool {
        self.progress
            .iter()
            .zip(self.enabled.iter())
            .all(|(&p, &on)| if on { p >= 1.0 } else { p <= 0.0 })
    }

    pub fn gain(&self, track: usize) -> f32 {
        self.progress.get(track).map_or(0.0, |&p| raised_cosine(p))
    }

    /// Per-sample gains for `track` over the next `gains.len()` samples.
    /// Does not advance; call `advance` once all tracks are rendered.
    pub fn fill_gains(&self, track: usize, gains: &mut [f32]) {
        if track >= N {
            gains.fill(0.0);
            return;
        }
        let start = self.progress[track];
        let step = if self.enabled[track] {
            self.increment
        } else {
            -self.increment
        };
        for (i, gain) in gains.iter_mut().enumerate() {
            *gain = raised_cosine(start + step * i as f32);
        }
    }

    pub fn advance(&mut self, num_samples: usize) {
        let delta = self.increment * num_samples as f32;
        for (p, &on) in self.progress.iter_mut().zip(self.enabled.iter()) {
            *p = if on {
                (*p + delta).min(1.0)
            } else {
                (*p - delta).max(0.0)
            };
        }
    }

    /// Jumps every track to its target.
    pub fn snap(&mut self) {
        for (p, &on) in self.progress.iter_mut().zip(self.enabled.iter()) {
            *p = if on { 1.0 } else { 0.0 };
        }
    }
}
