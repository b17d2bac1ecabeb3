use crate::utils::{equal_power, raised_cosine, safe_div};

pub const DEFAULT_CROSSFADE_MS: f32 = 120.0;

/// Gain law of a fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeCurve {
    /// Gains sum to one. For instances that still share their phase, whose
    /// outputs are correlated.
    #[default]
    Complementary,
    /// Squared gains sum to one. For instances that no longer share their
    /// phase.
    EqualPower,
}

impl FadeCurve {
    /// `(outgoing, incoming)` weights at `progress`, exact at both ends.
    #[inline]
    pub fn weights(self, progress: f32) -> (f32, f32) {
        match self {
            FadeCurve::Complementary => {
                let incoming = raised_cosine(progress);
                (1.0 - incoming, incoming)
            }
            FadeCurve::EqualPower => equal_power(progress),
        }
    }
}

/// Ramp between two parallel instances, `live` and `outgoing`.
#[derive(Debug, Clone)]
pub struct Crossfade {
    duration_ms: f32,
    increment: f32,
    progress: f32,
    live: usize,
    curve: FadeCurve,
}

impl Crossfade {
    pub fn new(duration_ms: f32) -> Self {
        let mut fade = Self {
            duration_ms: duration_ms.max(0.0),
            increment: 1.0,
            progress: 1.0,
            live: 0,
            curve: FadeCurve::default(),
        };
        fade.prepare(48_000.0);
        fade
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        let samples = self.duration_ms * 0.001 * sample_rate;
        self.increment = if samples < 1.0 {
            1.0
        } else {
            safe_div(1.0, samples)
        };
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Restarts the ramp with `curve` and hands the live role to the other
    /// instance.
    pub fn init(&mut self, curve: FadeCurve) {
        self.progress = 0.0;
        self.live ^= 1;
        self.curve = curve;
    }

    /// Ends any ramp in flight, leaving the live instance at full gain.
    pub fn finish(&mut self) {
        self.progress = 1.0;
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn outgoing(&self) -> usize {
        self.live ^ 1
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn curve(&self) -> FadeCurve {
        self.curve
    }

    /// `(outgoing, incoming)` weights at the current ramp position.
    pub fn weights(&self) -> (f32, f32) {
        self.curve.weights(self.progress)
    }

    /// Fills per-sample gains for the incoming and outgoing instance and
    /// advances the ramp by `fade_in.len()` samples.
    pub fn synthesize(&mut self, fade_in: &mut [f32], fade_out: &mut [f32]) {
        debug_assert_eq!(fade_in.len(), fade_out.len());
        for (gain_in, gain_out) in fade_in.iter_mut().zip(fade_out.iter_mut()) {
            let (old, new) = self.curve.weights(self.progress);
            *gain_in = new;
            *gain_out = old;
            self.progress = (self.progress + self.increment).min(1.0);
        }
    }
}

impl Default for Crossfade {
    fn default() -> Self {
        Self::new(DEFAULT_CROSSFADE_MS)
    }
}
