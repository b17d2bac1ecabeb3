use crate::utils::safe_div;

/// Maps a plain value onto [0, 1].
///
/// `skew` below 1 spends more of the normalized range on the low end
/// (normalized = linear^skew). Stepped ranges snap to multiples of `step` above `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub skew: f32,
    pub step: Option<f32>,
}

impl ParamRange {
    pub const fn linear(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            skew: 1.0,
            step: None,
        }
    }

    pub const fn skewed(min: f32, max: f32, skew: f32) -> Self {
        Self {
            min,
            max,
            skew,
            step: None,
        }
    }

    pub const fn stepped(min: f32, max: f32, step: f32) -> Self {
        Self {
            min,
            max,
            skew: 1.0,
            step: Some(step),
        }
    }

    pub const fn toggle() -> Self {
        Self::stepped(0.0, 1.0, 1.0)
    }

    /// `count` options, stored as plain values `0..count`.
    pub const fn choice(count: usize) -> Self {
        let max = if count > 1 { (count - 1) as f32 } else { 0.0 };
        Self::stepped(0.0, max, 1.0)
    }

    pub fn is_discrete(&self) -> bool {
        self.step.is_some()
    }

    pub fn plain_to_normalized(&self, plain: f32) -> f32 {
        let plain = self.snap(plain.clamp(self.min, self.max));
        let linear = safe_div(plain - self.min, self.max - self.min).clamp(0.0, 1.0);
        if self.skew == 1.0 {
            linear
        } else {
            linear.powf(self.skew)
        }
    }

    pub fn normalized_to_plain(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);
        let linear = if self.skew == 1.0 {
            normalized
        } else {
            normalized.powf(1.0 / self.skew)
        };
        self.snap(self.min + (self.max - self.min) * linear)
    }

    fn snap(&self, plain: f32) -> f32 {
        match self.step {
            Some(step) if step > 0.0 => {
                let steps = ((plain - self.min) / step).round();
                (self.min + steps * step).clamp(self.min, self.max)
            }
            _ => plain,
        }
    }
}
