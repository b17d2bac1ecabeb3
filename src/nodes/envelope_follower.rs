use crate::audio::ModBuffer;
use crate::params::{ModParam, SlotParams};
use crate::traits::{BlockContext, ModGenerator};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvFolParams {
    /// Seconds.
    pub attack: f32,
    /// Seconds.
    pub release: f32,
    pub gain: f32,
    /// 0 follows the mono sum on both channels, 1 follows each channel alone.
    pub width: f32,
}

impl Default for EnvFolParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            release: 0.2,
            gain: 1.0,
            width: 0.0,
        }
    }
}

impl EnvFolParams {
    pub fn from_slot(slot: &SlotParams) -> Self {
        Self {
            attack: slot.plain(ModParam::EnvAttack),
            release: slot.plain(ModParam::EnvRelease),
            gain: slot.plain(ModParam::EnvGain),
            width: slot.plain(ModParam::EnvWidth),
        }
    }
}

/// RMS-style follower on the sidechain input.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    params: EnvFolParams,
    sample_rate: f32,
    attack_coeff: f32,
    release_coeff: f32,
    /// Mean-square level per channel.
    level: [f32; 2],
}

impl EnvelopeFollower {
    pub fn new() -> Self {
        let mut follower = Self {
            params: EnvFolParams::default(),
            sample_rate: 48_000.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            level: [0.0; 2],
        };
        follower.update_coefficients();
        follower
    }

    fn coefficient(&self, time: f32) -> f32 {
        let samples = (time * self.sample_rate).max(1.0);
        (-1.0 / samples).exp()
    }

    fn update_coefficients(&mut self) {
        self.attack_coeff = self.coefficient(self.params.attack);
        self.release_coeff = self.coefficient(self.params.release);
    }

    /// Makeup gain: 2 when attack and release match, shrinking toward 1 as the
    /// release grows slower than the attack and holds the level up itself.
    pub fn auto_gain(&self) -> f32 {
        let attack_alpha = (1.0 - self.attack_coeff).max(f32::MIN_POSITIVE);
        let release_alpha = 1.0 - self.release_coeff;
        1.0 + (release_alpha / attack_alpha).sqrt()
    }

    #[inline]
    fn follow(&mut self, channel: usize, x: f32) -> f32 {
        let power = x * x;
        let level = &mut self.level[channel];
        let coeff = if power > *level {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        *level = coeff * *level + (1.0 - coeff) * power;
        level.sqrt()
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new()
    }
}

impl ModGenerator for EnvelopeFollower {
    type Params = EnvFolParams;

    fn prepare(&mut self, sample_rate: f32, _max_block: usize, _latency_samples: u32) {
        self.sample_rate = sample_rate.max(1.0);
        self.update_coefficients();
    }

    fn set_parameters(&mut self, params: &EnvFolParams) {
        if *params != self.params {
            self.params = *params;
            self.update_coefficients();
        }
    }

    fn process(&mut self, output: &mut ModBuffer, ctx: &BlockContext) {
        let n = ctx.num_samples.min(output.len());
        let gain = self.auto_gain() * self.params.gain.max(0.0);
        let width = self.params.width.clamp(0.0, 1.0);

        let (left, right) = output.channels_mut();
        for i in 0..n {
            let l = self.follow(0, ctx.input_sample(0, i));
            let r = self.follow(1, ctx.input_sample(1, i));
            let mid = 0.5 * (l + r);
            left[i] = ((mid + width * (l - mid)) * gain).clamp(0.0, 1.0);
            right[i] = ((mid + width * (r - mid)) * gain).clamp(0.0, 1.0);
        }
    }

    fn reset(&mut self) {
        self.level = [0.0; 2];
    }
}
