use std::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::audio::ModBuffer;
use crate::params::{ModParam, SlotParams};
use crate::phasor::Phasor;
use crate::traits::{BlockContext, ModGenerator};
use crate::utils::cutoff_to_alpha;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropoutParams {
    /// Damping ratio of the spring.
    pub decay: f32,
    /// Natural frequency of the spring in Hz.
    pub spin: f32,
    /// Average kicks per second.
    pub chance: f32,
    /// Output smoothing cutoff in Hz.
    pub smooth: f32,
}

impl Default for DropoutParams {
    fn default() -> Self {
        Self {
            decay: 0.3,
            spin: 2.0,
            chance: 0.5,
            smooth: 20.0,
        }
    }
}

impl DropoutParams {
    pub fn from_slot(slot: &SlotParams) -> Self {
        Self {
            decay: slot.plain(ModParam::DropoutDecay),
            spin: slot.plain(ModParam::DropoutSpin),
            chance: slot.plain(ModParam::DropoutChance),
            smooth: slot.plain(ModParam::DropoutSmooth),
        }
    }
}

/// Randomly kicked damped spring, rectified and smoothed. Models the level
/// dips of worn tape.
#[derive(Debug, Clone)]
pub struct Dropout {
    params: DropoutParams,
    seed: u64,
    rng: SmallRng,
    sample_rate: f32,
    clock: Phasor,
    /// Randomized length of the current kick interval relative to `1/chance`.
    period_scale: f32,
    position: f32,
    velocity: f32,
    smoothed: f32,
}

impl Dropout {
    pub fn new(seed: u64) -> Self {
        Self {
            params: DropoutParams::default(),
            seed,
            rng: SmallRng::seed_from_u64(seed),
            sample_rate: 48_000.0,
            clock: Phasor::new(),
            period_scale: 1.0,
            position: 0.0,
            velocity: 0.0,
            smoothed: 0.0,
        }
    }

    fn kick(&mut self, omega: f32) {
        self.period_scale = self.rng.random_range(0.5..1.5);
        let strength: f32 = self.rng.random_range(-1.0..=1.0);
        self.velocity += strength * omega;
    }
}

impl ModGenerator for Dropout {
    type Params = DropoutParams;

    fn prepare(&mut self, sample_rate: f32, _max_block: usize, _latency_samples: u32) {
        self.sample_rate = sample_rate.max(1.0);
    }

    fn set_parameters(&mut self, params: &DropoutParams) {
        self.params = *params;
    }

    fn process(&mut self, output: &mut ModBuffer, ctx: &BlockContext) {
        let n = ctx.num_samples.min(output.len());
        let dt = 1.0 / self.sample_rate;
        // keep the explicit integrator stable
        let omega = TAU * self.params.spin.clamp(0.0, 0.05 * self.sample_rate);
        let zeta = self.params.decay.max(0.0);
        let chance = self.params.chance.max(0.0) as f64;
        let alpha = cutoff_to_alpha(self.sample_rate, self.params.smooth);

        let left = output.channel_mut(0);
        for sample in left[..n].iter_mut() {
            let increment = chance / (self.sample_rate * self.period_scale) as f64;
            if self.clock.advance(increment).1 {
                self.kick(omega);
            }

            let accel = -omega * omega * self.position - 2.0 * zeta * omega * self.velocity;
            self.velocity += accel * dt;
            self.position += self.velocity * dt;

            let target = self.position.abs().min(1.0);
            self.smoothed += alpha * (target - self.smoothed);
            *sample = self.smoothed.clamp(0.0, 1.0);
        }
        output.duplicate_left(n);
    }

    fn reset(&mut self) {
        self.rng = SmallRng::seed_from_u64(self.seed);
        self.clock.reset();
        self.period_scale = 1.0;
        self.position = 0.0;
        self.velocity = 0.0;
        self.smoothed = 0.0;
    }
}
