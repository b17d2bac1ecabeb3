use crate::audio::ModBuffer;
use crate::params::{ModParam, SlotParams};
use crate::traits::{BlockContext, ModGenerator};

use super::smoother::Smoother;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroParams {
    pub value: f32,
    /// Seconds.
    pub smooth: f32,
}

impl Default for MacroParams {
    fn default() -> Self {
        Self {
            value: 0.0,
            smooth: 0.02,
        }
    }
}

impl MacroParams {
    pub fn from_slot(slot: &SlotParams) -> Self {
        Self {
            value: slot.plain(ModParam::MacroValue),
            smooth: slot.plain(ModParam::MacroSmooth),
        }
    }
}

/// A knob as a modulation source.
#[derive(Debug, Clone)]
pub struct Macro {
    target: f32,
    smoother: Smoother,
}

impl Macro {
    pub fn new() -> Self {
        Self {
            target: 0.0,
            smoother: Smoother::new(48_000.0, MacroParams::default().smooth),
        }
    }
}

impl Default for Macro {
    fn default() -> Self {
        Self::new()
    }
}

impl ModGenerator for Macro {
    type Params = MacroParams;

    fn prepare(&mut self, sample_rate: f32, _max_block: usize, _latency_samples: u32) {
        self.smoother.set_sample_rate(sample_rate);
    }

    fn set_parameters(&mut self, params: &MacroParams) {
        self.target = params.value.clamp(0.0, 1.0);
        self.smoother.set_time(params.smooth);
    }

    fn process(&mut self, output: &mut ModBuffer, ctx: &BlockContext) {
        let n = ctx.num_samples.min(output.len());
        self.smoother.fill(self.target, &mut output.channel_mut(0)[..n]);
        output.duplicate_left(n);
    }

    fn reset(&mut self) {
        self.smoother.snap(self.target);
    }
}
