use crate::audio::ModBuffer;
use crate::midi::MidiMessage;
use crate::params::{ModParam, SlotParams};
use crate::traits::{BlockContext, ModGenerator};

use super::smoother::Smoother;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchbendParams {
    /// Seconds.
    pub smooth: f32,
}

impl Default for PitchbendParams {
    fn default() -> Self {
        Self { smooth: 0.01 }
    }
}

impl PitchbendParams {
    pub fn from_slot(slot: &SlotParams) -> Self {
        Self {
            smooth: slot.plain(ModParam::PitchbendSmooth),
        }
    }
}

/// The pitch wheel, in [-1, 1], updated at the sample it moves.
#[derive(Debug, Clone)]
pub struct Pitchbend {
    bend: f32,
    smoother: Smoother,
}

impl Pitchbend {
    pub fn new() -> Self {
        Self {
            bend: 0.0,
            smoother: Smoother::new(48_000.0, PitchbendParams::default().smooth),
        }
    }

    pub fn raw(&self) -> f32 {
        self.bend
    }

    /// Follows the wheel while the slot renders another generator.
    pub fn observe_midi(&mut self, ctx: &BlockContext) {
        for (_, message) in ctx.midi_events() {
            if let MidiMessage::PitchBend(value) = message {
                self.bend = value.clamp(-1.0, 1.0);
            }
        }
    }
}

impl Default for Pitchbend {
    fn default() -> Self {
        Self::new()
    }
}

impl ModGenerator for Pitchbend {
    type Params = PitchbendParams;

    fn prepare(&mut self, sample_rate: f32, _max_block: usize, _latency_samples: u32) {
        self.smoother.set_sample_rate(sample_rate);
    }

    fn set_parameters(&mut self, params: &PitchbendParams) {
        self.smoother.set_time(params.smooth);
    }

    fn process(&mut self, output: &mut ModBuffer, ctx: &BlockContext) {
        let n = ctx.num_samples.min(output.len());
        let mut events = ctx
            .midi_events()
            .filter_map(|(at, message)| match message {
                MidiMessage::PitchBend(value) => Some((at, value)),
                _ => None,
            })
            .peekable();

        let left = output.channel_mut(0);
        for (i, sample) in left[..n].iter_mut().enumerate() {
            while let Some((_, value)) = events.next_if(|&(at, _)| at <= i) {
                self.bend = value.clamp(-1.0, 1.0);
            }
            *sample = self.smoother.next_value(self.bend);
        }
        if let Some((_, value)) = events.last() {
            self.bend = value.clamp(-1.0, 1.0);
        }
        output.duplicate_left(n);
    }

    fn reset(&mut self) {
        self.bend = 0.0;
        self.smoother.snap(0.0);
    }
}
