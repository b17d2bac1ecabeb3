use crate::audio::{ModBuffer, CHANNELS};
use crate::crossfade::GainRampMixer;
use crate::nodes::{
    lfo, perlin, AudioRate, AudioRateParams, Dropout, DropoutParams, EnvFolParams,
    EnvelopeFollower, Lfo, LfoParams, Macro, MacroParams, Perlin, PerlinParams, Pitchbend,
    PitchbendParams,
};
use crate::params::SlotParams;
use crate::tables::NoiseTable;
use crate::traits::{BlockContext, ModGenerator};
use crate::utils::buffer_ops::multiply_accumulate;

use super::context::{ModType, ModTypeContext};

/// One generator of each type. Every variant keeps its own state, so a slot
/// switching back to a type resumes it where it stopped.
#[derive(Debug, Clone)]
pub enum Generator {
    Perlin(Perlin),
    AudioRate(AudioRate),
    Dropout(Dropout),
    EnvFol(EnvelopeFollower),
    Macro(Macro),
    Pitchbend(Pitchbend),
    Lfo(Lfo),
}

impl Generator {
    fn new(ty: ModType, table: &NoiseTable, crossfade_ms: f32, seed: u64) -> Option<Self> {
        Some(match ty {
            ModType::Perlin => Generator::Perlin(perlin(table.clone(), crossfade_ms)),
            ModType::AudioRate => Generator::AudioRate(AudioRate::new()),
            ModType::Dropout => Generator::Dropout(Dropout::new(seed)),
            ModType::EnvFol => Generator::EnvFol(EnvelopeFollower::new()),
            ModType::Macro => Generator::Macro(Macro::new()),
            ModType::Pitchbend => Generator::Pitchbend(Pitchbend::new()),
            ModType::Lfo => Generator::Lfo(lfo(crossfade_ms)),
            ModType::Invalid => return None,
        })
    }

    pub fn mod_type(&self) -> ModType {
        match self {
            Generator::Perlin(_) => ModType::Perlin,
            Generator::AudioRate(_) => ModType::AudioRate,
            Generator::Dropout(_) => ModType::Dropout,
            Generator::EnvFol(_) => ModType::EnvFol,
            Generator::Macro(_) => ModType::Macro,
            Generator::Pitchbend(_) => ModType::Pitchbend,
            Generator::Lfo(_) => ModType::Lfo,
        }
    }

    /// Pulls this type's controls out of the slot's parameters.
    fn configure(&mut self, params: &SlotParams) {
        match self {
            Generator::Perlin(g) => g.set_parameters(&PerlinParams::from_slot(params)),
            Generator::AudioRate(g) => g.set_parameters(&AudioRateParams::from_slot(params)),
            Generator::Dropout(g) => g.set_parameters(&DropoutParams::from_slot(params)),
            Generator::EnvFol(g) => g.set_parameters(&EnvFolParams::from_slot(params)),
            Generator::Macro(g) => g.set_parameters(&MacroParams::from_slot(params)),
            Generator::Pitchbend(g) => g.set_parameters(&PitchbendParams::from_slot(params)),
            Generator::Lfo(g) => g.set_parameters(&LfoParams::from_slot(params)),
        }
    }

    fn prepare(&mut self, sample_rate: f32, max_block: usize, latency_samples: u32) {
        match self {
            Generator::Perlin(g) => g.prepare(sample_rate, max_block, latency_samples),
            Generator::AudioRate(g) => g.prepare(sample_rate, max_block, latency_samples),
            Generator::Dropout(g) => g.prepare(sample_rate, max_block, latency_samples),
            Generator::EnvFol(g) => g.prepare(sample_rate, max_block, latency_samples),
            Generator::Macro(g) => g.prepare(sample_rate, max_block, latency_samples),
            Generator::Pitchbend(g) => g.prepare(sample_rate, max_block, latency_samples),
            Generator::Lfo(g) => g.prepare(sample_rate, max_block, latency_samples),
        }
    }

    fn process(&mut self, output: &mut ModBuffer, ctx: &BlockContext) {
        match self {
            Generator::Perlin(g) => g.process(output, ctx),
            Generator::AudioRate(g) => g.process(output, ctx),
            Generator::Dropout(g) => g.process(output, ctx),
            Generator::EnvFol(g) => g.process(output, ctx),
            Generator::Macro(g) => g.process(output, ctx),
            Generator::Pitchbend(g) => g.process(output, ctx),
            Generator::Lfo(g) => g.process(output, ctx),
        }
    }

    /// Keeps MIDI-driven state current while the generator is not rendered.
    fn observe_midi(&mut self, ctx: &BlockContext) {
        match self {
            Generator::AudioRate(g) => g.observe_midi(ctx),
            Generator::Pitchbend(g) => g.observe_midi(ctx),
            _ => {}
        }
    }

    fn reset(&mut self) {
        match self {
            Generator::Perlin(g) => g.reset(),
            Generator::AudioRate(g) => g.reset(),
            Generator::Dropout(g) => g.reset(),
            Generator::EnvFol(g) => g.reset(),
            Generator::Macro(g) => g.reset(),
            Generator::Pitchbend(g) => g.reset(),
            Generator::Lfo(g) => g.reset(),
        }
    }

    fn set_noise_table(&mut self, table: &NoiseTable) {
        if let Generator::Perlin(g) = self {
            g.for_each_core(|core| core.set_table(table.clone()));
        }
    }
}

/// Seed for a slot's random generators, distinct per slot.
fn slot_seed(noise_seed: u64, slot: usize) -> u64 {
    noise_seed ^ (slot as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// One modulator slot: the generator bank, the type selector and the mixer
/// that fades between types.
#[derive(Debug, Clone)]
pub struct Modulator {
    slot: usize,
    generators: Vec<Generator>,
    selected: ModType,
    mixer: GainRampMixer<{ ModType::COUNT }>,
    snap_next: bool,
    track: ModBuffer,
    gains: Vec<f32>,
    output: ModBuffer,
    value: f32,
}

impl Modulator {
    pub fn new(
        slot: usize,
        table: &NoiseTable,
        crossfade_ms: f32,
        type_fade_ms: f32,
        noise_seed: u64,
    ) -> Self {
        let seed = slot_seed(noise_seed, slot);
        let generators = ModType::ALL
            .iter()
            .filter_map(|&ty| Generator::new(ty, table, crossfade_ms, seed))
            .collect();
        let selected = ModType::default();
        Self {
            slot,
            generators,
            selected,
            mixer: GainRampMixer::new(type_fade_ms, selected.index()),
            snap_next: true,
            track: ModBuffer::new(0),
            gains: Vec::new(),
            output: ModBuffer::new(0),
            value: 0.0,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn selected(&self) -> ModType {
        self.selected
    }

    pub fn context(&self) -> ModTypeContext {
        ModTypeContext::new(self.selected, self.slot)
    }

    pub fn generator(&self, ty: ModType) -> Option<&Generator> {
        self.generators.get(ty.index())
    }

    pub fn output(&self) -> &ModBuffer {
        &self.output
    }

    /// Last sample of channel 0 from the most recent block.
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_switching(&self) -> bool {
        !self.mixer.is_settled()
    }

    pub fn prepare(&mut self, sample_rate: f32, max_block: usize, latency_samples: u32) {
        for generator in &mut self.generators {
            generator.prepare(sample_rate, max_block, latency_samples);
        }
        self.mixer.prepare(sample_rate);
        self.track.resize(max_block);
        self.output.resize(max_block);
        self.gains.resize(max_block, 0.0);
    }

    pub fn reset(&mut self) {
        for generator in &mut self.generators {
            generator.reset();
        }
        self.output.clear();
        self.value = 0.0;
        self.snap_next = true;
    }

    pub fn set_noise_table(&mut self, table: &NoiseTable) {
        for generator in &mut self.generators {
            generator.set_noise_table(table);
        }
    }

    /// Renders one block with the controls in `params`.
    pub fn process(&mut self, params: &SlotParams, ctx: &BlockContext) {
        let n = ctx.num_samples.min(self.output.len());
        if n == 0 {
            return;
        }
        let ctx = BlockContext {
            num_samples: n,
            ..*ctx
        };

        let requested = params.mod_type();
        if requested.is_valid() && requested != self.selected {
            self.selected = requested;
            self.mixer.solo(requested.index());
        }
        if self.snap_next {
            self.mixer.snap();
            self.snap_next = false;
        }

        if self.mixer.is_settled() {
            let selected = self.selected.index();
            for (track, generator) in self.generators.iter_mut().enumerate() {
                if track == selected {
                    generator.configure(params);
                    generator.process(&mut self.output, &ctx);
                } else {
                    generator.observe_midi(&ctx);
                }
            }
        } else {
            for ch in 0..CHANNELS {
                self.output.channel_mut(ch)[..n].fill(0.0);
            }
            for (track, generator) in self.generators.iter_mut().enumerate() {
                if !self.mixer.is_active(track) {
                    generator.observe_midi(&ctx);
                    continue;
                }
                generator.configure(params);
                generator.process(&mut self.track, &ctx);
                self.mixer.fill_gains(track, &mut self.gains[..n]);
                for ch in 0..CHANNELS {
                    multiply_accumulate(
                        &self.track.channel(ch)[..n],
                        &self.gains[..n],
                        &mut self.output.channel_mut(ch)[..n],
                    );
                }
            }
            self.mixer.advance(n);
        }

        self.output.sanitize(n);
        self.value = self.output.channel(0)[n - 1];
    }
}
