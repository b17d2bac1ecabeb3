use crate::audio::ModBuffer;
use crate::crossfade::{Crossfaded, FadeCore};
use crate::params::{ModParam, SlotParams};
use crate::phasor::Phasor;
use crate::tables::{BeatDivision, WaveBank, WaveBankSet};
use crate::traits::BlockContext;
use crate::transport::TransportSnapshot;
use crate::utils::wrap_unit;

use super::smoother::Smoother;

const OFFSET_SMOOTHING: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoParams {
    pub rate_hz: f32,
    /// Index into the beat-division table.
    pub division: usize,
    pub synced: bool,
    pub bank: WaveBank,
    pub morph: f32,
    /// Start phase in cycles.
    pub phase_offset: f32,
    /// Channel 1 runs ahead by up to half a cycle.
    pub width: f32,
}

impl Default for LfoParams {
    fn default() -> Self {
        Self {
            rate_hz: 1.0,
            division: BeatDivision::quarter_index(),
            synced: false,
            bank: WaveBank::Classic,
            morph: 0.0,
            phase_offset: 0.0,
            width: 0.0,
        }
    }
}

impl LfoParams {
    pub fn from_slot(slot: &SlotParams) -> Self {
        Self {
            rate_hz: slot.plain(ModParam::LfoRateHz),
            division: slot.choice(ModParam::LfoDivision),
            synced: slot.toggle(ModParam::LfoSync),
            bank: WaveBank::from_index(slot.choice(ModParam::LfoBank)),
            morph: slot.plain(ModParam::LfoMorph),
            phase_offset: slot.plain(ModParam::LfoPhase),
            width: slot.plain(ModParam::LfoWidth),
        }
    }

    fn cycle_beats(&self) -> f64 {
        BeatDivision::beats_at(self.division)
    }

    fn increment(&self, transport: &TransportSnapshot) -> f64 {
        if self.synced {
            transport.beats_per_sample() / self.cycle_beats()
        } else {
            self.rate_hz.max(0.0) as f64 / transport.sample_rate
        }
    }
}

/// Wavetable LFO. Reads bank x phase x morph from the shared tables.
#[derive(Debug, Clone)]
pub struct LfoCore {
    tables: &'static WaveBankSet,
    phasor: Phasor,
    phase_offset: Smoother,
    width: Smoother,
    morph: Smoother,
}

impl LfoCore {
    pub fn new() -> Self {
        Self {
            tables: WaveBankSet::global(),
            phasor: Phasor::new(),
            phase_offset: Smoother::new(48_000.0, OFFSET_SMOOTHING),
            width: Smoother::new(48_000.0, OFFSET_SMOOTHING),
            morph: Smoother::new(48_000.0, OFFSET_SMOOTHING),
        }
    }

    pub fn phase(&self) -> f64 {
        self.phasor.phase()
    }
}

impl Default for LfoCore {
    fn default() -> Self {
        Self::new()
    }
}

impl FadeCore for LfoCore {
    type Params = LfoParams;

    const PEAK: f32 = 1.0;

    fn prepare(&mut self, sample_rate: f32) {
        self.phase_offset.set_sample_rate(sample_rate);
        self.width.set_sample_rate(sample_rate);
        self.morph.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.phasor.reset();
        self.phase_offset.snap(0.0);
        self.width.snap(0.0);
        self.morph.snap(0.0);
    }

    fn follows_transport(params: &LfoParams) -> bool {
        params.synced
    }

    fn needs_fade(old: &LfoParams, new: &LfoParams) -> bool {
        old.synced != new.synced
            || old.bank != new.bank
            || (new.synced && old.division != new.division)
    }

    fn resync(
        &mut self,
        source: &Self,
        params: &LfoParams,
        transport: &TransportSnapshot,
    ) -> bool {
        self.phasor = source.phasor;
        self.phase_offset.snap(source.phase_offset.current());
        self.width.snap(source.width.current());
        self.morph.snap(source.morph.current());
        let relock = params.synced && transport.is_locked();
        if relock {
            self.phasor
                .set(wrap_unit(transport.compensated_ppq() / params.cycle_beats()));
        }
        relock
    }

    fn render(&mut self, params: &LfoParams, out: &mut ModBuffer, ctx: &BlockContext) {
        let increment = params.increment(ctx.transport);
        let morph_target = params.morph.clamp(0.0, 1.0);
        let offset_target = params.phase_offset.clamp(0.0, 1.0);
        let width_target = params.width.clamp(0.0, 1.0);

        let (left, right) = out.channels_mut();
        for i in 0..ctx.num_samples {
            let offset = self.phase_offset.next_value(offset_target);
            let spread = 0.5 * self.width.next_value(width_target);
            let morph = self.morph.next_value(morph_target);
            let phase = self.phasor.phase() as f32 + offset;
            left[i] = self
                .tables
                .lookup(params.bank, phase, morph)
                .clamp(-1.0, 1.0);
            right[i] = self
                .tables
                .lookup(params.bank, phase + spread, morph)
                .clamp(-1.0, 1.0);
            self.phasor.advance(increment);
        }
    }
}

pub type Lfo = Crossfaded<LfoCore>;

pub fn lfo(crossfade_ms: f32) -> Lfo {
    Crossfaded::new(LfoCore::new(), LfoParams::default(), crossfade_ms)
}
