//! Fractal value noise read from the shared seeded table.

use crate::audio::ModBuffer;
use crate::crossfade::{Crossfaded, FadeCore};
use crate::params::{ModParam, SlotParams};
use crate::phasor::Phasor;
use crate::tables::{Interpolation, NoiseTable, NOISE_PEAK, NOISE_TABLE_SIZE};
use crate::traits::BlockContext;
use crate::transport::TransportSnapshot;
use crate::utils::wrap_unit;

use super::smoother::Smoother;

pub const MAX_OCTAVES: usize = 8;

/// Cells between the starting points of consecutive octaves, so that octaves
/// do not read correlated stretches of the table.
const OCTAVE_OFFSET: f64 = 1031.0;

/// Relative rate change below which a synced generator keeps its phase.
const RATE_TOLERANCE: f32 = 1e-4;

const WIDTH_SMOOTHING: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerlinParams {
    /// Free-running speed in table cells per second.
    pub rate_hz: f32,
    /// Synced speed in quarter notes per cell.
    pub rate_beats: f32,
    pub octaves: usize,
    pub shape: Interpolation,
    pub width: f32,
    pub synced: bool,
}

impl Default for PerlinParams {
    fn default() -> Self {
        Self {
            rate_hz: 1.0,
            rate_beats: 1.0,
            octaves: 4,
            shape: Interpolation::Cubic,
            width: 0.0,
            synced: false,
        }
    }
}

impl PerlinParams {
    pub fn from_slot(slot: &SlotParams) -> Self {
        Self {
            rate_hz: slot.plain(ModParam::PerlinRateHz),
            rate_beats: slot.plain(ModParam::PerlinRateBeats),
            octaves: slot.choice(ModParam::PerlinOctaves).clamp(1, MAX_OCTAVES),
            shape: Interpolation::from_index(slot.choice(ModParam::PerlinShape)),
            width: slot.plain(ModParam::PerlinWidth),
            synced: slot.toggle(ModParam::PerlinSync),
        }
    }

    /// Phase increment per sample, in table passes.
    fn increment(&self, transport: &TransportSnapshot) -> f64 {
        let cells_per_sample = if self.synced {
            transport.beats_per_sample() / self.rate_beats.max(1e-3) as f64
        } else {
            self.rate_hz.max(0.0) as f64 / transport.sample_rate
        };
        cells_per_sample / NOISE_TABLE_SIZE as f64
    }

    /// Table phase the host playhead maps to.
    fn phase_at(&self, transport: &TransportSnapshot) -> f64 {
        let cells = transport.compensated_ppq() / self.rate_beats.max(1e-3) as f64;
        wrap_unit(cells / NOISE_TABLE_SIZE as f64)
    }
}

#[derive(Debug, Clone)]
pub struct PerlinCore {
    table: NoiseTable,
    phasor: Phasor,
    width: Smoother,
}

impl PerlinCore {
    pub fn new(table: NoiseTable) -> Self {
        Self {
            table,
            phasor: Phasor::new(),
            width: Smoother::new(48_000.0, WIDTH_SMOOTHING),
        }
    }

    pub fn set_table(&mut self, table: NoiseTable) {
        self.table = table;
    }

    pub fn phase(&self) -> f64 {
        self.phasor.phase()
    }

    /// Weighted octave sum at `cell` (base-octave cells), normalized so the
    /// result stays within `NOISE_PEAK * sqrt(2)`.
    #[inline]
    fn fractal(&self, cell: f64, octaves: usize, shape: Interpolation) -> f32 {
        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        let mut weight = 1.0;
        let mut stride = 1.0;
        for octave in 0..octaves {
            let position = cell * stride + octave as f64 * OCTAVE_OFFSET;
            sum += weight * self.table.sample(position, shape);
            weight_sum += weight;
            weight *= 0.5;
            stride *= 2.0;
        }
        sum / weight_sum.sqrt()
    }
}

impl FadeCore for PerlinCore {
    type Params = PerlinParams;

    const PEAK: f32 = NOISE_PEAK * std::f32::consts::SQRT_2;

    fn prepare(&mut self, sample_rate: f32) {
        self.width.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.phasor.reset();
        self.width.snap(0.0);
    }

    fn follows_transport(params: &PerlinParams) -> bool {
        params.synced
    }

    fn needs_fade(old: &PerlinParams, new: &PerlinParams) -> bool {
        let rate_moved = (old.rate_beats - new.rate_beats).abs()
            > RATE_TOLERANCE * old.rate_beats.abs().max(1e-3);
        old.synced != new.synced
            || old.octaves != new.octaves
            || old.shape != new.shape
            || (new.synced && rate_moved)
    }

    fn resync(
        &mut self,
        source: &Self,
        params: &PerlinParams,
        transport: &TransportSnapshot,
    ) -> bool {
        self.phasor = source.phasor;
        self.width.snap(source.width.current());
        let relock = params.synced && transport.is_locked();
        if relock {
            self.phasor.set(params.phase_at(transport));
        }
        relock
    }

    fn render(&mut self, params: &PerlinParams, out: &mut ModBuffer, ctx: &BlockContext) {
        let n = ctx.num_samples;
        let increment = params.increment(ctx.transport);
        let octaves = params.octaves.clamp(1, MAX_OCTAVES);
        let half_table = NOISE_TABLE_SIZE as f64 * 0.5;
        let width_target = params.width.clamp(0.0, 1.0);

        let (left, right) = out.channels_mut();
        for i in 0..n {
            let cell = self.phasor.phase() * NOISE_TABLE_SIZE as f64;
            let offset = self.width.next_value(width_target) as f64 * half_table;
            left[i] = self.fractal(cell, octaves, params.shape);
            right[i] = self.fractal(cell + offset, octaves, params.shape);
            self.phasor.advance(increment);
        }
    }
}

pub type Perlin = Crossfaded<PerlinCore>;

pub fn perlin(table: NoiseTable, crossfade_ms: f32) -> Perlin {
    Crossfaded::new(PerlinCore::new(table), PerlinParams::default(), crossfade_ms)
}
