// wavetable.rs

use once_cell::sync::Lazy;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

pub const WAVE_TABLE_SIZE: usize = 2048;
const WAVE_TABLE_MASK: usize = WAVE_TABLE_SIZE - 1;

/// LFO tables are read at sub-audio rates, so a handful of partials is plenty
/// and keeps the steps of saw and square from ringing.
const MAX_PARTIALS: usize = 64;

/// Waveform families the LFO can morph within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WaveBank {
    /// sine, triangle, saw, square
    #[default]
    Classic,
    /// pulse width from 50% down to 10%
    Pulse,
    /// stacks of 1, 2, 4 and 8 harmonics
    Harmonic,
}

impl WaveBank {
    pub const COUNT: usize = 3;
    pub const ALL: [WaveBank; Self::COUNT] = [WaveBank::Classic, WaveBank::Pulse, WaveBank::Harmonic];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::COUNT - 1)]
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Cubic interpolation helper. Assumes the samples slice is cyclic and a power of two long.
pub fn cubic_interp(samples: &[f32], pos: f32) -> f32 {
    let i = pos.floor() as isize;
    let frac = pos - i as f32;
    let idx = |j: isize| -> f32 { samples[((i + j) as usize) & WAVE_TABLE_MASK] };
    let p0 = idx(-1);
    let p1 = idx(0);
    let p2 = idx(1);
    let p3 = idx(2);
    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;
    a * frac * frac * frac + b * frac * frac + c * frac + d
}

/// One band-limited cycle.
pub struct Wavetable {
    samples: Vec<f32>,
}

impl Wavetable {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// Tables of one bank, ordered along the morph axis.
pub struct MorphCollection {
    wavetables: Vec<Wavetable>,
}

impl MorphCollection {
    fn new(wavetables: Vec<Wavetable>) -> Self {
        Self { wavetables }
    }

    pub fn len(&self) -> usize {
        self.wavetables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavetables.is_empty()
    }

    /// Given a morph value (0.0–1.0), select a pair of adjacent wavetables and their mix factor.
    fn select_pair_by_morph(&self, morph: f32) -> (&Wavetable, &Wavetable, f32) {
        let num_tables = self.wavetables.len();
        let clamped = morph.clamp(0.0, 1.0);
        let float_index = clamped * (num_tables as f32 - 1.0);
        let lower_index = float_index.floor() as usize;
        let upper_index = (lower_index + 1).min(num_tables - 1);
        let mix = float_index - lower_index as f32;
        (
            &self.wavetables[lower_index],
            &self.wavetables[upper_index],
            mix,
        )
    }

    /// Cubic within each table, linear between tables.
    pub fn lookup_sample(&self, phase: f32, morph: f32) -> f32 {
        if self.wavetables.is_empty() {
            return 0.0;
        }
        let (wavetable1, wavetable2, mix) = self.select_pair_by_morph(morph);
        let pos = phase * WAVE_TABLE_SIZE as f32;
        let sample1 = cubic_interp(&wavetable1.samples, pos);
        let sample2 = cubic_interp(&wavetable2.samples, pos);
        sample1 + mix * (sample2 - sample1)
    }
}

/// Every bank's morph collection, built once per process.
pub struct WaveBankSet {
    banks: Vec<MorphCollection>,
}

static WAVE_BANKS: Lazy<WaveBankSet> = Lazy::new(WaveBankSet::build);

impl std::fmt::Debug for WaveBankSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveBankSet")
            .field("banks", &self.banks.len())
            .finish()
    }
}

impl WaveBankSet {
    pub fn global() -> &'static WaveBankSet {
        &WAVE_BANKS
    }

    fn build() -> Self {
        let mut planner = FftPlanner::new();
        let mut table = |partial: &dyn Fn(usize) -> Complex<f32>| Wavetable {
            samples: generate_table(&mut planner, partial),
        };

        let classic = MorphCollection::new(vec![
            table(&|k: usize| sine_partial(if k == 1 { 1.0 } else { 0.0 })),
            table(&|k: usize| {
                if k % 2 == 1 {
                    let sign = if (k / 2) % 2 == 0 { 1.0 } else { -1.0 };
                    sine_partial(sign / (k * k) as f32)
                } else {
                    Complex::new(0.0, 0.0)
                }
            }),
            table(&|k: usize| sine_partial(-1.0 / k as f32)),
            table(&|k: usize| {
                if k % 2 == 1 {
                    sine_partial(1.0 / k as f32)
                } else {
                    Complex::new(0.0, 0.0)
                }
            }),
        ]);

        let pulse = MorphCollection::new(
            [0.5_f32, 0.35, 0.2, 0.1]
                .iter()
                .map(|&width| table(&move |k: usize| pulse_partial(k, width)))
                .collect(),
        );

        let harmonic = MorphCollection::new(
            [1_usize, 2, 4, 8]
                .iter()
                .map(|&count| {
                    table(&move |k: usize| {
                        if k <= count {
                            sine_partial(1.0 / k as f32)
                        } else {
                            Complex::new(0.0, 0.0)
                        }
                    })
                })
                .collect(),
        );

        Self {
            banks: vec![classic, pulse, harmonic],
        }
    }

    pub fn bank(&self, bank: WaveBank) -> &MorphCollection {
        &self.banks[bank.index()]
    }

    /// Samples a bank at `phase` (cycles, wrapped) and `morph` (0..1).
    #[inline]
    pub fn lookup(&self, bank: WaveBank, phase: f32, morph: f32) -> f32 {
        let phase = phase - phase.floor();
        self.bank(bank).lookup_sample(phase, morph)
    }
}

/// Spectrum bin for `amplitude * sin(k * theta)`.
fn sine_partial(amplitude: f32) -> Complex<f32> {
    Complex::new(0.0, -0.5 * amplitude)
}

/// Pulse as the difference of two saws offset by the duty cycle.
fn pulse_partial(k: usize, width: f32) -> Complex<f32> {
    let saw = Complex::new(0.0, -0.5 / k as f32);
    let shift = Complex::from_polar(1.0, -std::f32::consts::TAU * k as f32 * width);
    saw * (Complex::new(1.0, 0.0) - shift)
}

/// Generate one time-domain table from the positive-frequency partials 1..=MAX_PARTIALS.
fn generate_table(
    planner: &mut FftPlanner<f32>,
    partial: &dyn Fn(usize) -> Complex<f32>,
) -> Vec<f32> {
    let mut spectrum = vec![Complex::new(0.0, 0.0); WAVE_TABLE_SIZE];
    let max_h = MAX_PARTIALS.min(WAVE_TABLE_SIZE / 2 - 1);
    for k in 1..=max_h {
        let value = partial(k);
        spectrum[k] = value;
        spectrum[WAVE_TABLE_SIZE - k] = value.conj();
    }

    let ifft = planner.plan_fft_inverse(WAVE_TABLE_SIZE);
    ifft.process(&mut spectrum);

    let mut samples: Vec<f32> = spectrum.iter().map(|c| c.re).collect();

    let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
    if peak > 1e-12 {
        for s in &mut samples {
            *s /= peak;
        }
    }
    samples
}
