pub mod beat_division;
pub mod noise;
pub mod wavetable;

pub use beat_division::{beat_divisions, BeatDivision};
pub use noise::{Interpolation, NoiseTable, DEFAULT_NOISE_SEED, NOISE_PEAK, NOISE_TABLE_SIZE};
pub use wavetable::{WaveBank, WaveBankSet, WAVE_TABLE_SIZE};
