mod adsr;
mod audio_rate;
mod dropout;
mod envelope_follower;
mod lfo;
mod macro_mod;
mod perlin;
mod pitchbend;
mod smoother;

pub use adsr::{Adsr, AdsrConfig, EnvelopePhase};
pub use audio_rate::{AudioRate, AudioRateParams};
pub use dropout::{Dropout, DropoutParams};
pub use envelope_follower::{EnvFolParams, EnvelopeFollower};
pub use lfo::{lfo, Lfo, LfoCore, LfoParams};
pub use macro_mod::{Macro, MacroParams};
pub use perlin::{perlin, Perlin, PerlinCore, PerlinParams, MAX_OCTAVES};
pub use pitchbend::{Pitchbend, PitchbendParams};
pub use smoother::Smoother;
