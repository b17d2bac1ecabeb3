mod guard;
mod mixer;
mod pair;
mod playhead;

pub use guard::{Crossfaded, FadeCore, FadeState};
pub use mixer::GainRampMixer;
pub use pair::{Crossfade, FadeCurve, DEFAULT_CROSSFADE_MS};
pub use playhead::{PlayheadTracker, TransportEvent};
