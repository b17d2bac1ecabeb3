pub mod audio;
pub mod audio_engine;
pub mod crossfade;
pub mod midi;
pub mod modsys;
pub mod nodes;
pub mod params;
pub mod phasor;
pub mod tables;
pub mod traits;
pub mod transport;
pub mod utils;

pub use audio::ModBuffer;
pub use audio_engine::{EngineConfig, ModulationEngine};
pub use midi::{MidiEvent, MidiMessage};
pub use modsys::{
    BlockStatus, ConnectionError, ConnectionInfo, ModSys, ModSysHandle, ModType, ModTypeContext,
    Patch, PatchConnection,
};
pub use params::{GlobalParam, ModParam, ParamId, MOD_SLOTS};
pub use phasor::Phasor;
pub use traits::{BlockContext, ModGenerator};
pub use transport::{HostTransport, TransportSnapshot};
