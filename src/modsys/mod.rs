mod connection;
mod context;
mod modsys;
mod modulator;
mod patch;
#[cfg(test)]
mod tests;

pub use connection::{ConnectionError, ConnectionInfo, Connex, MAX_CONNECTIONS};
pub use context::{ModType, ModTypeContext};
pub use modsys::{BlockStatus, ModSys, ModSysHandle};
pub use modulator::{Generator, Modulator};
pub use patch::{Patch, PatchConnection};
