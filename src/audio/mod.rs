pub mod buffer;

pub use buffer::{ModBuffer, CHANNELS};
