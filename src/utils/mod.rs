pub mod buffer_ops;
pub mod curves;
pub mod math;

pub use curves::{equal_power, get_curved_value, raised_cosine};
pub use math::{cutoff_to_alpha, midi_to_hz, safe_div, sanitize, time_to_alpha, wrap_unit};
