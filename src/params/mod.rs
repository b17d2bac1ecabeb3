pub mod atomic;
pub mod ids;
pub mod parameter;
pub mod range;

pub use atomic::AtomicF32;
pub use ids::{GlobalParam, ModParam, ParamId, MOD_SLOTS};
pub use parameter::{ParamInfo, ParamLayout, ParamStore, SlotParams};
pub use range::ParamRange;
