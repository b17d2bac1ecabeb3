use std::sync::atomic::{AtomicU32, Ordering};

/// `f32` cell shared between the UI and the audio thread, stored as raw bits.
#[derive(Debug, Default)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_exact_bits() {
        let cell = AtomicF32::new(0.25);
        assert_eq!(cell.load(), 0.25);
        cell.store(-1.5e-7);
        assert_eq!(cell.load(), -1.5e-7);
    }
}
