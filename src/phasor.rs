use crate::utils::wrap_unit;

/// Phase accumulator in [0, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Phasor {
    phase: f64,
}

impl Phasor {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Sets the phase directly. Used by tempo-synced generators to follow the host.
    pub fn set(&mut self, phase: f64) {
        self.phase = wrap_unit(phase);
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Advances by `increment` and returns the new phase plus whether it wrapped.
    /// Negative increments run backwards and report a wrap when crossing 0.
    #[inline]
    pub fn advance(&mut self, increment: f64) -> (f64, bool) {
        let next = self.phase + increment;
        let wrapped = !(0.0..1.0).contains(&next);
        self.phase = if wrapped { wrap_unit(next) } else { next };
        (self.phase, wrapped)
    }
}
