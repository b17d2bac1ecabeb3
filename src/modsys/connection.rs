use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::params::{AtomicF32, ParamId, ParamLayout, MOD_SLOTS};

/// Capacity of the connection pool.
pub const MAX_CONNECTIONS: usize = 256;

/// Why a connection request was refused. Nothing is changed when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    InvalidModulator(usize),
    InvalidParameter(usize),
    NotModulatable(usize),
    /// The modulator would drive one of its own controls.
    SelfModulation { modulator: usize, param: usize },
    /// The target's owner already modulates a control of this modulator.
    MutualModulation { modulator: usize, other: usize },
    Duplicate { index: usize },
    PoolExhausted,
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::InvalidModulator(m) => write!(f, "no modulator slot {}", m),
            ConnectionError::InvalidParameter(p) => write!(f, "no parameter with index {}", p),
            ConnectionError::NotModulatable(p) => {
                write!(f, "parameter {} does not accept modulation", p)
            }
            ConnectionError::SelfModulation { modulator, param } => write!(
                f,
                "modulator {} cannot modulate its own control {}",
                modulator, param
            ),
            ConnectionError::MutualModulation { modulator, other } => write!(
                f,
                "modulators {} and {} would modulate each other",
                modulator, other
            ),
            ConnectionError::Duplicate { index } => {
                write!(f, "pair already routed by connection {}", index)
            }
            ConnectionError::PoolExhausted => {
                write!(f, "all {} connections are in use", MAX_CONNECTIONS)
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Snapshot of one pool entry for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionInfo {
    pub index: usize,
    pub modulator: usize,
    pub param: ParamId,
    pub depth: f32,
    pub enabled: bool,
}

/// One routing slot. Fields are written only while `enabled` is false or
/// under the pool's writer lock; the audio thread only reads.
#[derive(Debug, Default)]
pub struct Connec {
    modulator: AtomicUsize,
    param: AtomicUsize,
    depth: AtomicF32,
    enabled: AtomicBool,
}

impl Connec {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    #[inline]
    pub fn modulator(&self) -> usize {
        self.modulator.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn param(&self) -> usize {
        self.param.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.depth.load()
    }

    fn routes(&self, modulator: usize, param: usize) -> bool {
        self.is_enabled() && self.modulator() == modulator && self.param() == param
    }
}

/// Fixed pool of connections. Entries never move, so indices handed out by
/// `enable` stay valid until that entry is disabled.
pub struct Connex {
    slots: Box<[Connec]>,
    // serializes UI-side writers; the audio thread never takes it
    writer: Mutex<()>,
}

impl Connex {
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_CONNECTIONS).map(|_| Connec::default()).collect(),
            writer: Mutex::new(()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Validates and routes `modulator -> param` with the given depth (clamped to [-1, 1]).
    pub fn enable(
        &self,
        layout: &ParamLayout,
        modulator: usize,
        param: usize,
        depth: f32,
    ) -> Result<usize, ConnectionError> {
        let _guard = self.lock();

        if modulator >= MOD_SLOTS {
            return Err(ConnectionError::InvalidModulator(modulator));
        }
        let info = layout
            .info(param)
            .ok_or(ConnectionError::InvalidParameter(param))?;
        if !info.modulatable {
            return Err(ConnectionError::NotModulatable(param));
        }
        if info.attached.is_slot(modulator) {
            return Err(ConnectionError::SelfModulation { modulator, param });
        }
        if let Some(index) = self.find(modulator, param) {
            return Err(ConnectionError::Duplicate { index });
        }
        if info.attached.is_valid() {
            let other = info.attached.index;
            let reverse = self.slots.iter().any(|c| {
                c.is_enabled()
                    && c.modulator() == other
                    && layout
                        .info(c.param())
                        .is_some_and(|target| target.attached.is_slot(modulator))
            });
            if reverse {
                return Err(ConnectionError::MutualModulation { modulator, other });
            }
        }

        let index = self
            .slots
            .iter()
            .position(|c| !c.is_enabled())
            .ok_or(ConnectionError::PoolExhausted)?;
        let slot = &self.slots[index];
        slot.modulator.store(modulator, Ordering::Relaxed);
        slot.param.store(param, Ordering::Relaxed);
        slot.depth.store(sanitize_depth(depth));
        slot.enabled.store(true, Ordering::Release);
        Ok(index)
    }

    /// Returns false when the entry was not enabled.
    pub fn disable(&self, index: usize) -> bool {
        let _guard = self.lock();
        match self.slots.get(index) {
            Some(slot) if slot.is_enabled() => {
                slot.enabled.store(false, Ordering::Release);
                true
            }
            _ => false,
        }
    }

    pub fn disable_pair(&self, modulator: usize, param: usize) -> bool {
        let _guard = self.lock();
        match self.find(modulator, param) {
            Some(index) => {
                self.slots[index].enabled.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }

    pub fn set_depth(&self, index: usize, depth: f32) -> bool {
        let _guard = self.lock();
        match self.slots.get(index) {
            Some(slot) if slot.is_enabled() => {
                slot.depth.store(sanitize_depth(depth));
                true
            }
            _ => false,
        }
    }

    pub fn clear(&self) {
        let _guard = self.lock();
        for slot in self.slots.iter() {
            slot.enabled.store(false, Ordering::Release);
        }
    }

    pub fn find(&self, modulator: usize, param: usize) -> Option<usize> {
        self.slots.iter().position(|c| c.routes(modulator, param))
    }

    pub fn get(&self, index: usize) -> Option<ConnectionInfo> {
        let slot = self.slots.get(index)?;
        let param = ParamId::from_index(slot.param())?;
        Some(ConnectionInfo {
            index,
            modulator: slot.modulator(),
            param,
            depth: slot.depth(),
            enabled: slot.is_enabled(),
        })
    }

    /// Enabled entries in index order.
    pub fn enabled(&self) -> Vec<ConnectionInfo> {
        (0..self.slots.len())
            .filter(|&i| self.slots[i].is_enabled())
            .filter_map(|i| self.get(i))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|c| c.is_enabled()).count()
    }

    /// Audio-thread walk over enabled entries: `f(modulator, param, depth)`.
    #[inline]
    pub fn for_each_enabled(&self, mut f: impl FnMut(usize, usize, f32)) {
        for slot in self.slots.iter() {
            if slot.is_enabled() {
                f(slot.modulator(), slot.param(), slot.depth());
            }
        }
    }
}

impl Default for Connex {
    fn default() -> Self {
        Self::new()
    }
}

fn sanitize_depth(depth: f32) -> f32 {
    if depth.is_finite() {
        depth.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{GlobalParam, ModParam};

    fn idx(id: ParamId) -> usize {
        id.index()
    }

    #[test]
    fn enable_returns_stable_indices() {
        let pool = Connex::new();
        let layout = ParamLayout::global();
        let a = pool.enable(layout, 0, idx(GlobalParam::Depth.into()), 0.5);
        let b = pool.enable(layout, 1, idx(GlobalParam::Depth.into()), -0.5);
        assert_eq!(a, Ok(0));
        assert_eq!(b, Ok(1));
        assert!(pool.disable(0));
        // freed entry is reused, the other stays put
        let c = pool.enable(layout, 2, idx(GlobalParam::Mix.into()), 1.0);
        assert_eq!(c, Ok(0));
        assert_eq!(pool.get(1).map(|c| c.modulator), Some(1));
    }

    #[test]
    fn duplicate_pair_is_rejected() {
        let pool = Connex::new();
        let layout = ParamLayout::global();
        let param = idx(GlobalParam::Gain.into());
        assert_eq!(pool.enable(layout, 0, param, 1.0), Ok(0));
        assert_eq!(
            pool.enable(layout, 0, param, 0.3),
            Err(ConnectionError::Duplicate { index: 0 })
        );
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.get(0).map(|c| c.depth), Some(1.0));
    }

    #[test]
    fn own_controls_are_rejected() {
        let pool = Connex::new();
        let layout = ParamLayout::global();
        for param in ModParam::ALL {
            let result = pool.enable(layout, 3, idx(ParamId::Mod(3, param)), 1.0);
            assert!(result.is_err(), "{:?} accepted self modulation", param);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn mutual_modulation_is_rejected() {
        let pool = Connex::new();
        let layout = ParamLayout::global();
        let one_rate = idx(ParamId::Mod(1, ModParam::PerlinRateHz));
        let zero_morph = idx(ParamId::Mod(0, ModParam::LfoMorph));
        assert!(pool.enable(layout, 0, one_rate, 0.5).is_ok());
        assert_eq!(
            pool.enable(layout, 1, zero_morph, 0.5),
            Err(ConnectionError::MutualModulation {
                modulator: 1,
                other: 0
            })
        );
        // a third slot may still drive both
        assert!(pool.enable(layout, 2, zero_morph, 0.5).is_ok());
    }

    #[test]
    fn invalid_requests_have_no_side_effects() {
        let pool = Connex::new();
        let layout = ParamLayout::global();
        assert_eq!(
            pool.enable(layout, MOD_SLOTS, 0, 1.0),
            Err(ConnectionError::InvalidModulator(MOD_SLOTS))
        );
        assert_eq!(
            pool.enable(layout, 0, ParamId::COUNT, 1.0),
            Err(ConnectionError::InvalidParameter(ParamId::COUNT))
        );
        let selector = idx(ParamId::Mod(1, ModParam::Type));
        assert_eq!(
            pool.enable(layout, 0, selector, 1.0),
            Err(ConnectionError::NotModulatable(selector))
        );
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn depth_is_clamped() {
        let pool = Connex::new();
        let layout = ParamLayout::global();
        let index = pool
            .enable(layout, 0, idx(GlobalParam::Mix.into()), 4.0)
            .expect("valid connection");
        assert_eq!(pool.get(index).map(|c| c.depth), Some(1.0));
        assert!(pool.set_depth(index, -7.0));
        assert_eq!(pool.get(index).map(|c| c.depth), Some(-1.0));
        assert!(pool.disable(index));
        assert!(!pool.set_depth(index, 0.5));
        assert!(!pool.disable(index));
    }

    #[test]
    fn pool_exhaustion_is_reported() {
        let pool = Connex::new();
        let layout = ParamLayout::global();
        // distinct pairs: each slot against the globals and the other slots' controls
        let mut filled = 0;
        'outer: for modulator in 0..MOD_SLOTS {
            for param in 0..ParamId::COUNT {
                if pool.enable(layout, modulator, param, 0.1).is_ok() {
                    filled += 1;
                    if filled == MAX_CONNECTIONS {
                        break 'outer;
                    }
                }
            }
        }
        assert_eq!(filled, MAX_CONNECTIONS);
        assert_eq!(
            pool.enable(layout, 3, idx(GlobalParam::Tone.into()), 0.1),
            Err(ConnectionError::PoolExhausted)
        );
    }
}
