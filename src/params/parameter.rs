use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::atomic::AtomicF32;
use super::ids::{GlobalParam, ModParam, ParamId, MOD_SLOTS};
use super::range::ParamRange;
use crate::modsys::{ModType, ModTypeContext};
use crate::tables::{BeatDivision, Interpolation, WaveBank};

/// Static description of one parameter.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub id: ParamId,
    pub name: String,
    pub range: ParamRange,
    /// Normalized default.
    pub default: f32,
    /// Which modulator this parameter controls, or `ModTypeContext::NONE`.
    pub attached: ModTypeContext,
    pub modulatable: bool,
}

fn global_range(param: GlobalParam) -> (ParamRange, f32) {
    match param {
        GlobalParam::Depth => (ParamRange::linear(0.0, 1.0), 0.5),
        GlobalParam::Mix => (ParamRange::linear(0.0, 1.0), 1.0),
        GlobalParam::Feedback => (ParamRange::linear(0.0, 0.95), 0.0),
        GlobalParam::Width => (ParamRange::linear(0.0, 1.0), 0.5),
        GlobalParam::Tone => (ParamRange::skewed(200.0, 20_000.0, 0.3), 20_000.0),
        GlobalParam::Gain => (ParamRange::linear(-24.0, 24.0), 0.0),
    }
}

/// Range, plain default and whether the control accepts modulation.
fn mod_range(param: ModParam) -> (ParamRange, f32, bool) {
    use ModParam::*;
    match param {
        Type => (ParamRange::choice(ModType::COUNT), 0.0, false),

        PerlinRateHz => (ParamRange::skewed(0.01, 20.0, 0.3), 1.0, true),
        PerlinRateBeats => (ParamRange::skewed(0.125, 32.0, 0.3), 1.0, true),
        PerlinOctaves => (ParamRange::stepped(1.0, 8.0, 1.0), 4.0, false),
        PerlinShape => (
            ParamRange::choice(Interpolation::COUNT),
            Interpolation::Cubic as usize as f32,
            false,
        ),
        PerlinWidth => (ParamRange::linear(0.0, 1.0), 0.0, true),
        PerlinSync => (ParamRange::toggle(), 0.0, false),

        LfoRateHz => (ParamRange::skewed(0.01, 20.0, 0.3), 1.0, true),
        LfoDivision => (
            ParamRange::choice(BeatDivision::count()),
            BeatDivision::quarter_index() as f32,
            false,
        ),
        LfoSync => (ParamRange::toggle(), 0.0, false),
        LfoBank => (ParamRange::choice(WaveBank::COUNT), 0.0, false),
        LfoMorph => (ParamRange::linear(0.0, 1.0), 0.0, true),
        LfoPhase => (ParamRange::linear(0.0, 1.0), 0.0, true),
        LfoWidth => (ParamRange::linear(0.0, 1.0), 0.0, true),

        AudioOctave => (ParamRange::stepped(-4.0, 4.0, 1.0), 0.0, false),
        AudioSemitone => (ParamRange::stepped(-12.0, 12.0, 1.0), 0.0, false),
        AudioFine => (ParamRange::linear(-100.0, 100.0), 0.0, true),
        AudioAttack => (ParamRange::skewed(0.001, 5.0, 0.3), 0.01, true),
        AudioDecay => (ParamRange::skewed(0.001, 5.0, 0.3), 0.2, true),
        AudioSustain => (ParamRange::linear(0.0, 1.0), 0.7, true),
        AudioRelease => (ParamRange::skewed(0.001, 10.0, 0.3), 0.3, true),
        AudioGlide => (ParamRange::skewed(0.0, 2.0, 0.3), 0.0, true),
        AudioWidth => (ParamRange::linear(0.0, 1.0), 0.0, true),
        AudioBendRange => (ParamRange::stepped(0.0, 24.0, 1.0), 2.0, false),

        DropoutDecay => (ParamRange::skewed(0.05, 1.0, 0.5), 0.3, true),
        DropoutSpin => (ParamRange::skewed(0.1, 20.0, 0.4), 2.0, true),
        DropoutChance => (ParamRange::skewed(0.05, 10.0, 0.4), 0.5, true),
        DropoutSmooth => (ParamRange::skewed(0.5, 200.0, 0.3), 20.0, true),

        EnvAttack => (ParamRange::skewed(0.0005, 1.0, 0.3), 0.01, true),
        EnvRelease => (ParamRange::skewed(0.005, 5.0, 0.3), 0.2, true),
        EnvGain => (ParamRange::skewed(0.0, 8.0, 0.5), 1.0, true),
        EnvWidth => (ParamRange::linear(0.0, 1.0), 0.0, true),

        MacroValue => (ParamRange::linear(0.0, 1.0), 0.0, true),
        MacroSmooth => (ParamRange::skewed(0.0, 1.0, 0.3), 0.02, true),

        PitchbendSmooth => (ParamRange::skewed(0.0, 1.0, 0.3), 0.01, true),
    }
}

/// Every parameter in flat-index order plus a name lookup.
pub struct ParamLayout {
    infos: Vec<ParamInfo>,
    by_name: FxHashMap<String, usize>,
}

static PARAM_LAYOUT: Lazy<ParamLayout> = Lazy::new(ParamLayout::build);

impl ParamLayout {
    pub fn global() -> &'static ParamLayout {
        &PARAM_LAYOUT
    }

    fn build() -> Self {
        let mut infos = Vec::with_capacity(ParamId::COUNT);

        for param in GlobalParam::ALL {
            let (range, plain_default) = global_range(param);
            let id = ParamId::Global(param);
            infos.push(ParamInfo {
                id,
                name: id.name(),
                range,
                default: range.plain_to_normalized(plain_default),
                attached: ModTypeContext::NONE,
                modulatable: true,
            });
        }

        for slot in 0..MOD_SLOTS {
            for param in ModParam::ALL {
                let (range, plain_default, modulatable) = mod_range(param);
                let id = ParamId::Mod(slot, param);
                let attached = match param.owner() {
                    ModType::Invalid => ModTypeContext::NONE,
                    owner => ModTypeContext::new(owner, slot),
                };
                infos.push(ParamInfo {
                    id,
                    name: id.name(),
                    range,
                    default: range.plain_to_normalized(plain_default),
                    attached,
                    modulatable,
                });
            }
        }

        let by_name = infos
            .iter()
            .enumerate()
            .map(|(i, info)| (info.name.clone(), i))
            .collect();

        Self { infos, by_name }
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn info(&self, index: usize) -> Option<&ParamInfo> {
        self.infos.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamInfo> {
        self.infos.iter()
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

/// Values shared with the UI thread: bases written by automation/UI and the
/// finalized values the audio thread publishes after each block.
pub struct ParamStore {
    bases: Box<[AtomicF32]>,
    finalized: Box<[AtomicF32]>,
}

impl ParamStore {
    pub fn new(layout: &ParamLayout) -> Self {
        let defaults = || layout.iter().map(|info| AtomicF32::new(info.default)).collect();
        Self {
            bases: defaults(),
            finalized: defaults(),
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    #[inline]
    pub fn base(&self, index: usize) -> f32 {
        self.bases.get(index).map_or(0.0, AtomicF32::load)
    }

    /// Stores a normalized base value, clamped to [0, 1]. Non-finite input is ignored.
    pub fn set_base(&self, index: usize, normalized: f32) -> bool {
        match self.bases.get(index) {
            Some(cell) if normalized.is_finite() => {
                cell.store(normalized.clamp(0.0, 1.0));
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn finalized(&self, index: usize) -> f32 {
        self.finalized.get(index).map_or(0.0, AtomicF32::load)
    }

    #[inline]
    pub(crate) fn publish(&self, index: usize, value: f32) {
        if let Some(cell) = self.finalized.get(index) {
            cell.store(value);
        }
    }
}

/// Read-only view of one slot's controls, in plain units, taken from the
/// previous block's finalized values.
#[derive(Clone, Copy)]
pub struct SlotParams<'a> {
    slot: usize,
    layout: &'a ParamLayout,
    values: &'a [f32],
}

impl<'a> SlotParams<'a> {
    pub fn new(slot: usize, layout: &'a ParamLayout, values: &'a [f32]) -> Self {
        Self {
            slot,
            layout,
            values,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn normalized(&self, param: ModParam) -> f32 {
        let index = ParamId::Mod(self.slot, param).index();
        self.values.get(index).copied().unwrap_or(0.0)
    }

    pub fn plain(&self, param: ModParam) -> f32 {
        let index = ParamId::Mod(self.slot, param).index();
        let normalized = self.values.get(index).copied().unwrap_or(0.0);
        self.layout
            .info(index)
            .map_or(normalized, |info| info.range.normalized_to_plain(normalized))
    }

    pub fn choice(&self, param: ModParam) -> usize {
        self.plain(param).round().max(0.0) as usize
    }

    pub fn toggle(&self, param: ModParam) -> bool {
        self.plain(param) >= 0.5
    }

    pub fn mod_type(&self) -> ModType {
        ModType::from_index(self.choice(ModParam::Type))
    }
}
