use serde::{Deserialize, Serialize};

/// Generator families a modulator slot can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModType {
    #[default]
    Perlin,
    AudioRate,
    Dropout,
    EnvFol,
    Macro,
    Pitchbend,
    Lfo,
    /// Sentinel for "no modulator".
    Invalid,
}

impl ModType {
    /// Number of real generator types; `Invalid` is not counted.
    pub const COUNT: usize = 7;
    pub const ALL: [ModType; Self::COUNT] = [
        ModType::Perlin,
        ModType::AudioRate,
        ModType::Dropout,
        ModType::EnvFol,
        ModType::Macro,
        ModType::Pitchbend,
        ModType::Lfo,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(ModType::Invalid)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_valid(self) -> bool {
        self != ModType::Invalid
    }

    /// Unipolar generators output [0, 1], the rest [-1, 1].
    pub fn is_bipolar(self) -> bool {
        !matches!(self, ModType::Dropout | ModType::EnvFol | ModType::Macro)
    }

    pub fn name(self) -> &'static str {
        match self {
            ModType::Perlin => "perlin",
            ModType::AudioRate => "audio_rate",
            ModType::Dropout => "dropout",
            ModType::EnvFol => "envfol",
            ModType::Macro => "macro",
            ModType::Pitchbend => "pitchbend",
            ModType::Lfo => "lfo",
            ModType::Invalid => "invalid",
        }
    }
}

/// Lightweight handle naming a modulator by type and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModTypeContext {
    pub ty: ModType,
    pub index: usize,
}

impl ModTypeContext {
    pub const NONE: ModTypeContext = ModTypeContext {
        ty: ModType::Invalid,
        index: usize::MAX,
    };

    pub const fn new(ty: ModType, index: usize) -> Self {
        Self { ty, index }
    }

    pub fn is_valid(&self) -> bool {
        self.ty.is_valid()
    }

    /// True when this context refers to modulator slot `slot`.
    pub fn is_slot(&self, slot: usize) -> bool {
        self.is_valid() && self.index == slot
    }
}

impl Default for ModTypeContext {
    fn default() -> Self {
        Self::NONE
    }
}
