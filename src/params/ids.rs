use crate::modsys::ModType;

/// Number of modulator slots.
pub const MOD_SLOTS: usize = 8;

/// Parameters of the effect that consumes the modulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalParam {
    Depth,
    Mix,
    Feedback,
    Width,
    Tone,
    Gain,
}

impl GlobalParam {
    pub const COUNT: usize = 6;
    pub const ALL: [GlobalParam; Self::COUNT] = [
        GlobalParam::Depth,
        GlobalParam::Mix,
        GlobalParam::Feedback,
        GlobalParam::Width,
        GlobalParam::Tone,
        GlobalParam::Gain,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            GlobalParam::Depth => "depth",
            GlobalParam::Mix => "mix",
            GlobalParam::Feedback => "feedback",
            GlobalParam::Width => "width",
            GlobalParam::Tone => "tone",
            GlobalParam::Gain => "gain",
        }
    }
}

/// Per-slot modulator controls. Every slot carries the controls of all
/// generator types so that switching type keeps each type's settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModParam {
    Type,
    PerlinRateHz,
    PerlinRateBeats,
    PerlinOctaves,
    PerlinShape,
    PerlinWidth,
    PerlinSync,
    LfoRateHz,
    LfoDivision,
    LfoSync,
    LfoBank,
    LfoMorph,
    LfoPhase,
    LfoWidth,
    AudioOctave,
    AudioSemitone,
    AudioFine,
    AudioAttack,
    AudioDecay,
    AudioSustain,
    AudioRelease,
    AudioGlide,
    AudioWidth,
    AudioBendRange,
    DropoutDecay,
    DropoutSpin,
    DropoutChance,
    DropoutSmooth,
    EnvAttack,
    EnvRelease,
    EnvGain,
    EnvWidth,
    MacroValue,
    MacroSmooth,
    PitchbendSmooth,
}

impl ModParam {
    pub const COUNT: usize = 35;
    pub const ALL: [ModParam; Self::COUNT] = [
        ModParam::Type,
        ModParam::PerlinRateHz,
        ModParam::PerlinRateBeats,
        ModParam::PerlinOctaves,
        ModParam::PerlinShape,
        ModParam::PerlinWidth,
        ModParam::PerlinSync,
        ModParam::LfoRateHz,
        ModParam::LfoDivision,
        ModParam::LfoSync,
        ModParam::LfoBank,
        ModParam::LfoMorph,
        ModParam::LfoPhase,
        ModParam::LfoWidth,
        ModParam::AudioOctave,
        ModParam::AudioSemitone,
        ModParam::AudioFine,
        ModParam::AudioAttack,
        ModParam::AudioDecay,
        ModParam::AudioSustain,
        ModParam::AudioRelease,
        ModParam::AudioGlide,
        ModParam::AudioWidth,
        ModParam::AudioBendRange,
        ModParam::DropoutDecay,
        ModParam::DropoutSpin,
        ModParam::DropoutChance,
        ModParam::DropoutSmooth,
        ModParam::EnvAttack,
        ModParam::EnvRelease,
        ModParam::EnvGain,
        ModParam::EnvWidth,
        ModParam::MacroValue,
        ModParam::MacroSmooth,
        ModParam::PitchbendSmooth,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ModParam::Type => "type",
            ModParam::PerlinRateHz => "perlin.rate_hz",
            ModParam::PerlinRateBeats => "perlin.rate_beats",
            ModParam::PerlinOctaves => "perlin.octaves",
            ModParam::PerlinShape => "perlin.shape",
            ModParam::PerlinWidth => "perlin.width",
            ModParam::PerlinSync => "perlin.sync",
            ModParam::LfoRateHz => "lfo.rate_hz",
            ModParam::LfoDivision => "lfo.division",
            ModParam::LfoSync => "lfo.sync",
            ModParam::LfoBank => "lfo.bank",
            ModParam::LfoMorph => "lfo.morph",
            ModParam::LfoPhase => "lfo.phase",
            ModParam::LfoWidth => "lfo.width",
            ModParam::AudioOctave => "audio.octave",
            ModParam::AudioSemitone => "audio.semitone",
            ModParam::AudioFine => "audio.fine",
            ModParam::AudioAttack => "audio.attack",
            ModParam::AudioDecay => "audio.decay",
            ModParam::AudioSustain => "audio.sustain",
            ModParam::AudioRelease => "audio.release",
            ModParam::AudioGlide => "audio.glide",
            ModParam::AudioWidth => "audio.width",
            ModParam::AudioBendRange => "audio.bend_range",
            ModParam::DropoutDecay => "dropout.decay",
            ModParam::DropoutSpin => "dropout.spin",
            ModParam::DropoutChance => "dropout.chance",
            ModParam::DropoutSmooth => "dropout.smooth",
            ModParam::EnvAttack => "envfol.attack",
            ModParam::EnvRelease => "envfol.release",
            ModParam::EnvGain => "envfol.gain",
            ModParam::EnvWidth => "envfol.width",
            ModParam::MacroValue => "macro.value",
            ModParam::MacroSmooth => "macro.smooth",
            ModParam::PitchbendSmooth => "pitchbend.smooth",
        }
    }

    /// Generator type this control belongs to; `Invalid` for the slot-wide type selector.
    pub fn owner(self) -> ModType {
        use ModParam::*;
        match self {
            Type => ModType::Invalid,
            PerlinRateHz | PerlinRateBeats | PerlinOctaves | PerlinShape | PerlinWidth
            | PerlinSync => ModType::Perlin,
            LfoRateHz | LfoDivision | LfoSync | LfoBank | LfoMorph | LfoPhase | LfoWidth => {
                ModType::Lfo
            }
            AudioOctave | AudioSemitone | AudioFine | AudioAttack | AudioDecay | AudioSustain
            | AudioRelease | AudioGlide | AudioWidth | AudioBendRange => ModType::AudioRate,
            DropoutDecay | DropoutSpin | DropoutChance | DropoutSmooth => ModType::Dropout,
            EnvAttack | EnvRelease | EnvGain | EnvWidth => ModType::EnvFol,
            MacroValue | MacroSmooth => ModType::Macro,
            PitchbendSmooth => ModType::Pitchbend,
        }
    }
}

/// Identity of any parameter in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Global(GlobalParam),
    Mod(usize, ModParam),
}

impl ParamId {
    pub const COUNT: usize = GlobalParam::COUNT + MOD_SLOTS * ModParam::COUNT;

    /// Flat index: globals first, then each slot's controls.
    pub fn index(self) -> usize {
        match self {
            ParamId::Global(param) => param.index(),
            ParamId::Mod(slot, param) => {
                GlobalParam::COUNT + slot.min(MOD_SLOTS - 1) * ModParam::COUNT + param.index()
            }
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index < GlobalParam::COUNT {
            return Some(ParamId::Global(GlobalParam::ALL[index]));
        }
        let rest = index - GlobalParam::COUNT;
        let slot = rest / ModParam::COUNT;
        if slot >= MOD_SLOTS {
            return None;
        }
        Some(ParamId::Mod(slot, ModParam::ALL[rest % ModParam::COUNT]))
    }

    pub fn name(self) -> String {
        match self {
            ParamId::Global(param) => param.name().to_string(),
            ParamId::Mod(slot, param) => format!("mod{}.{}", slot, param.name()),
        }
    }
}

impl From<GlobalParam> for ParamId {
    fn from(param: GlobalParam) -> Self {
        ParamId::Global(param)
    }
}
