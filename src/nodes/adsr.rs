use crate::utils::get_curved_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub decay_curve: f32,
    pub release_curve: f32,
}

impl Default for AdsrConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.2,
            sustain: 0.7,
            release: 0.3,
            decay_curve: 0.0,
            release_curve: 0.0,
        }
    }
}

/// Gate-driven ADSR. Attack starts from the current level, so retriggering
/// a sounding note does not click.
#[derive(Debug, Clone)]
pub struct Adsr {
    phase: EnvelopePhase,
    value: f32,
    start_level: f32,
    release_level: f32,
    position: f32,
    sample_rate: f32,
    config: AdsrConfig,
}

impl Adsr {
    const MIN_TIME: f32 = 0.0001;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: EnvelopePhase::Idle,
            value: 0.0,
            start_level: 0.0,
            release_level: 0.0,
            position: 0.0,
            sample_rate: sample_rate.max(1.0),
            config: AdsrConfig::default(),
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
    }

    pub fn update_config(&mut self, config: AdsrConfig) {
        self.config = config;
    }

    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.phase != EnvelopePhase::Idle
    }

    pub fn gate_on(&mut self) {
        self.start_level = self.value;
        self.position = 0.0;
        self.phase = EnvelopePhase::Attack;
    }

    pub fn gate_off(&mut self) {
        if matches!(self.phase, EnvelopePhase::Idle | EnvelopePhase::Release) {
            return;
        }
        self.release_level = self.value;
        self.position = 0.0;
        self.phase = EnvelopePhase::Release;
    }

    pub fn reset(&mut self) {
        self.phase = EnvelopePhase::Idle;
        self.value = 0.0;
        self.position = 0.0;
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let increment = 1.0 / self.sample_rate;
        let sustain = self.config.sustain.clamp(0.0, 1.0);

        self.value = match self.phase {
            EnvelopePhase::Attack => {
                self.position += increment / self.config.attack.max(Self::MIN_TIME);
                if self.position >= 1.0 {
                    self.position = 0.0;
                    self.phase = EnvelopePhase::Decay;
                    1.0
                } else {
                    self.start_level + (1.0 - self.start_level) * self.position
                }
            }
            EnvelopePhase::Decay => {
                self.position += increment / self.config.decay.max(Self::MIN_TIME);
                if self.position >= 1.0 {
                    self.position = 0.0;
                    self.phase = EnvelopePhase::Sustain;
                    sustain
                } else {
                    let curved = get_curved_value(self.position, self.config.decay_curve);
                    1.0 - curved * (1.0 - sustain)
                }
            }
            EnvelopePhase::Sustain => sustain,
            EnvelopePhase::Release => {
                self.position += increment / self.config.release.max(Self::MIN_TIME);
                if self.position >= 1.0 {
                    self.position = 0.0;
                    self.phase = EnvelopePhase::Idle;
                    0.0
                } else {
                    let curved = get_curved_value(self.position, self.config.release_curve);
                    self.release_level * (1.0 - curved)
                }
            }
            EnvelopePhase::Idle => 0.0,
        };

        self.value = self.value.clamp(0.0, 1.0);
        self.value
    }
}
