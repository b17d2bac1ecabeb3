use std::f32::consts::TAU;

use crate::audio::ModBuffer;
use crate::midi::MidiMessage;
use crate::params::{ModParam, SlotParams};
use crate::phasor::Phasor;
use crate::traits::{BlockContext, ModGenerator};
use crate::utils::midi_to_hz;

use super::adsr::{Adsr, AdsrConfig};
use super::smoother::Smoother;

const MAX_HELD_NOTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioRateParams {
    pub octave: i32,
    pub semitone: i32,
    /// Cents.
    pub fine: f32,
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    /// Seconds.
    pub glide: f32,
    pub width: f32,
    /// Semitones at full bend.
    pub bend_range: f32,
}

impl Default for AudioRateParams {
    fn default() -> Self {
        Self {
            octave: 0,
            semitone: 0,
            fine: 0.0,
            attack: 0.01,
            decay: 0.2,
            sustain: 0.7,
            release: 0.3,
            glide: 0.0,
            width: 0.0,
            bend_range: 2.0,
        }
    }
}

impl AudioRateParams {
    pub fn from_slot(slot: &SlotParams) -> Self {
        Self {
            octave: slot.plain(ModParam::AudioOctave).round() as i32,
            semitone: slot.plain(ModParam::AudioSemitone).round() as i32,
            fine: slot.plain(ModParam::AudioFine),
            attack: slot.plain(ModParam::AudioAttack),
            decay: slot.plain(ModParam::AudioDecay),
            sustain: slot.plain(ModParam::AudioSustain),
            release: slot.plain(ModParam::AudioRelease),
            glide: slot.plain(ModParam::AudioGlide),
            width: slot.plain(ModParam::AudioWidth),
            bend_range: slot.plain(ModParam::AudioBendRange),
        }
    }

    fn transpose(&self) -> f32 {
        (self.octave * 12 + self.semitone) as f32 + self.fine / 100.0
    }
}

/// Last-note-priority stack of held keys.
#[derive(Debug, Clone)]
struct NoteStack {
    notes: [u8; MAX_HELD_NOTES],
    len: usize,
}

impl NoteStack {
    fn new() -> Self {
        Self {
            notes: [0; MAX_HELD_NOTES],
            len: 0,
        }
    }

    fn push(&mut self, note: u8) {
        self.remove(note);
        if self.len == MAX_HELD_NOTES {
            self.notes.copy_within(1.., 0);
            self.len -= 1;
        }
        self.notes[self.len] = note;
        self.len += 1;
    }

    fn remove(&mut self, note: u8) {
        if let Some(pos) = self.notes[..self.len].iter().position(|&n| n == note) {
            self.notes.copy_within(pos + 1..self.len, pos);
            self.len -= 1;
        }
    }

    fn top(&self) -> Option<u8> {
        self.len.checked_sub(1).map(|i| self.notes[i])
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}

/// MIDI-played sine at audio rate, shaped by an ADSR.
#[derive(Debug, Clone)]
pub struct AudioRate {
    params: AudioRateParams,
    sample_rate: f32,
    held: NoteStack,
    bend: f32,
    pitch: Smoother,
    phasor: Phasor,
    envelope: Adsr,
}

impl AudioRate {
    pub fn new() -> Self {
        Self {
            params: AudioRateParams::default(),
            sample_rate: 48_000.0,
            held: NoteStack::new(),
            bend: 0.0,
            pitch: Smoother::new(48_000.0, 0.0),
            phasor: Phasor::new(),
            envelope: Adsr::new(48_000.0),
        }
    }

    pub fn current_note(&self) -> Option<u8> {
        self.held.top()
    }

    /// Tracks the block's notes and bend without rendering, so a slot that
    /// returns to this generator finds the keys that are still held.
    pub fn observe_midi(&mut self, ctx: &BlockContext) {
        for (_, message) in ctx.midi_events() {
            self.handle(message);
        }
    }

    fn target_hz(&self, note: u8) -> f32 {
        let pitch = note as f32 + self.params.transpose() + self.bend * self.params.bend_range;
        midi_to_hz(pitch)
    }

    fn handle(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn { note, .. } => {
                let first = self.held.top().is_none() && !self.envelope.is_active();
                self.held.push(note);
                if first {
                    self.pitch.snap(self.target_hz(note));
                }
                self.envelope.gate_on();
            }
            MidiMessage::NoteOff { note } => {
                self.held.remove(note);
                if self.held.top().is_none() {
                    self.envelope.gate_off();
                }
            }
            MidiMessage::PitchBend(value) => {
                self.bend = value.clamp(-1.0, 1.0);
            }
        }
    }
}

impl Default for AudioRate {
    fn default() -> Self {
        Self::new()
    }
}

impl ModGenerator for AudioRate {
    type Params = AudioRateParams;

    fn prepare(&mut self, sample_rate: f32, _max_block: usize, _latency_samples: u32) {
        self.sample_rate = sample_rate.max(1.0);
        self.pitch.set_sample_rate(self.sample_rate);
        self.envelope.set_sample_rate(self.sample_rate);
    }

    fn set_parameters(&mut self, params: &AudioRateParams) {
        self.params = *params;
        self.pitch.set_time(params.glide);
        self.envelope.update_config(AdsrConfig {
            attack: params.attack,
            decay: params.decay,
            sustain: params.sustain,
            release: params.release,
            ..Default::default()
        });
    }

    fn process(&mut self, output: &mut ModBuffer, ctx: &BlockContext) {
        let n = ctx.num_samples.min(output.len());
        let spread = 0.5 * self.params.width.clamp(0.0, 1.0);
        let nyquist = self.sample_rate * 0.5;
        let mut events = ctx.midi_events().peekable();

        let (left, right) = output.channels_mut();
        for i in 0..n {
            while let Some((_, message)) = events.next_if(|&(at, _)| at <= i) {
                self.handle(message);
            }

            let hz = match self.held.top() {
                Some(note) => {
                    let target = self.target_hz(note);
                    self.pitch.next_value(target)
                }
                None => self.pitch.current(),
            };
            let level = self.envelope.next_value();
            let phase = self.phasor.phase() as f32;
            left[i] = (TAU * phase).sin() * level;
            right[i] = (TAU * (phase + spread)).sin() * level;
            self.phasor
                .advance((hz.clamp(0.0, nyquist) / self.sample_rate) as f64);
        }

        for (_, message) in events {
            self.handle(message);
        }
    }

    fn reset(&mut self) {
        self.held.clear();
        self.bend = 0.0;
        self.pitch.snap(0.0);
        self.phasor.reset();
        self.envelope.reset();
    }
}
