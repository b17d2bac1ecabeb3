// src/traits/mod.rs
use crate::audio::ModBuffer;
use crate::midi::{MidiEvent, MidiMessage};
use crate::transport::TransportSnapshot;

/// Everything a generator may read while rendering one block.
#[derive(Clone, Copy)]
pub struct BlockContext<'a> {
    pub transport: &'a TransportSnapshot,
    /// Events for this block, offsets relative to `midi_offset`.
    pub midi: &'a [MidiEvent],
    /// Sample offset of this block within the host buffer the events refer to.
    pub midi_offset: usize,
    /// Sidechain/input audio, one slice per channel. May be shorter than the block.
    pub input: [&'a [f32]; 2],
    pub num_samples: usize,
}

impl<'a> BlockContext<'a> {
    pub fn new(transport: &'a TransportSnapshot, num_samples: usize) -> Self {
        Self {
            transport,
            midi: &[],
            midi_offset: 0,
            input: [&[], &[]],
            num_samples,
        }
    }

    pub fn with_midi(mut self, midi: &'a [MidiEvent], midi_offset: usize) -> Self {
        self.midi = midi;
        self.midi_offset = midi_offset;
        self
    }

    pub fn with_input(mut self, input: [&'a [f32]; 2]) -> Self {
        self.input = input;
        self
    }

    /// Events as `(sample index inside this block, message)`.
    pub fn midi_events(&self) -> impl Iterator<Item = (usize, MidiMessage)> + 'a {
        let offset = self.midi_offset;
        let end = offset + self.num_samples;
        self.midi
            .iter()
            .filter(move |e| e.sample_offset >= offset && e.sample_offset < end)
            .map(move |e| (e.sample_offset - offset, e.message))
    }

    #[inline]
    pub fn input_sample(&self, channel: usize, index: usize) -> f32 {
        self.input
            .get(channel)
            .and_then(|c| c.get(index))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Common contract of the modulation generators.
pub trait ModGenerator {
    type Params: Copy + PartialEq;

    /// Allocates scratch space. Not real-time safe. Latency is also carried
    /// per block by the transport snapshot, which is what synced generators read.
    fn prepare(&mut self, sample_rate: f32, max_block: usize, latency_samples: u32);

    /// Cheap; called once per block with the finalized parameter values.
    fn set_parameters(&mut self, params: &Self::Params);

    /// Writes `ctx.num_samples` frames into both channels of `output`.
    fn process(&mut self, output: &mut ModBuffer, ctx: &BlockContext);

    fn reset(&mut self);
}
