mod config;
#[cfg(test)]
mod tests;

pub use config::EngineConfig;

use log::info;

use crate::audio::ModBuffer;
use crate::midi::MidiEvent;
use crate::modsys::{BlockStatus, ModSys, ModSysHandle, ModType, Patch};
use crate::params::ParamId;
use crate::tables::NoiseTable;
use crate::traits::BlockContext;
use crate::transport::{HostTransport, TransportSnapshot};

/// Host-facing wrapper around the modulation matrix: resolves the transport,
/// splits long host blocks and forwards MIDI and sidechain input.
pub struct ModulationEngine {
    config: EngineConfig,
    sys: ModSys,
    handle: ModSysHandle,
    sample_rate: f32,
    max_block: usize,
    transport: TransportSnapshot,
}

impl ModulationEngine {
    /// Builds the engine prepared for 48 kHz and `config.max_block_size`.
    pub fn new(config: EngineConfig) -> Self {
        let sys = ModSys::new(&config);
        let handle = sys.handle();
        let max_block = config.max_block_size.max(1);
        let latency_samples = config.latency_samples;
        let mut engine = Self {
            sys,
            handle,
            sample_rate: 48_000.0,
            max_block,
            transport: TransportSnapshot::default(),
            config,
        };
        engine.prepare(48_000.0, max_block, latency_samples);
        engine
    }

    pub fn handle(&self) -> ModSysHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Allocates for blocks of up to `max_block` samples and resets every generator.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize, latency_samples: u32) {
        self.sample_rate = sample_rate.max(1.0);
        self.max_block = max_block.max(1);
        self.config.latency_samples = latency_samples;
        self.sys.prepare(self.sample_rate, self.max_block, latency_samples);
        self.transport = TransportSnapshot::from_host(None, self.sample_rate as f64, latency_samples);
        info!(
            "modulation engine prepared: {} Hz, {} samples/block, latency {}",
            self.sample_rate, self.max_block, latency_samples
        );
    }

    /// Processes `num_samples` of host time. MIDI offsets are relative to the
    /// start of this host block. Longer blocks than prepared are split; the
    /// exposed buffers then hold the last chunk.
    pub fn process_block(
        &mut self,
        host: Option<&HostTransport>,
        midi: &[MidiEvent],
        input: [&[f32]; 2],
        num_samples: usize,
    ) -> BlockStatus {
        let snapshot = TransportSnapshot::from_host(
            host,
            self.sample_rate as f64,
            self.config.latency_samples,
        );
        self.transport = snapshot;

        let mut status = BlockStatus::Processed;
        let mut start = 0;
        while start < num_samples {
            let len = self.max_block.min(num_samples - start);
            let transport = snapshot.advanced(start);
            let chunk_input = input.map(|channel| channel.get(start..).unwrap_or(&[]));
            let ctx = BlockContext::new(&transport, len)
                .with_midi(midi, start)
                .with_input(chunk_input);
            if self.sys.process_block(&ctx) == BlockStatus::Reloaded {
                status = BlockStatus::Reloaded;
            }
            start += len;
        }
        status
    }

    pub fn modulator_output(&self, slot: usize) -> Option<&ModBuffer> {
        self.sys.modulator_output(slot)
    }

    pub fn modulator_value(&self, slot: usize) -> f32 {
        self.sys.modulator_value(slot)
    }

    pub fn modulator_type(&self, slot: usize) -> ModType {
        self.sys.modulator_type(slot)
    }

    pub fn value_sum(&self, param: ParamId) -> f32 {
        self.handle.value_sum(param)
    }

    pub fn plain_value(&self, param: ParamId) -> f32 {
        self.handle.plain_value(param)
    }

    /// Whether the host supplied transport information for the last block.
    pub fn has_transport(&self) -> bool {
        self.transport.has_transport
    }

    pub fn transport(&self) -> &TransportSnapshot {
        &self.transport
    }

    pub fn load_patch(&mut self, patch: &Patch) -> anyhow::Result<()> {
        self.sys.load_patch(patch)
    }

    pub fn load_patch_json(&mut self, json: &str) -> anyhow::Result<()> {
        let patch = Patch::from_json(json)?;
        self.load_patch(&patch)
    }

    pub fn snapshot_patch(&self, name: &str) -> Patch {
        self.sys.snapshot_patch(name)
    }

    pub fn noise_seed(&self) -> u64 {
        self.sys.noise_seed()
    }

    /// Regenerates the Perlin noise table. Allocates; call off the audio thread.
    pub fn set_noise_seed(&mut self, seed: u64) {
        if seed == self.sys.noise_seed() {
            return;
        }
        self.config.noise_seed = seed;
        self.sys.set_noise_table(NoiseTable::new(seed));
    }
}

impl Default for ModulationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
