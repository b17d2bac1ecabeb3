use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use super::connection::{ConnectionError, ConnectionInfo, Connex};
use super::context::ModType;
use super::modulator::Modulator;
use super::patch::Patch;
use crate::audio::ModBuffer;
use crate::audio_engine::EngineConfig;
use crate::params::{ParamId, ParamLayout, ParamStore, SlotParams, MOD_SLOTS};
use crate::tables::NoiseTable;
use crate::traits::BlockContext;
use crate::utils::sanitize;

/// What the last `process_block` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Processed,
    /// A patch was applied: generators were reset and finalized values
    /// jumped to the new bases. Modulator buffers are silent for this block.
    Reloaded,
}

/// State shared between the audio thread and UI-side handles.
pub(crate) struct ModSysShared {
    pub(crate) layout: &'static ParamLayout,
    pub(crate) params: ParamStore,
    pub(crate) connections: Connex,
    pub(crate) reload_pending: AtomicBool,
}

/// Cheap, cloneable access to parameters and routing from any thread.
#[derive(Clone)]
pub struct ModSysHandle {
    shared: Arc<ModSysShared>,
}

impl ModSysHandle {
    pub fn layout(&self) -> &'static ParamLayout {
        self.shared.layout
    }

    /// Routes `modulator` onto `param`. Returns the pool index on success.
    pub fn enable_connection(
        &self,
        modulator: usize,
        param: ParamId,
        depth: f32,
    ) -> Result<usize, ConnectionError> {
        self.enable_connection_at(modulator, param.index(), depth)
    }

    /// Same as [`enable_connection`](Self::enable_connection) with a flat parameter index.
    pub fn enable_connection_at(
        &self,
        modulator: usize,
        param_index: usize,
        depth: f32,
    ) -> Result<usize, ConnectionError> {
        let result =
            self.shared
                .connections
                .enable(self.shared.layout, modulator, param_index, depth);
        match &result {
            Ok(index) => debug!(
                "connection {} enabled: mod {} -> param {} depth {}",
                index, modulator, param_index, depth
            ),
            Err(err) => warn!("connection rejected: {}", err),
        }
        result
    }

    pub fn disable_connection(&self, index: usize) -> bool {
        let done = self.shared.connections.disable(index);
        if done {
            debug!("connection {} disabled", index);
        }
        done
    }

    /// Removes the route from `modulator` to `param`, wherever it sits in the pool.
    pub fn disconnect(&self, modulator: usize, param: ParamId) -> bool {
        self.shared
            .connections
            .disable_pair(modulator, param.index())
    }

    pub fn set_depth(&self, index: usize, depth: f32) -> bool {
        self.shared.connections.set_depth(index, depth)
    }

    pub fn connection(&self, index: usize) -> Option<ConnectionInfo> {
        self.shared.connections.get(index)
    }

    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.shared.connections.enabled()
    }

    pub fn is_connected(&self, modulator: usize, param: ParamId) -> bool {
        self.shared
            .connections
            .find(modulator, param.index())
            .is_some()
    }

    /// Sets a base value in normalized units.
    pub fn set_base(&self, param: ParamId, normalized: f32) -> bool {
        self.shared.params.set_base(param.index(), normalized)
    }

    /// Sets a base value in the parameter's own units.
    pub fn set_plain(&self, param: ParamId, plain: f32) -> bool {
        let index = param.index();
        match self.shared.layout.info(index) {
            Some(info) => self
                .shared
                .params
                .set_base(index, info.range.plain_to_normalized(plain)),
            None => false,
        }
    }

    pub fn base(&self, param: ParamId) -> f32 {
        self.shared.params.base(param.index())
    }

    /// Base plus modulation after the last block, normalized and clamped.
    pub fn value_sum(&self, param: ParamId) -> f32 {
        self.shared.params.finalized(param.index())
    }

    /// `value_sum` mapped back to the parameter's units.
    pub fn plain_value(&self, param: ParamId) -> f32 {
        let index = param.index();
        let normalized = self.shared.params.finalized(index);
        self.shared
            .layout
            .info(index)
            .map_or(normalized, |info| info.range.normalized_to_plain(normalized))
    }

    /// Asks the audio thread to reset generators on its next block.
    pub fn request_reload(&self) {
        self.shared.reload_pending.store(true, Ordering::Release);
    }
}

/// The modulation matrix. Owned by the audio thread.
pub struct ModSys {
    shared: Arc<ModSysShared>,
    layout: &'static ParamLayout,
    modulators: Vec<Modulator>,
    acc: Vec<f32>,
    /// Finalized values of the previous block; generators read their controls here.
    finalized: Vec<f32>,
    values: [f32; MOD_SLOTS],
    noise_table: NoiseTable,
}

impl ModSys {
    pub fn new(config: &EngineConfig) -> Self {
        let layout = ParamLayout::global();
        let noise_table = NoiseTable::new(config.noise_seed);
        let modulators = (0..MOD_SLOTS)
            .map(|slot| {
                Modulator::new(
                    slot,
                    &noise_table,
                    config.crossfade_ms,
                    config.type_fade_ms,
                    config.noise_seed,
                )
            })
            .collect();
        let shared = Arc::new(ModSysShared {
            layout,
            params: ParamStore::new(layout),
            connections: Connex::new(),
            reload_pending: AtomicBool::new(false),
        });
        Self {
            shared,
            layout,
            modulators,
            acc: vec![0.0; layout.len()],
            finalized: layout.iter().map(|info| info.default).collect(),
            values: [0.0; MOD_SLOTS],
            noise_table,
        }
    }

    pub fn handle(&self) -> ModSysHandle {
        ModSysHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn prepare(&mut self, sample_rate: f32, max_block: usize, latency_samples: u32) {
        for modulator in &mut self.modulators {
            modulator.prepare(sample_rate, max_block, latency_samples);
            modulator.reset();
        }
        self.values = [0.0; MOD_SLOTS];
    }

    pub fn noise_seed(&self) -> u64 {
        self.noise_table.seed()
    }

    /// Replaces the noise table every Perlin generator reads. Allocates.
    pub fn set_noise_table(&mut self, table: NoiseTable) {
        info!("noise table reseeded: {}", table.seed());
        for modulator in &mut self.modulators {
            modulator.set_noise_table(&table);
        }
        self.noise_table = table;
    }

    pub fn modulator_value(&self, slot: usize) -> f32 {
        self.values.get(slot).copied().unwrap_or(0.0)
    }

    pub fn modulator_output(&self, slot: usize) -> Option<&ModBuffer> {
        self.modulators.get(slot).map(Modulator::output)
    }

    pub fn modulator_type(&self, slot: usize) -> ModType {
        self.modulators
            .get(slot)
            .map_or(ModType::Invalid, Modulator::selected)
    }

    /// Replaces bases and routing with the patch contents. Generators are
    /// reset at the start of the next block.
    pub fn load_patch(&mut self, patch: &Patch) -> anyhow::Result<()> {
        patch.apply(&self.shared)
    }

    /// Captures current bases and enabled connections.
    pub fn snapshot_patch(&self, name: &str) -> Patch {
        Patch::capture(name, &self.shared)
    }

    /// Runs init, evaluate, apply and finalize for one block of at most the
    /// prepared size.
    pub fn process_block(&mut self, ctx: &BlockContext) -> BlockStatus {
        if self.shared.reload_pending.swap(false, Ordering::AcqRel) {
            self.reload();
            return BlockStatus::Reloaded;
        }

        let params = &self.shared.params;
        for (i, acc) in self.acc.iter_mut().enumerate() {
            *acc = params.base(i);
        }

        for (slot, modulator) in self.modulators.iter_mut().enumerate() {
            let view = SlotParams::new(slot, self.layout, &self.finalized);
            modulator.process(&view, ctx);
            self.values[slot] = modulator.value();
        }

        let values = &self.values;
        let acc = &mut self.acc;
        self.shared.connections.for_each_enabled(|modulator, param, depth| {
            if let (Some(value), Some(slot)) = (values.get(modulator), acc.get_mut(param)) {
                *slot += value * depth;
            }
        });

        for (i, (acc, finalized)) in self.acc.iter().zip(self.finalized.iter_mut()).enumerate() {
            *finalized = sanitize(*acc).clamp(0.0, 1.0);
            params.publish(i, *finalized);
        }

        BlockStatus::Processed
    }

    fn reload(&mut self) {
        for modulator in &mut self.modulators {
            modulator.reset();
        }
        self.values = [0.0; MOD_SLOTS];
        let params = &self.shared.params;
        for (i, finalized) in self.finalized.iter_mut().enumerate() {
            *finalized = params.base(i);
            params.publish(i, *finalized);
        }
    }
}
