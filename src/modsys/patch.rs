use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

use anyhow::Context;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::modsys::ModSysShared;

/// Stored state of the matrix: parameter bases in plain units plus routing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub name: String,
    /// Keyed by parameter name. Parameters not listed load at their default.
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
    #[serde(default)]
    pub connections: Vec<PatchConnection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchConnection {
    pub modulator: usize,
    pub param: String,
    #[serde(default = "default_depth")]
    pub depth: f32,
}

fn default_depth() -> f32 {
    1.0
}

impl Patch {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("failed to parse patch")
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize patch")
    }

    pub(crate) fn capture(name: &str, shared: &ModSysShared) -> Self {
        let layout = shared.layout;
        let params = layout
            .iter()
            .enumerate()
            .map(|(i, info)| {
                (
                    info.name.clone(),
                    info.range.normalized_to_plain(shared.params.base(i)),
                )
            })
            .collect();
        let connections = shared
            .connections
            .enabled()
            .into_iter()
            .map(|c| PatchConnection {
                modulator: c.modulator,
                param: c.param.name(),
                depth: c.depth,
            })
            .collect();
        Self {
            name: name.to_string(),
            params,
            connections,
        }
    }

    /// Validates every name first; on error nothing is changed.
    pub(crate) fn apply(&self, shared: &ModSysShared) -> anyhow::Result<()> {
        let layout = shared.layout;

        let mut bases: Vec<f32> = layout.iter().map(|info| info.default).collect();
        for (name, plain) in &self.params {
            let index = layout
                .find(name)
                .with_context(|| format!("patch '{}' sets unknown parameter '{}'", self.name, name))?;
            if !plain.is_finite() {
                anyhow::bail!("patch '{}' sets '{}' to a non-finite value", self.name, name);
            }
            if let Some(info) = layout.info(index) {
                bases[index] = info.range.plain_to_normalized(*plain);
            }
        }

        let routes = self
            .connections
            .iter()
            .map(|c| {
                layout
                    .find(&c.param)
                    .map(|index| (c.modulator, index, c.depth))
                    .with_context(|| {
                        format!("patch '{}' routes to unknown parameter '{}'", self.name, c.param)
                    })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        for (i, base) in bases.into_iter().enumerate() {
            shared.params.set_base(i, base);
        }

        shared.connections.clear();
        let mut routed = 0;
        for (modulator, param, depth) in routes {
            match shared.connections.enable(layout, modulator, param, depth) {
                Ok(_) => routed += 1,
                Err(err) => warn!("patch '{}': skipped connection: {}", self.name, err),
            }
        }

        shared.reload_pending.store(true, Ordering::Release);
        info!(
            "patch '{}' loaded: {} params, {} of {} connections",
            self.name,
            self.params.len(),
            routed,
            self.connections.len()
        );
        Ok(())
    }
}
