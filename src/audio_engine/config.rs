use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::crossfade::DEFAULT_CROSSFADE_MS;
use crate::tables::DEFAULT_NOISE_SEED;

/// Engine settings fixed at construction. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest block rendered in one pass; longer host blocks are chunked.
    pub max_block_size: usize,
    /// Duration of phase-reset crossfades inside Perlin and LFO generators.
    pub crossfade_ms: f32,
    /// Duration of the fade when a slot changes generator type.
    pub type_fade_ms: f32,
    pub noise_seed: u64,
    /// Output latency the plugin reports; synced generators compensate for it.
    pub latency_samples: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_block_size: 512,
            crossfade_ms: DEFAULT_CROSSFADE_MS,
            type_fade_ms: 30.0,
            noise_seed: DEFAULT_NOISE_SEED,
            latency_samples: 0,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).context("failed to parse engine config")?;
        if config.max_block_size == 0 {
            anyhow::bail!("max_block_size must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = EngineConfig::from_json(r#"{ "noise_seed": 7 }"#).unwrap();
        assert_eq!(config.noise_seed, 7);
        assert_eq!(config.max_block_size, 512);
        assert_eq!(config.crossfade_ms, DEFAULT_CROSSFADE_MS);
    }

    #[test]
    fn round_trips_through_json() {
        let config = EngineConfig {
            type_fade_ms: 5.0,
            latency_samples: 64,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let err = EngineConfig::from_json(r#"{ "max_block_size": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("max_block_size"));
    }

    #[test]
    fn malformed_json_reports_context() {
        let err = EngineConfig::from_json("{").unwrap_err();
        assert!(err.to_string().contains("engine config"));
    }
}
