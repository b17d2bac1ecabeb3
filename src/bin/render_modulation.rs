//! Renders one modulator slot to a stereo WAV file for listening checks.
//!
//! Usage: render_modulation <out.wav> [seconds] [slot] [patch.json] [config.json]

use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;
use log::info;

use modsys::{EngineConfig, HostTransport, ModulationEngine, MOD_SLOTS};

const SAMPLE_RATE: u32 = 48_000;
const BPM: f64 = 120.0;

fn read_file(path: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let output = args
        .first()
        .context("usage: render_modulation <out.wav> [seconds] [slot] [patch.json] [config.json]")?;
    let seconds: f64 = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("invalid duration '{}'", s))?,
        None => 8.0,
    };
    let slot: usize = match args.get(2) {
        Some(s) => s.parse().with_context(|| format!("invalid slot '{}'", s))?,
        None => 0,
    };
    if slot >= MOD_SLOTS {
        anyhow::bail!("slot {} out of range, there are {} slots", slot, MOD_SLOTS);
    }

    let config = match args.get(4) {
        Some(path) => EngineConfig::from_json(&read_file(path)?)?,
        None => EngineConfig::default(),
    };
    let block = config.max_block_size;
    let mut engine = ModulationEngine::new(config);
    engine.prepare(SAMPLE_RATE as f32, block, engine.config().latency_samples);
    if let Some(path) = args.get(3) {
        engine
            .load_patch_json(&read_file(path)?)
            .with_context(|| format!("failed to load patch {}", path))?;
    }

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(Path::new(output), spec)
        .with_context(|| format!("failed to create {}", output))?;

    let total = (seconds.max(0.0) * SAMPLE_RATE as f64) as usize;
    let mut position = 0usize;
    while position < total {
        let n = block.min(total - position);
        let host = HostTransport {
            bpm: Some(BPM),
            ppq_position: Some(position as f64 * BPM / 60.0 / SAMPLE_RATE as f64),
            time_samples: Some(position as i64),
            time_seconds: None,
            is_playing: true,
        };
        engine.process_block(Some(&host), &[], [&[], &[]], n);
        let out = engine
            .modulator_output(slot)
            .context("modulator slot has no output buffer")?;
        for (l, r) in out.channel(0)[..n].iter().zip(&out.channel(1)[..n]) {
            writer.write_sample(*l)?;
            writer.write_sample(*r)?;
        }
        position += n;
    }
    writer.finalize().context("failed to finalize wav")?;

    info!(
        "rendered {:.2}s of slot {} ({}) to {}",
        seconds,
        slot,
        engine.modulator_type(slot).name(),
        output
    );
    Ok(())
}
