use super::*;
use crate::midi::MidiMessage;
use crate::params::{GlobalParam, ModParam};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 512;

fn engine() -> ModulationEngine {
    let mut engine = ModulationEngine::new(EngineConfig::default());
    engine.prepare(SAMPLE_RATE, BLOCK, 0);
    engine
}

fn playing(bpm: f64, block: usize) -> HostTransport {
    let samples = (block * BLOCK) as i64;
    HostTransport {
        bpm: Some(bpm),
        ppq_position: Some(samples as f64 * bpm / 60.0 / SAMPLE_RATE as f64),
        time_samples: Some(samples),
        time_seconds: None,
        is_playing: true,
    }
}

fn silence() -> [&'static [f32]; 2] {
    [&[], &[]]
}

/// Sets plain values on slot controls and applies them through a reload block.
fn configure(engine: &mut ModulationEngine, slot: usize, settings: &[(ModParam, f32)]) {
    let handle = engine.handle();
    for &(param, plain) in settings {
        handle.set_plain(ParamId::Mod(slot, param), plain);
    }
    handle.request_reload();
    assert_eq!(
        engine.process_block(None, &[], silence(), BLOCK),
        BlockStatus::Reloaded
    );
}

#[test]
fn synced_perlin_rate_change_does_not_click() {
    let mut engine = ModulationEngine::new(EngineConfig {
        noise_seed: 69_420,
        ..Default::default()
    });
    engine.prepare(SAMPLE_RATE, BLOCK, 0);
    configure(
        &mut engine,
        0,
        &[
            (ModParam::Type, ModType::Perlin.index() as f32),
            (ModParam::PerlinOctaves, 4.0),
            (ModParam::PerlinSync, 1.0),
            (ModParam::PerlinRateBeats, 1.0),
        ],
    );
    let handle = engine.handle();

    let mut previous: Option<f32> = None;
    let mut max_jump = 0.0f32;
    for block in 0..100 {
        if block == 50 {
            handle.set_plain(ParamId::Mod(0, ModParam::PerlinRateBeats), 2.0);
        }
        let host = playing(120.0, block);
        engine.process_block(Some(&host), &[], silence(), BLOCK);
        let out = engine.modulator_output(0).unwrap().channel(0);
        for &sample in out {
            assert!(sample.is_finite());
            if let Some(prev) = previous {
                max_jump = max_jump.max((sample - prev).abs());
            }
            previous = Some(sample);
        }
    }
    assert!(engine.has_transport());
    assert!(max_jump < 0.01, "largest step {}", max_jump);
}

#[test]
fn disabled_connection_returns_to_base_within_one_block() {
    let mut engine = engine();
    configure(
        &mut engine,
        0,
        &[
            (ModParam::Type, ModType::Macro.index() as f32),
            (ModParam::MacroSmooth, 0.0),
            (ModParam::MacroValue, 0.3),
        ],
    );
    let handle = engine.handle();
    let gain = ParamId::Global(GlobalParam::Gain);
    assert_eq!(gain.index(), 5);
    let base = handle.base(gain);

    let index = handle.enable_connection(0, gain, 1.0).unwrap();
    engine.process_block(None, &[], silence(), BLOCK);
    let value = engine.modulator_value(0);
    assert!((value - 0.3).abs() < 1e-5);
    assert!((engine.value_sum(gain) - (base + value).clamp(0.0, 1.0)).abs() < 1e-6);

    assert!(handle.disable_connection(index));
    engine.process_block(None, &[], silence(), BLOCK);
    assert_eq!(engine.value_sum(gain), base);
    assert!((engine.plain_value(gain) - 0.0).abs() < 1e-4);
}

#[test]
fn missing_transport_runs_synced_generators_free() {
    let mut engine = engine();
    configure(
        &mut engine,
        0,
        &[
            (ModParam::Type, ModType::Lfo.index() as f32),
            (ModParam::LfoSync, 1.0),
        ],
    );
    engine.process_block(None, &[], silence(), BLOCK);
    assert!(!engine.has_transport());
    let transport = engine.transport();
    assert!(!transport.is_playing);
    assert_eq!(transport.bpm, TransportSnapshot::DEFAULT_BPM);

    let first = engine.modulator_output(0).unwrap().channel(0).to_vec();
    engine.process_block(None, &[], silence(), BLOCK);
    let second = engine.modulator_output(0).unwrap().channel(0);
    assert!(first.iter().chain(second).all(|s| s.is_finite()));
    assert_ne!(first.as_slice(), second);
}

#[test]
fn long_host_blocks_are_split_with_midi_in_place() {
    let mut engine = ModulationEngine::new(EngineConfig {
        max_block_size: 256,
        ..Default::default()
    });
    configure(
        &mut engine,
        0,
        &[
            (ModParam::Type, ModType::Pitchbend.index() as f32),
            (ModParam::PitchbendSmooth, 0.0),
        ],
    );

    let midi = [
        MidiEvent::new(100, MidiMessage::PitchBend(-0.25)),
        MidiEvent::new(700, MidiMessage::PitchBend(0.5)),
    ];
    let status = engine.process_block(None, &midi, silence(), 1000);
    assert_eq!(status, BlockStatus::Processed);

    // 1000 = 3 * 256 + 232; the buffers hold the last chunk
    let out = engine.modulator_output(0).unwrap();
    assert_eq!(out.len(), 256);
    assert_eq!(out.channel(0)[231], 0.5);
    assert_eq!(engine.modulator_value(0), 0.5);
}

#[test]
fn sidechain_input_reaches_the_envelope_follower() {
    let mut engine = engine();
    configure(
        &mut engine,
        0,
        &[
            (ModParam::Type, ModType::EnvFol.index() as f32),
            (ModParam::EnvAttack, 0.0005),
        ],
    );
    let loud = vec![0.8f32; BLOCK];
    engine.process_block(None, &[], [&loud, &loud], BLOCK);
    let peak = engine.modulator_value(0);
    assert!(peak > 0.1);

    engine.process_block(None, &[], silence(), BLOCK);
    let quiet = engine.modulator_value(0);
    assert!(quiet < peak && quiet >= 0.0);
}

#[test]
fn reseeding_changes_perlin_output() {
    let mut a = engine();
    let mut b = engine();
    b.set_noise_seed(a.noise_seed() + 1);
    assert_eq!(b.config().noise_seed, a.noise_seed() + 1);
    for engine in [&mut a, &mut b] {
        engine.process_block(None, &[], silence(), BLOCK);
    }
    assert_ne!(
        a.modulator_output(0).unwrap().channel(0),
        b.modulator_output(0).unwrap().channel(0)
    );
}

#[test]
fn patch_json_loads_through_the_engine() {
    let mut engine = engine();
    engine
        .load_patch_json(
            r#"{
                "name": "wobble",
                "params": { "mod1.type": 6, "mix": 0.25 },
                "connections": [ { "modulator": 1, "param": "tone", "depth": 0.5 } ]
            }"#,
        )
        .unwrap();
    assert_eq!(
        engine.process_block(None, &[], silence(), BLOCK),
        BlockStatus::Reloaded
    );
    assert_eq!(engine.value_sum(ParamId::Global(GlobalParam::Mix)), 0.25);
    engine.process_block(None, &[], silence(), BLOCK);
    assert_eq!(engine.modulator_type(1), ModType::Lfo);
    assert!(engine.load_patch_json("not json").is_err());
}
