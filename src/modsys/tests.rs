use super::*;
use crate::audio_engine::EngineConfig;
use crate::params::{GlobalParam, ModParam, ParamId, MOD_SLOTS};
use crate::traits::BlockContext;
use crate::transport::TransportSnapshot;

const BLOCK: usize = 256;

fn matrix() -> ModSys {
    let mut sys = ModSys::new(&EngineConfig::default());
    sys.prepare(48_000.0, BLOCK, 0);
    sys
}

fn run(sys: &mut ModSys) -> BlockStatus {
    let transport = TransportSnapshot::default();
    sys.process_block(&BlockContext::new(&transport, BLOCK))
}

/// Turns `slot` into an unsmoothed macro holding `value`, effective from the
/// block after the reload.
fn set_macro(sys: &mut ModSys, slot: usize, value: f32) {
    let handle = sys.handle();
    handle.set_plain(ParamId::Mod(slot, ModParam::Type), ModType::Macro.index() as f32);
    handle.set_plain(ParamId::Mod(slot, ModParam::MacroSmooth), 0.0);
    handle.set_plain(ParamId::Mod(slot, ModParam::MacroValue), value);
    handle.request_reload();
    assert_eq!(run(sys), BlockStatus::Reloaded);
}

#[test]
fn finalized_is_clamped_base_plus_weighted_sum() {
    let mut sys = matrix();
    let handle = sys.handle();
    set_macro(&mut sys, 0, 0.6);
    set_macro(&mut sys, 1, 0.2);

    let gain = ParamId::Global(GlobalParam::Gain);
    let width = ParamId::Global(GlobalParam::Width);
    let mix = ParamId::Global(GlobalParam::Mix);
    handle.enable_connection(0, gain, 0.5).unwrap();
    handle.enable_connection(1, gain, -0.25).unwrap();
    handle.enable_connection(0, width, 1.0).unwrap();
    handle.enable_connection(1, mix, -1.0).unwrap();

    assert_eq!(run(&mut sys), BlockStatus::Processed);
    assert_eq!(sys.modulator_type(0), ModType::Macro);
    let v0 = sys.modulator_value(0);
    let v1 = sys.modulator_value(1);
    assert!((v0 - 0.6).abs() < 1e-5);
    assert!((v1 - 0.2).abs() < 1e-5);

    let expected = (handle.base(gain) + v0 * 0.5 - v1 * 0.25).clamp(0.0, 1.0);
    assert!((handle.value_sum(gain) - expected).abs() < 1e-6);
    // 0.5 + 0.6 overshoots
    assert_eq!(handle.value_sum(width), 1.0);
    assert!((handle.value_sum(mix) - 0.8).abs() < 1e-5);
}

#[test]
fn unrouted_params_follow_their_base() {
    let mut sys = matrix();
    let handle = sys.handle();
    let depth = ParamId::Global(GlobalParam::Depth);
    handle.set_base(depth, 0.3);
    run(&mut sys);
    assert_eq!(handle.value_sum(depth), 0.3);
    handle.set_plain(ParamId::Global(GlobalParam::Gain), 12.0);
    run(&mut sys);
    assert!((handle.plain_value(ParamId::Global(GlobalParam::Gain)) - 12.0).abs() < 1e-4);
}

#[test]
fn rejected_connections_change_nothing() {
    let sys = matrix();
    let handle = sys.handle();
    let own = ParamId::Mod(0, ModParam::MacroValue);
    assert_eq!(
        handle.enable_connection(0, own, 1.0),
        Err(ConnectionError::SelfModulation {
            modulator: 0,
            param: own.index()
        })
    );

    let gain = ParamId::Global(GlobalParam::Gain);
    let index = handle.enable_connection(2, gain, 1.0).unwrap();
    assert_eq!(
        handle.enable_connection(2, gain, 0.5),
        Err(ConnectionError::Duplicate { index })
    );

    handle
        .enable_connection(0, ParamId::Mod(1, ModParam::MacroValue), 1.0)
        .unwrap();
    assert!(matches!(
        handle.enable_connection(1, ParamId::Mod(0, ModParam::MacroValue), 1.0),
        Err(ConnectionError::MutualModulation { .. })
    ));

    assert!(matches!(
        handle.enable_connection(MOD_SLOTS, gain, 1.0),
        Err(ConnectionError::InvalidModulator(_))
    ));
    assert!(matches!(
        handle.enable_connection(0, ParamId::Mod(3, ModParam::Type), 1.0),
        Err(ConnectionError::NotModulatable(_))
    ));
    assert_eq!(handle.connections().len(), 2);
}

#[test]
fn connection_edits_are_visible_to_the_next_block() {
    let mut sys = matrix();
    let handle = sys.handle();
    set_macro(&mut sys, 0, 1.0);
    let depth = ParamId::Global(GlobalParam::Depth);
    let base = handle.base(depth);

    let index = handle.enable_connection(0, depth, 0.25).unwrap();
    run(&mut sys);
    assert!((handle.value_sum(depth) - (base + 0.25)).abs() < 1e-5);

    assert!(handle.set_depth(index, -0.5));
    run(&mut sys);
    assert!((handle.value_sum(depth) - 0.0).abs() < 1e-5);

    assert!(handle.disconnect(0, depth));
    assert!(!handle.is_connected(0, depth));
    run(&mut sys);
    assert_eq!(handle.value_sum(depth), base);
    assert!(!handle.disable_connection(index));
}

#[test]
fn reload_resets_generators_and_jumps_to_bases() {
    let mut sys = matrix();
    let handle = sys.handle();
    set_macro(&mut sys, 0, 0.9);
    let mix = ParamId::Global(GlobalParam::Mix);
    handle.set_base(mix, 0.2);
    handle.enable_connection(0, mix, 0.5).unwrap();
    run(&mut sys);
    assert!(handle.value_sum(mix) > 0.6);

    handle.request_reload();
    assert_eq!(run(&mut sys), BlockStatus::Reloaded);
    assert_eq!(sys.modulator_value(0), 0.0);
    assert_eq!(handle.value_sum(mix), 0.2);
    assert!(sys
        .modulator_output(0)
        .is_some_and(|out| out.channel(0).iter().all(|&s| s == 0.0)));

    assert_eq!(run(&mut sys), BlockStatus::Processed);
    assert!((handle.value_sum(mix) - 0.65).abs() < 1e-5);
}

#[test]
fn patch_snapshot_restores_into_a_fresh_matrix() {
    let mut sys = matrix();
    let handle = sys.handle();
    handle.set_plain(ParamId::Global(GlobalParam::Tone), 4_000.0);
    handle.set_plain(ParamId::Mod(2, ModParam::PerlinOctaves), 6.0);
    handle
        .enable_connection(2, ParamId::Global(GlobalParam::Tone), -0.4)
        .unwrap();
    let json = sys.snapshot_patch("bright").to_json().unwrap();

    let patch = Patch::from_json(&json).unwrap();
    assert_eq!(patch.name, "bright");
    let mut restored = matrix();
    restored.load_patch(&patch).unwrap();
    let other = restored.handle();
    for i in 0..other.layout().len() {
        let id = ParamId::from_index(i).unwrap();
        assert!((other.base(id) - handle.base(id)).abs() < 1e-4, "{}", id.name());
    }
    let routes = other.connections();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].modulator, 2);
    assert_eq!(routes[0].param, ParamId::Global(GlobalParam::Tone));
    assert!((routes[0].depth + 0.4).abs() < 1e-6);
    assert_eq!(run(&mut restored), BlockStatus::Reloaded);
}

#[test]
fn patch_with_unknown_names_is_refused_whole() {
    let mut sys = matrix();
    let handle = sys.handle();
    let depth = ParamId::Global(GlobalParam::Depth);
    handle.set_base(depth, 0.1);
    let patch = Patch::from_json(
        r#"{
            "name": "broken",
            "params": { "depth": 0.9 },
            "connections": [ { "modulator": 0, "param": "nowhere", "depth": 1.0 } ]
        }"#,
    )
    .unwrap();
    let err = sys.load_patch(&patch).unwrap_err();
    assert!(err.to_string().contains("nowhere"));
    assert_eq!(handle.base(depth), 0.1);
    assert_eq!(run(&mut sys), BlockStatus::Processed);
}

#[test]
fn patch_resets_unlisted_params_and_skips_bad_routes() {
    let mut sys = matrix();
    let handle = sys.handle();
    let width = ParamId::Global(GlobalParam::Width);
    let default = handle.base(width);
    handle.set_base(width, 0.9);
    handle
        .enable_connection(4, ParamId::Global(GlobalParam::Feedback), 1.0)
        .unwrap();

    let own = ParamId::Mod(1, ModParam::MacroValue).name();
    let patch = Patch {
        name: "partial".to_string(),
        connections: vec![
            PatchConnection {
                modulator: 1,
                param: own,
                depth: 1.0,
            },
            PatchConnection {
                modulator: 0,
                param: ParamId::Global(GlobalParam::Mix).name(),
                depth: 0.5,
            },
        ],
        ..Default::default()
    };
    sys.load_patch(&patch).unwrap();
    assert_eq!(handle.base(width), default);
    let routes = handle.connections();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].param, ParamId::Global(GlobalParam::Mix));
}
