//! Registry-wide consistency checks.

use proptest::prelude::*;
use std::sync::Arc;
use strata_core::{
    BLOCK_SIZE, BlockContext, Capabilities, LiveStorage, MemoryPool, Processor, ProcessorTypeCode,
};
use strata_registry::{
    ProcessorArena, SpawnRequest, all_descriptions, codes, control_description, default_storage,
    float_param_count, int_param_count, is_implemented, max_scratch_len, name, type_info,
};

fn spawn(code: ProcessorTypeCode, oversampled: bool, pool: &mut MemoryPool) -> ProcessorArena {
    let storage = Arc::new(LiveStorage::new(&default_storage(code)));
    let mut arena = ProcessorArena::new();
    let spawned = arena.spawn_in_place(
        SpawnRequest {
            code,
            storage: &storage,
            sample_rate: 48000.0,
            oversampled,
            needs_metadata: false,
        },
        Some(pool),
    );
    assert_eq!(spawned, !code.is_none() && is_implemented(code));
    arena
}

#[test]
fn description_counts_match_table() {
    for info in all_descriptions().into_iter().skip(1) {
        let desc = control_description(info.code);
        assert_eq!(desc.name, name(info.code));
        assert_eq!(desc.float_count(), float_param_count(info.code), "{}", info.name);
        assert_eq!(desc.int_count(), int_param_count(info.code), "{}", info.name);
    }
}

#[test]
fn every_type_spawns_in_both_variants() {
    let mut pool = MemoryPool::new();
    for oversampled in [false, true] {
        pool.preallocate(max_scratch_len(48000.0, oversampled), all_descriptions().len());
        for info in all_descriptions().into_iter().skip(1) {
            let mut arena = spawn(info.code, oversampled, &mut pool);
            let processor = arena.processor_mut().expect("spawned");
            assert_eq!(processor.code(), info.code);
            assert_eq!(processor.is_oversampled(), oversampled);
            assert_eq!(processor.capabilities(), info.capabilities);
            assert_eq!(arena.pending_scratch(), 0, "{} left scratch queued", info.name);
            arena.unspawn(Some(&mut pool));
        }
    }
    assert_eq!(pool.lent_count(), 0);
}

#[test]
fn spawned_processors_run_their_widest_shape() {
    let mut pool = MemoryPool::new();
    pool.preallocate(max_scratch_len(48000.0, true), 1);
    let ctx = BlockContext::default();
    for info in all_descriptions().into_iter().skip(1) {
        for oversampled in [false, true] {
            let mut arena = spawn(info.code, oversampled, &mut pool);
            let p = arena.processor_mut().expect("spawned");
            let input = [0.25; BLOCK_SIZE];
            let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
            for _ in 0..32 {
                if info.capabilities.contains(Capabilities::STEREO_TO_STEREO) {
                    p.process_stereo(&input, &input, &mut l, &mut r, &ctx);
                } else {
                    p.process_mono_to_stereo(&input, &mut l, &mut r, &ctx);
                }
                assert!(l.iter().chain(&r).all(|s| s.is_finite()), "{}", info.name);
            }
            arena.unspawn(Some(&mut pool));
        }
    }
}

#[test]
fn codes_module_matches_table() {
    for code in [
        codes::AMPLIFIER,
        codes::VOLUME_PAN,
        codes::STEREO_WIDTH,
        codes::WAVESHAPER,
        codes::BIQUAD_FILTER,
        codes::BITCRUSHER,
        codes::RING_MODULATOR,
        codes::TREMOLO,
        codes::SIMPLE_DELAY,
        codes::NOISE,
    ] {
        assert!(type_info(code).is_some(), "{code}");
    }
    assert_eq!(all_descriptions().len(), 11);
}

proptest! {
    #[test]
    fn arbitrary_codes_never_misbehave(raw in any::<u16>()) {
        let code = ProcessorTypeCode(raw);
        let mut pool = MemoryPool::new();
        let arena = spawn(code, false, &mut pool);
        prop_assert_eq!(arena.is_occupied(), is_implemented(code) && !code.is_none());
        let storage = default_storage(code);
        if is_implemented(code) {
            prop_assert_eq!(storage.type_code, code);
        } else {
            prop_assert!(storage.type_code.is_none());
        }
    }
}
