//! Property-based tests over the whole processor set.
//!
//! Every processor must produce finite output for any in-range parameters and
//! any input in `[-1, 1]`, and `reset` must make processing repeatable.

use proptest::prelude::*;
use std::sync::Arc;
use strata_core::{
    BLOCK_SIZE, BlockContext, Capabilities, LiveStorage, MAX_FLOAT_PARAMS, MAX_INT_PARAMS,
    MemoryPool, Processor, ProcessorStorage, ProcessorType, SpawnContext,
};
use strata_processors::{
    Amplifier, BiquadFilter, Bitcrusher, NoiseGenerator, RingModulator, SimpleDelay, StereoWidth,
    Tremolo, VolumePan, Waveshaper,
};

const SAMPLE_RATE: f32 = 48000.0;

type Block = [f32; BLOCK_SIZE];

/// Spawns `T` with normalized parameter positions mapped into each range.
fn spawn_with<T: ProcessorType>(
    floats: &[f32; MAX_FLOAT_PARAMS],
    ints: &[f32; MAX_INT_PARAMS],
    pool: &mut MemoryPool,
) -> T {
    let storage = Arc::new(LiveStorage::default());
    let ctx = |needs_metadata| SpawnContext {
        storage: Arc::clone(&storage),
        sample_rate: SAMPLE_RATE,
        needs_metadata,
    };
    let desc = T::spawn(ctx(true)).control_description();
    let mut values = ProcessorStorage::default();
    desc.write_defaults(&mut values);
    for (i, d) in desc.floats.iter().enumerate() {
        if let Some(d) = d {
            values.floats[i] = d.min + floats[i] * (d.max - d.min);
        }
    }
    for (i, d) in desc.ints.iter().enumerate() {
        if let Some(d) = d {
            values.ints[i] = d.min + (ints[i] * (d.max - d.min) as f32).round() as i32;
        }
    }
    storage.store(&values);

    let mut p = T::spawn(ctx(false));
    let len = T::scratch_len(SAMPLE_RATE);
    if len > 0 {
        pool.preallocate(len, 1);
        let block = pool.checkout(len).expect("preallocated");
        assert!(p.attach_scratch(block).is_none());
    }
    p
}

/// Runs the processor's widest configuration for `blocks` blocks.
fn render(p: &mut impl Processor, input: &Block, blocks: usize) -> Vec<f32> {
    let ctx = BlockContext::default();
    let mut out = Vec::with_capacity(blocks * BLOCK_SIZE * 2);
    for _ in 0..blocks {
        let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
        let caps = p.capabilities();
        if caps.contains(Capabilities::STEREO_TO_STEREO) {
            p.process_stereo(input, input, &mut l, &mut r, &ctx);
        } else if caps.contains(Capabilities::MONO_TO_STEREO) {
            p.process_mono_to_stereo(input, &mut l, &mut r, &ctx);
        } else {
            p.process_mono(input, &mut l, &ctx);
        }
        out.extend_from_slice(&l);
        out.extend_from_slice(&r);
    }
    out
}

fn check<T: ProcessorType>(
    floats: &[f32; MAX_FLOAT_PARAMS],
    ints: &[f32; MAX_INT_PARAMS],
    input: &Block,
) -> Result<(), TestCaseError> {
    let mut pool = MemoryPool::new();
    let mut p = spawn_with::<T>(floats, ints, &mut pool);

    let warmup = render(&mut p, input, 8);
    prop_assert!(warmup.iter().all(|s| s.is_finite()), "{} non-finite", T::NAME);

    p.reset();
    let a = render(&mut p, input, 8);
    p.reset();
    let b = render(&mut p, input, 8);
    prop_assert_eq!(a, b, "{} not repeatable after reset", T::NAME);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn all_processors_finite_and_resettable(
        floats in prop::array::uniform9(0.0f32..=1.0f32),
        ints in prop::array::uniform4(0.0f32..=1.0f32),
        input in prop::array::uniform16(-1.0f32..=1.0f32),
    ) {
        check::<Amplifier>(&floats, &ints, &input)?;
        check::<VolumePan>(&floats, &ints, &input)?;
        check::<StereoWidth>(&floats, &ints, &input)?;
        check::<Waveshaper>(&floats, &ints, &input)?;
        check::<BiquadFilter>(&floats, &ints, &input)?;
        check::<Bitcrusher>(&floats, &ints, &input)?;
        check::<RingModulator>(&floats, &ints, &input)?;
        check::<Tremolo>(&floats, &ints, &input)?;
        check::<SimpleDelay>(&floats, &ints, &input)?;
        check::<NoiseGenerator>(&floats, &ints, &input)?;
    }
}
