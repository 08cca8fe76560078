//! Extreme parameter tests for every strata processor.
//!
//! Verifies that each processor produces finite output in every channel
//! configuration it advertises when its parameters sit at their minimum or
//! maximum, including at extreme sample rates (8 kHz and 192 kHz).

use std::sync::Arc;
use strata_core::{
    BLOCK_SIZE, BlockContext, Capabilities, LiveStorage, MemoryPool, Processor, ProcessorStorage,
    ProcessorType, SpawnContext,
};
use strata_processors::{
    Amplifier, BiquadFilter, Bitcrusher, NoiseGenerator, RingModulator, SimpleDelay, StereoWidth,
    Tremolo, VolumePan, Waveshaper,
};

const DEFAULT_SAMPLE_RATE: f32 = 48000.0;
const LOW_SAMPLE_RATE: f32 = 8000.0;
const HIGH_SAMPLE_RATE: f32 = 192000.0;
const NUM_BLOCKS: usize = 200;

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

/// Spawns `T` with every parameter at one extreme and a pool block attached.
fn spawn_at<T: ProcessorType>(
    sample_rate: f32,
    extreme: Extreme,
    pool: &mut MemoryPool,
) -> (T, Arc<LiveStorage>) {
    let storage = Arc::new(LiveStorage::default());
    let ctx = |needs_metadata| SpawnContext {
        storage: Arc::clone(&storage),
        sample_rate,
        needs_metadata,
    };
    let desc = T::spawn(ctx(true)).control_description();
    let mut values = ProcessorStorage::default();
    desc.write_defaults(&mut values);
    for (i, d) in desc.floats.iter().enumerate() {
        if let Some(d) = d {
            values.floats[i] = match extreme {
                Extreme::Min => d.min,
                Extreme::Max => d.max,
            };
        }
    }
    for (i, d) in desc.ints.iter().enumerate() {
        if let Some(d) = d {
            values.ints[i] = match extreme {
                Extreme::Min => d.min,
                Extreme::Max => d.max,
            };
        }
    }
    storage.store(&values);

    let mut processor = T::spawn(ctx(false));
    let len = T::scratch_len(sample_rate);
    if len > 0 {
        pool.preallocate(len, 1);
        let block = pool.checkout(len).expect("preallocated");
        assert!(processor.attach_scratch(block).is_none());
    }
    (processor, storage)
}

fn test_signal(block: usize) -> [f32; BLOCK_SIZE] {
    core::array::from_fn(|n| match (block * BLOCK_SIZE + n) % 3 {
        0 => 0.5,
        1 => -0.5,
        _ => 0.0,
    })
}

/// Runs every advertised channel configuration and asserts finite output.
fn assert_finite_output(p: &mut impl Processor, label: &str) {
    let caps = p.capabilities();
    let ctx = BlockContext::default();
    for b in 0..NUM_BLOCKS {
        let input = test_signal(b);
        let mut outputs: Vec<[f32; BLOCK_SIZE]> = Vec::new();
        if caps.contains(Capabilities::MONO_TO_MONO) {
            let mut out = [0.0; BLOCK_SIZE];
            p.process_mono(&input, &mut out, &ctx);
            outputs.push(out);
        }
        if caps.contains(Capabilities::MONO_TO_STEREO) {
            let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
            p.process_mono_to_stereo(&input, &mut l, &mut r, &ctx);
            outputs.extend([l, r]);
        }
        if caps.contains(Capabilities::STEREO_TO_STEREO) {
            let (mut l, mut r) = ([0.0; BLOCK_SIZE], [0.0; BLOCK_SIZE]);
            p.process_stereo(&input, &input, &mut l, &mut r, &ctx);
            outputs.extend([l, r]);
        }
        for out in &outputs {
            for (n, s) in out.iter().enumerate() {
                assert!(s.is_finite(), "{label}: non-finite output at block {b} sample {n}: {s}");
            }
        }
    }
}

fn run_extreme_test<T: ProcessorType>() {
    for sample_rate in [DEFAULT_SAMPLE_RATE, LOW_SAMPLE_RATE, HIGH_SAMPLE_RATE] {
        for extreme in [Extreme::Min, Extreme::Max] {
            let mut pool = MemoryPool::new();
            let (mut p, storage) = spawn_at::<T>(sample_rate, extreme, &mut pool);
            let which = match extreme {
                Extreme::Min => "min",
                Extreme::Max => "max",
            };
            assert_finite_output(&mut p, &format!("{} {which} @ {sample_rate}", T::NAME));

            // temposync and keytrack flags must not break anything either
            storage.set_temposync(true);
            p.reset();
            assert_finite_output(&mut p, &format!("{} {which} synced @ {sample_rate}", T::NAME));
        }
    }
}

#[test]
fn amplifier_extreme_params() {
    run_extreme_test::<Amplifier>();
}

#[test]
fn volume_pan_extreme_params() {
    run_extreme_test::<VolumePan>();
}

#[test]
fn stereo_width_extreme_params() {
    run_extreme_test::<StereoWidth>();
}

#[test]
fn waveshaper_extreme_params() {
    run_extreme_test::<Waveshaper>();
}

#[test]
fn biquad_filter_extreme_params() {
    run_extreme_test::<BiquadFilter>();
}

#[test]
fn bitcrusher_extreme_params() {
    run_extreme_test::<Bitcrusher>();
}

#[test]
fn ring_modulator_extreme_params() {
    run_extreme_test::<RingModulator>();
}

#[test]
fn tremolo_extreme_params() {
    run_extreme_test::<Tremolo>();
}

#[test]
fn simple_delay_extreme_params() {
    run_extreme_test::<SimpleDelay>();
}

#[test]
fn noise_extreme_params() {
    run_extreme_test::<NoiseGenerator>();
}
