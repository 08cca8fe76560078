//! File rendering through a processor chain.

use crate::commands::common::{level_db, load_preset, peak, rms};
use crate::wav::{Audio, read_wav, write_wav};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use strata_chain::{ChainConfig, SLOT_COUNT, Topology};
use strata_core::{BLOCK_SIZE, BlockContext, MemoryPool, StereoBlock};
use strata_registry::max_scratch_len;

#[derive(Args)]
pub struct RenderArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Factory preset name or preset file (TOML)
    #[arg(short, long)]
    preset: String,

    /// Override the preset's routing
    #[arg(short, long)]
    topology: Option<Topology>,

    /// Run processors at twice the file's sample rate
    #[arg(long)]
    oversample: bool,

    /// Render as a voice chain (group-only processors are dropped)
    #[arg(long)]
    voice: bool,

    /// Tempo in BPM for temposynced parameters
    #[arg(long, default_value = "120")]
    tempo: f32,

    /// Pitch in semitones for keytracked parameters
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pitch: f32,

    /// Seconds of silence appended to let tails ring out
    #[arg(long, default_value = "0")]
    tail: f32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

/// Per-channel output of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
    /// Whether any block came out stereo.
    pub stereo: bool,
}

/// Runs `left`/`right` through `chain` block by block. The final partial
/// block is zero-padded and trimmed from the output.
pub fn render(
    chain: &mut strata_chain::ProcessorChain,
    left: &[f32],
    right: Option<&[f32]>,
    ctx: &BlockContext,
    mut progress: impl FnMut(usize),
) -> Rendered {
    let frames = left.len();
    let mut out = Rendered {
        left: Vec::with_capacity(frames),
        right: Vec::with_capacity(frames),
        stereo: right.is_some(),
    };

    let mut start = 0;
    while start < frames {
        let len = BLOCK_SIZE.min(frames - start);
        let mut l = [0.0; BLOCK_SIZE];
        l[..len].copy_from_slice(&left[start..start + len]);
        let mut block = match right {
            Some(right) => {
                let mut r = [0.0; BLOCK_SIZE];
                r[..len].copy_from_slice(&right[start..start + len]);
                StereoBlock::from_stereo(&l, &r)
            }
            None => StereoBlock::from_mono(&l),
        };

        chain.process_block(&mut block, ctx);

        out.stereo |= block.is_stereo();
        out.left.extend_from_slice(&block.left[..len]);
        if block.is_stereo() {
            out.right.extend_from_slice(&block.right[..len]);
        } else {
            out.right.extend_from_slice(&block.left[..len]);
        }
        start += len;
        progress(start);
    }
    out
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let mut audio = read_wav(&args.input)?;
    let sample_rate = audio.sample_rate as f32;
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        audio.len(),
        audio.channels(),
        audio.sample_rate,
        audio.len() as f32 / sample_rate
    );

    let tail = (args.tail.max(0.0) * sample_rate) as usize;
    audio.left.resize(audio.len() + tail, 0.0);
    if let Some(right) = audio.right.as_mut() {
        right.resize(right.len() + tail, 0.0);
    }

    let preset = load_preset(&args.preset)?;
    println!("Loading preset: {}", preset.name);

    let mut pool = MemoryPool::new();
    pool.preallocate(max_scratch_len(sample_rate, args.oversample), SLOT_COUNT);
    let config = ChainConfig {
        sample_rate,
        oversampled: args.oversample,
        group: !args.voice,
        topology: preset.topology,
    };
    let (mut chain, warnings) = preset.build_chain(config, Some(&mut pool));
    for warning in &warnings {
        println!("  warning: {warning}");
    }
    if let Some(topology) = args.topology {
        chain.set_topology(topology);
    }

    println!("Routing: {} ({})", chain.topology(), chain.topology().diagram());
    for (i, slot) in chain.slots().iter().enumerate() {
        println!("  slot {i}: {}", strata_registry::name(slot.code()));
    }

    let pb = ProgressBar::new(audio.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let ctx = BlockContext {
        pitch: args.pitch,
        tempo_bpm: args.tempo,
    };
    let rendered = render(
        &mut chain,
        &audio.left,
        audio.right.as_deref(),
        &ctx,
        |pos| pb.set_position(pos as u64),
    );
    pb.finish_with_message("done");
    chain.clear(Some(&mut pool));

    let input_all: Vec<f32> = audio
        .left
        .iter()
        .chain(audio.right.iter().flatten())
        .copied()
        .collect();
    let output_all: Vec<f32> = rendered.left.iter().chain(&rendered.right).copied().collect();
    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        level_db(rms(&input_all)),
        level_db(peak(&input_all))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        level_db(rms(&output_all)),
        level_db(peak(&output_all))
    );

    let out = Audio {
        sample_rate: audio.sample_rate,
        right: rendered.stereo.then_some(rendered.right),
        left: rendered.left,
    };
    println!("\nWriting {} ({} channel(s))...", args.output.display(), out.channels());
    write_wav(&args.output, &out, args.bit_depth)?;
    println!("Done!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_core::LiveStorage;
    use strata_registry::{codes, default_storage};

    fn chain_of(code: strata_core::ProcessorTypeCode) -> strata_chain::ProcessorChain {
        let storage = core::array::from_fn(|i| {
            let c = if i == 0 { code } else { strata_core::ProcessorTypeCode::NONE };
            Arc::new(LiveStorage::new(&default_storage(c)))
        });
        strata_chain::ProcessorChain::new(ChainConfig::default(), storage, None)
    }

    #[test]
    fn partial_blocks_are_trimmed() {
        let mut chain = chain_of(strata_core::ProcessorTypeCode::NONE);
        let input: Vec<f32> = (0..37).map(|i| i as f32 * 0.01).collect();
        let mut calls = 0;
        let out = render(&mut chain, &input, None, &BlockContext::default(), |_| calls += 1);
        assert_eq!(out.left, input);
        assert_eq!(out.right, input);
        assert!(!out.stereo);
        assert_eq!(calls, 3);
    }

    #[test]
    fn widening_chain_reports_stereo() {
        let mut chain = chain_of(codes::VOLUME_PAN);
        let input = vec![0.5; 64];
        let out = render(&mut chain, &input, None, &BlockContext::default(), |_| {});
        assert!(out.stereo);
        assert_eq!(out.left.len(), 64);
        assert_eq!(out.right.len(), 64);
    }

    #[test]
    fn stereo_input_stays_stereo() {
        let mut chain = chain_of(codes::AMPLIFIER);
        let left = vec![0.25; 20];
        let right = vec![-0.25; 20];
        let out = render(&mut chain, &left, Some(&right), &BlockContext::default(), |_| {});
        assert!(out.stereo);
        assert!(out.left.iter().all(|s| (s - 0.25).abs() < 1e-6));
        assert!(out.right.iter().all(|s| (s + 0.25).abs() < 1e-6));
    }
}
