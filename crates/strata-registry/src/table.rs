//! The processor table: one line per concrete type.
//!
//! [`processor_table!`] expands a list of `code => Variant(Type)` entries into
//! the static metadata table indexed by type code, the two dispatch enums
//! (base rate and oversampled), and a compile-time size check per type.
//! Adding a processor means adding one line here.

use strata_core::{
    BLOCK_SIZE, BlockContext, Capabilities, OVERSAMPLE_FACTOR, Oversampled, PoolBlock, Processor,
    ProcessorControlDescription, ProcessorType, ProcessorTypeCode, RemapFn, SpawnContext,
};
use strata_processors::{
    Amplifier, BiquadFilter, Bitcrusher, NoiseGenerator, RingModulator, SimpleDelay, StereoWidth,
    Tremolo, VolumePan, Waveshaper,
};

/// Bytes reserved per arena. Every concrete type, oversampled or not, must
/// fit; the build fails otherwise.
pub const PROCESSOR_ARENA_BYTES: usize = 2048;

/// Static metadata for one processor type, readable without an instance.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// Code the entry is stored under.
    pub code: ProcessorTypeCode,
    /// Display name.
    pub name: &'static str,
    /// Stable name written to patches.
    pub streaming_name: &'static str,
    /// Group used to sort the type list.
    pub display_group: &'static str,
    /// Float parameters in use.
    pub float_param_count: usize,
    /// Integer parameters in use.
    pub int_param_count: usize,
    /// Channel configurations implemented.
    pub capabilities: Capabilities,
    /// Mix applied when the type is selected.
    pub default_mix: f32,
    /// Only available on group chains.
    pub group_only: bool,
    /// Current parameter layout version.
    pub streaming_version: u16,
    /// Upgrade hook for older layouts.
    pub remap: Option<RemapFn>,
    /// Pool scratch samples needed at a given sample rate.
    pub scratch_len: fn(f32) -> usize,
}

fn no_scratch(_sample_rate: f32) -> usize {
    0
}

impl TypeInfo {
    /// The identity passthrough.
    pub const NONE: Self = Self {
        code: ProcessorTypeCode::NONE,
        name: "None",
        streaming_name: "none",
        display_group: "",
        float_param_count: 0,
        int_param_count: 0,
        capabilities: Capabilities::ALL,
        default_mix: 1.0,
        group_only: false,
        streaming_version: 1,
        remap: None,
        scratch_len: no_scratch,
    };

    const fn of<T: ProcessorType>(code: u16) -> Self {
        Self {
            code: ProcessorTypeCode(code),
            name: T::NAME,
            streaming_name: T::STREAMING_NAME,
            display_group: T::DISPLAY_GROUP,
            float_param_count: T::FLOAT_PARAM_COUNT,
            int_param_count: T::INT_PARAM_COUNT,
            capabilities: T::CAPABILITIES,
            default_mix: T::DEFAULT_MIX,
            group_only: T::GROUP_ONLY,
            streaming_version: T::STREAMING_VERSION,
            remap: T::REMAP,
            scratch_len: T::scratch_len,
        }
    }
}

const fn table_len(codes: &[u16]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < codes.len() {
        if codes[i] as usize > max {
            max = codes[i] as usize;
        }
        i += 1;
    }
    max + 1
}

/// Implements [`Processor`] for an enum whose variants all hold processors.
macro_rules! forward_processor {
    ($enum:ident { $($variant:ident),* $(,)? }) => {
        impl Processor for $enum {
            fn capabilities(&self) -> Capabilities {
                match self { $(Self::$variant(p) => p.capabilities(),)* }
            }

            fn process_mono(
                &mut self,
                input: &[f32; BLOCK_SIZE],
                output: &mut [f32; BLOCK_SIZE],
                ctx: &BlockContext,
            ) {
                match self { $(Self::$variant(p) => p.process_mono(input, output, ctx),)* }
            }

            fn process_mono_to_stereo(
                &mut self,
                input: &[f32; BLOCK_SIZE],
                left: &mut [f32; BLOCK_SIZE],
                right: &mut [f32; BLOCK_SIZE],
                ctx: &BlockContext,
            ) {
                match self {
                    $(Self::$variant(p) => p.process_mono_to_stereo(input, left, right, ctx),)*
                }
            }

            fn process_stereo(
                &mut self,
                in_left: &[f32; BLOCK_SIZE],
                in_right: &[f32; BLOCK_SIZE],
                out_left: &mut [f32; BLOCK_SIZE],
                out_right: &mut [f32; BLOCK_SIZE],
                ctx: &BlockContext,
            ) {
                match self {
                    $(Self::$variant(p) => {
                        p.process_stereo(in_left, in_right, out_left, out_right, ctx)
                    })*
                }
            }

            fn reset(&mut self) {
                match self { $(Self::$variant(p) => p.reset(),)* }
            }

            fn control_description(&self) -> ProcessorControlDescription {
                match self { $(Self::$variant(p) => p.control_description(),)* }
            }

            fn attach_scratch(&mut self, block: PoolBlock) -> Option<PoolBlock> {
                match self { $(Self::$variant(p) => p.attach_scratch(block),)* }
            }

            fn detach_scratch(&mut self) -> Option<PoolBlock> {
                match self { $(Self::$variant(p) => p.detach_scratch(),)* }
            }
        }
    };
}

macro_rules! processor_table {
    ($($code:literal => $variant:ident($ty:ty)),* $(,)?) => {
        const TABLE_LEN: usize = table_len(&[$($code),*]);

        /// Metadata indexed by raw type code; `None` marks retired or unused codes.
        pub(crate) static TABLE: [Option<TypeInfo>; TABLE_LEN] = {
            let mut table = [None; TABLE_LEN];
            table[0] = Some(TypeInfo::NONE);
            $(
                assert!(table[$code].is_none(), "duplicate processor type code");
                table[$code] = Some(TypeInfo::of::<$ty>($code));
            )*
            table
        };

        $(
            const _: () = assert!(
                core::mem::size_of::<$ty>() <= PROCESSOR_ARENA_BYTES
                    && core::mem::size_of::<Oversampled<$ty>>() <= PROCESSOR_ARENA_BYTES,
                concat!(stringify!($ty), " does not fit in a processor arena"),
            );
        )*

        /// A processor running at the base sample rate.
        #[derive(Debug)]
        #[allow(missing_docs)]
        pub enum BaseProcessor {
            $($variant($ty),)*
        }

        /// A processor running inside a 2x oversampler.
        #[derive(Debug)]
        #[allow(missing_docs)]
        pub enum OversampledProcessor {
            $($variant(Oversampled<$ty>),)*
        }

        impl BaseProcessor {
            fn spawn(code: ProcessorTypeCode, ctx: SpawnContext) -> Option<Self> {
                match code.raw() {
                    $($code => Some(Self::$variant(<$ty as ProcessorType>::spawn(ctx))),)*
                    _ => None,
                }
            }

            fn code(&self) -> ProcessorTypeCode {
                match self { $(Self::$variant(_) => ProcessorTypeCode($code),)* }
            }
        }

        impl OversampledProcessor {
            fn spawn(code: ProcessorTypeCode, ctx: SpawnContext) -> Option<Self> {
                match code.raw() {
                    $($code => Some(Self::$variant(Oversampled::new(
                        <$ty as ProcessorType>::spawn(ctx),
                    ))),)*
                    _ => None,
                }
            }

            fn code(&self) -> ProcessorTypeCode {
                match self { $(Self::$variant(_) => ProcessorTypeCode($code),)* }
            }
        }

        forward_processor!(BaseProcessor { $($variant),* });
        forward_processor!(OversampledProcessor { $($variant),* });
    };
}

// Code 7 belonged to a retired type and must not be reused.
processor_table! {
    1 => Amplifier(Amplifier),
    2 => VolumePan(VolumePan),
    3 => StereoWidth(StereoWidth),
    4 => Waveshaper(Waveshaper),
    5 => BiquadFilter(BiquadFilter),
    6 => Bitcrusher(Bitcrusher),
    8 => RingModulator(RingModulator),
    9 => Tremolo(Tremolo),
    10 => SimpleDelay(SimpleDelay),
    11 => NoiseGenerator(NoiseGenerator),
}

/// A live processor of any registered type, at base or oversampled rate.
#[derive(Debug)]
pub enum AnyProcessor {
    /// Runs at the chain's sample rate.
    Base(BaseProcessor),
    /// Runs at `OVERSAMPLE_FACTOR` times the chain's sample rate.
    Oversampled(OversampledProcessor),
}

impl AnyProcessor {
    /// Constructs the processor registered under `code`.
    ///
    /// Returns `None` for "none" and for unknown or retired codes. When
    /// `oversampled` is set the processor is spawned at the multiplied rate
    /// and wrapped in the resampler.
    pub fn spawn(code: ProcessorTypeCode, ctx: SpawnContext, oversampled: bool) -> Option<Self> {
        if oversampled {
            let ctx = SpawnContext {
                sample_rate: ctx.sample_rate * OVERSAMPLE_FACTOR as f32,
                ..ctx
            };
            OversampledProcessor::spawn(code, ctx).map(Self::Oversampled)
        } else {
            BaseProcessor::spawn(code, ctx).map(Self::Base)
        }
    }

    /// Type code of the hosted processor.
    pub fn code(&self) -> ProcessorTypeCode {
        match self {
            Self::Base(p) => p.code(),
            Self::Oversampled(p) => p.code(),
        }
    }

    /// Whether the processor runs inside the oversampler.
    pub fn is_oversampled(&self) -> bool {
        matches!(self, Self::Oversampled(_))
    }
}

forward_processor!(AnyProcessor { Base, Oversampled });
