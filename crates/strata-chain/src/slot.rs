//! One position of a chain: an arena, its bound storage, and the per-slot
//! smoothing state.
//!
//! [`Slot::process`] is the single-slot primitive every topology is built
//! from. It runs the hosted processor against a block in place, crossfades
//! between the dry input and the processor output with the ramped mix, and
//! scales by the ramped output level. An empty slot, a fully bypassed slot,
//! and a processor that cannot accept the block's channel shape all leave the
//! block untouched.
//!
//! Two more ramps make engaging and leaving click-free. `engaged` fades the
//! processor in and out against the dry signal (bypass, new processors).
//! `presence` is the slot's weight in a parallel sum. A slot leaving fades
//! to dry first and only then loses its weight; a slot joining gains its
//! weight while still dry and only then engages. A slot is muted once its
//! presence has settled at zero.

use crate::Arc;
use strata_core::{
    BLOCK_SIZE, BLOCK_SIZE_INV, BlockContext, BlockRamp, Capabilities, LiveStorage, MemoryPool,
    Processor, ProcessorTypeCode, StereoBlock, db_to_linear, wet_dry_mix,
};
use strata_registry::{ProcessorArena, SpawnRequest};

/// How a processor is driven for the current block shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Mono,
    MonoToStereo,
    WidenThenStereo,
    Stereo,
}

impl Route {
    fn select(caps: Capabilities, stereo: bool) -> Option<Self> {
        if stereo {
            caps.contains(Capabilities::STEREO_TO_STEREO).then_some(Self::Stereo)
        } else if caps.contains(Capabilities::MONO_TO_MONO) {
            Some(Self::Mono)
        } else if caps.contains(Capabilities::MONO_TO_STEREO) {
            Some(Self::MonoToStereo)
        } else if caps.contains(Capabilities::STEREO_TO_STEREO) {
            Some(Self::WidenThenStereo)
        } else {
            None
        }
    }
}

/// A chain position hosting at most one processor.
#[derive(Debug)]
pub struct Slot {
    arena: ProcessorArena,
    storage: Arc<LiveStorage>,
    code: ProcessorTypeCode,
    capabilities: Capabilities,
    mix: BlockRamp,
    level: BlockRamp,
    // 1 = processor engaged, 0 = dry
    engaged: BlockRamp,
    // weight in a parallel sum
    presence: BlockRamp,
    weights: [f32; BLOCK_SIZE],
    dry: StereoBlock,
    wet: StereoBlock,
    last_frame: (f32, f32),
    swap_from: Option<(f32, f32)>,
}

impl Slot {
    /// An empty slot bound to `storage`. Nothing is spawned until
    /// [`respawn`](Self::respawn).
    pub fn new(storage: Arc<LiveStorage>) -> Self {
        let mix = storage.mix().clamp(0.0, 1.0);
        let level = db_to_linear(storage.output_level_db());
        Self {
            arena: ProcessorArena::new(),
            storage,
            code: ProcessorTypeCode::NONE,
            capabilities: Capabilities::NONE,
            mix: BlockRamp::new(mix),
            level: BlockRamp::new(level),
            engaged: BlockRamp::new(0.0),
            presence: BlockRamp::new(0.0),
            weights: [0.0; BLOCK_SIZE],
            dry: StereoBlock::silent_mono(),
            wet: StereoBlock::silent_mono(),
            last_frame: (0.0, 0.0),
            swap_from: None,
        }
    }

    /// Storage the control thread writes to.
    pub fn storage(&self) -> &Arc<LiveStorage> {
        &self.storage
    }

    /// Type currently hosted ("none" when empty).
    pub fn code(&self) -> ProcessorTypeCode {
        self.code
    }

    /// Channel configurations of the hosted processor.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The hosted processor, if any.
    pub fn processor(&self) -> Option<&strata_registry::AnyProcessor> {
        self.arena.processor()
    }

    /// Whether the slot hosts a processor that is not bypassed.
    fn contributing(&self) -> bool {
        self.arena.is_occupied() && !self.storage.is_bypassed()
    }

    fn presence_target(&self) -> f32 {
        if self.contributing() || self.engaged.current() > 0.0 || self.swap_from.is_some() {
            1.0
        } else {
            0.0
        }
    }

    /// Whether the slot contributes nothing to a parallel sum: no processor
    /// or bypassed, with every fade finished.
    pub fn is_muted(&self) -> bool {
        self.presence.current() == 0.0 && self.presence_target() == 0.0
    }

    /// Per-sample weight of this slot in a parallel sum, for the block last
    /// passed to [`process`](Self::process).
    pub fn weights(&self) -> &[f32; BLOCK_SIZE] {
        &self.weights
    }

    /// Replaces the hosted processor with `code` between blocks.
    ///
    /// The old processor's scratch memory goes back to `pool`; the new one's
    /// is checked out of it (or queued if `pool` is `None`). If the old
    /// processor was engaged, the next block crossfades from the slot's last
    /// output frame; otherwise the new processor fades in from dry.
    pub fn respawn(
        &mut self,
        code: ProcessorTypeCode,
        sample_rate: f32,
        oversampled: bool,
        mut pool: Option<&mut MemoryPool>,
    ) {
        let was_engaged = self.arena.is_occupied() && self.engaged.current() > 0.0;
        if self.arena.is_occupied() {
            self.arena.unspawn(pool.as_deref_mut());
        }
        let spawned = self.arena.spawn_in_place(
            SpawnRequest {
                code,
                storage: &self.storage,
                sample_rate,
                oversampled,
                needs_metadata: false,
            },
            pool,
        );
        if spawned {
            self.code = code;
            self.capabilities = self
                .arena
                .processor()
                .map_or(Capabilities::NONE, Processor::capabilities);
        } else {
            self.code = ProcessorTypeCode::NONE;
            self.capabilities = Capabilities::NONE;
            self.engaged.snap(0.0);
        }
        self.swap_from = was_engaged.then_some(self.last_frame);
    }

    /// Checks out scratch memory queued while no pool was attached.
    pub fn attach_pool(&mut self, pool: &mut MemoryPool) {
        self.arena.attach_pool(pool);
    }

    /// Drops the hosted processor, returning its memory to `pool`.
    pub fn clear(&mut self, pool: Option<&mut MemoryPool>) {
        if self.arena.is_occupied() {
            self.arena.unspawn(pool);
        }
        self.code = ProcessorTypeCode::NONE;
        self.capabilities = Capabilities::NONE;
        self.engaged.snap(0.0);
        self.presence.snap(0.0);
        self.swap_from = None;
    }

    /// Clears processor state and settles every ramp on its target.
    pub fn reset(&mut self) {
        if let Some(p) = self.arena.processor_mut() {
            p.reset();
        }
        let on = if self.contributing() { 1.0 } else { 0.0 };
        self.mix.snap(self.storage.mix().clamp(0.0, 1.0));
        self.level.snap(db_to_linear(self.storage.output_level_db()));
        self.engaged.snap(on);
        self.presence.snap(on);
        self.last_frame = (0.0, 0.0);
        self.swap_from = None;
    }

    /// Runs the slot on `block` in place and advances its presence weight.
    pub fn process(&mut self, block: &mut StereoBlock, ctx: &BlockContext) {
        let engage = self.contributing() && self.presence.current() == 1.0;
        self.weights = self.presence.next_block(self.presence_target());
        self.run(block, ctx, if engage { 1.0 } else { 0.0 });
        if let Some(held) = self.swap_from.take() {
            fade_from_frame(block, held);
        }
        self.last_frame = block.last_frame();
    }

    fn run(&mut self, block: &mut StereoBlock, ctx: &BlockContext, engaged_target: f32) {
        if !self.arena.is_occupied() {
            return;
        }
        let mix_target = self.storage.mix().clamp(0.0, 1.0);
        let level_target = db_to_linear(self.storage.output_level_db());
        let idle = engaged_target == 0.0 && self.engaged.current() == 0.0;
        let route = Route::select(self.capabilities, block.is_stereo());
        let (Some(route), false) = (route, idle) else {
            self.mix.snap(mix_target);
            self.level.snap(level_target);
            self.engaged.snap(engaged_target);
            return;
        };
        let Some(processor) = self.arena.processor_mut() else {
            return;
        };

        self.dry.copy_from(block);
        let wet = &mut self.wet;
        match route {
            Route::Stereo => {
                processor.process_stereo(
                    &block.left,
                    &block.right,
                    &mut wet.left,
                    &mut wet.right,
                    ctx,
                );
                wet.mark_stereo();
            }
            Route::Mono => {
                processor.process_mono(&block.left, &mut wet.left, ctx);
                *wet = StereoBlock::from_mono(&wet.left);
            }
            Route::MonoToStereo => {
                processor.process_mono_to_stereo(&block.left, &mut wet.left, &mut wet.right, ctx);
                wet.mark_stereo();
                self.dry.widen();
            }
            Route::WidenThenStereo => {
                self.dry.widen();
                processor.process_stereo(
                    &self.dry.left,
                    &self.dry.right,
                    &mut wet.left,
                    &mut wet.right,
                    ctx,
                );
                wet.mark_stereo();
            }
        }

        let mix = self.mix.next_block(mix_target);
        let level = self.level.next_block(level_target);
        let active = self.engaged.next_block(engaged_target);

        if wet.is_stereo() {
            block.widen();
        }
        for n in 0..BLOCK_SIZE {
            let m = mix[n] * active[n];
            let g = wet_dry_mix(1.0, level[n], active[n]);
            block.left[n] = wet_dry_mix(self.dry.left[n], wet.left[n], m) * g;
            if block.is_stereo() {
                block.right[n] = wet_dry_mix(self.dry.right[n], wet.right[n], m) * g;
            }
        }
    }
}

/// Crossfades the start of `block` from a held frame into the block's own
/// samples over one block.
fn fade_from_frame(block: &mut StereoBlock, (held_left, held_right): (f32, f32)) {
    if held_left != held_right {
        block.widen();
    }
    for n in 0..BLOCK_SIZE {
        let t = (n + 1) as f32 * BLOCK_SIZE_INV;
        block.left[n] = wet_dry_mix(held_left, block.left[n], t);
        if block.is_stereo() {
            block.right[n] = wet_dry_mix(held_right, block.right[n], t);
        }
    }
}
