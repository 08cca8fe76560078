//! The topology router.
//!
//! [`ProcessorChain`] owns four [`Slot`]s and evaluates them once per block
//! according to its [`Topology`]. Two primitives build every topology:
//! [`Slot::process`] for a single slot in series, and a parallel group that
//! runs each non-muted member on its own copy of the same input and sums the
//! results scaled by one over the active count.
//!
//! The active count is a per-sample sum of the members' presence weights, so
//! a member joining or leaving the group ramps the divisor (and the `Par2`
//! both-pairs gain) over one block. While the weights add up to less than one
//! the remainder is made up with the dry input.
//!
//! Evaluation never fails, allocates or locks. Type changes requested through
//! the slots' storage are applied by [`ProcessorChain::apply_pending`], which
//! the owner calls between blocks.

use crate::{Arc, Slot, Topology};
use strata_core::{
    BLOCK_SIZE, BlockContext, LiveStorage, MemoryPool, ProcessorStorage, ProcessorTypeCode,
    StereoBlock,
};
use strata_registry::{default_storage, is_group_only, is_implemented};

/// Number of slots per chain.
pub const SLOT_COUNT: usize = 4;

/// Fixed gain applied to `Par2` when both serial pairs are populated.
pub const PAR2_BOTH_GAIN: f32 = 0.5;

/// Construction-time chain settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainConfig {
    /// Base sample rate in Hz.
    pub sample_rate: f32,
    /// Spawn oversampled processor variants.
    pub oversampled: bool,
    /// Group chains may host group-only types; voice chains may not.
    pub group: bool,
    /// Routing pattern.
    pub topology: Topology,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            oversampled: false,
            group: false,
            topology: Topology::Sequential,
        }
    }
}

/// Four slots routed by a topology.
#[derive(Debug)]
pub struct ProcessorChain {
    config: ChainConfig,
    slots: [Slot; SLOT_COUNT],
    branch: StereoBlock,
    sum: StereoBlock,
}

impl ProcessorChain {
    /// Creates a chain over existing storage and spawns whatever types the
    /// storage requests.
    ///
    /// Scratch memory is checked out of `pool` if given, otherwise queued
    /// until [`attach_pool`](Self::attach_pool).
    pub fn new(
        config: ChainConfig,
        storage: [Arc<LiveStorage>; SLOT_COUNT],
        pool: Option<&mut MemoryPool>,
    ) -> Self {
        let mut chain = Self {
            config,
            slots: storage.map(Slot::new),
            branch: StereoBlock::silent_mono(),
            sum: StereoBlock::silent_mono(),
        };
        chain.apply_pending(pool);
        chain.reset();
        chain
    }

    /// Creates a chain with four empty slots.
    pub fn empty(config: ChainConfig) -> Self {
        let storage = core::array::from_fn(|_| Arc::new(LiveStorage::default()));
        Self::new(config, storage, None)
    }

    /// Settings the chain was built with.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Current routing.
    pub fn topology(&self) -> Topology {
        self.config.topology
    }

    /// Changes the routing; takes effect from the next block.
    pub fn set_topology(&mut self, topology: Topology) {
        self.config.topology = topology;
    }

    /// Slot `index`, if in range.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// All slots in order.
    pub fn slots(&self) -> &[Slot; SLOT_COUNT] {
        &self.slots
    }

    /// Storage handle for slot `index`, for the control thread.
    pub fn storage(&self, index: usize) -> Option<Arc<LiveStorage>> {
        self.slots.get(index).map(|s| Arc::clone(s.storage()))
    }

    /// Type a slot should host, after rejecting codes this chain cannot use.
    fn resolve(&self, requested: ProcessorTypeCode) -> ProcessorTypeCode {
        if !is_implemented(requested) || (is_group_only(requested) && !self.config.group) {
            ProcessorTypeCode::NONE
        } else {
            requested
        }
    }

    /// Applies type changes requested since the last call.
    ///
    /// Must be called between blocks. Returns the number of slots whose
    /// processor was replaced.
    pub fn apply_pending(&mut self, mut pool: Option<&mut MemoryPool>) -> usize {
        let mut changed = 0;
        for index in 0..SLOT_COUNT {
            let requested = self.slots[index].storage().requested_type();
            let code = self.resolve(requested);
            if code == self.slots[index].code() {
                continue;
            }
            #[cfg(feature = "tracing")]
            if code != requested {
                tracing::warn!(
                    slot = index,
                    requested = %requested,
                    group = self.config.group,
                    "processor type unavailable on this chain, using none"
                );
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                slot = index,
                from = %self.slots[index].code(),
                to = %code,
                "slot type changed"
            );
            let ChainConfig {
                sample_rate,
                oversampled,
                ..
            } = self.config;
            self.slots[index].respawn(code, sample_rate, oversampled, pool.as_deref_mut());
            changed += 1;
        }
        changed
    }

    /// Checks out scratch memory queued by earlier spawns.
    pub fn attach_pool(&mut self, pool: &mut MemoryPool) {
        for slot in &mut self.slots {
            slot.attach_pool(pool);
        }
    }

    /// Unspawns every processor, returning scratch memory to `pool`.
    pub fn clear(&mut self, mut pool: Option<&mut MemoryPool>) {
        for slot in &mut self.slots {
            slot.clear(pool.as_deref_mut());
        }
    }

    /// Clears every processor's state and settles all ramps.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.reset();
        }
    }

    /// Snapshot of every slot's storage, for saving.
    pub fn snapshot(&self) -> [ProcessorStorage; SLOT_COUNT] {
        core::array::from_fn(|i| self.slots[i].storage().snapshot())
    }

    /// Processes one block in place.
    ///
    /// The block's channel shape only ever widens. A mono input comes back
    /// stereo if any active processor on the path produced stereo.
    pub fn process_block(&mut self, block: &mut StereoBlock, ctx: &BlockContext) {
        match self.config.topology {
            Topology::Sequential => self.serial(&[0, 1, 2, 3], block, ctx),
            Topology::Ser2 => {
                self.parallel(&[0, 1], block, ctx);
                self.parallel(&[2, 3], block, ctx);
            }
            Topology::Ser3 => {
                self.serial(&[0], block, ctx);
                self.parallel(&[1, 2], block, ctx);
                self.serial(&[3], block, ctx);
            }
            Topology::Par1 => self.parallel(&[0, 1, 2, 3], block, ctx),
            Topology::Par2 => self.parallel_pairs(block, ctx),
            Topology::Par3 => {
                self.parallel(&[0, 1, 2], block, ctx);
                self.serial(&[3], block, ctx);
            }
        }
    }

    fn serial(&mut self, members: &[usize], block: &mut StereoBlock, ctx: &BlockContext) {
        for &i in members {
            self.slots[i].process(block, ctx);
        }
    }

    fn parallel(&mut self, members: &[usize], block: &mut StereoBlock, ctx: &BlockContext) {
        if members.iter().all(|&i| self.slots[i].is_muted()) {
            return;
        }
        self.sum.clear_mono();
        let mut total = [0.0_f32; BLOCK_SIZE];
        for &i in members {
            if self.slots[i].is_muted() {
                continue;
            }
            self.branch.copy_from(block);
            self.slots[i].process(&mut self.branch, ctx);
            let weights = self.slots[i].weights();
            self.sum.accumulate_weighted(&self.branch, weights);
            for (t, w) in total.iter_mut().zip(weights) {
                *t += w;
            }
        }
        let gain = total.map(|t| 1.0 / t.max(1.0));
        let pad = total.map(|t| (1.0 - t).max(0.0));
        blend(block, &self.sum, &gain, &pad);
    }

    /// `(0 -> 1)` and `(2 -> 3)` side by side.
    fn parallel_pairs(&mut self, block: &mut StereoBlock, ctx: &BlockContext) {
        const PAIRS: [[usize; 2]; 2] = [[0, 1], [2, 3]];
        let live = PAIRS.map(|pair| pair.iter().any(|&i| !self.slots[i].is_muted()));
        if live == [false, false] {
            return;
        }
        self.sum.clear_mono();
        let mut pair_weights = [[0.0_f32; BLOCK_SIZE]; 2];
        for (k, pair) in PAIRS.iter().enumerate() {
            if !live[k] {
                continue;
            }
            self.branch.copy_from(block);
            let mut branch = core::mem::take(&mut self.branch);
            self.serial(pair, &mut branch, ctx);
            self.branch = branch;
            let (a, b) = (self.slots[pair[0]].weights(), self.slots[pair[1]].weights());
            pair_weights[k] = core::array::from_fn(|n| a[n].max(b[n]));
            self.sum.accumulate_weighted(&self.branch, &pair_weights[k]);
        }
        let [w0, w1] = pair_weights;
        let gain: [f32; BLOCK_SIZE] =
            core::array::from_fn(|n| 1.0 + (PAR2_BOTH_GAIN - 1.0) * w0[n].min(w1[n]));
        let pad: [f32; BLOCK_SIZE] = core::array::from_fn(|n| (1.0 - w0[n].max(w1[n])).max(0.0));
        blend(block, &self.sum, &gain, &pad);
    }
}

/// `block = sum * gain + block * pad`, per sample. The result is stereo if
/// either side is.
fn blend(
    block: &mut StereoBlock,
    sum: &StereoBlock,
    gain: &[f32; BLOCK_SIZE],
    pad: &[f32; BLOCK_SIZE],
) {
    if sum.is_stereo() {
        block.widen();
    }
    let sum_right = if sum.is_stereo() { &sum.right } else { &sum.left };
    for n in 0..BLOCK_SIZE {
        block.left[n] = sum.left[n] * gain[n] + block.left[n] * pad[n];
        if block.is_stereo() {
            block.right[n] = sum_right[n] * gain[n] + block.right[n] * pad[n];
        }
    }
}

/// Writes the defaults for `code` into `storage`, requesting a type change
/// that the chain applies at its next [`ProcessorChain::apply_pending`].
///
/// Bypass and output level are kept.
pub fn request_type(storage: &LiveStorage, code: ProcessorTypeCode) {
    let mut next = default_storage(code);
    next.bypassed = storage.is_bypassed();
    next.output_level_db = storage.output_level_db();
    storage.store(&next);
}
