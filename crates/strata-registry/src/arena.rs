//! Caller-owned storage that hosts at most one processor.
//!
//! A [`ProcessorArena`] is embedded in each chain slot. Spawning constructs
//! the selected variant directly in the arena and unspawning drops it; the
//! arena itself is never reallocated or moved by either operation.

use crate::Arc;
use crate::table::{AnyProcessor, PROCESSOR_ARENA_BYTES, TABLE};
use strata_core::{
    LiveStorage, MemoryPool, OVERSAMPLE_FACTOR, Processor, ProcessorTypeCode, SpawnContext,
};

/// Arguments to [`ProcessorArena::spawn_in_place`].
#[derive(Debug)]
pub struct SpawnRequest<'a> {
    /// Type to construct.
    pub code: ProcessorTypeCode,
    /// Parameter storage the processor binds to.
    pub storage: &'a Arc<LiveStorage>,
    /// Chain sample rate (before oversampling).
    pub sample_rate: f32,
    /// Selects the oversampled variant.
    pub oversampled: bool,
    /// Constructed only to read metadata.
    pub needs_metadata: bool,
}

/// Aligned storage for one processor plus its queued pool registration.
#[derive(Debug, Default)]
#[repr(C, align(16))]
pub struct ProcessorArena {
    processor: Option<AnyProcessor>,
    // scratch samples still to be checked out once a pool is attached
    pending_scratch: usize,
}

const _: () = assert!(core::mem::align_of::<ProcessorArena>() >= 16);

impl ProcessorArena {
    /// An empty arena.
    pub const fn new() -> Self {
        Self {
            processor: None,
            pending_scratch: 0,
        }
    }

    /// Whether a processor currently lives here.
    pub fn is_occupied(&self) -> bool {
        self.processor.is_some()
    }

    /// The hosted processor.
    pub fn processor(&self) -> Option<&AnyProcessor> {
        self.processor.as_ref()
    }

    /// The hosted processor, mutably.
    pub fn processor_mut(&mut self) -> Option<&mut AnyProcessor> {
        self.processor.as_mut()
    }

    /// Scratch samples waiting for [`attach_pool`](Self::attach_pool).
    pub fn pending_scratch(&self) -> usize {
        self.pending_scratch
    }

    /// Constructs the requested type in this arena.
    ///
    /// Returns `false` (leaving the arena empty) for "none" and for codes the
    /// registry does not implement. Scratch memory is checked out of `pool`
    /// immediately when one is given, otherwise the request is queued until
    /// [`attach_pool`](Self::attach_pool).
    ///
    /// Spawning into an occupied arena is a programming error.
    pub fn spawn_in_place(
        &mut self,
        request: SpawnRequest<'_>,
        pool: Option<&mut MemoryPool>,
    ) -> bool {
        debug_assert!(
            self.processor.is_none(),
            "spawn into an occupied processor arena"
        );
        let ctx = SpawnContext {
            storage: Arc::clone(request.storage),
            sample_rate: request.sample_rate,
            needs_metadata: request.needs_metadata,
        };
        let Some(processor) = AnyProcessor::spawn(request.code, ctx, request.oversampled) else {
            return false;
        };
        self.processor = Some(processor);

        self.pending_scratch = 0;
        if !request.needs_metadata {
            let rate = if request.oversampled {
                request.sample_rate * OVERSAMPLE_FACTOR as f32
            } else {
                request.sample_rate
            };
            self.pending_scratch = TABLE
                .get(request.code.raw() as usize)
                .and_then(Option::as_ref)
                .map_or(0, |info| (info.scratch_len)(rate));
        }
        if let Some(pool) = pool {
            self.attach_pool(pool);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            code = request.code.raw(),
            oversampled = request.oversampled,
            scratch = self.pending_scratch,
            "processor spawned"
        );
        true
    }

    /// Checks out any queued scratch memory from `pool`.
    ///
    /// If the pool has no block large enough the processor keeps running
    /// without scratch memory (silent for processors that need it) and the
    /// request stays queued.
    pub fn attach_pool(&mut self, pool: &mut MemoryPool) {
        if self.pending_scratch == 0 {
            return;
        }
        let Some(processor) = self.processor.as_mut() else {
            self.pending_scratch = 0;
            return;
        };
        let Some(block) = pool.checkout(self.pending_scratch) else {
            return;
        };
        if let Some(declined) = processor.attach_scratch(block) {
            pool.checkin(declined);
        }
        self.pending_scratch = 0;
    }

    /// Drops the hosted processor, returning its scratch memory to `pool`.
    ///
    /// Unspawning an empty arena is a programming error.
    pub fn unspawn(&mut self, pool: Option<&mut MemoryPool>) {
        debug_assert!(
            self.processor.is_some(),
            "unspawn of an empty processor arena"
        );
        self.pending_scratch = 0;
        let Some(mut processor) = self.processor.take() else {
            return;
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(code = processor.code().raw(), "processor unspawned");
        if let (Some(block), Some(pool)) = (processor.detach_scratch(), pool) {
            pool.checkin(block);
        }
    }
}

const _: () = assert!(core::mem::size_of::<ProcessorArena>() <= PROCESSOR_ARENA_BYTES + 64);
