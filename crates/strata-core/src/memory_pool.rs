//! Shared scratch memory for processors with internal buffers.
//!
//! Delay lines and similar buffers are too large to live inside a processor
//! arena. They are drawn from a [`MemoryPool`] shared by every chain of a
//! voice or group. The pool is filled once at setup time with
//! [`preallocate`](MemoryPool::preallocate); afterwards
//! [`checkout`](MemoryPool::checkout) and [`checkin`](MemoryPool::checkin)
//! only move boxed blocks between the pool and processors, never allocate.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec, vec::Vec};

/// A scratch buffer owned by the pool or lent to one processor.
#[derive(Debug)]
pub struct PoolBlock {
    data: Box<[f32]>,
}

impl PoolBlock {
    fn zeroed(len: usize) -> Self {
        Self {
            data: vec![0.0; len].into_boxed_slice(),
        }
    }

    /// Capacity in samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for a zero-capacity block.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read access to the samples.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Write access to the samples.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Zeroes every sample.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}

/// Free list of pre-sized scratch blocks.
#[derive(Debug, Default)]
pub struct MemoryPool {
    free: Vec<PoolBlock>,
    lent: usize,
}

impl MemoryPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` zeroed blocks of `len` samples. Allocates; setup time only.
    pub fn preallocate(&mut self, len: usize, count: usize) {
        if len == 0 {
            return;
        }
        self.free.reserve(count);
        for _ in 0..count {
            self.free.push(PoolBlock::zeroed(len));
        }
    }

    /// Takes the smallest free block holding at least `len` samples.
    ///
    /// Returns `None` when the pool has no suitable block. The block comes
    /// back zeroed.
    pub fn checkout(&mut self, len: usize) -> Option<PoolBlock> {
        let index = self
            .free
            .iter()
            .enumerate()
            .filter(|(_, b)| b.len() >= len)
            .min_by_key(|(_, b)| b.len())
            .map(|(i, _)| i);
        let Some(index) = index else {
            #[cfg(feature = "tracing")]
            tracing::warn!(len, free = self.free.len(), "memory pool exhausted");
            return None;
        };
        let mut block = self.free.swap_remove(index);
        block.clear();
        self.lent += 1;
        Some(block)
    }

    /// Returns a block to the pool.
    ///
    /// Capacity reserved by `preallocate` keeps this allocation-free.
    pub fn checkin(&mut self, block: PoolBlock) {
        self.lent = self.lent.saturating_sub(1);
        self.free.push(block);
    }

    /// Number of blocks available for checkout.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of blocks currently lent to processors.
    pub fn lent_count(&self) -> usize {
        self.lent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_prefers_smallest_fit() {
        let mut pool = MemoryPool::new();
        pool.preallocate(1024, 1);
        pool.preallocate(64, 1);
        let block = pool.checkout(32).unwrap();
        assert_eq!(block.len(), 64);
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.lent_count(), 1);
    }

    #[test]
    fn checkout_fails_when_too_small() {
        let mut pool = MemoryPool::new();
        pool.preallocate(16, 2);
        assert!(pool.checkout(17).is_none());
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn checkin_returns_cleared_block_on_next_checkout() {
        let mut pool = MemoryPool::new();
        pool.preallocate(8, 1);
        let mut block = pool.checkout(8).unwrap();
        block.as_mut_slice()[3] = 1.0;
        pool.checkin(block);
        assert_eq!(pool.lent_count(), 0);
        let block = pool.checkout(8).unwrap();
        assert!(block.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_length_preallocate_is_noop() {
        let mut pool = MemoryPool::new();
        pool.preallocate(0, 4);
        assert_eq!(pool.free_count(), 0);
    }
}
