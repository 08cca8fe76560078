//! Fixed-size audio blocks shared by processors and the chain router.
//!
//! The rack evaluates audio in blocks of [`BLOCK_SIZE`] frames. Every buffer the
//! audio thread touches is a fixed array of that length, so a chain owns all of
//! its scratch memory inline and never allocates while processing.
//!
//! A [`StereoBlock`] always has room for two channels but tracks its current
//! *channel shape*: a mono block only carries meaningful data in the left
//! channel. Shape only ever widens within a block (mono to stereo), never narrows.

/// Number of frames processed per block.
pub const BLOCK_SIZE: usize = 16;

/// Reciprocal of [`BLOCK_SIZE`], used for per-sample ramp increments.
pub const BLOCK_SIZE_INV: f32 = 1.0 / BLOCK_SIZE as f32;

/// Fixed-size two-channel audio block with a channel-shape flag.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoBlock {
    /// Left channel samples (the only channel when mono).
    pub left: [f32; BLOCK_SIZE],
    /// Right channel samples. Undefined content while the block is mono.
    pub right: [f32; BLOCK_SIZE],
    stereo: bool,
}

impl Default for StereoBlock {
    fn default() -> Self {
        Self::silent_mono()
    }
}

impl StereoBlock {
    /// A zeroed mono block.
    pub const fn silent_mono() -> Self {
        Self {
            left: [0.0; BLOCK_SIZE],
            right: [0.0; BLOCK_SIZE],
            stereo: false,
        }
    }

    /// Builds a mono block from a single channel.
    pub fn from_mono(samples: &[f32; BLOCK_SIZE]) -> Self {
        Self {
            left: *samples,
            right: [0.0; BLOCK_SIZE],
            stereo: false,
        }
    }

    /// Builds a stereo block from two channels.
    pub fn from_stereo(left: &[f32; BLOCK_SIZE], right: &[f32; BLOCK_SIZE]) -> Self {
        Self {
            left: *left,
            right: *right,
            stereo: true,
        }
    }

    /// Returns `true` if the block carries two independent channels.
    #[inline]
    pub fn is_stereo(&self) -> bool {
        self.stereo
    }

    /// Widens a mono block to stereo by duplicating the left channel.
    ///
    /// No-op if the block is already stereo.
    #[inline]
    pub fn widen(&mut self) {
        if !self.stereo {
            self.right = self.left;
            self.stereo = true;
        }
    }

    /// Marks the block as stereo without touching sample data.
    ///
    /// Used after a processor has written both channels itself.
    #[inline]
    pub fn mark_stereo(&mut self) {
        self.stereo = true;
    }

    /// Zeroes both channels and resets the shape to mono.
    pub fn clear_mono(&mut self) {
        self.left = [0.0; BLOCK_SIZE];
        self.right = [0.0; BLOCK_SIZE];
        self.stereo = false;
    }

    /// Copies samples and shape from another block.
    #[inline]
    pub fn copy_from(&mut self, other: &StereoBlock) {
        self.left = other.left;
        if other.stereo {
            self.right = other.right;
        }
        self.stereo = other.stereo;
    }

    /// Adds another block into this one, reconciling channel shapes.
    ///
    /// If either side is stereo the result is stereo; a mono contributor is
    /// duplicated into the right channel before summation.
    pub fn accumulate_from(&mut self, other: &StereoBlock) {
        if other.stereo {
            self.widen();
        }
        for (dst, src) in self.left.iter_mut().zip(other.left.iter()) {
            *dst += *src;
        }
        if self.stereo {
            let src_right = if other.stereo { &other.right } else { &other.left };
            for (dst, src) in self.right.iter_mut().zip(src_right.iter()) {
                *dst += *src;
            }
        }
    }

    /// Adds another block scaled per sample by `weights`, reconciling
    /// channel shapes the same way as [`accumulate_from`](Self::accumulate_from).
    pub fn accumulate_weighted(&mut self, other: &StereoBlock, weights: &[f32; BLOCK_SIZE]) {
        if other.stereo {
            self.widen();
        }
        for n in 0..BLOCK_SIZE {
            self.left[n] += other.left[n] * weights[n];
        }
        if self.stereo {
            let src_right = if other.stereo { &other.right } else { &other.left };
            for n in 0..BLOCK_SIZE {
                self.right[n] += src_right[n] * weights[n];
            }
        }
    }

    /// Multiplies every active channel by a constant gain.
    pub fn scale(&mut self, gain: f32) {
        for s in self.left.iter_mut() {
            *s *= gain;
        }
        if self.stereo {
            for s in self.right.iter_mut() {
                *s *= gain;
            }
        }
    }

    /// Returns the last frame as `(left, right)`, duplicating mono.
    #[inline]
    pub fn last_frame(&self) -> (f32, f32) {
        let l = self.left[BLOCK_SIZE - 1];
        if self.stereo {
            (l, self.right[BLOCK_SIZE - 1])
        } else {
            (l, l)
        }
    }

    /// Peak absolute sample value across active channels.
    pub fn peak(&self) -> f32 {
        let mut peak = self.left.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        if self.stereo {
            peak = self.right.iter().fold(peak, |m, s| m.max(s.abs()));
        }
        peak
    }
}
