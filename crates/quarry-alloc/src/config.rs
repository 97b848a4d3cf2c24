//! Arena configuration parameters.

use crate::error::AllocError;

/// Configuration for an [`Arena`](crate::Arena).
///
/// Controls the size of the single backing block and the granularity of
/// bump allocation. Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the backing block in bytes. The arena never grows past it.
    ///
    /// Default: 65_536 (64 KiB).
    pub capacity: usize,

    /// Minimum alignment of every allocation, in bytes.
    ///
    /// Start offsets are aligned to `max(layout.align(), min_align)` and
    /// sizes are rounded up to a multiple of it. Must be a non-zero power
    /// of two. Default: pointer size.
    pub min_align: usize,
}

impl ArenaConfig {
    /// Default backing block size: 64 KiB.
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// Default minimum alignment: one pointer.
    pub const DEFAULT_MIN_ALIGN: usize = std::mem::align_of::<usize>();

    /// Alignment of the backing block itself. Covers every primitive type.
    pub const BLOCK_ALIGN: usize = 16;

    /// Create a config for a block of `capacity` bytes with default alignment.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            min_align: Self::DEFAULT_MIN_ALIGN,
        }
    }

    /// Override the minimum allocation alignment.
    pub fn with_min_align(mut self, min_align: usize) -> Self {
        self.min_align = min_align;
        self
    }

    /// Check structural constraints.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidConfig`] if `min_align` is not a
    /// non-zero power of two, or if the block size cannot be described
    /// by a layout.
    pub fn validate(&self) -> Result<(), AllocError> {
        if !self.min_align.is_power_of_two() {
            return Err(AllocError::InvalidConfig {
                reason: "min_align must be a non-zero power of two",
            });
        }
        if self.capacity > isize::MAX as usize - (self.block_align() - 1) {
            return Err(AllocError::InvalidConfig {
                reason: "capacity exceeds isize::MAX",
            });
        }
        Ok(())
    }

    /// Alignment used for the backing block.
    pub fn block_align(&self) -> usize {
        self.min_align.max(Self::BLOCK_ALIGN)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
