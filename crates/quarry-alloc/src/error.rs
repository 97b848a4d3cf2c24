//! Allocation error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while obtaining or resizing memory.
///
/// Every growing container operation surfaces these instead of trapping,
/// and leaves the container in its previous valid state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The request went through [`Allocator::null`](crate::Allocator::null),
    /// which never hands out memory.
    NullAllocator,
    /// An arena cannot satisfy the request from its remaining capacity.
    ArenaExhausted {
        /// Number of bytes requested (after alignment rounding).
        requested: usize,
        /// Bytes already handed out by the arena.
        used: usize,
        /// Total capacity of the arena's backing block.
        capacity: usize,
    },
    /// The system allocator returned null.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
    },
    /// The requested size overflows `isize::MAX` or is not representable
    /// as a layout.
    CapacityOverflow,
    /// An arena configuration failed validation.
    InvalidConfig {
        /// Which constraint was violated.
        reason: &'static str,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullAllocator => write!(f, "allocation through the null allocator"),
            Self::ArenaExhausted {
                requested,
                used,
                capacity,
            } => {
                write!(
                    f,
                    "arena exhausted: requested {requested} bytes, {used} of {capacity} bytes in use"
                )
            }
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: requested {requested} bytes")
            }
            Self::CapacityOverflow => write!(f, "capacity overflow"),
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for AllocError {}

impl From<std::alloc::LayoutError> for AllocError {
    fn from(_: std::alloc::LayoutError) -> Self {
        Self::CapacityOverflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_names_sizes() {
        let err = AllocError::ArenaExhausted {
            requested: 32,
            used: 40,
            capacity: 64,
        };
        assert_eq!(
            err.to_string(),
            "arena exhausted: requested 32 bytes, 40 of 64 bytes in use"
        );
    }

    #[test]
    fn layout_error_maps_to_overflow() {
        let err = std::alloc::Layout::from_size_align(8, 3).unwrap_err();
        assert_eq!(AllocError::from(err), AllocError::CapacityOverflow);
    }
}
