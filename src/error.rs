use core::alloc::Layout;
use core::fmt;

/// The allocator could not satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl core::error::Error for AllocError {}

/// Error returned by the `try_reserve` family of methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryReserveError {
    /// The requested capacity does not fit in a `usize`, or the resulting
    /// allocation would exceed `isize::MAX` bytes.
    CapacityOverflow,

    /// The allocator returned an error for the table's storage.
    AllocError {
        /// Layout of the allocation that failed.
        layout: Layout,
    },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => {
                f.write_str("requested capacity exceeds the table's maximum")
            }
            TryReserveError::AllocError { layout } => write!(
                f,
                "failed to allocate {} bytes (align {}) for table storage",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl core::error::Error for TryReserveError {}
