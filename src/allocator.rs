//! The storage allocator a table draws its slot and control memory from.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::AllocError;

/// Source of table storage.
///
/// A table keeps its own allocator instance, moves it along with the table,
/// and returns every block to the instance it came from. Stateful allocators
/// are fine; the table never calls into one concurrently.
///
/// # Safety
///
/// `allocate` must return a block valid for `layout` that stays valid until
/// it is passed to `deallocate` on the same allocator (or a clone of it).
pub unsafe trait Allocator {
    /// Allocate a block for `layout`. `layout` always has a non-zero size.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block obtained from [`Allocator::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must have come from `allocate` on this allocator with the same
    /// `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global Rust allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: Delegates to the global allocator, which upholds the contract.
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0);
        // SAFETY: Callers never request zero-sized layouts.
        let raw = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(raw).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Caller guarantees `ptr` came from `allocate` with `layout`.
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: Forwards to the referenced allocator.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Forwarded caller contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
