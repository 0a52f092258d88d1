//! Allocator capability used by the containers of this crate.
//!
//! The standard `Allocator` trait is still unstable, so this module provides
//! [`RawAllocator`], a minimal stand-in with the same shape.
//! Containers only ever ask it for non-zero-sized array layouts.
use core::{
	alloc::Layout,
	fmt,
	ptr::NonNull
};
use std::alloc;

/// The error returned when an allocator cannot satisfy a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("memory allocation failed")
	}
}

impl std::error::Error for AllocError {}

/// A raw memory allocation policy.
///
/// Implementations are stored by value inside each container, so two
/// containers may use two independently configured allocators.
///
/// ## Safety
///
/// Memory blocks returned by `allocate` must be valid for `layout.size()` bytes,
/// aligned to `layout.align()`, and must stay valid until passed to `deallocate`
/// on the same allocator (or a copy of it).
pub unsafe trait RawAllocator {
	/// Allocate a block of memory described by `layout`.
	///
	/// `layout` always has a non-zero size when called from this crate.
	fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

	/// Release a block previously returned by [`allocate`](RawAllocator::allocate).
	///
	/// ## Safety
	///
	/// `ptr` must denote a block currently allocated by this allocator,
	/// and `layout` must be the layout it was allocated with.
	unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

unsafe impl<'a, A: RawAllocator + ?Sized> RawAllocator for &'a A {
	#[inline]
	fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
		(**self).allocate(layout)
	}

	#[inline]
	unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
		(**self).deallocate(ptr, layout)
	}
}

/// The global memory allocator.
///
/// Forwards to [`std::alloc::alloc`] and [`std::alloc::dealloc`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

unsafe impl RawAllocator for Global {
	#[inline]
	fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
		if layout.size() == 0 {
			// SAFETY: alignments are never zero.
			return Ok(unsafe { NonNull::new_unchecked(layout.align() as *mut u8) })
		}

		// SAFETY: `layout` has a non-zero size.
		NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(AllocError)
	}

	#[inline]
	unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
		if layout.size() != 0 {
			alloc::dealloc(ptr.as_ptr(), layout)
		}
	}
}
