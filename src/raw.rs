//! Raw storage shared by [`EagerArray`](crate::EagerArray) and
//! [`DeferredCollection`](crate::DeferredCollection).
use core::{
	alloc::Layout,
	marker::PhantomData,
	mem,
	ptr::{
		self,
		NonNull
	}
};
use std::alloc::handle_alloc_error;
use crate::{
	alloc::RawAllocator,
	error::{
		Error,
		Result
	}
};

/// A low-level utility owning a fixed-length buffer of `T` slots.
///
/// This type does not in anyway inspect the memory that it manages. When dropped it *will*
/// free its memory, but it *won't* try to drop its contents. It is up to the user of `RawArray`
/// to handle the actual things *stored* inside of a `RawArray`.
///
/// No allocation is performed when the buffer is zero-sized
/// (either `len` is `0` or `T` is zero-sized).
/// The pointer is then dangling but well aligned.
pub struct RawArray<T, A: RawAllocator> {
	/// Pointer to the first slot.
	ptr: NonNull<T>,

	/// Number of slots.
	len: usize,

	/// Allocator.
	alloc: A,

	/// Tells the drop checker we logically own `T`s.
	marker: PhantomData<T>
}

unsafe impl<T: Send, A: RawAllocator + Send> Send for RawArray<T, A> {}
unsafe impl<T: Sync, A: RawAllocator + Sync> Sync for RawArray<T, A> {}

impl<T, A: RawAllocator> Drop for RawArray<T, A> {
	fn drop(&mut self) {
		if let Some((ptr, layout)) = self.current_memory() {
			log::trace!("releasing {} slots ({} bytes)", self.len, layout.size());
			unsafe {
				self.alloc.deallocate(ptr, layout)
			}
		}
	}
}

impl<T, A: RawAllocator> RawArray<T, A> {
	/// Creates an empty buffer without allocating.
	#[inline]
	pub fn dangling_in(alloc: A) -> Self {
		RawArray {
			ptr: NonNull::dangling(),
			len: 0,
			alloc,
			marker: PhantomData
		}
	}

	/// Allocates uninitialized storage for `len` slots.
	///
	/// # Errors
	///
	/// Returns [`Error::CapacityOverflow`] if `len` slots do not fit in a single allocation,
	/// and [`Error::AllocationFailure`] if the allocator refuses the request.
	pub fn try_allocate_in(len: usize, alloc: A) -> Result<Self> {
		let layout = Layout::array::<T>(len).map_err(|_| Error::CapacityOverflow { length: len })?;

		if layout.size() == 0 {
			return Ok(RawArray {
				ptr: NonNull::dangling(),
				len,
				alloc,
				marker: PhantomData
			})
		}

		match alloc.allocate(layout) {
			Ok(ptr) => {
				log::trace!("allocated {} slots ({} bytes)", len, layout.size());
				Ok(RawArray {
					ptr: ptr.cast(),
					len,
					alloc,
					marker: PhantomData
				})
			},
			Err(_) => {
				log::warn!("allocation of {} slots ({} bytes) failed", len, layout.size());
				Err(Error::AllocationFailure { layout })
			}
		}
	}

	/// Like [`try_allocate_in`](RawArray::try_allocate_in), but panics on capacity overflow
	/// and calls [`handle_alloc_error`] on allocation failure.
	#[inline]
	pub fn allocate_in(len: usize, alloc: A) -> Self {
		handle_error(Self::try_allocate_in(len, alloc))
	}

	/// Returns the current allocated memory and layout.
	///
	/// Returns `None` if nothing was allocated.
	fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
		if mem::size_of::<T>() == 0 || self.len == 0 {
			None
		} else {
			// We have an allocated chunk of memory, so we can bypass runtime
			// checks to get our current layout.
			unsafe {
				let align = mem::align_of::<T>();
				let size = mem::size_of::<T>() * self.len;
				let layout = Layout::from_size_align_unchecked(size, align);
				Some((self.ptr.cast(), layout))
			}
		}
	}

	/// Pointer to the first slot.
	///
	/// Valid for `len` slots as long as the buffer is alive.
	#[inline]
	pub fn ptr(&self) -> *mut T {
		self.ptr.as_ptr()
	}

	/// Number of slots.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns a reference to the underlying allocator.
	#[inline]
	pub fn allocator(&self) -> &A {
		&self.alloc
	}

	/// Views the slots as a slice.
	///
	/// ## Safety
	///
	/// Every slot must be initialized.
	#[inline]
	pub unsafe fn as_slice(&self) -> &[T] {
		std::slice::from_raw_parts(self.ptr.as_ptr(), self.len)
	}

	/// Views the slots as a mutable slice.
	///
	/// ## Safety
	///
	/// Every slot must be initialized.
	#[inline]
	pub unsafe fn as_mut_slice(&mut self) -> &mut [T] {
		std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len)
	}

	/// Drops every slot in index order.
	///
	/// The memory itself is left allocated.
	///
	/// ## Safety
	///
	/// Every slot must be initialized, and must not be used afterwards.
	#[inline]
	pub unsafe fn drop_slots(&mut self) {
		ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len))
	}
}

/// Writes values into consecutive uninitialized slots.
///
/// If the guard is dropped before [`finish`](InitGuard::finish) is called
/// (for instance because a value source panicked),
/// every value written so far is dropped, in index order.
pub(crate) struct InitGuard<T> {
	ptr: *mut T,
	initialized: usize
}

impl<T> InitGuard<T> {
	#[inline]
	pub fn new(ptr: *mut T) -> Self {
		InitGuard { ptr, initialized: 0 }
	}

	/// Writes the next slot.
	///
	/// ## Safety
	///
	/// The slot must be valid for writes.
	#[inline]
	pub unsafe fn push(&mut self, value: T) {
		self.ptr.add(self.initialized).write(value);
		self.initialized += 1;
	}

	/// Disarms the guard and returns the number of written slots.
	#[inline]
	pub fn finish(self) -> usize {
		let initialized = self.initialized;
		mem::forget(self);
		initialized
	}
}

impl<T> Drop for InitGuard<T> {
	fn drop(&mut self) {
		unsafe {
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr, self.initialized))
		}
	}
}

/// Source of values for a bulk write.
pub(crate) trait Generator<T> {
	fn next(&mut self) -> T;
	fn last(self) -> T;
}

/// Clones a value, moving it into the last slot.
pub(crate) struct Element<T>(pub T);

impl<T: Clone> Generator<T> for Element<T> {
	fn next(&mut self) -> T {
		self.0.clone()
	}

	fn last(self) -> T {
		self.0
	}
}

pub(crate) struct Defaulted;

impl<T: Default> Generator<T> for Defaulted {
	fn next(&mut self) -> T {
		Default::default()
	}

	fn last(self) -> T {
		Default::default()
	}
}

pub(crate) struct Func<F>(pub F);

impl<T, F: FnMut() -> T> Generator<T> for Func<F> {
	fn next(&mut self) -> T {
		(self.0)()
	}

	fn last(mut self) -> T {
		(self.0)()
	}
}

/// Writes `len` values taken from `gen`, starting at `ptr`.
///
/// If `gen` panics, the values already written are dropped before unwinding further.
///
/// ## Safety
///
/// `ptr` must be valid for `len` consecutive writes.
pub(crate) unsafe fn write_all<T, G: Generator<T>>(ptr: *mut T, len: usize, mut gen: G) {
	let mut guard = InitGuard::new(ptr);

	// Write all elements except the last one
	for _ in 1..len {
		guard.push(gen.next());
	}

	if len > 0 {
		// We can write the last element directly without cloning needlessly
		guard.push(gen.last());
	}

	guard.finish();
}

/// Writes `len` values produced by the fallible `f`, starting at `ptr`.
///
/// On the first failure, the values already written are dropped and
/// the index of the failing slot is returned along with the error.
///
/// ## Safety
///
/// `ptr` must be valid for `len` consecutive writes.
pub(crate) unsafe fn try_write_all<T, E, F>(ptr: *mut T, len: usize, mut f: F) -> core::result::Result<(), (usize, E)> where F: FnMut() -> core::result::Result<T, E> {
	let mut guard = InitGuard::new(ptr);

	for index in 0..len {
		match f() {
			Ok(value) => guard.push(value),
			Err(e) => return Err((index, e))
		}
	}

	guard.finish();
	Ok(())
}

/// Element-wise sequence equality.
///
/// Two sequences are equal when they have the same length
/// and every pair of corresponding elements compares equal.
#[inline]
pub fn seq_eq<T: PartialEq<U>, U>(lhs: &[T], rhs: &[U]) -> bool {
	lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(a, b)| a == b)
}

// Central function for allocation error handling.
#[inline]
pub(crate) fn handle_error<T>(result: Result<T>) -> T {
	match result {
		Ok(t) => t,
		Err(Error::CapacityOverflow { .. }) => capacity_overflow(),
		Err(Error::AllocationFailure { layout }) => handle_alloc_error(layout),
		Err(e) => panic!("{}", e)
	}
}

// One central function responsible for reporting capacity overflows. This'll
// ensure that the code generation related to these panics is minimal as there's
// only one location which panics rather than a bunch throughout the module.
fn capacity_overflow() -> ! {
	panic!("capacity overflow");
}
