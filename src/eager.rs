use core::{
	fmt,
	iter::FusedIterator,
	mem::ManuallyDrop,
	ops::{
		Deref,
		DerefMut
	},
	ptr
};
use crate::{
	alloc::{
		Global,
		RawAllocator
	},
	error::{
		Error,
		Precondition,
		Result
	},
	raw::{
		self,
		RawArray,
		Defaulted,
		Element,
		Func,
		Generator,
		seq_eq
	}
};

/// Fixed-length heap array whose elements are all initialized at construction.
///
/// The length is chosen at runtime and never changes afterwards.
/// Every slot holds a live `T` from the end of construction until the array is dropped:
/// there is no observable uninitialized state.
///
/// Storage is obtained from the allocator `A`, stored by value in the array.
///
/// # Examples
///
/// ```
/// # use array_of::EagerArray;
/// let mut array = EagerArray::from_elem(3, 5u32);
/// assert_eq!(array, [5, 5, 5]);
///
/// array[1] = 8;
/// assert_eq!(array.at(1), Ok(&8));
/// assert!(array.at(3).is_err());
/// ```
///
/// Arrays are not `Clone`. Ownership of the storage is transferred by moving the array:
/// ```
/// # use array_of::EagerArray;
/// let a = EagerArray::from_elem(2, 'x');
/// let ptr = a.as_ptr();
/// let b = a; // constant time, the storage is not touched.
/// assert_eq!(b.as_ptr(), ptr);
/// ```
pub struct EagerArray<T, A: RawAllocator = Global> {
	buf: RawArray<T, A>
}

impl<T, A: RawAllocator> Drop for EagerArray<T, A> {
	fn drop(&mut self) {
		unsafe {
			// drop every element, storage is released by `buf`.
			self.buf.drop_slots()
		}
	}
}

impl<T> EagerArray<T, Global> {
	/// Creates an array of `length` default values.
	///
	/// # Panics
	///
	/// Panics if the storage size overflows.
	/// Aborts (through [`handle_alloc_error`](std::alloc::handle_alloc_error))
	/// if the allocation fails.
	#[inline]
	pub fn new(length: usize) -> Self where T: Default {
		Self::new_in(length, Global)
	}

	/// Creates an array of `length` copies of `value`.
	#[inline]
	pub fn from_elem(length: usize, value: T) -> Self where T: Clone {
		Self::from_elem_in(length, value, Global)
	}

	/// Creates an array where each element is produced by calling `f`, in index order.
	#[inline]
	pub fn from_fn<F: FnMut() -> T>(length: usize, f: F) -> Self {
		Self::from_fn_in(length, f, Global)
	}
}

impl<T, A: RawAllocator> EagerArray<T, A> {
	fn try_init_in<G: Generator<T>>(length: usize, gen: G, alloc: A) -> Result<Self> {
		let buf = RawArray::try_allocate_in(length, alloc)?;

		// If `gen` panics, the written elements are dropped by the guard
		// and `buf` releases the storage while unwinding.
		unsafe {
			raw::write_all(buf.ptr(), length, gen)
		}

		Ok(EagerArray { buf })
	}

	/// Like [`new`](EagerArray::new), but parameterized over the choice of
	/// allocator for the returned array.
	#[inline]
	pub fn new_in(length: usize, alloc: A) -> Self where T: Default {
		raw::handle_error(Self::try_new_in(length, alloc))
	}

	/// Like [`from_elem`](EagerArray::from_elem), but parameterized over the choice of
	/// allocator for the returned array.
	#[inline]
	pub fn from_elem_in(length: usize, value: T, alloc: A) -> Self where T: Clone {
		raw::handle_error(Self::try_from_elem_in(length, value, alloc))
	}

	/// Like [`from_fn`](EagerArray::from_fn), but parameterized over the choice of
	/// allocator for the returned array.
	#[inline]
	pub fn from_fn_in<F: FnMut() -> T>(length: usize, f: F, alloc: A) -> Self {
		raw::handle_error(Self::try_from_fn_in(length, f, alloc))
	}

	/// The same as `new_in`, but returns on errors instead of panicking or aborting.
	///
	/// # Errors
	///
	/// Returns [`Error::CapacityOverflow`] or [`Error::AllocationFailure`]
	/// if the storage cannot be obtained.
	#[inline]
	pub fn try_new_in(length: usize, alloc: A) -> Result<Self> where T: Default {
		Self::try_init_in(length, Defaulted, alloc)
	}

	/// The same as `from_elem_in`, but returns on errors instead of panicking or aborting.
	///
	/// If cloning `value` panics, the elements already cloned are dropped
	/// and the storage is released before the panic propagates.
	///
	/// # Errors
	///
	/// Returns [`Error::CapacityOverflow`] or [`Error::AllocationFailure`]
	/// if the storage cannot be obtained.
	#[inline]
	pub fn try_from_elem_in(length: usize, value: T, alloc: A) -> Result<Self> where T: Clone {
		Self::try_init_in(length, Element(value), alloc)
	}

	/// The same as `from_fn_in`, but returns on errors instead of panicking or aborting.
	///
	/// # Errors
	///
	/// Returns [`Error::CapacityOverflow`] or [`Error::AllocationFailure`]
	/// if the storage cannot be obtained.
	#[inline]
	pub fn try_from_fn_in<F: FnMut() -> T>(length: usize, f: F, alloc: A) -> Result<Self> {
		Self::try_init_in(length, Func(f), alloc)
	}

	/// Returns a reference to the underlying allocator.
	#[inline]
	pub fn allocator(&self) -> &A {
		self.buf.allocator()
	}

	/// Number of elements, fixed at construction.
	#[inline]
	pub fn length(&self) -> usize {
		self.buf.len()
	}

	/// Returns a raw pointer to the array's buffer.
	///
	/// The pointer is valid for [`length`](EagerArray::length) elements
	/// until the array is dropped or moved into an iterator.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.buf.ptr()
	}

	/// Returns an unsafe mutable pointer to the array's buffer.
	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.buf.ptr()
	}

	/// Extracts a slice containing the entire array.
	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe { self.buf.as_slice() }
	}

	/// Extracts a mutable slice of the entire array.
	#[inline]
	pub fn as_mut_slice(&mut self) -> &mut [T] {
		unsafe { self.buf.as_mut_slice() }
	}

	/// Returns a reference to the element at `index`.
	///
	/// # Errors
	///
	/// Returns [`Error::OutOfRange`] if `index >= self.length()`.
	#[inline]
	pub fn at(&self, index: usize) -> Result<&T> {
		let length = self.length();
		self.as_slice().get(index).ok_or_else(|| Error::out_of_range(index, length))
	}

	/// Returns a mutable reference to the element at `index`.
	///
	/// # Errors
	///
	/// Returns [`Error::OutOfRange`] if `index >= self.length()`.
	#[inline]
	pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
		let length = self.length();
		self.as_mut_slice().get_mut(index).ok_or_else(|| Error::out_of_range(index, length))
	}

	/// Returns the first element.
	///
	/// # Panics
	///
	/// Panics if the array is empty.
	#[inline]
	pub fn front(&self) -> &T {
		match self.as_slice().first() {
			Some(t) => t,
			None => panic!("front of an empty array")
		}
	}

	/// Returns the first element, mutably.
	///
	/// # Panics
	///
	/// Panics if the array is empty.
	#[inline]
	pub fn front_mut(&mut self) -> &mut T {
		match self.as_mut_slice().first_mut() {
			Some(t) => t,
			None => panic!("front of an empty array")
		}
	}

	/// Returns the last element.
	///
	/// # Panics
	///
	/// Panics if the array is empty.
	#[inline]
	pub fn back(&self) -> &T {
		match self.as_slice().last() {
			Some(t) => t,
			None => panic!("back of an empty array")
		}
	}

	/// Returns the last element, mutably.
	///
	/// # Panics
	///
	/// Panics if the array is empty.
	#[inline]
	pub fn back_mut(&mut self) -> &mut T {
		match self.as_mut_slice().last_mut() {
			Some(t) => t,
			None => panic!("back of an empty array")
		}
	}

	/// Overwrites every element with a clone of `value`.
	///
	/// The last element receives `value` itself.
	/// Elements are assigned in place, so a panicking `clone` leaves
	/// every slot holding a live value.
	#[inline]
	pub fn fill(&mut self, value: T) where T: Clone {
		self.as_mut_slice().fill(value)
	}

	/// Overwrites every element with a value returned by `f`, in index order.
	#[inline]
	pub fn fill_with<F: FnMut() -> T>(&mut self, f: F) {
		self.as_mut_slice().fill_with(f)
	}

	/// Exchanges the elements of `self` and `other` position-wise.
	///
	/// Only values move: each array keeps its own storage.
	///
	/// # Errors
	///
	/// Returns a [`Precondition::LengthMismatch`] violation, and leaves both arrays untouched,
	/// if the two arrays do not have the same length.
	#[inline]
	pub fn swap_with<B: RawAllocator>(&mut self, other: &mut EagerArray<T, B>) -> Result<()> {
		if self.length() != other.length() {
			return Err(Precondition::LengthMismatch {
				left: self.length(),
				right: other.length()
			}.into())
		}

		self.as_mut_slice().swap_with_slice(other.as_mut_slice());
		Ok(())
	}

	/// Takes ownership of the storage without dropping the elements.
	#[inline]
	fn into_raw(self) -> RawArray<T, A> {
		let this = ManuallyDrop::new(self);
		unsafe { ptr::read(&this.buf) }
	}
}

impl<T, A: RawAllocator + Default> Default for EagerArray<T, A> {
	/// Creates an empty array, without allocating.
	///
	/// This is what [`std::mem::take`] leaves behind in a moved-from binding.
	#[inline]
	fn default() -> Self {
		EagerArray {
			buf: RawArray::dangling_in(A::default())
		}
	}
}

impl<T, A: RawAllocator> Deref for EagerArray<T, A> {
	type Target = [T];

	#[inline]
	fn deref(&self) -> &[T] {
		self.as_slice()
	}
}

impl<T, A: RawAllocator> DerefMut for EagerArray<T, A> {
	#[inline]
	fn deref_mut(&mut self) -> &mut [T] {
		self.as_mut_slice()
	}
}

impl<T, A: RawAllocator> AsRef<[T]> for EagerArray<T, A> {
	#[inline]
	fn as_ref(&self) -> &[T] {
		self
	}
}

impl<T, A: RawAllocator> AsMut<[T]> for EagerArray<T, A> {
	#[inline]
	fn as_mut(&mut self) -> &mut [T] {
		self
	}
}

impl<'v, T, A: RawAllocator> IntoIterator for &'v EagerArray<T, A> {
	type Item = &'v T;
	type IntoIter = std::slice::Iter<'v, T>;

	#[inline]
	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<'v, T, A: RawAllocator> IntoIterator for &'v mut EagerArray<T, A> {
	type Item = &'v mut T;
	type IntoIter = std::slice::IterMut<'v, T>;

	#[inline]
	fn into_iter(self) -> Self::IntoIter {
		self.iter_mut()
	}
}

/// An iterator that moves out of an [`EagerArray`].
///
/// Elements not yielded are dropped with the iterator, which then releases the storage.
pub struct IntoIter<T, A: RawAllocator = Global> {
	buf: RawArray<T, A>,

	/// Index of the next element yielded from the front.
	start: usize,

	/// One past the index of the next element yielded from the back.
	end: usize
}

impl<T, A: RawAllocator> IntoIter<T, A> {
	/// Returns the remaining elements as a slice.
	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			std::slice::from_raw_parts(self.buf.ptr().add(self.start), self.end - self.start)
		}
	}
}

impl<T, A: RawAllocator> Iterator for IntoIter<T, A> {
	type Item = T;

	#[inline]
	fn next(&mut self) -> Option<T> {
		if self.start == self.end {
			None
		} else {
			let item = unsafe { ptr::read(self.buf.ptr().add(self.start)) };
			self.start += 1;
			Some(item)
		}
	}

	#[inline]
	fn size_hint(&self) -> (usize, Option<usize>) {
		let len = self.end - self.start;
		(len, Some(len))
	}
}

impl<T, A: RawAllocator> DoubleEndedIterator for IntoIter<T, A> {
	#[inline]
	fn next_back(&mut self) -> Option<T> {
		if self.start == self.end {
			None
		} else {
			self.end -= 1;
			Some(unsafe { ptr::read(self.buf.ptr().add(self.end)) })
		}
	}
}

impl<T, A: RawAllocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: RawAllocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: RawAllocator> Drop for IntoIter<T, A> {
	fn drop(&mut self) {
		unsafe {
			let remaining = self.buf.ptr().add(self.start);
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(remaining, self.end - self.start))
		}
	}
}

impl<T: fmt::Debug, A: RawAllocator> fmt::Debug for IntoIter<T, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
	}
}

impl<T, A: RawAllocator> IntoIterator for EagerArray<T, A> {
	type Item = T;
	type IntoIter = IntoIter<T, A>;

	#[inline]
	fn into_iter(self) -> Self::IntoIter {
		let buf = self.into_raw();
		let end = buf.len();

		IntoIter {
			buf,
			start: 0,
			end
		}
	}
}

impl<T: fmt::Debug, A: RawAllocator> fmt::Debug for EagerArray<T, A> {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

macro_rules! impl_slice_eq {
	([$($vars:tt)*] $lhs:ty, $rhs:ty) => {
		impl<$($vars)*> PartialEq<$rhs> for $lhs where T: PartialEq<U> {
			#[inline]
			fn eq(&self, other: &$rhs) -> bool { seq_eq(&self[..], &other[..]) }
		}
	}
}

impl_slice_eq! { [T, U, A: RawAllocator, B: RawAllocator] EagerArray<T, A>, EagerArray<U, B> }
impl_slice_eq! { [T, U, A: RawAllocator] EagerArray<T, A>, Vec<U> }
impl_slice_eq! { [T, U, A: RawAllocator] EagerArray<T, A>, &[U] }
impl_slice_eq! { [T, U, A: RawAllocator] EagerArray<T, A>, &mut [U] }
impl_slice_eq! { [T, U, A: RawAllocator, const N: usize] EagerArray<T, A>, [U; N] }

impl<T: Eq, A: RawAllocator> Eq for EagerArray<T, A> {}
