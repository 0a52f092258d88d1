use core::{
	fmt,
	ops::{
		Index,
		IndexMut
	}
};
use crate::{
	alloc::{
		Global,
		RawAllocator
	},
	error::{
		ConstructError,
		Error,
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

/// Lifecycle state of a [`DeferredCollection`].
///
/// A collection starts `Allocated` and moves to `Constructed` once,
/// when one of the `construct*` methods succeeds. Dropping the collection ends its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
	/// Storage is allocated, no element is alive.
	Allocated,

	/// Every slot holds a live element.
	Constructed
}

/// Fixed-length heap collection whose elements are constructed after allocation.
///
/// Creating the collection only allocates uninitialized storage.
/// Every element is then built in place by a single `construct*` call,
/// all from the same value source.
/// When dropped, a constructed collection drops its elements in index order
/// before releasing the storage.
///
/// The lifecycle is checked at runtime:
/// constructing twice, or accessing the elements before construction,
/// is reported as a [`Precondition`](crate::Precondition) violation.
///
/// The collection is not `Clone`, and offers no ownership-transfer operation.
///
/// # Examples
///
/// ```
/// # use array_of::{DeferredCollection, State};
/// let mut collection: DeferredCollection<u32> = DeferredCollection::new(5);
/// assert_eq!(collection.state(), State::Allocated);
/// assert!(collection.at(0).is_err());
///
/// collection.construct(42).unwrap();
/// assert_eq!(collection.as_slice().unwrap(), [42; 5]);
/// assert!(collection.construct(0).is_err());
/// ```
pub struct DeferredCollection<T, A: RawAllocator = Global> {
	buf: RawArray<T, A>,
	state: State
}

impl<T, A: RawAllocator> Drop for DeferredCollection<T, A> {
	fn drop(&mut self) {
		if self.state == State::Constructed {
			unsafe {
				self.buf.drop_slots()
			}
		}
	}
}

impl<T> DeferredCollection<T, Global> {
	/// Allocates storage for `length` elements without constructing any.
	///
	/// # Panics
	///
	/// Panics if the storage size overflows.
	/// Aborts (through [`handle_alloc_error`](std::alloc::handle_alloc_error))
	/// if the allocation fails.
	#[inline]
	pub fn new(length: usize) -> Self {
		Self::new_in(length, Global)
	}
}

impl<T, A: RawAllocator> DeferredCollection<T, A> {
	/// Like [`new`](DeferredCollection::new), but parameterized over the choice of
	/// allocator for the returned collection.
	#[inline]
	pub fn new_in(length: usize, alloc: A) -> Self {
		raw::handle_error(Self::try_new_in(length, alloc))
	}

	/// The same as `new_in`, but returns on errors instead of panicking or aborting.
	///
	/// # Errors
	///
	/// Returns [`Error::CapacityOverflow`] or [`Error::AllocationFailure`]
	/// if the storage cannot be obtained.
	#[inline]
	pub fn try_new_in(length: usize, alloc: A) -> Result<Self> {
		Ok(DeferredCollection {
			buf: RawArray::try_allocate_in(length, alloc)?,
			state: State::Allocated
		})
	}

	/// Returns a reference to the underlying allocator.
	#[inline]
	pub fn allocator(&self) -> &A {
		self.buf.allocator()
	}

	/// Number of slots, fixed at allocation.
	///
	/// This does not depend on the lifecycle state.
	#[inline]
	pub fn length(&self) -> usize {
		self.buf.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.buf.len() == 0
	}

	#[inline]
	pub fn state(&self) -> State {
		self.state
	}

	#[inline]
	pub fn is_constructed(&self) -> bool {
		self.state == State::Constructed
	}

	fn ensure_allocated(&self) -> Result<()> {
		match self.state {
			State::Allocated => Ok(()),
			State::Constructed => Err(Error::already_constructed())
		}
	}

	fn construct_from<G: Generator<T>>(&mut self, gen: G) -> Result<()> {
		self.ensure_allocated()?;

		// If `gen` panics, the guard drops what was built
		// and the collection stays `Allocated`.
		unsafe {
			raw::write_all(self.buf.ptr(), self.buf.len(), gen)
		}

		self.state = State::Constructed;
		Ok(())
	}

	/// Constructs every element as a clone of `value`.
	///
	/// The last slot receives `value` itself.
	///
	/// If a clone panics, the elements already built are dropped in index order
	/// and the collection stays [`Allocated`](State::Allocated).
	///
	/// # Errors
	///
	/// Returns a [`Precondition::AlreadyConstructed`](crate::Precondition::AlreadyConstructed)
	/// violation if the elements were already constructed.
	#[inline]
	pub fn construct(&mut self, value: T) -> Result<()> where T: Clone {
		self.construct_from(Element(value))
	}

	/// Constructs every element with `T::default()`.
	///
	/// # Errors
	///
	/// Same as [`construct`](DeferredCollection::construct).
	#[inline]
	pub fn construct_default(&mut self) -> Result<()> where T: Default {
		self.construct_from(Defaulted)
	}

	/// Constructs every element with a value returned by `f`, in index order.
	///
	/// # Errors
	///
	/// Same as [`construct`](DeferredCollection::construct).
	#[inline]
	pub fn construct_with<F: FnMut() -> T>(&mut self, f: F) -> Result<()> {
		self.construct_from(Func(f))
	}

	/// Constructs every element with a value returned by the fallible `f`, in index order.
	///
	/// # Errors
	///
	/// Returns [`ConstructError::Collection`] if the elements were already constructed.
	///
	/// Returns [`ConstructError::Element`] if `f` fails.
	/// The elements built before the failure are then dropped in index order,
	/// and the collection stays [`Allocated`](State::Allocated):
	/// construction may be attempted again.
	pub fn try_construct_with<E, F>(&mut self, f: F) -> Result<(), ConstructError<E>> where F: FnMut() -> core::result::Result<T, E> {
		self.ensure_allocated()?;

		let written = unsafe {
			raw::try_write_all(self.buf.ptr(), self.buf.len(), f)
		};

		written.map_err(|(index, source)| {
			log::debug!("construction failed at element {}, rolled back", index);
			ConstructError::Element { index, source }
		})?;

		self.state = State::Constructed;
		Ok(())
	}

	/// Returns a raw pointer to the collection's buffer.
	///
	/// The pointer is valid for [`length`](DeferredCollection::length) slots
	/// until the collection is dropped.
	/// The slots hold live elements only once the collection is constructed.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.buf.ptr()
	}

	/// Returns an unsafe mutable pointer to the collection's buffer.
	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.buf.ptr()
	}

	/// Live elements: all of them once constructed, none before.
	#[inline]
	fn live(&self) -> &[T] {
		match self.state {
			State::Constructed => unsafe { self.buf.as_slice() },
			State::Allocated => &[]
		}
	}

	#[inline]
	fn live_mut(&mut self) -> &mut [T] {
		match self.state {
			State::Constructed => unsafe { self.buf.as_mut_slice() },
			State::Allocated => Default::default()
		}
	}

	/// Extracts a slice containing every element.
	///
	/// # Errors
	///
	/// Returns a [`Precondition::NotConstructed`](crate::Precondition::NotConstructed)
	/// violation if the elements are not constructed yet.
	#[inline]
	pub fn as_slice(&self) -> Result<&[T]> {
		match self.state {
			State::Constructed => Ok(self.live()),
			State::Allocated => Err(Error::not_constructed())
		}
	}

	/// Extracts a mutable slice containing every element.
	///
	/// # Errors
	///
	/// Same as [`as_slice`](DeferredCollection::as_slice).
	#[inline]
	pub fn as_mut_slice(&mut self) -> Result<&mut [T]> {
		match self.state {
			State::Constructed => Ok(self.live_mut()),
			State::Allocated => Err(Error::not_constructed())
		}
	}

	/// Returns a reference to the element at `index`.
	///
	/// # Errors
	///
	/// Returns a [`Precondition::NotConstructed`](crate::Precondition::NotConstructed)
	/// violation if the elements are not constructed yet,
	/// and [`Error::OutOfRange`] if `index >= self.length()`.
	#[inline]
	pub fn at(&self, index: usize) -> Result<&T> {
		let length = self.length();
		self.as_slice()?.get(index).ok_or_else(|| Error::out_of_range(index, length))
	}

	/// Returns a mutable reference to the element at `index`.
	///
	/// # Errors
	///
	/// Same as [`at`](DeferredCollection::at).
	#[inline]
	pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
		let length = self.length();
		self.as_mut_slice()?.get_mut(index).ok_or_else(|| Error::out_of_range(index, length))
	}

	/// Returns a reference to the element at `index`, without any check.
	///
	/// ## Safety
	///
	/// The collection must be constructed and `index` must be smaller than its length.
	#[inline]
	pub unsafe fn get_unchecked(&self, index: usize) -> &T {
		&*self.buf.ptr().add(index)
	}

	/// Returns a mutable reference to the element at `index`, without any check.
	///
	/// ## Safety
	///
	/// The collection must be constructed and `index` must be smaller than its length.
	#[inline]
	pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
		&mut *self.buf.ptr().add(index)
	}

	/// Returns the first element.
	///
	/// # Errors
	///
	/// Same as [`at`](DeferredCollection::at) with index `0`.
	#[inline]
	pub fn front(&self) -> Result<&T> {
		self.at(0)
	}

	/// Returns the first element, mutably.
	#[inline]
	pub fn front_mut(&mut self) -> Result<&mut T> {
		self.at_mut(0)
	}

	/// Returns the last element.
	///
	/// # Errors
	///
	/// Returns a [`Precondition::NotConstructed`](crate::Precondition::NotConstructed)
	/// violation if the elements are not constructed yet,
	/// and [`Error::OutOfRange`] if the collection is empty.
	#[inline]
	pub fn back(&self) -> Result<&T> {
		self.as_slice()?.last().ok_or_else(|| Error::out_of_range(0, 0))
	}

	/// Returns the last element, mutably.
	#[inline]
	pub fn back_mut(&mut self) -> Result<&mut T> {
		self.as_mut_slice()?.last_mut().ok_or_else(|| Error::out_of_range(0, 0))
	}

	/// Returns an iterator over the elements, in index order.
	///
	/// Use `.rev()` for the reverse order.
	///
	/// # Errors
	///
	/// Same as [`as_slice`](DeferredCollection::as_slice).
	#[inline]
	pub fn iter(&self) -> Result<std::slice::Iter<'_, T>> {
		Ok(self.as_slice()?.iter())
	}

	/// Returns an iterator over mutable references to the elements, in index order.
	///
	/// # Errors
	///
	/// Same as [`as_slice`](DeferredCollection::as_slice).
	#[inline]
	pub fn iter_mut(&mut self) -> Result<std::slice::IterMut<'_, T>> {
		Ok(self.as_mut_slice()?.iter_mut())
	}
}

impl<T, A: RawAllocator> Index<usize> for DeferredCollection<T, A> {
	type Output = T;

	/// # Panics
	///
	/// Panics if the collection is not constructed or if `index` is out of range.
	#[inline]
	fn index(&self, index: usize) -> &T {
		match self.at(index) {
			Ok(t) => t,
			Err(e) => panic!("{}", e)
		}
	}
}

impl<T, A: RawAllocator> IndexMut<usize> for DeferredCollection<T, A> {
	#[inline]
	fn index_mut(&mut self, index: usize) -> &mut T {
		match self.at_mut(index) {
			Ok(t) => t,
			Err(e) => panic!("{}", e)
		}
	}
}

/// Iterates over the live elements: none if the collection is not constructed.
impl<'v, T, A: RawAllocator> IntoIterator for &'v DeferredCollection<T, A> {
	type Item = &'v T;
	type IntoIter = std::slice::Iter<'v, T>;

	#[inline]
	fn into_iter(self) -> Self::IntoIter {
		self.live().iter()
	}
}

impl<'v, T, A: RawAllocator> IntoIterator for &'v mut DeferredCollection<T, A> {
	type Item = &'v mut T;
	type IntoIter = std::slice::IterMut<'v, T>;

	#[inline]
	fn into_iter(self) -> Self::IntoIter {
		self.live_mut().iter_mut()
	}
}

/// Two collections are equal when they have the same length, the same state
/// and element-wise equal live elements.
impl<T: PartialEq<U>, U, A: RawAllocator, B: RawAllocator> PartialEq<DeferredCollection<U, B>> for DeferredCollection<T, A> {
	#[inline]
	fn eq(&self, other: &DeferredCollection<U, B>) -> bool {
		self.length() == other.length() && self.state == other.state && seq_eq(self.live(), other.live())
	}
}

impl<T: Eq, A: RawAllocator> Eq for DeferredCollection<T, A> {}

impl<T: fmt::Debug, A: RawAllocator> fmt::Debug for DeferredCollection<T, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeferredCollection")
			.field("length", &self.length())
			.field("state", &self.state)
			.field("elements", &self.live())
			.finish()
	}
}
