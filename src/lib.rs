//! This crate provides two fixed-length, heap-allocated sequence containers
//! built directly on top of a raw allocator:
//!
//!   - [`EagerArray`] initializes every element when it is created.
//!     No uninitialized slot is ever observable.
//!   - [`DeferredCollection`] only allocates storage when created.
//!     Its elements are built later, in place and all at once,
//!     by a single call to one of its `construct*` methods.
//!
//! The length of both containers is chosen at runtime and then never changes:
//! there is no growth, insertion or removal.
//!
//! ## Basic usage
//!
//! ```rust
//! use array_of::EagerArray;
//!
//! let mut a = EagerArray::from_elem(3, 1);
//! let mut b = EagerArray::from_elem(3, 2);
//! a.fill(7);
//! a.swap_with(&mut b).unwrap(); // exchanges values, not storage.
//! assert_eq!(a, [2, 2, 2]);
//! assert_eq!(b, [7, 7, 7]);
//! assert!(a.at(3).is_err());
//! ```
//!
//! A `DeferredCollection` must be constructed before its elements can be accessed:
//! ```rust
//! use array_of::{DeferredCollection, Error, Precondition};
//!
//! let mut names: DeferredCollection<String> = DeferredCollection::new(2);
//! assert_eq!(names.at(0), Err(Error::PreconditionViolation(Precondition::NotConstructed)));
//!
//! names.construct("anonymous".to_string()).unwrap();
//! assert_eq!(names.at(1).unwrap(), "anonymous");
//! ```
//!
//! ## Allocators
//!
//! Storage is obtained from a [`RawAllocator`], given by value to each container
//! through the `*_in` constructors. By default the [`Global`] allocator is used.
//! Every `*_in` constructor has a `try_*_in` variant reporting allocation failures
//! as an [`Error`] instead of aborting.
pub mod alloc;
pub mod raw;
pub mod error;
pub mod eager;
pub mod deferred;

pub use self::alloc::{
	AllocError,
	Global,
	RawAllocator
};
pub use error::{
	ConstructError,
	Error,
	Precondition,
	Result
};
pub use eager::EagerArray;
pub use deferred::{
	DeferredCollection,
	State
};
