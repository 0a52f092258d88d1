//! Errors reported by the containers of this crate.
use core::{
	alloc::Layout,
	fmt
};
use thiserror::Error;

/// Result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Container error.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
	/// The allocator could not satisfy a storage request.
	///
	/// No container is created when this happens.
	#[error("memory allocation of {} bytes failed", .layout.size())]
	AllocationFailure {
		/// Layout of the refused request.
		layout: Layout
	},

	/// The requested length does not fit in a single allocation.
	#[error("capacity overflow: cannot store {length} elements")]
	CapacityOverflow {
		length: usize
	},

	/// A checked access received an index past the end.
	///
	/// The container is left unchanged.
	#[error("index {index} out of range for length {length}")]
	OutOfRange {
		index: usize,
		length: usize
	},

	/// The caller broke an operation's precondition.
	#[error("precondition violated: {0}")]
	PreconditionViolation(#[from] Precondition)
}

/// Caller-contract violations detected at runtime.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precondition {
	/// Elements were already constructed.
	#[error("elements are already constructed")]
	AlreadyConstructed,

	/// Elements are accessed before being constructed.
	#[error("elements are not constructed")]
	NotConstructed,

	/// Two containers were expected to have the same length.
	#[error("length mismatch ({left} != {right})")]
	LengthMismatch {
		left: usize,
		right: usize
	}
}

impl Error {
	#[inline]
	pub(crate) fn out_of_range(index: usize, length: usize) -> Self {
		Error::OutOfRange { index, length }
	}

	#[inline]
	pub(crate) fn not_constructed() -> Self {
		Precondition::NotConstructed.into()
	}

	#[inline]
	pub(crate) fn already_constructed() -> Self {
		Precondition::AlreadyConstructed.into()
	}
}

/// Error returned by fallible deferred construction.
///
/// Either the collection refused the operation, or a slot's constructor failed.
/// In the latter case, every slot constructed before `index` has already been dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstructError<E> {
	/// The collection itself refused to construct.
	Collection(Error),

	/// Constructing the element at `index` failed.
	Element {
		index: usize,
		source: E
	}
}

impl<E> From<Error> for ConstructError<E> {
	#[inline]
	fn from(e: Error) -> Self {
		ConstructError::Collection(e)
	}
}

impl<E: fmt::Display> fmt::Display for ConstructError<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Collection(e) => e.fmt(f),
			Self::Element { index, source } => {
				write!(f, "failed to construct element {index}: {source}")
			}
		}
	}
}

impl<E: std::error::Error + 'static> std::error::Error for ConstructError<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Collection(e) => Some(e),
			Self::Element { source, .. } => Some(source)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages() {
		assert_eq!(Error::out_of_range(4, 3).to_string(), "index 4 out of range for length 3");
		assert_eq!(
			Error::already_constructed().to_string(),
			"precondition violated: elements are already constructed"
		);
		let layout = Layout::array::<u32>(4).unwrap();
		assert_eq!(Error::AllocationFailure { layout }.to_string(), "memory allocation of 16 bytes failed");
	}

	#[test]
	fn construct_error_source() {
		use std::error::Error as _;

		let e: ConstructError<std::fmt::Error> = ConstructError::Element { index: 2, source: std::fmt::Error };
		assert!(e.to_string().starts_with("failed to construct element 2"));
		assert!(e.source().is_some());

		let e: ConstructError<std::fmt::Error> = Error::not_constructed().into();
		assert_eq!(e, ConstructError::Collection(Precondition::NotConstructed.into()));
	}
}
