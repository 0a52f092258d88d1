mod common;

use std::ptr;
use proptest::prelude::*;
use array_of::{
	DeferredCollection,
	EagerArray,
	Error
};
use common::{
	Counting,
	Journal,
	Tracked
};

fn from_values(values: &[i32]) -> EagerArray<i32> {
	let mut values = values.iter().copied();
	EagerArray::from_fn(values.len(), || values.next().unwrap())
}

proptest! {
	#[test]
	fn construction_preserves_length_and_value(length in 0usize..128, value: i32) {
		let array = EagerArray::from_elem(length, value);
		prop_assert_eq!(array.length(), length);
		prop_assert!(array.iter().all(|&x| x == value));

		let defaulted: EagerArray<i32> = EagerArray::new(length);
		prop_assert!(defaulted.iter().all(|&x| x == 0));
	}

	#[test]
	fn at_agrees_with_index(values in proptest::collection::vec(any::<i32>(), 0..32), index in 0usize..64) {
		let array = from_values(&values);
		if index < values.len() {
			prop_assert!(ptr::eq(array.at(index).unwrap(), &array[index]));
		} else {
			prop_assert_eq!(array.at(index), Err(Error::OutOfRange { index, length: values.len() }));
		}
	}

	#[test]
	fn fill_matches_fresh_array(values in proptest::collection::vec(any::<i32>(), 0..32), value: i32) {
		let mut array = from_values(&values);
		array.fill(value);
		prop_assert!(array.iter().all(|&x| x == value));
		prop_assert!(array == EagerArray::from_elem(values.len(), value));
	}

	#[test]
	fn swap_exchanges_position_wise(pairs in proptest::collection::vec(any::<(i32, i32)>(), 0..32)) {
		let left: Vec<i32> = pairs.iter().map(|p| p.0).collect();
		let right: Vec<i32> = pairs.iter().map(|p| p.1).collect();
		let mut a = from_values(&left);
		let mut b = from_values(&right);

		a.swap_with(&mut b).unwrap();
		prop_assert!(a == right);
		prop_assert!(b == left);
	}

	#[test]
	fn equality_laws(x in proptest::collection::vec(0i32..3, 0..6), y in proptest::collection::vec(0i32..3, 0..6)) {
		let a = from_values(&x);
		let b = from_values(&y);
		prop_assert!(a == from_values(&x));
		prop_assert_eq!(a == b, b == a);
		prop_assert_eq!(a == b, x == y);
		if x.len() != y.len() {
			prop_assert!(a != b);
		}
	}

	#[test]
	fn deferred_construct_pairs_lifecycle(length in 0usize..64, value: i32) {
		let journal = Journal::new();
		let alloc = Counting::default();
		let mut c = DeferredCollection::new_in(length, alloc.clone());
		c.construct_with(|| Tracked::new(&journal, value)).unwrap();

		prop_assert_eq!(c.length(), length);
		prop_assert!(c.iter().unwrap().all(|t| t.value == value));
		drop(c);

		prop_assert_eq!(journal.constructions(), length);
		prop_assert_eq!(journal.drops(), length);
		prop_assert_eq!(journal.dropped_ids(), (0..length).collect::<Vec<_>>());
		prop_assert_eq!(alloc.allocations(), alloc.deallocations());
		prop_assert_eq!(alloc.live_bytes(), 0);
	}
}
