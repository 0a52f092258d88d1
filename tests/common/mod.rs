#![allow(dead_code)]
use std::{
	alloc::Layout,
	cell::{
		Cell,
		RefCell
	},
	ptr::NonNull,
	rc::Rc
};
use array_of::{
	AllocError,
	Global,
	RawAllocator
};

pub fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default)]
struct Stats {
	allocations: Cell<usize>,
	deallocations: Cell<usize>,
	live_bytes: Cell<usize>
}

/// Global allocator keeping track of every request.
///
/// Clones share the same counters.
#[derive(Clone, Debug, Default)]
pub struct Counting {
	stats: Rc<Stats>
}

impl Counting {
	pub fn allocations(&self) -> usize {
		self.stats.allocations.get()
	}

	pub fn deallocations(&self) -> usize {
		self.stats.deallocations.get()
	}

	pub fn live_bytes(&self) -> usize {
		self.stats.live_bytes.get()
	}
}

unsafe impl RawAllocator for Counting {
	fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
		let ptr = Global.allocate(layout)?;
		self.stats.allocations.set(self.allocations() + 1);
		self.stats.live_bytes.set(self.live_bytes() + layout.size());
		Ok(ptr)
	}

	unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
		self.stats.deallocations.set(self.deallocations() + 1);
		self.stats.live_bytes.set(self.live_bytes() - layout.size());
		Global.deallocate(ptr, layout)
	}
}

/// Allocator refusing every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct Failing;

unsafe impl RawAllocator for Failing {
	fn allocate(&self, _layout: Layout) -> Result<NonNull<u8>, AllocError> {
		Err(AllocError)
	}

	unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
		panic!("nothing to deallocate")
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
	Constructed(usize),
	Dropped(usize)
}

/// Lifecycle journal shared by [`Tracked`] values.
#[derive(Debug, Default)]
pub struct Journal {
	next_id: Cell<usize>,
	budget: Cell<Option<usize>>,
	events: RefCell<Vec<Event>>
}

impl Journal {
	pub fn new() -> Rc<Self> {
		Rc::new(Journal::default())
	}

	/// Only `n` more constructions succeed, the next one panics.
	pub fn fail_after(&self, n: usize) {
		self.budget.set(Some(n))
	}

	fn record_construction(&self) -> usize {
		if let Some(budget) = self.budget.get() {
			if budget == 0 {
				panic!("construction failed")
			}
			self.budget.set(Some(budget - 1))
		}

		let id = self.next_id.get();
		self.next_id.set(id + 1);
		self.events.borrow_mut().push(Event::Constructed(id));
		id
	}

	pub fn events(&self) -> Vec<Event> {
		self.events.borrow().clone()
	}

	pub fn constructions(&self) -> usize {
		self.events.borrow().iter().filter(|e| matches!(e, Event::Constructed(_))).count()
	}

	pub fn drops(&self) -> usize {
		self.events.borrow().iter().filter(|e| matches!(e, Event::Dropped(_))).count()
	}

	pub fn dropped_ids(&self) -> Vec<usize> {
		self.events.borrow().iter().filter_map(|e| match e {
			Event::Dropped(id) => Some(*id),
			_ => None
		}).collect()
	}
}

/// Element recording its constructions, clones included, and drops.
///
/// Equality only compares values.
#[derive(Debug)]
pub struct Tracked {
	pub id: usize,
	pub value: i32,
	journal: Rc<Journal>
}

impl Tracked {
	pub fn new(journal: &Rc<Journal>, value: i32) -> Self {
		Tracked {
			id: journal.record_construction(),
			value,
			journal: journal.clone()
		}
	}
}

impl Clone for Tracked {
	fn clone(&self) -> Self {
		Tracked::new(&self.journal, self.value)
	}
}

impl PartialEq for Tracked {
	fn eq(&self, other: &Self) -> bool {
		self.value == other.value
	}
}

impl Drop for Tracked {
	fn drop(&mut self) {
		self.journal.events.borrow_mut().push(Event::Dropped(self.id))
	}
}
