/// Hand-off of a single value from an interrupt handler to the main loop.
///
/// Exactly one `Publisher` (interrupt side) and one `Subscriber` (main loop
/// side) exist per `Mailbox`; `split` borrows the mailbox mutably so a second
/// pair can't be created while the first is alive. A new value replaces an
/// unconsumed one, which is counted as an overrun.

use std::sync::atomic::{
	AtomicU32,
	AtomicU64,
	Ordering,
};

// value in the low 32 bits; set while it hasn't been taken yet
const READY: u64 = 1 << 32;

#[derive(Debug, Default)]
pub struct Mailbox {
	slot: AtomicU64,
	overruns: AtomicU32,
}

impl Mailbox {
	pub fn new() -> Self {
		Mailbox::default()
	}

	pub fn split(&mut self) -> (Publisher, Subscriber) {
		let this: &Mailbox = self;
		(Publisher(this), Subscriber(this))
	}

	pub fn overruns(&self) -> u32 {
		self.overruns.load(Ordering::Relaxed)
	}
}

/// writing side
#[derive(Debug)]
pub struct Publisher<'a>(&'a Mailbox);

impl<'a> Publisher<'a> {
	pub fn publish(&mut self, value: u32) {
		let previous = self.0.slot.swap(READY | u64::from(value), Ordering::AcqRel);
		if 0 != previous & READY {
			self.0.overruns.fetch_add(1, Ordering::Relaxed);
		}
	}
}

/// reading side
#[derive(Debug)]
pub struct Subscriber<'a>(&'a Mailbox);

impl<'a> Subscriber<'a> {
	/// latest value, if one arrived since the last call
	///
	/// Value and ready flag are consumed in one atomic step, so a publish
	/// interrupting `take` is delivered by the next call, exactly once.
	pub fn take(&mut self) -> Option<u32> {
		let slot = self.0.slot.swap(0, Ordering::AcqRel);
		if 0 != slot & READY {
			Some(slot as u32)
		} else {
			None
		}
	}

	pub fn overruns(&self) -> u32 {
		self.0.overruns()
	}
}
