//! Deferred, multi-party removal.
//!
//! Each removed element gets one [`Completion`], shared between every module `remove` callback and the node's own `remove` hook
//! (or an immediate default acknowledgement). The element is detached exactly once, when the last party has completed.

use crate::target::Target;
use core::{
	cell::Cell,
	fmt::{self, Debug, Formatter},
};
use num_traits::{CheckedSub, One, Zero};
use std::rc::Rc;
use tracing::{error, trace, trace_span, warn};

/// A counter that can be ticked down to zero, but not past it.
#[derive(Debug)]
pub struct Countdown<C>(Cell<C>)
where
	C: Copy + CheckedSub + One + Zero;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
	/// The count is still above zero.
	Pending,
	/// This tick brought the count to zero.
	Reached,
	/// The count was already zero.
	Exhausted,
}

impl<C> Countdown<C>
where
	C: Copy + CheckedSub + One + Zero,
{
	#[must_use]
	pub fn new(count: C) -> Self {
		Self(Cell::new(count))
	}

	pub fn tick(&self) -> Tick {
		match self.0.get().checked_sub(&C::one()) {
			None => Tick::Exhausted,
			Some(remaining) => {
				self.0.set(remaining);
				if remaining.is_zero() {
					Tick::Reached
				} else {
					Tick::Pending
				}
			}
		}
	}

	#[must_use]
	pub fn remaining(&self) -> C {
		self.0.get()
	}
}

struct PendingRemoval<T: Target> {
	target: Rc<T>,
	elm: T::Node,
	countdown: Countdown<usize>,
}

/// The acknowledgement handed to every party interested in a node's removal.
///
/// Cheap to clone. Extra completions beyond the expected count are ignored with a warning.
pub struct Completion<T: Target>(Rc<PendingRemoval<T>>);
impl<T: Target> Clone for Completion<T> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}
impl<T: Target> Debug for Completion<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Completion")
			.field("elm", &self.0.elm)
			.field("remaining", &self.0.countdown.remaining())
			.finish()
	}
}
impl<T: Target> Completion<T> {
	/// Expects `parties` calls to [`complete`](`Completion::complete`) before detaching `elm`.
	pub(crate) fn new(target: Rc<T>, elm: T::Node, parties: usize) -> Self {
		Self(Rc::new(PendingRemoval {
			target,
			elm,
			countdown: Countdown::new(parties),
		}))
	}

	/// Acknowledges the removal once. The last expected acknowledgement detaches the node.
	///
	/// # Errors
	///
	/// Iff the final detach fails in the target.
	pub fn complete(&self) -> Result<(), T::Error> {
		let PendingRemoval { target, elm, countdown } = &*self.0;
		match countdown.tick() {
			Tick::Pending => {
				trace!("Removal of {:?} acknowledged, {} pending.", elm, countdown.remaining());
				Ok(())
			}
			Tick::Reached => {
				let span = trace_span!("Detaching", ?elm);
				let _enter = span.enter();
				match target.parent_node(elm) {
					Some(parent) => target.remove_child(&parent, elm),
					None => {
						warn!("Node to detach has no parent anymore. Ignoring.");
						Ok(())
					}
				}
			}
			Tick::Exhausted => {
				warn!("Removal of {:?} was completed more often than expected. Ignoring.", elm);
				Ok(())
			}
		}
	}

	/// Like [`complete`](`Completion::complete`), but logs errors instead of returning them.
	///
	/// Meant for deferred completions, where nothing is left to propagate to.
	pub fn complete_or_log(&self) {
		if let Err(error) = self.complete() {
			error!("Failed to detach removed node {:?}: {:?}", self.0.elm, error)
		}
	}

	#[must_use]
	pub fn remaining(&self) -> usize {
		self.0.countdown.remaining()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryTarget;

	#[test]
	fn countdown_saturates() {
		let countdown = Countdown::new(2_u8);
		assert_eq!(countdown.tick(), Tick::Pending);
		assert_eq!(countdown.tick(), Tick::Reached);
		assert_eq!(countdown.tick(), Tick::Exhausted);
		assert_eq!(countdown.remaining(), 0);
	}

	#[test]
	fn detaches_exactly_once() {
		let target = Rc::new(MemoryTarget::new());
		let parent = target.create_element("div").unwrap();
		let child = target.create_element("span").unwrap();
		target.append_child(&parent, &child).unwrap();

		let completion = Completion::new(Rc::clone(&target), child, 2);
		completion.complete().unwrap();
		assert_eq!(target.parent_node(&child), Some(parent));

		completion.clone().complete().unwrap();
		assert_eq!(target.parent_node(&child), None);

		let removals = target.removal_count();
		completion.complete().unwrap();
		assert_eq!(target.removal_count(), removals);
	}
}
