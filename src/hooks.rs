//! Lifecycle callbacks: per-node [`Hooks`] carried in a node's payload, and cross-cutting [`Module`]s.
//!
//! All callbacks are synchronous. `remove` callbacks receive a [`Completion`] instead,
//! which they (or whoever they hand it to) must eventually [`complete`](`Completion::complete`) for the node to be detached.

use crate::{removal::Completion, target::Target, vnode::VNodeRef};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

pub type PhaseHook = Rc<dyn Fn()>;
pub type NodeHook<T> = Rc<dyn Fn(&VNodeRef<T>)>;
/// Called with `(old, new)`. During creation, `old` is an empty placeholder node.
pub type PairHook<T> = Rc<dyn Fn(&VNodeRef<T>, &VNodeRef<T>)>;
pub type RemoveHook<T> = Rc<dyn Fn(&VNodeRef<T>, Completion<T>)>;

/// Per-node hooks. Every hook is optional.
pub struct Hooks<T: Target> {
	/// Before materialization. May rewrite the node's payload.
	pub init: Option<NodeHook<T>>,
	/// After the element and its subtree were created.
	pub create: Option<PairHook<T>>,
	/// Once the whole patch call is structurally complete.
	pub insert: Option<NodeHook<T>>,
	/// Before a matching node is patched.
	pub prepatch: Option<PairHook<T>>,
	pub update: Option<PairHook<T>>,
	/// After a matching node and its children were patched.
	pub postpatch: Option<PairHook<T>>,
	/// Before the node (or an ancestor) is detached.
	pub destroy: Option<NodeHook<T>>,
	/// Takes over the default immediate [`Completion`] for this node.
	pub remove: Option<RemoveHook<T>>,
}
impl<T: Target> Default for Hooks<T> {
	fn default() -> Self {
		Self {
			init: None,
			create: None,
			insert: None,
			prepatch: None,
			update: None,
			postpatch: None,
			destroy: None,
			remove: None,
		}
	}
}
impl<T: Target> Clone for Hooks<T> {
	fn clone(&self) -> Self {
		Self {
			init: self.init.clone(),
			create: self.create.clone(),
			insert: self.insert.clone(),
			prepatch: self.prepatch.clone(),
			update: self.update.clone(),
			postpatch: self.postpatch.clone(),
			destroy: self.destroy.clone(),
			remove: self.remove.clone(),
		}
	}
}
impl<T: Target> Debug for Hooks<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Hooks")
			.field("init", &self.init.is_some())
			.field("create", &self.create.is_some())
			.field("insert", &self.insert.is_some())
			.field("prepatch", &self.prepatch.is_some())
			.field("update", &self.update.is_some())
			.field("postpatch", &self.postpatch.is_some())
			.field("destroy", &self.destroy.is_some())
			.field("remove", &self.remove.is_some())
			.finish()
	}
}
impl<T: Target> Hooks<T> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn on_init(mut self, hook: impl Fn(&VNodeRef<T>) + 'static) -> Self {
		self.init = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_create(mut self, hook: impl Fn(&VNodeRef<T>, &VNodeRef<T>) + 'static) -> Self {
		self.create = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_insert(mut self, hook: impl Fn(&VNodeRef<T>) + 'static) -> Self {
		self.insert = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_prepatch(mut self, hook: impl Fn(&VNodeRef<T>, &VNodeRef<T>) + 'static) -> Self {
		self.prepatch = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_update(mut self, hook: impl Fn(&VNodeRef<T>, &VNodeRef<T>) + 'static) -> Self {
		self.update = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_postpatch(mut self, hook: impl Fn(&VNodeRef<T>, &VNodeRef<T>) + 'static) -> Self {
		self.postpatch = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_destroy(mut self, hook: impl Fn(&VNodeRef<T>) + 'static) -> Self {
		self.destroy = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_remove(mut self, hook: impl Fn(&VNodeRef<T>, Completion<T>) + 'static) -> Self {
		self.remove = Some(Rc::new(hook));
		self
	}
}

/// A plugin observing every node through up to six phase callbacks.
///
/// Attributes, classes, styles, event listeners and transitions are all implemented as modules,
/// usually by reading their own record from the payload's [`Extensions`](`crate::vnode::Extensions`).
pub struct Module<T: Target> {
	pub pre: Option<PhaseHook>,
	pub create: Option<PairHook<T>>,
	pub update: Option<PairHook<T>>,
	pub destroy: Option<NodeHook<T>>,
	pub remove: Option<RemoveHook<T>>,
	pub post: Option<PhaseHook>,
}
impl<T: Target> Default for Module<T> {
	fn default() -> Self {
		Self {
			pre: None,
			create: None,
			update: None,
			destroy: None,
			remove: None,
			post: None,
		}
	}
}
impl<T: Target> Debug for Module<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Module")
			.field("pre", &self.pre.is_some())
			.field("create", &self.create.is_some())
			.field("update", &self.update.is_some())
			.field("destroy", &self.destroy.is_some())
			.field("remove", &self.remove.is_some())
			.field("post", &self.post.is_some())
			.finish()
	}
}
impl<T: Target> Module<T> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn on_pre(mut self, hook: impl Fn() + 'static) -> Self {
		self.pre = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_create(mut self, hook: impl Fn(&VNodeRef<T>, &VNodeRef<T>) + 'static) -> Self {
		self.create = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_update(mut self, hook: impl Fn(&VNodeRef<T>, &VNodeRef<T>) + 'static) -> Self {
		self.update = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_destroy(mut self, hook: impl Fn(&VNodeRef<T>) + 'static) -> Self {
		self.destroy = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_remove(mut self, hook: impl Fn(&VNodeRef<T>, Completion<T>) + 'static) -> Self {
		self.remove = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_post(mut self, hook: impl Fn() + 'static) -> Self {
		self.post = Some(Rc::new(hook));
		self
	}
}

/// Module callbacks grouped by phase, each in module registration order.
///
/// Built once per [`Patcher`](`crate::diff::Patcher`); dispatch only ever goes through these lists.
pub struct ModuleHooks<T: Target> {
	pub pre: Vec<PhaseHook>,
	pub create: Vec<PairHook<T>>,
	pub update: Vec<PairHook<T>>,
	pub destroy: Vec<NodeHook<T>>,
	pub remove: Vec<RemoveHook<T>>,
	pub post: Vec<PhaseHook>,
}
impl<T: Target> ModuleHooks<T> {
	#[must_use]
	pub fn new<'a>(modules: impl IntoIterator<Item = &'a Module<T>>) -> Self
	where
		T: 'a,
	{
		let mut hooks = Self {
			pre: Vec::new(),
			create: Vec::new(),
			update: Vec::new(),
			destroy: Vec::new(),
			remove: Vec::new(),
			post: Vec::new(),
		};
		for module in modules {
			hooks.pre.extend(module.pre.clone());
			hooks.create.extend(module.create.clone());
			hooks.update.extend(module.update.clone());
			hooks.destroy.extend(module.destroy.clone());
			hooks.remove.extend(module.remove.clone());
			hooks.post.extend(module.post.clone());
		}
		hooks
	}
}
impl<T: Target> Debug for ModuleHooks<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModuleHooks")
			.field("pre.len()", &self.pre.len())
			.field("create.len()", &self.create.len())
			.field("update.len()", &self.update.len())
			.field("destroy.len()", &self.destroy.len())
			.field("remove.len()", &self.remove.len())
			.field("post.len()", &self.post.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryTarget;
	use std::cell::RefCell;

	#[test]
	fn phases_keep_registration_order() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let modules: Vec<Module<MemoryTarget>> = (0..3)
			.map(|i| {
				let log = Rc::clone(&log);
				let module = Module::new().on_pre(move || log.borrow_mut().push(i));
				if i == 1 {
					module
				} else {
					module.on_post(|| ())
				}
			})
			.collect();

		let hooks = ModuleHooks::new(&modules);
		assert_eq!(hooks.pre.len(), 3);
		assert_eq!(hooks.post.len(), 2);
		assert!(hooks.create.is_empty());

		for pre in &hooks.pre {
			pre()
		}
		assert_eq!(*log.borrow(), [0, 1, 2]);
	}
}
