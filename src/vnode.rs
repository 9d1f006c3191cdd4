//! The declarative tree the [`Patcher`](`crate::diff::Patcher`) reconciles.
//!
//! Nodes are shared through [`Rc`], so "the same node" always means [`Rc::ptr_eq`].
//! The engine only ever writes two things into a tree: the [handle](`VNode::elm`) of each materialized node,
//! and (in its own working copy of a sibling list) the tombstones of consumed slots.

use crate::{hooks::Hooks, selector, target::Target};
use core::{
	any::{Any, TypeId},
	cell::{Ref, RefCell, RefMut},
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use std::rc::Rc;

pub type VNodeRef<T> = Rc<VNode<T>>;

/// A sibling slot. [`None`] slots are skipped.
pub type Child<T> = Option<VNodeRef<T>>;

/// Sibling identity, in addition to the selector.
///
/// String and integer keys never compare equal, even if they'd print the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Str(String),
	Int(i64),
}
impl From<&str> for Key {
	fn from(key: &str) -> Self {
		Self::Str(key.to_owned())
	}
}
impl From<String> for Key {
	fn from(key: String) -> Self {
		Self::Str(key)
	}
}
impl From<i64> for Key {
	fn from(key: i64) -> Self {
		Self::Int(key)
	}
}
impl From<i32> for Key {
	fn from(key: i32) -> Self {
		Self::Int(key.into())
	}
}
impl fmt::Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Key::Str(key) => write!(f, "{:?}", key),
			Key::Int(key) => write!(f, "{}", key),
		}
	}
}

/// Module-owned payload records, one per type.
///
/// Modules define their own record type (attributes, classes, listeners…) and look it up here.
#[derive(Default)]
pub struct Extensions(HashMap<TypeId, Box<dyn Any>>);
impl Extensions {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the previous record of the same type, if any.
	pub fn insert<E: Any>(&mut self, record: E) -> Option<E> {
		self.0
			.insert(TypeId::of::<E>(), Box::new(record))
			.and_then(|previous| previous.downcast().ok())
			.map(|previous: Box<E>| *previous)
	}

	#[must_use]
	pub fn get<E: Any>(&self) -> Option<&E> {
		self.0.get(&TypeId::of::<E>()).and_then(|record| record.downcast_ref())
	}

	pub fn get_mut<E: Any>(&mut self) -> Option<&mut E> {
		self.0.get_mut(&TypeId::of::<E>()).and_then(|record| record.downcast_mut())
	}

	pub fn remove<E: Any>(&mut self) -> Option<E> {
		self.0
			.remove(&TypeId::of::<E>())
			.and_then(|record| record.downcast().ok())
			.map(|record: Box<E>| *record)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for Extensions {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Extensions").field("len", &self.0.len()).finish()
	}
}

/// The open payload of a node.
pub struct VNodeData<T: Target> {
	/// Explicit namespace, inherited by descendants. `svg` root selectors take precedence.
	pub ns: Option<String>,
	pub hook: Hooks<T>,
	pub extensions: Extensions,
}
impl<T: Target> Default for VNodeData<T> {
	fn default() -> Self {
		Self {
			ns: None,
			hook: Hooks::default(),
			extensions: Extensions::new(),
		}
	}
}
impl<T: Target> Debug for VNodeData<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("VNodeData")
			.field("ns", &self.ns)
			.field("hook", &self.hook)
			.field("extensions", &self.extensions)
			.finish()
	}
}
impl<T: Target> VNodeData<T> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_ns(mut self, ns: impl Into<String>) -> Self {
		self.ns = Some(ns.into());
		self
	}

	#[must_use]
	pub fn with_hooks(mut self, hook: Hooks<T>) -> Self {
		self.hook = hook;
		self
	}

	#[must_use]
	pub fn with_extension<E: Any>(mut self, record: E) -> Self {
		self.extensions.insert(record);
		self
	}
}

/// A node description.
///
/// - No selector: a text node made from [`text`](`VNode::text`).
/// - [`selector::COMMENT`]: a comment node, [`text`](`VNode::text`) is the comment.
/// - Anything else: an element with either [`children`](`VNode::children`) or [`text`](`VNode::text`).
pub struct VNode<T: Target> {
	sel: Option<String>,
	key: Option<Key>,
	data: RefCell<Option<VNodeData<T>>>,
	children: Option<Rc<[Child<T>]>>,
	text: Option<String>,
	elm: RefCell<Option<T::Node>>,
}
impl<T: Target> Debug for VNode<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let mut debug = f.debug_struct("VNode");
		debug.field("sel", &self.sel).field("key", &self.key);
		if cfg!(feature = "dangerous-logging") {
			debug.field("text", &self.text);
		} else {
			debug.field("text.is_some()", &self.text.is_some());
		}
		debug
			.field("children.len()", &self.children.as_ref().map(|children| children.len()))
			.field("elm", &*self.elm.borrow())
			.finish()
	}
}

impl<T: Target> VNode<T> {
	/// An element with an empty payload and no content.
	#[must_use]
	pub fn element(sel: impl Into<String>) -> Self {
		Self {
			sel: Some(sel.into()),
			key: None,
			data: RefCell::new(Some(VNodeData::new())),
			children: None,
			text: None,
			elm: RefCell::new(None),
		}
	}

	#[must_use]
	pub fn text_node(text: impl Into<String>) -> Self {
		Self {
			sel: None,
			key: None,
			data: RefCell::new(None),
			children: None,
			text: Some(text.into()),
			elm: RefCell::new(None),
		}
	}

	#[must_use]
	pub fn comment(text: impl Into<String>) -> Self {
		Self {
			sel: Some(selector::COMMENT.to_owned()),
			key: None,
			data: RefCell::new(Some(VNodeData::new())),
			children: None,
			text: Some(text.into()),
			elm: RefCell::new(None),
		}
	}

	/// The placeholder passed as `old` to `create` callbacks.
	#[must_use]
	pub(crate) fn empty() -> Self {
		Self {
			sel: Some(String::new()),
			key: None,
			data: RefCell::new(Some(VNodeData::new())),
			children: Some(Rc::from(Vec::new())),
			text: None,
			elm: RefCell::new(None),
		}
	}

	/// A childless leaf standing for an existing live element.
	#[must_use]
	pub(crate) fn adopted(sel: String, elm: T::Node) -> Self {
		Self {
			sel: Some(sel),
			key: None,
			data: RefCell::new(Some(VNodeData::new())),
			children: Some(Rc::from(Vec::new())),
			text: None,
			elm: RefCell::new(Some(elm)),
		}
	}

	#[must_use]
	pub fn with_key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Sets the children and clears [`text`](`VNode::text`).
	#[must_use]
	pub fn with_children(mut self, children: impl IntoIterator<Item = Child<T>>) -> Self {
		self.children = Some(children.into_iter().collect());
		self.text = None;
		self
	}

	/// Shares an existing sibling list.
	#[must_use]
	pub fn with_shared_children(mut self, children: Rc<[Child<T>]>) -> Self {
		self.children = Some(children);
		self.text = None;
		self
	}

	/// Sets the text and clears [`children`](`VNode::children`).
	#[must_use]
	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self.children = None;
		self
	}

	#[must_use]
	pub fn with_data(self, data: VNodeData<T>) -> Self {
		*self.data.borrow_mut() = Some(data);
		self
	}

	/// Replaces the per-node hooks, creating a payload if necessary.
	#[must_use]
	pub fn with_hooks(self, hook: Hooks<T>) -> Self {
		self.data.borrow_mut().get_or_insert_with(VNodeData::new).hook = hook;
		self
	}

	#[must_use]
	pub fn into_ref(self) -> VNodeRef<T> {
		Rc::new(self)
	}

	/// [`Some`] slot, for [`with_children`](`VNode::with_children`).
	#[must_use]
	pub fn into_child(self) -> Child<T> {
		Some(self.into_ref())
	}

	#[must_use]
	pub fn sel(&self) -> Option<&str> {
		self.sel.as_deref()
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		self.key.as_ref()
	}

	#[must_use]
	pub fn text(&self) -> Option<&str> {
		self.text.as_deref()
	}

	#[must_use]
	pub fn children(&self) -> Option<&Rc<[Child<T>]>> {
		self.children.as_ref()
	}

	/// # Panics
	///
	/// Iff the payload is currently mutably borrowed.
	#[must_use]
	pub fn data(&self) -> Ref<'_, Option<VNodeData<T>>> {
		self.data.borrow()
	}

	/// For `init` hooks, which may rewrite the payload before the node is materialized.
	///
	/// # Panics
	///
	/// Iff the payload is currently borrowed.
	#[must_use]
	pub fn data_mut(&self) -> RefMut<'_, Option<VNodeData<T>>> {
		self.data.borrow_mut()
	}

	#[must_use]
	pub fn has_data(&self) -> bool {
		self.data.borrow().is_some()
	}

	/// The handle of the live node, once materialized or patched.
	#[must_use]
	pub fn elm(&self) -> Option<T::Node> {
		self.elm.borrow().clone()
	}

	pub(crate) fn set_elm(&self, elm: T::Node) {
		*self.elm.borrow_mut() = Some(elm);
	}

	/// Whether this is a pure text node.
	#[must_use]
	pub fn is_text(&self) -> bool {
		self.sel.is_none()
	}

	/// Extracts an optional hook without holding the payload borrow, so the hook itself may borrow it.
	pub(crate) fn hook<H: Clone>(&self, select: impl FnOnce(&Hooks<T>) -> Option<&H>) -> Option<H> {
		self.data.borrow().as_ref().and_then(|data| select(&data.hook).cloned())
	}

	pub(crate) fn ns(&self) -> Option<String> {
		self.data.borrow().as_ref().and_then(|data| data.ns.clone())
	}
}

/// The sameness relation: equal key and equal selector, where absent equals absent.
#[must_use]
pub fn same_vnode<T: Target>(a: &VNode<T>, b: &VNode<T>) -> bool {
	a.key == b.key && a.sel == b.sel
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryTarget;

	type Node = VNode<MemoryTarget>;

	#[test]
	fn sameness_is_key_and_selector() {
		assert!(same_vnode(&Node::element("div"), &Node::element("div")));
		assert!(same_vnode(&Node::element("div").with_key(1), &Node::element("div").with_key(1).with_text("different")));
		assert!(!same_vnode(&Node::element("div").with_key(1), &Node::element("span").with_key(1)));
		assert!(!same_vnode(&Node::element("div").with_key(1), &Node::element("div").with_key(2)));
		assert!(!same_vnode(&Node::element("div").with_key(1), &Node::element("div")));
		assert!(!same_vnode(&Node::element("li").with_key(1), &Node::element("li").with_key("1")));
		assert!(same_vnode(&Node::text_node("a"), &Node::text_node("b")));
	}

	#[test]
	fn text_and_children_exclude_each_other() {
		let node = Node::element("p").with_text("x").with_children(vec![Node::text_node("y").into_child()]);
		assert!(node.text().is_none());
		assert_eq!(node.children().map(|children| children.len()), Some(1));

		let node = Node::element("p").with_children(vec![]).with_text("x");
		assert!(node.children().is_none());
		assert_eq!(node.text(), Some("x"));
	}

	#[test]
	fn extensions_are_typed() {
		#[derive(Debug, PartialEq)]
		struct Class(&'static str);

		let mut extensions = Extensions::new();
		assert_eq!(extensions.insert(Class("a")), None);
		assert_eq!(extensions.insert(Class("b")), Some(Class("a")));
		assert_eq!(extensions.get::<Class>(), Some(&Class("b")));
		assert_eq!(extensions.get::<u32>(), None);
		assert_eq!(extensions.remove::<Class>(), Some(Class("b")));
		assert!(extensions.is_empty());
	}
}
