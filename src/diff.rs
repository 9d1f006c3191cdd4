use crate::{
	hooks::{Module, ModuleHooks},
	load,
	removal::Completion,
	selector::{self, Selector},
	target::Target,
	vnode::{same_vnode, Child, Key, VNode, VNodeRef},
};
use core::{
	fmt::{self, Debug, Formatter},
	slice,
};
use hashbrown::HashMap;
use std::{borrow::Cow, rc::Rc};
use tracing::{error, info, instrument, trace, trace_span, warn};

/// Nodes whose `insert` hook runs once the current [`Patcher::patch`] call is structurally complete, in materialization order.
type InsertedQueue<T> = Vec<VNodeRef<T>>;

/// Reconciles [`VNode`] trees against a live [`Target`] tree.
///
/// Feed each call's return value back in as `old_vnode` of the next call.
/// Module callbacks are fixed at construction and run in registration order within each phase.
///
/// # Correct Use
///
/// Keys must be unique among siblings. Duplicates aren't rejected, but lead to unspecified (though memory-safe) reconciliation.
///
/// Calling [`Patcher::patch`] again from within a hook is not supported.
pub struct Patcher<T: Target> {
	target: Rc<T>,
	cbs: ModuleHooks<T>,
	empty: VNodeRef<T>,
}
impl<T: Target> Debug for Patcher<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Patcher").field("cbs", &self.cbs).finish_non_exhaustive()
	}
}

impl<T: Target> Patcher<T> {
	#[must_use]
	pub fn new(target: Rc<T>, modules: impl IntoIterator<Item = Module<T>>) -> Self {
		let modules: Vec<_> = modules.into_iter().collect();
		let cbs = ModuleHooks::new(&modules);
		trace!(?cbs, "Registered {} module(s).", modules.len());
		Self {
			target,
			cbs,
			empty: VNode::empty().into_ref(),
		}
	}

	#[must_use]
	pub fn target(&self) -> &Rc<T> {
		&self.target
	}

	/// Brings the live tree of `old_vnode` in line with `vnode` and returns `vnode`, now holding the live handles.
	///
	/// If the roots aren't [the same](`same_vnode`), `vnode` is materialized and takes `old_vnode`'s place in its parent.
	///
	/// # Errors
	///
	/// Iff a target primitive fails. The live tree is then left partially patched.
	#[instrument(skip(self, old_vnode, vnode), fields(sel = ?vnode.sel()))]
	pub fn patch(&self, old_vnode: &VNodeRef<T>, vnode: VNodeRef<T>) -> Result<VNodeRef<T>, T::Error> {
		let mut inserted = InsertedQueue::new();
		for pre in &self.cbs.pre {
			pre()
		}

		if same_vnode(old_vnode, &vnode) {
			self.patch_vnode(old_vnode, &vnode, &mut inserted, false)?;
		} else {
			let span = trace_span!("Replacing root", old_sel = ?old_vnode.sel());
			let _enter = span.enter();
			let elm = old_vnode.elm();
			let parent = elm.as_ref().and_then(|elm| self.target.parent_node(elm));

			let new_elm = self.create_elm(&vnode, &mut inserted, false)?;

			match (elm, parent) {
				(Some(elm), Some(parent)) => {
					let next_sibling = self.target.next_sibling(&elm);
					self.target.insert_before(&parent, &new_elm, next_sibling.as_ref())?;
					self.remove_vnodes(&parent, slice::from_ref(&Some(Rc::clone(old_vnode))))?;
				}
				_ => trace!("Old root is detached. Leaving the new root detached too."),
			}
		}

		for node in &inserted {
			if let Some(insert) = node.hook(|hook| hook.insert.as_ref()) {
				insert(node)
			}
		}
		for post in &self.cbs.post {
			post()
		}

		info!("Patch complete. Ran {} insert hook(s).", inserted.len());
		Ok(vnode)
	}

	/// Like [`Patcher::patch`], but adopts an existing live element as the old root.
	///
	/// The element is represented as a childless `tag#id.class` node, so unless `vnode` matches that selector exactly (and has no key),
	/// it is replaced wholesale.
	///
	/// # Errors
	///
	/// Iff a target primitive fails.
	pub fn patch_element(&self, element: &T::Node, vnode: VNodeRef<T>) -> Result<VNodeRef<T>, T::Error> {
		let old_vnode = load::adopt_element(&*self.target, element.clone()).into_ref();
		self.patch(&old_vnode, vnode)
	}

	/// Materializes `vnode` and its subtree, stamping handles and queuing `insert` hooks.
	fn create_elm(&self, vnode: &VNodeRef<T>, inserted: &mut InsertedQueue<T>, in_svg: bool) -> Result<T::Node, T::Error> {
		if let Some(init) = vnode.hook(|hook| hook.init.as_ref()) {
			trace!("Running init hook.");
			init(vnode);
		}

		let elm = match vnode.sel() {
			Some(selector::COMMENT) => {
				let span = if cfg!(feature = "dangerous-logging") {
					trace_span!("Creating comment", comment = ?vnode.text())
				} else {
					trace_span!("Creating comment")
				};
				let _enter = span.enter();
				let comment = self.target.create_comment(vnode.text().unwrap_or(""));
				vnode.set_elm(comment.clone());
				comment
			}

			Some(sel) => {
				let span = trace_span!("Creating element", sel, key = ?vnode.key());
				let _enter = span.enter();
				let selector = Selector::parse(sel);
				let own_ns = vnode.ns();
				let namespace = selector::element_namespace(sel, own_ns.as_deref(), in_svg);

				let elm = match namespace {
					Some(namespace) => self.target.create_element_ns(namespace, selector.tag)?,
					None => self.target.create_element(selector.tag)?,
				};
				vnode.set_elm(elm.clone());

				if let Some(id) = selector.id {
					self.target.set_attribute(&elm, "id", id)?;
				}
				if let Some(class) = selector.class_list() {
					self.target.set_attribute(&elm, "class", &class)?;
				}

				for create in &self.cbs.create {
					create(&self.empty, vnode)
				}

				match (vnode.children(), vnode.text()) {
					(Some(children), _) => {
						let children_in_svg = selector::children_in_svg(sel, in_svg);
						for child in children.iter().flatten() {
							let child_elm = self.create_elm(child, inserted, children_in_svg)?;
							self.target.append_child(&elm, &child_elm)?;
						}
					}
					(None, Some(text)) => {
						let text_node = self.target.create_text_node(text);
						self.target.append_child(&elm, &text_node)?;
					}
					(None, None) => (),
				}

				if let Some(create) = vnode.hook(|hook| hook.create.as_ref()) {
					create(&self.empty, vnode)
				}
				if vnode.hook(|hook| hook.insert.as_ref()).is_some() {
					trace!("Queuing insert hook.");
					inserted.push(Rc::clone(vnode));
				}
				elm
			}

			None => {
				let span = if cfg!(feature = "dangerous-logging") {
					trace_span!("Creating text node", text = ?vnode.text())
				} else {
					trace_span!("Creating text node")
				};
				let _enter = span.enter();
				let text = self.target.create_text_node(vnode.text().unwrap_or(""));
				vnode.set_elm(text.clone());
				text
			}
		};

		Ok(elm)
	}

	fn add_vnodes(&self, parent_elm: &T::Node, before: Option<&T::Node>, vnodes: &[Child<T>], inserted: &mut InsertedQueue<T>, in_svg: bool) -> Result<(), T::Error> {
		let span = trace_span!("Adding nodes", "vnodes.len()" = vnodes.len());
		let _enter = span.enter();
		for vnode in vnodes.iter().flatten() {
			let elm = self.create_elm(vnode, inserted, in_svg)?;
			self.target.insert_before(parent_elm, &elm, before)?;
		}
		Ok(())
	}

	/// Notifies `vnode` and its element descendants of their upcoming removal, without touching the target.
	fn invoke_destroy_hook(&self, vnode: &VNodeRef<T>) {
		if !vnode.has_data() {
			return;
		}

		if let Some(destroy) = vnode.hook(|hook| hook.destroy.as_ref()) {
			destroy(vnode)
		}
		for destroy in &self.cbs.destroy {
			destroy(vnode)
		}

		if let Some(children) = vnode.children() {
			for child in children.iter().flatten() {
				if !child.is_text() {
					self.invoke_destroy_hook(child)
				}
			}
		}
	}

	fn remove_vnodes(&self, parent_elm: &T::Node, vnodes: &[Child<T>]) -> Result<(), T::Error> {
		for vnode in vnodes.iter().flatten() {
			let span = trace_span!("Removing node", sel = ?vnode.sel(), key = ?vnode.key());
			let _enter = span.enter();

			let elm = match vnode.elm() {
				Some(elm) => elm,
				None => {
					error!("Expected to remove a node that was never materialized. Skipping.");
					continue;
				}
			};

			if vnode.is_text() {
				self.target.remove_child(parent_elm, &elm)?;
				continue;
			}

			self.invoke_destroy_hook(vnode);
			let completion = Completion::new(Rc::clone(&self.target), elm, self.cbs.remove.len() + 1);
			for remove in &self.cbs.remove {
				remove(vnode, completion.clone())
			}
			match vnode.hook(|hook| hook.remove.as_ref()) {
				Some(remove) => remove(vnode, completion),
				None => completion.complete()?,
			}
		}
		Ok(())
	}

	/// Moves `vnode`'s live node before `reference` (or to the end).
	fn move_before(&self, parent_elm: &T::Node, vnode: &VNode<T>, reference: Option<&T::Node>) -> Result<(), T::Error> {
		match vnode.elm() {
			Some(elm) => {
				trace!(?elm, ?reference, "Moving.");
				self.target.insert_before(parent_elm, &elm, reference)
			}
			None => {
				error!("Expected to move a node that was never materialized. Skipping.");
				Ok(())
			}
		}
	}

	/// The keyed diff of two sibling lists.
	///
	/// Both ends are compared first (including crosswise, for moves), so appends, prepends, reversals and single swaps never build the key map.
	#[allow(clippy::too_many_lines)]
	fn update_children(&self, parent_elm: &T::Node, old_ch: &[Child<T>], new_ch: &[Child<T>], inserted: &mut InsertedQueue<T>, children_in_svg: bool) -> Result<(), T::Error> {
		let span = trace_span!("Diffing children", "old_ch.len()" = old_ch.len(), "new_ch.len()" = new_ch.len());
		let _enter = span.enter();

		// Slots consumed through the key map are tombstoned here. Copied on the first one.
		let mut old_ch = Cow::Borrowed(old_ch);

		// Half-open ranges.
		let mut old_start = 0;
		let mut old_end = old_ch.len();
		let mut new_start = 0;
		let mut new_end = new_ch.len();
		let mut old_key_to_idx: Option<HashMap<Key, usize>> = None;

		while old_start < old_end && new_start < new_end {
			let old_start_vnode = match &old_ch[old_start] {
				Some(vnode) => Rc::clone(vnode),
				None => {
					// Moved left earlier.
					old_start += 1;
					continue;
				}
			};
			let old_end_vnode = match &old_ch[old_end - 1] {
				Some(vnode) => Rc::clone(vnode),
				None => {
					old_end -= 1;
					continue;
				}
			};
			let new_start_vnode = match &new_ch[new_start] {
				Some(vnode) => vnode,
				None => {
					new_start += 1;
					continue;
				}
			};
			let new_end_vnode = match &new_ch[new_end - 1] {
				Some(vnode) => vnode,
				None => {
					new_end -= 1;
					continue;
				}
			};

			if same_vnode(&old_start_vnode, new_start_vnode) {
				self.patch_vnode(&old_start_vnode, new_start_vnode, inserted, children_in_svg)?;
				old_start += 1;
				new_start += 1;
			} else if same_vnode(&old_end_vnode, new_end_vnode) {
				self.patch_vnode(&old_end_vnode, new_end_vnode, inserted, children_in_svg)?;
				old_end -= 1;
				new_end -= 1;
			} else if same_vnode(&old_start_vnode, new_end_vnode) {
				let span = trace_span!("Moved right");
				let _enter = span.enter();
				self.patch_vnode(&old_start_vnode, new_end_vnode, inserted, children_in_svg)?;
				let reference = old_end_vnode.elm().and_then(|elm| self.target.next_sibling(&elm));
				self.move_before(parent_elm, &old_start_vnode, reference.as_ref())?;
				old_start += 1;
				new_end -= 1;
			} else if same_vnode(&old_end_vnode, new_start_vnode) {
				let span = trace_span!("Moved left");
				let _enter = span.enter();
				self.patch_vnode(&old_end_vnode, new_start_vnode, inserted, children_in_svg)?;
				self.move_before(parent_elm, &old_end_vnode, old_start_vnode.elm().as_ref())?;
				old_end -= 1;
				new_start += 1;
			} else {
				let old_key_to_idx = old_key_to_idx.get_or_insert_with(|| create_key_to_old_idx(&old_ch, old_start, old_end));
				let before = old_start_vnode.elm();

				let elm_to_move = match new_start_vnode.key().and_then(|key| old_key_to_idx.get(key)) {
					None => None,
					Some(&idx_in_old) => {
						let candidate = if (old_start..old_end).contains(&idx_in_old) { old_ch[idx_in_old].clone() } else { None };
						if candidate.is_none() {
							warn!(key = ?new_start_vnode.key(), "Keyed sibling was already consumed. Are keys unique? Creating a new node instead.");
						}
						candidate.map(|vnode| (idx_in_old, vnode))
					}
				};

				match elm_to_move {
					Some((idx_in_old, elm_to_move)) if elm_to_move.sel() == new_start_vnode.sel() => {
						let span = trace_span!("Moving keyed", key = ?new_start_vnode.key());
						let _enter = span.enter();
						self.patch_vnode(&elm_to_move, new_start_vnode, inserted, children_in_svg)?;
						old_ch.to_mut()[idx_in_old] = None;
						self.move_before(parent_elm, &elm_to_move, before.as_ref())?;
					}
					_ => {
						// New, or the key now belongs to a different kind of element.
						let elm = self.create_elm(new_start_vnode, inserted, children_in_svg)?;
						self.target.insert_before(parent_elm, &elm, before.as_ref())?;
					}
				}
				new_start += 1;
			}
		}

		if old_start >= old_end {
			if new_start < new_end {
				let before = new_ch.get(new_end).and_then(Option::as_ref).and_then(|vnode| vnode.elm());
				self.add_vnodes(parent_elm, before.as_ref(), &new_ch[new_start..new_end], inserted, children_in_svg)?;
			}
		} else if new_start >= new_end {
			self.remove_vnodes(parent_elm, &old_ch[old_start..old_end])?;
		}
		Ok(())
	}

	/// Updates `old_vnode`'s live node in place to match `vnode`. The two must be [the same](`same_vnode`).
	fn patch_vnode(&self, old_vnode: &VNodeRef<T>, vnode: &VNodeRef<T>, inserted: &mut InsertedQueue<T>, in_svg: bool) -> Result<(), T::Error> {
		let span = trace_span!("Patching node", sel = ?vnode.sel(), key = ?vnode.key());
		let _enter = span.enter();

		if let Some(prepatch) = vnode.hook(|hook| hook.prepatch.as_ref()) {
			prepatch(old_vnode, vnode)
		}

		let elm = match old_vnode.elm() {
			Some(elm) => elm,
			None => {
				error!("Expected to patch a node that was never materialized. Skipping.");
				return Ok(());
			}
		};
		vnode.set_elm(elm.clone());

		if Rc::ptr_eq(old_vnode, vnode) {
			trace!("Identical node. Nothing to do.");
			return Ok(());
		}

		if vnode.has_data() {
			for update in &self.cbs.update {
				update(old_vnode, vnode)
			}
			if let Some(update) = vnode.hook(|hook| hook.update.as_ref()) {
				update(old_vnode, vnode)
			}
		}

		match vnode.text() {
			None => match (old_vnode.children(), vnode.children()) {
				(Some(old_ch), Some(ch)) => {
					if Rc::ptr_eq(old_ch, ch) {
						trace!("Identical children. Skipping.");
					} else {
						self.update_children(&elm, old_ch, ch, inserted, children_in_svg(vnode, in_svg))?;
					}
				}
				(None, Some(ch)) => {
					if old_vnode.text().is_some() {
						self.target.set_text_content(&elm, "");
					}
					self.add_vnodes(&elm, None, ch, inserted, children_in_svg(vnode, in_svg))?;
				}
				(Some(old_ch), None) => self.remove_vnodes(&elm, old_ch)?,
				(None, None) => {
					if old_vnode.text().is_some() {
						self.target.set_text_content(&elm, "");
					}
				}
			},
			Some(text) if old_vnode.text() != Some(text) => {
				if let Some(old_ch) = old_vnode.children() {
					// Removed children still get their remove hooks and transitions.
					self.remove_vnodes(&elm, old_ch)?;
				}
				self.target.set_text_content(&elm, text);
			}
			Some(_) => trace!("Unchanged text."),
		}

		if let Some(postpatch) = vnode.hook(|hook| hook.postpatch.as_ref()) {
			postpatch(old_vnode, vnode)
		}
		Ok(())
	}
}

/// Whether the children of `vnode` are inside an SVG subtree.
fn children_in_svg<T: Target>(vnode: &VNode<T>, in_svg: bool) -> bool {
	vnode.sel().map_or(false, |sel| selector::children_in_svg(sel, in_svg))
}

/// Maps the keys in `children[start..end]` to their index. The last of duplicate keys wins.
fn create_key_to_old_idx<T: Target>(children: &[Child<T>], start: usize, end: usize) -> HashMap<Key, usize> {
	let span = trace_span!("Building key map", start, end);
	let _enter = span.enter();
	let mut map = HashMap::with_capacity(end - start);
	for (i, child) in children.iter().enumerate().take(end).skip(start) {
		if let Some(key) = child.as_ref().and_then(|child| child.key()) {
			if let Some(previous) = map.insert(key.clone(), i) {
				warn!("Duplicate key {} among siblings (at {} and {}). Reconciliation will be unspecified.", key, previous, i);
			}
		}
	}
	map
}
