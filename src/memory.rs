//! A headless [`Target`] that keeps its tree in memory and journals every mutation.
//!
//! Useful wherever there is no browser: native tests, inspecting the mutations of a bounded number of patches, other renderers' reference output.
//! The arena only grows, see [`MemoryTarget`].

use crate::target::Target;
use core::cell::RefCell;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

/// Handle of a node in a [`MemoryTarget`]. Only meaningful for the target that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryNodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNodeKind {
	Element {
		namespace: Option<String>,
		tag: String,
		attributes: BTreeMap<String, String>,
	},
	Text(String),
	Comment(String),
}

#[derive(Debug)]
struct Slot {
	kind: MemoryNodeKind,
	parent: Option<MemoryNodeId>,
	children: Vec<MemoryNodeId>,
}

/// One primitive operation, as requested by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	CreateElement { node: MemoryNodeId, namespace: Option<String>, tag: String },
	CreateText { node: MemoryNodeId },
	CreateComment { node: MemoryNodeId },
	/// `moved` is set iff `node` was attached somewhere before.
	Insert {
		parent: MemoryNodeId,
		node: MemoryNodeId,
		before: Option<MemoryNodeId>,
		moved: bool,
	},
	Remove { parent: MemoryNodeId, node: MemoryNodeId },
	SetTextContent { node: MemoryNodeId },
	SetAttribute { node: MemoryNodeId, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
	#[error("unknown node {0:?}")]
	UnknownNode(MemoryNodeId),
	#[error("{child:?} is not a child of {parent:?}")]
	NotAChild { parent: MemoryNodeId, child: MemoryNodeId },
	#[error("{0:?} is not an element")]
	NotAnElement(MemoryNodeId),
	#[error("inserting {node:?} into {parent:?} would make it its own ancestor")]
	Cycle { parent: MemoryNodeId, node: MemoryNodeId },
	#[error("invalid tag or attribute name {0:?}")]
	InvalidName(String),
}

/// An in-memory node arena with a mutation journal.
///
/// Nodes are never reclaimed: removed and replaced nodes keep their slot (and stay inspectable through [`MemoryTarget::kind`])
/// for as long as the target lives, and so does the journal unless it is [taken](`MemoryTarget::take_journal`).
/// Memory use therefore grows with every node ever created. Use one target per tree or test rather than one per process.
#[derive(Debug, Default)]
pub struct MemoryTarget {
	nodes: RefCell<Vec<Slot>>,
	journal: RefCell<Vec<Mutation>>,
}

impl MemoryTarget {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn add(&self, kind: MemoryNodeKind) -> MemoryNodeId {
		let mut nodes = self.nodes.borrow_mut();
		nodes.push(Slot { kind, parent: None, children: Vec::new() });
		MemoryNodeId(nodes.len() - 1)
	}

	fn record(&self, mutation: Mutation) {
		trace!(?mutation);
		self.journal.borrow_mut().push(mutation)
	}

	fn check(&self, node: MemoryNodeId) -> Result<(), MemoryError> {
		if node.0 < self.nodes.borrow().len() {
			Ok(())
		} else {
			Err(MemoryError::UnknownNode(node))
		}
	}

	fn detach(nodes: &mut [Slot], node: MemoryNodeId) -> bool {
		match nodes[node.0].parent.take() {
			Some(parent) => {
				nodes[parent.0].children.retain(|&child| child != node);
				true
			}
			None => false,
		}
	}

	fn is_inclusive_ancestor(nodes: &[Slot], ancestor: MemoryNodeId, mut node: MemoryNodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match nodes[node.0].parent {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}

	fn validate_name(name: &str) -> Result<(), MemoryError> {
		if name.is_empty() || name.contains(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '=')) {
			Err(MemoryError::InvalidName(name.to_owned()))
		} else {
			Ok(())
		}
	}

	#[must_use]
	pub fn kind(&self, node: MemoryNodeId) -> Option<MemoryNodeKind> {
		self.nodes.borrow().get(node.0).map(|slot| slot.kind.clone())
	}

	#[must_use]
	pub fn children(&self, node: MemoryNodeId) -> Vec<MemoryNodeId> {
		self.nodes.borrow().get(node.0).map(|slot| slot.children.clone()).unwrap_or_default()
	}

	#[must_use]
	pub fn namespace(&self, node: MemoryNodeId) -> Option<String> {
		match self.kind(node)? {
			MemoryNodeKind::Element { namespace, .. } => namespace,
			MemoryNodeKind::Text(_) | MemoryNodeKind::Comment(_) => None,
		}
	}

	/// Concatenated text of all descendant text nodes.
	#[must_use]
	pub fn text_content(&self, node: MemoryNodeId) -> String {
		let nodes = self.nodes.borrow();
		let mut text = String::new();
		let mut stack = vec![node];
		while let Some(node) = stack.pop() {
			let slot = match nodes.get(node.0) {
				Some(slot) => slot,
				None => continue,
			};
			if let MemoryNodeKind::Text(data) = &slot.kind {
				text.push_str(data);
			}
			stack.extend(slot.children.iter().rev());
		}
		text
	}

	/// An HTML-like serialization of `node` and its subtree. Attributes are sorted by name.
	#[must_use]
	pub fn render(&self, node: MemoryNodeId) -> String {
		fn render_into(nodes: &[Slot], node: MemoryNodeId, out: &mut String) {
			let slot = match nodes.get(node.0) {
				Some(slot) => slot,
				None => return,
			};
			match &slot.kind {
				MemoryNodeKind::Text(data) => out.push_str(data),
				MemoryNodeKind::Comment(data) => {
					out.push_str("<!--");
					out.push_str(data);
					out.push_str("-->");
				}
				MemoryNodeKind::Element { tag, attributes, .. } => {
					out.push('<');
					out.push_str(tag);
					for (name, value) in attributes {
						out.push(' ');
						out.push_str(name);
						out.push_str("=\"");
						out.push_str(value);
						out.push('"');
					}
					out.push('>');
					for &child in &slot.children {
						render_into(nodes, child, out)
					}
					out.push_str("</");
					out.push_str(tag);
					out.push('>');
				}
			}
		}

		let mut out = String::new();
		render_into(&self.nodes.borrow(), node, &mut out);
		out
	}

	#[must_use]
	pub fn journal(&self) -> Vec<Mutation> {
		self.journal.borrow().clone()
	}

	/// Returns and clears the journal.
	pub fn take_journal(&self) -> Vec<Mutation> {
		self.journal.take()
	}

	/// Number of journaled node creations (of any kind).
	#[must_use]
	pub fn creation_count(&self) -> usize {
		self.journal
			.borrow()
			.iter()
			.filter(|mutation| matches!(mutation, Mutation::CreateElement { .. } | Mutation::CreateText { .. } | Mutation::CreateComment { .. }))
			.count()
	}

	/// Number of journaled insertions of nodes that were already attached.
	#[must_use]
	pub fn move_count(&self) -> usize {
		self.journal.borrow().iter().filter(|mutation| matches!(mutation, Mutation::Insert { moved: true, .. })).count()
	}

	#[must_use]
	pub fn removal_count(&self) -> usize {
		self.journal.borrow().iter().filter(|mutation| matches!(mutation, Mutation::Remove { .. })).count()
	}
}

impl Target for MemoryTarget {
	type Node = MemoryNodeId;
	type Error = MemoryError;

	fn create_element(&self, tag: &str) -> Result<Self::Node, Self::Error> {
		Self::validate_name(tag)?;
		let node = self.add(MemoryNodeKind::Element {
			namespace: None,
			tag: tag.to_owned(),
			attributes: BTreeMap::new(),
		});
		self.record(Mutation::CreateElement { node, namespace: None, tag: tag.to_owned() });
		Ok(node)
	}

	fn create_element_ns(&self, namespace: &str, tag: &str) -> Result<Self::Node, Self::Error> {
		Self::validate_name(tag)?;
		let node = self.add(MemoryNodeKind::Element {
			namespace: Some(namespace.to_owned()),
			tag: tag.to_owned(),
			attributes: BTreeMap::new(),
		});
		self.record(Mutation::CreateElement {
			node,
			namespace: Some(namespace.to_owned()),
			tag: tag.to_owned(),
		});
		Ok(node)
	}

	fn create_text_node(&self, text: &str) -> Self::Node {
		let node = self.add(MemoryNodeKind::Text(text.to_owned()));
		self.record(Mutation::CreateText { node });
		node
	}

	fn create_comment(&self, text: &str) -> Self::Node {
		let node = self.add(MemoryNodeKind::Comment(text.to_owned()));
		self.record(Mutation::CreateComment { node });
		node
	}

	fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>) -> Result<(), Self::Error> {
		let (parent, node) = (*parent, *node);
		self.check(parent)?;
		self.check(node)?;
		let moved = {
			let mut nodes = self.nodes.borrow_mut();
			if let Some(&reference) = reference {
				if reference.0 >= nodes.len() {
					return Err(MemoryError::UnknownNode(reference));
				}
				if nodes[reference.0].parent != Some(parent) {
					return Err(MemoryError::NotAChild { parent, child: reference });
				}
			}
			if Self::is_inclusive_ancestor(&nodes, node, parent) {
				return Err(MemoryError::Cycle { parent, node });
			}
			if !matches!(nodes[parent.0].kind, MemoryNodeKind::Element { .. }) {
				return Err(MemoryError::NotAnElement(parent));
			}

			if reference == Some(&node) {
				// Already in place.
				true
			} else {
				let moved = Self::detach(&mut nodes, node);
				let index = match reference {
					Some(reference) => nodes[parent.0].children.iter().position(|child| child == reference).ok_or(MemoryError::NotAChild { parent, child: *reference })?,
					None => nodes[parent.0].children.len(),
				};
				nodes[parent.0].children.insert(index, node);
				nodes[node.0].parent = Some(parent);
				moved
			}
		};
		self.record(Mutation::Insert {
			parent,
			node,
			before: reference.copied(),
			moved,
		});
		Ok(())
	}

	fn append_child(&self, parent: &Self::Node, node: &Self::Node) -> Result<(), Self::Error> {
		self.insert_before(parent, node, None)
	}

	fn remove_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error> {
		let (parent, child) = (*parent, *child);
		self.check(parent)?;
		self.check(child)?;
		{
			let mut nodes = self.nodes.borrow_mut();
			if nodes[child.0].parent != Some(parent) {
				return Err(MemoryError::NotAChild { parent, child });
			}
			Self::detach(&mut nodes, child);
		}
		self.record(Mutation::Remove { parent, node: child });
		Ok(())
	}

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node> {
		self.nodes.borrow().get(node.0).and_then(|slot| slot.parent)
	}

	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
		let nodes = self.nodes.borrow();
		let parent = nodes.get(node.0)?.parent?;
		let siblings = &nodes[parent.0].children;
		let index = siblings.iter().position(|sibling| sibling == node)?;
		siblings.get(index + 1).copied()
	}

	fn tag_name(&self, element: &Self::Node) -> String {
		match self.kind(*element) {
			Some(MemoryNodeKind::Element { namespace: None, tag, .. }) => tag.to_ascii_uppercase(),
			Some(MemoryNodeKind::Element { tag, .. }) => tag,
			_ => String::new(),
		}
	}

	fn set_text_content(&self, node: &Self::Node, text: &str) {
		let node = *node;
		let is_element = {
			let mut nodes = self.nodes.borrow_mut();
			let slot = match nodes.get_mut(node.0) {
				Some(slot) => slot,
				None => return,
			};
			let orphans = match &mut slot.kind {
				MemoryNodeKind::Text(data) | MemoryNodeKind::Comment(data) => {
					*data = text.to_owned();
					None
				}
				MemoryNodeKind::Element { .. } => Some(core::mem::take(&mut slot.children)),
			};
			match orphans {
				Some(orphans) => {
					for child in orphans {
						nodes[child.0].parent = None;
					}
					true
				}
				None => false,
			}
		};
		if is_element && !text.is_empty() {
			let text_node = self.add(MemoryNodeKind::Text(text.to_owned()));
			let mut nodes = self.nodes.borrow_mut();
			nodes[text_node.0].parent = Some(node);
			nodes[node.0].children.push(text_node);
		}
		self.record(Mutation::SetTextContent { node });
	}

	fn set_attribute(&self, element: &Self::Node, name: &str, value: &str) -> Result<(), Self::Error> {
		Self::validate_name(name)?;
		{
			let mut nodes = self.nodes.borrow_mut();
			let slot = nodes.get_mut(element.0).ok_or(MemoryError::UnknownNode(*element))?;
			match &mut slot.kind {
				MemoryNodeKind::Element { attributes, .. } => {
					attributes.insert(name.to_owned(), value.to_owned());
				}
				MemoryNodeKind::Text(_) | MemoryNodeKind::Comment(_) => return Err(MemoryError::NotAnElement(*element)),
			}
		}
		self.record(Mutation::SetAttribute { node: *element, name: name.to_owned() });
		Ok(())
	}

	fn get_attribute(&self, element: &Self::Node, name: &str) -> Option<String> {
		match self.kind(*element)? {
			MemoryNodeKind::Element { attributes, .. } => attributes.get(name).cloned(),
			MemoryNodeKind::Text(_) | MemoryNodeKind::Comment(_) => None,
		}
	}
}
