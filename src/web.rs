//! [`Target`] implementation for the browser DOM.

use crate::target::Target;
use tracing::{instrument, trace};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node};

/// Creates nodes through a [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document) and mutates them in place.
///
/// Failed DOM calls surface as the thrown [`JsValue`].
#[derive(Debug, Clone)]
pub struct WebTarget {
	document: Document,
}
impl WebTarget {
	#[must_use]
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	/// Uses `node`'s owner document, if any.
	#[must_use]
	pub fn for_node(node: &Node) -> Option<Self> {
		node.owner_document().map(Self::new)
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}
}

fn as_element(node: &Node) -> Result<&Element, JsValue> {
	node.dyn_ref::<Element>().ok_or_else(|| JsValue::from_str("graft-dom: Expected an element."))
}

impl Target for WebTarget {
	type Node = Node;
	type Error = JsValue;

	#[instrument(skip(self))]
	fn create_element(&self, tag: &str) -> Result<Self::Node, Self::Error> {
		self.document.create_element(tag).map(Into::into)
	}

	#[instrument(skip(self))]
	fn create_element_ns(&self, namespace: &str, tag: &str) -> Result<Self::Node, Self::Error> {
		self.document.create_element_ns(Some(namespace), tag).map(Into::into)
	}

	fn create_text_node(&self, text: &str) -> Self::Node {
		self.document.create_text_node(text).into()
	}

	fn create_comment(&self, text: &str) -> Self::Node {
		self.document.create_comment(text).into()
	}

	fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>) -> Result<(), Self::Error> {
		parent.insert_before(node, reference).map(drop)
	}

	fn append_child(&self, parent: &Self::Node, node: &Self::Node) -> Result<(), Self::Error> {
		parent.append_child(node).map(drop)
	}

	fn remove_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error> {
		parent.remove_child(child).map(drop)
	}

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node> {
		node.parent_node()
	}

	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
		node.next_sibling()
	}

	fn tag_name(&self, element: &Self::Node) -> String {
		element.dyn_ref::<Element>().map_or_else(String::new, Element::tag_name)
	}

	fn set_text_content(&self, node: &Self::Node, text: &str) {
		node.set_text_content(Some(text))
	}

	fn set_attribute(&self, element: &Self::Node, name: &str, value: &str) -> Result<(), Self::Error> {
		trace!(name, "Setting attribute.");
		as_element(element)?.set_attribute(name, value)
	}

	fn get_attribute(&self, element: &Self::Node, name: &str) -> Option<String> {
		element.dyn_ref::<Element>()?.get_attribute(name)
	}
}
