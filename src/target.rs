//! The capability set the [`Patcher`](`crate::diff::Patcher`) needs from a rendering target.
//!
//! Swapping the implementation retargets the whole engine, so nothing outside this trait may assume a browser.
//! See [`WebTarget`](`crate::web::WebTarget`) for the DOM and [`MemoryTarget`](`crate::memory::MemoryTarget`) for a headless tree.

use core::fmt::Debug;

/// Primitive tree mutations and queries.
///
/// All methods take `&self`, since a [`Completion`](`crate::removal::Completion`) may detach a node
/// long after the [`Patcher`](`crate::diff::Patcher`) call that scheduled it has returned.
/// Implementations that keep their own state should use interior mutability.
pub trait Target {
	/// A non-owning handle to a live node.
	type Node: Clone + Debug;
	/// The failure reported by fallible primitives, propagated unchanged to the caller of [`Patcher::patch`](`crate::diff::Patcher::patch`).
	type Error: Debug;

	/// Creates a detached element in the default namespace.
	///
	/// # Errors
	///
	/// Iff the target rejects `tag`.
	fn create_element(&self, tag: &str) -> Result<Self::Node, Self::Error>;

	/// Creates a detached element in `namespace`.
	///
	/// # Errors
	///
	/// Iff the target rejects the `namespace`/`tag` combination.
	fn create_element_ns(&self, namespace: &str, tag: &str) -> Result<Self::Node, Self::Error>;

	fn create_text_node(&self, text: &str) -> Self::Node;
	fn create_comment(&self, text: &str) -> Self::Node;

	/// Inserts (or moves) `node` into `parent` before `reference`, or at the end if `reference` is [`None`].
	///
	/// # Errors
	///
	/// Iff `reference` is not a child of `parent`, or if `node` can't be placed there.
	fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>) -> Result<(), Self::Error>;

	/// # Errors
	///
	/// Iff `node` can't be placed into `parent`.
	fn append_child(&self, parent: &Self::Node, node: &Self::Node) -> Result<(), Self::Error>;

	/// # Errors
	///
	/// Iff `child` is not currently a child of `parent`.
	fn remove_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

	/// The element's tag name as the target reports it (not necessarily lower case).
	///
	/// Empty for nodes that aren't elements.
	fn tag_name(&self, element: &Self::Node) -> String;

	/// Replaces all children of `node` with a single text node, or sets the data of a text or comment node.
	///
	/// An empty `text` leaves an element without children.
	fn set_text_content(&self, node: &Self::Node, text: &str);

	/// # Errors
	///
	/// Iff `element` is not an element or `name` is not a valid attribute name.
	fn set_attribute(&self, element: &Self::Node, name: &str, value: &str) -> Result<(), Self::Error>;

	fn get_attribute(&self, element: &Self::Node, name: &str) -> Option<String>;
}
